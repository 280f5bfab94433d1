// CoursePulse - core/ingest.rs
//
// Schema-checked decoding of the offerings and model-results tables.
// Core layer: reads from any `Read`, never opens files itself.
//
// Any schema violation aborts the whole table. Header names are trimmed;
// field values are kept verbatim so category labels are not normalised.

use crate::core::model::{ModelResult, TrainingOffering};
use crate::util::constants;
use crate::util::error::SchemaError;
use serde::Deserialize;
use std::io::Read;

/// Offering row exactly as it appears in the source table.
#[derive(Debug, Deserialize)]
struct RawOffering {
    #[serde(rename = "titre")]
    title: String,
    #[serde(rename = "categorie")]
    category: String,
    #[serde(rename = "duree_heures")]
    duration_hours: f64,
    #[serde(rename = "demand_offres")]
    demand_offers: f64,
    #[serde(rename = "certification")]
    certification: Option<String>,
    #[serde(rename = "ratio_demande_etudiants")]
    ratio_demand_students: f64,
}

/// Model-result row; header spellings from the published tables are accepted.
#[derive(Debug, Deserialize)]
struct RawModelResult {
    #[serde(alias = "Modèle", alias = "model")]
    name: String,
    #[serde(rename = "RMSE", alias = "rmse")]
    rmse: f64,
    #[serde(rename = "R²", alias = "R2", alias = "r2")]
    r2: f64,
}

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader)
}

fn error_line(e: &csv::Error) -> u64 {
    e.position().map(|p| p.line()).unwrap_or(0)
}

/// Decode every data row of `csv_reader` into `T`, tagging each with its line.
fn decode_rows<R: Read, T: for<'de> Deserialize<'de>>(
    csv_reader: &mut csv::Reader<R>,
    headers: &csv::StringRecord,
) -> Result<Vec<(u64, T)>, SchemaError> {
    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| SchemaError::InvalidRecord {
            line: error_line(&e),
            source: e,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record
            .deserialize(Some(headers))
            .map_err(|e| SchemaError::InvalidRecord { line, source: e })?;
        rows.push((line, row));
    }
    Ok(rows)
}

fn invalid(line: u64, field: &'static str, value: impl ToString, reason: &'static str) -> SchemaError {
    SchemaError::InvalidValue {
        line,
        field,
        value: value.to_string(),
        reason,
    }
}

fn validate_offering(line: u64, raw: RawOffering) -> Result<TrainingOffering, SchemaError> {
    if raw.title.trim().is_empty() {
        return Err(invalid(line, constants::COL_TITLE, &raw.title, "must not be empty"));
    }
    if !raw.duration_hours.is_finite() || raw.duration_hours < 0.0 {
        return Err(invalid(
            line,
            constants::COL_DURATION,
            raw.duration_hours,
            "must be a finite, non-negative number of hours",
        ));
    }
    let demand = raw.demand_offers;
    if !demand.is_finite()
        || demand < 0.0
        || demand.fract() != 0.0
        || demand > constants::MAX_DEMAND_OFFERS as f64
    {
        return Err(invalid(
            line,
            constants::COL_DEMAND,
            demand,
            "must be a whole number between 0 and 2^53",
        ));
    }
    if !raw.ratio_demand_students.is_finite() || raw.ratio_demand_students < 0.0 {
        return Err(invalid(
            line,
            constants::COL_RATIO,
            raw.ratio_demand_students,
            "must be a finite, non-negative number",
        ));
    }

    Ok(TrainingOffering {
        title: raw.title,
        category: raw.category,
        duration_hours: raw.duration_hours,
        demand_offers: demand as u64,
        certification: raw.certification.filter(|c| !c.is_empty()),
        ratio_demand_students: raw.ratio_demand_students,
    })
}

/// Load offerings from a CSV table.
///
/// Every column in `REQUIRED_OFFERING_COLUMNS` must be present; extra
/// columns are ignored. A zero `duree_heures` is accepted here and handled
/// by enrichment.
pub fn load_offerings<R: Read>(reader: R) -> Result<Vec<TrainingOffering>, SchemaError> {
    let mut csv_reader = reader_for(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| SchemaError::Header { source: e })?
        .clone();

    for column in constants::REQUIRED_OFFERING_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(SchemaError::MissingColumn { column });
        }
    }

    let offerings = decode_rows::<_, RawOffering>(&mut csv_reader, &headers)?
        .into_iter()
        .map(|(line, raw)| validate_offering(line, raw))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(offerings = offerings.len(), "Offerings table decoded");
    Ok(offerings)
}

/// Load model evaluation results from a CSV table.
///
/// Needs a name, an RMSE and an R² column under any accepted spelling.
/// An empty table decodes to an empty vector; selection reports that case.
pub fn load_model_results<R: Read>(reader: R) -> Result<Vec<ModelResult>, SchemaError> {
    let mut csv_reader = reader_for(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| SchemaError::Header { source: e })?
        .clone();

    for spellings in [
        constants::MODEL_NAME_COLUMNS,
        constants::MODEL_RMSE_COLUMNS,
        constants::MODEL_R2_COLUMNS,
    ] {
        if !spellings.iter().any(|s| headers.iter().any(|h| h == *s)) {
            return Err(SchemaError::MissingColumn {
                column: spellings[0],
            });
        }
    }

    let mut results = Vec::new();
    for (line, raw) in decode_rows::<_, RawModelResult>(&mut csv_reader, &headers)? {
        if !raw.rmse.is_finite() || raw.rmse < 0.0 {
            return Err(invalid(line, "RMSE", raw.rmse, "must be a finite, non-negative number"));
        }
        if !raw.r2.is_finite() {
            return Err(invalid(line, "R²", raw.r2, "must be a finite number"));
        }
        results.push(ModelResult::new(raw.name, raw.rmse, raw.r2));
    }

    tracing::debug!(models = results.len(), "Model results table decoded");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "titre,categorie,demand_offres,duree_heures,certification,ratio_demande_etudiants";

    fn table(rows: &[&str]) -> String {
        let mut s = HEADER.to_string();
        for row in rows {
            s.push('\n');
            s.push_str(row);
        }
        s
    }

    #[test]
    fn test_loads_valid_rows() {
        let csv = table(&[
            "Python,Développement,120,35,RNCP,1.2",
            "Excel,Bureautique,12.0,7,,0.3",
        ]);
        let offerings = load_offerings(csv.as_bytes()).unwrap();
        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings[0].title, "Python");
        assert_eq!(offerings[0].demand_offers, 120);
        assert_eq!(offerings[0].certification.as_deref(), Some("RNCP"));
        assert_eq!(offerings[1].demand_offers, 12);
        assert_eq!(offerings[1].certification, None);
    }

    #[test]
    fn test_extra_columns_and_order_are_ignored() {
        let csv = "id,ratio_demande_etudiants,titre,certification,duree_heures,categorie,demand_offres,notes\n\
                   7,0.5,SEO,non,14,Marketing,30,x";
        let offerings = load_offerings(csv.as_bytes()).unwrap();
        assert_eq!(offerings[0].category, "Marketing");
        assert!(!offerings[0].has_certification());
    }

    #[test]
    fn test_category_whitespace_is_preserved() {
        let csv = table(&["SEO, Marketing ,30,14,,0.5"]);
        let offerings = load_offerings(csv.as_bytes()).unwrap();
        assert_eq!(offerings[0].category, " Marketing ");
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = "titre,categorie,demand_offres,duree_heures,certification\nA,B,1,2,";
        let err = load_offerings(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingColumn {
                column: "ratio_demande_etudiants"
            }
        ));
    }

    #[test]
    fn test_wrong_type_reports_line() {
        let csv = table(&["A,B,10,20,,1.0", "C,D,beaucoup,20,,1.0"]);
        let err = load_offerings(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRecord { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn test_invariant_violations() {
        let cases = [
            ("A,B,1.5,20,,1.0", constants::COL_DEMAND),
            ("A,B,-1,20,,1.0", constants::COL_DEMAND),
            ("A,B,1,-2,,1.0", constants::COL_DURATION),
            ("A,B,1,2,,-0.1", constants::COL_RATIO),
            (" ,B,1,2,,0.1", constants::COL_TITLE),
        ];
        for (row, expected) in cases {
            let err = load_offerings(table(&[row]).as_bytes()).unwrap_err();
            assert!(
                matches!(err, SchemaError::InvalidValue { field, .. } if field == expected),
                "{row}: {err:?}"
            );
        }
    }

    #[test]
    fn test_demand_is_bounded() {
        let at_bound = table(&["A,X,9007199254740992,10,,1.0"]);
        let offerings = load_offerings(at_bound.as_bytes()).unwrap();
        assert_eq!(offerings[0].demand_offers, constants::MAX_DEMAND_OFFERS);

        let huge = table(&["A,X,10000000000000000000,10,,1.0", "B,X,10000000000000000000,10,,1.0"]);
        let err = load_offerings(huge.as_bytes()).unwrap_err();
        assert!(
            matches!(err, SchemaError::InvalidValue { line: 2, field, .. } if field == constants::COL_DEMAND),
            "{err:?}"
        );
    }

    #[test]
    fn test_zero_duration_is_accepted() {
        let offerings = load_offerings(table(&["Atelier,B,5,0,,1.0"]).as_bytes()).unwrap();
        assert_eq!(offerings[0].duration_hours, 0.0);
    }

    #[test]
    fn test_header_only_table_is_empty() {
        assert!(load_offerings(HEADER.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_model_results_with_published_headers() {
        let csv = "Modèle,RMSE,R²\nXGBoost,152.99,0.73\nRidge Regression,186.98,0.59";
        let results = load_model_results(csv.as_bytes()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], ModelResult::new("XGBoost", 152.99, 0.73));
    }

    #[test]
    fn test_model_results_missing_rmse() {
        let err = load_model_results("name,r2\nA,0.5".as_bytes()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { column: "RMSE" }));
    }

    #[test]
    fn test_model_results_negative_rmse() {
        let err = load_model_results("name,rmse,r2\nA,-3,0.5".as_bytes()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { .. }));
    }
}
