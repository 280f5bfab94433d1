// CoursePulse - core/export.rs
//
// CSV export of category aggregates and JSON export of analysis reports.
// Core layer: writes to any Write trait object; the path is only used for
// error context.

use crate::core::model::CategoryAggregate;
use crate::util::constants;
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Export category aggregates to CSV format.
///
/// Writes: category, offering_count, total_demand, mean_demand, mean_duration,
/// mean_ratio, mean_growth_score, opportunity_score. Rows are written in the
/// order given, so pass a ranked slice to get a ranked file.
pub fn export_aggregates_csv<W: Write>(
    aggregates: &[CategoryAggregate],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    if aggregates.len() > constants::MAX_EXPORT_ROWS {
        return Err(ExportError::TooManyRows {
            count: aggregates.len(),
            max: constants::MAX_EXPORT_ROWS,
        });
    }

    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "category",
            "offering_count",
            "total_demand",
            "mean_demand",
            "mean_duration",
            "mean_ratio",
            "mean_growth_score",
            "opportunity_score",
        ])
        .map_err(csv_err)?;

    let mut count = 0;
    for agg in aggregates {
        csv_writer
            .write_record([
                agg.category.as_str(),
                &agg.offering_count.to_string(),
                &agg.total_demand.to_string(),
                &agg.mean_demand.to_string(),
                &agg.mean_duration.to_string(),
                &agg.mean_ratio.to_string(),
                &fmt_opt(agg.mean_growth_score),
                &agg.opportunity_score.to_string(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(rows = count, path = %export_path.display(), "Aggregates exported");
    Ok(count)
}

/// Export any serialisable report as pretty-printed JSON.
pub fn export_report_json<W: Write, T: Serialize>(
    report: &T,
    writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, report).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })
}
