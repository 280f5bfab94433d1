// CoursePulse - app/report.rs
//
// Assembles one serialisable analysis report from the current state.
// The report is the single value handed to presentation code (text
// renderer, JSON export); it holds copies, not references into the state.

use crate::app::state::AnalysisState;
use crate::core::filter::FilterState;
use crate::core::model::{CategoryAggregate, EnrichedOffering, ModelResult};
use crate::core::models;
use crate::core::opportunity::{self, CategoryMetric};
use crate::core::outliers::IqrFence;
use crate::core::summary::{
    self, CertificationCount, DatasetOverview, DurationBandStat, OfferingMetric,
    TechnologyCatalog, TechnologyScore,
};
use crate::util::constants;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Knobs for report assembly.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Rows per ranking.
    pub top_k: usize,
}

/// A filtered offering flagged as a demand outlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierRow {
    pub title: String,
    pub category: String,
    pub demand_offers: u64,
}

/// Model comparison block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSection {
    /// `None` when no results were supplied; see `note`.
    pub best: Option<ModelResult>,
    /// Best-first ranking.
    pub ranking: Vec<ModelResult>,
    pub note: Option<String>,
}

impl ModelSection {
    fn from_results(results: &[ModelResult]) -> Self {
        match models::select_best_model(results) {
            Ok(best) => Self {
                best: Some(best.clone()),
                ranking: models::rank_models(results).into_iter().cloned().collect(),
                note: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Model comparison skipped");
                Self {
                    best: None,
                    ranking: Vec::new(),
                    note: Some(e.to_string()),
                }
            }
        }
    }
}

/// Everything the presentation layer shows for one snapshot + filter.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub fingerprint: String,
    pub filter: FilterState,

    pub overview: DatasetOverview,

    /// Categories ranked by opportunity score (top K).
    pub opportunities: Vec<CategoryAggregate>,
    /// Categories ranked by mean growth score (top K).
    pub growth_categories: Vec<CategoryAggregate>,
    /// Categories ranked by total demand (top K).
    pub demand_categories: Vec<CategoryAggregate>,
    /// Categories ranked by mean demand/student ratio (top K).
    pub ratio_categories: Vec<CategoryAggregate>,
    /// Every category of the filtered set, in label order.
    pub categories: Vec<CategoryAggregate>,

    pub outlier_fence: Option<IqrFence>,
    pub outliers: Vec<OutlierRow>,

    pub top_demand: Vec<EnrichedOffering>,
    pub top_ratio: Vec<EnrichedOffering>,
    pub top_growth: Vec<EnrichedOffering>,
    pub top_niche: Vec<EnrichedOffering>,

    /// Most frequent certification labels.
    pub certifications: Vec<CertificationCount>,
    pub duration_bands: Vec<DurationBandStat>,
    pub technologies: Vec<TechnologyScore>,

    pub models: ModelSection,

    /// Total offerings without a growth score.
    pub enrichment_failure_count: usize,
    /// Messages for the recorded failures.
    pub enrichment_failures: Vec<String>,
}

fn owned(rows: Vec<&EnrichedOffering>) -> Vec<EnrichedOffering> {
    rows.into_iter().cloned().collect()
}

/// Build the report for the state's current filter.
///
/// Offering-level rankings and technology scores cover the filtered subset;
/// niche scores were normalised over the whole snapshot.
pub fn build_report(
    state: &AnalysisState,
    model_results: &[ModelResult],
    catalog: &TechnologyCatalog,
    options: &ReportOptions,
) -> AnalysisReport {
    let filtered = state.filtered();
    let aggregates = state.aggregates();
    let snapshot = state.snapshot();

    let report = AnalysisReport {
        generated_at: Utc::now(),
        source: snapshot.source.display().to_string(),
        fingerprint: snapshot.fingerprint.clone(),
        filter: state.filter_state().clone(),
        overview: summary::overview(filtered),
        opportunities: opportunity::rank_opportunities(aggregates, options.top_k),
        growth_categories: opportunity::rank_categories_by(
            aggregates,
            CategoryMetric::MeanGrowth,
            options.top_k,
        ),
        demand_categories: opportunity::rank_categories_by(
            aggregates,
            CategoryMetric::TotalDemand,
            options.top_k,
        ),
        ratio_categories: opportunity::rank_categories_by(
            aggregates,
            CategoryMetric::MeanRatio,
            options.top_k,
        ),
        categories: aggregates.to_vec(),
        outlier_fence: state.outlier_fence(),
        outliers: state
            .outlier_rows()
            .map(|e| OutlierRow {
                title: e.offering.title.clone(),
                category: e.offering.category.clone(),
                demand_offers: e.offering.demand_offers,
            })
            .collect(),
        top_demand: owned(summary::top_offerings(filtered, OfferingMetric::Demand, options.top_k)),
        top_ratio: owned(summary::top_offerings(filtered, OfferingMetric::Ratio, options.top_k)),
        top_growth: owned(summary::top_offerings(filtered, OfferingMetric::Growth, options.top_k)),
        top_niche: owned(summary::top_offerings(filtered, OfferingMetric::Niche, options.top_k)),
        certifications: summary::certification_counts(filtered, constants::TOP_CERTIFICATIONS),
        duration_bands: summary::ratio_by_duration_band(filtered),
        technologies: summary::technology_scores(filtered, catalog),
        models: ModelSection::from_results(model_results),
        enrichment_failure_count: state.enrichment().failure_count(),
        enrichment_failures: state
            .enrichment()
            .failures
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    tracing::debug!(
        offerings = report.overview.offering_count,
        categories = report.categories.len(),
        outliers = report.outliers.len(),
        "Report built"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::snapshot::DatasetSnapshot;
    use crate::core::metrics::ZeroDurationPolicy;
    use std::path::Path;

    const TABLE: &str = "titre,categorie,demand_offres,duree_heures,certification,ratio_demande_etudiants\n\
                         Docker avancé,DevOps,300,30,CKA,1.0\n\
                         Kubernetes,DevOps,100,20,,1.0\n\
                         SEO,Marketing,50,10,non,2.0\n\
                         Atelier pitch,Soft skills,20,0,,1.0\n";

    fn state() -> AnalysisState {
        let snapshot = DatasetSnapshot::from_bytes(Path::new("offres.csv"), TABLE.as_bytes()).unwrap();
        AnalysisState::new(snapshot, ZeroDurationPolicy::Record, 1.5).unwrap()
    }

    #[test]
    fn test_report_sections() {
        let catalog = TechnologyCatalog::builtin().unwrap();
        let report = build_report(
            &state(),
            &ModelResult::reference_set(),
            &catalog,
            &ReportOptions { top_k: 2 },
        );

        assert_eq!(report.overview.offering_count, 4);
        assert_eq!(report.opportunities.len(), 2);
        // DevOps: (400/2)*1.0 = 200; Marketing: 50*2.0 = 100; Soft skills: 20
        assert_eq!(report.opportunities[0].category, "DevOps");
        assert_eq!(report.opportunities[1].category, "Marketing");
        assert_eq!(report.categories.len(), 3);
        assert_eq!(report.top_growth.len(), 2);
        assert_eq!(report.top_demand[0].offering.title, "Docker avancé");
        // SEO has the highest ratio (2.0); ties at 1.0 keep input order.
        let by_ratio: Vec<_> = report.top_ratio.iter().map(|e| e.offering.title.as_str()).collect();
        assert_eq!(by_ratio, vec!["SEO", "Docker avancé"]);
        // DevOps 400 > Marketing 50; Marketing leads on mean ratio.
        assert_eq!(report.demand_categories[0].category, "DevOps");
        assert_eq!(report.demand_categories[1].category, "Marketing");
        assert_eq!(report.ratio_categories[0].category, "Marketing");
        assert_eq!(report.ratio_categories[1].category, "DevOps");
        let certs: Vec<_> = report
            .certifications
            .iter()
            .map(|c| (c.label.as_str(), c.count))
            .collect();
        assert_eq!(certs, vec![("CKA", 1), ("non", 1)]);
        assert_eq!(report.models.best.as_ref().unwrap().name, "XGBoost");
        assert_eq!(report.models.ranking.len(), 6);
        assert_eq!(report.enrichment_failure_count, 1);
        assert_eq!(report.duration_bands.len(), 5);
        assert_eq!(report.technologies[0].family, "DevOps");
    }

    #[test]
    fn test_empty_model_set_is_reported_not_fatal() {
        let catalog = TechnologyCatalog::builtin().unwrap();
        let report = build_report(&state(), &[], &catalog, &ReportOptions { top_k: 5 });
        assert_eq!(report.models.best, None);
        assert!(report.models.note.is_some());
    }

    #[test]
    fn test_report_serialises() {
        let catalog = TechnologyCatalog::builtin().unwrap();
        let report = build_report(&state(), &[], &catalog, &ReportOptions { top_k: 5 });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["overview"]["offering_count"], 4);
        assert_eq!(json["filter"]["certification"], "all");
    }
}
