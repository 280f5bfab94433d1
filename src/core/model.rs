// CoursePulse - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::Serialize;

// =============================================================================
// Training offering (normalised output of ingestion)
// =============================================================================

/// One catalogued training course, as loaded from the source table.
///
/// Values are validated at ingestion: `title` is non-empty, `duration_hours`
/// and `ratio_demand_students` are finite and non-negative. A zero duration
/// is accepted here and surfaces later as a metric failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingOffering {
    /// Course title.
    pub title: String,

    /// Raw category label. Grouping compares this string exactly.
    pub category: String,

    /// Course length in hours.
    pub duration_hours: f64,

    /// Number of matching job postings.
    pub demand_offers: u64,

    /// Certification label. `None`, `""` and `"non"` all mean uncertified.
    pub certification: Option<String>,

    /// Market demand per enrolled student, supplied upstream.
    pub ratio_demand_students: f64,
}

impl TrainingOffering {
    /// Whether this offering leads to a certification.
    pub fn has_certification(&self) -> bool {
        crate::core::metrics::has_certification(self.certification.as_deref())
    }
}

/// Read access to the underlying offering for raw and enriched rows alike.
///
/// Filtering, outlier detection and the overview operate on either shape.
pub trait OfferingRecord {
    fn offering(&self) -> &TrainingOffering;
}

impl OfferingRecord for TrainingOffering {
    fn offering(&self) -> &TrainingOffering {
        self
    }
}

impl OfferingRecord for EnrichedOffering {
    fn offering(&self) -> &TrainingOffering {
        &self.offering
    }
}

impl<T: OfferingRecord + ?Sized> OfferingRecord for &T {
    fn offering(&self) -> &TrainingOffering {
        (**self).offering()
    }
}

// =============================================================================
// Enriched offering
// =============================================================================

/// An offering plus its derived per-record metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedOffering {
    #[serde(flatten)]
    pub offering: TrainingOffering,

    pub has_certification: bool,

    /// `ratio * demand / duration`. `None` when the duration is zero.
    pub growth_score: Option<f64>,

    /// `ratio * demand / max_demand` over the enriched batch, or 0 when the
    /// batch maximum is 0.
    pub niche_score: f64,
}

// =============================================================================
// Category aggregate
// =============================================================================

/// Summary statistics for one category of a filtered offering set.
///
/// Always rebuilt from scratch from the offerings it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAggregate {
    pub category: String,

    /// Sum of `demand_offers` over the group.
    pub total_demand: u64,

    pub mean_demand: f64,

    /// Number of offerings in the group (never 0).
    pub offering_count: usize,

    pub mean_duration: f64,

    pub mean_ratio: f64,

    /// Mean over members with a defined growth score; `None` if there are none.
    pub mean_growth_score: Option<f64>,

    /// `(total_demand / offering_count) * mean_ratio`.
    pub opportunity_score: f64,
}

// =============================================================================
// Model evaluation result
// =============================================================================

/// Pre-computed evaluation of one demand-prediction model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelResult {
    pub name: String,

    /// Root mean squared error; lower is better.
    pub rmse: f64,

    /// Coefficient of determination; higher is better.
    pub r2: f64,
}

impl ModelResult {
    pub fn new(name: impl Into<String>, rmse: f64, r2: f64) -> Self {
        Self {
            name: name.into(),
            rmse,
            r2,
        }
    }

    /// The evaluation table published alongside the demand dataset.
    ///
    /// Used when no model-results file is supplied.
    pub fn reference_set() -> Vec<ModelResult> {
        vec![
            ModelResult::new("Linear Regression", 161.80, 0.69),
            ModelResult::new("Ridge Regression", 186.98, 0.59),
            ModelResult::new("Lasso Regression", 194.05, 0.56),
            ModelResult::new("Random Forest", 198.20, 0.54),
            ModelResult::new("Gradient Boosting", 167.35, 0.67),
            ModelResult::new("XGBoost", 152.99, 0.73),
        ]
    }
}
