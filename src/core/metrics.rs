// CoursePulse - core/metrics.rs
//
// Per-offering derived metrics: certification status, growth score and
// niche score. Pure functions of their inputs; the loaded offerings are
// never modified, enrichment always produces new values.

use crate::core::model::{EnrichedOffering, TrainingOffering};
use crate::util::constants;
use crate::util::error::MetricError;
use serde::Serialize;

/// What `enrich` does when an offering has a zero duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroDurationPolicy {
    /// Keep the offering with an undefined growth score, record the failure
    /// and continue with the batch.
    #[default]
    Record,

    /// Stop at the first failure and return it.
    Abort,
}

/// Output of a batch enrichment.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    /// One enriched row per input offering, in input order.
    pub offerings: Vec<EnrichedOffering>,

    /// Per-record failures, capped at `MAX_RECORDED_METRIC_FAILURES`.
    pub failures: Vec<MetricError>,

    /// Failures beyond the cap (counted, not stored).
    pub suppressed_failures: usize,
}

impl Enrichment {
    /// Total number of per-record failures, including suppressed ones.
    pub fn failure_count(&self) -> usize {
        self.failures.len() + self.suppressed_failures
    }
}

/// True iff the label is present, non-empty and not the literal "non".
///
/// The comparison is case-sensitive: "Non" counts as a certification label.
pub fn has_certification(certification: Option<&str>) -> bool {
    match certification {
        Some(label) => !label.is_empty() && label != constants::NO_CERTIFICATION_MARKER,
        None => false,
    }
}

/// `ratio * demand / duration`, or `None` when the duration is zero.
pub fn growth_score(offering: &TrainingOffering) -> Option<f64> {
    if offering.duration_hours == 0.0 {
        return None;
    }
    Some(offering.ratio_demand_students * offering.demand_offers as f64 / offering.duration_hours)
}

/// `ratio * (demand / max_demand)`; 0 when `max_demand` is 0.
pub fn niche_score(offering: &TrainingOffering, max_demand: u64) -> f64 {
    if max_demand == 0 {
        return 0.0;
    }
    offering.ratio_demand_students * (offering.demand_offers as f64 / max_demand as f64)
}

/// Largest `demand_offers` in the batch (0 for an empty batch).
pub fn max_demand(offerings: &[TrainingOffering]) -> u64 {
    offerings.iter().map(|o| o.demand_offers).max().unwrap_or(0)
}

fn derive(offering: &TrainingOffering, max_demand: u64) -> EnrichedOffering {
    EnrichedOffering {
        offering: offering.clone(),
        has_certification: has_certification(offering.certification.as_deref()),
        growth_score: growth_score(offering),
        niche_score: niche_score(offering, max_demand),
    }
}

/// Enrich a single offering, failing if its growth score is undefined.
///
/// `index` identifies the record in error reports.
pub fn enrich_offering(
    index: usize,
    offering: &TrainingOffering,
    max_demand: u64,
) -> Result<EnrichedOffering, MetricError> {
    let enriched = derive(offering, max_demand);
    if enriched.growth_score.is_none() {
        return Err(MetricError::DivisionByZero {
            index,
            title: offering.title.clone(),
        });
    }
    Ok(enriched)
}

/// Enrich a whole batch. The niche normalisation uses the batch maximum.
///
/// Under `ZeroDurationPolicy::Record` this never fails; under `Abort` the
/// first zero-duration offering is returned as the error.
pub fn enrich(
    offerings: &[TrainingOffering],
    policy: ZeroDurationPolicy,
) -> Result<Enrichment, MetricError> {
    let max = max_demand(offerings);
    let mut result = Enrichment {
        offerings: Vec::with_capacity(offerings.len()),
        ..Default::default()
    };

    for (index, offering) in offerings.iter().enumerate() {
        let enriched = derive(offering, max);
        if enriched.growth_score.is_none() {
            let e = MetricError::DivisionByZero {
                index,
                title: offering.title.clone(),
            };
            if policy == ZeroDurationPolicy::Abort {
                return Err(e);
            }
            tracing::debug!(index, title = %offering.title, "Growth score undefined");
            if result.failures.len() < constants::MAX_RECORDED_METRIC_FAILURES {
                result.failures.push(e);
            } else {
                result.suppressed_failures += 1;
            }
        }
        result.offerings.push(enriched);
    }

    if result.failure_count() > 0 {
        tracing::warn!(
            failures = result.failure_count(),
            total = offerings.len(),
            "Some offerings have no growth score (zero duration)"
        );
    }
    tracing::debug!(offerings = result.offerings.len(), max_demand = max, "Enrichment complete");

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn make_offering(title: &str, duration: f64, demand: u64, ratio: f64) -> TrainingOffering {
        TrainingOffering {
            title: title.to_string(),
            category: "Data".to_string(),
            duration_hours: duration,
            demand_offers: demand,
            certification: None,
            ratio_demand_students: ratio,
        }
    }

    #[test]
    fn test_certification_markers() {
        assert!(has_certification(Some("RNCP niveau 6")));
        assert!(has_certification(Some("Non")));
        assert!(!has_certification(Some("non")));
        assert!(!has_certification(Some("")));
        assert!(!has_certification(None));
    }

    #[test]
    fn test_growth_score_formula() {
        let o = make_offering("SQL", 40.0, 200, 1.5);
        let score = growth_score(&o).unwrap();
        assert!((score - 1.5 * 200.0 / 40.0).abs() < EPS);
    }

    #[test]
    fn test_growth_score_undefined_for_zero_duration() {
        let o = make_offering("Atelier", 0.0, 50, 2.0);
        assert_eq!(growth_score(&o), None);
        let err = enrich_offering(3, &o, 50).unwrap_err();
        assert_eq!(
            err,
            MetricError::DivisionByZero {
                index: 3,
                title: "Atelier".to_string()
            }
        );
    }

    #[test]
    fn test_niche_score_normalised_by_batch_max() {
        let offerings = vec![
            make_offering("A", 10.0, 100, 2.0),
            make_offering("B", 10.0, 25, 4.0),
        ];
        let result = enrich(&offerings, ZeroDurationPolicy::Record).unwrap();
        assert!((result.offerings[0].niche_score - 2.0).abs() < EPS);
        assert!((result.offerings[1].niche_score - 1.0).abs() < EPS);
    }

    #[test]
    fn test_niche_score_zero_when_all_demand_zero() {
        let offerings = vec![
            make_offering("A", 10.0, 0, 2.0),
            make_offering("B", 20.0, 0, 4.0),
        ];
        let result = enrich(&offerings, ZeroDurationPolicy::Record).unwrap();
        assert!(result.offerings.iter().all(|e| e.niche_score == 0.0));
    }

    #[test]
    fn test_record_policy_keeps_row_and_continues() {
        let offerings = vec![
            make_offering("A", 10.0, 100, 1.0),
            make_offering("B", 0.0, 80, 1.0),
            make_offering("C", 20.0, 40, 1.0),
        ];
        let result = enrich(&offerings, ZeroDurationPolicy::Record).unwrap();
        assert_eq!(result.offerings.len(), 3);
        assert_eq!(result.offerings[1].growth_score, None);
        assert!((result.offerings[1].niche_score - 0.8).abs() < EPS);
        assert_eq!(result.failure_count(), 1);
        assert!(result.offerings[2].growth_score.is_some());
    }

    #[test]
    fn test_recorded_row_matches_single_enrichment() {
        let offerings = vec![
            make_offering("A", 10.0, 100, 1.0),
            make_offering("B", 0.0, 50, 3.0),
        ];
        let result = enrich(&offerings, ZeroDurationPolicy::Record).unwrap();
        let b = &result.offerings[1];
        assert_eq!(b.offering, offerings[1]);
        assert!(!b.has_certification);
        assert_eq!(b.growth_score, None);
        assert!((b.niche_score - 1.5).abs() < EPS);
        // The stored failure names the same row that was kept.
        assert_eq!(
            result.failures,
            vec![MetricError::DivisionByZero {
                index: 1,
                title: "B".to_string()
            }]
        );
    }

    #[test]
    fn test_abort_policy_returns_first_failure() {
        let offerings = vec![
            make_offering("A", 10.0, 100, 1.0),
            make_offering("B", 0.0, 80, 1.0),
            make_offering("C", 0.0, 40, 1.0),
        ];
        let err = enrich(&offerings, ZeroDurationPolicy::Abort).unwrap_err();
        assert!(matches!(err, MetricError::DivisionByZero { index: 1, .. }));
    }

    #[test]
    fn test_enrich_empty_batch() {
        let result = enrich(&[], ZeroDurationPolicy::Abort).unwrap();
        assert!(result.offerings.is_empty());
        assert_eq!(result.failure_count(), 0);
    }

    #[test]
    fn test_enrich_preserves_input_order_and_fields() {
        let mut o = make_offering("Cloud AWS", 30.0, 60, 0.5);
        o.certification = Some("AWS".to_string());
        let result = enrich(std::slice::from_ref(&o), ZeroDurationPolicy::Record).unwrap();
        assert_eq!(result.offerings[0].offering, o);
        assert!(result.offerings[0].has_certification);
    }
}
