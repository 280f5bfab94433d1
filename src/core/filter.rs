// CoursePulse - core/filter.rs
//
// Composable filter engine for training offerings.
// All active filters are AND-combined.
// Core layer: pure logic, no I/O dependencies.

use crate::core::model::OfferingRecord;
use crate::util::error::FilterError;
use serde::Serialize;
use std::collections::BTreeSet;

/// Certification status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationFilter {
    #[default]
    All,
    Certified,
    NotCertified,
}

impl CertificationFilter {
    fn accepts(self, certified: bool) -> bool {
        match self {
            CertificationFilter::All => true,
            CertificationFilter::Certified => certified,
            CertificationFilter::NotCertified => !certified,
        }
    }
}

/// Complete filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    /// Categories to include, compared exactly (empty = all).
    pub categories: BTreeSet<String>,

    /// Minimum duration in hours (inclusive). None = no lower bound.
    pub min_duration: Option<f64>,

    /// Maximum duration in hours (inclusive). None = no upper bound.
    pub max_duration: Option<f64>,

    /// Certification status.
    pub certification: CertificationFilter,

    /// Minimum job-posting demand (inclusive). None = no lower bound.
    pub min_demand: Option<u64>,

    /// Substring title search (case-insensitive). Empty = no filter.
    pub title_search: String,
}

impl FilterState {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.min_duration.is_none()
            && self.max_duration.is_none()
            && self.certification == CertificationFilter::All
            && self.min_demand.is_none()
            && self.title_search.is_empty()
    }

    /// Set the inclusive duration bounds, validating them first.
    ///
    /// Bounds must be finite and non-negative, and `min <= max` when both
    /// are given. On error the previous bounds are kept.
    pub fn set_duration_range(
        &mut self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<(), FilterError> {
        let valid = |v: Option<f64>| v.map_or(true, |x| x.is_finite() && x >= 0.0);
        let ordered = match (min, max) {
            (Some(lo), Some(hi)) => lo <= hi,
            _ => true,
        };
        if !valid(min) || !valid(max) || !ordered {
            return Err(FilterError::InvalidDurationRange {
                min: min.unwrap_or(0.0),
                max: max.unwrap_or(f64::INFINITY),
            });
        }
        self.min_duration = min;
        self.max_duration = max;
        Ok(())
    }

    /// Create a quick-filter restricted to the given categories.
    pub fn categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Create a quick-filter for certified offerings only.
    pub fn certified_only() -> Self {
        Self {
            certification: CertificationFilter::Certified,
            ..Default::default()
        }
    }
}

/// Apply filters to a slice of rows, returning indices of matching rows.
///
/// Works on raw and enriched offerings alike. Indices refer to `rows`.
pub fn apply_filters<T: OfferingRecord>(rows: &[T], filter: &FilterState) -> Vec<usize> {
    if filter.is_empty() {
        return (0..rows.len()).collect();
    }

    let search_lower = filter.title_search.to_lowercase();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| matches_all(*row, filter, &search_lower))
        .map(|(idx, _)| idx)
        .collect()
}

/// Clone the rows at `indices` into a new subset, preserving order.
///
/// Out-of-range indices are skipped.
pub fn select<T: Clone>(rows: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().filter_map(|&idx| rows.get(idx)).cloned().collect()
}

/// Check if a single row matches all active filters.
fn matches_all<T: OfferingRecord>(row: &T, filter: &FilterState, search_lower: &str) -> bool {
    let offering = row.offering();

    // Category subset
    if !filter.categories.is_empty() && !filter.categories.contains(&offering.category) {
        return false;
    }

    // Duration range
    if let Some(min) = filter.min_duration {
        if offering.duration_hours < min {
            return false;
        }
    }
    if let Some(max) = filter.max_duration {
        if offering.duration_hours > max {
            return false;
        }
    }

    // Certification
    if !filter.certification.accepts(offering.has_certification()) {
        return false;
    }

    // Demand floor
    if let Some(min) = filter.min_demand {
        if offering.demand_offers < min {
            return false;
        }
    }

    // Title search (case-insensitive substring)
    if !search_lower.is_empty() && !offering.title.to_lowercase().contains(search_lower) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::TrainingOffering;

    fn make_offering(
        title: &str,
        category: &str,
        duration: f64,
        demand: u64,
        certification: Option<&str>,
    ) -> TrainingOffering {
        TrainingOffering {
            title: title.to_string(),
            category: category.to_string(),
            duration_hours: duration,
            demand_offers: demand,
            certification: certification.map(str::to_string),
            ratio_demand_students: 1.0,
        }
    }

    fn catalogue() -> Vec<TrainingOffering> {
        vec![
            make_offering("Python Data Science", "Data", 70.0, 300, Some("RNCP")),
            make_offering("SEO", "Marketing", 14.0, 40, Some("non")),
            make_offering("Docker", "DevOps", 21.0, 150, None),
            make_offering("Big Data", "Data", 120.0, 90, Some("")),
        ]
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let rows = catalogue();
        assert_eq!(apply_filters(&rows, &FilterState::default()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_category_filter_is_exact() {
        let rows = catalogue();
        assert_eq!(apply_filters(&rows, &FilterState::categories(["Data"])), vec![0, 3]);
        assert!(apply_filters(&rows, &FilterState::categories(["data"])).is_empty());
    }

    #[test]
    fn test_certification_filters() {
        let rows = catalogue();
        assert_eq!(apply_filters(&rows, &FilterState::certified_only()), vec![0]);
        let filter = FilterState {
            certification: CertificationFilter::NotCertified,
            ..Default::default()
        };
        assert_eq!(apply_filters(&rows, &filter), vec![1, 2, 3]);
    }

    #[test]
    fn test_duration_range_is_inclusive() {
        let rows = catalogue();
        let mut filter = FilterState::default();
        filter.set_duration_range(Some(14.0), Some(70.0)).unwrap();
        assert_eq!(apply_filters(&rows, &filter), vec![0, 1, 2]);
    }

    #[test]
    fn test_invalid_duration_range_keeps_previous() {
        let mut filter = FilterState::default();
        filter.set_duration_range(Some(5.0), None).unwrap();
        assert!(filter.set_duration_range(Some(50.0), Some(10.0)).is_err());
        assert!(filter.set_duration_range(Some(-1.0), None).is_err());
        assert!(filter.set_duration_range(None, Some(f64::NAN)).is_err());
        assert_eq!(filter.min_duration, Some(5.0));
        assert_eq!(filter.max_duration, None);
    }

    #[test]
    fn test_title_search_case_insensitive() {
        let rows = catalogue();
        let filter = FilterState {
            title_search: "DATA".to_string(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&rows, &filter), vec![0, 3]);
    }

    #[test]
    fn test_combined_filters() {
        let rows = catalogue();
        let filter = FilterState {
            categories: BTreeSet::from(["Data".to_string(), "DevOps".to_string()]),
            min_demand: Some(100),
            ..Default::default()
        };
        assert_eq!(apply_filters(&rows, &filter), vec![0, 2]);
    }

    #[test]
    fn test_select_materialises_subset() {
        let rows = catalogue();
        let subset = select(&rows, &[2, 0, 99]);
        assert_eq!(subset.len(), 2);
        assert_eq!(subset[0].title, "Docker");
        assert_eq!(subset[1].title, "Python Data Science");
    }
}
