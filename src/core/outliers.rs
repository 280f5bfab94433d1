// CoursePulse - core/outliers.rs
//
// One-sided Tukey fence: a value is an outlier iff it exceeds
// Q3 + k * IQR. Only unusually high values are flagged.
//
// Quartiles use linear interpolation between order statistics at
// position (n - 1) * q, which is what most dataframe libraries default to.

use crate::core::model::OfferingRecord;
use crate::util::constants;
use serde::Serialize;
use std::collections::BTreeSet;

/// Quartiles and upper fence computed over one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrFence {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub upper_fence: f64,
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Finite entries of `values` in ascending order, or `None` if there are none.
fn sorted_finite(values: &[f64]) -> Option<Vec<f64>> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(sorted)
}

/// Quartiles and fence for `values` with the given IQR multiplier.
///
/// Non-finite entries are ignored; `None` when no finite value remains.
pub fn iqr_fence(values: &[f64], multiplier: f64) -> Option<IqrFence> {
    let sorted = sorted_finite(values)?;
    let q1 = quantile_sorted(&sorted, constants::LOWER_QUARTILE);
    let q3 = quantile_sorted(&sorted, constants::UPPER_QUARTILE);
    let iqr = q3 - q1;
    Some(IqrFence {
        q1,
        q3,
        iqr,
        upper_fence: q3 + multiplier * iqr,
    })
}

/// Indices of values strictly above the fence for `multiplier`.
pub fn detect_outliers_with(values: &[f64], multiplier: f64) -> BTreeSet<usize> {
    let Some(fence) = iqr_fence(values, multiplier) else {
        return BTreeSet::new();
    };
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > fence.upper_fence)
        .map(|(idx, _)| idx)
        .collect()
}

/// Indices of values above `Q3 + 1.5 * IQR`. Empty input yields an empty set.
pub fn detect_outliers(values: &[f64]) -> BTreeSet<usize> {
    detect_outliers_with(values, constants::DEFAULT_IQR_MULTIPLIER)
}

/// Demand outliers among offering rows (raw or enriched).
///
/// Returned indices point into `rows`.
pub fn detect_demand_outliers<T: OfferingRecord>(rows: &[T], multiplier: f64) -> BTreeSet<usize> {
    let demand: Vec<f64> = rows
        .iter()
        .map(|r| r.offering().demand_offers as f64)
        .collect();
    let flagged = detect_outliers_with(&demand, multiplier);
    tracing::debug!(rows = rows.len(), outliers = flagged.len(), "Demand outliers detected");
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::TrainingOffering;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_linear_quartiles_and_single_outlier() {
        let values = [10.0, 10.0, 12.0, 12.0, 13.0, 15.0, 100.0];
        let fence = iqr_fence(&values, 1.5).unwrap();
        assert!((fence.q1 - 11.0).abs() < EPS);
        assert!((fence.q3 - 14.0).abs() < EPS);
        assert!((fence.iqr - 3.0).abs() < EPS);
        assert!((fence.upper_fence - 18.5).abs() < EPS);
        assert_eq!(detect_outliers(&values), BTreeSet::from([6]));
    }

    #[test]
    fn test_indices_refer_to_unsorted_input() {
        let values = [100.0, 13.0, 10.0, 15.0, 12.0, 10.0, 12.0];
        assert_eq!(detect_outliers(&values), BTreeSet::from([0]));
    }

    #[test]
    fn test_low_values_are_never_flagged() {
        let values = [-500.0, 10.0, 11.0, 12.0, 13.0, 14.0];
        assert!(detect_outliers(&values).is_empty());
    }

    #[test]
    fn test_empty_and_tiny_inputs() {
        assert!(detect_outliers(&[]).is_empty());
        assert!(detect_outliers(&[42.0]).is_empty());
        assert!(detect_outliers(&[1.0, 1000.0]).is_empty());
        assert_eq!(iqr_fence(&[], 1.5), None);
    }

    #[test]
    fn test_quantile_interpolates() {
        assert_eq!(quantile_sorted(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5);
        assert_eq!(quantile_sorted(&[1.0, 4.0], 0.25), 1.75);
        assert_eq!(quantile_sorted(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn test_fence_ignores_non_finite_values() {
        assert_eq!(sorted_finite(&[3.0, f64::NAN, 1.0, f64::INFINITY]), Some(vec![1.0, 3.0]));
        assert_eq!(iqr_fence(&[f64::NAN], 1.5), None);
        let fence = iqr_fence(&[4.0, f64::NAN, 1.0, 2.0, 3.0], 1.5).unwrap();
        assert!((fence.q1 - 1.75).abs() < EPS);
        assert!((fence.q3 - 3.25).abs() < EPS);
        // NaN never compares above the fence.
        assert!(detect_outliers(&[f64::NAN, 1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_multiplier_widens_fence() {
        let values = [10.0, 10.0, 12.0, 12.0, 13.0, 15.0, 20.0];
        assert_eq!(detect_outliers_with(&values, 1.5), BTreeSet::from([6]));
        assert!(detect_outliers_with(&values, 3.0).is_empty());
    }

    #[test]
    fn test_demand_outliers_over_offerings() {
        let rows: Vec<TrainingOffering> = [5, 6, 7, 8, 9, 250]
            .iter()
            .map(|&d| TrainingOffering {
                title: format!("T{d}"),
                category: "X".to_string(),
                duration_hours: 10.0,
                demand_offers: d,
                certification: None,
                ratio_demand_students: 1.0,
            })
            .collect();
        assert_eq!(detect_demand_outliers(&rows, 1.5), BTreeSet::from([5]));
    }
}
