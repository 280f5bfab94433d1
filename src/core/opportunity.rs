// CoursePulse - core/opportunity.rs
//
// Category opportunity scoring and deterministic ranking.
//
// Every ranking here sorts descending by its metric and breaks ties by
// ascending category label, so equal scores always come out in the same
// order regardless of input order.

use crate::core::model::CategoryAggregate;
use serde::Serialize;
use std::cmp::Ordering;

/// `(total_demand / offering_count) * mean_ratio`.
///
/// Aggregates never have a zero count, so no guard is needed.
pub fn opportunity_score(aggregate: &CategoryAggregate) -> f64 {
    (aggregate.total_demand as f64 / aggregate.offering_count as f64) * aggregate.mean_ratio
}

/// Category-level metric a ranking can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMetric {
    Opportunity,
    TotalDemand,
    MeanRatio,
    MeanGrowth,
}

impl CategoryMetric {
    /// Metric value for one aggregate. `None` sorts after every value.
    fn value(self, aggregate: &CategoryAggregate) -> Option<f64> {
        match self {
            CategoryMetric::Opportunity => Some(opportunity_score(aggregate)),
            CategoryMetric::TotalDemand => Some(aggregate.total_demand as f64),
            CategoryMetric::MeanRatio => Some(aggregate.mean_ratio),
            CategoryMetric::MeanGrowth => aggregate.mean_growth_score,
        }
    }
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Rank aggregates by `metric`, returning at most `top_k` rows.
///
/// Opportunity scores are recomputed from the aggregate fields so the
/// returned rows always satisfy the scoring formula.
pub fn rank_categories_by(
    aggregates: &[CategoryAggregate],
    metric: CategoryMetric,
    top_k: usize,
) -> Vec<CategoryAggregate> {
    let mut ranked: Vec<CategoryAggregate> = aggregates
        .iter()
        .cloned()
        .map(|mut a| {
            a.opportunity_score = opportunity_score(&a);
            a
        })
        .collect();

    ranked.sort_by(|a, b| {
        descending(metric.value(a), metric.value(b)).then_with(|| a.category.cmp(&b.category))
    });
    ranked.truncate(top_k);
    ranked
}

/// Top `top_k` categories by opportunity score.
///
/// Requesting more rows than exist returns all of them.
pub fn rank_opportunities(aggregates: &[CategoryAggregate], top_k: usize) -> Vec<CategoryAggregate> {
    rank_categories_by(aggregates, CategoryMetric::Opportunity, top_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_agg(category: &str, total: u64, count: usize, ratio: f64) -> CategoryAggregate {
        CategoryAggregate {
            category: category.to_string(),
            total_demand: total,
            mean_demand: total as f64 / count as f64,
            offering_count: count,
            mean_duration: 10.0,
            mean_ratio: ratio,
            mean_growth_score: None,
            opportunity_score: 0.0,
        }
    }

    #[test]
    fn test_opportunity_formula() {
        let agg = make_agg("Data", 900, 3, 0.4);
        assert!((opportunity_score(&agg) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_descending_by_score() {
        let aggs = vec![
            make_agg("Marketing", 100, 1, 1.0),
            make_agg("Data", 400, 1, 1.0),
            make_agg("Web", 200, 1, 1.0),
        ];
        let ranked = rank_opportunities(&aggs, 10);
        let names: Vec<_> = ranked.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(names, vec!["Data", "Web", "Marketing"]);
        assert!((ranked[0].opportunity_score - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let aggs = vec![
            make_agg("Zeta", 100, 2, 1.0),
            make_agg("Alpha", 50, 1, 1.0),
            make_agg("Mid", 150, 3, 1.0),
        ];
        let ranked = rank_opportunities(&aggs, 3);
        let names: Vec<_> = ranked.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_top_k_truncates_and_saturates() {
        let aggs = vec![
            make_agg("A", 3, 1, 1.0),
            make_agg("B", 2, 1, 1.0),
            make_agg("C", 1, 1, 1.0),
        ];
        assert_eq!(rank_opportunities(&aggs, 2).len(), 2);
        assert_eq!(rank_opportunities(&aggs, 50).len(), 3);
        assert!(rank_opportunities(&aggs, 0).is_empty());
        assert!(rank_opportunities(&[], 5).is_empty());
    }

    #[test]
    fn test_mean_growth_ranking_puts_undefined_last() {
        let mut with_growth = make_agg("B", 1, 1, 1.0);
        with_growth.mean_growth_score = Some(0.5);
        let without = make_agg("A", 1, 1, 1.0);
        let ranked = rank_categories_by(&[without, with_growth], CategoryMetric::MeanGrowth, 2);
        assert_eq!(ranked[0].category, "B");
        assert_eq!(ranked[1].category, "A");
    }

    #[test]
    fn test_rank_by_total_demand() {
        let aggs = vec![make_agg("A", 10, 5, 9.0), make_agg("B", 20, 1, 0.1)];
        let ranked = rank_categories_by(&aggs, CategoryMetric::TotalDemand, 1);
        assert_eq!(ranked[0].category, "B");
    }
}
