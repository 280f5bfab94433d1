// CoursePulse - core/aggregate.rs
//
// Groups enriched offerings by their raw category label and computes
// sum/mean/count statistics per group.
//
// Category labels are compared byte-for-byte: "Data" and "data " form two
// separate groups. Output is in ascending label order; ranking belongs to
// core::opportunity.

use crate::core::model::{CategoryAggregate, EnrichedOffering};
use crate::core::opportunity;
use std::collections::BTreeMap;

#[derive(Default)]
struct Accumulator {
    count: usize,
    total_demand: u64,
    total_duration: f64,
    total_ratio: f64,
    total_growth: f64,
    growth_count: usize,
}

impl Accumulator {
    fn push(&mut self, row: &EnrichedOffering) {
        self.count += 1;
        self.total_demand = self.total_demand.saturating_add(row.offering.demand_offers);
        self.total_duration += row.offering.duration_hours;
        self.total_ratio += row.offering.ratio_demand_students;
        if let Some(growth) = row.growth_score {
            self.total_growth += growth;
            self.growth_count += 1;
        }
    }

    fn finish(self, category: &str) -> CategoryAggregate {
        let n = self.count as f64;
        let mut aggregate = CategoryAggregate {
            category: category.to_string(),
            total_demand: self.total_demand,
            mean_demand: self.total_demand as f64 / n,
            offering_count: self.count,
            mean_duration: self.total_duration / n,
            mean_ratio: self.total_ratio / n,
            mean_growth_score: (self.growth_count > 0)
                .then(|| self.total_growth / self.growth_count as f64),
            opportunity_score: 0.0,
        };
        aggregate.opportunity_score = opportunity::opportunity_score(&aggregate);
        aggregate
    }
}

/// One aggregate per distinct category present in `rows`.
///
/// Categories absent from the input produce no row, so every aggregate has
/// `offering_count >= 1`. An empty input yields an empty vector.
pub fn aggregate_by_category(rows: &[EnrichedOffering]) -> Vec<CategoryAggregate> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.offering.category.as_str())
            .or_default()
            .push(row);
    }

    let aggregates: Vec<CategoryAggregate> = groups
        .into_iter()
        .map(|(category, acc)| acc.finish(category))
        .collect();

    tracing::debug!(
        rows = rows.len(),
        categories = aggregates.len(),
        "Category aggregation complete"
    );
    aggregates
}
