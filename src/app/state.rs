// CoursePulse - app/state.rs
//
// Analysis state management. Holds one dataset snapshot, its enrichment,
// the current filter, and every structure derived from the filtered subset.
//
// Derived structures are only ever rebuilt from scratch: a filter change
// recomputes them from the enriched set, and a snapshot change re-enriches
// first. Nothing is patched incrementally.

use crate::app::snapshot::DatasetSnapshot;
use crate::core::aggregate;
use crate::core::filter::{self, FilterState};
use crate::core::metrics::{self, Enrichment, ZeroDurationPolicy};
use crate::core::model::{CategoryAggregate, EnrichedOffering};
use crate::core::outliers::{self, IqrFence};
use crate::util::error::MetricError;
use std::collections::BTreeSet;

/// Top-level analysis state.
#[derive(Debug)]
pub struct AnalysisState {
    /// Source table currently analysed.
    snapshot: DatasetSnapshot,

    /// Zero-duration handling used when (re-)enriching.
    policy: ZeroDurationPolicy,

    /// Tukey fence multiplier for demand outliers.
    iqr_multiplier: f64,

    /// Whole-snapshot enrichment; niche scores use the snapshot-wide maximum.
    enrichment: Enrichment,

    /// Current filter configuration.
    filter_state: FilterState,

    /// Indices of enriched offerings matching the filter.
    filtered_indices: Vec<usize>,

    /// Materialised filtered subset, in snapshot order.
    filtered: Vec<EnrichedOffering>,

    /// Per-category aggregates of the filtered subset.
    aggregates: Vec<CategoryAggregate>,

    /// Demand fence over the filtered subset (None when it is empty).
    outlier_fence: Option<IqrFence>,

    /// Indices into `filtered` of demand outliers.
    outliers: BTreeSet<usize>,
}

impl AnalysisState {
    /// Enrich `snapshot` and compute every derived structure with no filter.
    pub fn new(
        snapshot: DatasetSnapshot,
        policy: ZeroDurationPolicy,
        iqr_multiplier: f64,
    ) -> Result<Self, MetricError> {
        let enrichment = metrics::enrich(&snapshot.offerings, policy)?;
        let mut state = Self {
            snapshot,
            policy,
            iqr_multiplier,
            enrichment,
            filter_state: FilterState::default(),
            filtered_indices: Vec::new(),
            filtered: Vec::new(),
            aggregates: Vec::new(),
            outlier_fence: None,
            outliers: BTreeSet::new(),
        };
        state.apply_filters();
        Ok(state)
    }

    /// Replace the filter and recompute.
    pub fn set_filter(&mut self, filter_state: FilterState) {
        self.filter_state = filter_state;
        self.apply_filters();
    }

    /// Recompute the filtered subset and everything derived from it.
    pub fn apply_filters(&mut self) {
        let enriched = &self.enrichment.offerings;
        self.filtered_indices = filter::apply_filters(enriched, &self.filter_state);
        self.filtered = filter::select(enriched, &self.filtered_indices);
        self.aggregates = aggregate::aggregate_by_category(&self.filtered);

        let demand: Vec<f64> = self
            .filtered
            .iter()
            .map(|e| e.offering.demand_offers as f64)
            .collect();
        self.outlier_fence = outliers::iqr_fence(&demand, self.iqr_multiplier);
        self.outliers = outliers::detect_demand_outliers(&self.filtered, self.iqr_multiplier);

        tracing::debug!(
            matched = self.filtered.len(),
            total = enriched.len(),
            categories = self.aggregates.len(),
            outliers = self.outliers.len(),
            "Filters applied"
        );
    }

    /// Switch to a new snapshot, discarding everything derived from the old one.
    ///
    /// The filter is kept. Passing a snapshot of the same version is a no-op.
    /// On an enrichment failure the previous state is left untouched.
    pub fn replace_snapshot(&mut self, snapshot: DatasetSnapshot) -> Result<(), MetricError> {
        if self.snapshot.same_version(&snapshot) && self.snapshot.source == snapshot.source {
            return Ok(());
        }
        let enrichment = metrics::enrich(&snapshot.offerings, self.policy)?;
        tracing::info!(
            fingerprint = %snapshot.fingerprint,
            offerings = snapshot.offerings.len(),
            "Snapshot replaced; recomputing derived data"
        );
        self.snapshot = snapshot;
        self.enrichment = enrichment;
        self.apply_filters();
        Ok(())
    }

    pub fn snapshot(&self) -> &DatasetSnapshot {
        &self.snapshot
    }

    pub fn enrichment(&self) -> &Enrichment {
        &self.enrichment
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter_state
    }

    /// Indices into `enrichment().offerings` of the filtered rows.
    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered_indices
    }

    pub fn filtered(&self) -> &[EnrichedOffering] {
        &self.filtered
    }

    pub fn aggregates(&self) -> &[CategoryAggregate] {
        &self.aggregates
    }

    pub fn outlier_fence(&self) -> Option<IqrFence> {
        self.outlier_fence
    }

    /// Filtered rows flagged as demand outliers, in snapshot order.
    pub fn outlier_rows(&self) -> impl Iterator<Item = &EnrichedOffering> {
        self.outliers.iter().filter_map(|&idx| self.filtered.get(idx))
    }

    /// Distinct category labels in the whole snapshot, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.snapshot
            .offerings
            .iter()
            .map(|o| o.category.as_str())
            .collect()
    }
}
