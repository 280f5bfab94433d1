// CoursePulse - core/summary.rs
//
// Dataset-level views over an offering set: headline figures, top offerings
// by a metric, ratio by duration band, and growth rolled up by technology
// keyword family.

use crate::core::model::{EnrichedOffering, OfferingRecord};
use crate::util::constants;
use crate::util::error::FilterError;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// =============================================================================
// Overview
// =============================================================================

/// Headline figures for an offering set. Means are `None` for an empty set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub offering_count: usize,
    pub total_demand: u64,
    pub mean_demand: Option<f64>,
    pub mean_duration: Option<f64>,
    pub mean_ratio: Option<f64>,
    /// Share of certified offerings, in percent.
    pub certified_share_pct: Option<f64>,
}

pub fn overview<T: OfferingRecord>(rows: &[T]) -> DatasetOverview {
    let count = rows.len();
    let mut total_demand = 0u64;
    let mut total_duration = 0.0;
    let mut total_ratio = 0.0;
    let mut certified = 0usize;

    for row in rows {
        let o = row.offering();
        total_demand = total_demand.saturating_add(o.demand_offers);
        total_duration += o.duration_hours;
        total_ratio += o.ratio_demand_students;
        if o.has_certification() {
            certified += 1;
        }
    }

    let mean = |total: f64| (count > 0).then(|| total / count as f64);
    DatasetOverview {
        offering_count: count,
        total_demand,
        mean_demand: mean(total_demand as f64),
        mean_duration: mean(total_duration),
        mean_ratio: mean(total_ratio),
        certified_share_pct: mean(certified as f64 * 100.0),
    }
}

// =============================================================================
// Top offerings
// =============================================================================

/// Per-offering metric used by `top_offerings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferingMetric {
    Demand,
    Ratio,
    Growth,
    Niche,
}

impl OfferingMetric {
    fn value(self, row: &EnrichedOffering) -> Option<f64> {
        match self {
            OfferingMetric::Demand => Some(row.offering.demand_offers as f64),
            OfferingMetric::Ratio => Some(row.offering.ratio_demand_students),
            OfferingMetric::Growth => row.growth_score,
            OfferingMetric::Niche => Some(row.niche_score),
        }
    }
}

/// The `k` rows with the largest `metric`, largest first.
///
/// Ties keep input order. Rows without a value for the metric (undefined
/// growth score) are left out.
pub fn top_offerings(
    rows: &[EnrichedOffering],
    metric: OfferingMetric,
    k: usize,
) -> Vec<&EnrichedOffering> {
    let mut scored: Vec<(f64, &EnrichedOffering)> = rows
        .iter()
        .filter_map(|row| metric.value(row).map(|v| (v, row)))
        .collect();
    // Stable sort: equal values stay in input order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(k).map(|(_, row)| row).collect()
}

// =============================================================================
// Certifications
// =============================================================================

/// Number of offerings carrying one certification label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificationCount {
    pub label: String,
    pub count: usize,
}

/// The `k` most frequent certification labels, most frequent first.
///
/// Labels are counted verbatim, the "non" marker included; absent labels are
/// not. Equal counts are ordered by label.
pub fn certification_counts<T: OfferingRecord>(rows: &[T], k: usize) -> Vec<CertificationCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        if let Some(label) = row.offering().certification.as_deref() {
            if !label.is_empty() {
                *counts.entry(label).or_default() += 1;
            }
        }
    }

    // Stable sort over label-ordered entries.
    let mut ranked: Vec<CertificationCount> = counts
        .into_iter()
        .map(|(label, count)| CertificationCount {
            label: label.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(k);
    ranked
}

// =============================================================================
// Duration bands
// =============================================================================

/// Ratio statistics for one right-inclusive duration band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationBandStat {
    pub label: &'static str,
    /// Exclusive lower edge in hours.
    pub lower_hours: f64,
    /// Inclusive upper edge in hours.
    pub upper_hours: f64,
    pub offering_count: usize,
    /// `None` when the band is empty.
    pub mean_ratio: Option<f64>,
}

fn band_index(duration: f64) -> Option<usize> {
    constants::DURATION_BAND_EDGES
        .windows(2)
        .position(|edges| duration > edges[0] && duration <= edges[1])
}

/// Mean demand/student ratio per duration band.
///
/// All bands are returned in ascending order, empty ones included. Durations
/// outside (0, 1000] fall in no band.
pub fn ratio_by_duration_band<T: OfferingRecord>(rows: &[T]) -> Vec<DurationBandStat> {
    let band_count = constants::DURATION_BAND_LABELS.len();
    let mut totals = vec![(0usize, 0.0f64); band_count];

    for row in rows {
        let o = row.offering();
        if let Some(idx) = band_index(o.duration_hours) {
            totals[idx].0 += 1;
            totals[idx].1 += o.ratio_demand_students;
        }
    }

    totals
        .into_iter()
        .enumerate()
        .map(|(idx, (count, sum))| DurationBandStat {
            label: constants::DURATION_BAND_LABELS[idx],
            lower_hours: constants::DURATION_BAND_EDGES[idx],
            upper_hours: constants::DURATION_BAND_EDGES[idx + 1],
            offering_count: count,
            mean_ratio: (count > 0).then(|| sum / count as f64),
        })
        .collect()
}

// =============================================================================
// Technology families
// =============================================================================

/// A named set of title keywords, compiled to case-insensitive matchers.
#[derive(Debug, Clone)]
pub struct TechnologyFamily {
    pub name: String,
    matchers: Vec<Regex>,
}

/// Keyword families used to roll growth scores up by technology.
#[derive(Debug, Clone)]
pub struct TechnologyCatalog {
    families: Vec<TechnologyFamily>,
}

impl TechnologyCatalog {
    /// Compile a catalogue from `(family, keywords)` pairs.
    ///
    /// Keywords are literal text (regex metacharacters are escaped).
    pub fn new<I, K>(families: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (String, K)>,
        K: IntoIterator<Item = String>,
    {
        let mut compiled = Vec::new();
        for (name, keywords) in families {
            let mut matchers = Vec::new();
            for keyword in keywords {
                let regex = RegexBuilder::new(&regex::escape(&keyword))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| FilterError::InvalidKeyword {
                        family: name.clone(),
                        keyword: keyword.clone(),
                        source: e,
                    })?;
                matchers.push(regex);
            }
            compiled.push(TechnologyFamily { name, matchers });
        }
        Ok(Self { families: compiled })
    }

    /// The built-in families from `DEFAULT_TECHNOLOGY_FAMILIES`.
    pub fn builtin() -> Result<Self, FilterError> {
        Self::new(constants::DEFAULT_TECHNOLOGY_FAMILIES.iter().map(|(name, keywords)| {
            (
                (*name).to_string(),
                keywords.iter().map(|k| (*k).to_string()).collect::<Vec<_>>(),
            )
        }))
    }

    pub fn families(&self) -> &[TechnologyFamily] {
        &self.families
    }
}

/// Summed growth score for one technology family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnologyScore {
    pub family: String,
    pub score: f64,
    /// Keyword hits across all offerings (one offering may hit several).
    pub matches: usize,
}

/// Growth score per technology family, highest first (ties by name).
///
/// Each keyword contributes the growth of every offering whose title
/// contains it, so an offering matching two keywords of a family counts
/// twice. Undefined growth scores contribute 0.
pub fn technology_scores(
    rows: &[EnrichedOffering],
    catalog: &TechnologyCatalog,
) -> Vec<TechnologyScore> {
    let mut scores: Vec<TechnologyScore> = catalog
        .families
        .iter()
        .map(|family| {
            let mut score = 0.0;
            let mut matches = 0;
            for matcher in &family.matchers {
                for row in rows.iter().filter(|r| matcher.is_match(&r.offering.title)) {
                    score += row.growth_score.unwrap_or(0.0);
                    matches += 1;
                }
            }
            TechnologyScore {
                family: family.name.clone(),
                score,
                matches,
            }
        })
        .collect();

    scores.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.family.cmp(&b.family),
        other => other,
    });
    scores
}
