// CoursePulse - render.rs
//
// Plain-text rendering of an analysis report for the terminal.
// Binary-side presentation only; all numbers come precomputed in the report.

use coursepulse::app::report::AnalysisReport;
use coursepulse::core::filter::CertificationFilter;
use coursepulse::core::model::{CategoryAggregate, EnrichedOffering};
use std::io::{self, Write};

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

fn offering_lines<W: Write>(
    out: &mut W,
    rows: &[EnrichedOffering],
    value: impl Fn(&EnrichedOffering) -> String,
) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "  (none)");
    }
    for (rank, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:<40} {:<20} {}",
            rank + 1,
            row.offering.title,
            row.offering.category,
            value(row)
        )?;
    }
    Ok(())
}

fn describe_filter(report: &AnalysisReport) -> String {
    let f = &report.filter;
    let mut parts = Vec::new();
    if !f.categories.is_empty() {
        let names: Vec<&str> = f.categories.iter().map(String::as_str).collect();
        parts.push(format!("categories={}", names.join("|")));
    }
    if let Some(min) = f.min_duration {
        parts.push(format!("min_duration={min}h"));
    }
    if let Some(max) = f.max_duration {
        parts.push(format!("max_duration={max}h"));
    }
    match f.certification {
        CertificationFilter::All => {}
        CertificationFilter::Certified => parts.push("certified".to_string()),
        CertificationFilter::NotCertified => parts.push("not certified".to_string()),
    }
    if let Some(min) = f.min_demand {
        parts.push(format!("min_demand={min}"));
    }
    if !f.title_search.is_empty() {
        parts.push(format!("search=\"{}\"", f.title_search));
    }
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

fn category_lines<W: Write>(
    out: &mut W,
    rows: &[CategoryAggregate],
    value: impl Fn(&CategoryAggregate) -> String,
) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "  (none)");
    }
    for (rank, agg) in rows.iter().enumerate() {
        writeln!(out, "  {:>2}. {:<24} {}", rank + 1, agg.category, value(agg))?;
    }
    Ok(())
}

/// Write the human-readable report.
pub fn write_text<W: Write>(out: &mut W, report: &AnalysisReport) -> io::Result<()> {
    writeln!(out, "Source:      {}", report.source)?;
    writeln!(out, "Fingerprint: {}", report.fingerprint)?;
    writeln!(out, "Filter:      {}", describe_filter(report))?;

    let o = &report.overview;
    section(out, "Overview")?;
    writeln!(out, "  Offerings:        {}", o.offering_count)?;
    writeln!(out, "  Total demand:     {}", o.total_demand)?;
    writeln!(out, "  Mean demand:      {}", opt(o.mean_demand))?;
    writeln!(out, "  Mean duration:    {}", opt(o.mean_duration))?;
    writeln!(out, "  Mean ratio:       {}", opt(o.mean_ratio))?;
    writeln!(out, "  Certified (%):    {}", opt(o.certified_share_pct))?;
    if report.enrichment_failure_count > 0 {
        writeln!(
            out,
            "  Growth undefined: {} offering(s) with zero duration",
            report.enrichment_failure_count
        )?;
    }

    section(out, "Opportunity ranking")?;
    if report.opportunities.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (rank, agg) in report.opportunities.iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:<24} score {:>10.2}  demand {:>6}  offerings {:>3}  ratio {:>6.2}",
            rank + 1,
            agg.category,
            agg.opportunity_score,
            agg.total_demand,
            agg.offering_count,
            agg.mean_ratio
        )?;
    }

    section(out, "Demand by category")?;
    category_lines(out, &report.demand_categories, |a| {
        format!("total demand {}", a.total_demand)
    })?;

    section(out, "Demand/student ratio by category")?;
    category_lines(out, &report.ratio_categories, |a| {
        format!("mean ratio {:.2}", a.mean_ratio)
    })?;

    section(out, "Fastest-growing categories")?;
    category_lines(out, &report.growth_categories, |a| {
        format!("mean growth {}", opt(a.mean_growth_score))
    })?;

    section(out, "Demand outliers")?;
    match report.outlier_fence {
        Some(fence) => writeln!(
            out,
            "  Q1 {:.2}  Q3 {:.2}  IQR {:.2}  upper fence {:.2}",
            fence.q1, fence.q3, fence.iqr, fence.upper_fence
        )?,
        None => writeln!(out, "  No data")?,
    }
    for row in &report.outliers {
        writeln!(
            out,
            "  {:<40} {:<20} {}",
            row.title, row.category, row.demand_offers
        )?;
    }

    section(out, "Top offerings by demand")?;
    offering_lines(out, &report.top_demand, |e| e.offering.demand_offers.to_string())?;

    section(out, "Top offerings by demand/student ratio")?;
    offering_lines(out, &report.top_ratio, |e| {
        format!("{:.2}", e.offering.ratio_demand_students)
    })?;

    section(out, "Top offerings by growth")?;
    offering_lines(out, &report.top_growth, |e| opt(e.growth_score))?;

    section(out, "Niche offerings")?;
    offering_lines(out, &report.top_niche, |e| format!("{:.3}", e.niche_score))?;

    section(out, "Most frequent certifications")?;
    if report.certifications.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for cert in &report.certifications {
        writeln!(out, "  {:<30} {:>4}", cert.label, cert.count)?;
    }

    section(out, "Ratio by duration band")?;
    for band in &report.duration_bands {
        writeln!(
            out,
            "  {:<9} {:>4} offering(s)  mean ratio {}",
            band.label,
            band.offering_count,
            opt(band.mean_ratio)
        )?;
    }

    section(out, "Technology families")?;
    for tech in &report.technologies {
        writeln!(
            out,
            "  {:<16} growth {:>10.2}  ({} match(es))",
            tech.family, tech.score, tech.matches
        )?;
    }

    section(out, "Predictive models")?;
    match &report.models.best {
        Some(best) => writeln!(
            out,
            "  Best: {} (RMSE {:.2}, R² {:.2})",
            best.name, best.rmse, best.r2
        )?,
        None => writeln!(
            out,
            "  {}",
            report.models.note.as_deref().unwrap_or("No models")
        )?,
    }
    for model in report.models.ranking.iter().skip(1) {
        writeln!(
            out,
            "        {} (RMSE {:.2}, R² {:.2})",
            model.name, model.rmse, model.r2
        )?;
    }

    out.flush()
}
