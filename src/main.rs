// CoursePulse - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Snapshot load, filtering and report assembly
// 4. Text or JSON output, optional aggregate export

mod render;

use clap::{Parser, ValueEnum};
use coursepulse::app::report::{self, ReportOptions};
use coursepulse::app::snapshot::SnapshotCache;
use coursepulse::app::state::AnalysisState;
use coursepulse::core::export;
use coursepulse::core::filter::{CertificationFilter, FilterState};
use coursepulse::core::ingest;
use coursepulse::core::model::ModelResult;
use coursepulse::core::opportunity;
use coursepulse::core::summary::TechnologyCatalog;
use coursepulse::platform::config::{self, AppConfig, PlatformPaths};
use coursepulse::util::constants;
use coursepulse::util::error::{CoursePulseError, ExportError, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CertificationArg {
    All,
    Certified,
    NotCertified,
}

impl From<CertificationArg> for CertificationFilter {
    fn from(arg: CertificationArg) -> Self {
        match arg {
            CertificationArg::All => CertificationFilter::All,
            CertificationArg::Certified => CertificationFilter::Certified,
            CertificationArg::NotCertified => CertificationFilter::NotCertified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// CoursePulse - Training-market opportunity analysis.
///
/// Reads a table of training offerings and reports which categories combine
/// strong job-posting demand with a favourable demand/student ratio.
#[derive(Parser, Debug)]
#[command(name = "coursepulse", version, about)]
struct Cli {
    /// Offerings table (CSV with French column headers).
    offerings: PathBuf,

    /// Model evaluation results (CSV: name, RMSE, R²). Defaults to the reference set.
    #[arg(short = 'm', long = "models")]
    models: Option<PathBuf>,

    /// Keep only this category (repeatable).
    #[arg(short = 'c', long = "category")]
    categories: Vec<String>,

    /// Minimum duration in hours (inclusive).
    #[arg(long = "min-duration")]
    min_duration: Option<f64>,

    /// Maximum duration in hours (inclusive).
    #[arg(long = "max-duration")]
    max_duration: Option<f64>,

    /// Certification status filter.
    #[arg(long = "certification", value_enum, default_value_t = CertificationArg::All)]
    certification: CertificationArg,

    /// Minimum job-posting demand (inclusive).
    #[arg(long = "min-demand")]
    min_demand: Option<u64>,

    /// Case-insensitive title substring.
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Rows per ranking (overrides config.toml).
    #[arg(short = 'k', long = "top-k")]
    top_k: Option<usize>,

    /// Report format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write ranked category aggregates to this CSV file.
    #[arg(short = 'e', long = "export-aggregates")]
    export_aggregates: Option<PathBuf>,

    /// Directory containing config.toml (defaults to the platform config dir).
    #[arg(long = "config")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    fn filter_state(&self) -> Result<FilterState> {
        let mut filter = FilterState::categories(self.categories.iter().cloned());
        filter.set_duration_range(self.min_duration, self.max_duration)?;
        filter.certification = self.certification.into();
        filter.min_demand = self.min_demand;
        filter.title_search = self.search.clone().unwrap_or_default();
        Ok(filter)
    }
}

fn open(path: &Path, operation: &'static str) -> Result<File> {
    File::open(path).map_err(|e| CoursePulseError::Io {
        path: path.to_path_buf(),
        operation,
        source: e,
    })
}

fn load_models(path: Option<&Path>) -> Result<Vec<ModelResult>> {
    match path {
        Some(path) => {
            let models = ingest::load_model_results(open(path, "read model results")?)?;
            tracing::info!(path = %path.display(), models = models.len(), "Model results loaded");
            Ok(models)
        }
        None => Ok(ModelResult::reference_set()),
    }
}

fn technology_catalog(config: &AppConfig) -> Result<TechnologyCatalog> {
    let catalog = match &config.technologies {
        Some(families) => TechnologyCatalog::new(families.iter().cloned())?,
        None => TechnologyCatalog::builtin()?,
    };
    Ok(catalog)
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let top_k = cli
        .top_k
        .map(|k| k.clamp(constants::MIN_TOP_K, constants::MAX_TOP_K))
        .unwrap_or(config.top_k);

    let mut cache = SnapshotCache::new();
    let (snapshot, _) = cache.load(&cli.offerings)?;

    let mut state = AnalysisState::new(snapshot, config.zero_duration_policy, config.iqr_multiplier)?;
    for failure in &state.enrichment().failures {
        tracing::warn!(error = %failure, "Growth score undefined");
    }

    let filter = cli.filter_state()?;
    if !filter.is_empty() {
        state.set_filter(filter);
    }

    let models = load_models(cli.models.as_deref())?;
    let catalog = technology_catalog(config)?;
    let report = report::build_report(&state, &models, &catalog, &ReportOptions { top_k });

    if let Some(ref path) = cli.export_aggregates {
        let ranked = opportunity::rank_opportunities(state.aggregates(), state.aggregates().len());
        let file = File::create(path).map_err(|e| ExportError::Io {
            path: path.clone(),
            source: e,
        })?;
        let rows = export::export_aggregates_csv(&ranked, BufWriter::new(file), path)?;
        tracing::info!(rows, path = %path.display(), "Category aggregates exported");
    }

    let stdout_err = |e: io::Error| CoursePulseError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write report",
        source: e,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Json => {
            export::export_report_json(&report, &mut out, Path::new("<stdout>"))?;
            writeln!(out).map_err(stdout_err)?;
        }
        OutputFormat::Text => render::write_text(&mut out, &report).map_err(stdout_err)?,
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Resolve config before logging so [logging] level can take effect.
    let config_dir = match cli.config_dir {
        Some(ref dir) => dir.clone(),
        None => PlatformPaths::resolve().config_dir,
    };
    let (config, warnings) = config::load_config(&config_dir);

    coursepulse::util::logging::init(cli.debug, config.log_level.as_deref());

    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "CoursePulse starting"
    );

    if let Err(e) = run(&cli, &config) {
        tracing::error!(error = %e, "Analysis failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
