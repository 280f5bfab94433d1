// CoursePulse - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all CoursePulse operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum CoursePulseError {
    /// Input table does not match the expected schema.
    Schema(SchemaError),

    /// A derived metric could not be computed.
    Metric(MetricError),

    /// Best-model selection failed.
    Model(ModelSelectionError),

    /// Filter construction failed.
    Filter(FilterError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for CoursePulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "Schema error: {e}"),
            Self::Metric(e) => write!(f, "Metric error: {e}"),
            Self::Model(e) => write!(f, "Model selection error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for CoursePulseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(e) => Some(e),
            Self::Metric(e) => Some(e),
            Self::Model(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

/// Errors raised while ingesting a table. Any of these aborts the batch.
#[derive(Debug)]
pub enum SchemaError {
    /// The header row could not be read.
    Header { source: csv::Error },

    /// A required column is absent from the header row.
    MissingColumn { column: &'static str },

    /// A row could not be decoded (wrong type, wrong arity).
    InvalidRecord { line: u64, source: csv::Error },

    /// A row decoded but a field breaks its invariant.
    InvalidValue {
        line: u64,
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header { source } => write!(f, "cannot read header row: {source}"),
            Self::MissingColumn { column } => {
                write!(f, "required column '{column}' is missing")
            }
            Self::InvalidRecord { line, source } => {
                write!(f, "line {line}: cannot decode record: {source}")
            }
            Self::InvalidValue {
                line,
                field,
                value,
                reason,
            } => write!(f, "line {line}: '{field}' = '{value}' {reason}"),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Header { source } => Some(source),
            Self::InvalidRecord { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SchemaError> for CoursePulseError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

// ---------------------------------------------------------------------------
// Metric errors
// ---------------------------------------------------------------------------

/// Errors produced while deriving per-offering metrics.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricError {
    /// Growth score needs a non-zero duration.
    DivisionByZero { index: usize, title: String },
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero { index, title } => write!(
                f,
                "offering #{index} '{title}' has zero duration; growth score is undefined"
            ),
        }
    }
}

impl std::error::Error for MetricError {}

impl From<MetricError> for CoursePulseError {
    fn from(e: MetricError) -> Self {
        Self::Metric(e)
    }
}

// ---------------------------------------------------------------------------
// Model selection errors
// ---------------------------------------------------------------------------

/// Errors related to choosing among model evaluation results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelectionError {
    /// No model results were supplied.
    EmptyModelSet,
}

impl fmt::Display for ModelSelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyModelSet => write!(f, "no model results supplied"),
        }
    }
}

impl std::error::Error for ModelSelectionError {}

impl From<ModelSelectionError> for CoursePulseError {
    fn from(e: ModelSelectionError) -> Self {
        Self::Model(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to filter and keyword-matcher construction.
#[derive(Debug)]
pub enum FilterError {
    /// Duration bounds are negative, non-finite, or inverted.
    InvalidDurationRange { min: f64, max: f64 },

    /// A technology keyword could not be compiled into a matcher.
    InvalidKeyword {
        family: String,
        keyword: String,
        source: regex::Error,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDurationRange { min, max } => write!(
                f,
                "invalid duration range {min}..={max}: bounds must be finite, \
                 non-negative and min <= max"
            ),
            Self::InvalidKeyword {
                family,
                keyword,
                source,
            } => write!(
                f,
                "technology '{family}': cannot build matcher for '{keyword}': {source}"
            ),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidKeyword { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FilterError> for CoursePulseError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum row count.
    TooManyRows { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyRows { count, max } => write!(
                f,
                "Export of {count} rows exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for CoursePulseError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for CoursePulseError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for CoursePulse results.
pub type Result<T> = std::result::Result<T, CoursePulseError>;
