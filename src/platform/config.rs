// CoursePulse - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::metrics::ZeroDurationPolicy;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Resolved platform paths for CoursePulse configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/coursepulse/ or %APPDATA%\CoursePulse\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                "Platform paths resolved"
            );

            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[analysis]` section.
    pub analysis: AnalysisSection,
    /// `[technologies]` table: family name -> keywords.
    pub technologies: Option<BTreeMap<String, Vec<String>>>,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[analysis]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Rows returned by top-K rankings.
    pub top_k: Option<usize>,
    /// "record" or "abort".
    pub zero_duration_policy: Option<String>,
    /// Tukey fence multiplier.
    pub outlier_iqr_multiplier: Option<f64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Analysis --
    pub top_k: usize,
    pub zero_duration_policy: ZeroDurationPolicy,
    pub iqr_multiplier: f64,

    /// Replacement technology families; `None` keeps the built-in table.
    pub technologies: Option<Vec<(String, Vec<String>)>>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            top_k: constants::DEFAULT_TOP_K,
            zero_duration_policy: ZeroDurationPolicy::default(),
            iqr_multiplier: constants::DEFAULT_IQR_MULTIPLIER,
            technologies: None,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unparseable, returns defaults with a warning so the caller
/// can still run but the user is informed.
///
/// Warnings are returned rather than logged at warn level because this runs
/// before the logging level from the file is known.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.clone(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: config_path.clone(),
                source: e,
            };
            warnings.push(format!(
                "{err}. Using defaults. See config.example.toml for the expected format."
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let config = validate(raw, &mut warnings);
    (config, warnings)
}

fn out_of_range<T: std::fmt::Display>(
    warnings: &mut Vec<String>,
    field: &str,
    value: T,
    min: T,
    max: T,
    default: T,
) {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("{min}-{max}"),
    };
    warnings.push(format!("{err}. Using default ({default})."));
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Analysis: top_k --
    if let Some(k) = raw.analysis.top_k {
        if (constants::MIN_TOP_K..=constants::MAX_TOP_K).contains(&k) {
            config.top_k = k;
        } else {
            out_of_range(
                warnings,
                "[analysis] top_k",
                k,
                constants::MIN_TOP_K,
                constants::MAX_TOP_K,
                constants::DEFAULT_TOP_K,
            );
        }
    }

    // -- Analysis: zero_duration_policy --
    if let Some(ref policy) = raw.analysis.zero_duration_policy {
        match policy.to_lowercase().as_str() {
            "record" => config.zero_duration_policy = ZeroDurationPolicy::Record,
            "abort" => config.zero_duration_policy = ZeroDurationPolicy::Abort,
            other => warnings.push(format!(
                "[analysis] zero_duration_policy = \"{other}\" is not recognised. \
                 Expected \"record\" or \"abort\". Using default (record).",
            )),
        }
    }

    // -- Analysis: outlier_iqr_multiplier --
    if let Some(m) = raw.analysis.outlier_iqr_multiplier {
        if (constants::MIN_IQR_MULTIPLIER..=constants::MAX_IQR_MULTIPLIER).contains(&m) {
            config.iqr_multiplier = m;
        } else {
            out_of_range(
                warnings,
                "[analysis] outlier_iqr_multiplier",
                m,
                constants::MIN_IQR_MULTIPLIER,
                constants::MAX_IQR_MULTIPLIER,
                constants::DEFAULT_IQR_MULTIPLIER,
            );
        }
    }

    // -- Technologies --
    if let Some(table) = raw.technologies {
        let mut families = Vec::new();
        for (name, keywords) in table {
            let kept: Vec<String> = keywords
                .into_iter()
                .filter(|k| {
                    let ok = !k.trim().is_empty() && k.len() <= constants::MAX_KEYWORD_LENGTH;
                    if !ok {
                        warnings.push(format!(
                            "[technologies] \"{name}\": keyword of length {} ignored \
                             (must be 1-{} characters).",
                            k.len(),
                            constants::MAX_KEYWORD_LENGTH,
                        ));
                    }
                    ok
                })
                .collect();
            if kept.is_empty() {
                warnings.push(format!(
                    "[technologies] \"{name}\" has no usable keywords and was skipped."
                ));
            } else {
                families.push((name, kept));
            }
        }
        if families.is_empty() {
            warnings.push(
                "[technologies] table is empty after validation. Using built-in families."
                    .to_string(),
            );
        } else {
            config.technologies = Some(families);
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    config
}
