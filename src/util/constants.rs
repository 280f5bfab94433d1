// CoursePulse - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "CoursePulse";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "CoursePulse";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Input schema
// =============================================================================

/// Offering title column.
pub const COL_TITLE: &str = "titre";

/// Offering category column.
pub const COL_CATEGORY: &str = "categorie";

/// Job-posting demand column.
pub const COL_DEMAND: &str = "demand_offres";

/// Offering duration column (hours).
pub const COL_DURATION: &str = "duree_heures";

/// Certification column. Empty or "non" means no certification.
pub const COL_CERTIFICATION: &str = "certification";

/// Demand per enrolled student column.
pub const COL_RATIO: &str = "ratio_demande_etudiants";

/// Every column an offerings table must carry. Extra columns are ignored.
pub const REQUIRED_OFFERING_COLUMNS: &[&str] = &[
    COL_TITLE,
    COL_CATEGORY,
    COL_DEMAND,
    COL_DURATION,
    COL_CERTIFICATION,
    COL_RATIO,
];

/// Accepted header spellings for each model-result column, canonical first.
pub const MODEL_NAME_COLUMNS: &[&str] = &["name", "Modèle", "model"];
pub const MODEL_RMSE_COLUMNS: &[&str] = &["RMSE", "rmse"];
pub const MODEL_R2_COLUMNS: &[&str] = &["R²", "R2", "r2"];

/// Largest accepted `demand_offres` value (2^53). Every whole number up to
/// this bound is exactly representable as `f64`.
pub const MAX_DEMAND_OFFERS: u64 = 1 << 53;

/// Certification labels listed in the report.
pub const TOP_CERTIFICATIONS: usize = 10;

/// Literal certification value meaning "not certified" (case-sensitive).
pub const NO_CERTIFICATION_MARKER: &str = "non";

// =============================================================================
// Analysis defaults
// =============================================================================

/// Default number of rows returned by top-K queries.
pub const DEFAULT_TOP_K: usize = 10;

/// Minimum user-configurable top-K.
pub const MIN_TOP_K: usize = 1;

/// Maximum user-configurable top-K.
pub const MAX_TOP_K: usize = 100;

/// Tukey fence multiplier applied to the interquartile range.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Lower bound on the configurable IQR multiplier.
pub const MIN_IQR_MULTIPLIER: f64 = 0.5;

/// Upper bound on the configurable IQR multiplier.
pub const MAX_IQR_MULTIPLIER: f64 = 5.0;

/// Quartile positions used by the outlier rule.
pub const LOWER_QUARTILE: f64 = 0.25;
pub const UPPER_QUARTILE: f64 = 0.75;

/// Maximum number of per-record metric failures kept for reporting.
/// Further failures are counted but not stored.
pub const MAX_RECORDED_METRIC_FAILURES: usize = 1_000;

// =============================================================================
// Duration bands
// =============================================================================

/// Right-inclusive band edges in hours: (0,25], (25,50], ... (200,1000].
pub const DURATION_BAND_EDGES: &[f64] = &[0.0, 25.0, 50.0, 100.0, 200.0, 1_000.0];

/// Display labels, one per band.
pub const DURATION_BAND_LABELS: &[&str] = &["0-25h", "25-50h", "50-100h", "100-200h", "200h+"];

// =============================================================================
// Technology families
// =============================================================================

/// Built-in keyword families used to roll growth scores up by technology.
/// Keywords are matched case-insensitively as literal substrings of titles.
pub const DEFAULT_TECHNOLOGY_FAMILIES: &[(&str, &[&str])] = &[
    (
        "AI/ML",
        &[
            "intelligence artificielle",
            "machine learning",
            "deep learning",
            "neural network",
        ],
    ),
    ("Cloud", &["aws", "azure", "google cloud", "cloud computing"]),
    (
        "Cybersécurité",
        &["cybersécurité", "sécurité", "hacking", "pentest"],
    ),
    ("DevOps", &["devops", "ci/cd", "docker", "kubernetes"]),
    (
        "Data",
        &["data science", "big data", "analytics", "business intelligence"],
    ),
    ("Web3", &["blockchain", "web3", "crypto", "nft"]),
];

/// Maximum keyword length accepted from configuration.
pub const MAX_KEYWORD_LENGTH: usize = 256;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Export
// =============================================================================

/// Maximum number of aggregate rows written in a single export.
pub const MAX_EXPORT_ROWS: usize = 1_000_000;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
