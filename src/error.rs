use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors raised while resolving or computing pileup statistics.
///
/// Everything except the provider wrappers is raised before the first
/// record is produced.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("unsupported statistics type: {0:?}")]
    UnsupportedType(String),

    #[error("statistics type {0:?} requires a reference sequence")]
    MissingReference(String),

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("invalid GC window: {0}")]
    InvalidWindowConfig(String),

    #[error("invalid dtype: {0}")]
    InvalidDtype(String),

    #[error("unknown field {field:?} for statistics type {stat}")]
    UnknownField { stat: String, field: String },

    #[error("BAM/CRAM error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
