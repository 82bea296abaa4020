use thiserror::Error;

/// Errors raised while loading configuration or static reference data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read gazetteer file {path}: {source}")]
    GazetteerFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse gazetteer: {0}")]
    GazetteerParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
