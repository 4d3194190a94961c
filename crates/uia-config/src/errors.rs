use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config at {path}: {reason}")]
    Invalid { path: String, reason: String },
    #[error("invalid env override {key}: {reason}")]
    InvalidEnv { key: String, reason: String },
}
