/// Configuration errors. These fail fast at construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid glob pattern {pattern:?}: {message}")]
    BadGlob { pattern: String, message: String },

    #[error("invalid value for {field}: {message}")]
    Validation { field: String, message: String },
}
