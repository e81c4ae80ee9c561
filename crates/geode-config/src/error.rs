use std::path::PathBuf;

/// Error loading `geode.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid TOML in config: {0}")]
    Parse(#[from] toml::de::Error),
    /// One or more values are out of range; problems are joined with `; `.
    #[error("Invalid config: {0}")]
    Validation(String),
    /// A `${VAR}` reference could not be expanded.
    #[error("Cannot expand {field}: {message}")]
    EnvVar { field: String, message: String },
}
