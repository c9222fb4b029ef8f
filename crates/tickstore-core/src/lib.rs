mod app_config;
mod config;
mod symbols;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use symbols::{load_symbols, SymbolConfig, SymbolsFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read symbols file {path}: {source}")]
    SymbolsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse symbols file: {0}")]
    SymbolsFileParse(#[from] serde_yaml::Error),

    #[error("invalid symbol \"{symbol}\": {reason}")]
    InvalidSymbol { symbol: String, reason: String },

    #[error("duplicate symbol \"{0}\" in symbols file")]
    DuplicateSymbol(String),
}
