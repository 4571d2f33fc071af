use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a table from a dataset file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{} has no header row", .path.display())]
    Empty { path: PathBuf },
    #[error("{} is missing column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("unknown text encoding '{0}'")]
    UnknownEncoding(String),
}

/// Failure to load the country-name configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid country-name config: {0}")]
    Parse(#[from] serde_json::Error),
}
