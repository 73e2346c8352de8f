use std::path::PathBuf;

use thiserror::Error;

/// Problems with the run's inputs that stop it before any row is resolved.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required input file {path:?} does not exist")]
    MissingFile { path: PathBuf },
    #[error("column '{column}' not found in {path:?}, found columns: {found:?}")]
    MissingColumn {
        column: String,
        path: PathBuf,
        found: Vec<String>,
    },
    #[error("no '.{extension}' structure files found under {root:?}")]
    NoStructureFiles { root: PathBuf, extension: String },
    #[error("could not read structure directory {root:?}: {source}")]
    UnreadableRoot {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read table {path:?}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("could not parse configuration file {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("the run was cancelled before all rows were resolved")]
    Cancelled,
}
