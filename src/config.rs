use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Everything a single resolution run needs to know.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Cross-reference table mapping structure identifiers to native ligands.
    pub pairs: PathBuf,
    /// Directory that is searched recursively for structure files.
    pub root: PathBuf,
    /// Output coordinate table.
    pub output: PathBuf,
    /// Structure file extension, compared case-insensitively.
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Resolve rows on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_extension() -> String {
    "pdb".to_string()
}

fn default_parallel() -> bool {
    true
}

impl Config {
    /// Create a [`Config`] with default matching behavior.
    pub fn new(
        pairs: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pairs: pairs.into(),
            root: root.into(),
            output: output.into(),
            extension: default_extension(),
            match_mode: MatchMode::default(),
            parallel: default_parallel(),
        }
    }

    /// Read a [`Config`] from a json file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            ConfigError::Config {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Check that the input paths exist before any work is done.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.pairs, &self.root] {
            if !path.exists() {
                return Err(ConfigError::MissingFile { path: path.clone() });
            }
        }
        Ok(())
    }
}

/// How a structure identifier is matched against indexed file names.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The file name contains the identifier anywhere.
    ///
    /// Note that this may produce false matches when one identifier is contained in another,
    /// e.g. `1ABC` will match `21abc.pdb` if that file is encountered first.
    #[default]
    Substring,
    /// The file name without its extension equals the identifier.
    Exact,
}
