use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use dockcenter::{Config, MatchMode};

/// Derive docking box centers from the native ligands in a set of PDB structures.
///
/// For every row of the cross-reference table, the structure file whose name contains the
/// identifier is looked up under the structure directory. The center of the first occurrence of
/// the first listed ligand that is present in that structure is written to the output table.
#[derive(Debug, Parser)]
#[command(about, version = dockcenter::version::long_version())]
pub struct Args {
    /// Cross-reference table (tab-separated) with a `PDB` and a `Nat_Ligand` column.
    #[arg(required_unless_present = "config")]
    pub pairs: Option<PathBuf>,

    /// Directory that is searched recursively for structure files.
    #[arg(required_unless_present = "config")]
    pub root: Option<PathBuf>,

    /// Output coordinate table path.
    #[arg(short, long, default_value = "docking_centers.txt")]
    pub output: PathBuf,

    /// Read the run configuration from a json file instead.
    ///
    /// The run options below cannot be combined with a configuration file.
    #[arg(
        long,
        conflicts_with_all = ["pairs", "root", "output", "extension", "match_mode", "no_parallel"]
    )]
    pub config: Option<PathBuf>,

    /// Extension of the structure files, compared case-insensitively.
    #[arg(long, default_value = "pdb")]
    pub extension: String,

    /// How structure identifiers are matched against file names.
    #[arg(long, value_enum, default_value_t)]
    pub match_mode: MatchMode,

    /// Resolve the rows one after the other, on a single thread.
    #[arg(long)]
    pub no_parallel: bool,

    /// Display verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Turn the arguments into the [`Config`] for this run.
    pub fn into_config(self) -> anyhow::Result<Config> {
        if let Some(path) = &self.config {
            return Ok(Config::from_json_file(path)?);
        }

        let pairs = self.pairs.context("A cross-reference table is required")?;
        let root = self.root.context("A structure directory is required")?;
        Ok(Config {
            pairs,
            root,
            output: self.output,
            extension: self.extension,
            match_mode: self.match_mode,
            parallel: !self.no_parallel,
        })
    }
}
