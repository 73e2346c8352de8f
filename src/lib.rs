//! Derive docking box centers from the native ligands found in PDB structure files.
//!
//! The engine reads a cross-reference table that maps structure identifiers to candidate ligand
//! residue names, locates each structure under a root directory, and reports the geometric center
//! of the first occurrence of the first candidate residue that is present.
pub mod centroid;
pub mod config;
pub mod error;
pub mod index;
pub mod ligand;
pub mod resolve;
pub mod scan;
pub mod table;
pub mod version;

pub use config::{Config, MatchMode};
pub use error::{ConfigError, ResolveError};
pub use resolve::{Cancellation, Outcome, ResolutionRow, Resolver, RunSummary, Status};
