use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use glam::DVec3;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::centroid::centroid;
use crate::config::Config;
use crate::error::{ConfigError, ResolveError};
use crate::index::StructureIndex;
use crate::ligand::parse_candidates;
use crate::scan::first_of_file;
use crate::table::{write_coordinate_table, CrossReference, CrossReferenceRow};

/// What came of resolving the docking center for one structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The center of the first occurrence of `ligand`.
    Resolved { ligand: String, center: DVec3 },
    /// No structure file matches the identifier.
    FileNotFound,
    /// The ligand cell lists no ligands.
    NoLigandSpecified,
    /// None of the `candidates` occur in the structure file.
    LigandNotFound { candidates: Vec<String> },
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Self::Resolved { .. } => Status::Resolved,
            Self::FileNotFound => Status::FileNotFound,
            Self::NoLigandSpecified => Status::NoLigandSpecified,
            Self::LigandNotFound { .. } => Status::LigandNotFound,
        }
    }

    pub fn center(&self) -> Option<DVec3> {
        match self {
            Self::Resolved { center, .. } => Some(*center),
            _ => None,
        }
    }

    /// The contents of the ligand column for this outcome.
    ///
    /// This is the winning ligand for a resolved center, all candidates that were tried when none
    /// were found, and empty otherwise.
    pub fn ligand_field(&self) -> String {
        match self {
            Self::Resolved { ligand, .. } => ligand.clone(),
            Self::LigandNotFound { candidates } => candidates.join(","),
            Self::FileNotFound | Self::NoLigandSpecified => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Resolved,
    FileNotFound,
    NoLigandSpecified,
    LigandNotFound,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resolved => "resolved",
            Self::FileNotFound => "structure file not found",
            Self::NoLigandSpecified => "no ligand specified",
            Self::LigandNotFound => "ligand not found",
        };
        f.write_str(s)
    }
}

/// One line of the coordinate table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRow {
    /// Uppercased structure identifier.
    pub structure_id: String,
    pub outcome: Outcome,
}

impl ResolutionRow {
    pub fn status(&self) -> Status {
        self.outcome.status()
    }
}

/// A flag that can be raised from anywhere to stop a run between rows.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Resolves docking centers against an index of structure files.
#[derive(Debug)]
pub struct Resolver {
    index: StructureIndex,
    parallel: bool,
}

impl Resolver {
    /// Index the structure files described by the [`Config`].
    ///
    /// Fails if the structure directory holds no structure files at all.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let index = StructureIndex::build(&config.root, &config.extension, config.match_mode)?;
        Ok(Self::from_index(index, config.parallel))
    }

    pub fn from_index(index: StructureIndex, parallel: bool) -> Self {
        Self { index, parallel }
    }

    pub fn index(&self) -> &StructureIndex {
        &self.index
    }

    /// Resolve the docking center for a single cross-reference row.
    ///
    /// Returns `None` for rows without a structure identifier.
    pub fn resolve_row(&self, row: &CrossReferenceRow) -> Option<ResolutionRow> {
        let id = row.identifier.trim();
        if id.is_empty() {
            return None;
        }
        let structure_id = id.to_uppercase();
        let outcome = self.resolve_outcome(&structure_id, &row.ligands);
        Some(ResolutionRow {
            structure_id,
            outcome,
        })
    }

    fn resolve_outcome(&self, id: &str, ligands: &str) -> Outcome {
        let Some(path) = self.index.locate(id) else {
            log::warn!("{id}: {}", Status::FileNotFound);
            return Outcome::FileNotFound;
        };

        let candidates = parse_candidates(ligands);
        if candidates.is_empty() {
            log::warn!("{id}: {}", Status::NoLigandSpecified);
            return Outcome::NoLigandSpecified;
        }

        match first_of_file(path, &candidates) {
            Ok(Some((idx, atoms))) => {
                let center = centroid(&atoms);
                let ligand = candidates[idx].clone();
                log::info!(
                    "{id} {ligand} center = {:.3}, {:.3}, {:.3} ({} atoms)",
                    center.x,
                    center.y,
                    center.z,
                    atoms.len()
                );
                Outcome::Resolved { ligand, center }
            }
            Ok(None) => {
                let name = display_name(path);
                let status = Status::LigandNotFound;
                log::warn!("{id}: {status}, tried {candidates:?} in {name}");
                Outcome::LigandNotFound { candidates }
            }
            Err(err) => {
                let status = Status::FileNotFound;
                log::error!("{id}: {status}, could not read {path:?}: {err}");
                Outcome::FileNotFound
            }
        }
    }

    /// Resolve all rows of a cross-reference table.
    ///
    /// The returned rows are in the same order as the table, leaving out rows without a structure
    /// identifier. The `cancel` flag is checked before each row.
    pub fn resolve(
        &self,
        table: &CrossReference,
        cancel: &Cancellation,
    ) -> Result<Vec<ResolutionRow>, ResolveError> {
        let resolve = |row: &CrossReferenceRow| {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            Ok(self.resolve_row(row))
        };

        let rows: Vec<Option<ResolutionRow>> = if self.parallel {
            table.rows.par_iter().map(resolve).collect::<Result<_, _>>()?
        } else {
            table.rows.iter().map(resolve).collect::<Result<_, _>>()?
        };

        Ok(rows.into_iter().flatten().collect())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().to_string())
}

/// Tally of the outcomes of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub resolved: usize,
    pub file_not_found: usize,
    pub no_ligand_specified: usize,
    pub ligand_not_found: usize,
}

impl RunSummary {
    pub fn from_rows(rows: &[ResolutionRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            match row.status() {
                Status::Resolved => summary.resolved += 1,
                Status::FileNotFound => summary.file_not_found += 1,
                Status::NoLigandSpecified => summary.no_ligand_specified += 1,
                Status::LigandNotFound => summary.ligand_not_found += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.resolved + self.file_not_found + self.no_ligand_specified + self.ligand_not_found
    }
}

/// Run the whole procedure for a [`Config`]: read the table, resolve every row, and write the
/// coordinate table.
pub fn run(config: &Config, cancel: &Cancellation) -> anyhow::Result<RunSummary> {
    config.validate()?;

    let table = CrossReference::read(&config.pairs)?;
    log::info!("Read {} rows from {:?}", table.rows.len(), config.pairs);

    let start = std::time::Instant::now();
    let resolver = Resolver::new(config)?;
    log::info!(
        "Indexed {} structure files under {:?}. Took {:.3} s.",
        resolver.index().len(),
        config.root,
        start.elapsed().as_secs_f32()
    );

    let start = std::time::Instant::now();
    let rows = resolver.resolve(&table, cancel)?;
    log::info!("Resolved {} rows. Took {:.3} s.", rows.len(), start.elapsed().as_secs_f32());

    let output = &config.output;
    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create output file {output:?}"))?;
    write_coordinate_table(std::io::BufWriter::new(file), &rows)
        .with_context(|| format!("Failed to write the coordinate table to {output:?}"))?;
    log::info!("Saved results to {output:?}");

    Ok(RunSummary::from_rows(&rows))
}
