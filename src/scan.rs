//! Locate the first occurrence of a residue in a PDB file.
//!
//! Only `ATOM` and `HETATM` records are considered. A residue occurrence is the contiguous run of
//! records that share one residue name, chain and residue sequence number, starting at the first
//! record with the target residue name. As soon as a record with a different key shows up the
//! occurrence is closed for good, even if the same residue appears again later in the file.
use std::io::{self, BufRead, BufReader};
use std::ops::Range;
use std::path::Path;

use glam::DVec3;

/// Records shorter than this cannot hold all three coordinates.
const MIN_RECORD_LEN: usize = 54;

const RESNAME: Range<usize> = 17..20;
const CHAIN: Range<usize> = 21..22;
const RESNUM: Range<usize> = 22..26;
const X: Range<usize> = 30..38;
const Y: Range<usize> = 38..46;
const Z: Range<usize> = 46..54;

/// Identity of a residue within a structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueKey {
    /// Uppercased residue name.
    pub resname: String,
    pub chain: String,
    /// Residue sequence number as written, so insertion-free oddities still compare exactly.
    pub resnum: String,
}

/// A single coordinate record.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub key: ResidueKey,
    /// `None` if any of the coordinate fields could not be parsed.
    pub position: Option<DVec3>,
}

impl AtomRecord {
    // COLUMNS        DATA  TYPE    FIELD        DEFINITION
    // -------------------------------------------------------------------------------------
    //  1 -  6        Record name   "ATOM  " or "HETATM"
    // 18 - 20        Residue name  resName      Residue name.
    // 22             Character     chainID      Chain identifier.
    // 23 - 26        Integer       resSeq       Residue sequence number.
    // 31 - 38        Real(8.3)     x            Orthogonal coordinates for X in Angstroms.
    // 39 - 46        Real(8.3)     y            Orthogonal coordinates for Y in Angstroms.
    // 47 - 54        Real(8.3)     z            Orthogonal coordinates for Z in Angstroms.
    //
    // Example:
    // HETATM 4865  C1  NAG A 601      21.384  -9.171  42.005  1.00 38.65           C
    /// Read an `ATOM` or `HETATM` record, without its line terminator.
    ///
    /// Returns `None` for any other line, including coordinate records that are too short.
    /// The length excludes the line terminator, so a record needs all 54 columns to be present.
    pub fn from_pdb_line(line: &[u8]) -> Option<Self> {
        let is_record = line.starts_with(b"ATOM") || line.starts_with(b"HETATM");
        if !is_record || line.len() < MIN_RECORD_LEN {
            return None;
        }

        let key = ResidueKey {
            resname: field(line, RESNAME).to_uppercase(),
            chain: field(line, CHAIN),
            resnum: field(line, RESNUM),
        };
        let coord = |range| field(line, range).parse::<f64>().ok();
        let position = match (coord(X), coord(Y), coord(Z)) {
            (Some(x), Some(y), Some(z)) => Some(DVec3::new(x, y, z)),
            _ => None,
        };

        Some(Self { key, position })
    }
}

fn field(line: &[u8], range: Range<usize>) -> String {
    String::from_utf8_lossy(&line[range]).trim().to_string()
}

/// Where a scan for one target residue stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// The target residue has not been seen yet.
    Searching,
    /// Inside the first occurrence of the target residue.
    Collecting(ResidueKey),
    /// The first occurrence has been closed. Nothing more will be collected.
    Done,
}

impl ScanState {
    /// Advance the state by one record.
    ///
    /// Returns whether the record belongs to the first occurrence of `target`, which must be
    /// uppercased.
    pub fn advance(&mut self, record: &AtomRecord, target: &str) -> bool {
        match self {
            Self::Searching if record.key.resname == target => {
                *self = Self::Collecting(record.key.clone());
                true
            }
            Self::Searching => false,
            Self::Collecting(key) if *key == record.key => true,
            Self::Collecting(_) => {
                *self = Self::Done;
                false
            }
            Self::Done => false,
        }
    }

    /// The end of the file closes any open occurrence.
    pub fn finish(&mut self) {
        *self = Self::Done;
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// The scan for one candidate residue.
struct Tracker<'t> {
    target: &'t str,
    state: ScanState,
    atoms: Vec<DVec3>,
}

impl Tracker<'_> {
    fn feed(&mut self, record: &AtomRecord, ln: usize) {
        if !self.state.advance(record, self.target) {
            return;
        }
        match record.position {
            Some(position) => self.atoms.push(position),
            None => log::trace!(
                "Dropping {} atom with unreadable coordinates on line {ln}",
                self.target
            ),
        }
    }
}

/// Returns whether the outcome of [`first_of`] can no longer change.
///
/// That is the case once every candidate before the first occurrence with atoms has been closed
/// without any atoms of its own.
fn settled(trackers: &[Tracker]) -> bool {
    for tracker in trackers {
        if !tracker.state.is_done() {
            return false;
        }
        if !tracker.atoms.is_empty() {
            return true;
        }
    }
    true
}

/// Find the first of the `candidates` that occurs in a PDB stream with at least one atom.
///
/// Returns the index of the winning candidate together with the positions of the atoms of its
/// first occurrence. Each candidate is tracked independently in a single pass, which gives the
/// same answer as looking for the candidates one by one, in order. Reading stops as soon as the
/// answer is known.
///
/// The `candidates` must be uppercased residue names.
pub fn first_of<R: BufRead>(
    mut reader: R,
    candidates: &[String],
) -> io::Result<Option<(usize, Vec<DVec3>)>> {
    let mut trackers: Vec<_> = candidates
        .iter()
        .map(|target| Tracker {
            target,
            state: ScanState::Searching,
            atoms: Vec::new(),
        })
        .collect();

    let mut line = Vec::new();
    let mut ln = 0;
    while !settled(&trackers) {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        ln += 1;

        let Some(record) = AtomRecord::from_pdb_line(trim_line_end(&line)) else {
            continue;
        };
        for tracker in &mut trackers {
            tracker.feed(&record, ln);
        }
    }
    for tracker in &mut trackers {
        tracker.state.finish();
    }

    Ok(trackers
        .into_iter()
        .enumerate()
        .find(|(_, tracker)| !tracker.atoms.is_empty())
        .map(|(i, tracker)| (i, tracker.atoms)))
}

/// Open a PDB file and find the first of the `candidates` that occurs in it.
///
/// See [`first_of`].
pub fn first_of_file(
    path: &Path,
    candidates: &[String],
) -> io::Result<Option<(usize, Vec<DVec3>)>> {
    let file = std::fs::File::open(path)?;
    first_of(BufReader::new(file), candidates)
}

/// Collect the atom positions of the first occurrence of `target` in a PDB file.
///
/// Returns `None` if the residue does not occur at all. An occurrence of which no coordinates
/// could be read is returned as an empty list.
pub fn first_occurrence(path: &Path, target: &str) -> io::Result<Option<Vec<DVec3>>> {
    let target = target.trim().to_uppercase();
    let mut reader = BufReader::new(std::fs::File::open(path)?);

    let mut state = ScanState::Searching;
    let mut atoms = Vec::new();
    let mut line = Vec::new();
    while !state.is_done() {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let Some(record) = AtomRecord::from_pdb_line(trim_line_end(&line)) else {
            continue;
        };
        if state.advance(&record, &target) {
            atoms.extend(record.position);
        }
    }

    match state {
        ScanState::Searching => Ok(None),
        ScanState::Collecting(_) | ScanState::Done => Ok(Some(atoms)),
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Format an `ATOM` or `HETATM` record for use in tests.
#[cfg(test)]
pub(crate) fn pdb_line(
    record: &str,
    resname: &str,
    chain: char,
    resnum: u32,
    pos: [f64; 3],
) -> String {
    let [x, y, z] = pos;
    let (serial, name) = (1, "C1");
    format!(
        "{record:<6}{serial:>5} {name:<4} {resname:>3} {chain}{resnum:>4}    \
         {x:>8.3}{y:>8.3}{z:>8.3}  1.00  0.00"
    )
}
