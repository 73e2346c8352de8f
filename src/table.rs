//! Tab-separated input and output tables.
use std::io::{self, Write};
use std::path::Path;

use crate::error::ConfigError;
use crate::resolve::{Outcome, ResolutionRow};

/// Name of the structure identifier column, compared case-insensitively.
pub const ID_COLUMN: &str = "PDB";

/// Accepted names for the native ligand column, in order of preference.
pub const LIGAND_COLUMNS: [&str; 3] = ["Nat_Ligand", "Ligand", "Native_Ligand"];

/// Header of the coordinate table.
pub const OUTPUT_HEADER: &str = "PDB\tLigand\tX\tY\tZ";

/// Written to every coordinate field of a row without a center.
pub const NOT_FOUND: &str = "Not Found";

/// UTF-8 byte order mark, which spreadsheet programs like to put in front of exported tables.
const BOM: &[u8] = "\u{feff}".as_bytes();

/// One row of the cross-reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReferenceRow {
    /// Raw structure identifier cell.
    pub identifier: String,
    /// Raw native ligand cell.
    pub ligands: String,
}

impl CrossReferenceRow {
    pub fn new(identifier: impl Into<String>, ligands: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ligands: ligands.into(),
        }
    }
}

/// The cross-reference table that maps structure identifiers to their native ligands.
#[derive(Debug, Clone, Default)]
pub struct CrossReference {
    pub rows: Vec<CrossReferenceRow>,
}

impl CrossReference {
    /// Read a cross-reference table from a file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let data = std::fs::read(path).map_err(|err| ConfigError::Table {
            path: path.to_path_buf(),
            source: err.into(),
        })?;
        Self::parse(&data, path)
    }

    /// Parse a cross-reference table.
    ///
    /// The table is expected to be tab-separated. If the header turns out to be a single field
    /// that contains whitespace, the table is read as whitespace-separated instead.
    ///
    /// The `path` is only used in error messages.
    pub fn parse(data: &[u8], path: &Path) -> Result<Self, ConfigError> {
        let data = data.strip_prefix(BOM).unwrap_or(data);
        let table_error = |source| ConfigError::Table {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(data);
        let header: Vec<String> = reader
            .headers()
            .map_err(table_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let whitespace_separated =
            matches!(header.as_slice(), [single] if single.split_whitespace().count() > 1);
        let (header, records) = if whitespace_separated {
            log::debug!("Reading {path:?} as whitespace-separated");
            split_whitespace_table(&String::from_utf8_lossy(data))
        } else {
            let mut records: Vec<Vec<String>> = Vec::new();
            for record in reader.records() {
                let record = record.map_err(table_error)?;
                records.push(record.iter().map(str::to_string).collect());
            }
            (header, records)
        };

        let id_idx = find_column(&header, &[ID_COLUMN]).ok_or_else(|| ConfigError::MissingColumn {
            column: ID_COLUMN.to_string(),
            path: path.to_path_buf(),
            found: header.clone(),
        })?;
        let ligand_idx =
            find_column(&header, &LIGAND_COLUMNS).ok_or_else(|| ConfigError::MissingColumn {
                column: LIGAND_COLUMNS.join("' or '"),
                path: path.to_path_buf(),
                found: header.clone(),
            })?;

        let cell = |record: &Vec<String>, idx: usize| record.get(idx).cloned().unwrap_or_default();
        let rows = records
            .iter()
            .map(|record| CrossReferenceRow {
                identifier: cell(record, id_idx),
                ligands: cell(record, ligand_idx),
            })
            .collect();

        Ok(Self { rows })
    }
}

/// Returns the index of the first of `names` that appears in the `header`.
fn find_column(header: &[String], names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        header
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(name))
    })
}

fn split_whitespace_table(s: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut lines = s
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>());
    let header = lines.next().unwrap_or_default();
    (header, lines.collect())
}

/// Write the coordinate table.
///
/// Each row is written on its own line, in the order given. Rows without a center carry
/// [`NOT_FOUND`] in all three coordinate fields.
pub fn write_coordinate_table(mut writer: impl Write, rows: &[ResolutionRow]) -> io::Result<()> {
    writeln!(writer, "{OUTPUT_HEADER}")?;
    for row in rows {
        let id = &row.structure_id;
        let ligand = row.outcome.ligand_field();
        match &row.outcome {
            Outcome::Resolved { center, .. } => {
                let [x, y, z] = center.to_array();
                writeln!(writer, "{id}\t{ligand}\t{x:.3}\t{y:.3}\t{z:.3}")?;
            }
            _ => writeln!(writer, "{id}\t{ligand}\t{NOT_FOUND}\t{NOT_FOUND}\t{NOT_FOUND}")?,
        }
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    fn parse(s: &str) -> Result<CrossReference, ConfigError> {
        CrossReference::parse(s.as_bytes(), Path::new("pair.txt"))
    }

    #[test]
    fn tab_separated() {
        let table = parse("PDB\tNat_Ligand\tNote\n1ABC\tNAG; MG\tx\n\tZN\t\n2XYZ\n").unwrap();
        assert_eq!(
            table.rows,
            [
                CrossReferenceRow::new("1ABC", "NAG; MG"),
                CrossReferenceRow::new("", "ZN"),
                CrossReferenceRow::new("2XYZ", ""),
            ]
        );
    }

    #[test]
    fn header_variants() {
        let table = parse("pdb\tligand\n1abc\tATP\n").unwrap();
        assert_eq!(table.rows, [CrossReferenceRow::new("1abc", "ATP")]);

        let table = parse("Native_Ligand\tSomething\tPdb\nHEM\t-\t3def\n").unwrap();
        assert_eq!(table.rows, [CrossReferenceRow::new("3def", "HEM")]);
    }

    #[test]
    fn ligand_column_preference() {
        let table = parse("PDB\tLigand\tNAT_LIGAND\n1abc\tFIRST\tSECOND\n").unwrap();
        assert_eq!(table.rows[0].ligands, "SECOND");
    }

    #[test]
    fn missing_columns() {
        match parse("Receptor\tNat_Ligand\n1abc\tNAG\n") {
            Err(ConfigError::MissingColumn { column, found, .. }) => {
                assert_eq!(column, "PDB");
                assert_eq!(found, ["Receptor", "Nat_Ligand"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        match parse("PDB\tCompound\n1abc\tNAG\n") {
            Err(ConfigError::MissingColumn { column, .. }) => {
                assert!(column.contains("Nat_Ligand"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn whitespace_fallback() {
        let table = parse("PDB   Nat_Ligand\n1abc  NAG\n\n2xyz MG\n").unwrap();
        assert_eq!(
            table.rows,
            [
                CrossReferenceRow::new("1abc", "NAG"),
                CrossReferenceRow::new("2xyz", "MG"),
            ]
        );
    }

    #[test]
    fn whitespace_fallback_with_bom() {
        let expected = [CrossReferenceRow::new("1abc", "NAG")];
        let table = parse("\u{feff}PDB  Nat_Ligand\n1abc NAG\n").unwrap();
        assert_eq!(table.rows, expected);
        let table = parse("\u{feff}PDB\tNat_Ligand\n1abc\tNAG\n").unwrap();
        assert_eq!(table.rows, expected);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CrossReference::read(&dir.path().join("pair.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
        assert!(err.to_string().contains("pair.txt"));
    }

    #[test]
    fn output_format() {
        let rows = [
            ResolutionRow {
                structure_id: "ID001".to_string(),
                outcome: Outcome::Resolved {
                    ligand: "NAG".to_string(),
                    center: DVec3::new(1.0, 1.0, 0.0),
                },
            },
            ResolutionRow {
                structure_id: "ID002".to_string(),
                outcome: Outcome::FileNotFound,
            },
            ResolutionRow {
                structure_id: "ID003".to_string(),
                outcome: Outcome::LigandNotFound {
                    candidates: vec!["NAG".to_string(), "MG".to_string()],
                },
            },
            ResolutionRow {
                structure_id: "ID004".to_string(),
                outcome: Outcome::Resolved {
                    ligand: "MG".to_string(),
                    center: DVec3::new(-12.3456, 0.0005, 100.0),
                },
            },
        ];

        let mut out = Vec::new();
        write_coordinate_table(&mut out, &rows).unwrap();
        let expected = "PDB\tLigand\tX\tY\tZ\n\
            ID001\tNAG\t1.000\t1.000\t0.000\n\
            ID002\t\tNot Found\tNot Found\tNot Found\n\
            ID003\tNAG,MG\tNot Found\tNot Found\tNot Found\n\
            ID004\tMG\t-12.346\t0.001\t100.000\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
