/// Cell values that mean no ligand was recorded.
const NO_DATA: [&str; 4] = ["", "na", "not available", "none"];

/// Characters that separate alternative ligands within one cell.
const SEPARATORS: [char; 4] = [';', ',', '/', '|'];

/// Parse a native ligand cell into an ordered list of residue names.
///
/// A cell may list several alternatives, e.g. `NAG`, `NAG; MG`, `NAG,MG` or `NAG / MG`. The
/// returned names are trimmed and uppercased and keep the order in which they were written.
/// Empty and "no data" cells produce an empty list.
pub fn parse_candidates(cell: &str) -> Vec<String> {
    let cell = cell.trim();
    if NO_DATA.iter().any(|sentinel| cell.eq_ignore_ascii_case(sentinel)) {
        return Vec::new();
    }

    // Splitting on every separator and dropping empty tokens is the same as splitting on runs.
    cell.split(SEPARATORS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_uppercase)
        .collect()
}
