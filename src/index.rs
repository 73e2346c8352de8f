use std::path::{Path, PathBuf};

use crate::config::MatchMode;
use crate::error::ConfigError;

/// An indexed structure file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureFileEntry {
    /// Lowercased file name, including the extension.
    pub basename: String,
    pub path: PathBuf,
}

/// Lookup table of all structure files under some root directory.
///
/// Invariant: A `StructureIndex` has at least one entry.
#[derive(Debug)]
pub struct StructureIndex {
    entries: Vec<StructureFileEntry>,
    mode: MatchMode,
}

impl StructureIndex {
    /// Recursively collect all files under `root` that have the provided `extension`.
    ///
    /// The extension is compared case-insensitively. Directories are walked depth first, with the
    /// entries of each directory visited in file name order, so repeated runs over the same tree
    /// produce the same index. Duplicate names are kept.
    pub fn build(root: &Path, extension: &str, mode: MatchMode) -> Result<Self, ConfigError> {
        let unreadable = |source| ConfigError::UnreadableRoot {
            root: root.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        collect(root, extension, &mut entries).map_err(unreadable)?;
        if entries.is_empty() {
            return Err(ConfigError::NoStructureFiles {
                root: root.to_path_buf(),
                extension: extension.to_string(),
            });
        }

        Ok(Self { entries, mode })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[StructureFileEntry] {
        &self.entries
    }

    /// Find the first indexed file that matches `identifier`.
    pub fn locate(&self, identifier: &str) -> Option<&Path> {
        let id = identifier.trim().to_lowercase();
        if id.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|entry| match self.mode {
                MatchMode::Substring => entry.basename.contains(&id),
                MatchMode::Exact => stem(&entry.basename) == id,
            })
            .map(|entry| entry.path.as_path())
    }
}

fn stem(basename: &str) -> &str {
    basename.rsplit_once('.').map_or(basename, |(stem, _)| stem)
}

/// Walk the tree below `root`.
///
/// Only a failure to read `root` itself is an error. Nested directories that cannot be read are
/// reported and skipped.
fn collect(
    root: &Path,
    extension: &str,
    entries: &mut Vec<StructureFileEntry>,
) -> std::io::Result<()> {
    for path in sorted_children(root)? {
        visit(path, extension, entries);
    }
    Ok(())
}

fn descend(dir: &Path, extension: &str, entries: &mut Vec<StructureFileEntry>) {
    match sorted_children(dir) {
        Ok(children) => {
            for path in children {
                visit(path, extension, entries);
            }
        }
        Err(err) => log::warn!("Skipping unreadable directory {dir:?}: {err}"),
    }
}

fn visit(path: PathBuf, extension: &str, entries: &mut Vec<StructureFileEntry>) {
    if path.is_dir() {
        descend(&path, extension, entries);
        return;
    }

    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if !has_extension {
        return;
    }

    if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
        entries.push(StructureFileEntry {
            basename: name.to_lowercase(),
            path,
        });
    }
}

fn sorted_children(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut children = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    children.sort();
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "END\n").unwrap();
    }

    #[test]
    fn recursive_and_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a/1abc.pdb"));
        touch(&dir.path().join("b/c/2XYZ.PDB"));
        touch(&dir.path().join("b/3def.Pdb"));
        touch(&dir.path().join("b/notes.txt"));
        touch(&dir.path().join("b/4ghi.pdbqt"));

        let index = StructureIndex::build(dir.path(), "pdb", MatchMode::Substring).unwrap();
        let names: Vec<_> = index.entries().iter().map(|e| e.basename.as_str()).collect();
        assert_eq!(names, ["1abc.pdb", "3def.pdb", "2xyz.pdb"]);
    }

    #[test]
    fn empty_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("readme.md"));
        let err = StructureIndex::build(dir.path(), "pdb", MatchMode::Substring).unwrap_err();
        assert!(matches!(err, ConfigError::NoStructureFiles { .. }));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StructureIndex::build(&dir.path().join("nope"), "pdb", MatchMode::Substring)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnreadableRoot { .. }));
    }

    #[test]
    fn unreadable_nested_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("1abc.pdb"));
        touch(&dir.path().join("zz/2xyz.pdb"));

        // A directory that vanished during the walk.
        let mut entries = Vec::new();
        descend(&dir.path().join("gone"), "pdb", &mut entries);
        assert!(entries.is_empty());

        descend(dir.path(), "pdb", &mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.basename.as_str()).collect();
        assert_eq!(names, ["1abc.pdb", "2xyz.pdb"]);
    }

    #[cfg(unix)]
    #[test]
    fn locked_directory_does_not_stop_the_index() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("1abc.pdb"));
        let locked = dir.path().join("zz_locked");
        touch(&locked.join("2xyz.pdb"));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let index = StructureIndex::build(dir.path(), "pdb", MatchMode::Substring);

        // Restore the permissions so the temporary directory can be removed.
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        let index = index.unwrap();
        assert_eq!(index.locate("1abc"), Some(dir.path().join("1abc.pdb").as_path()));
    }

    #[test]
    fn substring_lookup() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("21abc.pdb"));
        touch(&dir.path().join("3def_chainA_v2.pdb"));

        let index = StructureIndex::build(dir.path(), "pdb", MatchMode::Substring).unwrap();
        assert_eq!(index.locate(" 3DEF "), Some(dir.path().join("3def_chainA_v2.pdb").as_path()));
        // The known false positive of substring matching.
        assert_eq!(index.locate("1ABC"), Some(dir.path().join("21abc.pdb").as_path()));
        assert_eq!(index.locate("9zzz"), None);
        assert_eq!(index.locate("  "), None);
    }

    #[test]
    fn exact_lookup() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("21abc.pdb"));
        touch(&dir.path().join("1ABC.pdb"));

        let index = StructureIndex::build(dir.path(), "pdb", MatchMode::Exact).unwrap();
        assert_eq!(index.locate("1abc"), Some(dir.path().join("1ABC.pdb").as_path()));
        assert_eq!(index.locate("abc"), None);
    }

    #[test]
    fn first_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a/1abc_a.pdb"));
        touch(&dir.path().join("b/1abc_b.pdb"));

        let index = StructureIndex::build(dir.path(), "pdb", MatchMode::Substring).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.locate("1ABC"), Some(dir.path().join("a/1abc_a.pdb").as_path()));
    }
}
