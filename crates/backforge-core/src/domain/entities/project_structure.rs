use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::{
    entities::common::{Permissions, RelativePath},
    error::DomainError,
};

/// Rendered files ready to be written under `root`.
///
/// Carries no rendering logic. Paths are relative and checked on insert; the
/// structure as a whole is checked by [`ProjectStructure::validate`].
#[derive(Debug, Clone)]
pub struct ProjectStructure {
    root: PathBuf,
    entries: Vec<FsEntry>,
}

impl ProjectStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&mut self, path: RelativePath, content: String, permissions: Permissions) {
        self.entries.push(FsEntry::File(FileToWrite {
            path,
            content,
            permissions,
        }));
    }

    pub fn add_directory(&mut self, path: RelativePath) {
        self.entries.push(FsEntry::Directory(path));
    }

    pub fn with_file(mut self, path: RelativePath, content: String, permissions: Permissions) -> Self {
        self.add_file(path, content, permissions);
        self
    }

    /// Non-empty, and no path appears twice.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.entries.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "project structure is empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.path()) {
                return Err(DomainError::DuplicatePath {
                    path: entry.path().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn files(&self) -> impl Iterator<Item = &FileToWrite> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::File(f) => Some(f),
            FsEntry::Directory(_) => None,
        })
    }

    pub fn file(&self, path: &str) -> Option<&FileToWrite> {
        self.files().find(|f| f.path.to_slash_string() == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path().to_slash_string() == path)
    }

    /// Explicit directories plus every parent of a file, shallowest first.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs = BTreeSet::new();
        for entry in &self.entries {
            if let FsEntry::Directory(dir) = entry {
                dirs.insert(dir.as_path().to_path_buf());
            }
            let mut parent = entry.path().as_path().parent();
            while let Some(dir) = parent {
                if dir.as_os_str().is_empty() {
                    break;
                }
                dirs.insert(dir.to_path_buf());
                parent = dir.parent();
            }
        }
        let mut dirs: Vec<PathBuf> = dirs.into_iter().collect();
        dirs.sort_by_key(|d| d.components().count());
        dirs
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.files().map(FileToWrite::size).sum()
    }
}

#[derive(Debug, Clone)]
pub enum FsEntry {
    File(FileToWrite),
    Directory(RelativePath),
}

impl FsEntry {
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => d,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileToWrite {
    pub path: RelativePath,
    pub content: String,
    pub permissions: Permissions,
}

impl FileToWrite {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    #[test]
    fn empty_structure_is_invalid() {
        assert!(ProjectStructure::new("out").validate().is_err());
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let structure = ProjectStructure::new("out")
            .with_file(rel("src/app.ts"), "a".into(), Permissions::ReadWrite)
            .with_file(rel("src/app.ts"), "b".into(), Permissions::ReadWrite);
        assert!(matches!(
            structure.validate(),
            Err(DomainError::DuplicatePath { path }) if path == "src/app.ts"
        ));
    }

    #[test]
    fn directories_include_parents_shallowest_first() {
        let mut structure = ProjectStructure::new("out")
            .with_file(rel("src/routes/routes.json"), "{}".into(), Permissions::ReadWrite)
            .with_file(rel("package.json"), "{}".into(), Permissions::ReadWrite);
        structure.add_directory(rel("logs"));

        let dirs = structure.directories();
        assert_eq!(
            dirs,
            [PathBuf::from("logs"), PathBuf::from("src"), PathBuf::from("src/routes")]
        );
        assert!(structure.contains("package.json"));
        assert_eq!(structure.file("src/routes/routes.json").map(|f| f.size()), Some(2));
        assert_eq!(structure.total_bytes(), 4);
    }
}
