//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

/// Read-only view over the files of a cloned repository
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as UTF-8
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Read raw file contents, used where the encoding is not known up front
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// List directory contents. Order is unspecified.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// List directory contents sorted by name
    fn read_dir_sorted(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = self.read_dir(path)?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        (**self).read_to_string(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        (**self).read(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        (**self).read_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry() {
        let entry = DirEntry {
            path: PathBuf::from("/test/file.txt"),
            name: "file.txt".to_string(),
            file_type: FileType::File,
        };
        assert_eq!(entry.path(), Path::new("/test/file.txt"));
        assert_eq!(entry.file_name(), "file.txt");
        assert!(entry.is_file());
    }
}
