use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A flat collection of named files: one talking book.
///
/// Names are relative to the book root and use `/` as separator, exactly as
/// they appear in `href` and `src` attributes.
pub trait BookSource: Send + Sync {
    /// Returns the names of the files at the book root, sorted.
    fn list(&self) -> io::Result<Vec<String>>;

    /// Reads the whole file `name`.
    /// Missing files must be reported with `io::ErrorKind::NotFound`.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

// --- Implementation: Local Directory ---

/// A book stored as a directory on the local filesystem.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BookSource for DirSource {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = name
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .fold(self.root.clone(), |path, part| path.join(part));
        fs::read(path)
    }
}

// --- Implementation: In-Memory ---

/// An in-memory book, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous content under the same name.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), data.into());
    }

    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }
}

impl BookSource for MemorySource {
    fn list(&self) -> io::Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{name} not found"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_list_is_sorted() {
        let source = MemorySource::new()
            .with_file("s0002.smil", "<smil/>")
            .with_file("ncc.html", "<html/>");
        assert_eq!(source.list().unwrap(), vec!["ncc.html", "s0002.smil"]);
    }

    #[test]
    fn test_memory_source_missing_file() {
        let source = MemorySource::new();
        let err = source.read("ncc.html").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_dir_source_lists_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ncc.html"), "<html/>").unwrap();
        fs::create_dir(dir.path().join("images")).unwrap();

        let source = DirSource::new(dir.path()).unwrap();
        assert_eq!(source.list().unwrap(), vec!["ncc.html"]);
        assert_eq!(source.read("ncc.html").unwrap(), b"<html/>");
        assert_eq!(
            source.read("missing.smil").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_dir_source_rejects_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(DirSource::new(file.path()).is_err());
    }
}
