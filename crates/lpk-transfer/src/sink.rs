//! Where generated spreadsheets go.
//!
//! Export and template generation build the file in memory and hand the
//! bytes to a [`FileSink`]. A directory on disk and an in-memory list are
//! provided; anything else (an HTTP response, an upload) implements the trait.

use std::io;
use std::path::{Path, PathBuf};

/// A file handed to a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub file_name: String,
    /// Path on disk, when the sink wrote one
    pub location: Option<PathBuf>,
    /// Size in bytes
    pub bytes: usize,
}

/// Receives finished files
pub trait FileSink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<DeliveredFile>;
}

/// Writes every file into one directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<DeliveredFile> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(DeliveredFile {
            file_name: file_name.to_string(),
            location: Some(path),
            bytes: bytes.len(),
        })
    }
}

/// Keeps delivered files in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of the most recent file with this name
    pub fn get(&self, file_name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .rev()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Remove and return everything delivered so far
    pub fn take(&mut self) -> Vec<(String, Vec<u8>)> {
        std::mem::take(&mut self.files)
    }
}

impl FileSink for MemorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<DeliveredFile> {
        self.files.push((file_name.to_string(), bytes.to_vec()));
        Ok(DeliveredFile {
            file_name: file_name.to_string(),
            location: None,
            bytes: bytes.len(),
        })
    }
}

/// Make a file name stem safe for any file system.
///
/// Path separators and characters Windows refuses become `_`. A stem that
/// ends up empty becomes `data`.
pub fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "data".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("siswa"), "siswa");
        assert_eq!(sanitize_stem("data/siswa:2024"), "data_siswa_2024");
        assert_eq!(sanitize_stem("  ..  "), "data");
        assert_eq!(sanitize_stem("../etc"), "_etc");
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        let delivered = sink.deliver("a.xlsx", b"abc").unwrap();
        assert_eq!(delivered.bytes, 3);
        assert_eq!(delivered.location, None);
        assert_eq!(sink.get("a.xlsx"), Some(&b"abc"[..]));
        assert_eq!(sink.take().len(), 1);
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_directory_sink_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(tmp.path().join("out"));
        let delivered = sink.deliver("b.xlsx", b"xyz").unwrap();
        let path = delivered.location.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"xyz");
    }
}
