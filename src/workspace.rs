//! Output filesystem capability
//!
//! The generators and the tracker deal in paths relative to the output root
//! and never touch the filesystem directly; everything goes through this
//! narrow read/write seam. Content is raw bytes at the seam, so binary
//! assets round-trip; the text helpers are for generated documents.
//! Directory creation belongs here, not to callers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait Workspace {
    /// Read a file's raw content, `None` if it does not exist
    fn read_bytes(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Write raw content, creating parent directories as needed
    fn write_bytes(&mut self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Read a file as UTF-8 text
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        match self.read_bytes(path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            None => Ok(None),
        }
    }

    /// Write UTF-8 text
    fn write(&mut self, path: &Path, content: &str) -> io::Result<()> {
        self.write_bytes(path, content.as_bytes())
    }
}

/// Workspace rooted at a real directory
pub struct DiskWorkspace {
    root: PathBuf,
}

impl DiskWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Workspace for DiskWorkspace {
    fn read_bytes(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.absolute(path)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_bytes(&mut self, path: &Path, content: &[u8]) -> io::Result<()> {
        let full = self.absolute(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        log::debug!("wrote {}", full.display());
        Ok(())
    }
}

/// Workspace that reads the real tree but swallows every write
///
/// Backs `--dry-run`: conflict detection still sees the on-disk state, and
/// the report comes out the same, but nothing is touched.
pub struct DryRunWorkspace {
    inner: DiskWorkspace,
}

impl DryRunWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: DiskWorkspace::new(root),
        }
    }
}

impl Workspace for DryRunWorkspace {
    fn read_bytes(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        self.inner.read_bytes(path)
    }

    fn write_bytes(&mut self, path: &Path, _content: &[u8]) -> io::Result<()> {
        log::debug!("dry run, skipping write of {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory workspace for unit tests

    use super::*;
    use indexmap::IndexMap;

    #[derive(Default)]
    pub struct MemoryWorkspace {
        pub files: IndexMap<PathBuf, Vec<u8>>,
    }

    impl MemoryWorkspace {
        /// A stored file as UTF-8, panicking on binary content
        pub fn text(&self, path: &str) -> &str {
            std::str::from_utf8(&self.files[&PathBuf::from(path)]).unwrap()
        }
    }

    impl Workspace for MemoryWorkspace {
        fn read_bytes(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
            Ok(self.files.get(path).cloned())
        }

        fn write_bytes(&mut self, path: &Path, content: &[u8]) -> io::Result<()> {
            self.files.insert(path.to_path_buf(), content.to_vec());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let ws = DiskWorkspace::new(dir.path());
        assert!(ws.read(Path::new("absent.md")).unwrap().is_none());
        assert!(ws.read_bytes(Path::new("absent.md")).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_parents_and_roundtrips() {
        let dir = TempDir::new().unwrap();
        let mut ws = DiskWorkspace::new(dir.path());
        ws.write(Path::new(".claude/commands/x.md"), "body").unwrap();
        assert_eq!(ws.read(Path::new(".claude/commands/x.md")).unwrap().unwrap(), "body");
        assert!(dir.path().join(".claude/commands/x.md").exists());
    }

    #[test]
    fn test_non_utf8_roundtrips_as_bytes() {
        let dir = TempDir::new().unwrap();
        let mut ws = DiskWorkspace::new(dir.path());
        let payload: &[u8] = &[0xFF, 0xFE, 0x00, 0x89];
        ws.write_bytes(Path::new("assets/raw.bin"), payload).unwrap();
        assert_eq!(ws.read_bytes(Path::new("assets/raw.bin")).unwrap().unwrap(), payload);
        // the text helper refuses what it cannot represent
        assert!(ws.read(Path::new("assets/raw.bin")).is_err());
    }

    #[test]
    fn test_dry_run_reads_but_never_writes() {
        let dir = TempDir::new().unwrap();
        let mut ws = DryRunWorkspace::new(dir.path());
        ws.write(Path::new("CLAUDE.md"), "body").unwrap();
        assert!(!dir.path().join("CLAUDE.md").exists());
        assert!(ws.read(Path::new("CLAUDE.md")).unwrap().is_none());
    }
}
