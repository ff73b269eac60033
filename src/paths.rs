//! Platform path lookups
//!
//! The user cache root and scratch directories sit behind [`PlatformPaths`] so
//! tests can point the launcher at a throwaway directory.

use std::io;
use std::path::PathBuf;

use tempfile::TempDir;

pub trait PlatformPaths {
    /// OS user cache directory (XDG cache on Linux, `~/Library/Caches` on
    /// macOS, `%LOCALAPPDATA%` on Windows).
    fn cache_root(&self) -> Option<PathBuf>;

    /// Fresh per-run directory, removed when the returned guard drops.
    fn scratch_dir(&self) -> io::Result<TempDir>;
}

/// Paths of the running system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPaths;

impl PlatformPaths for SystemPaths {
    fn cache_root(&self) -> Option<PathBuf> {
        dirs::cache_dir()
    }

    fn scratch_dir(&self) -> io::Result<TempDir> {
        tempfile::Builder::new().prefix("mesh-gateway-").tempdir()
    }
}

/// Fixed cache root with scratch directories created beneath it.
#[derive(Debug, Clone)]
pub struct FixedPaths {
    pub cache_root: Option<PathBuf>,
    pub scratch_root: PathBuf,
}

impl FixedPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cache_root: Some(root.join("cache")),
            scratch_root: root.join("tmp"),
        }
    }
}

impl PlatformPaths for FixedPaths {
    fn cache_root(&self) -> Option<PathBuf> {
        self.cache_root.clone()
    }

    fn scratch_dir(&self) -> io::Result<TempDir> {
        std::fs::create_dir_all(&self.scratch_root)?;
        tempfile::Builder::new()
            .prefix("mesh-gateway-")
            .tempdir_in(&self.scratch_root)
    }
}
