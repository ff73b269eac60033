//! Binary cache layout
//!
//! Downloaded binaries live at
//! `<cache root>/<namespace>/<version>/bin/<binary>-<origin index>`.
//! Installs made before the namespace rename are picked up from the legacy
//! namespace until the primary directory exists. Without a resolved version
//! nothing is cached and a per-run scratch directory is used instead.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::config::LauncherConfig;
use crate::core::error::LaunchError;
use crate::core::output;
use crate::paths::PlatformPaths;
use crate::platform::PlatformError;

/// Directory holding candidate binaries for this run.
#[derive(Debug)]
pub enum BinDir {
    /// Reusable cache directory keyed by version.
    Persistent(PathBuf),
    /// Scratch directory removed when dropped; always re-downloaded.
    Ephemeral(TempDir),
}

impl BinDir {
    pub fn path(&self) -> &Path {
        match self {
            BinDir::Persistent(path) => path,
            BinDir::Ephemeral(dir) => dir.path(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, BinDir::Persistent(_))
    }

    /// Local file for the candidate downloaded from origin `index`.
    pub fn candidate_path(&self, binary_name: &str, index: usize) -> PathBuf {
        self.path().join(format!("{}-{}", binary_name, index))
    }
}

/// `<root>/<namespace>/<version>/bin`
pub fn version_bin_dir(root: &Path, namespace: &str, version: &str) -> PathBuf {
    root.join(namespace).join(version).join("bin")
}

/// Pick the cache directory for `version` without touching the filesystem
/// beyond existence checks.
pub fn select_bin_dir(root: &Path, config: &LauncherConfig, version: &str) -> PathBuf {
    let primary = version_bin_dir(root, &config.cache_namespace, version);
    if primary.exists() || !config.legacy_dir_fallback {
        return primary;
    }

    let legacy = version_bin_dir(root, &config.legacy_cache_namespace, version);
    if legacy.exists() {
        output::debug(&format!("using legacy cache directory {}", legacy.display()));
        return legacy;
    }
    primary
}

/// Prepare the directory binaries are downloaded into and executed from.
pub fn prepare(
    paths: &dyn PlatformPaths,
    config: &LauncherConfig,
    resolved_version: Option<&str>,
) -> Result<BinDir, LaunchError> {
    let Some(version) = resolved_version else {
        let scratch = paths.scratch_dir().map_err(LaunchError::ScratchDir)?;
        output::debug(&format!(
            "no resolved version, using scratch directory {}",
            scratch.path().display()
        ));
        return Ok(BinDir::Ephemeral(scratch));
    };

    let root = paths.cache_root().ok_or_else(|| PlatformError::NoCacheDir {
        os: std::env::consts::OS.to_string(),
    })?;

    let dir = select_bin_dir(&root, config, version);
    std::fs::create_dir_all(&dir).map_err(|source| LaunchError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    Ok(BinDir::Persistent(dir))
}
