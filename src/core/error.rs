//! Launcher error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;
use crate::platform::PlatformError;
use crate::version::VersionError;

/// Fatal conditions that end a launcher run.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error(transparent)]
    UnsupportedPlatform(#[from] PlatformError),

    #[error("transport version '{version}' not found")]
    VersionNotFound { version: String, probed: Vec<String> },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to create temporary directory: {0}")]
    ScratchDir(io::Error),

    #[error("failed to start {product}: {}", last_failure(.failures))]
    Exhausted {
        product: String,
        failures: Vec<CandidateFailure>,
    },
}

impl LaunchError {
    /// Process exit status for this error.
    ///
    /// A candidate that never started has no status of its own, so every
    /// fatal class maps to 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

fn last_failure(failures: &[CandidateFailure]) -> String {
    failures
        .last()
        .map(|f| f.cause.to_string())
        .unwrap_or_else(|| "no download origins configured".to_string())
}

/// Why one launch candidate was abandoned.
#[derive(Error, Debug)]
pub enum FailureCause {
    #[error(transparent)]
    Download(#[from] FetchError),

    #[error("{0}")]
    Spawn(io::Error),
}

/// A launch candidate that could not be started.
#[derive(Debug)]
pub struct CandidateFailure {
    pub index: usize,
    pub origin: String,
    pub path: PathBuf,
    pub cause: FailureCause,
}

impl CandidateFailure {
    /// The underlying OS error, when the failure came from the OS.
    pub fn os_error(&self) -> Option<&io::Error> {
        match &self.cause {
            FailureCause::Spawn(err) => Some(err),
            FailureCause::Download(FetchError::Write { source, .. }) => Some(source),
            FailureCause::Download(_) => None,
        }
    }

    /// Symbolic errno name (`ENOENT`, `ETXTBSY`, ...) when known.
    pub fn code(&self) -> Option<&'static str> {
        self.errno().and_then(errno_name)
    }

    pub fn errno(&self) -> Option<i32> {
        self.os_error().and_then(io::Error::raw_os_error)
    }

    /// Whether this looks like a Linux binary-compatibility problem.
    pub fn is_linux_compat_symptom(&self) -> bool {
        cfg!(target_os = "linux") && matches!(self.code(), Some("ENOENT" | "ETXTBSY"))
    }
}

#[cfg(unix)]
fn errno_name(errno: i32) -> Option<&'static str> {
    let name = match errno {
        libc::ENOENT => "ENOENT",
        libc::EACCES => "EACCES",
        libc::EPERM => "EPERM",
        libc::ETXTBSY => "ETXTBSY",
        libc::ENOEXEC => "ENOEXEC",
        libc::ENOSPC => "ENOSPC",
        libc::EISDIR => "EISDIR",
        _ => return None,
    };
    Some(name)
}

#[cfg(not(unix))]
fn errno_name(errno: i32) -> Option<&'static str> {
    match errno {
        2 => Some("ENOENT"),
        5 => Some("EACCES"),
        _ => None,
    }
}
