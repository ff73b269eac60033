//! Binary download
//!
//! Streams an artifact to a staging file with a progress indicator, syncs
//! it, marks it executable and renames it into place. There is no retry here; a failed download is
//! reported to the caller, which decides whether another origin is worth
//! trying.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::output::{self, ProgressGuard};
use crate::http::{HttpClient, HttpError};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Download failed: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Download failed: {0}")]
    Request(HttpError),

    #[error("Download interrupted: {0}")]
    Stream(io::Error),

    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, reason, .. } => FetchError::Status { status, reason },
            other => FetchError::Request(other),
        }
    }
}

/// Download `url` to `dest`, returning the number of bytes written.
///
/// The body is staged in a temporary file beside `dest` and renamed into
/// place once it is complete and executable, so an interrupted download
/// never leaves a partial binary at `dest`.
///
/// `settle` is slept after the rename so a freshly written binary is not
/// executed while the OS still reports it busy.
pub fn download(
    client: &HttpClient,
    url: &str,
    dest: &Path,
    settle: Duration,
) -> Result<u64, FetchError> {
    let response = client.get(url)?;

    let total: Option<u64> = response
        .header("content-length")
        .and_then(|s| s.trim().parse().ok());

    let write_err = |source| FetchError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".download-")
        .tempfile_in(dir)
        .map_err(write_err)?;

    let reader = response.into_reader();
    let written = copy_with_progress(reader, staged.as_file_mut(), dest, total)?;

    staged.as_file_mut().flush().map_err(write_err)?;
    // Data is already with the OS at this point
    if let Err(e) = staged.as_file().sync_all() {
        output::debug(&format!("fsync {} failed: {}", dest.display(), e));
    }
    set_executable(staged.path()).map_err(write_err)?;

    // The returned handle is dropped here, before the binary can be spawned
    staged.persist(dest).map_err(|e| write_err(e.error))?;

    if !settle.is_zero() {
        std::thread::sleep(settle);
    }
    Ok(written)
}

fn copy_with_progress(
    mut reader: impl Read,
    file: &mut File,
    dest: &Path,
    total: Option<u64>,
) -> Result<u64, FetchError> {
    let pb = output::download_progress("Downloading binary");
    let _guard = ProgressGuard::new(&pb);
    if let Some(len) = total {
        output::upgrade_to_percent(&pb, len);
    }

    let mut buffer = [0u8; 8192];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FetchError::Stream(e)),
        };
        file.write_all(&buffer[..n])
            .map_err(|source| FetchError::Write {
                path: dest.to_path_buf(),
                source,
            })?;
        written += n as u64;
        pb.set_position(written);
    }
    Ok(written)
}

/// rwxr-xr-x for the downloaded binary.
#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
