//! Launcher for the Mesh AI Gateway binary.
//!
//! Resolves which transport version to run, finds an origin that hosts the
//! binary for the current platform, caches it under the user cache directory
//! and executes it with the caller's arguments.
//!
//! # Flow
//!
//! 1. `--transport-version` is split off the arguments and validated.
//! 2. The platform and architecture are mapped to a release directory.
//! 3. `latest` is resolved against the release metadata endpoints; a pinned
//!    version is probed on each download origin.
//! 4. A versioned cache directory is prepared, or a scratch directory when
//!    no version could be resolved.
//! 5. One candidate per origin is downloaded if needed and started. The first
//!    one that starts decides the exit code.
//!
//! # Environment
//!
//! - `MESH_GATEWAY_PRODUCT_NAME` - display name in messages
//! - `MESH_GATEWAY_DOWNLOAD_BASE_URL` - primary download origin
//! - `MESH_GATEWAY_RELEASE_API_URL` - primary release metadata endpoint
//! - `MESH_GATEWAY_DOWNLOAD_CHANNEL` - path segment below each origin
//! - `MESH_GATEWAY_CACHE_NAMESPACE` - directory below the user cache root
//! - `MESH_GATEWAY_LEGACY_DIR_FALLBACK` - reuse caches from the old namespace
//! - `MESH_GATEWAY_RELEASE_TIMEOUT` - release lookup timeout in seconds
//! - `MESH_GATEWAY_DEBUG` - print recovery details to stderr

pub mod cache;
pub mod core;
pub mod fetch;
pub mod http;
pub mod launch;
pub mod paths;
pub mod platform;
pub mod source;
pub mod version;

pub use crate::core::config::LauncherConfig;
pub use crate::core::error::{CandidateFailure, FailureCause, LaunchError};
pub use crate::core::output;
pub use crate::launch::{DiagnosticLine, Launched, Launcher, diagnostic, launch, report};
pub use crate::paths::{FixedPaths, PlatformPaths, SystemPaths};
pub use crate::platform::{PlatformError, PlatformTriple};
pub use crate::version::{RequestedVersion, VersionError};
