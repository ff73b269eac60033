//! Download origin selection
//!
//! Artifacts live at `{origin}/{channel}/{version}/{platform}/{arch}/{binary}`.
//! Origins are probed with HEAD requests in priority order and the first one
//! answering 2xx hosts the artifact.

use crate::core::config::LauncherConfig;
use crate::core::fallback::{Attempt, Fallback, first_success};
use crate::core::output;
use crate::http::{HttpClient, HttpError};
use crate::platform::PlatformTriple;

/// Full artifact URL on one origin.
pub fn artifact_url(
    origin: &str,
    config: &LauncherConfig,
    version: &str,
    triple: &PlatformTriple,
) -> String {
    format!(
        "{}/{}/{}",
        origin,
        config.download_channel,
        triple.artifact_path(version)
    )
}

/// Origin that hosts `version`, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrigin {
    pub index: usize,
    pub origin: String,
}

/// Find the first origin serving `version` for `triple`.
pub fn resolve_origin(
    client: &HttpClient,
    config: &LauncherConfig,
    version: &str,
    triple: &PlatformTriple,
) -> Option<ResolvedOrigin> {
    let result = first_success(config.download_origins(), |_, origin| {
        let url = artifact_url(&origin, config, version, triple);
        match client.probe(&url) {
            Ok(()) => Attempt::Done(origin),
            Err(err) => {
                output::debug(&format!("probe failed: {}", err));
                Attempt::<String, HttpError>::Next(err)
            }
        }
    });

    match result {
        Fallback::Found { index, value, .. } => Some(ResolvedOrigin {
            index,
            origin: value,
        }),
        _ => None,
    }
}
