//! Launcher configuration
//!
//! Every knob the launcher honours lives in [`LauncherConfig`], built once at
//! process start and passed by reference into each component. Values come
//! from `MESH_GATEWAY_*` environment variables with built-in defaults.

use std::time::Duration;

pub const ENV_PRODUCT_NAME: &str = "MESH_GATEWAY_PRODUCT_NAME";
pub const ENV_BASE_URL: &str = "MESH_GATEWAY_DOWNLOAD_BASE_URL";
pub const ENV_RELEASE_URL: &str = "MESH_GATEWAY_RELEASE_API_URL";
pub const ENV_DOWNLOAD_CHANNEL: &str = "MESH_GATEWAY_DOWNLOAD_CHANNEL";
pub const ENV_CACHE_NAMESPACE: &str = "MESH_GATEWAY_CACHE_NAMESPACE";
pub const ENV_LEGACY_DIR_FALLBACK: &str = "MESH_GATEWAY_LEGACY_DIR_FALLBACK";
pub const ENV_RELEASE_TIMEOUT: &str = "MESH_GATEWAY_RELEASE_TIMEOUT";
pub const ENV_DEBUG: &str = "MESH_GATEWAY_DEBUG";

pub const DEFAULT_PRODUCT_NAME: &str = "Mesh AI Gateway";
pub const DEFAULT_BASE_URL: &str = "https://releases.mesh-ai-gateway.io";
pub const LEGACY_BASE_URL: &str = "https://downloads.getmaxim.ai";
pub const DEFAULT_DOWNLOAD_CHANNEL: &str = "bifrost";
pub const DEFAULT_CACHE_NAMESPACE: &str = "mesh-ai-gateway";
pub const LEGACY_CACHE_NAMESPACE: &str = "bifrost";
pub const DEFAULT_BINARY_STEM: &str = "bifrost-http";

/// Release metadata path appended to a download origin.
const RELEASE_PATH: &str = "bifrost/latest-release";

/// Default bound on a single release-metadata request
const DEFAULT_RELEASE_TIMEOUT_SECS: u64 = 5;

/// Pause after writing a fresh binary before executing it
const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub product_name: String,
    pub base_url: String,
    pub legacy_base_url: String,
    pub release_url: String,
    pub legacy_release_url: String,
    pub download_channel: String,
    pub cache_namespace: String,
    pub legacy_cache_namespace: String,
    /// Consult `<cache>/<legacy namespace>/<version>/bin` when the primary
    /// directory is missing.
    pub legacy_dir_fallback: bool,
    pub release_timeout: Duration,
    pub settle_delay: Duration,
    /// Binary name without platform suffix (`.exe` is added on Windows).
    pub binary_stem: String,
    pub verbose: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl LauncherConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get(ENV_BASE_URL)
            .map(|u| trim_url(&u))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let legacy_base_url = LEGACY_BASE_URL.to_string();
        let release_url = get(ENV_RELEASE_URL)
            .map(|u| trim_url(&u))
            .unwrap_or_else(|| format!("{}/{}", base_url, RELEASE_PATH));
        let legacy_release_url = format!("{}/{}", legacy_base_url, RELEASE_PATH);

        let release_timeout_secs = get(ENV_RELEASE_TIMEOUT)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RELEASE_TIMEOUT_SECS)
            .clamp(1, 60);

        Self {
            product_name: get(ENV_PRODUCT_NAME).unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
            base_url,
            legacy_base_url,
            release_url,
            legacy_release_url,
            download_channel: get(ENV_DOWNLOAD_CHANNEL)
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_CHANNEL.to_string()),
            cache_namespace: get(ENV_CACHE_NAMESPACE)
                .unwrap_or_else(|| DEFAULT_CACHE_NAMESPACE.to_string()),
            legacy_cache_namespace: LEGACY_CACHE_NAMESPACE.to_string(),
            legacy_dir_fallback: parse_flag(get(ENV_LEGACY_DIR_FALLBACK).as_deref(), true),
            release_timeout: Duration::from_secs(release_timeout_secs),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            binary_stem: DEFAULT_BINARY_STEM.to_string(),
            verbose: parse_flag(get(ENV_DEBUG).as_deref(), false),
        }
    }

    /// Download origins in priority order, primary first.
    pub fn download_origins(&self) -> Vec<String> {
        dedup_pair(&self.base_url, &self.legacy_base_url)
    }

    /// Release metadata endpoints in priority order, primary first.
    pub fn release_endpoints(&self) -> Vec<String> {
        dedup_pair(&self.release_url, &self.legacy_release_url)
    }

    /// Channel prefix for an origin, as shown in "version not found" diagnostics.
    pub fn channel_prefix(&self, origin: &str) -> String {
        format!("{}/{}/", origin, self.download_channel)
    }
}

fn dedup_pair(primary: &str, legacy: &str) -> Vec<String> {
    if primary == legacy {
        vec![primary.to_string()]
    } else {
        vec![primary.to_string(), legacy.to_string()]
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Parse a boolean switch; unrecognised values keep the default.
fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
