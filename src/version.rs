//! Transport version selection.
//!
//! The requested version comes from `--transport-version` (either
//! `--transport-version=v1.2.3` or `--transport-version v1.2.3`) and is
//! either `latest` or `v<major>.<minor>.<patch>[-<prerelease>]`.
//! `latest` is resolved against the release metadata endpoints in order.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use crate::core::config::LauncherConfig;
use crate::core::fallback::{Attempt, first_success};
use crate::core::output;
use crate::http::{HttpClient, HttpError};

/// Launcher flag selecting the transport version.
pub const VERSION_FLAG: &str = "--transport-version";

/// Keys checked, in order, for the version in a release metadata document.
const RELEASE_VERSION_KEYS: [&str; 4] = ["name", "tag", "version", "tag_name"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error(
        "Invalid transport version format: {0}\n\
         Transport version must be either \"latest\", \"v1.2.3\", or \"v1.2.3-prerelease1\""
    )]
    InvalidFormat(String),
}

/// Version asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestedVersion {
    #[default]
    Latest,
    Pinned(String),
}

impl RequestedVersion {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Latest => "latest",
            Self::Pinned(v) => v,
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl fmt::Display for RequestedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestedVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "latest" {
            return Ok(Self::Latest);
        }
        if is_release_tag(s) {
            return Ok(Self::Pinned(s.to_string()));
        }
        Err(VersionError::InvalidFormat(s.to_string()))
    }
}

/// `v<major>.<minor>.<patch>` with an optional `-<prerelease>` suffix.
/// Digits are ASCII only; the tag becomes a URL and cache path segment.
const RELEASE_TAG_PATTERN: &str = r"^v[0-9]+\.[0-9]+\.[0-9]+(?:-[0-9A-Za-z.-]+)?$";

static RELEASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RELEASE_TAG_PATTERN).expect("valid release tag pattern"));

/// Whether `s` is a concrete release tag such as `v1.2.3` or `v1.2.3-rc1`.
pub fn is_release_tag(s: &str) -> bool {
    RELEASE_TAG.is_match(s)
}

/// Pull `--transport-version` out of the argument list.
///
/// Returns the validated version and the arguments to hand to the binary.
/// Only the first occurrence is consumed; a bare flag with no following
/// value keeps the default.
pub fn split_version_flag(
    mut args: Vec<String>,
) -> Result<(RequestedVersion, Vec<String>), VersionError> {
    let prefixed = format!("{}=", VERSION_FLAG);
    let Some(index) = args
        .iter()
        .position(|a| a == VERSION_FLAG || a.starts_with(&prefixed))
    else {
        return Ok((RequestedVersion::Latest, args));
    };

    let flag = args.remove(index);
    let raw = match flag.split_once('=') {
        Some((_, value)) => Some(value.to_string()),
        None if index < args.len() => Some(args.remove(index)),
        None => None,
    };

    let version = match raw {
        Some(value) => value.parse()?,
        None => RequestedVersion::Latest,
    };
    Ok((version, args))
}

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("release metadata from {url} has no usable version field")]
    MissingVersion { url: String },
}

impl ReleaseError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReleaseError::Http(e) if e.is_timeout())
    }
}

/// First populated version field of a release metadata document.
pub fn version_from_metadata(json: &serde_json::Value) -> Option<String> {
    RELEASE_VERSION_KEYS
        .iter()
        .filter_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Fetch the latest version from a single release endpoint.
pub fn fetch_release_version(
    client: &HttpClient,
    url: &str,
    timeout: Duration,
) -> Result<String, ReleaseError> {
    let json = client.get_json(url, timeout)?;
    version_from_metadata(&json)
        // Used as a cache path segment
        .filter(|v| !v.contains(['/', '\\']) && v != "." && v != "..")
        .ok_or_else(|| ReleaseError::MissingVersion {
            url: url.to_string(),
        })
}

/// Resolve `latest` against the configured release endpoints.
///
/// Unreachable or malformed endpoints are skipped; `None` means no endpoint
/// produced a version.
pub fn latest_version(client: &HttpClient, config: &LauncherConfig) -> Option<String> {
    first_success(config.release_endpoints(), |_, url| {
        match fetch_release_version(client, &url, config.release_timeout) {
            Ok(version) => {
                output::debug(&format!("latest version {} from {}", version, url));
                Attempt::Done(version)
            }
            Err(err) => {
                if err.is_timeout() {
                    output::debug(&format!("release lookup timed out: {}", url));
                } else {
                    output::debug(&format!("release lookup failed: {}", err));
                }
                Attempt::Next(err)
            }
        }
    })
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_release_tag_grammar() {
        for ok in ["v1.2.3", "v0.0.0", "v10.20.30", "v1.2.3-rc1", "v1.2.3-beta.2", "v1.2.3-a-b"] {
            assert!(is_release_tag(ok), "{} should be accepted", ok);
        }
        for bad in [
            "1.2.3",
            "v1.2",
            "v1.2.3.4",
            "v1..3",
            "va.b.c",
            "v1.2.3-",
            "v1.2.3+build",
            "v1.2.3-rc_1",
            "",
            "v",
            "V1.2.3",
            " v1.2.3",
            "v1.2.3\n",
            "v\u{0661}.2.3",
        ] {
            assert!(!is_release_tag(bad), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_parse_requested_version() {
        assert_eq!("latest".parse::<RequestedVersion>(), Ok(RequestedVersion::Latest));
        assert_eq!(
            "v1.2.3".parse::<RequestedVersion>(),
            Ok(RequestedVersion::Pinned("v1.2.3".to_string()))
        );
        assert_eq!(
            "nightly".parse::<RequestedVersion>(),
            Err(VersionError::InvalidFormat("nightly".to_string()))
        );
    }

    #[test]
    fn test_invalid_version_message_shows_grammar() {
        let msg = VersionError::InvalidFormat("1.2".to_string()).to_string();
        assert!(msg.contains("Invalid transport version format: 1.2"));
        assert!(msg.contains("\"v1.2.3-prerelease1\""));
    }

    #[test]
    fn test_split_flag_space_form() {
        let (version, rest) =
            split_version_flag(args(&["--transport-version", "v1.2.3", "--foo", "bar"])).unwrap();
        assert_eq!(version, RequestedVersion::Pinned("v1.2.3".to_string()));
        assert_eq!(rest, args(&["--foo", "bar"]));
    }

    #[test]
    fn test_split_flag_equals_form() {
        let (version, rest) =
            split_version_flag(args(&["-p", "8080", "--transport-version=v2.0.0-rc.1"])).unwrap();
        assert_eq!(version, RequestedVersion::Pinned("v2.0.0-rc.1".to_string()));
        assert_eq!(rest, args(&["-p", "8080"]));
    }

    #[test]
    fn test_split_flag_absent_defaults_to_latest() {
        let (version, rest) = split_version_flag(args(&["--foo"])).unwrap();
        assert!(version.is_latest());
        assert_eq!(rest, args(&["--foo"]));
    }

    #[test]
    fn test_split_flag_trailing_without_value() {
        let (version, rest) = split_version_flag(args(&["--foo", "--transport-version"])).unwrap();
        assert!(version.is_latest());
        assert_eq!(rest, args(&["--foo"]));
    }

    #[test]
    fn test_split_flag_only_first_occurrence() {
        let (version, rest) = split_version_flag(args(&[
            "--transport-version=latest",
            "--transport-version",
            "v1.0.0",
        ]))
        .unwrap();
        assert!(version.is_latest());
        assert_eq!(rest, args(&["--transport-version", "v1.0.0"]));
    }

    #[test]
    fn test_split_flag_rejects_bad_value() {
        let err = split_version_flag(args(&["--transport-version", "1.2.3"])).unwrap_err();
        assert_eq!(err, VersionError::InvalidFormat("1.2.3".to_string()));
    }

    #[test]
    fn test_unrelated_lookalike_flag_passes_through() {
        let (version, rest) = split_version_flag(args(&["--transport-versions", "x"])).unwrap();
        assert!(version.is_latest());
        assert_eq!(rest, args(&["--transport-versions", "x"]));
    }

    #[test]
    fn test_version_from_metadata_key_order() {
        let json = serde_json::json!({"tag_name": "v3.0.0", "version": "v2.0.0", "name": "v1.0.0"});
        assert_eq!(version_from_metadata(&json).as_deref(), Some("v1.0.0"));

        let json = serde_json::json!({"name": "", "tag": null, "tag_name": "v3.0.0"});
        assert_eq!(version_from_metadata(&json).as_deref(), Some("v3.0.0"));

        let json = serde_json::json!({"name": 7, "published": true});
        assert_eq!(version_from_metadata(&json), None);
    }

    mod mock_tests {
        use super::*;
        use crate::core::config::ENV_RELEASE_URL;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn release(body: serde_json::Value) -> ResponseTemplate {
            ResponseTemplate::new(200).set_body_json(body)
        }

        fn config_for(primary: &str, legacy: &str) -> LauncherConfig {
            let mut config = LauncherConfig::from_lookup(|key| {
                (key == ENV_RELEASE_URL).then(|| primary.to_string())
            });
            config.legacy_release_url = legacy.to_string();
            config.release_timeout = Duration::from_millis(300);
            config
        }

        #[tokio::test]
        async fn test_primary_endpoint_wins() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/primary"))
                .respond_with(release(serde_json::json!({"name": "v1.4.0"})))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/legacy"))
                .respond_with(release(serde_json::json!({"name": "v0.9.0"})))
                .expect(0)
                .mount(&server)
                .await;

            let config = config_for(
                &format!("{}/primary", server.uri()),
                &format!("{}/legacy", server.uri()),
            );
            assert_eq!(
                latest_version(&HttpClient::new(), &config).as_deref(),
                Some("v1.4.0")
            );
        }

        #[tokio::test]
        async fn test_falls_back_to_legacy_endpoint() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/primary"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/legacy"))
                .respond_with(release(serde_json::json!({"tag_name": "v0.9.0"})))
                .mount(&server)
                .await;

            let config = config_for(
                &format!("{}/primary", server.uri()),
                &format!("{}/legacy", server.uri()),
            );
            assert_eq!(
                latest_version(&HttpClient::new(), &config).as_deref(),
                Some("v0.9.0")
            );
        }

        #[tokio::test]
        async fn test_missing_field_moves_to_next_endpoint() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/primary"))
                .respond_with(release(serde_json::json!({"assets": []})))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/legacy"))
                .respond_with(release(serde_json::json!({"version": "v0.8.0"})))
                .mount(&server)
                .await;

            let config = config_for(
                &format!("{}/primary", server.uri()),
                &format!("{}/legacy", server.uri()),
            );
            assert_eq!(
                latest_version(&HttpClient::new(), &config).as_deref(),
                Some("v0.8.0")
            );
        }

        #[tokio::test]
        async fn test_all_endpoints_time_out() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"name": "v1.0.0"}))
                        .set_delay(Duration::from_secs(3)),
                )
                .mount(&server)
                .await;

            let config = config_for(
                &format!("{}/primary", server.uri()),
                &format!("{}/legacy", server.uri()),
            );
            let err = fetch_release_version(
                &HttpClient::new(),
                &config.release_url,
                config.release_timeout,
            )
            .unwrap_err();
            assert!(err.is_timeout());
            assert_eq!(latest_version(&HttpClient::new(), &config), None);
        }

        #[tokio::test]
        async fn test_path_like_version_rejected() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(release(serde_json::json!({"name": "../../etc"})))
                .mount(&server)
                .await;

            let url = format!("{}/primary", server.uri());
            let err = fetch_release_version(&HttpClient::new(), &url, Duration::from_secs(5))
                .unwrap_err();
            assert!(matches!(err, ReleaseError::MissingVersion { .. }));
        }
    }
}
