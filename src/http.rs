//! HTTP transport
//!
//! Thin wrapper over a shared `ureq` agent. Release lookups, existence probes
//! and downloads all go through [`HttpClient`] so errors are classified the
//! same way everywhere.

use std::error::Error as _;
use std::io;
use std::time::Duration;

use thiserror::Error;

const USER_AGENT: &str = concat!("mesh-gateway-launcher/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("failed to read response from {url}: {source}")]
    Body { url: String, source: io::Error },
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout { .. })
    }

    fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => HttpError::Status {
                url: url.to_string(),
                status,
                reason: response.status_text().to_string(),
            },
            ureq::Error::Transport(transport) => {
                if transport_timed_out(&transport) {
                    HttpError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    HttpError::Transport {
                        url: url.to_string(),
                        message: transport.to_string(),
                    }
                }
            }
        }
    }

    fn from_body(url: &str, err: io::Error) -> Self {
        if is_timeout_kind(err.kind()) {
            HttpError::Timeout {
                url: url.to_string(),
            }
        } else {
            HttpError::Body {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

fn is_timeout_kind(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}

fn transport_timed_out(transport: &ureq::Transport) -> bool {
    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>()
            && is_timeout_kind(io_err.kind())
        {
            return true;
        }
        source = err.source();
    }
    transport.to_string().contains("timed out")
}

/// Blocking HTTP client shared by every launcher stage.
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new().user_agent(USER_AGENT).build();
        Self { agent }
    }

    /// GET a JSON document, bounded by `timeout`.
    pub fn get_json(&self, url: &str, timeout: Duration) -> Result<serde_json::Value, HttpError> {
        let response = self
            .agent
            .get(url)
            .timeout(timeout)
            .call()
            .map_err(|e| HttpError::from_ureq(url, e))?;
        response
            .into_json()
            .map_err(|e| HttpError::from_body(url, e))
    }

    /// HEAD request; `Ok` only for a 2xx response.
    pub fn probe(&self, url: &str) -> Result<(), HttpError> {
        self.agent
            .head(url)
            .call()
            .map(|_| ())
            .map_err(|e| HttpError::from_ureq(url, e))
    }

    /// Start a GET whose body is streamed by the caller.
    pub fn get(&self, url: &str) -> Result<ureq::Response, HttpError> {
        self.agent
            .get(url)
            .call()
            .map_err(|e| HttpError::from_ureq(url, e))
    }
}
