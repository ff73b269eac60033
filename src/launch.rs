//! Acquire and start the gateway binary.
//!
//! One candidate per download origin, tried strictly in priority order:
//! download the binary if it is not cached (or caching is off), then execute
//! it with the caller's arguments and inherited stdio. The first candidate
//! that starts ends the run with that process's exit code, whatever it is.
//! Only a candidate that cannot be downloaded or started moves on to the next.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::cache::{self, BinDir};
use crate::core::config::LauncherConfig;
use crate::core::error::{CandidateFailure, FailureCause, LaunchError};
use crate::core::fallback::{Attempt, Fallback, first_success};
use crate::core::output;
use crate::fetch;
use crate::http::HttpClient;
use crate::paths::PlatformPaths;
use crate::platform::PlatformTriple;
use crate::source;
use crate::version::{self, RequestedVersion};

/// One (origin, local path) pair considered for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub index: usize,
    pub origin: String,
    pub url: String,
    pub path: PathBuf,
}

/// A candidate that started and ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub index: usize,
    pub path: PathBuf,
    pub exit_code: i32,
    /// Whether this run downloaded the binary that was executed.
    pub downloaded: bool,
}

pub struct Launcher<'a> {
    config: &'a LauncherConfig,
    paths: &'a dyn PlatformPaths,
    client: HttpClient,
    triple: PlatformTriple,
}

impl<'a> Launcher<'a> {
    /// Launcher for the running platform.
    pub fn new(
        config: &'a LauncherConfig,
        paths: &'a dyn PlatformPaths,
    ) -> Result<Self, LaunchError> {
        let triple = PlatformTriple::current(&config.binary_stem)?;
        Ok(Self::with_triple(config, paths, triple))
    }

    pub fn with_triple(
        config: &'a LauncherConfig,
        paths: &'a dyn PlatformPaths,
        triple: PlatformTriple,
    ) -> Self {
        Self {
            config,
            paths,
            client: HttpClient::new(),
            triple,
        }
    }

    pub fn triple(&self) -> &PlatformTriple {
        &self.triple
    }

    /// Turn the requested version into the version used for caching.
    ///
    /// `latest` that cannot be resolved yields `None`. A pinned version must
    /// be served by at least one origin.
    pub fn resolve_version(
        &self,
        requested: &RequestedVersion,
    ) -> Result<Option<String>, LaunchError> {
        match requested {
            RequestedVersion::Latest => Ok(version::latest_version(&self.client, self.config)),
            RequestedVersion::Pinned(tag) => {
                match source::resolve_origin(&self.client, self.config, tag, &self.triple) {
                    Some(found) => {
                        output::debug(&format!("{} found at {}", tag, found.origin));
                        Ok(Some(tag.clone()))
                    }
                    None => Err(LaunchError::VersionNotFound {
                        version: tag.clone(),
                        probed: self
                            .config
                            .download_origins()
                            .iter()
                            .map(|o| self.config.channel_prefix(o))
                            .collect(),
                    }),
                }
            }
        }
    }

    /// Launch candidates in origin priority order.
    pub fn candidates(&self, bin_dir: &BinDir, version: &str) -> Vec<Candidate> {
        self.config
            .download_origins()
            .into_iter()
            .enumerate()
            .map(|(index, origin)| Candidate {
                index,
                url: source::artifact_url(&origin, self.config, version, &self.triple),
                path: bin_dir.candidate_path(&self.triple.binary_name, index),
                origin,
            })
            .collect()
    }

    /// Resolve, acquire and execute, returning once a candidate has run.
    pub fn run(
        &self,
        requested: &RequestedVersion,
        args: &[String],
    ) -> Result<Launched, LaunchError> {
        let resolved = self.resolve_version(requested)?;
        let bin_dir = cache::prepare(self.paths, self.config, resolved.as_deref())?;
        let version = resolved.as_deref().unwrap_or(requested.as_str());

        let outcome = first_success(self.candidates(&bin_dir, version), |_, candidate| {
            self.try_candidate(&bin_dir, candidate, args)
        });

        match outcome {
            Fallback::Found { value, .. } => Ok(value),
            Fallback::Aborted { error, mut skipped, .. } => {
                skipped.push(error);
                Err(self.exhausted(skipped))
            }
            Fallback::Exhausted(failures) => Err(self.exhausted(failures)),
        }
    }

    fn exhausted(&self, failures: Vec<CandidateFailure>) -> LaunchError {
        LaunchError::Exhausted {
            product: self.config.product_name.clone(),
            failures,
        }
    }

    fn try_candidate(
        &self,
        bin_dir: &BinDir,
        candidate: Candidate,
        args: &[String],
    ) -> Attempt<Launched, CandidateFailure> {
        let fail = |candidate: Candidate, cause: FailureCause| CandidateFailure {
            index: candidate.index,
            origin: candidate.origin,
            path: candidate.path,
            cause,
        };

        let needs_download = !bin_dir.is_persistent() || !candidate.path.exists();
        if needs_download {
            if let Err(err) = fetch::download(
                &self.client,
                &candidate.url,
                &candidate.path,
                self.config.settle_delay,
            ) {
                output::debug(&format!("download from {} failed: {}", candidate.origin, err));
                return Attempt::Next(fail(candidate, err.into()));
            }
            output::success(&format!("Downloaded binary to {}", candidate.path.display()));
        } else {
            output::debug(&format!("using cached binary {}", candidate.path.display()));
        }

        match Command::new(&candidate.path).args(args).status() {
            Ok(status) => Attempt::Done(Launched {
                index: candidate.index,
                exit_code: exit_code(status),
                path: candidate.path,
                downloaded: needs_download,
            }),
            Err(err) => {
                output::debug(&format!("{} did not start: {}", candidate.path.display(), err));
                Attempt::Next(fail(candidate, FailureCause::Spawn(err)))
            }
        }
    }
}

/// Exit code to propagate for a finished child process.
#[cfg(unix)]
pub fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Parse launcher arguments, launch, and return the exit code to use.
pub fn launch(
    config: &LauncherConfig,
    paths: &dyn PlatformPaths,
    args: Vec<String>,
) -> Result<i32, LaunchError> {
    let (requested, passthrough) = version::split_version_flag(args)?;
    let launcher = Launcher::new(config, paths)?;
    output::debug(&format!(
        "platform {}, requested version {}",
        launcher.triple(),
        requested
    ));
    launcher
        .run(&requested, &passthrough)
        .map(|launched| launched.exit_code)
}

/// One line of a fatal diagnostic, tagged with how it is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticLine {
    Error(String),
    /// Continuation of the error message.
    Note(String),
    /// Dimmed per-candidate detail.
    Detail(String),
    Hint(String),
}

/// Build the consolidated diagnostic for a fatal error.
///
/// For exhaustion the last failure supplies `Error code:` and
/// `System error:`. There is never a signal line: a candidate only fails
/// when it could not be downloaded or spawned, and a process that started
/// and was then killed counts as launched.
pub fn diagnostic(err: &LaunchError) -> Vec<DiagnosticLine> {
    let mut lines = Vec::new();
    match err {
        LaunchError::VersionNotFound { version, probed } => {
            lines.push(DiagnosticLine::Error(format!(
                "Transport version '{}' not found.",
                version
            )));
            lines.push(DiagnosticLine::Note(
                "Please verify the version exists at one of:".to_string(),
            ));
            for prefix in probed {
                lines.push(DiagnosticLine::Note(format!("  - {}", prefix)));
            }
        }
        LaunchError::Exhausted { failures, .. } => {
            lines.push(DiagnosticLine::Error(err.to_string()));
            for failure in failures {
                lines.push(DiagnosticLine::Detail(format!(
                    "{} ({}): {}",
                    failure.path.display(),
                    failure.origin,
                    failure.cause
                )));
            }
            if let Some(last) = failures.last() {
                if let Some(code) = last.code() {
                    lines.push(DiagnosticLine::Note(format!("Error code: {}", code)));
                }
                if let Some(errno) = last.errno() {
                    lines.push(DiagnosticLine::Note(format!("System error: {}", errno)));
                }
                if last.is_linux_compat_symptom() {
                    lines.push(DiagnosticLine::Hint(
                        "This appears to be a Linux compatibility issue.".to_string(),
                    ));
                    lines.push(DiagnosticLine::Note(
                        "The binary may be incompatible with your Linux distribution.".to_string(),
                    ));
                }
            }
        }
        other => lines.push(DiagnosticLine::Error(other.to_string())),
    }
    lines
}

/// Print the consolidated diagnostic for a fatal error to stderr.
pub fn report(err: &LaunchError) {
    for line in diagnostic(err) {
        match line {
            DiagnosticLine::Error(msg) => output::error(&msg),
            DiagnosticLine::Note(msg) => output::error_detail(&msg),
            DiagnosticLine::Detail(msg) => output::detail(&msg),
            DiagnosticLine::Hint(msg) => output::hint(&msg),
        }
    }
}
