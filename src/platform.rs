//! Platform detection
//!
//! Maps an operating system and CPU architecture to the directory layout used
//! by the release origins: `<platform>/<arch>/<binary>`.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Unsupported platform/arch: {os}/{arch}")]
    Unsupported { os: String, arch: String },

    #[error("no user cache directory available on {os}")]
    NoCacheDir { os: String },
}

/// Release platform directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformDir {
    Darwin,
    Linux,
    Windows,
}

impl PlatformDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

/// Canonical (platform, arch, binary) triple for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTriple {
    pub platform: PlatformDir,
    pub arch: String,
    pub binary_name: String,
}

impl PlatformTriple {
    /// Resolve the triple for the running process.
    pub fn current(binary_stem: &str) -> Result<Self, PlatformError> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH, binary_stem)
    }

    /// Resolve a triple from OS and architecture identifiers.
    ///
    /// Accepts both Rust (`macos`, `x86_64`, `aarch64`, `x86`) and Node-style
    /// (`darwin`, `win32`, `x64`, `arm64`, `ia32`) identifiers.
    pub fn resolve(os: &str, arch: &str, binary_stem: &str) -> Result<Self, PlatformError> {
        let arch_id = normalize_arch(arch);

        let (platform, arch_dir) = match os {
            "macos" | "darwin" => {
                let dir = if arch_id == "arm64" { "arm64" } else { "amd64" };
                (PlatformDir::Darwin, dir.to_string())
            }
            "linux" => (PlatformDir::Linux, generic_arch(arch_id)),
            "windows" | "win32" => (PlatformDir::Windows, generic_arch(arch_id)),
            _ => {
                return Err(PlatformError::Unsupported {
                    os: os.to_string(),
                    arch: arch.to_string(),
                });
            }
        };

        let binary_name = match platform {
            PlatformDir::Windows => format!("{}.exe", binary_stem),
            _ => binary_stem.to_string(),
        };

        Ok(Self {
            platform,
            arch: arch_dir,
            binary_name,
        })
    }

    /// Artifact path below a channel: `<version>/<platform>/<arch>/<binary>`.
    pub fn artifact_path(&self, version: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            version,
            self.platform.as_str(),
            self.arch,
            self.binary_name
        )
    }
}

impl fmt::Display for PlatformTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform.as_str(), self.arch)
    }
}

/// Map Rust architecture names onto the release naming.
fn normalize_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        other => other,
    }
}

fn generic_arch(arch: &str) -> String {
    match arch {
        "x64" => "amd64".to_string(),
        "ia32" => "386".to_string(),
        // Unknown architectures pass through unchanged
        other => other.to_string(),
    }
}
