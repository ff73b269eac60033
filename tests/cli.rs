//! Tests for the `mesh-gateway` binary itself.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(home: &Path, base_url: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mesh-gateway"));
    cmd.env("HOME", home)
        .env("XDG_CACHE_HOME", home.join(".cache"))
        .env("MESH_GATEWAY_DOWNLOAD_BASE_URL", base_url)
        .env("MESH_GATEWAY_RELEASE_API_URL", format!("{}/release", base_url))
        .env_remove("MESH_GATEWAY_DEBUG");
    cmd
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[tokio::test]
async fn test_invalid_version_exits_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    for bad in ["1.2.3", "v1.2", "nightly", "v1.2.3+build"] {
        let output = gateway(home.path(), &server.uri())
            .args(["--transport-version", bad])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1), "{} should be rejected", bad);
        assert!(stderr(&output).contains("Invalid transport version format"));
    }

    let output = gateway(home.path(), &server.uri())
        .arg("--transport-version=v1")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!home.path().join(".cache").exists());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_runs_downloaded_gateway_with_passthrough_args() {
    use wiremock::matchers::path;

    let home = TempDir::new().unwrap();
    let out = home.path().join("args.txt");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nexit 4\n",
        out.display()
    );

    let server = MockServer::start().await;
    let artifact = format!(
        "/bifrost/v1.2.3/linux/{}/bifrost-http",
        match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            other => other,
        }
    );
    Mock::given(method("HEAD"))
        .and(path(artifact.as_str()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(artifact.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(script.into_bytes()))
        .expect(1)
        .mount(&server)
        .await;

    let output = gateway(home.path(), &server.uri())
        .args(["--port", "8080", "--transport-version=v1.2.3", "-v"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Downloaded binary to"));
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "--port\n8080\n-v\n"
    );
    assert!(home
        .path()
        .join(".cache/mesh-ai-gateway/v1.2.3/bin/bifrost-http-0")
        .exists());
}
