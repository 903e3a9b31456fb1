//! Helpers for driving the CLI binary against a mock backend.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Output;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tempfile::TempDir;
use tokio::process::Command;

/// An isolated session file location.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn store(&self) -> PathBuf {
        self.dir.path().join("session.json")
    }

    pub fn home(&self) -> &Path {
        self.dir.path()
    }

    /// Seed the session file with tokens.
    pub fn write_session(&self, token: &str, refresh_token: Option<&str>) {
        let mut entries = json!({ "token": token });
        if let Some(refresh) = refresh_token {
            entries["refresh_token"] = json!(refresh);
        }
        std::fs::write(self.store(), entries.to_string()).unwrap();
    }

    /// Read the session file, if any.
    pub fn read_session(&self) -> Option<serde_json::Value> {
        let content = std::fs::read_to_string(self.store()).ok()?;
        serde_json::from_str(&content).ok()
    }
}

/// Build an unsigned JWT expiring `exp_in_secs` from now.
pub fn jwt(exp_in_secs: u64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
    let payload = URL_SAFE_NO_PAD.encode(json!({"sub": "a@b.com", "exp": now + exp_in_secs}).to_string());
    format!("{}.{}.signature", header, payload)
}

/// Run the CLI with an isolated session file and API URL.
pub async fn run_cli(args: &[&str], workspace: &Workspace, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_repdash"));
    cmd.args(args);
    cmd.env("REPDASH_API_URL", api_url);
    cmd.env("REPDASH_STORE", workspace.store());
    cmd.env("HOME", workspace.home());
    cmd.env("XDG_DATA_HOME", workspace.home().join("data"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub async fn run_cli_success(args: &[&str], workspace: &Workspace, api_url: &str) -> String {
    let output = run_cli(args, workspace, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], workspace: &Workspace, api_url: &str) -> String {
    let output = run_cli(args, workspace, api_url).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
