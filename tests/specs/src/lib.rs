// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `vaultgate` binary against a mock vault and asserts on
//! its stdout, stderr, and exit status.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Every env var the binary reads; scrubbed before each run so credentials
/// from the invoking shell can't leak into a test.
pub const GATE_ENV_VARS: &[&str] = &[
    "VAULTGATE_URL",
    "VAULTGATE_USERNAME",
    "VAULTGATE_PASSWORD",
    "VAULTGATE_MFA_CODE",
    "VAULTGATE_API_KEY",
    "VAULTGATE_ACCESS_TOKEN",
    "VAULTGATE_MFA_PROMPT",
];

/// Resolve the path to the compiled `vaultgate` binary.
pub fn vaultgate_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("vaultgate")
}

/// Command for the binary with a scrubbed environment and the vault URL set.
pub fn vaultgate_cmd(base_url: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(vaultgate_binary());
    for var in GATE_ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("VAULTGATE_URL", base_url);
    cmd
}

/// Unsigned token carrying the given claims, same shape the vault issues.
pub fn make_jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.sig")
}
