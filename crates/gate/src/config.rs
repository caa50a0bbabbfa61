// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the vaultgate auth core.
///
/// Which credential fields are populated determines the login strategy; see
/// [`crate::auth::Strategy::select`] for the precedence order.
#[derive(Debug, Clone, clap::Args)]
pub struct GateConfig {
    /// Base URL of the vault REST API.
    #[arg(long, env = "VAULTGATE_URL")]
    pub base_url: String,

    /// Vault login name.
    #[arg(long, env = "VAULTGATE_USERNAME")]
    pub username: Option<String>,

    /// Vault password (interactive strategies).
    #[arg(long, env = "VAULTGATE_PASSWORD")]
    pub password: Option<String>,

    /// Static one-time code used when --mfa-prompt is not set.
    #[arg(long, default_value = "000000", env = "VAULTGATE_MFA_CODE")]
    pub mfa_code: String,

    /// API key; rides in the password slot of the sign-in call, no second factor.
    #[arg(long, env = "VAULTGATE_API_KEY")]
    pub api_key: Option<String>,

    /// Pre-obtained bearer token; validated against the vault, never re-derived.
    #[arg(long, env = "VAULTGATE_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Prompt for the one-time code on the controlling terminal.
    #[arg(long, env = "VAULTGATE_MFA_PROMPT")]
    pub mfa_prompt: bool,
}

impl GateConfig {
    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn api_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
