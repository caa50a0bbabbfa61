// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Login strategy selection and dispatch.

use crate::auth::mfa::{CodePrompt, DEFAULT_CODE_TIMEOUT};
use crate::auth::retry::{send_with_retry, DEFAULT_MAX_ATTEMPTS};
use crate::auth::{jwt, signin, unquote};
use crate::config::GateConfig;
use crate::error::AuthError;

/// The four mutually exclusive ways of obtaining a bearer token.
///
/// Derived once from which credential fields are populated; a process never
/// switches strategies, and no strategy falls back to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Pre-obtained token, validated against the vault.
    Token,
    /// API key in the password slot, no second factor.
    ApiKey,
    /// Username/password, one-time code typed on the controlling terminal.
    InteractivePrompt,
    /// Username/password, statically configured one-time code.
    Interactive,
}

impl Strategy {
    /// Derive the active strategy from the configuration, first match wins.
    pub fn select(config: &GateConfig) -> Result<Self, AuthError> {
        if config.access_token.is_some() {
            return Ok(Self::Token);
        }
        if config.api_key.is_some() {
            return Ok(Self::ApiKey);
        }
        if config.password.is_some() {
            return Ok(if config.mfa_prompt { Self::InteractivePrompt } else { Self::Interactive });
        }
        Err(AuthError::NoCredentials)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::ApiKey => "apikey",
            Self::InteractivePrompt => "interactive-prompt",
            Self::Interactive => "interactive",
        }
    }
}

/// Execute the configured strategy and return a bearer token.
///
/// Exactly one branch runs; its first failure surfaces verbatim.
pub async fn authenticate<P: CodePrompt>(
    http: &reqwest::Client,
    config: &GateConfig,
    prompt: &P,
) -> Result<String, AuthError> {
    let strategy = Strategy::select(config)?;
    tracing::debug!(strategy = strategy.name(), "authenticating against the vault");

    let base = config.api_base();
    let login = config.username.as_deref().unwrap_or_default();

    match strategy {
        Strategy::Token => {
            let token = unquote(config.access_token.as_deref().unwrap_or_default()).to_owned();
            validate_token(http, base, &token).await?;
            Ok(token)
        }
        Strategy::ApiKey => {
            let key = config.api_key.as_deref().unwrap_or_default();
            let token = signin::initial_signin(http, base, login, key).await?;
            if !jwt::has_admin_role(&token) {
                // Some vault builds omit the role claim on api-key sign-ins;
                // the token still works for non-admin endpoints.
                tracing::warn!("api-key token carries no administrator role claim");
            }
            Ok(token)
        }
        Strategy::InteractivePrompt => {
            prompt.available()?;
            let password = config.password.as_deref().unwrap_or_default();
            let initial = signin::initial_signin(http, base, login, password).await?;
            let code = prompt.read_code(DEFAULT_CODE_TIMEOUT).await?;
            signin::complete_signin(http, base, &initial, &code).await
        }
        Strategy::Interactive => {
            let password = config.password.as_deref().unwrap_or_default();
            let initial = signin::initial_signin(http, base, login, password).await?;
            signin::complete_signin(http, base, &initial, &config.mfa_code).await
        }
    }
}

/// Probe `/api/v1/Version` with the supplied bearer; any 2xx means valid.
async fn validate_token(
    http: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> Result<(), AuthError> {
    let req = http.get(format!("{base_url}/api/v1/Version")).bearer_auth(token);
    let resp = send_with_retry(req, DEFAULT_MAX_ATTEMPTS).await?;
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(AuthError::TokenRejected { status: status.as_u16() })
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
