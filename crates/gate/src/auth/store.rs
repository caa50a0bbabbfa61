// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide token cache and refresh decisions.
//!
//! One [`TokenBroker`] exists per running process, owned by the composition
//! root and shared (by `Arc`) with every concurrent tool invocation. The
//! cached state lives behind a mutex that stays locked across the whole
//! check → refresh/authenticate → store sequence, so concurrent callers that
//! hit an expiring token await the first caller's outcome instead of racing
//! their own refreshes.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::auth::mfa::{CodePrompt, TtyPrompt};
use crate::auth::retry::{send_with_retry, DEFAULT_MAX_ATTEMPTS};
use crate::auth::{jwt, signin, strategy, unquote, Strategy};
use crate::config::GateConfig;
use crate::error::AuthError;

/// Tokens are refreshed once their remaining lifetime drops below this.
pub const REFRESH_MARGIN_SECS: u64 = 7 * 60;

/// The single cached token and its derived expiry.
#[derive(Debug, Clone)]
pub struct TokenState {
    /// Bearer token text, never quote-wrapped.
    pub token: String,
    /// When this state was stored, epoch seconds.
    pub acquired_at: u64,
    /// `exp` claim of the token; absent when the token is opaque.
    pub expires_at: Option<u64>,
}

impl TokenState {
    /// Build state from wire token text: strips one layer of JSON-string
    /// quoting and derives expiry from the `exp` claim.
    pub fn new(raw: &str) -> Self {
        let token = unquote(raw).to_owned();
        let expires_at = jwt::expiry(&token);
        Self { token, acquired_at: epoch_secs(), expires_at }
    }

    /// Seconds of lifetime left at `now`; `None` for opaque tokens.
    pub fn remaining_secs(&self, now: u64) -> Option<u64> {
        self.expires_at.map(|exp| exp.saturating_sub(now))
    }
}

/// Owns the cached [`TokenState`] and hands out valid bearer tokens.
pub struct TokenBroker<P = TtyPrompt> {
    http: reqwest::Client,
    config: GateConfig,
    prompt: P,
    slot: Mutex<Option<TokenState>>,
}

impl TokenBroker<TtyPrompt> {
    /// Broker using the controlling terminal for interactive prompts.
    pub fn new(config: GateConfig) -> Self {
        Self::with_prompt(config, TtyPrompt)
    }
}

impl<P: CodePrompt> TokenBroker<P> {
    /// Broker with an injected control channel.
    pub fn with_prompt(config: GateConfig, prompt: P) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { http, config, prompt, slot: Mutex::new(None) }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Shared HTTP client, reusable by callers issuing authenticated calls.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Return a bearer token that is valid for at least the refresh margin,
    /// refreshing or re-authenticating as needed.
    ///
    /// A cached token with more than the margin remaining is returned with
    /// zero network calls. Opaque tokens (no parseable expiry) are never
    /// proactively refreshed; the API layer reacts to a 401 by calling
    /// [`Self::clear_token`] and trying again.
    pub async fn bearer(&self) -> Result<String, AuthError> {
        let mut slot = self.slot.lock().await;

        if let Some(state) = slot.as_ref() {
            match state.remaining_secs(epoch_secs()) {
                None => return Ok(state.token.clone()),
                Some(remaining) if remaining > REFRESH_MARGIN_SECS => {
                    return Ok(state.token.clone())
                }
                Some(remaining) => {
                    tracing::debug!(remaining_secs = remaining, "cached token inside refresh margin");
                    let current = state.token.clone();
                    match self.refresh(&current).await {
                        Ok(fresh) => {
                            let state = TokenState::new(&fresh);
                            let token = state.token.clone();
                            *slot = Some(state);
                            tracing::debug!(expires_at = ?slot.as_ref().and_then(|s| s.expires_at), "token refreshed");
                            return Ok(token);
                        }
                        Err(err) => {
                            // The token strategy has no credentials to sign
                            // back in with; everything else falls through to
                            // a full re-authentication.
                            if Strategy::select(&self.config)? == Strategy::Token {
                                return Err(match err {
                                    AuthError::RequestFailed { status, body } => {
                                        AuthError::RefreshUnrecoverable { status, body }
                                    }
                                    other => other,
                                });
                            }
                            tracing::warn!(err = %err, "token refresh failed, re-authenticating");
                        }
                    }
                }
            }
        }

        let fresh = strategy::authenticate(&self.http, &self.config, &self.prompt).await?;
        let state = TokenState::new(&fresh);
        let token = state.token.clone();
        *slot = Some(state);
        Ok(token)
    }

    /// Drop the cached token. Called by the API layer on a 401 so the next
    /// [`Self::bearer`] re-authenticates from scratch.
    pub async fn clear_token(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            tracing::debug!("cached token invalidated");
        }
    }

    /// Replace the cached token with externally supplied token text.
    pub async fn set_token(&self, raw: &str) {
        let state = TokenState::new(raw);
        tracing::debug!(expires_at = ?state.expires_at, "cached token replaced externally");
        *self.slot.lock().await = Some(state);
    }

    /// Snapshot of the cached state, for diagnostics.
    pub async fn cached(&self) -> Option<TokenState> {
        self.slot.lock().await.clone()
    }

    /// `GET /api/v1/UserToken` with the current bearer.
    async fn refresh(&self, current: &str) -> Result<String, AuthError> {
        let req = self
            .http
            .get(format!("{}/api/v1/UserToken", self.config.api_base()))
            .bearer_auth(current);
        let resp = send_with_retry(req, DEFAULT_MAX_ATTEMPTS).await?;
        signin::token_text(resp).await
    }
}

pub(crate) fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
