// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated HTTP client for vault API calls.
//!
//! This is the seam the tool handlers call through. Every request carries a
//! bearer from the broker; a 401 invalidates the cached token and the
//! request is retried exactly once with a freshly obtained one. Any other
//! non-2xx propagates with its status and body text intact.

use std::sync::Arc;

use crate::auth::mfa::{CodePrompt, TtyPrompt};
use crate::auth::retry::{send_with_retry, DEFAULT_MAX_ATTEMPTS};
use crate::auth::TokenBroker;
use crate::error::AuthError;

/// Bearer-attaching client over the vault REST API.
pub struct ApiClient<P = TtyPrompt> {
    http: reqwest::Client,
    base_url: String,
    broker: Arc<TokenBroker<P>>,
}

impl<P: CodePrompt> ApiClient<P> {
    pub fn new(broker: Arc<TokenBroker<P>>) -> Self {
        let http = broker.http().clone();
        let base_url = broker.config().api_base().to_owned();
        Self { http, base_url, broker }
    }

    /// GET a vault endpoint, returning the raw body text.
    pub async fn get_text(&self, path: &str) -> Result<String, AuthError> {
        let resp = self.send(reqwest::Method::GET, path, None).await?;
        Ok(resp.text().await.unwrap_or_default())
    }

    /// GET a vault endpoint, decoding a JSON body.
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value, AuthError> {
        let resp = self.send(reqwest::Method::GET, path, None).await?;
        Ok(resp.json().await?)
    }

    /// POST JSON to a vault endpoint, decoding a JSON body (Null when empty).
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, AuthError> {
        let resp = self.send(reqwest::Method::POST, path, Some(body)).await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| AuthError::RequestFailed {
            status,
            body: format!("unparseable response body: {e}"),
        })
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, AuthError> {
        let token = self.broker.bearer().await?;
        let resp = self.request(method.clone(), path, body, &token).await?;
        if resp.status().as_u16() != 401 {
            return ok_or_status(resp).await;
        }

        // Token was revoked server-side; invalidate and retry exactly once.
        tracing::debug!(path, "vault returned 401, retrying with a fresh token");
        self.broker.clear_token().await;
        let token = self.broker.bearer().await?;
        let resp = self.request(method, path, body, &token).await?;
        ok_or_status(resp).await
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<reqwest::Response, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(send_with_retry(req, DEFAULT_MAX_ATTEMPTS).await?)
    }
}

async fn ok_or_status(resp: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(AuthError::RequestFailed { status: status.as_u16(), body })
    }
}
