// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-step sign-in against the vault.
//!
//! Step one posts credentials (`/signinBody`) and yields a short-lived token
//! that only the second step accepts; step two (`/signin2fa`) exchanges that
//! token plus a one-time code for the real bearer token. The api-key
//! strategy stops after step one.

use serde::Serialize;

use crate::auth::retry::{send_with_retry, DEFAULT_MAX_ATTEMPTS};
use crate::auth::unquote;
use crate::error::AuthError;

#[derive(Serialize)]
struct SigninBody<'a> {
    #[serde(rename = "Login")]
    login: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

/// Post credentials to `/signinBody` and return the resulting token text.
///
/// The password slot carries the API key for api-key sign-ins.
pub async fn initial_signin(
    client: &reqwest::Client,
    base_url: &str,
    login: &str,
    secret: &str,
) -> Result<String, AuthError> {
    let req = client
        .post(format!("{base_url}/signinBody"))
        .json(&SigninBody { login, password: secret });
    let resp = send_with_retry(req, DEFAULT_MAX_ATTEMPTS).await?;
    token_text(resp).await
}

/// Exchange the step-one token plus a one-time code at `/signin2fa`.
///
/// The code travels as a JSON-encoded string body; the step-one token rides
/// in the `Authorization` header.
pub async fn complete_signin(
    client: &reqwest::Client,
    base_url: &str,
    initial_token: &str,
    code: &str,
) -> Result<String, AuthError> {
    let req = client
        .post(format!("{base_url}/signin2fa"))
        .bearer_auth(initial_token)
        .json(&code);
    let resp = send_with_retry(req, DEFAULT_MAX_ATTEMPTS).await?;
    token_text(resp).await
}

/// Read a token response body, preserving status and body text verbatim on
/// failure; that text is what the operator debugs credential rejections with.
pub(crate) async fn token_text(resp: reqwest::Response) -> Result<String, AuthError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(AuthError::RequestFailed { status: status.as_u16(), body });
    }
    Ok(unquote(&body).to_owned())
}
