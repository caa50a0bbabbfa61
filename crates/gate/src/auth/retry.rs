// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-request retry policy with exponential backoff.
//!
//! Only a bare 500 is treated as a transient infrastructure hiccup worth
//! repeating. Every other status, other 5xx included, means the request
//! will not succeed by resending it unchanged, and is returned to the caller
//! as-is. No JSON parsing, no auth knowledge; every network call in the auth
//! core routes through here.

use std::time::Duration;

/// Attempts per request unless a caller overrides.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Send a request, retrying on HTTP 500 with 1s/2s/4s/... backoff.
///
/// After the final attempt the last response is returned even if it is still
/// a 500; classifying it is the caller's job. Backoff waits are cooperative
/// (`tokio::time::sleep`), so concurrent work proceeds during them.
pub async fn send_with_retry(
    builder: reqwest::RequestBuilder,
    max_attempts: u32,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut attempt: u32 = 0;
    loop {
        let shot = match builder.try_clone() {
            Some(b) => b,
            // Streaming bodies cannot be replayed; fall back to one shot.
            None => return builder.send().await,
        };

        let resp = shot.send().await?;
        if resp.status().as_u16() != 500 {
            return Ok(resp);
        }

        let delay = Duration::from_secs(1 << attempt);
        tracing::debug!(attempt, delay_secs = delay.as_secs(), "vault returned 500, backing off");
        tokio::time::sleep(delay).await;

        attempt += 1;
        if attempt >= max_attempts {
            return Ok(resp);
        }
    }
}
