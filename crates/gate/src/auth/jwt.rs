// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort JWT claim inspection.
//!
//! Claims are decoded without verifying the signature: TLS plus the vault's
//! own server-side validation are the security boundary, and nothing here
//! makes a security decision; claims feed expiry scheduling and diagnostic
//! display only. Malformed tokens yield "no claims" rather than an error.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};

/// Candidate claim keys for the signed-in user's display name, tried in order.
const NAME_CLAIMS: &[&str] = &[
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
    "unique_name",
    "sub",
];

/// Candidate claim keys for the role list, tried in order. Older vault
/// versions emit the bare key, newer ones the namespaced URI.
const ROLE_CLAIMS: &[&str] = &[
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
    "role",
];

/// Decode the payload segment of a JWT into its claims map.
///
/// Returns `None` for anything that is not a three-segment token with a
/// base64url JSON object payload.
pub fn decode(token: &str) -> Option<Map<String, Value>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Expiry (`exp` claim) as epoch seconds, when present and parseable.
pub fn expiry(token: &str) -> Option<u64> {
    decode(token)?.get("exp")?.as_u64()
}

/// Display name of the token's subject, using the first populated name claim.
pub fn display_name(token: &str) -> Option<String> {
    let claims = decode(token)?;
    NAME_CLAIMS
        .iter()
        .find_map(|key| claims.get(*key))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Role names carried by the token. A scalar role claim yields one entry.
pub fn roles(token: &str) -> Vec<String> {
    let Some(claims) = decode(token) else {
        return Vec::new();
    };
    let Some(value) = ROLE_CLAIMS.iter().find_map(|key| claims.get(*key)) else {
        return Vec::new();
    };
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => {
            items.iter().filter_map(Value::as_str).map(str::to_owned).collect()
        }
        _ => Vec::new(),
    }
}

/// Whether the role claim contains an administrator entry, case-insensitively.
pub fn has_admin_role(token: &str) -> bool {
    roles(token)
        .iter()
        .any(|r| r.eq_ignore_ascii_case("administrator") || r.eq_ignore_ascii_case("admin"))
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
