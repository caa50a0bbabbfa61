// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

/// Build an unsigned token with the given payload claims.
fn token_with(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.sig")
}

#[test]
fn decodes_claims_object() -> anyhow::Result<()> {
    let tok = token_with(json!({"exp": 1754500000u64, "sub": "ops"}));
    let claims = decode(&tok).ok_or_else(|| anyhow::anyhow!("no claims"))?;
    assert_eq!(claims.get("sub").and_then(|v| v.as_str()), Some("ops"));
    Ok(())
}

#[test]
fn malformed_tokens_yield_no_claims() {
    assert!(decode("not-a-jwt").is_none());
    assert!(decode("a.%%%.c").is_none());
    assert!(decode("").is_none());
    // Valid base64 but not a JSON object.
    let tok = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"[1,2]"));
    assert!(decode(&tok).is_none());
}

#[test]
fn expiry_reads_exp_claim() {
    let tok = token_with(json!({"exp": 1754500000u64}));
    assert_eq!(expiry(&tok), Some(1754500000));
    assert_eq!(expiry(&token_with(json!({"sub": "x"}))), None);
    assert_eq!(expiry("garbage"), None);
}

#[test]
fn admin_role_matches_scalar_and_list() {
    assert!(has_admin_role(&token_with(json!({"role": "Administrator"}))));
    assert!(has_admin_role(&token_with(json!({"role": ["user", "Admin"]}))));
    assert!(!has_admin_role(&token_with(json!({"role": ["viewer"]}))));
    assert!(!has_admin_role(&token_with(json!({"sub": "x"}))));
}

#[test]
fn admin_role_honors_namespaced_key() {
    let tok = token_with(json!({
        "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": ["ADMIN"]
    }));
    assert!(has_admin_role(&tok));
}

#[test]
fn display_name_falls_back_in_order() {
    let namespaced = token_with(json!({
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name": "Full Name",
        "unique_name": "uname",
        "sub": "sub-id"
    }));
    assert_eq!(display_name(&namespaced).as_deref(), Some("Full Name"));

    let unique = token_with(json!({"unique_name": "uname", "sub": "sub-id"}));
    assert_eq!(display_name(&unique).as_deref(), Some("uname"));

    let sub_only = token_with(json!({"sub": "sub-id"}));
    assert_eq!(display_name(&sub_only).as_deref(), Some("sub-id"));

    assert_eq!(display_name(&token_with(json!({"exp": 1}))), None);
}

#[test]
fn roles_lists_entries() {
    let tok = token_with(json!({"role": ["auditor", "operator"]}));
    assert_eq!(roles(&tok), vec!["auditor".to_owned(), "operator".to_owned()]);
    assert_eq!(roles(&token_with(json!({"role": "auditor"}))), vec!["auditor".to_owned()]);
    assert!(roles("junk").is_empty());
}
