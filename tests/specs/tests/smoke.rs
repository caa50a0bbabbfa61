// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `vaultgate` binary against a
//! mock vault.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaultgate::auth::jwt;
use vaultgate_specs::{make_jwt, vaultgate_cmd};

fn epoch_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[tokio::test]
async fn interactive_signin_prints_identity() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let token = make_jwt(&json!({
        "exp": epoch_now() + 3600,
        "unique_name": "Ops Admin",
        "role": ["Administrator"],
    }));
    assert_eq!(jwt::display_name(&token).as_deref(), Some("Ops Admin"));

    Mock::given(method("POST"))
        .and(path("/signinBody"))
        .and(body_json(json!({"Login": "ops", "Password": "Temp123!"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"tok1\""))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/signin2fa"))
        .and(header("authorization", "Bearer tok1"))
        .and(body_json(json!("000000")))
        .respond_with(ResponseTemplate::new(200).set_body_string(token))
        .expect(1)
        .mount(&server)
        .await;

    let out = vaultgate_cmd(&server.uri())
        .env("VAULTGATE_USERNAME", "ops")
        .env("VAULTGATE_PASSWORD", "Temp123!")
        .output()
        .await?;

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(out.status.success(), "binary failed, stderr: {stderr}");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("signed in as: Ops Admin"), "stdout: {stdout}");
    assert!(stdout.contains("administrator: yes"), "stdout: {stdout}");
    assert!(stdout.contains("token expires in:"), "stdout: {stdout}");
    Ok(())
}

#[tokio::test]
async fn pre_supplied_token_is_probed_and_reported() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let token = make_jwt(&json!({
        "exp": epoch_now() + 1800,
        "sub": "svc-account",
        "role": "viewer",
    }));

    Mock::given(method("GET"))
        .and(path("/api/v1/Version"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("7.5.1"))
        .expect(1)
        .mount(&server)
        .await;

    let out = vaultgate_cmd(&server.uri())
        .env("VAULTGATE_ACCESS_TOKEN", &token)
        .output()
        .await?;

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(out.status.success(), "binary failed, stderr: {stderr}");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("signed in as: svc-account"), "stdout: {stdout}");
    assert!(stdout.contains("administrator: no"), "stdout: {stdout}");
    Ok(())
}

#[tokio::test]
async fn rejected_token_is_fatal_with_guidance() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/Version"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let out = vaultgate_cmd(&server.uri())
        .env("VAULTGATE_ACCESS_TOKEN", "stale.token.text")
        .output()
        .await?;

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("rejected"), "stderr: {stderr}");
    Ok(())
}

#[tokio::test]
async fn missing_credentials_is_a_fatal_config_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    let out = vaultgate_cmd(&server.uri()).output().await?;

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no credentials configured"), "stderr: {stderr}");
    // A config error must never produce network traffic.
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}
