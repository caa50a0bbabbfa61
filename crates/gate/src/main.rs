// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use tracing::error;

use vaultgate::auth::{jwt, TokenBroker};
use vaultgate::config::GateConfig;

/// Sign in to the vault once and print who the configured credentials
/// resolve to. Lets an operator validate a credential setup before wiring
/// the server into an MCP client.
#[derive(Debug, Parser)]
#[command(name = "vaultgate", version)]
struct Cli {
    #[command(flatten)]
    config: GateConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Stdout is reserved for protocol/report output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.config).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run(config: GateConfig) -> anyhow::Result<()> {
    let broker = TokenBroker::new(config);
    let token = broker.bearer().await?;

    let name = jwt::display_name(&token).unwrap_or_else(|| "<unknown>".to_owned());
    println!("signed in as: {name}");

    let roles = jwt::roles(&token);
    if !roles.is_empty() {
        println!("roles: {}", roles.join(", "));
    }
    println!("administrator: {}", if jwt::has_admin_role(&token) { "yes" } else { "no" });

    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    match broker.cached().await.and_then(|state| state.remaining_secs(now)) {
        Some(remaining) => println!("token expires in: {}m {}s", remaining / 60, remaining % 60),
        None => println!("token expiry: unknown (opaque token)"),
    }

    Ok(())
}
