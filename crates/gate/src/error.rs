// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::time::Duration;

/// Errors surfaced by the authentication core.
///
/// Upstream status codes and response bodies are carried verbatim; that text
/// is the operator's primary signal when the vault rejects credentials.
#[derive(Debug)]
pub enum AuthError {
    /// No usable login strategy could be derived from the configuration.
    NoCredentials,
    /// A sign-in or refresh call returned a non-2xx status.
    RequestFailed { status: u16, body: String },
    /// A pre-supplied token failed the validation probe.
    TokenRejected { status: u16 },
    /// Refresh failed under the pre-supplied-token strategy, which has no
    /// stored credentials to fall back on.
    RefreshUnrecoverable { status: u16, body: String },
    /// The interactive prompt received no code within the window.
    MfaTimeout { waited: Duration },
    /// The terminal channel for the interactive prompt could not be opened.
    MfaChannelUnavailable { reason: String },
    /// Transport-level failure before any HTTP status was received.
    Network(reqwest::Error),
}

/// Remediation appended to prompt failures: the non-interactive strategies
/// that work without a terminal.
const MFA_FALLBACK_HINT: &str =
    "run with --mfa-code <code> or supply a pre-obtained token via --access-token";

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(
                f,
                "no credentials configured; set one of: \
                 --access-token <jwt> (pre-obtained token), \
                 --api-key <key> with --username <user>, \
                 --username <user> --password <pass> --mfa-prompt (interactive code), \
                 or --username <user> --password <pass> --mfa-code 000000 (static code)"
            ),
            Self::RequestFailed { status, body } => {
                write!(f, "vault sign-in request failed ({status}): {body}")
            }
            Self::TokenRejected { status } => write!(
                f,
                "supplied access token was rejected by the vault ({status}); \
                 obtain a fresh token and set --access-token again"
            ),
            Self::RefreshUnrecoverable { status, body } => write!(
                f,
                "token refresh failed ({status}): {body}; the pre-supplied-token \
                 strategy cannot re-authenticate; supply a new --access-token"
            ),
            Self::MfaTimeout { waited } => write!(
                f,
                "no one-time code entered within {}s; {MFA_FALLBACK_HINT}",
                waited.as_secs()
            ),
            Self::MfaChannelUnavailable { reason } => {
                write!(f, "cannot prompt for a one-time code ({reason}); {MFA_FALLBACK_HINT}")
            }
            Self::Network(e) => write!(f, "vault request failed: {e}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e)
    }
}
