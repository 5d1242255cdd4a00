// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login gate binary.
//!
//! Reads one `<AUTHN>` record from the first line of stdin and validates the
//! token in its `SECRET` against the record's `USERNAME`. Exits 0 when the
//! login is accepted, 1 when it is denied, 2 on configuration errors.

use std::io::{self, BufRead};
use std::process::ExitCode;

use oidc_jwt_auth::config::LogConfig;
use oidc_jwt_auth::logging::{self, LoggingError};
use oidc_jwt_auth::{authenticate_login, AuthConfig, LoginRequest, OidcKeyResolver, TokenValidator};

const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if let Err(e) = init_logging(&config.log) {
        eprintln!("{e}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let mut record = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut record) {
        tracing::error!(error = %e, "Failed to read authentication record from stdin");
        return ExitCode::FAILURE;
    }

    let request = match LoginRequest::from_authn_xml(&record) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting login");
            return ExitCode::FAILURE;
        }
    };

    let resolver = match OidcKeyResolver::from_config(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize key resolver");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let validator = TokenValidator::new(resolver)
        .with_span(tracing::info_span!("login", username = %request.username));

    if authenticate_login(&validator, &request).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Install logging, falling back to stderr when the log file cannot be opened.
fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    match logging::init(config) {
        Err(e @ LoggingError::OpenFile { .. }) => {
            eprintln!("{e}; logging to stderr");
            logging::init(&LogConfig {
                file: None,
                ..config.clone()
            })
        }
        other => other,
    }
}
