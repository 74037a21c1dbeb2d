//! Operator tool for the Loft token subsystem.
//!
//! ```text
//! loft-auth issue <name> [User|Admin]
//! loft-auth validate "<Authorization header value>"
//! ```
//!
//! Both commands read configuration from the environment and share the
//! secret file with the running backend. Logs go to stderr, results to stdout.

use clap::{Parser, Subcommand};
use loft_auth::config::Config;
use loft_auth::{AuthService, Identity, Role};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Issue and check Loft bearer tokens.
#[derive(Parser)]
#[command(name = "loft-auth", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue a token for an identity
    Issue {
        /// Identity name, becomes the token subject
        name: String,

        /// Role granted to the identity (User or Admin)
        #[arg(default_value_t)]
        role: Role,
    },
    /// Validate an Authorization header value
    Validate {
        /// Full header value, e.g. "Bearer <token>"
        header: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loft_auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = match AuthService::initialize(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to initialize auth service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Issue { name, role } => match service.issue_token(&Identity::new(name, role)) {
            Ok(token) => {
                info!("Token issued");
                println!("{}", token);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to issue token: {}", e);
                ExitCode::FAILURE
            }
        },
        Command::Validate { header } => match service.validate_authorization_header(&header) {
            Ok(claims) => {
                println!("subject={} role={}", claims.subject, claims.role_or_default());
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(category = e.category(), "{}", e);
                ExitCode::FAILURE
            }
        },
    }
}
