//! Ledger CLI Entry Point
//!
//! Wires the file-backed adapters into a [`SessionManager`] and runs one
//! command against it. Uses `anyhow` to carry errors up to `main`, where
//! they are reported as `kernel::error::AppError` (message and action).

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kernel::error::app_error::AppError;
use ledger::LedgerError;
use platform::document::MemoryDocumentStore;
use platform::storage::FileKeyValueStore;
use session::application::RestoreOutcome;
use session::{
    DocumentRepository, MemoryIdentityProvider, MemoryProviderConfig, SessionConfig,
    SessionError, SessionManager,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{data::DataCommands, goals::GoalCommands, users::UserCommands};

/// Manager over the file-backed adapters
pub type Manager = SessionManager<MemoryIdentityProvider, DocumentRepository<MemoryDocumentStore>>;

/// Ledger - personal finance with approval-gated accounts
#[derive(Parser)]
#[command(name = "ledger", version, about, long_about = None)]
struct Cli {
    /// Directory holding the provider, store and cache files
    #[arg(long, env = "LEDGER_DATA_DIR", default_value = ".ledger", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new account (pending approval)
    SignUp {
        username: String,
        #[arg(long, short = 'p')]
        password: String,
    },

    /// Sign in with username and password
    SignIn {
        username: String,
        #[arg(long, short = 'p')]
        password: String,
        /// Use the administrator credentials
        #[arg(long)]
        admin: bool,
    },

    /// Sign out and clear the local cache
    SignOut,

    /// Show the current identity
    Whoami,

    /// Change the username of the current account
    Rename { username: String },

    /// Transactions and categories
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },

    /// Account administration (administrator only)
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Savings goals
    Goals {
        #[command(subcommand)]
        command: GoalCommands,
    },

    /// Check whether the current identity may open a page
    Route { path: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, stdout carries command output)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cli=info,session=info,ledger=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            let error = to_app_error(err);
            eprintln!("error: {}", error.message());
            if let Some(action) = error.action() {
                eprintln!("  {action}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("cannot create data directory {}", cli.data_dir.display()))?;

    let config = session_config();
    let provider = MemoryIdentityProvider::open(
        cli.data_dir.join("provider.json"),
        MemoryProviderConfig::default(),
    )?;
    let store = MemoryDocumentStore::open(cli.data_dir.join("store.json"))?;
    let cache = FileKeyValueStore::open(cli.data_dir.join("cache.json"))?;

    let manager = SessionManager::init(
        Arc::new(provider),
        Arc::new(DocumentRepository::new(Arc::new(store))),
        Arc::new(cache),
        config,
    )?;

    tracing::debug!(data_dir = %cli.data_dir.display(), "Session manager initialized");

    // Startup bootstrap: errors here should not prevent the command from running
    if manager.config().admin.is_some() {
        match manager.bootstrap_admin().await {
            Ok(true) => tracing::info!("Administrator records created"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Administrator bootstrap failed, continuing anyway"),
        }
    }

    // Align the cached identity with the provider session left by the last run
    match manager.restore_session().await {
        Ok(RestoreOutcome::Restored(identity)) => {
            tracing::info!(username = %identity.username, "Session restored")
        }
        Ok(outcome) => tracing::debug!(?outcome, "No session change"),
        Err(e) => e.log(),
    }

    commands::run(&manager, cli.command).await
}

/// Report `err` the way the session and ledger layers describe it
fn to_app_error(err: anyhow::Error) -> AppError {
    let err = match err.downcast::<SessionError>() {
        Ok(e) => {
            e.log();
            return e.to_app_error();
        }
        Err(err) => err,
    };
    let err = match err.downcast::<LedgerError>() {
        Ok(e) => return e.to_app_error(),
        Err(err) => err,
    };
    let err = match err.downcast::<std::io::Error>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    match err.downcast::<serde_json::Error>() {
        Ok(e) => e.into(),
        Err(err) => AppError::internal(format!("{err:#}")),
    }
}

/// Session configuration from the environment
///
/// Debug builds fall back to the development administrator when none is set.
fn session_config() -> SessionConfig {
    let mut config = match (
        env::var("LEDGER_ADMIN_USERNAME"),
        env::var("LEDGER_ADMIN_PASSWORD"),
    ) {
        (Ok(username), Ok(password)) => SessionConfig::default().with_admin(username, password),
        _ if cfg!(debug_assertions) => SessionConfig::development(),
        _ => {
            tracing::warn!("LEDGER_ADMIN_USERNAME/LEDGER_ADMIN_PASSWORD unset, administrator sign-in disabled");
            SessionConfig::default()
        }
    };

    if let Ok(domain) = env::var("LEDGER_EMAIL_DOMAIN") {
        config = config.with_email_domain(domain);
    }

    config
}
