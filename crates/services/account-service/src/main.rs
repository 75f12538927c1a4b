//! Account Service - command line entry point for account management.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use account_service_lib::config::AccountServiceConfig;
use account_service_lib::{AccountApp, MigrateAction};
use common::{AppError, AppResult};

#[derive(Parser)]
#[command(name = "account-service")]
#[command(about = "Account management service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Account owner commands
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Account lifecycle commands
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register an account owner
    Create {
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Open a new account
    Create {
        #[arg(long)]
        user_id: i64,
        #[arg(long, default_value = "0")]
        balance: i64,
    },
    /// List a user's accounts
    List {
        #[arg(long)]
        user_id: i64,
    },
    /// Show an account by internal id
    Get {
        #[arg(long, allow_hyphen_values = true)]
        id: i64,
    },
    /// Close an account
    Delete {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        account_number: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::internal(format!("Serialization error: {}", e)))?;
    println!("{}", json);
    Ok(())
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            account_service_lib::run_migrations(migrate_action).await
        }
        Commands::User { action } => {
            let app = AccountApp::connect(&AccountServiceConfig::from_env()).await?;
            match action {
                UserCommands::Create { name } => print_json(&app.users.create(name).await?),
            }
        }
        Commands::Account { action } => {
            let app = AccountApp::connect(&AccountServiceConfig::from_env()).await?;
            match action {
                AccountCommands::Create { user_id, balance } => {
                    print_json(&app.accounts.create_account(user_id, balance).await?)
                }
                AccountCommands::List { user_id } => {
                    print_json(&app.accounts.get_accounts_by_user_id(user_id).await?)
                }
                AccountCommands::Get { id } => print_json(&app.accounts.get_account(id).await?),
                AccountCommands::Delete {
                    user_id,
                    account_number,
                } => print_json(&app.accounts.delete_account(user_id, &account_number).await?),
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_output(&err));
            ExitCode::FAILURE
        }
    }
}

/// The single report printed for a failed command
fn error_output(err: &AppError) -> String {
    serde_json::to_string_pretty(&err.to_body()).unwrap_or_else(|_| err.user_message())
}
