use std::fs;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use fretwork::auth::CredentialHasher;
use fretwork::config::ServerConfig;
use fretwork::server::{AppState, create_router};
use fretwork::store::{SqliteStore, Store};
use fretwork::types::User;

#[derive(Parser)]
#[command(name = "fretwork")]
#[command(about = "A guitar tablature sharing server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create the database schema)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

fn run_init(data_dir: String, non_interactive: bool) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("fretwork.db");
    let store = SqliteStore::new(&db_path)?;

    if store.is_initialized()? {
        bail!(
            "Server already initialized. Database exists at: {}",
            db_path.display()
        );
    }

    store.initialize()?;

    println!();
    println!("========================================");
    println!("Database created at: {}", db_path.display());
    println!("========================================");
    println!();

    if !non_interactive {
        create_first_user_prompt(&store)?;
    }

    Ok(())
}

fn create_first_user_prompt(store: &SqliteStore) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create a first user?")
        .with_default(false)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let username = inquire::Text::new("Username:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("Username cannot be empty".into())
            } else if input.contains(char::is_whitespace) {
                Err("Username cannot contain whitespace".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let email = inquire::Text::new("Email:")
        .with_validator(|input: &str| {
            if input.contains('@') {
                Ok(inquire::validator::Validation::Valid)
            } else {
                Err("Email must contain '@'".into())
            }
        })
        .prompt()?;

    let password = inquire::Password::new("Password:").prompt()?;

    let password_hash = CredentialHasher::new().hash(&password)?;
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.clone(),
        email,
        password_hash,
        avatar: None,
        created_at: Utc::now(),
    };

    store.create_user(&user)?;

    println!();
    println!("Created user '{username}'. Sign in through POST /api/v1/sessions.");
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fretwork=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => {
                run_init(data_dir, non_interactive)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
            };

            if !config.db_path().exists() {
                bail!(
                    "Server not initialized. Run 'fretwork admin init' first to create the database."
                );
            }

            let store = SqliteStore::new(config.db_path())?;
            if !store.is_initialized()? {
                bail!(
                    "Server not initialized. Run 'fretwork admin init' first to create the database."
                );
            }

            let state = Arc::new(AppState::new(Arc::new(store)));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
