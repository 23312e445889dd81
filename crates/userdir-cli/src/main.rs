//! userdir - browse and edit a user directory from the command line.
//!
//! Users are fetched once from the remote collection and kept in a local
//! mirror; later runs read the mirror. Adds and edits stay local. Deletes
//! are sent to the remote first.

mod render;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use userdir_core::{
    ApiClient, CacheManager, Config, DirectoryError, MirrorStore, NewUser, NoMirror,
    UserDirectory, UserId, UserSource, UserUpdate,
};

/// Log file name prefix when logging to the cache directory
const LOG_FILE_PREFIX: &str = "userdir.log";

#[derive(Parser)]
#[command(name = "userdir")]
#[command(about = "Browse and edit a user directory")]
struct Cli {
    /// Do not read or write the local mirror
    #[arg(long)]
    no_mirror: bool,

    /// Base URL of the user collection API for this run
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show one page of users, newest first
    List {
        /// Page number (clamped to the available range)
        #[arg(long, short, default_value_t = 1)]
        page: usize,
    },

    /// Show a single user
    Show { id: UserId },

    /// Add a user
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        website: String,
    },

    /// Change fields of an existing user
    Edit {
        id: UserId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },

    /// Delete a user (remote first, then locally)
    Delete { id: UserId },

    /// Show load state and mirror information
    Status,
}

/// Initialize the tracing subscriber for logging.
/// RUST_LOG controls the level (default `warn`).
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (mut config, config_error) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(url) = cli.api_url.clone() {
        config.api_base_url = url;
    }

    let log_dir = if config.log_to_file {
        config.cache_dir().ok()
    } else {
        None
    };
    let _guard = init_tracing(log_dir.as_deref());
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(api = %config.api_base_url, "userdir starting");

    let source = ApiClient::new(config.api_base_url.clone(), config.request_timeout())?;

    if cli.no_mirror || !config.persist_mirror {
        run(cli.command, &config, source, NoMirror).await
    } else {
        let cache = CacheManager::new(config.cache_dir()?)?;
        run(cli.command, &config, source, cache).await
    }
}

async fn run<S, M>(command: Command, config: &Config, source: S, mirror: M) -> Result<ExitCode>
where
    S: UserSource,
    M: MirrorStore + Clone,
{
    let directory =
        UserDirectory::new(source, mirror.clone()).with_page_size(config.page_size());

    if let Err(e) = directory.initialize().await {
        eprintln!("Error fetching users.");
        eprintln!("{}", e);
        return Ok(ExitCode::FAILURE);
    }

    match command {
        Command::List { page } => {
            let view = directory.page(page).await?;
            println!("{}", render::page(&view));
        }

        Command::Show { id } => match directory.get(id).await {
            Some(user) => println!("{}", render::user_card(&user)),
            None => {
                eprintln!("No user with id {}", id);
                return Ok(ExitCode::FAILURE);
            }
        },

        Command::Add {
            name,
            username,
            email,
            website,
        } => {
            let user = directory
                .add(NewUser {
                    name,
                    username,
                    email,
                    website,
                })
                .await?;
            println!("User added.");
            println!("{}", render::user_card(&user));
        }

        Command::Edit {
            id,
            name,
            username,
            email,
            website,
        } => {
            let update = UserUpdate {
                name,
                username,
                email,
                website,
            };
            if update.is_empty() {
                eprintln!("Nothing to change: pass at least one of --name, --username, --email, --website");
                return Ok(ExitCode::FAILURE);
            }
            match directory.edit(id, update).await {
                Ok(user) => {
                    println!("User updated.");
                    println!("{}", render::user_card(&user));
                }
                Err(e) => return Ok(report_failure("Error updating user.", &e)),
            }
        }

        Command::Delete { id } => match directory.delete(id).await {
            Ok(true) => println!("User deleted."),
            Ok(false) => println!("No user with id {}; nothing deleted.", id),
            Err(e) => return Ok(report_failure("Error deleting user.", &e)),
        },

        Command::Status => {
            let origin = directory
                .origin()
                .await
                .map(|o| o.to_string())
                .unwrap_or_else(|| "-".to_string());
            let view = directory.current().await?;
            let age = match mirror.load() {
                Ok(Some(cached)) => cached.age_display(),
                Ok(None) => "never".to_string(),
                Err(e) => {
                    warn!(error = %e, "Failed to read mirror for status");
                    "unreadable".to_string()
                }
            };

            println!("State:    {}", directory.state());
            println!("Source:   {}", config.api_base_url);
            println!("Loaded:   {}", origin);
            println!("Users:    {}", view.total_items);
            println!("Pages:    {} ({} per page)", view.total_pages, directory.page_size());
            println!("Mirror:   {}", age);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report_failure(title: &str, error: &DirectoryError) -> ExitCode {
    eprintln!("{}", title);
    eprintln!("{}", error);
    ExitCode::FAILURE
}
