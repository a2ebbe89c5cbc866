// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wabi - a reflection companion for introverts.
//!
//! This is the binary entry point: event logging, guided reflection
//! sessions, progress views, and the chat proxy.

mod events;
mod reflect;
mod serve;
mod views;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use wabi_config::WabiConfig;
use wabi_core::error::WabiError;
use wabi_core::traits::RecordStore;
use wabi_core::types::{EventCategory, EventId, ReflectionId};
use wabi_reflect::AppState;
use wabi_storage::SqliteStore;

/// Wabi - a reflection companion for introverts.
#[derive(Parser, Debug)]
#[command(name = "wabi", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the chat proxy that holds the provider credential.
    Serve,
    #[command(flatten)]
    Records(RecordCommand),
}

/// Subcommands that work on the local record store.
#[derive(Subcommand, Debug)]
enum RecordCommand {
    /// Manage logged events.
    Event {
        #[command(subcommand)]
        action: EventCommand,
    },
    /// List logged events.
    Events,
    /// Show what's coming up next and your reflections.
    Home,
    /// Reflect on an event with your companion.
    Reflect(ReflectArgs),
    /// Show one reflection in full.
    Show {
        /// Reflection id.
        id: u64,
    },
    /// Show your progress.
    Stats,
}

#[derive(Subcommand, Debug)]
enum EventCommand {
    /// Log a new event.
    Add(EventArgs),
}

#[derive(Args, Debug)]
struct EventArgs {
    /// Event name.
    #[arg(long)]
    name: String,
    /// Date as YYYY-MM-DD.
    #[arg(long)]
    date: String,
    /// Time as HH:MM.
    #[arg(long)]
    time: String,
    /// social, professional or networking.
    #[arg(long, default_value = "social")]
    category: EventCategory,
    #[arg(long)]
    location: Option<String>,
    /// Something small to try at the event.
    #[arg(long)]
    goal: Option<String>,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct ReflectArgs {
    /// Id of the event to reflect on (defaults to the next one).
    #[arg(long)]
    event: Option<u64>,
    /// Reflect on something that was never logged as an event.
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match wabi_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            wabi_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    if let Err(e) = run(cli, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: WabiConfig) -> Result<(), WabiError> {
    let Some(command) = cli.command else {
        println!("wabi: use --help for available commands");
        return Ok(());
    };

    match command {
        Commands::Serve => serve::run_serve(&config).await,
        Commands::Records(command) => run_records(command, &config).await,
    }
}

/// Opens the record store, runs one command against it, and closes it.
async fn run_records(command: RecordCommand, config: &WabiConfig) -> Result<(), WabiError> {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;
    let mut app = AppState::load(store.clone()).await?;
    let today = chrono::Local::now().date_naive();

    let result = match command {
        RecordCommand::Event {
            action: EventCommand::Add(args),
        } => events::add(&mut app, args.into_draft()).await,
        RecordCommand::Events => {
            print!("{}", views::events(&app, today));
            Ok(())
        }
        RecordCommand::Home => {
            print!("{}", views::home(&app, today));
            Ok(())
        }
        RecordCommand::Reflect(args) => {
            let target = reflect::pick_target(&app, args.event.map(EventId), args.name, today);
            reflect::run_reflect(&mut app, config, target).await
        }
        RecordCommand::Show { id } => {
            print!("{}", views::reflection(&app, ReflectionId(id), today));
            Ok(())
        }
        RecordCommand::Stats => {
            print!("{}", views::stats(&app.stats(today)));
            Ok(())
        }
    };

    store.close().await?;
    result
}

impl EventArgs {
    fn into_draft(self) -> wabi_reflect::EventDraft {
        wabi_reflect::EventDraft {
            name: self.name,
            date: self.date,
            time: self.time,
            category: self.category,
            location: self.location,
            goal: self.goal,
        }
    }
}

/// Initializes the tracing subscriber with an EnvFilter.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wabi={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
