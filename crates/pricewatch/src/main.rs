// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricewatch - multi-account price-alert tracking automation.
//!
//! This is the binary entry point for the Pricewatch daemon and its
//! administrative commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pricewatch_core::{AccountId, TrackingOp};

mod serve;
mod shutdown;
mod simulate;
mod status;

/// Pricewatch - multi-account price-alert tracking automation.
#[derive(Parser, Debug)]
#[command(name = "pricewatch", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the tracking daemon (queue worker + session expiry sweep).
    Serve,
    /// Show store statistics and queue size.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colors even on a TTY.
        #[arg(long)]
        plain: bool,
    },
    /// Manage the task queue.
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Track one item immediately, bypassing the queue.
    Track {
        item: String,
        price: String,
        /// Account to use; defaults to the configured default account.
        #[arg(long)]
        account: Option<String>,
    },
    /// Stop tracking one item immediately, bypassing the queue.
    Untrack {
        item: String,
        /// Account to use; defaults to the configured default account.
        #[arg(long)]
        account: Option<String>,
    },
}

/// Queue administration subcommands.
#[derive(Subcommand, Debug)]
enum QueueCommands {
    /// Enqueue one item for automated tracking.
    Add { item: String, price: String },
    /// Enqueue `item,price` lines from a file.
    Import { file: PathBuf },
    /// Drop all pending tasks.
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match pricewatch_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            pricewatch_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Queue { command }) => run_queue_command(config, command).await,
        Some(Commands::Track {
            item,
            price,
            account,
        }) => run_mutation(config, &item, &price, account, TrackingOp::CreateOrUpdate).await,
        Some(Commands::Untrack { item, account }) => {
            run_mutation(config, &item, "", account, TrackingOp::Delete).await
        }
        None => {
            println!("pricewatch: use --help for available commands");
            Ok(())
        }
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run_queue_command(
    config: pricewatch_config::PricewatchConfig,
    command: QueueCommands,
) -> Result<(), pricewatch_core::PricewatchError> {
    let components = serve::build_components(&config)?;
    components.queue.load().await;

    match command {
        QueueCommands::Add { item, price } => {
            let size = components.service.enqueue_manual(&item, &price).await;
            println!("enqueued; queue size is now {size}");
        }
        QueueCommands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file).await.map_err(|e| {
                pricewatch_core::PricewatchError::Internal(format!(
                    "failed to read {}: {e}",
                    file.display()
                ))
            })?;
            let report = components.service.enqueue_bulk(&raw).await;
            println!(
                "imported {} tasks ({} skipped); queue size is now {}",
                report.added, report.skipped, report.queue_size
            );
        }
        QueueCommands::Clear => {
            let status = components.service.clear().await;
            println!("queue cleared; size is now {}", status.queue_size);
        }
    }
    Ok(())
}

async fn run_mutation(
    config: pricewatch_config::PricewatchConfig,
    item: &str,
    price: &str,
    account: Option<String>,
    op: TrackingOp,
) -> Result<(), pricewatch_core::PricewatchError> {
    let components = serve::build_components(&config)?;
    let account = account.map(AccountId);

    let outcome = components
        .service
        .mutate_now(account.as_ref(), item, price, op)
        .await?;

    if outcome.success {
        match outcome.title {
            Some(title) => println!("ok: {title}"),
            None => println!("ok"),
        }
    } else {
        let kind = outcome
            .error
            .map(|k| k.to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string());
        println!("failed: {kind}");
    }
    Ok(())
}
