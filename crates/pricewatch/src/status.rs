// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pricewatch status` command implementation.
//!
//! Reads the store documents and the queue file directly, so it works
//! whether or not the daemon is running.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use pricewatch_config::PricewatchConfig;
use pricewatch_core::{AccountId, PricewatchError};
use pricewatch_queue::Task;
use pricewatch_store::TrackingStore;
use serde::Serialize;

/// Per-account row of the status output.
#[derive(Debug, Serialize)]
struct AccountStatusRow {
    account: String,
    tracked: usize,
    last_updated: Option<DateTime<Utc>>,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    total_tracked: usize,
    queue_size: usize,
    accounts: Vec<AccountStatusRow>,
}

/// Run the `pricewatch status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &PricewatchConfig,
    json: bool,
    plain: bool,
) -> Result<(), PricewatchError> {
    let accounts: Vec<AccountId> = config
        .accounts
        .keys()
        .map(|id| AccountId::from(id.as_str()))
        .collect();
    let store = TrackingStore::new(&config.storage.data_dir, accounts)?;
    let stats = store.statistics().await?;
    let queue_size = read_queue_size(&config.storage.queue_file);

    let response = StatusResponse {
        total_tracked: stats.total,
        queue_size,
        accounts: stats
            .accounts
            .iter()
            .map(|a| AccountStatusRow {
                account: a.account.to_string(),
                tracked: a.tracked,
                last_updated: a.last_updated,
            })
            .collect(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, use_color);
    }

    Ok(())
}

/// Count valid tasks in the queue file. A missing file is an empty queue.
fn read_queue_size(path: &str) -> usize {
    match std::fs::read_to_string(path) {
        Ok(raw) => raw
            .lines()
            .filter(|line| Task::parse_line(line.trim()).is_some())
            .count(),
        Err(_) => 0,
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "never".to_string(),
    }
}

fn print_status(response: &StatusResponse, use_color: bool) {
    println!();
    println!("  pricewatch status");
    println!("  {}", "-".repeat(35));
    println!("    Tracked items: {}", response.total_tracked);
    println!("    Queue size:    {}", response.queue_size);
    println!();

    for row in &response.accounts {
        let updated = format_timestamp(row.last_updated);
        if use_color {
            use colored::Colorize;
            println!(
                "    {:<12} {} items (last update: {})",
                row.account.bold(),
                row.tracked.to_string().green(),
                updated
            );
        } else {
            println!(
                "    {:<12} {} items (last update: {})",
                row.account, row.tracked, updated
            );
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_serializes() {
        let response = StatusResponse {
            total_tracked: 3,
            queue_size: 1,
            accounts: vec![AccountStatusRow {
                account: "Premium".to_string(),
                tracked: 3,
                last_updated: Some("2026-04-06T12:34:56Z".parse().unwrap()),
            }],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"total_tracked\":3"));
        assert!(json.contains("\"queue_size\":1"));
        assert!(json.contains("\"account\":\"Premium\""));
    }

    #[test]
    fn format_timestamp_handles_absent() {
        assert_eq!(format_timestamp(None), "never");
        let ts: DateTime<Utc> = "2026-04-06T12:34:56Z".parse().unwrap();
        assert_eq!(format_timestamp(Some(ts)), "2026-04-06 12:34:56 UTC");
    }

    #[test]
    fn queue_size_tolerates_noise_and_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.txt");
        assert_eq!(read_queue_size(path.to_str().unwrap()), 0);

        std::fs::write(&path, "B000AAAAAA,10.00\nnot a task\n\nB000BBBBBB,20.50\n").unwrap();
        assert_eq!(read_queue_size(path.to_str().unwrap()), 2);
    }
}
