// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pricewatch serve` command implementation.
//!
//! Composition root: builds the account registry, tracking store, session
//! manager, task queue, and tracker service as explicit long-lived
//! instances, then runs the queue worker and session expiry sweep until a
//! shutdown signal arrives.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pricewatch_config::{AccountRegistry, PricewatchConfig};
use pricewatch_core::{AccountId, AutomationDriver, LoginAdapter, PricewatchError, TrackingMutator};
use pricewatch_queue::{QueueSettings, TaskQueue, TrackerService};
use pricewatch_session::SessionManager;
use pricewatch_store::TrackingStore;
use tracing::info;

use crate::shutdown;
use crate::simulate::{SimulatedDriver, SimulatedLogin, SimulatedMutator};

/// The wired object graph shared by `serve` and the one-shot commands.
pub struct Components {
    pub sessions: Arc<SessionManager>,
    pub queue: Arc<TaskQueue>,
    pub service: Arc<TrackerService>,
    pub sweep_interval: Duration,
}

/// Build the full object graph from configuration.
///
/// The automation backend is the simulated one; a real browser backend
/// slots in behind the same three traits.
pub fn build_components(config: &PricewatchConfig) -> Result<Components, PricewatchError> {
    let registry = AccountRegistry::from_config(config)?;
    let account_ids: Vec<AccountId> = registry.list().iter().map(|a| a.id.clone()).collect();
    let store = Arc::new(TrackingStore::new(&config.storage.data_dir, account_ids)?);

    // The queue file may live outside the data dir.
    if let Some(parent) = Path::new(&config.storage.queue_file).parent() {
        std::fs::create_dir_all(parent).map_err(|e| PricewatchError::Store {
            source: Box::new(e),
        })?;
    }

    let driver: Arc<dyn AutomationDriver> = Arc::new(SimulatedDriver::new());
    let login: Arc<dyn LoginAdapter> = Arc::new(SimulatedLogin);
    let mutator: Arc<dyn TrackingMutator> = Arc::new(SimulatedMutator);

    let sessions = Arc::new(SessionManager::new(
        driver,
        login,
        Duration::from_secs(config.session.idle_expiry_secs),
    ));

    let queue = Arc::new(TaskQueue::new(
        &config.storage.queue_file,
        registry.clone(),
        store.clone(),
        sessions.clone(),
        mutator.clone(),
        QueueSettings::from_config(&config.queue),
    ));

    let service = Arc::new(TrackerService::new(
        registry,
        store,
        sessions.clone(),
        mutator,
        queue.clone(),
    ));

    Ok(Components {
        sessions,
        queue,
        service,
        sweep_interval: Duration::from_secs(config.session.sweep_interval_secs),
    })
}

/// Runs the `pricewatch serve` command.
///
/// Loads pending work from the queue file, spawns the queue worker and the
/// session expiry sweep, and waits for SIGTERM/SIGINT. On shutdown the
/// worker persists the queue and every live browser session is closed.
pub async fn run_serve(config: PricewatchConfig) -> Result<(), PricewatchError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting pricewatch serve");

    let components = build_components(&config)?;
    components.queue.load().await;

    let cancel = shutdown::install_signal_handler();

    let sweep = tokio::spawn(
        components
            .sessions
            .clone()
            .run_expiry_sweep(components.sweep_interval, cancel.clone()),
    );
    let worker = tokio::spawn(components.queue.clone().run(cancel.clone()));

    cancel.cancelled().await;

    // The worker persists the queue on its way out.
    if let Err(error) = worker.await {
        tracing::warn!(%error, "queue worker task aborted");
    }
    if let Err(error) = sweep.await {
        tracing::warn!(%error, "expiry sweep task aborted");
    }

    let closed = components.sessions.close_all().await;
    info!(closed_sessions = closed, "pricewatch serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pricewatch={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_config::load_and_validate_str;

    fn config_in(dir: &tempfile::TempDir) -> PricewatchConfig {
        let toml = format!(
            r#"
[accounts.Premium]
username = "premium@example.com"
password = "pw"

[storage]
data_dir = "{0}/data"
queue_file = "{0}/data/task_queue.txt"
"#,
            dir.path().display()
        );
        load_and_validate_str(&toml).unwrap()
    }

    #[tokio::test]
    async fn components_wire_up_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let components = build_components(&config_in(&dir)).unwrap();

        assert_eq!(components.queue.load().await, 0);
        assert_eq!(components.sweep_interval, Duration::from_secs(900));
        assert_eq!(components.service.status().await.queue_size, 0);
    }

    #[tokio::test]
    async fn simulated_pipeline_tracks_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let components = build_components(&config_in(&dir)).unwrap();

        components.service.enqueue_manual("B000AAAAAA", "10,00").await;
        components.queue.process_single_task().await;

        let tracked = components
            .service
            .get_tracked(&AccountId::from("Premium"), "B000AAAAAA")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tracked.price, "10.00");
        assert_eq!(
            tracked.product_title.as_deref(),
            Some("Simulated product B000AAAAAA")
        );
    }

    #[tokio::test]
    async fn build_fails_without_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
[storage]
data_dir = "{0}/data"
queue_file = "{0}/data/task_queue.txt"
"#,
            dir.path().display()
        );
        let config = load_and_validate_str(&toml).unwrap();
        assert!(build_components(&config).is_err());
    }
}
