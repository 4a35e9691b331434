//! # Web API Application State
//!
//! Shared state for the web API: the queue engine, the workshop directory,
//! the notifier channel and the runtime configuration. Everything is
//! instance-scoped so parallel test apps never share mutable state.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::TurneroConfig;
use crate::events::TurnNotifier;
use crate::models::WorkshopDirectory;
use crate::scheduling::{QueueEngine, SystemClock};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub engine: QueueEngine,
    pub directory: WorkshopDirectory,
    pub notifier: TurnNotifier,
    pub config: TurneroConfig,
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool, config: TurneroConfig) -> Self {
        let store = Store::new(pool.clone());
        let directory = WorkshopDirectory::new(pool.clone());
        let notifier = TurnNotifier::new(config.notifier_capacity);
        let engine = QueueEngine::new(
            store,
            directory.clone(),
            Arc::new(SystemClock),
            notifier.clone(),
            Duration::from_millis(config.request_deadline_ms),
        );

        Self {
            engine,
            directory,
            notifier,
            config,
            pool,
        }
    }
}
