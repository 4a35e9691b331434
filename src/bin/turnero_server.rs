//! Turnero Server Binary
//!
//! Runs the workshop turn-queue HTTP service. Exit codes: 0 on normal
//! shutdown, 1 when the database is unreachable at startup, 2 on invalid
//! configuration.

use std::process::ExitCode;

use tokio::signal;
use tracing::{error, info};

use turnero_core::config::TurneroConfig;
use turnero_core::database::DatabaseConnection;
use turnero_core::events;
use turnero_core::logging;
use turnero_core::web::{self, state::AppState};

const EXIT_STARTUP_FAILURE: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let config = match TurneroConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Could not build the async runtime");
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    runtime.block_on(serve(config))
}

async fn serve(config: TurneroConfig) -> ExitCode {
    info!(bind_address = %config.bind_address, "Starting turnero server");

    let connection = match DatabaseConnection::connect(&config).await {
        Ok(connection) => connection,
        Err(e) => {
            error!(error = %e, "Database unreachable");
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    if let Err(e) = connection.health_check().await {
        error!(error = %e, "Database health check failed");
        return ExitCode::from(EXIT_STARTUP_FAILURE);
    }

    let state = AppState::new(connection.pool().clone(), config.clone());

    // Notification dispatch runs on its own task so HTTP latency never
    // waits on delivery.
    let dispatch_worker = events::spawn_dispatch_worker(&state.notifier);

    let app = web::create_app(state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, bind_address = %config.bind_address, "Could not bind");
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    info!("Turnero server listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    dispatch_worker.abort();

    match result {
        Ok(()) => {
            info!("Turnero server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Could not install the shutdown signal handler");
    }
}
