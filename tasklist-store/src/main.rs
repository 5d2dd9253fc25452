//! `tasklist-store`: in-memory task store.
//!
//! Serves the tasklist REST contract from memory; all tasks are lost when
//! the process exits.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 127.0.0.1:5001 under /api/todo
//! cargo run --bin tasklist-store
//!
//! # Custom address and prefix
//! cargo run --bin tasklist-store -- --bind 0.0.0.0:8080 --base-path /tasks
//!
//! # Or via environment variable
//! TASKLIST_STORE_ADDR=127.0.0.1:8080 cargo run --bin tasklist-store
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tasklist_store::config::{StoreCliArgs, StoreConfig};
use tasklist_store::server;
use tasklist_store::store::TaskStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = StoreCliArgs::parse();

    let config = match StoreConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting task store");

    let store = Arc::new(TaskStore::new());
    match server::start_server_with_state(&config.bind_addr, &config.base_path, store).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task store listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task store task failed");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task store");
            ExitCode::FAILURE
        }
    }
}
