//! Seeds the product catalog into Firestore.
//!
//! Run with:
//! ```
//! GOOGLE_APPLICATION_CREDENTIALS=./serviceAccountKey.json cargo run -p seed-data --bin seed
//! ```
//!
//! Against a local emulator:
//! ```
//! FIRESTORE_EMULATOR_HOST=localhost:8080 cargo run -p seed-data --bin seed
//! ```

use std::process::ExitCode;

use seed_data::config::SeedConfig;
use seed_data::db::log_event;
use seed_data::{connect, exit_status, run};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SeedConfig::from_env();
    let catalog = config.load_catalog()?;

    tracing::info!(
        "Adding {} products to Firestore collection '{}'...",
        catalog.len(),
        config.collection
    );

    let result = run(connect(&config), &config, &catalog, log_event).await;

    Ok(ExitCode::from(exit_status(&result)))
}
