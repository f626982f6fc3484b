//! Product Search Sync Entry Point
//!
//! Offline full resync: applies the index settings, then rebuilds the index
//! from every published catalog product. Exits non-zero on failure.

use dotenv::dotenv;
use product_search::{Dependencies, IndexingError};
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_search=info,product_search_repository=info"));

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "product-search-sync",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting product search sync");

    let deps = match Dependencies::from_env() {
        Ok(Some(deps)) => deps,
        Ok(None) => {
            warn!("Search indexing disabled, nothing to sync");
            return Ok(());
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    if let Err(e) = deps.index.configure_index().await {
        error!(error = %e, "Failed to configure index");
        return Err(e.into());
    }

    match deps.sync.full_resync().await {
        Ok(report) => {
            info!(
                products = report.products_fetched,
                records_indexed = report.records_indexed,
                records_skipped = report.records_skipped,
                "Product search sync completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Product search sync failed");
            Err(e.into())
        }
    }
}
