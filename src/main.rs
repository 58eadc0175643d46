//! Customer Search - Main entry point
//!
//! Opens the on-disk index, seeds an in-memory record source with generated
//! customers, builds the index once, runs a sample search and then keeps the
//! index fresh in the background until interrupted.

use anyhow::Result;
use customer_search::repositories::{CustomerRepository, InMemoryCustomerRepository};
use customer_search::services::rebuild_on_startup;
use customer_search::{Config, CustomerIndex, CustomerSearchService, CustomerSearchServiceImpl};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Result cap for the startup sample search.
const DEMO_MAX_RESULTS: usize = 50;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before logging so LOG_LEVEL can seed the filter
    let config = Config::from_env();
    let fallback_level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match config {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        path = %config.index_path.display(),
        "Opening customer search index"
    );
    let store = match CustomerIndex::open(&config.index_path, config.writer_memory_bytes()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to open the customer search index: {}", e);
            return Err(e.into());
        }
    };

    let repository = Arc::new(InMemoryCustomerRepository::with_dummy_customers(
        config.dummy_customer_count,
    )) as Arc<dyn CustomerRepository>;
    info!(
        customers = config.dummy_customer_count,
        "Seeded record source with generated customers"
    );

    let service =
        CustomerSearchServiceImpl::new(store, repository, config.rebuild_interval())?;

    // Build once so the sample search sees data; failures are retried by
    // the background schedule
    rebuild_on_startup(&service).await;

    match service
        .search(&config.demo_search_term, DEMO_MAX_RESULTS.min(config.default_max_results))
        .await
    {
        Ok(hits) => {
            info!(
                term = %config.demo_search_term,
                hits = hits.len(),
                "Sample search finished"
            );
            for hit in &hits {
                info!(key = %hit.key, name = %hit.full_name, score = hit.score, "Hit");
            }
        }
        Err(e) => error!(term = %config.demo_search_term, "Sample search failed: {}", e),
    }

    match service.index_status().await {
        Ok(status) => info!("Index status: {}", serde_json::to_string(&status)?),
        Err(e) => error!("Failed to read index status: {}", e),
    }

    service.start_background_rebuild().await;
    info!(
        interval_secs = config.rebuild_interval_secs,
        "Background rebuild running, press Ctrl+C to exit"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    service.shutdown().await;
    info!("Customer search shutdown complete");
    Ok(())
}
