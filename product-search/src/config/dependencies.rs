//! Dependency initialization and wiring for the product search indexer.

use std::sync::Arc;

use product_search_repository::{
    AlgoliaConfig, AlgoliaProvider, IndexClient, IndexClientConfig, IndexConfig, SearchEngine,
};
use tracing::{info, warn};
use url::Url;

use super::settings::SearchConfig;
use crate::catalog::{CatalogSource, HttpCatalogClient};
use crate::incremental::IncrementalUpdater;
use crate::inventory::{HttpInventoryClient, InventoryLookup, InventoryResolver};
use crate::processor::RecordTransformer;
use crate::query::QueryService;
use crate::sync::{CatalogSyncService, SyncConfig};
use crate::IndexingError;

/// Container for all initialized services.
///
/// Built once by whichever component composes the system and shared by
/// reference; there are no global instances.
pub struct Dependencies {
    pub config: SearchConfig,
    pub index: Arc<IndexClient>,
    pub sync: CatalogSyncService,
    pub incremental: IncrementalUpdater,
    pub query: QueryService,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Dependencies))` - Initialized dependencies
    /// * `Ok(None)` - Engine credentials are missing; indexing is disabled
    /// * `Err(IndexingError)` - If a URL or client could not be built
    pub fn from_env() -> Result<Option<Self>, IndexingError> {
        Self::from_config(SearchConfig::from_env())
    }

    /// Initialize all dependencies from a loaded configuration.
    pub fn from_config(config: SearchConfig) -> Result<Option<Self>, IndexingError> {
        let Some(credentials) = config.engine.clone() else {
            warn!("ALGOLIA_APP_ID or ALGOLIA_API_KEY not set, search indexing is disabled");
            return Ok(None);
        };

        info!(
            app_id = %credentials.app_id,
            index_name = %config.index_name,
            catalog_base_url = %config.catalog_base_url,
            inventory_remote_lookup = config.inventory_remote_lookup,
            "Initializing dependencies"
        );

        let mut algolia = AlgoliaConfig::new(
            credentials.app_id,
            credentials.api_key,
            IndexConfig::new(config.index_name.clone()),
        );
        algolia.timeout = config.http_timeout;
        algolia.wait_for_tasks = config.wait_for_tasks;
        let engine = AlgoliaProvider::new(algolia).map_err(|e| {
            IndexingError::config(format!("Failed to create Algolia provider: {}", e))
        })?;

        let base_url = catalog_base_url(&config.catalog_base_url)?;
        let catalog = HttpCatalogClient::new(
            base_url.clone(),
            config.catalog_admin_token.clone(),
            config.http_timeout,
        )
        .map_err(|e| IndexingError::config(format!("Failed to create catalog client: {}", e)))?;

        let resolver = if config.inventory_remote_lookup {
            let lookup = HttpInventoryClient::new(
                base_url,
                config.catalog_admin_token.clone(),
                config.http_timeout,
            )
            .map_err(|e| {
                IndexingError::config(format!("Failed to create inventory client: {}", e))
            })?;
            InventoryResolver::with_remote_lookup(Arc::new(lookup) as Arc<dyn InventoryLookup>)
        } else {
            InventoryResolver::new()
        };

        Ok(Some(Self::with_components(
            config,
            Arc::new(engine),
            Arc::new(catalog),
            resolver,
        )))
    }

    /// Wire the services around the given collaborators.
    pub fn with_components(
        config: SearchConfig,
        engine: Arc<dyn SearchEngine>,
        catalog: Arc<dyn CatalogSource>,
        resolver: InventoryResolver,
    ) -> Self {
        let index = Arc::new(IndexClient::with_config(
            engine,
            IndexClientConfig::with_chunk_size(config.index_chunk_size),
        ));
        let transformer = Arc::new(RecordTransformer::new(
            config.default_currency.clone(),
            resolver,
        ));

        let sync = CatalogSyncService::new(
            catalog.clone(),
            transformer.clone(),
            index.clone(),
            SyncConfig {
                catalog_page_size: config.catalog_page_size,
                catalog_fetch_timeout: config.catalog_fetch_timeout,
            },
        );
        let incremental = IncrementalUpdater::new(catalog, transformer, index.clone());
        let query = QueryService::new(index.clone());

        Self {
            config,
            index,
            sync,
            incremental,
            query,
        }
    }
}

/// Parse the catalog base URL, making sure a path prefix ends with a slash
/// so relative endpoints resolve under it.
fn catalog_base_url(raw: &str) -> Result<Url, IndexingError> {
    let mut url = Url::parse(raw)
        .map_err(|e| IndexingError::config(format!("Invalid CATALOG_BASE_URL {}: {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
