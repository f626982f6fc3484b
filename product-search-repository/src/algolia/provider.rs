//! Algolia provider implementation.
//!
//! This module provides the concrete implementation of `SearchEngine` against
//! the Algolia REST API using `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use product_search_shared::IndexRecord;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::algolia::index_config::IndexConfig;
use crate::errors::IndexClientError;
use crate::interfaces::SearchEngine;
use crate::types::{EngineQuery, EngineSearchResponse};

/// Connection settings for the Algolia provider.
#[derive(Debug, Clone)]
pub struct AlgoliaConfig {
    /// Application identifier.
    pub app_id: String,
    /// API key with write access to the index.
    pub api_key: String,
    /// The primary index.
    pub index: IndexConfig,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Poll write tasks until the engine reports them published.
    pub wait_for_tasks: bool,
    /// Delay between task status polls.
    pub task_poll_interval: Duration,
    /// Number of polls before a task wait fails.
    pub max_task_polls: u32,
    /// Override for both read and write hosts (Algolia-compatible servers, tests).
    pub host: Option<Url>,
}

impl AlgoliaConfig {
    /// Create a config with default timeouts for the given credentials.
    pub fn new(
        app_id: impl Into<String>,
        api_key: impl Into<String>,
        index: IndexConfig,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            index,
            timeout: Duration::from_secs(10),
            wait_for_tasks: true,
            task_poll_interval: Duration::from_millis(250),
            max_task_polls: 120,
            host: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    #[serde(rename = "taskID", default)]
    task_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TaskStatusResponse {
    #[serde(default)]
    status: String,
}

/// Algolia provider implementation.
///
/// Reads go to the DSN host, writes to the primary host. Write operations
/// return once the engine has accepted the task, or once it is published when
/// `wait_for_tasks` is set. Tasks on one index are applied in submission
/// order, so a clear or delete followed by a save is never reordered.
///
/// # Example
///
/// ```ignore
/// use product_search_repository::{AlgoliaConfig, AlgoliaProvider, IndexConfig};
///
/// let config = AlgoliaConfig::new("APPID", "write-key", IndexConfig::new("products"));
/// let provider = AlgoliaProvider::new(config)?;
/// provider.save_objects(&records).await?;
/// ```
pub struct AlgoliaProvider {
    client: Client,
    config: AlgoliaConfig,
    read_host: Url,
    write_host: Url,
}

impl AlgoliaProvider {
    /// Create a new provider for the configured application and index.
    ///
    /// # Returns
    ///
    /// * `Ok(AlgoliaProvider)` - A new provider instance
    /// * `Err(IndexClientError)` - If the credentials are empty or the HTTP client cannot be built
    pub fn new(config: AlgoliaConfig) -> Result<Self, IndexClientError> {
        if config.app_id.trim().is_empty() || config.api_key.trim().is_empty() {
            return Err(IndexClientError::validation(
                "Algolia application id and API key are required",
            ));
        }

        let (read_host, write_host) = match &config.host {
            Some(host) => (host.clone(), host.clone()),
            None => (
                Self::parse_host(&format!("https://{}-dsn.algolia.net", config.app_id))?,
                Self::parse_host(&format!("https://{}.algolia.net", config.app_id))?,
            ),
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IndexClientError::connection(e.to_string()))?;

        info!(
            app_id = %config.app_id,
            index = %config.index.index_name,
            wait_for_tasks = config.wait_for_tasks,
            "Created Algolia provider"
        );

        Ok(Self {
            client,
            config,
            read_host,
            write_host,
        })
    }

    fn parse_host(raw: &str) -> Result<Url, IndexClientError> {
        Url::parse(raw).map_err(|e| IndexClientError::connection(format!("{}: {}", raw, e)))
    }

    /// Build `/1/indexes/{index}/{tail...}` on the given host, encoding each segment.
    fn endpoint(host: &Url, index_name: &str, tail: &[&str]) -> Result<Url, IndexClientError> {
        let mut url = host.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| {
                    IndexClientError::connection(format!("{} cannot be a base URL", host))
                })?;
            segments.clear().push("1").push("indexes").push(index_name);
            segments.extend(tail);
        }
        Ok(url)
    }

    fn read_url(&self, index_name: &str, tail: &[&str]) -> Result<Url, IndexClientError> {
        Self::endpoint(&self.read_host, index_name, tail)
    }

    fn write_url(&self, index_name: &str, tail: &[&str]) -> Result<Url, IndexClientError> {
        Self::endpoint(&self.write_host, index_name, tail)
    }

    /// Body of a batch request applying `action` to every item.
    fn batch_body(action: &str, bodies: Vec<Value>) -> Value {
        let requests: Vec<Value> = bodies
            .into_iter()
            .map(|body| json!({ "action": action, "body": body }))
            .collect();
        json!({ "requests": requests })
    }

    /// Body of a query request.
    fn search_body(query: &EngineQuery) -> Value {
        let mut body = json!({
            "query": query.query,
            "page": query.page,
            "hitsPerPage": query.hits_per_page,
        });
        if let Some(filter) = &query.filter {
            body["filters"] = json!(filter.to_string());
        }
        if let Some(attributes) = &query.attributes_to_retrieve {
            body["attributesToRetrieve"] = json!(attributes);
        }
        body
    }

    /// Attach credentials, send, and turn non-success statuses into errors.
    async fn send(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<Response, IndexClientError> {
        let response = request
            .header("X-Algolia-Application-Id", &self.config.app_id)
            .header("X-Algolia-API-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                error!(operation, error = %e, "Algolia request could not be sent");
                IndexClientError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(operation, status = %status, body = %body, "Algolia request failed");
            return Err(IndexClientError::request_failed(status.as_u16(), body));
        }

        Ok(response)
    }

    /// Send a write request and, if configured, wait for its task.
    async fn write(
        &self,
        index_name: &str,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<(), IndexClientError> {
        let response = self.send(request, operation).await?;
        let task: TaskResponse = response.json().await?;

        match (self.config.wait_for_tasks, task.task_id) {
            (true, Some(task_id)) => self.wait_for_task(index_name, task_id).await,
            (true, None) => {
                warn!(operation, "Algolia write returned no taskID; not waiting");
                Ok(())
            }
            (false, _) => Ok(()),
        }
    }

    /// Poll a task until it is published or the poll budget runs out.
    async fn wait_for_task(&self, index_name: &str, task_id: u64) -> Result<(), IndexClientError> {
        let task = task_id.to_string();
        let url = self.read_url(index_name, &["task", &task])?;

        for attempt in 1..=self.config.max_task_polls {
            let response = self
                .send(self.client.get(url.clone()), "get_task")
                .await?;
            let status: TaskStatusResponse = response.json().await?;

            if status.status == "published" {
                debug!(task_id, attempt, "Algolia task published");
                return Ok(());
            }

            tokio::time::sleep(self.config.task_poll_interval).await;
        }

        Err(IndexClientError::task(format!(
            "task {} on {} not published after {} polls",
            task_id, index_name, self.config.max_task_polls
        )))
    }
}

#[async_trait]
impl SearchEngine for AlgoliaProvider {
    fn index_name(&self) -> &str {
        &self.config.index.index_name
    }

    async fn set_settings(
        &self,
        index_name: &str,
        settings: &Value,
    ) -> Result<(), IndexClientError> {
        let url = self.write_url(index_name, &["settings"])?;
        self.write(index_name, self.client.put(url).json(settings), "set_settings")
            .await?;

        info!(index = %index_name, "Index settings applied");
        Ok(())
    }

    async fn get_settings(&self, index_name: &str) -> Result<Value, IndexClientError> {
        let url = self.read_url(index_name, &["settings"])?;
        let response = self.send(self.client.get(url), "get_settings").await?;
        Ok(response.json().await?)
    }

    async fn save_objects(&self, records: &[IndexRecord]) -> Result<(), IndexClientError> {
        if records.is_empty() {
            return Ok(());
        }

        let bodies = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        let body = Self::batch_body("updateObject", bodies);

        let index_name = self.index_name();
        let url = self.write_url(index_name, &["batch"])?;
        self.write(index_name, self.client.post(url).json(&body), "save_objects")
            .await?;

        debug!(count = records.len(), "Records saved");
        Ok(())
    }

    async fn delete_objects(&self, object_ids: &[String]) -> Result<(), IndexClientError> {
        if object_ids.is_empty() {
            return Ok(());
        }

        let bodies = object_ids
            .iter()
            .map(|id| json!({ "objectID": id }))
            .collect();
        let body = Self::batch_body("deleteObject", bodies);

        let index_name = self.index_name();
        let url = self.write_url(index_name, &["batch"])?;
        self.write(index_name, self.client.post(url).json(&body), "delete_objects")
            .await?;

        debug!(count = object_ids.len(), "Records deleted");
        Ok(())
    }

    async fn search_single_index(
        &self,
        query: &EngineQuery,
    ) -> Result<EngineSearchResponse, IndexClientError> {
        let url = self.read_url(self.index_name(), &["query"])?;
        let body = Self::search_body(query);
        let response = self
            .send(self.client.post(url).json(&body), "search")
            .await?;

        response
            .json::<EngineSearchResponse>()
            .await
            .map_err(|e| IndexClientError::parse(e.to_string()))
    }

    async fn clear_objects(&self) -> Result<(), IndexClientError> {
        let index_name = self.index_name();
        let url = self.write_url(index_name, &["clear"])?;
        self.write(index_name, self.client.post(url), "clear_objects")
            .await?;

        info!(index = %index_name, "Index cleared");
        Ok(())
    }
}
