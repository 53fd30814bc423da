//! HTTP client for coding passes produced by a remote service.
//!
//! The service owns persona execution; this side only fetches finished
//! passes and hands them to the resolver.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::info;

use concord_core::{Category, Document};

use crate::error::ConsensusError;
use crate::pass::{PassProducer, Persona};
use crate::resolver::PassResult;

/// Client for a pass service's document endpoints.
pub struct RemotePassSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemotePassSource {
    /// `base_url` should be like `http://localhost:4000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured client (timeouts, proxies, TLS roots).
    pub fn with_client(base_url: String, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn passes_url(&self, document_id: &str) -> String {
        format!("{}/api/documents/{}/passes", self.base_url, document_id)
    }

    pub fn pass_url(&self, document_id: &str, persona: &str) -> String {
        format!("{}/{}", self.passes_url(document_id), persona)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConsensusError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ConsensusError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    /// Every completed pass for a document, in one request.
    pub async fn fetch_passes(&self, document_id: &str) -> Result<Vec<PassResult>, ConsensusError> {
        let url = self.passes_url(document_id);
        info!(url = %url, "fetching coding passes");
        let passes: Vec<PassResult> = self.get_json(&url).await?;
        info!(count = passes.len(), "fetched coding passes");
        Ok(passes)
    }
}

#[async_trait]
impl PassProducer for RemotePassSource {
    /// Fetch the pass the service ran for `persona`. The category list is
    /// ignored: the service codes against its own taxonomy.
    async fn produce(
        &self,
        document: &Document,
        _categories: &[Category],
        persona: &Persona,
    ) -> Result<PassResult, ConsensusError> {
        let url = self.pass_url(&document.id, &persona.name);
        info!(url = %url, persona = %persona.name, "fetching coding pass");
        self.get_json(&url).await
    }
}
