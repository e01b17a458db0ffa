//! HTTP client for the static dashboard datasets.
//!
//! Resources (relative to `data.base_url`, paths configurable):
//!   data/node_types.json         node type catalog
//!   data/edge_types.json         edge type catalog
//!   data/meta_path_json.json     meta-path catalog
//!   data/test_attention.json     attention records keyed by node id
//!   data/disease_options.json    `[id, treatable]` pairs
//!   data/node_name_dict.json     node type -> id -> name
//!   data/drug_predictions/{disease_id}.json

use std::time::Duration;

use async_trait::async_trait;
use drugexplorer_common::config::{DataConfig, DISEASE_ID_PLACEHOLDER};
use drugexplorer_common::entities::{
    AttentionRecord, DiseaseOption, DrugPredictionRecord, EdgeTypeCatalog, MetaPathCatalog,
    NodeNameDict,
};
use drugexplorer_common::{DrugExplorerError, Result};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::catalog::filter_attention;
use crate::source::{DataSource, Resource};

#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: Client,
    base_url: Url,
    paths: DataConfig,
}

impl HttpDataSource {
    pub fn new(config: &DataConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DrugExplorerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
            paths: config.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches("./"))
            .map_err(|e| DrugExplorerError::Config(format!("invalid dataset path {}: {}", path, e)))
    }

    /// Path of the predictions dataset for one disease, id percent-encoded.
    fn predictions_path(&self, disease_id: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(disease_id.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        self.paths
            .drug_predictions_path
            .replace(DISEASE_ID_PLACEHOLDER, &encoded)
    }

    /// GET a resource and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(&self, resource: Resource, path: &str) -> Result<T> {
        let url = self.resolve(path)?;
        debug!(%resource, %url, "Fetching dataset");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DrugExplorerError::fetch(resource.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DrugExplorerError::fetch(
                resource.as_str(),
                format!("HTTP {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DrugExplorerError::fetch(resource.as_str(), e))?;

        serde_json::from_slice(&body).map_err(|e| {
            DrugExplorerError::fetch(resource.as_str(), format!("parse error: {}", e))
        })
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    #[instrument(skip(self))]
    async fn fetch_node_types(&self) -> Result<Vec<String>> {
        self.get_json(Resource::NodeTypes, &self.paths.node_types_path).await
    }

    #[instrument(skip(self))]
    async fn fetch_edge_types(&self) -> Result<EdgeTypeCatalog> {
        self.get_json(Resource::EdgeTypes, &self.paths.edge_types_path).await
    }

    #[instrument(skip(self))]
    async fn fetch_meta_paths(&self) -> Result<MetaPathCatalog> {
        self.get_json(Resource::MetaPaths, &self.paths.meta_paths_path).await
    }

    #[instrument(skip(self))]
    async fn fetch_attention(&self, node_ids: &[Option<String>]) -> Result<AttentionRecord> {
        // The dataset has no query API; it is read whole and narrowed here.
        let dataset: AttentionRecord = self
            .get_json(Resource::Attention, &self.paths.attention_path)
            .await?;
        let records = filter_attention(dataset, node_ids);
        debug!(requested = node_ids.len(), found = records.len(), "Attention filtered");
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn fetch_disease_options(&self) -> Result<Vec<DiseaseOption>> {
        self.get_json(Resource::DiseaseOptions, &self.paths.disease_options_path)
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_node_names(&self) -> Result<NodeNameDict> {
        self.get_json(Resource::NodeNames, &self.paths.node_names_path).await
    }

    #[instrument(skip(self))]
    async fn fetch_drug_predictions(&self, disease_id: &str) -> Result<Vec<DrugPredictionRecord>> {
        let path = self.predictions_path(disease_id);
        self.get_json(Resource::DrugPredictions, &path).await
    }
}
