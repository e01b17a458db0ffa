//! Data source abstraction.

use std::fmt;

use async_trait::async_trait;
use drugexplorer_common::entities::{
    AttentionRecord, DiseaseOption, DrugPredictionRecord, EdgeTypeCatalog, MetaPathCatalog,
    NodeNameDict,
};
use drugexplorer_common::Result;
use serde::{Deserialize, Serialize};

/// The datasets a [`DataSource`] can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    NodeTypes,
    EdgeTypes,
    MetaPaths,
    Attention,
    DiseaseOptions,
    NodeNames,
    DrugPredictions,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::NodeTypes => "node_types",
            Resource::EdgeTypes => "edge_types",
            Resource::MetaPaths => "meta_paths",
            Resource::Attention => "attention",
            Resource::DiseaseOptions => "disease_options",
            Resource::NodeNames => "node_names",
            Resource::DrugPredictions => "drug_predictions",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common interface for everything that can supply dashboard datasets.
///
/// Implementations must not cache: each call re-reads its backing dataset.
/// Any call may fail with `FetchFailure`; callers treat that as "no data".
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_node_types(&self) -> Result<Vec<String>>;

    async fn fetch_edge_types(&self) -> Result<EdgeTypeCatalog>;

    async fn fetch_meta_paths(&self) -> Result<MetaPathCatalog>;

    /// Attention payloads for the given node ids. `None` ids are skipped.
    async fn fetch_attention(&self, node_ids: &[Option<String>]) -> Result<AttentionRecord>;

    async fn fetch_disease_options(&self) -> Result<Vec<DiseaseOption>>;

    async fn fetch_node_names(&self) -> Result<NodeNameDict>;

    /// Ranked predictions for one disease, best first.
    async fn fetch_drug_predictions(&self, disease_id: &str) -> Result<Vec<DrugPredictionRecord>>;
}
