/// Core entity types shared by the data layer and the selection store.
/// Wire records mirror the static JSON datasets served to the dashboard.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Category label of a knowledge-graph entity (e.g. "disease", "drug", "gene/protein").
pub type NodeType = String;

/// Opaque edge type catalog, passed through to presentation.
pub type EdgeTypeCatalog = serde_json::Map<String, serde_json::Value>;

/// Opaque meta-path catalog, passed through to presentation.
pub type MetaPathCatalog = serde_json::Value;

/// Node id -> attention payload.
pub type AttentionRecord = HashMap<String, serde_json::Value>;

/// Node type -> (node id -> display name).
pub type NodeNameDict = HashMap<String, HashMap<String, String>>;

// ---------------------------------------------------------------------------
// Disease
// ---------------------------------------------------------------------------

/// `[id, treatable]` pair as stored in the disease catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseOption(pub String, pub bool);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
    pub id: String,
    pub name: String,
    /// false when the graph holds no known drug indication for the disease
    pub treatable: bool,
}

// ---------------------------------------------------------------------------
// Drug prediction
// ---------------------------------------------------------------------------

/// A ranked prediction as stored in the per-disease dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugPredictionRecord {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub known: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugPrediction {
    pub id: String,
    pub name: String,
    /// Raw model logit; see [`DrugPrediction::probability`].
    pub score: f64,
    /// Approved indication already present in the graph
    pub known: bool,
    #[serde(default)]
    pub selected: bool,
}

impl DrugPrediction {
    /// Score squashed into (0, 1) with the logistic function.
    pub fn probability(&self) -> f64 {
        1.0 / (1.0 + (-self.score).exp())
    }
}
