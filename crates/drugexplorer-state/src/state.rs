//! The dashboard's selection state.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use drugexplorer_common::config::DEFAULT_EDGE_THRESHOLD;
use drugexplorer_common::entities::{
    AttentionRecord, Disease, DrugPrediction, EdgeTypeCatalog, MetaPathCatalog, NodeNameDict,
    NodeType,
};
use drugexplorer_data::Resource;
use serde::Serialize;

/// Number handed to each predictions or attention fetch. Results carrying
/// any other number than the one currently awaited are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Drug predictions for the selected disease.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Predictions {
    /// No disease selected yet.
    #[default]
    Idle,
    Loading {
        disease_id: String,
        request: RequestId,
    },
    Ready {
        disease_id: String,
        request: RequestId,
        drugs: Vec<DrugPrediction>,
    },
    Failed {
        disease_id: String,
        request: RequestId,
        reason: String,
    },
}

impl Predictions {
    /// Ranked drugs, empty unless loaded.
    pub fn drugs(&self) -> &[DrugPrediction] {
        match self {
            Predictions::Ready { drugs, .. } => drugs,
            _ => &[],
        }
    }

    pub fn disease_id(&self) -> Option<&str> {
        match self {
            Predictions::Idle => None,
            Predictions::Loading { disease_id, .. }
            | Predictions::Ready { disease_id, .. }
            | Predictions::Failed { disease_id, .. } => Some(disease_id),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Predictions::Loading { .. })
    }

    /// True when `request` is the fetch currently awaited for `disease_id`.
    pub fn awaits(&self, disease_id: &str, request: RequestId) -> bool {
        matches!(
            self,
            Predictions::Loading { disease_id: d, request: r } if d == disease_id && *r == request
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    pub selected_disease: Option<Disease>,
    pub drug_predictions: Predictions,
    /// Always within [0, 1.5].
    pub edge_threshold: f64,
    /// Catalog order, no duplicates.
    pub node_types: Vec<NodeType>,
    pub disease_options: Vec<Disease>,
    pub node_names: NodeNameDict,
    pub edge_types: EdgeTypeCatalog,
    pub meta_paths: MetaPathCatalog,
    pub attention: AttentionRecord,
    /// Datasets with a fetch in flight.
    pub pending: BTreeSet<Resource>,
    /// Last failure per dataset, cleared when it loads.
    pub fetch_errors: BTreeMap<Resource, String>,
    /// Newest attention fetch; older ones are dropped when they land.
    pub attention_request: Option<RequestId>,
    pub(crate) last_request: u64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_THRESHOLD)
    }
}

impl SelectionState {
    pub fn new(edge_threshold: f64) -> Self {
        Self {
            selected_disease: None,
            drug_predictions: Predictions::Idle,
            edge_threshold,
            node_types: Vec::new(),
            disease_options: Vec::new(),
            node_names: NodeNameDict::new(),
            edge_types: EdgeTypeCatalog::new(),
            meta_paths: MetaPathCatalog::Null,
            attention: AttentionRecord::new(),
            pending: BTreeSet::new(),
            fetch_errors: BTreeMap::new(),
            attention_request: None,
            last_request: 0,
        }
    }

    pub fn selected_disease_id(&self) -> Option<&str> {
        self.selected_disease.as_ref().map(|d| d.id.as_str())
    }

    /// Ids of the selected drugs, in rank order.
    pub fn selected_drug_ids(&self) -> Vec<String> {
        self.drug_predictions
            .drugs()
            .iter()
            .filter(|d| d.selected)
            .map(|d| d.id.clone())
            .collect()
    }

    pub fn find_disease(&self, disease_id: &str) -> Option<&Disease> {
        self.disease_options.iter().find(|d| d.id == disease_id)
    }

    pub fn is_loading(&self, resource: Resource) -> bool {
        self.pending.contains(&resource)
    }

    pub(crate) fn next_request(&mut self) -> RequestId {
        self.last_request += 1;
        RequestId(self.last_request)
    }
}

/// Drop repeated entries, keeping the first occurrence.
pub fn unique_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
