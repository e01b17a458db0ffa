//! Intents, actions, effects and change events.

use drugexplorer_common::entities::{
    AttentionRecord, Disease, DrugPredictionRecord, EdgeTypeCatalog, MetaPathCatalog, NodeNameDict,
    NodeType,
};
use drugexplorer_data::Resource;
use serde::{Deserialize, Serialize};

use crate::state::RequestId;

/// Raw value emitted by the threshold slider or its numeric text field.
/// Text fields report non-numeric content while the user is typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Number(f64),
    Text(String),
    Undefined,
}

impl ControlValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ControlValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for ControlValue {
    fn from(v: f64) -> Self {
        ControlValue::Number(v)
    }
}

impl From<Option<f64>> for ControlValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(ControlValue::Undefined, ControlValue::Number)
    }
}

impl From<&str> for ControlValue {
    fn from(v: &str) -> Self {
        ControlValue::Text(v.to_string())
    }
}

/// What presentation asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    SelectDisease {
        disease_id: String,
    },
    SelectDrug {
        drug_id: String,
        disease_id: String,
        is_add: bool,
    },
    ChangeEdgeThreshold {
        value: ControlValue,
    },
}

impl Intent {
    pub fn select_disease(disease_id: impl Into<String>) -> Self {
        Intent::SelectDisease { disease_id: disease_id.into() }
    }

    pub fn add_drug(drug_id: impl Into<String>, disease_id: impl Into<String>) -> Self {
        Intent::SelectDrug {
            drug_id: drug_id.into(),
            disease_id: disease_id.into(),
            is_add: true,
        }
    }

    pub fn remove_drug(drug_id: impl Into<String>, disease_id: impl Into<String>) -> Self {
        Intent::SelectDrug {
            drug_id: drug_id.into(),
            disease_id: disease_id.into(),
            is_add: false,
        }
    }

    pub fn change_edge_threshold(value: impl Into<ControlValue>) -> Self {
        Intent::ChangeEdgeThreshold { value: value.into() }
    }
}

/// Everything the reducer accepts: user intents plus fetch outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Intent(Intent),
    FetchStarted(Resource),
    NodeTypesLoaded(Vec<NodeType>),
    EdgeTypesLoaded(EdgeTypeCatalog),
    MetaPathsLoaded(MetaPathCatalog),
    NodeNamesLoaded(NodeNameDict),
    DiseaseOptionsLoaded(Vec<Disease>),
    /// Start an attention fetch; it supersedes any still in flight.
    LoadAttention {
        node_ids: Vec<Option<String>>,
    },
    AttentionLoaded {
        request: RequestId,
        records: AttentionRecord,
    },
    AttentionFailed {
        request: RequestId,
        reason: String,
    },
    PredictionsLoaded {
        disease_id: String,
        request: RequestId,
        records: Vec<DrugPredictionRecord>,
    },
    PredictionsFailed {
        disease_id: String,
        request: RequestId,
        reason: String,
    },
    FetchFailed {
        resource: Resource,
        reason: String,
    },
}

impl From<Intent> for Action {
    fn from(intent: Intent) -> Self {
        Action::Intent(intent)
    }
}

/// Work a transition asks the dispatcher to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPredictions {
        disease_id: String,
        request: RequestId,
    },
    FetchAttention {
        node_ids: Vec<Option<String>>,
        request: RequestId,
    },
}

/// Broadcast to subscribers after every applied transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    DiseaseSelected { disease_id: String },
    DrugToggled { drug_id: String, selected: bool },
    ThresholdChanged { value: f64 },
    PredictionsChanged { disease_id: String },
    Loading { resource: Resource },
    Loaded { resource: Resource },
    FetchFailed { resource: Resource, reason: String },
}
