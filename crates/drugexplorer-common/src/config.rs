//! Configuration loading for DrugExplorer.
//! Reads drugexplorer.toml from the current directory or path in DRUGEXPLORER_CONFIG env var.
//! DRUGEXPLORER_BASE_URL overrides `data.base_url`.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{DrugExplorerError, Result};

/// Lowest value the edge threshold controls emit.
pub const EDGE_THRESHOLD_MIN: f64 = 0.0;
/// Highest value the edge threshold controls emit.
pub const EDGE_THRESHOLD_MAX: f64 = 1.5;
/// Edge threshold before the user touches the controls.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.5;

/// Placeholder substituted with the disease id in `drug_predictions_path`.
pub const DISEASE_ID_PLACEHOLDER: &str = "{disease_id}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_node_types_path")]
    pub node_types_path: String,
    #[serde(default = "default_edge_types_path")]
    pub edge_types_path: String,
    #[serde(default = "default_meta_paths_path")]
    pub meta_paths_path: String,
    #[serde(default = "default_attention_path")]
    pub attention_path: String,
    #[serde(default = "default_disease_options_path")]
    pub disease_options_path: String,
    #[serde(default = "default_node_names_path")]
    pub node_names_path: String,
    #[serde(default = "default_drug_predictions_path")]
    pub drug_predictions_path: String,
}

fn default_base_url()              -> String { "http://localhost:3000/".to_string() }
fn default_timeout_secs()          -> u64    { 30 }
fn default_node_types_path()       -> String { "data/node_types.json".to_string() }
fn default_edge_types_path()       -> String { "data/edge_types.json".to_string() }
fn default_meta_paths_path()       -> String { "data/meta_path_json.json".to_string() }
fn default_attention_path()        -> String { "data/test_attention.json".to_string() }
fn default_disease_options_path()  -> String { "data/disease_options.json".to_string() }
fn default_node_names_path()       -> String { "data/node_name_dict.json".to_string() }
fn default_drug_predictions_path() -> String { "data/drug_predictions/{disease_id}.json".to_string() }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            node_types_path: default_node_types_path(),
            edge_types_path: default_edge_types_path(),
            meta_paths_path: default_meta_paths_path(),
            attention_path: default_attention_path(),
            disease_options_path: default_disease_options_path(),
            node_names_path: default_node_names_path(),
            drug_predictions_path: default_drug_predictions_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_edge_threshold")]
    pub default_edge_threshold: f64,
    /// Disease names hidden from the catalog because they are too general.
    #[serde(default = "default_excluded_diseases")]
    pub excluded_diseases: Vec<String>,
}

fn default_edge_threshold() -> f64 { DEFAULT_EDGE_THRESHOLD }

fn default_excluded_diseases() -> Vec<String> {
    vec![
        "cancer".to_string(),
        "disease".to_string(),
        "syndrome".to_string(),
    ]
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_edge_threshold: default_edge_threshold(),
            excluded_diseases: default_excluded_diseases(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from drugexplorer.toml.
    /// Checks DRUGEXPLORER_CONFIG env var first, then current directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("DRUGEXPLORER_CONFIG")
            .unwrap_or_else(|_| "drugexplorer.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            info!(%path, "Loaded dashboard configuration");
            Self::from_toml_str(&content)?
        } else {
            debug!(%path, "Config file not found, using defaults");
            Self::default()
        };

        if let Ok(base_url) = std::env::var("DRUGEXPLORER_BASE_URL") {
            config.data.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DrugExplorerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.data.base_url()?;

        let t = self.selection.default_edge_threshold;
        if !(EDGE_THRESHOLD_MIN..=EDGE_THRESHOLD_MAX).contains(&t) {
            return Err(DrugExplorerError::Config(format!(
                "default_edge_threshold {} outside [{}, {}]",
                t, EDGE_THRESHOLD_MIN, EDGE_THRESHOLD_MAX
            )));
        }

        if !self.data.drug_predictions_path.contains(DISEASE_ID_PLACEHOLDER) {
            return Err(DrugExplorerError::Config(format!(
                "drug_predictions_path must contain {}",
                DISEASE_ID_PLACEHOLDER
            )));
        }
        Ok(())
    }
}

impl DataConfig {
    /// Parsed base URL, always ending in `/` so relative paths join beneath it.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw)
            .map_err(|e| DrugExplorerError::Config(format!("invalid base_url {}: {}", self.base_url, e)))
    }
}
