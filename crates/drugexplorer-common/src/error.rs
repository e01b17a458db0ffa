use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrugExplorerError {
    #[error("Fetch of {resource} failed: {reason}")]
    FetchFailure { resource: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ambiguous selection change: {added} added, {removed} removed (expected exactly one)")]
    ReconciliationAmbiguity { added: usize, removed: usize },

    #[error("Color palette exhausted: slot {requested} requested, palette has {palette} colors")]
    PaletteExhaustion { requested: usize, palette: usize },

    #[error("Unknown disease: {0}")]
    UnknownDisease(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrugExplorerError {
    pub fn fetch(resource: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailure {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DrugExplorerError>;
