//! drugexplorer-common — Shared types, errors, and configuration used across all DrugExplorer crates.

pub mod error;
pub mod entities;
pub mod config;
pub mod telemetry;

// Re-export commonly used types
pub use config::{DashboardConfig, DataConfig, SelectionConfig};
pub use entities::{Disease, DrugPrediction, NodeType};
pub use error::{DrugExplorerError, Result};
