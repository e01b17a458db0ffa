//! drugexplorer-data — Read access to the static datasets behind the dashboard.
//!
//! Every dataset is a JSON resource served relative to the configured base URL:
//!   node types, edge types, meta-paths, attention records,
//!   the disease catalog, the node-name dictionary and per-disease drug predictions.
//!
//! Reads are one-shot: nothing is cached between calls.

pub mod catalog;
pub mod http;
pub mod source;

pub use catalog::{build_disease_options, build_predictions, filter_attention};
pub use http::HttpDataSource;
pub use source::{DataSource, Resource};
