//! drugexplorer-state — Selection state, action handling and node-type colors
//! for the DrugExplorer dashboard.
//!
//! Presentation code reads [`SelectionState`] snapshots and [`Color`]s and
//! sends [`Intent`]s to a [`Dashboard`]; it never mutates state directly.

pub mod action;
pub mod color;
pub mod dashboard;
pub mod reconcile;
pub mod reducer;
pub mod state;

pub use action::{Action, ControlValue, Effect, Intent, StateEvent};
pub use color::{Color, ColorCache, PALETTE};
pub use dashboard::Dashboard;
pub use reconcile::{reconcile, SelectionChange};
pub use reducer::{reduce, Transition};
pub use state::{Predictions, RequestId, SelectionState};
