//! Turns the full selection reported by a multi-select control into one toggle.
//!
//! The control reports every checked item, most recently checked last.
//! Exactly one item may differ from the previous selection; anything else
//! is rejected with `ReconciliationAmbiguity`.

use std::collections::HashSet;

use drugexplorer_common::{DrugExplorerError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub drug_id: String,
    pub is_add: bool,
}

pub fn reconcile(previous: &[String], new_selection: &[String]) -> Result<SelectionChange> {
    let prev: HashSet<&str> = previous.iter().map(String::as_str).collect();
    let next: HashSet<&str> = new_selection.iter().map(String::as_str).collect();
    let added = next.difference(&prev).count();
    let removed = prev.difference(&next).count();

    if new_selection.len() > previous.len() {
        if let Some(last) = new_selection.last() {
            if added == 1 && removed == 0 && !prev.contains(last.as_str()) {
                return Ok(SelectionChange { drug_id: last.clone(), is_add: true });
            }
        }
    } else if added == 0 && removed == 1 {
        if let Some(gone) = previous.iter().find(|id| !next.contains(id.as_str())) {
            return Ok(SelectionChange { drug_id: gone.clone(), is_add: false });
        }
    }

    Err(DrugExplorerError::ReconciliationAmbiguity { added, removed })
}
