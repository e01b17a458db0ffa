//! Node-type color assignment.
//!
//! Colors come from a fixed 10-entry palette. `initialize` assigns by catalog
//! position modulo 9, so the last palette entry is never used there and
//! positions 0 and 9 share a color. Lazy assignment in `get` uses the number
//! of entries already cached as the palette slot; once that runs past the
//! palette, `get` wraps around and `try_get` reports `PaletteExhaustion`.

use std::collections::HashMap;
use std::fmt;

use drugexplorer_common::{DrugExplorerError, Result};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color(&'static str);

impl Color {
    pub fn hex(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const PALETTE: [Color; 10] = [
    Color("#4e79a7"),
    Color("#edc949"),
    Color("#e15759"),
    Color("#76b7b2"),
    Color("#f28e2c"),
    Color("#59a14f"),
    Color("#af7aa1"),
    Color("#ff9da7"),
    Color("#9c755f"),
    Color("#bab0ab"),
];

/// Node type -> display color. Grows on lookup, resets only on `initialize`.
///
/// Not synchronized; share it behind a mutex.
#[derive(Debug, Clone, Default)]
pub struct ColorCache {
    colors: HashMap<String, Color>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_types<S: AsRef<str>>(node_types: &[S]) -> Self {
        let mut cache = Self::new();
        cache.initialize(node_types);
        cache
    }

    /// Drop every assignment, then color each type by its position.
    pub fn initialize<S: AsRef<str>>(&mut self, node_types: &[S]) {
        self.colors.clear();
        let modulus = PALETTE.len() - 1;
        for (idx, node_type) in node_types.iter().enumerate() {
            self.colors
                .insert(node_type.as_ref().to_string(), PALETTE[idx % modulus]);
        }
        debug!(count = node_types.len(), "Node type colors initialized");
    }

    pub fn lookup(&self, node_type: &str) -> Option<Color> {
        self.colors.get(node_type).copied()
    }

    /// Cached color, or the next palette slot for an unseen type.
    /// Fails without caching anything when the palette is used up.
    pub fn try_get(&mut self, node_type: &str) -> Result<Color> {
        if let Some(color) = self.lookup(node_type) {
            return Ok(color);
        }
        let slot = self.colors.len();
        let color = PALETTE
            .get(slot)
            .copied()
            .ok_or(DrugExplorerError::PaletteExhaustion {
                requested: slot,
                palette: PALETTE.len(),
            })?;
        self.colors.insert(node_type.to_string(), color);
        Ok(color)
    }

    /// Like [`ColorCache::try_get`], but wraps around the palette when it is used up.
    pub fn get(&mut self, node_type: &str) -> Color {
        match self.try_get(node_type) {
            Ok(color) => color,
            Err(_) => {
                let slot = self.colors.len();
                let color = PALETTE[slot % PALETTE.len()];
                warn!(node_type, slot, %color, "Color palette exhausted, reusing a color");
                self.colors.insert(node_type.to_string(), color);
                color
            }
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
