//! # Symbol Registry
//!
//! An insertion-ordered key→text map used to accumulate one-shot code
//! fragments during generation: includes and helper functions, global
//! declarations, and `setup()` lines.
//!
//! Re-inserting under an existing key replaces the fragment but keeps the
//! key's original position, so repeated hardware-setup side effects
//! collapse to a single line and output ordering stays reproducible.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SymbolRegistry {
    order: Vec<String>,
    entries: HashMap<String, String>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the fragment for `key`. A key keeps its
    /// first-insertion position on overwrite.
    pub fn set(&mut self, key: &str, text: impl Into<String>) {
        if !self.entries.contains_key(key) {
            self.order.push(key.to_string());
        }
        self.entries.insert(key.to_string(), text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Fragments in first-insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|key| self.entries[key].as_str())
    }
}
