//! Debounced propagation of nested array item edits.
//!
//! Typing into an item of a nested list replaces the whole item object.
//! Rather than write each keystroke into the form record, the latest item
//! value is held here per `(field key, item index)` and handed over once
//! the item has been quiet for the debounce window. The owner decides when
//! to poll; nothing here spawns tasks or owns a timer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// A buffered edit ready to be applied to the form record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedEdit {
    pub key: String,
    pub index: usize,
    /// The full replacement item.
    pub value: Value,
}

/// An array item removal waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalRequest {
    pub key: String,
    pub index: usize,
}

#[derive(Debug, Clone)]
struct Pending {
    value: Value,
    due: Instant,
}

/// Coalesces edits to nested array items until they settle.
#[derive(Debug, Clone)]
pub struct NestedEditBuffer {
    window: Duration,
    pending: BTreeMap<(String, usize), Pending>,
}

impl NestedEditBuffer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records the latest value of an item and restarts its window.
    ///
    /// Two edits inside one window coalesce; only the second is applied.
    pub fn record(&mut self, key: impl Into<String>, index: usize, value: Value) {
        let due = Instant::now() + self.window;
        self.pending.insert((key.into(), index), Pending { value, due });
    }

    /// The buffered value for an item, if an edit is still pending.
    pub fn pending_value(&self, key: &str, index: usize) -> Option<&Value> {
        self.pending
            .get(&(key.to_string(), index))
            .map(|p| &p.value)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The earliest moment any pending edit becomes due.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.due).min()
    }

    /// Removes and returns every edit whose window has elapsed by `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<NestedEdit> {
        let due: Vec<_> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(k, _)| k.clone())
            .collect();
        due.into_iter()
            .filter_map(|k| self.take(k))
            .collect()
    }

    /// Removes and returns every pending edit regardless of its window.
    pub fn flush(&mut self) -> Vec<NestedEdit> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|((key, index), p)| NestedEdit {
                key,
                index,
                value: p.value,
            })
            .collect()
    }

    /// Removes and returns the pending edits of one field.
    pub fn flush_key(&mut self, key: &str) -> Vec<NestedEdit> {
        let keys: Vec<_> = self
            .pending
            .keys()
            .filter(|(k, _)| k == key)
            .cloned()
            .collect();
        keys.into_iter().filter_map(|k| self.take(k)).collect()
    }

    fn take(&mut self, slot: (String, usize)) -> Option<NestedEdit> {
        let pending = self.pending.remove(&slot)?;
        Some(NestedEdit {
            key: slot.0,
            index: slot.1,
            value: pending.value,
        })
    }
}

impl Default for NestedEditBuffer {
    fn default() -> Self {
        Self::new(crate::FormConfig::default().nested_debounce())
    }
}
