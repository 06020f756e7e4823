use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the entry form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    /// How long edits to one nested array item are coalesced before they
    /// reach the form record (ms).
    pub nested_debounce_ms: u64,
}

impl FormConfig {
    pub fn nested_debounce(&self) -> Duration {
        Duration::from_millis(self.nested_debounce_ms)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            nested_debounce_ms: 150,
        }
    }
}
