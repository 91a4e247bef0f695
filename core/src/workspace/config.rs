use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

/// Settings the index reads on every analysis. Deserialized from the
/// editor's `mlang` settings section, so unknown or missing keys fall back
/// to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexConfig {
    /// Quiet period after the last edit before a document is re-analyzed
    pub debounce_ms: u64,
    /// Extension (without the dot) of files picked up by discovery
    pub file_extension: String,
    pub max_number_of_problems: usize,
    pub report_unresolved_references: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            file_extension: "m".to_string(),
            max_number_of_problems: 1000,
            report_unresolved_references: false,
        }
    }
}

impl IndexConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        let wanted = self.file_extension.trim_start_matches('.');
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
    }
}
