use mlang_core::IndexConfig;
use serde::Deserialize;
use tower_lsp::lsp_types::ConfigurationItem;
use tracing::{debug, warn};

use super::state::MlangLanguageServer;

pub(crate) const SECTION: &str = "mlang";

/// The client's `mlang` settings. Every field is optional; missing or
/// non-positive values keep the current setting.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MlangConfigSection {
    #[serde(default)]
    pub(crate) max_number_of_problems: Option<usize>,
    #[serde(default)]
    pub(crate) debounce_ms: Option<u64>,
    #[serde(default)]
    pub(crate) file_extension: Option<String>,
    #[serde(default)]
    pub(crate) report_unresolved_references: Option<bool>,
}

impl MlangConfigSection {
    pub(crate) fn apply(&self, mut config: IndexConfig) -> IndexConfig {
        if let Some(v) = self.max_number_of_problems.filter(|v| *v > 0) {
            config.max_number_of_problems = v;
        }
        if let Some(v) = self.debounce_ms {
            config.debounce_ms = v;
        }
        if let Some(ext) = self.file_extension.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            config.file_extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(v) = self.report_unresolved_references {
            config.report_unresolved_references = v;
        }
        config
    }
}

impl MlangLanguageServer {
    /// Pull the settings section from the client and hand the result to the
    /// index. Returns whether anything changed.
    pub(crate) async fn load_config(&self) -> bool {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(SECTION.to_string()),
        }];

        let values = match self.client.configuration(items).await {
            Ok(values) => values,
            Err(err) => {
                debug!("client did not provide configuration: {err}");
                return false;
            }
        };
        let Some(value) = values.into_iter().next().filter(|v| !v.is_null()) else {
            return false;
        };
        match serde_json::from_value::<MlangConfigSection>(value) {
            Ok(section) => {
                let current = self.index.config();
                let updated = section.apply(current.clone());
                if updated == current {
                    return false;
                }
                debug!(?updated, "configuration changed");
                self.index.set_config(updated);
                true
            }
            Err(err) => {
                warn!("ignoring malformed '{SECTION}' settings: {err}");
                false
            }
        }
    }
}
