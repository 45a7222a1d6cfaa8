/// Runtime configuration for the tab synchronizer
use serde::Deserialize;
use std::time::Duration;

/// Selectors, keys and timing used by the browser session
///
/// Every field has a default matching the Material theme markup, so an
/// empty object (or no object at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// localStorage key holding the preferred project
    pub storage_key: String,
    /// Selector matching every tab label on the page
    pub label_selector: String,
    /// Class of a tab group container
    pub tab_set_class: String,
    /// Selector of the element watched for instant navigation
    pub content_selector: String,
    /// Attribute written onto matched labels for styling
    pub project_attribute: String,
    /// Delay before re-initializing after a navigation event
    pub reinit_delay_ms: u32,
}

impl SyncConfig {
    pub fn reinit_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.reinit_delay_ms))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            storage_key: "project-tab-preference".to_string(),
            label_selector: ".tabbed-labels label".to_string(),
            tab_set_class: "tabbed-set".to_string(),
            content_selector: ".md-content".to_string(),
            project_attribute: "data-project".to_string(),
            reinit_delay_ms: 50,
        }
    }
}
