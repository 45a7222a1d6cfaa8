/// Project Tabs - keeps Bedrock/Springfield tabs in sync across a docs page
/// Built with Rust + WASM

pub mod browser;
pub mod config;
pub mod discovery;
pub mod dom;
pub mod lifecycle;
pub mod project;
pub mod storage;
pub mod sync;

#[cfg(test)]
mod mock;

pub use browser::ProjectTabs;
pub use config::SyncConfig;
pub use project::{Project, classify_label};

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Start syncing project tabs on the current page
///
/// `config` is an optional plain object overriding `SyncConfig` fields,
/// e.g. `startProjectTabs({ storageKey: "docs-project" })`. The sync runs
/// for the rest of the page view; the returned handle is only needed to
/// `stop` it.
#[wasm_bindgen(js_name = startProjectTabs)]
pub fn start_project_tabs(config: JsValue) -> Result<ProjectTabs, JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        SyncConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    ProjectTabs::start(config)
}

// Re-export classification for JavaScript access
#[wasm_bindgen(js_name = classifyLabel)]
pub fn classify_label_js(text: &str) -> Option<String> {
    classify_label(text).map(|project| project.as_str().to_string())
}
