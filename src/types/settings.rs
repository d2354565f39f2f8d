use serde::{Deserialize, Serialize};

/// Top-level shell settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellSettings {
    pub window: WindowSettings,
    pub popup: PopupSettings,
    pub titlebar_height: f64,
    pub persist_debounce_ms: u64,
    pub log_filter: String,
    pub devtools: bool,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            popup: PopupSettings::default(),
            titlebar_height: 40.0,
            persist_debounce_ms: 500,
            log_filter: "info".to_string(),
            devtools: false,
        }
    }
}

/// Initial and minimum size of the main window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
            min_width: 800.0,
            min_height: 500.0,
        }
    }
}

/// Size of transient authentication popups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PopupSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 700.0,
        }
    }
}
