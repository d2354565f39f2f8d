//! Popup and navigation policy.
//!
//! Decides, for every popup request and top-level navigation, whether the
//! destination stays in the app, becomes a new tab, or is handed to the
//! system browser. Decisions are pure; acting on them is the caller's job.

use tracing::debug;

use crate::services::url_classifier::{
    is_auth_url, is_placeholder_url, is_target_site_url,
};
use crate::types::settings::PopupSettings;

const POPUP_MIN_WIDTH: f64 = 400.0;
const POPUP_MIN_HEIGHT: f64 = 500.0;
const POPUP_MAX_WIDTH: f64 = 1000.0;
const POPUP_MAX_HEIGHT: f64 = 900.0;

/// Window shape of a transient authentication popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupShape {
    pub width: f64,
    pub height: f64,
}

impl PopupShape {
    pub fn from_settings(settings: &PopupSettings) -> Self {
        Self {
            width: settings.width.clamp(POPUP_MIN_WIDTH, POPUP_MAX_WIDTH),
            height: settings.height.clamp(POPUP_MIN_HEIGHT, POPUP_MAX_HEIGHT),
        }
    }
}

impl Default for PopupShape {
    fn default() -> Self {
        Self::from_settings(&PopupSettings::default())
    }
}

/// Outcome of a popup request.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupVerdict {
    /// Open a short-lived popup on the shared partition.
    AllowAuthPopup(PopupShape),
    /// Suppress the popup and open the URL as a new, active tab.
    RedirectToTab(String),
    /// Suppress the popup and open the URL in the system browser.
    Deflect(String),
}

/// Outcome of a top-level navigation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationVerdict {
    Allow,
    /// Cancel the navigation and open the URL in the system browser.
    Deflect(String),
}

impl NavigationVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, NavigationVerdict::Allow)
    }
}

/// True when `url` continues an identity flow that started at `referrer`.
pub fn is_auth_continuation(url: &str, referrer: Option<&str>) -> bool {
    referrer.is_some_and(is_auth_url) && is_target_site_url(url)
}

/// Decides what to do with a popup for `url` requested by a page at `referrer`.
pub fn decide_popup(url: &str, referrer: Option<&str>, shape: PopupShape) -> PopupVerdict {
    let verdict = if is_auth_url(url)
        || is_placeholder_url(Some(url))
        || is_auth_continuation(url, referrer)
    {
        PopupVerdict::AllowAuthPopup(shape)
    } else if is_target_site_url(url) {
        PopupVerdict::RedirectToTab(url.to_string())
    } else {
        PopupVerdict::Deflect(url.to_string())
    };
    debug!(url, ?referrer, ?verdict, "popup decision");
    verdict
}

/// Decides whether an ordinary tab may navigate to `url` in place.
pub fn decide_navigation(url: &str) -> NavigationVerdict {
    let verdict = if is_target_site_url(url) || is_auth_url(url) {
        NavigationVerdict::Allow
    } else {
        NavigationVerdict::Deflect(url.to_string())
    };
    debug!(url, ?verdict, "navigation decision");
    verdict
}

/// Decides whether an auth popup may navigate to `url` in place.
///
/// Popups additionally accept the blank placeholder their opener starts
/// them with.
pub fn decide_popup_navigation(url: &str) -> NavigationVerdict {
    if is_placeholder_url(Some(url)) {
        return NavigationVerdict::Allow;
    }
    decide_navigation(url)
}
