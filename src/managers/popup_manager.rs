//! Registry of transient authentication popups.
//!
//! Popups share the tabs' storage partition but are not tabs: they are not
//! persisted, not shown in the tab strip, and close on their own. The
//! registry only remembers what the policy needs, i.e. each popup's
//! current URL so it can act as the referrer for the popup's own requests.

use std::collections::BTreeMap;

use tracing::info;

use crate::managers::surface::{PopupId, SurfaceOwner};
use crate::services::url_classifier::is_placeholder_url;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthPopup {
    pub id: PopupId,
    pub url: String,
    pub title: String,
    pub opener: SurfaceOwner,
}

#[derive(Debug, Default)]
pub struct PopupManager {
    popups: BTreeMap<PopupId, AuthPopup>,
    next_id: u64,
}

impl PopupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, url: &str, opener: SurfaceOwner) -> PopupId {
        self.next_id += 1;
        let id = PopupId(self.next_id);
        self.popups.insert(
            id,
            AuthPopup {
                id,
                url: url.to_string(),
                title: String::new(),
                opener,
            },
        );
        info!(popup = %id, url, "auth popup opened");
        id
    }

    /// Records a committed navigation. Placeholder loads keep the last
    /// meaningful URL.
    pub fn navigated(&mut self, id: PopupId, url: &str) -> bool {
        match self.popups.get_mut(&id) {
            Some(popup) => {
                if !is_placeholder_url(Some(url)) {
                    popup.url = url.to_string();
                }
                true
            }
            None => false,
        }
    }

    pub fn set_title(&mut self, id: PopupId, title: &str) {
        if let Some(popup) = self.popups.get_mut(&id) {
            popup.title = title.to_string();
        }
    }

    pub fn close(&mut self, id: PopupId) -> bool {
        let closed = self.popups.remove(&id).is_some();
        if closed {
            info!(popup = %id, "auth popup closed");
        }
        closed
    }

    pub fn get(&self, id: PopupId) -> Option<&AuthPopup> {
        self.popups.get(&id)
    }

    pub fn url(&self, id: PopupId) -> Option<&str> {
        self.popups.get(&id).map(|p| p.url.as_str())
    }

    pub fn count(&self) -> usize {
        self.popups.len()
    }

    pub fn ids(&self) -> Vec<PopupId> {
        self.popups.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.popups.clear();
    }
}
