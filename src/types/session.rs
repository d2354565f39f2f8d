use serde::{Deserialize, Serialize};

use super::tab::TabId;

/// The restorable subset of the tab set, as written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub active_tab_id: Option<TabId>,
    #[serde(default)]
    pub tabs: Vec<PersistedTab>,
}

/// A tab's state as stored in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTab {
    pub id: TabId,
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// Tabs to recreate at startup, already filtered and in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct RestorePlan {
    pub tabs: Vec<PersistedTab>,
    pub active_tab_id: TabId,
}
