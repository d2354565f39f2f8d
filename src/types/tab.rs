use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder title shown until the hosted page reports one.
pub const DEFAULT_TAB_TITLE: &str = "Figma";

const TAB_ID_PREFIX: &str = "tab-";

/// Stable identifier of a tab, issued as `tab-<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the id for the `n`-th issued tab.
    pub fn from_counter(n: u64) -> Self {
        Self(format!("{}{}", TAB_ID_PREFIX, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing number of a `tab-<n>` id, if it has one.
    pub fn numeric_suffix(&self) -> Option<u64> {
        self.0.strip_prefix(TAB_ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Direction of a history traversal the tab asked its surface for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Back,
    Forward,
}

/// Committed navigation entries of one tab.
///
/// Surfaces do not report their history position, so it is rebuilt from
/// committed URLs plus the traversals the tab itself requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavHistory {
    entries: Vec<String>,
    cursor: usize,
    pending: Option<Traversal>,
}

impl NavHistory {
    pub fn new(initial_url: &str) -> Self {
        Self {
            entries: vec![initial_url.to_string()],
            cursor: 0,
            pending: None,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn request(&mut self, traversal: Traversal) {
        self.pending = Some(traversal);
    }

    /// Records a committed URL.
    pub fn commit(&mut self, url: &str) {
        match self.pending.take() {
            Some(Traversal::Back) if self.can_go_back() => {
                self.cursor -= 1;
                self.entries[self.cursor] = url.to_string();
            }
            Some(Traversal::Forward) if self.can_go_forward() => {
                self.cursor += 1;
                self.entries[self.cursor] = url.to_string();
            }
            _ => {
                if self.entries.get(self.cursor).map(String::as_str) == Some(url) {
                    return;
                }
                self.entries.truncate(self.cursor + 1);
                self.entries.push(url.to_string());
                self.cursor = self.entries.len() - 1;
            }
        }
    }
}

/// One isolated navigable content container as seen by the tab manager.
#[derive(Debug, Clone)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub is_loading: bool,
    pub history: NavHistory,
}

impl Tab {
    pub fn new(id: TabId, url: &str) -> Self {
        Self {
            id,
            url: url.to_string(),
            title: DEFAULT_TAB_TITLE.to_string(),
            is_loading: false,
            history: NavHistory::new(url),
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }
}

/// A tab as pushed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabView {
    pub id: TabId,
    pub title: String,
    pub url: String,
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_active: bool,
}

/// Full tab snapshot answered to the tab-list query and pushed on changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsState {
    pub active_tab_id: Option<TabId>,
    pub tabs: Vec<TabView>,
}
