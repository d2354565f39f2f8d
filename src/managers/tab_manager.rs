//! Tab Manager for figdesk.
//!
//! Owns the ordered tab collection, the surface bound to each tab, and the
//! active-tab pointer. Surface work (create, show, hide, focus) goes through
//! the `WindowHost` passed into each operation; broadcasting and persistence
//! are left to the coordinator.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::managers::surface::{NavigableSurface, SurfaceEvent, WindowHost};
use crate::services::url_classifier::{is_secure_url, DEFAULT_URL};
use crate::types::errors::{SurfaceError, TabError};
use crate::types::layout::Bounds;
use crate::types::session::{PersistedSnapshot, PersistedTab};
use crate::types::tab::{Tab, TabId, TabView, TabsState, Traversal};

struct TabEntry<S> {
    tab: Tab,
    surface: S,
}

/// Tab collection with one surface per tab.
pub struct TabManager<S> {
    entries: HashMap<TabId, TabEntry<S>>,
    tab_order: Vec<TabId>,
    active_tab_id: Option<TabId>,
    next_id: u64,
}

fn log_surface_result(tab_id: &TabId, op: &str, result: Result<(), SurfaceError>) {
    if let Err(e) = result {
        warn!(tab = %tab_id, op, error = %e, "surface operation failed");
    }
}

/// URL a new tab should open: `url` if it is secure, else the default.
pub fn resolve_tab_url(url: Option<&str>) -> &str {
    match url {
        Some(u) if is_secure_url(u) => u,
        _ => DEFAULT_URL,
    }
}

impl<S: NavigableSurface> TabManager<S> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            tab_order: Vec::new(),
            active_tab_id: None,
            next_id: 0,
        }
    }

    /// Issues the next `tab-<n>` id. Once the counter is exhausted (a
    /// restored id carried the largest suffix) the lowest unused number is
    /// taken instead.
    fn issue_id(&mut self) -> TabId {
        if let Some(next) = self.next_id.checked_add(1) {
            self.next_id = next;
            let id = TabId::from_counter(next);
            if !self.entries.contains_key(&id) {
                return id;
            }
        }
        let mut n: u64 = 1;
        while self.entries.contains_key(&TabId::from_counter(n)) {
            n += 1;
        }
        warn!(tab = n, "tab id counter exhausted, reusing a free number");
        TabId::from_counter(n)
    }

    /// Makes sure freshly issued ids never collide with `id`.
    fn advance_counter_past(&mut self, id: &TabId) {
        if let Some(n) = id.numeric_suffix() {
            self.next_id = self.next_id.max(n);
        }
    }

    fn find_order_index(&self, tab_id: &TabId) -> Option<usize> {
        self.tab_order.iter().position(|id| id == tab_id)
    }

    /// Creates a tab and its surface.
    ///
    /// `id` is only supplied when restoring; an id already in use is
    /// replaced by a fresh one. The tab becomes active when `activate` is
    /// set or when no tab is active yet.
    pub fn create_tab<H>(
        &mut self,
        host: &mut H,
        url: Option<&str>,
        activate: bool,
        id: Option<TabId>,
        bounds: Bounds,
    ) -> Result<TabId, TabError>
    where
        H: WindowHost<Surface = S>,
    {
        let url = resolve_tab_url(url).to_string();
        let id = match id {
            Some(id) if !self.entries.contains_key(&id) => {
                self.advance_counter_past(&id);
                id
            }
            _ => self.issue_id(),
        };

        let mut surface = host.create_surface(&id, &url, bounds)?;
        log_surface_result(&id, "hide", surface.set_visible(false));

        self.entries.insert(
            id.clone(),
            TabEntry {
                tab: Tab::new(id.clone(), &url),
                surface,
            },
        );
        self.tab_order.push(id.clone());
        info!(tab = %id, url = %url, "tab created");

        if activate || self.active_tab_id.is_none() {
            self.activate_tab(&id, bounds)?;
        }
        Ok(id)
    }

    /// Closes a tab, destroying its surface.
    ///
    /// Closing the last tab creates a fresh default tab in the same call.
    /// Closing the active tab activates the tab now at the same index, or
    /// the new last tab when the closed one was rightmost.
    pub fn close_tab<H>(&mut self, host: &mut H, tab_id: &TabId, bounds: Bounds) -> Result<(), TabError>
    where
        H: WindowHost<Surface = S>,
    {
        let order_idx = self
            .find_order_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        // The replacement for the last tab exists before anything is removed.
        if self.tab_order.len() == 1 {
            self.create_tab(host, None, false, None, bounds)?;
        }

        let was_active = self.active_tab_id.as_ref() == Some(tab_id);
        if was_active {
            self.active_tab_id = None;
            if let Some(entry) = self.entries.get_mut(tab_id) {
                log_surface_result(tab_id, "hide", entry.surface.set_visible(false));
            }
        }

        self.entries.remove(tab_id);
        self.tab_order.remove(order_idx);
        info!(tab = %tab_id, "tab closed");

        if was_active {
            let next_idx = order_idx.min(self.tab_order.len() - 1);
            let next_id = self.tab_order[next_idx].clone();
            self.activate_tab(&next_id, bounds)?;
        }
        Ok(())
    }

    /// Shows and focuses `tab_id`, hiding the previously active surface.
    ///
    /// Returns `Ok(false)` when the tab was already active (it is still
    /// re-focused).
    pub fn activate_tab(&mut self, tab_id: &TabId, bounds: Bounds) -> Result<bool, TabError> {
        if !self.entries.contains_key(tab_id) {
            return Err(TabError::NotFound(tab_id.to_string()));
        }

        if self.active_tab_id.as_ref() == Some(tab_id) {
            if let Some(entry) = self.entries.get_mut(tab_id) {
                log_surface_result(tab_id, "focus", entry.surface.focus());
            }
            return Ok(false);
        }

        if let Some(prev_id) = self.active_tab_id.take() {
            if let Some(prev) = self.entries.get_mut(&prev_id) {
                log_surface_result(&prev_id, "hide", prev.surface.set_visible(false));
            }
        }

        if let Some(entry) = self.entries.get_mut(tab_id) {
            log_surface_result(tab_id, "bounds", entry.surface.set_bounds(bounds));
            log_surface_result(tab_id, "show", entry.surface.set_visible(true));
            log_surface_result(tab_id, "focus", entry.surface.focus());
        }
        self.active_tab_id = Some(tab_id.clone());
        debug!(tab = %tab_id, "tab activated");
        Ok(true)
    }

    /// Tab that cycling would activate next, if there are at least two tabs.
    pub fn cycle_target(&self, reverse: bool) -> Option<TabId> {
        let len = self.tab_order.len();
        if len < 2 {
            return None;
        }
        let current = self
            .active_tab_id
            .as_ref()
            .and_then(|id| self.find_order_index(id))
            .unwrap_or(0);
        let next = if reverse {
            (current + len - 1) % len
        } else {
            (current + 1) % len
        };
        Some(self.tab_order[next].clone())
    }

    /// Activates the next (or previous) tab in display order, wrapping around.
    pub fn cycle_tabs(&mut self, reverse: bool, bounds: Bounds) -> Result<bool, TabError> {
        match self.cycle_target(reverse) {
            Some(id) => self.activate_tab(&id, bounds),
            None => Ok(false),
        }
    }

    fn entry_mut(&mut self, tab_id: &TabId) -> Result<&mut TabEntry<S>, TabError> {
        self.entries
            .get_mut(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    /// Loads `url` in the tab's surface. Policy checks are the caller's job.
    pub fn navigate_tab(&mut self, tab_id: &TabId, url: &str) -> Result<(), TabError> {
        let entry = self.entry_mut(tab_id)?;
        entry.surface.load_url(url)?;
        Ok(())
    }

    pub fn go_back(&mut self, tab_id: &TabId) -> Result<(), TabError> {
        let entry = self.entry_mut(tab_id)?;
        if entry.tab.can_go_back() {
            entry.tab.history.request(Traversal::Back);
            entry.surface.go_back()?;
        }
        Ok(())
    }

    pub fn go_forward(&mut self, tab_id: &TabId) -> Result<(), TabError> {
        let entry = self.entry_mut(tab_id)?;
        if entry.tab.can_go_forward() {
            entry.tab.history.request(Traversal::Forward);
            entry.surface.go_forward()?;
        }
        Ok(())
    }

    pub fn reload(&mut self, tab_id: &TabId) -> Result<(), TabError> {
        let entry = self.entry_mut(tab_id)?;
        entry.surface.reload()?;
        Ok(())
    }

    /// Applies a surface event to the tab's state.
    ///
    /// Returns whether anything visible to the presentation layer changed.
    pub fn apply_surface_event(&mut self, tab_id: &TabId, event: &SurfaceEvent) -> Result<bool, TabError> {
        let tab = &mut self.entry_mut(tab_id)?.tab;
        let changed = match event {
            SurfaceEvent::NavigationStarted { .. } | SurfaceEvent::LoadStarted => {
                let changed = !tab.is_loading;
                tab.is_loading = true;
                changed
            }
            SurfaceEvent::LoadFinished { url } => {
                tab.is_loading = false;
                if is_secure_url(url) {
                    tab.url = url.clone();
                    tab.history.commit(url);
                }
                true
            }
            SurfaceEvent::TitleChanged { title } => {
                if title.is_empty() || *title == tab.title {
                    false
                } else {
                    tab.title = title.clone();
                    true
                }
            }
        };
        Ok(changed)
    }

    /// Restores a persisted title on a freshly recreated tab.
    pub fn set_title(&mut self, tab_id: &TabId, title: &str) -> Result<(), TabError> {
        let tab = &mut self.entry_mut(tab_id)?.tab;
        if !title.is_empty() {
            tab.title = title.to_string();
        }
        Ok(())
    }

    /// Re-applies `bounds` to the active surface.
    pub fn layout_active(&mut self, bounds: Bounds) {
        if let Some(id) = self.active_tab_id.clone() {
            if let Some(entry) = self.entries.get_mut(&id) {
                log_surface_result(&id, "bounds", entry.surface.set_bounds(bounds));
            }
        }
    }

    /// Focuses the active surface.
    pub fn focus_active(&mut self) {
        if let Some(id) = self.active_tab_id.clone() {
            if let Some(entry) = self.entries.get_mut(&id) {
                log_surface_result(&id, "focus", entry.surface.focus());
            }
        }
    }

    /// Drops every tab and surface.
    pub fn clear(&mut self) {
        self.active_tab_id = None;
        self.tab_order.clear();
        self.entries.clear();
    }

    pub fn get_tab(&self, tab_id: &TabId) -> Option<&Tab> {
        self.entries.get(tab_id).map(|e| &e.tab)
    }

    pub fn surface(&self, tab_id: &TabId) -> Option<&S> {
        self.entries.get(tab_id).map(|e| &e.surface)
    }

    /// Tabs in display order.
    pub fn get_all_tabs(&self) -> Vec<&Tab> {
        self.tab_order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|e| &e.tab))
            .collect()
    }

    pub fn get_active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.as_ref().and_then(|id| self.get_tab(id))
    }

    pub fn active_tab_id(&self) -> Option<&TabId> {
        self.active_tab_id.as_ref()
    }

    pub fn contains(&self, tab_id: &TabId) -> bool {
        self.entries.contains_key(tab_id)
    }

    pub fn tab_count(&self) -> usize {
        self.tab_order.len()
    }

    pub fn get_tab_order(&self) -> &[TabId] {
        &self.tab_order
    }

    /// Snapshot for the presentation layer.
    pub fn tabs_state(&self) -> TabsState {
        let tabs = self
            .get_all_tabs()
            .into_iter()
            .map(|t| TabView {
                id: t.id.clone(),
                title: t.title.clone(),
                url: t.url.clone(),
                is_loading: t.is_loading,
                can_go_back: t.can_go_back(),
                can_go_forward: t.can_go_forward(),
                is_active: self.active_tab_id.as_ref() == Some(&t.id),
            })
            .collect();
        TabsState {
            active_tab_id: self.active_tab_id.clone(),
            tabs,
        }
    }

    /// Snapshot for disk.
    pub fn persisted_snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            active_tab_id: self.active_tab_id.clone(),
            tabs: self
                .get_all_tabs()
                .into_iter()
                .map(|t| PersistedTab {
                    id: t.id.clone(),
                    url: t.url.clone(),
                    title: t.title.clone(),
                })
                .collect(),
        }
    }
}

impl<S: NavigableSurface> Default for TabManager<S> {
    fn default() -> Self {
        Self::new()
    }
}
