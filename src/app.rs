//! App Core for figdesk.
//!
//! One coordinator instance owns the window, the tab collection, the auth
//! popup registry, persistence, layout and shortcuts. Every operation runs
//! to completion on the coordinating thread; each one guards on the window
//! being alive and degrades to a no-op otherwise.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::bridge::{BridgeEvent, WindowStateEvent};
use crate::managers::popup_manager::PopupManager;
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::managers::shortcut_manager::{
    KeyChord, KeySource, ShortcutAction, ShortcutManager, ShortcutManagerTrait,
};
use crate::managers::surface::{navigation_gate, PopupId, SurfaceEvent, SurfaceOwner, WindowHost};
use crate::managers::tab_manager::TabManager;
use crate::managers::window_manager::LayoutCoordinator;
use crate::platform;
use crate::services::external_opener::{deflect, ExternalOpener};
use crate::services::navigation_policy::{decide_popup, NavigationVerdict, PopupShape, PopupVerdict};
use crate::services::url_classifier::{is_auth_url, is_target_site_url};
use crate::types::errors::TabError;
use crate::types::settings::ShellSettings;
use crate::types::tab::{TabId, TabsState};

/// Requests the coordinator hands back to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Quit,
}

/// What became of a popup request.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupOutcome {
    /// The caller must open a popup window for `url` on the shared partition.
    OpenPopup {
        id: PopupId,
        url: String,
        shape: PopupShape,
    },
    OpenedTab(TabId),
    Deflected,
    Ignored,
}

/// Central coordinator state.
pub struct App<H: WindowHost> {
    settings: ShellSettings,
    window: Option<H>,
    pub tab_manager: TabManager<H::Surface>,
    pub popups: PopupManager,
    pub session: SessionManager,
    pub shortcuts: ShortcutManager,
    layout: LayoutCoordinator,
    opener: Box<dyn ExternalOpener>,
    popup_shape: PopupShape,
    ui_ready: bool,
}

fn log_tab_error(op: &str, err: TabError) {
    match err {
        TabError::NotFound(id) => debug!(op, tab = %id, "ignoring stale tab id"),
        other => warn!(op, error = %other, "tab operation failed"),
    }
}

impl<H: WindowHost> App<H> {
    /// Creates the coordinator without a window.
    pub fn new(settings: ShellSettings, session: SessionManager, opener: Box<dyn ExternalOpener>) -> Self {
        let layout = LayoutCoordinator::new(settings.titlebar_height);
        let popup_shape = PopupShape::from_settings(&settings.popup);
        Self {
            settings,
            window: None,
            tab_manager: TabManager::new(),
            popups: PopupManager::new(),
            session,
            shortcuts: ShortcutManager::new(),
            layout,
            opener,
            popup_shape,
            ui_ready: false,
        }
    }

    /// Creates the coordinator persisting to the per-user snapshot path.
    pub fn with_default_paths(settings: ShellSettings, opener: Box<dyn ExternalOpener>) -> Self {
        let debounce = Duration::from_millis(settings.persist_debounce_ms);
        let session = SessionManager::new(platform::get_snapshot_path(), debounce);
        Self::new(settings, session, opener)
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// Installs the window once the host is ready.
    pub fn attach_window(&mut self, host: H) {
        let size = host.inner_size();
        let state = host.window_state();
        self.layout.on_geometry_event(size, state);
        self.window = Some(host);
    }

    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    pub fn window(&self) -> Option<&H> {
        self.window.as_ref()
    }

    pub fn window_mut(&mut self) -> Option<&mut H> {
        self.window.as_mut()
    }

    pub fn is_ui_ready(&self) -> bool {
        self.ui_ready
    }

    /// Restores the previous tab set, or opens one default tab.
    pub fn startup(&mut self) {
        let Some(host) = self.window.as_mut() else {
            return;
        };
        let bounds = self.layout.content_bounds();

        if let Some(plan) = self.session.restore() {
            info!(tabs = plan.tabs.len(), "restoring tabs");
            for tab in &plan.tabs {
                match self
                    .tab_manager
                    .create_tab(host, Some(&tab.url), false, Some(tab.id.clone()), bounds)
                {
                    Ok(id) => {
                        if let Err(e) = self.tab_manager.set_title(&id, &tab.title) {
                            log_tab_error("restore-title", e);
                        }
                    }
                    Err(e) => log_tab_error("restore", e),
                }
            }
            if let Err(e) = self.tab_manager.activate_tab(&plan.active_tab_id, bounds) {
                log_tab_error("restore-activate", e);
            }
        }

        if self.tab_manager.tab_count() == 0 {
            if let Err(e) = self.tab_manager.create_tab(host, None, true, None, bounds) {
                log_tab_error("create-default", e);
            }
        }
        self.state_changed();
    }

    /// Pushes the tab snapshot and schedules a debounced save.
    fn state_changed(&mut self) {
        let state = self.tab_manager.tabs_state();
        if let Some(host) = self.window.as_mut() {
            host.emit(&BridgeEvent::TabStateChanged(state));
        }
        self.session.schedule(self.tab_manager.persisted_snapshot());
    }

    fn broadcast_window_state(&mut self) {
        let layout = self.layout.layout();
        let ui_ready = self.ui_ready;
        if let Some(host) = self.window.as_mut() {
            let is_maximized = host.window_state().is_maximized;
            host.emit(&BridgeEvent::WindowStateChanged(WindowStateEvent { is_maximized }));
            if ui_ready {
                host.emit(&BridgeEvent::Layout(layout));
            }
        }
    }

    pub fn tabs_state(&self) -> TabsState {
        self.tab_manager.tabs_state()
    }

    /// Opens a tab at `url` (or the default address). Returns `None` when
    /// there is no window.
    pub fn create_tab(&mut self, url: Option<&str>, activate: bool) -> Option<TabId> {
        let host = self.window.as_mut()?;
        let bounds = self.layout.content_bounds();
        let created = self.tab_manager.create_tab(host, url, activate, None, bounds);
        let id = match created {
            Ok(id) => Some(id),
            Err(e) => {
                log_tab_error("create", e);
                None
            }
        };
        self.state_changed();
        id
    }

    pub fn close_tab(&mut self, id: &TabId) -> TabsState {
        if let Some(host) = self.window.as_mut() {
            let bounds = self.layout.content_bounds();
            match self.tab_manager.close_tab(host, id, bounds) {
                Ok(()) => self.state_changed(),
                Err(e) => log_tab_error("close", e),
            }
        }
        self.tabs_state()
    }

    pub fn close_active_tab(&mut self) -> TabsState {
        match self.tab_manager.active_tab_id().cloned() {
            Some(id) => self.close_tab(&id),
            None => self.tabs_state(),
        }
    }

    pub fn activate_tab(&mut self, id: &TabId) -> TabsState {
        if self.window.is_some() {
            let bounds = self.layout.content_bounds();
            match self.tab_manager.activate_tab(id, bounds) {
                Ok(true) => self.state_changed(),
                Ok(false) => {}
                Err(e) => log_tab_error("activate", e),
            }
        }
        self.tabs_state()
    }

    pub fn cycle_tabs(&mut self, reverse: bool) -> TabsState {
        if self.window.is_some() {
            let bounds = self.layout.content_bounds();
            match self.tab_manager.cycle_tabs(reverse, bounds) {
                Ok(true) => self.state_changed(),
                Ok(false) => {}
                Err(e) => log_tab_error("cycle", e),
            }
        }
        self.tabs_state()
    }

    /// Loads `url` in a tab if the policy keeps it in the app, otherwise
    /// deflects it and leaves the tab untouched.
    pub fn navigate_tab(&mut self, id: &TabId, url: &str) -> TabsState {
        if self.window.is_none() || !self.tab_manager.contains(id) {
            return self.tabs_state();
        }
        match navigation_gate(&SurfaceOwner::Tab(id.clone()), url) {
            NavigationVerdict::Allow => {
                if let Err(e) = self.tab_manager.navigate_tab(id, url) {
                    log_tab_error("navigate", e);
                }
            }
            NavigationVerdict::Deflect(target) => self.open_external(&target),
        }
        self.tabs_state()
    }

    pub fn go_back(&mut self, id: &TabId) {
        if self.window.is_some() {
            if let Err(e) = self.tab_manager.go_back(id) {
                log_tab_error("back", e);
            }
        }
    }

    pub fn go_forward(&mut self, id: &TabId) {
        if self.window.is_some() {
            if let Err(e) = self.tab_manager.go_forward(id) {
                log_tab_error("forward", e);
            }
        }
    }

    pub fn reload(&mut self, id: &TabId) {
        if self.window.is_some() {
            if let Err(e) = self.tab_manager.reload(id) {
                log_tab_error("reload", e);
            }
        }
    }

    /// Runs the navigation policy for a navigation attempted inside the
    /// surface of `owner`. Returns whether it may proceed; a refused
    /// destination is deflected to the system browser.
    pub fn handle_navigation_attempt(&mut self, owner: &SurfaceOwner, url: &str) -> bool {
        match navigation_gate(owner, url) {
            NavigationVerdict::Allow => true,
            NavigationVerdict::Deflect(target) => {
                self.open_external(&target);
                false
            }
        }
    }

    /// Applies an event reported by a tab or popup surface.
    ///
    /// Returns a popup whose sign-in finished and whose window should be
    /// dismissed: a popup that lands back on a non-auth page of the target
    /// site is done, and its opener tab is reloaded to pick up the session.
    pub fn handle_surface_event(&mut self, owner: &SurfaceOwner, event: SurfaceEvent) -> Option<PopupId> {
        self.window.as_ref()?;
        match owner {
            SurfaceOwner::Tab(id) => {
                match self.tab_manager.apply_surface_event(id, &event) {
                    Ok(true) => self.state_changed(),
                    Ok(false) => {}
                    Err(e) => log_tab_error("surface-event", e),
                }
                None
            }
            SurfaceOwner::Popup(id) => match event {
                SurfaceEvent::LoadFinished { url } => {
                    if !self.popups.navigated(*id, &url) {
                        return None;
                    }
                    if is_target_site_url(&url) && !is_auth_url(&url) {
                        self.finish_popup(*id);
                        return Some(*id);
                    }
                    None
                }
                SurfaceEvent::TitleChanged { title } => {
                    self.popups.set_title(*id, &title);
                    None
                }
                SurfaceEvent::NavigationStarted { .. } | SurfaceEvent::LoadStarted => None,
            },
        }
    }

    fn finish_popup(&mut self, id: PopupId) {
        let opener = self.popups.get(id).map(|p| p.opener.clone());
        self.popups.close(id);
        if let Some(SurfaceOwner::Tab(tab_id)) = opener {
            info!(popup = %id, tab = %tab_id, "sign-in finished, reloading opener");
            self.reload(&tab_id);
        }
    }

    /// Current URL of the surface that issued a request.
    pub fn referrer_of(&self, owner: &SurfaceOwner) -> Option<String> {
        match owner {
            SurfaceOwner::Tab(id) => self.tab_manager.get_tab(id).map(|t| t.url.clone()),
            SurfaceOwner::Popup(id) => self.popups.url(*id).map(str::to_string),
        }
    }

    /// Decides a popup requested by the page in `owner` and performs the
    /// tab or deflection side of the verdict.
    pub fn handle_popup_request(&mut self, owner: &SurfaceOwner, url: &str) -> PopupOutcome {
        if self.window.is_none() {
            return PopupOutcome::Ignored;
        }
        let referrer = self.referrer_of(owner);
        match decide_popup(url, referrer.as_deref(), self.popup_shape) {
            PopupVerdict::AllowAuthPopup(shape) => {
                let id = self.popups.open(url, owner.clone());
                PopupOutcome::OpenPopup {
                    id,
                    url: url.to_string(),
                    shape,
                }
            }
            PopupVerdict::RedirectToTab(target) => match self.create_tab(Some(&target), true) {
                Some(id) => PopupOutcome::OpenedTab(id),
                None => PopupOutcome::Ignored,
            },
            PopupVerdict::Deflect(target) => {
                self.open_external(&target);
                PopupOutcome::Deflected
            }
        }
    }

    /// Forgets a popup whose window was closed.
    pub fn popup_closed(&mut self, id: PopupId) {
        self.popups.close(id);
    }

    /// Hands `url` to the system; failures are dropped.
    pub fn open_external(&mut self, url: &str) {
        deflect(self.opener.as_ref(), url);
    }

    /// Routes a key press through the shortcut table.
    pub fn handle_key_down(&mut self, source: KeySource, chord: KeyChord, repeat: bool) -> Option<ShellCommand> {
        let action = self.shortcuts.on_key_down(source, chord, repeat)?;
        debug!(?action, ?source, "shortcut");
        match action {
            ShortcutAction::NewTab => {
                self.create_tab(None, true);
            }
            ShortcutAction::CloseTab => {
                self.close_active_tab();
            }
            ShortcutAction::NextTab => {
                self.cycle_tabs(false);
            }
            ShortcutAction::PreviousTab => {
                self.cycle_tabs(true);
            }
            ShortcutAction::Quit => return Some(ShellCommand::Quit),
        }
        None
    }

    pub fn handle_key_up(&mut self, key: &str) {
        self.shortcuts.on_key_up(key);
    }

    /// Reacts to resize, maximize, fullscreen and restore events.
    pub fn on_geometry_changed(&mut self) {
        let Some(host) = self.window.as_ref() else {
            return;
        };
        let bounds = self
            .layout
            .on_geometry_event(host.inner_size(), host.window_state());
        self.tab_manager.layout_active(bounds);
        let state = self.tab_manager.tabs_state();
        if let Some(host) = self.window.as_mut() {
            host.emit(&BridgeEvent::TabStateChanged(state));
        }
        self.broadcast_window_state();
    }

    /// Re-measures after the host settled a geometry change.
    pub fn confirm_layout(&mut self) {
        let Some(host) = self.window.as_ref() else {
            return;
        };
        if let Some(bounds) = self.layout.confirm(host.inner_size()) {
            debug!(?bounds, "layout moved after settle");
            self.tab_manager.layout_active(bounds);
        }
    }

    pub fn is_layout_confirmation_pending(&self) -> bool {
        self.layout.is_confirmation_pending()
    }

    pub fn minimize(&mut self) {
        if let Some(host) = self.window.as_mut() {
            host.minimize();
        }
    }

    pub fn toggle_maximize(&mut self) {
        if let Some(host) = self.window.as_mut() {
            let maximized = host.window_state().is_maximized;
            host.set_maximized(!maximized);
        }
    }

    pub fn close_window(&mut self) {
        if let Some(host) = self.window.as_mut() {
            host.close();
        }
    }

    pub fn start_drag(&mut self) {
        if let Some(host) = self.window.as_mut() {
            host.start_drag();
        }
    }

    /// The presentation layer finished loading: push everything it needs.
    pub fn ui_ready(&mut self) {
        if self.window.is_none() {
            return;
        }
        self.ui_ready = true;
        let state = self.tab_manager.tabs_state();
        if let Some(host) = self.window.as_mut() {
            host.emit(&BridgeEvent::TabStateChanged(state));
        }
        self.broadcast_window_state();
        self.tab_manager.focus_active();
    }

    /// Writes a due snapshot. Returns whether a write happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.session.poll(now)
    }

    pub fn next_wakeup(&self) -> Option<Instant> {
        self.session.next_deadline()
    }

    pub fn flush_persistence(&mut self) -> bool {
        self.session.flush()
    }

    /// Flushes persistence and tears the window down. Later operations are
    /// no-ops.
    pub fn shutdown(&mut self) {
        self.session.flush();
        self.popups.clear();
        self.tab_manager.clear();
        self.window = None;
        self.ui_ready = false;
        info!("shell shut down");
    }
}
