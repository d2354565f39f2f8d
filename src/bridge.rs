//! Shell bridge between the coordinator and the presentation layer.
//!
//! Messages arrive as JSON objects tagged by `cmd`. The title strip may send
//! any command. Content surfaces (the hosted site) may only forward key
//! events for the tab-level shortcuts, and only from the visible tab or a
//! popup; quitting needs the native window.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::app::App;
use crate::managers::shortcut_manager::{KeyChord, KeySource};
use crate::managers::surface::{SurfaceOwner, WindowHost};
use crate::types::layout::WindowLayout;
use crate::types::tab::{TabId, TabsState};

/// Commands accepted from the presentation layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BridgeCommand {
    UiReady,
    GetTabs,
    CreateTab {
        #[serde(default)]
        url: Option<String>,
    },
    CloseTab {
        id: TabId,
    },
    ActivateTab {
        id: TabId,
    },
    NavigateTab {
        id: TabId,
        url: String,
    },
    GoBack {
        id: TabId,
    },
    GoForward {
        id: TabId,
    },
    Reload {
        id: TabId,
    },
    Minimize,
    ToggleMaximize,
    Close,
    StartDrag,
    KeyDown {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        repeat: bool,
    },
    KeyUp {
        key: String,
    },
}

impl BridgeCommand {
    fn is_key_event(&self) -> bool {
        matches!(self, BridgeCommand::KeyDown { .. } | BridgeCommand::KeyUp { .. })
    }
}

/// Sender of a bridge message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOrigin {
    /// The title strip rendered by the presentation layer.
    Chrome,
    /// A tab or auth popup showing hosted content.
    Content(SurfaceOwner),
}

impl MessageOrigin {
    pub fn permits(&self, cmd: &BridgeCommand) -> bool {
        match self {
            MessageOrigin::Chrome => true,
            MessageOrigin::Content(_) => cmd.is_key_event(),
        }
    }

    fn key_source(&self) -> KeySource {
        match self {
            MessageOrigin::Chrome => KeySource::Chrome,
            MessageOrigin::Content(_) => KeySource::Content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStateEvent {
    pub is_maximized: bool,
}

/// Events pushed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum BridgeEvent {
    TabStateChanged(TabsState),
    WindowStateChanged(WindowStateEvent),
    Layout(WindowLayout),
}

impl BridgeEvent {
    /// Script that delivers this event to the title strip's listener.
    pub fn to_script(&self) -> Option<String> {
        let json = serde_json::to_string(self).ok()?;
        Some(format!(
            "window.__figdesk&&window.__figdesk.dispatch({})",
            json
        ))
    }
}

/// What the caller should do after a message was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeReply {
    None,
    Tabs(TabsState),
}

/// Background tabs are hidden and cannot hold keyboard focus.
fn origin_has_focus<H: WindowHost>(app: &App<H>, origin: &MessageOrigin) -> bool {
    match origin {
        MessageOrigin::Content(SurfaceOwner::Tab(id)) => app.tab_manager.active_tab_id() == Some(id),
        _ => true,
    }
}

/// Parses a raw message body.
pub fn parse_command(body: &str) -> Option<BridgeCommand> {
    match serde_json::from_str(body) {
        Ok(cmd) => Some(cmd),
        Err(e) => {
            debug!(error = %e, "unrecognised bridge message");
            None
        }
    }
}

/// Parses and dispatches a raw message from `origin`.
pub fn handle_message<H: WindowHost>(app: &mut App<H>, origin: &MessageOrigin, body: &str) -> BridgeReply {
    match parse_command(body) {
        Some(cmd) => dispatch(app, origin, cmd),
        None => BridgeReply::None,
    }
}

/// Runs one bridge command against the coordinator.
pub fn dispatch<H: WindowHost>(app: &mut App<H>, origin: &MessageOrigin, cmd: BridgeCommand) -> BridgeReply {
    if !origin.permits(&cmd) {
        warn!(?origin, ?cmd, "bridge command rejected for origin");
        return BridgeReply::None;
    }

    match cmd {
        BridgeCommand::UiReady => {
            app.ui_ready();
            BridgeReply::None
        }
        BridgeCommand::GetTabs => BridgeReply::Tabs(app.tabs_state()),
        BridgeCommand::CreateTab { url } => {
            app.create_tab(url.as_deref(), true);
            BridgeReply::None
        }
        BridgeCommand::CloseTab { id } => {
            app.close_tab(&id);
            BridgeReply::None
        }
        BridgeCommand::ActivateTab { id } => {
            app.activate_tab(&id);
            BridgeReply::None
        }
        BridgeCommand::NavigateTab { id, url } => {
            app.navigate_tab(&id, &url);
            BridgeReply::None
        }
        BridgeCommand::GoBack { id } => {
            app.go_back(&id);
            BridgeReply::None
        }
        BridgeCommand::GoForward { id } => {
            app.go_forward(&id);
            BridgeReply::None
        }
        BridgeCommand::Reload { id } => {
            app.reload(&id);
            BridgeReply::None
        }
        BridgeCommand::Minimize => {
            app.minimize();
            BridgeReply::None
        }
        BridgeCommand::ToggleMaximize => {
            app.toggle_maximize();
            BridgeReply::None
        }
        BridgeCommand::Close => {
            app.close_window();
            BridgeReply::None
        }
        BridgeCommand::StartDrag => {
            app.start_drag();
            BridgeReply::None
        }
        BridgeCommand::KeyDown {
            key,
            ctrl,
            meta,
            shift,
            repeat,
        } => {
            if !origin_has_focus(app, origin) {
                debug!(?origin, "key event from a hidden tab ignored");
                return BridgeReply::None;
            }
            let chord = KeyChord::from_flags(&key, ctrl, meta, shift);
            // Shell commands are window-only and never resolve here.
            let _ = app.handle_key_down(origin.key_source(), chord, repeat);
            BridgeReply::None
        }
        BridgeCommand::KeyUp { key } => {
            app.handle_key_up(&key);
            BridgeReply::None
        }
    }
}
