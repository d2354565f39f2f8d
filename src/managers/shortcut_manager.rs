//! Shortcut Manager for figdesk.
//!
//! Maps primary-modifier key chords to shell actions and makes sure one
//! physical key press fires at most once, even when both the window and a
//! content surface observe it.

use std::time::{Duration, Instant};

use tracing::debug;

/// Shell actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    NewTab,
    CloseTab,
    NextTab,
    PreviousTab,
    Quit,
}

impl ShortcutAction {
    /// Actions honoured only when the native window itself saw the key.
    pub fn is_window_only(&self) -> bool {
        matches!(self, ShortcutAction::Quit)
    }
}

/// How long after a press the same chord from another source counts as the
/// same physical press.
pub const DUPLICATE_WINDOW: Duration = Duration::from_millis(250);

/// Where a key event was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Window,
    Chrome,
    Content,
}

/// A key plus the modifiers that matter for shortcuts.
///
/// `primary` is Cmd on macOS and Ctrl elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub primary: bool,
    pub shift: bool,
}

/// Lower-cases single characters and named keys so `T`, `t` and `Tab`
/// compare as the page and the window report them.
pub fn normalize_key(key: &str) -> String {
    key.to_ascii_lowercase()
}

impl KeyChord {
    pub fn new(key: &str, primary: bool, shift: bool) -> Self {
        Self {
            key: normalize_key(key),
            primary,
            shift,
        }
    }

    /// Builds a chord from raw modifier flags, picking the platform's
    /// primary modifier.
    pub fn from_flags(key: &str, ctrl: bool, meta: bool, shift: bool) -> Self {
        let primary = if cfg!(target_os = "macos") { meta } else { ctrl };
        Self::new(key, primary, shift)
    }

    fn label(&self) -> String {
        let modifier = if cfg!(target_os = "macos") { "Cmd" } else { "Ctrl" };
        let mut label = String::new();
        if self.primary {
            label.push_str(modifier);
            label.push('+');
        }
        if self.shift {
            label.push_str("Shift+");
        }
        let mut chars = self.key.chars();
        if let Some(first) = chars.next() {
            label.extend(first.to_uppercase());
            label.push_str(chars.as_str());
        }
        label
    }
}

/// Trait defining shortcut lookup and dispatch.
pub trait ShortcutManagerTrait {
    fn resolve(&self, chord: &KeyChord) -> Option<ShortcutAction>;
    fn on_key_down(&mut self, source: KeySource, chord: KeyChord, repeat: bool) -> Option<ShortcutAction>;
    fn on_key_up(&mut self, key: &str);
    fn get_shortcut(&self, action: ShortcutAction) -> Option<String>;
}

struct HeldKey {
    chord: KeyChord,
    source: KeySource,
    pressed_at: Instant,
}

pub struct ShortcutManager {
    bindings: Vec<(KeyChord, ShortcutAction)>,
    held: Option<HeldKey>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        Self {
            bindings: Self::default_bindings(),
            held: None,
        }
    }

    pub fn default_bindings() -> Vec<(KeyChord, ShortcutAction)> {
        vec![
            (KeyChord::new("t", true, false), ShortcutAction::NewTab),
            (KeyChord::new("w", true, false), ShortcutAction::CloseTab),
            (KeyChord::new("tab", true, false), ShortcutAction::NextTab),
            (KeyChord::new("tab", true, true), ShortcutAction::PreviousTab),
            (KeyChord::new("q", true, false), ShortcutAction::Quit),
        ]
    }

    /// Script run in every surface that forwards bound chords to the shell
    /// and keeps the page from handling them. Window-only chords are left
    /// to the page.
    pub fn intercept_script(&self) -> String {
        let keys: Vec<serde_json::Value> = self
            .bindings
            .iter()
            .filter(|(_, action)| !action.is_window_only())
            .map(|(c, _)| serde_json::json!({"key": c.key, "shift": c.shift}))
            .collect();
        let keys = serde_json::to_string(&keys).unwrap_or_else(|_| "[]".into());
        let mac = cfg!(target_os = "macos");
        format!(
            r#"(function(){{
var bound={keys};var mac={mac};
function post(m){{try{{window.ipc.postMessage(JSON.stringify(m));}}catch(e){{}}}}
function match(e){{var k=(e.key||'').toLowerCase();var p=mac?e.metaKey:e.ctrlKey;if(!p)return false;for(var i=0;i<bound.length;i++){{if(bound[i].key===k&&bound[i].shift===e.shiftKey)return true;}}return false;}}
window.addEventListener('keydown',function(e){{if(!match(e))return;e.preventDefault();e.stopPropagation();post({{cmd:'key_down',key:e.key,ctrl:e.ctrlKey,meta:e.metaKey,shift:e.shiftKey,repeat:e.repeat}});}},true);
window.addEventListener('keyup',function(e){{post({{cmd:'key_up',key:e.key}});}},true);
}})();"#
        )
    }

    /// Claims a key press for one handler.
    ///
    /// The first source to report a press fires the action and holds the
    /// chord. The same chord from a different source within
    /// [`DUPLICATE_WINDOW`] is the same press and is dropped; later it is a
    /// new press, so a hold whose key-up never arrived (the reporting surface
    /// was closed) cannot swallow it. Auto-repeat from the holding source
    /// fires again. Window-only actions fire for `KeySource::Window` alone.
    pub fn on_key_down_at(
        &mut self,
        source: KeySource,
        chord: KeyChord,
        repeat: bool,
        now: Instant,
    ) -> Option<ShortcutAction> {
        let action = self.resolve(&chord)?;
        if action.is_window_only() && source != KeySource::Window {
            debug!(?source, ?action, "window-only shortcut refused");
            return None;
        }
        if let Some(held) = self.held.take() {
            if held.chord == chord {
                let recent = now.saturating_duration_since(held.pressed_at) <= DUPLICATE_WINDOW;
                if held.source != source && recent {
                    debug!(?source, ?action, "duplicate key press dropped");
                    return None;
                }
                if held.source == source && repeat {
                    self.held = Some(HeldKey {
                        pressed_at: now,
                        ..held
                    });
                    return Some(action);
                }
            }
        }
        self.held = Some(HeldKey {
            chord,
            source,
            pressed_at: now,
        });
        Some(action)
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn resolve(&self, chord: &KeyChord) -> Option<ShortcutAction> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == chord)
            .map(|(_, action)| *action)
    }

    fn on_key_down(&mut self, source: KeySource, chord: KeyChord, repeat: bool) -> Option<ShortcutAction> {
        self.on_key_down_at(source, chord, repeat, Instant::now())
    }

    fn on_key_up(&mut self, key: &str) {
        let key = normalize_key(key);
        if self.held.as_ref().is_some_and(|h| h.chord.key == key) {
            self.held = None;
        }
    }

    fn get_shortcut(&self, action: ShortcutAction) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, a)| *a == action)
            .map(|(c, _)| c.label())
    }
}
