use std::time::Duration;

use figdesk::app::{App, ShellCommand};
use figdesk::bridge::*;
use figdesk::headless::{HeadlessHost, RecordingOpener};
use figdesk::managers::session_manager::SessionManager;
use figdesk::managers::shortcut_manager::{KeyChord, KeySource};
use figdesk::managers::surface::SurfaceOwner;
use figdesk::types::layout::WindowLayout;
use figdesk::types::settings::ShellSettings;
use figdesk::types::tab::{TabId, TabsState};
use rstest::rstest;
use tempfile::TempDir;

fn new_app(dir: &TempDir) -> App<HeadlessHost> {
    let session = SessionManager::new(dir.path().join("tabs.json"), Duration::from_millis(500));
    let mut app = App::new(ShellSettings::default(), session, Box::new(RecordingOpener::new()));
    app.attach_window(HeadlessHost::default());
    app.startup();
    app
}

fn content() -> MessageOrigin {
    MessageOrigin::Content(SurfaceOwner::Tab(TabId::from("tab-1")))
}

#[rstest]
#[case(r#"{"cmd":"ui_ready"}"#, BridgeCommand::UiReady)]
#[case(r#"{"cmd":"get_tabs"}"#, BridgeCommand::GetTabs)]
#[case(r#"{"cmd":"create_tab"}"#, BridgeCommand::CreateTab { url: None })]
#[case(r#"{"cmd":"close_tab","id":"tab-2"}"#, BridgeCommand::CloseTab { id: TabId::from("tab-2") })]
#[case(r#"{"cmd":"toggle_maximize"}"#, BridgeCommand::ToggleMaximize)]
#[case(r#"{"cmd":"start_drag"}"#, BridgeCommand::StartDrag)]
#[case(r#"{"cmd":"key_up","key":"t"}"#, BridgeCommand::KeyUp { key: "t".to_string() })]
fn test_parse_command(#[case] body: &str, #[case] expected: BridgeCommand) {
    assert_eq!(parse_command(body), Some(expected));
}

#[test]
fn test_parse_key_down_defaults_missing_flags() {
    let cmd = parse_command(r#"{"cmd":"key_down","key":"Tab","ctrl":true}"#).unwrap();
    assert_eq!(
        cmd,
        BridgeCommand::KeyDown {
            key: "Tab".to_string(),
            ctrl: true,
            meta: false,
            shift: false,
            repeat: false,
        }
    );
}

#[rstest]
#[case("")]
#[case("not json")]
#[case(r#"{"cmd":"self_destruct"}"#)]
#[case(r#"{"cmd":"close_tab"}"#)]
fn test_unrecognised_messages_are_ignored(#[case] body: &str) {
    assert_eq!(parse_command(body), None);

    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);
    assert_eq!(handle_message(&mut app, &MessageOrigin::Chrome, body), BridgeReply::None);
    assert_eq!(app.tab_manager.tab_count(), 1);
}

#[test]
fn test_get_tabs_replies_with_snapshot() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);
    let reply = handle_message(&mut app, &MessageOrigin::Chrome, r#"{"cmd":"get_tabs"}"#);
    assert_eq!(reply, BridgeReply::Tabs(app.tabs_state()));
}

#[test]
fn test_chrome_drives_tab_lifecycle() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);

    handle_message(
        &mut app,
        &MessageOrigin::Chrome,
        r#"{"cmd":"create_tab","url":"https://www.figma.com/file/q"}"#,
    );
    let state = app.tabs_state();
    assert_eq!(state.tabs.len(), 2);
    let created = state.tabs[1].id.clone();
    assert_eq!(state.active_tab_id, Some(created.clone()));

    let first = state.tabs[0].id.clone();
    let body = format!(r#"{{"cmd":"activate_tab","id":"{}"}}"#, first);
    handle_message(&mut app, &MessageOrigin::Chrome, &body);
    assert_eq!(app.tabs_state().active_tab_id, Some(first));

    let body = format!(r#"{{"cmd":"close_tab","id":"{}"}}"#, created);
    handle_message(&mut app, &MessageOrigin::Chrome, &body);
    assert_eq!(app.tab_manager.tab_count(), 1);
}

#[test]
fn test_content_origin_cannot_drive_shell() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);
    let origin = content();

    assert!(!origin.permits(&BridgeCommand::GetTabs));
    assert_eq!(handle_message(&mut app, &origin, r#"{"cmd":"get_tabs"}"#), BridgeReply::None);
    handle_message(&mut app, &origin, r#"{"cmd":"create_tab"}"#);
    handle_message(&mut app, &origin, r#"{"cmd":"close"}"#);
    handle_message(&mut app, &origin, r#"{"cmd":"start_drag"}"#);

    assert_eq!(app.tab_manager.tab_count(), 1);
    let host = app.window().unwrap();
    assert!(!host.closed);
    assert_eq!(host.drags, 0);
}

fn active_content(app: &App<HeadlessHost>) -> MessageOrigin {
    let id = app.tab_manager.active_tab_id().cloned().unwrap();
    MessageOrigin::Content(SurfaceOwner::Tab(id))
}

#[test]
fn test_content_key_events_fire_shortcuts_once() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);

    let body = r#"{"cmd":"key_down","key":"t","ctrl":true,"meta":true}"#;
    assert_eq!(handle_message(&mut app, &content(), body), BridgeReply::None);
    assert_eq!(app.tab_manager.tab_count(), 2);

    let fired = app.handle_key_down(KeySource::Window, KeyChord::new("t", true, false), false);
    assert_eq!(fired, None);
    assert_eq!(app.tab_manager.tab_count(), 2);

    let origin = active_content(&app);
    handle_message(&mut app, &origin, r#"{"cmd":"key_up","key":"t"}"#);
    handle_message(&mut app, &origin, body);
    assert_eq!(app.tab_manager.tab_count(), 3);
}

#[test]
fn test_hidden_tab_key_events_are_ignored() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);
    app.create_tab(None, true).unwrap();

    let body = r#"{"cmd":"key_down","key":"w","ctrl":true,"meta":true}"#;
    assert_eq!(handle_message(&mut app, &content(), body), BridgeReply::None);
    assert_eq!(app.tab_manager.tab_count(), 2);

    let body = r#"{"cmd":"key_down","key":"t","ctrl":true,"meta":true}"#;
    handle_message(&mut app, &content(), body);
    assert_eq!(app.tab_manager.tab_count(), 2);
}

#[test]
fn test_page_cannot_quit() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);
    let body = r#"{"cmd":"key_down","key":"q","ctrl":true,"meta":true}"#;

    assert_eq!(handle_message(&mut app, &content(), body), BridgeReply::None);
    assert_eq!(handle_message(&mut app, &MessageOrigin::Chrome, body), BridgeReply::None);
    assert!(app.has_window());
    assert!(!app.window().unwrap().closed);
    assert_eq!(app.tab_manager.tab_count(), 1);
}

#[test]
fn test_window_quit_chord_is_handed_back() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);
    assert_eq!(
        app.handle_key_down(KeySource::Window, KeyChord::new("q", true, false), false),
        Some(ShellCommand::Quit)
    );
}

#[test]
fn test_window_commands_reach_host() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app(&dir);
    for cmd in [BridgeCommand::Minimize, BridgeCommand::StartDrag, BridgeCommand::Close] {
        dispatch(&mut app, &MessageOrigin::Chrome, cmd);
    }
    let host = app.window().unwrap();
    assert!(host.minimized);
    assert_eq!(host.drags, 1);
    assert!(host.closed);
}

#[test]
fn test_event_json_shape() {
    let event = BridgeEvent::TabStateChanged(TabsState {
        active_tab_id: None,
        tabs: Vec::new(),
    });
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "tab-state-changed");
    assert!(value["payload"]["activeTabId"].is_null());
    assert!(value["payload"]["tabs"].as_array().unwrap().is_empty());

    let event = BridgeEvent::WindowStateChanged(WindowStateEvent { is_maximized: true });
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "window-state-changed");
    assert_eq!(value["payload"]["isMaximized"], true);

    let event = BridgeEvent::Layout(WindowLayout {
        titlebar_height: 40.0,
        window_controls_inset: 78.0,
    });
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "layout");
    assert_eq!(value["payload"]["titlebarHeight"], 40.0);
    assert_eq!(value["payload"]["windowControlsInset"], 78.0);
}

#[test]
fn test_to_script_calls_dispatcher() {
    let event = BridgeEvent::WindowStateChanged(WindowStateEvent { is_maximized: false });
    let script = event.to_script().unwrap();
    assert!(script.starts_with("window.__figdesk&&window.__figdesk.dispatch("));
    assert!(script.contains(r#""event":"window-state-changed""#));
    assert!(script.ends_with(')'));
}

#[test]
fn test_tab_view_uses_camel_case() {
    let dir = TempDir::new().unwrap();
    let app = new_app(&dir);
    let value = serde_json::to_value(app.tabs_state()).unwrap();
    let tab = &value["tabs"][0];
    assert_eq!(tab["isActive"], true);
    assert_eq!(tab["isLoading"], false);
    assert_eq!(tab["canGoBack"], false);
    assert_eq!(tab["canGoForward"], false);
}
