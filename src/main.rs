//! figdesk: a desktop shell that hosts Figma in native tabs.
//!
//! Entry point: opens the native window and runs the shell event loop.
//! When built without the `gui` feature, runs a console demo against the
//! headless host.

#[cfg(feature = "gui")]
fn main() {
    figdesk::ui::shell_app::run();
}

#[cfg(not(feature = "gui"))]
fn main() {
    use figdesk::types::settings::ShellSettings;

    let settings = ShellSettings::default();
    figdesk::logging::init(&settings.log_filter);

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 figdesk v{} — Demo Mode                   ║", env!("CARGO_PKG_VERSION"));
    println!("║          Figma in native tabs, headless walkthrough         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    demo_classifier();
    demo_policy();
    demo_shortcuts();
    demo_app_core(settings);

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ All components demonstrated");
    println!("═══════════════════════════════════════════════════════════════");
}

#[cfg(not(feature = "gui"))]
fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

#[cfg(not(feature = "gui"))]
fn demo_classifier() {
    use figdesk::services::url_classifier::{is_auth_url, is_restorable, is_target_site_url};
    section("URL Classifier");

    for url in [
        "https://www.figma.com/file/abc",
        "https://accounts.google.com/o/oauth2/auth",
        "https://www.figma.com/login",
        "http://www.figma.com/",
        "https://example.com",
    ] {
        println!(
            "  {:<45} target={:<5} auth={:<5} restorable={}",
            url,
            is_target_site_url(url),
            is_auth_url(url),
            is_restorable(url)
        );
    }
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_policy() {
    use figdesk::services::navigation_policy::{decide_navigation, decide_popup, PopupShape};
    section("Navigation Policy");

    let shape = PopupShape::default();
    let tab = Some("https://www.figma.com/files/recent");
    println!("  popup google sign-in   -> {:?}", decide_popup("https://accounts.google.com/signin", tab, shape));
    println!("  popup figma file       -> {:?}", decide_popup("https://www.figma.com/file/x", tab, shape));
    println!("  popup example.com      -> {:?}", decide_popup("https://example.com", tab, shape));
    println!("  navigate help center   -> {:?}", decide_navigation("https://help.example.com"));
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_shortcuts() {
    use figdesk::managers::shortcut_manager::{ShortcutAction, ShortcutManager, ShortcutManagerTrait};
    section("Shortcut Manager");

    let mgr = ShortcutManager::new();
    for action in [
        ShortcutAction::NewTab,
        ShortcutAction::CloseTab,
        ShortcutAction::NextTab,
        ShortcutAction::PreviousTab,
        ShortcutAction::Quit,
    ] {
        println!("  {:<12} = {}", format!("{:?}", action), mgr.get_shortcut(action).unwrap_or_default());
    }
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_app_core(settings: figdesk::types::settings::ShellSettings) {
    use std::time::Duration;

    use figdesk::app::App;
    use figdesk::headless::{HeadlessHost, RecordingOpener};
    use figdesk::managers::session_manager::SessionManager;
    section("App Core (headless lifecycle)");

    let path = std::env::temp_dir().join("figdesk-demo").join("tabs.json");
    let session = SessionManager::new(path.clone(), Duration::from_millis(settings.persist_debounce_ms));
    let opener = RecordingOpener::new();
    let opened = opener.log();

    let mut app: App<HeadlessHost> = App::new(settings, session, Box::new(opener));
    app.attach_window(HeadlessHost::default());
    app.startup();
    println!("  Startup: {} tab(s)", app.tabs_state().tabs.len());

    app.create_tab(Some("https://www.figma.com/file/demo"), true);
    app.create_tab(None, false);
    println!("  Created tabs, count = {}", app.tabs_state().tabs.len());

    app.cycle_tabs(false);
    println!("  Cycled forward, active = {:?}", app.tabs_state().active_tab_id);

    if let Some(id) = app.tabs_state().active_tab_id {
        app.navigate_tab(&id, "https://example.com/pricing");
    }
    println!("  Deflected to system browser: {:?}", opened.borrow());

    app.shutdown();
    println!("  Shutdown flushed snapshot to {}", path.display());
    let _ = std::fs::remove_file(&path);
    println!("  ✓ App Core OK");
}
