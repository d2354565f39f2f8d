use std::fs;
use std::time::{Duration, Instant};

use figdesk::app::App;
use figdesk::headless::{HeadlessHost, RecordingOpener};
use figdesk::managers::session_manager::{plan_restore, SessionManager, SessionManagerTrait};
use figdesk::services::url_classifier::DEFAULT_URL;
use figdesk::types::session::{PersistedSnapshot, PersistedTab};
use figdesk::types::settings::ShellSettings;
use figdesk::types::tab::TabId;
use tempfile::TempDir;

const DEBOUNCE: Duration = Duration::from_millis(500);

fn tab(id: &str, url: &str, title: &str) -> PersistedTab {
    PersistedTab {
        id: TabId::from(id),
        url: url.to_string(),
        title: title.to_string(),
    }
}

fn snapshot(active: Option<&str>, tabs: Vec<PersistedTab>) -> PersistedSnapshot {
    PersistedSnapshot {
        active_tab_id: active.map(TabId::from),
        tabs,
    }
}

fn app_at(dir: &TempDir) -> App<HeadlessHost> {
    let session = SessionManager::new(dir.path().join("tabs.json"), DEBOUNCE);
    let mut app = App::new(ShellSettings::default(), session, Box::new(RecordingOpener::new()));
    app.attach_window(HeadlessHost::default());
    app
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let mgr = SessionManager::new(dir.path().join("nested").join("tabs.json"), DEBOUNCE);
    let data = snapshot(
        Some("tab-1"),
        vec![tab("tab-1", "https://www.figma.com/file/a", "A")],
    );

    mgr.save_session(&data).unwrap();
    assert!(mgr.has_session());
    assert_eq!(mgr.load_session().unwrap(), Some(data));
}

#[test]
fn test_file_uses_camel_case_keys() {
    let dir = TempDir::new().unwrap();
    let mgr = SessionManager::new(dir.path().join("tabs.json"), DEBOUNCE);
    mgr.save_session(&snapshot(Some("tab-1"), vec![tab("tab-1", DEFAULT_URL, "Figma")]))
        .unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(mgr.path()).unwrap()).unwrap();
    assert_eq!(raw["activeTabId"], "tab-1");
    assert_eq!(raw["tabs"][0]["url"], DEFAULT_URL);
    assert_eq!(raw["tabs"][0]["title"], "Figma");
}

#[test]
fn test_missing_file_is_no_session() {
    let dir = TempDir::new().unwrap();
    let mgr = SessionManager::new(dir.path().join("absent.json"), DEBOUNCE);
    assert!(!mgr.has_session());
    assert_eq!(mgr.load_session().unwrap(), None);
    assert_eq!(mgr.restore(), None);
}

#[test]
fn test_corrupt_file_restores_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tabs.json");
    fs::write(&path, "{\"tabs\": [ {\"id\": ").unwrap();
    let mgr = SessionManager::new(path, DEBOUNCE);

    assert!(mgr.load_session().is_err());
    assert_eq!(mgr.restore(), None);
}

#[test]
fn test_clear_session_removes_file() {
    let dir = TempDir::new().unwrap();
    let mgr = SessionManager::new(dir.path().join("tabs.json"), DEBOUNCE);
    mgr.save_session(&PersistedSnapshot::default()).unwrap();
    mgr.clear_session().unwrap();
    assert!(!mgr.has_session());
    mgr.clear_session().unwrap();
}

#[test]
fn test_debounce_coalesces_bursts() {
    let dir = TempDir::new().unwrap();
    let mut mgr = SessionManager::new(dir.path().join("tabs.json"), DEBOUNCE);
    let t0 = Instant::now();

    mgr.schedule_at(snapshot(None, vec![tab("tab-1", DEFAULT_URL, "one")]), t0);
    mgr.schedule_at(snapshot(None, vec![tab("tab-1", DEFAULT_URL, "two")]), t0 + Duration::from_millis(300));
    assert!(!mgr.poll(t0 + Duration::from_millis(600)));
    assert_eq!(mgr.write_count(), 0);

    assert!(mgr.poll(t0 + Duration::from_millis(800)));
    assert_eq!(mgr.write_count(), 1);
    assert!(!mgr.has_pending());
    assert_eq!(mgr.load_session().unwrap().unwrap().tabs[0].title, "two");
    assert!(!mgr.poll(t0 + Duration::from_secs(5)));
}

#[test]
fn test_next_deadline_follows_latest_schedule() {
    let dir = TempDir::new().unwrap();
    let mut mgr = SessionManager::new(dir.path().join("tabs.json"), DEBOUNCE);
    assert_eq!(mgr.next_deadline(), None);

    let t0 = Instant::now();
    mgr.schedule_at(PersistedSnapshot::default(), t0);
    assert_eq!(mgr.next_deadline(), Some(t0 + DEBOUNCE));
    assert!(mgr.flush());
    assert_eq!(mgr.next_deadline(), None);
    assert!(!mgr.flush());
}

#[test]
fn test_drop_flushes_pending_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tabs.json");
    {
        let mut mgr = SessionManager::new(path.clone(), DEBOUNCE);
        mgr.schedule(snapshot(Some("tab-3"), vec![tab("tab-3", DEFAULT_URL, "kept")]));
    }
    let mgr = SessionManager::new(path, DEBOUNCE);
    assert_eq!(mgr.load_session().unwrap().unwrap().active_tab_id, Some(TabId::from("tab-3")));
}

#[test]
fn test_write_failure_is_swallowed() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").unwrap();
    let mut mgr = SessionManager::new(blocker.join("tabs.json"), DEBOUNCE);

    mgr.schedule(PersistedSnapshot::default());
    assert!(mgr.flush());
    assert!(!mgr.has_pending());
}

#[test]
fn test_plan_restore_filters_and_keeps_order() {
    let data = snapshot(
        Some("tab-2"),
        vec![
            tab("tab-1", "https://www.figma.com/file/a", "A"),
            tab("tab-2", "https://example.com", "X"),
            tab("tab-5", "https://accounts.google.com/signin", "G"),
        ],
    );
    let plan = plan_restore(&data).unwrap();
    let ids: Vec<_> = plan.tabs.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["tab-1", "tab-5"]);
    assert_eq!(plan.active_tab_id, TabId::from("tab-1"));
}

#[test]
fn test_plan_restore_keeps_restorable_active() {
    let data = snapshot(
        Some("tab-5"),
        vec![
            tab("tab-1", "https://www.figma.com/file/a", "A"),
            tab("tab-5", "https://www.figma.com/file/b", "B"),
        ],
    );
    assert_eq!(plan_restore(&data).unwrap().active_tab_id, TabId::from("tab-5"));
}

#[test]
fn test_plan_restore_empty_when_nothing_survives() {
    let data = snapshot(Some("tab-1"), vec![tab("tab-1", "http://www.figma.com", "A")]);
    assert_eq!(plan_restore(&data), None);
    assert_eq!(plan_restore(&PersistedSnapshot::default()), None);
}

#[test]
fn test_startup_restores_tabs_titles_and_active() {
    let dir = TempDir::new().unwrap();
    let writer = SessionManager::new(dir.path().join("tabs.json"), DEBOUNCE);
    writer
        .save_session(&snapshot(
            Some("tab-7"),
            vec![
                tab("tab-4", "https://www.figma.com/file/a", "Alpha"),
                tab("tab-6", "https://example.com", "Nope"),
                tab("tab-7", "https://www.figma.com/file/b", "Beta"),
            ],
        ))
        .unwrap();

    let mut app = app_at(&dir);
    app.startup();
    let state = app.tabs_state();
    let ids: Vec<_> = state.tabs.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["tab-4", "tab-7"]);
    assert_eq!(state.tabs[0].title, "Alpha");
    assert_eq!(state.active_tab_id, Some(TabId::from("tab-7")));

    let fresh = app.create_tab(None, false).unwrap();
    assert_eq!(fresh, TabId::from("tab-8"));
}

#[test]
fn test_restored_max_id_does_not_exhaust_counter() {
    let dir = TempDir::new().unwrap();
    let max = format!("tab-{}", u64::MAX);
    let writer = SessionManager::new(dir.path().join("tabs.json"), DEBOUNCE);
    writer
        .save_session(&snapshot(
            Some(max.as_str()),
            vec![tab(&max, "https://www.figma.com/file/a", "Max")],
        ))
        .unwrap();

    let mut app = app_at(&dir);
    app.startup();
    let first = app.create_tab(None, true).unwrap();
    let second = app.create_tab(None, true).unwrap();

    assert_ne!(first, second);
    assert_ne!(first, TabId::from(max.as_str()));
    assert_ne!(second, TabId::from(max.as_str()));
    assert_eq!(app.tab_manager.tab_count(), 3);
}

#[test]
fn test_startup_with_corrupt_snapshot_opens_default_tab() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tabs.json"), "garbage").unwrap();

    let mut app = app_at(&dir);
    app.startup();
    let state = app.tabs_state();
    assert_eq!(state.tabs.len(), 1);
    assert_eq!(state.tabs[0].url, DEFAULT_URL);
}

#[test]
fn test_changes_persist_after_tick() {
    let dir = TempDir::new().unwrap();
    let mut app = app_at(&dir);
    app.startup();
    app.create_tab(Some("https://www.figma.com/file/z"), true);

    let deadline = app.next_wakeup().unwrap();
    assert!(!app.tick(deadline - Duration::from_millis(1)));
    assert!(app.tick(deadline));

    let saved = SessionManager::new(dir.path().join("tabs.json"), DEBOUNCE)
        .load_session()
        .unwrap()
        .unwrap();
    assert_eq!(saved.tabs.len(), 2);
    assert_eq!(saved.tabs[1].url, "https://www.figma.com/file/z");
    assert_eq!(saved.active_tab_id, Some(saved.tabs[1].id.clone()));
}
