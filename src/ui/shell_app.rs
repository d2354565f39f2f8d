//! Native shell event loop.
//!
//! The loop owns the coordinator outright; webview hooks talk to it only
//! through `UserEvent`s, so no lock is ever held while the engine calls back
//! into Rust.

use std::collections::HashMap;
use std::time::Instant;

use tao::event::{ElementState, Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopWindowTarget};
use tao::keyboard::{Key, ModifiersState};
use tao::window::{WindowBuilder, WindowId};
use tracing::{error, info, warn};

use crate::app::{App, PopupOutcome, ShellCommand};
use crate::bridge::{self, BridgeEvent, BridgeReply};
use crate::logging;
use crate::managers::shortcut_manager::{KeyChord, KeySource};
use crate::managers::surface::{PopupId, WindowHost};
use crate::services::external_opener::SystemBrowser;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::ui::host::{PopupWindow, UserEvent, WryHost};

const WINDOW_TITLE: &str = "Figma";

/// Auth popup windows currently open.
#[derive(Default)]
struct PopupWindows {
    by_window: HashMap<WindowId, PopupWindow>,
    by_popup: HashMap<PopupId, WindowId>,
}

impl PopupWindows {
    fn insert(&mut self, popup: PopupWindow) {
        let window_id = popup.window.id();
        self.by_popup.insert(popup.id, window_id);
        self.by_window.insert(window_id, popup);
    }

    fn remove_window(&mut self, window_id: WindowId) -> Option<PopupId> {
        let popup = self.by_window.remove(&window_id)?;
        self.by_popup.remove(&popup.id);
        Some(popup.id)
    }

    fn remove_popup(&mut self, id: PopupId) {
        if let Some(window_id) = self.by_popup.remove(&id) {
            self.by_window.remove(&window_id);
        }
    }

    fn clear(&mut self) {
        self.by_popup.clear();
        self.by_window.clear();
    }
}

fn window_key_name(key: &Key<'_>) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_string()),
        Key::Tab => Some("tab".to_string()),
        _ => None,
    }
}

fn exit(app: &mut App<WryHost>, popups: &mut PopupWindows, control_flow: &mut ControlFlow) {
    popups.clear();
    app.shutdown();
    *control_flow = ControlFlow::Exit;
}

fn open_popup(
    app: &mut App<WryHost>,
    popups: &mut PopupWindows,
    target: &EventLoopWindowTarget<UserEvent>,
    outcome: PopupOutcome,
) {
    let PopupOutcome::OpenPopup { id, url, shape } = outcome else {
        return;
    };
    let built = match app.window_mut() {
        Some(host) => host.open_popup(target, id, &url, shape),
        None => return,
    };
    match built {
        Ok(popup) => popups.insert(popup),
        Err(e) => {
            warn!(popup = %id, error = %e, "failed to open auth popup");
            app.popup_closed(id);
        }
    }
}

/// Runs the shell until the main window closes.
pub fn run() {
    let mut engine = SettingsEngine::new(None);
    let settings = engine.load_or_default();
    logging::init(&settings.log_filter);
    info!(version = env!("CARGO_PKG_VERSION"), "starting figdesk");
    if !engine.get_config_path().exists() {
        if let Err(e) = engine.save() {
            warn!(error = %e, "failed to write default settings");
        }
    }

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let builder = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(tao::dpi::LogicalSize::new(settings.window.width, settings.window.height))
        .with_min_inner_size(tao::dpi::LogicalSize::new(settings.window.min_width, settings.window.min_height));

    // Traffic lights stay native on macOS and overlay the title strip.
    #[cfg(target_os = "macos")]
    let builder = {
        use tao::platform::macos::WindowBuilderExtMacOS;
        builder
            .with_titlebar_transparent(true)
            .with_title_hidden(true)
            .with_fullsize_content_view(true)
    };
    #[cfg(not(target_os = "macos"))]
    let builder = builder.with_decorations(false);

    let window = match builder.build(&event_loop) {
        Ok(window) => window,
        Err(e) => {
            error!(error = %e, "failed to create main window");
            return;
        }
    };
    let main_window_id = window.id();

    let mut app: App<WryHost> = App::with_default_paths(settings.clone(), Box::new(SystemBrowser));
    match WryHost::new(window, proxy, &app.shortcuts, settings.titlebar_height, settings.devtools) {
        Ok(host) => app.attach_window(host),
        Err(e) => {
            error!(error = %e, "failed to create title strip");
            return;
        }
    }
    app.startup();

    let mut popups = PopupWindows::default();
    let mut modifiers = ModifiersState::empty();

    event_loop.run(move |event, target, control_flow| {
        match event {
            Event::WindowEvent { window_id, event, .. } if window_id == main_window_id => match event {
                WindowEvent::CloseRequested => exit(&mut app, &mut popups, control_flow),
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    if let Some(host) = app.window() {
                        host.layout_chrome();
                    }
                    app.on_geometry_changed();
                }
                WindowEvent::ModifiersChanged(state) => modifiers = state,
                WindowEvent::KeyboardInput { event: key_event, .. } => {
                    if let Some(key) = window_key_name(&key_event.logical_key) {
                        if key_event.state == ElementState::Released {
                            app.handle_key_up(&key);
                        } else {
                            let chord = KeyChord::from_flags(
                                &key,
                                modifiers.control_key(),
                                modifiers.super_key(),
                                modifiers.shift_key(),
                            );
                            if app.handle_key_down(KeySource::Window, chord, key_event.repeat)
                                == Some(ShellCommand::Quit)
                            {
                                exit(&mut app, &mut popups, control_flow);
                            }
                        }
                    }
                }
                _ => {}
            },

            Event::WindowEvent {
                window_id,
                event: WindowEvent::CloseRequested,
                ..
            } => {
                if let Some(id) = popups.remove_window(window_id) {
                    app.popup_closed(id);
                }
            }

            Event::UserEvent(user_event) => match user_event {
                UserEvent::Surface { owner, event } => {
                    if let Some(done) = app.handle_surface_event(&owner, event) {
                        popups.remove_popup(done);
                    }
                }
                UserEvent::Bridge { origin, body } => match bridge::handle_message(&mut app, &origin, &body) {
                    BridgeReply::None => {}
                    BridgeReply::Tabs(state) => {
                        if let Some(host) = app.window_mut() {
                            host.emit(&BridgeEvent::TabStateChanged(state));
                        }
                    }
                },
                UserEvent::NavigationRefused { owner, url } => {
                    app.handle_navigation_attempt(&owner, &url);
                }
                UserEvent::PopupRequested { owner, url } => {
                    let outcome = app.handle_popup_request(&owner, &url);
                    open_popup(&mut app, &mut popups, target, outcome);
                }
                UserEvent::CloseWindow => exit(&mut app, &mut popups, control_flow),
            },

            Event::MainEventsCleared => {
                if app.is_layout_confirmation_pending() {
                    app.confirm_layout();
                }
                app.tick(Instant::now());
            }

            _ => {}
        }

        if *control_flow != ControlFlow::Exit {
            *control_flow = match app.next_wakeup() {
                Some(deadline) => ControlFlow::WaitUntil(deadline),
                None => ControlFlow::Wait,
            };
        }
    });
}
