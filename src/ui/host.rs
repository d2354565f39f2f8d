//! `wry` + `tao` implementations of the surface and window capabilities.
//!
//! Every content webview (tabs and auth popups) is built on the same
//! `WebContext`, whose data directory is the shared storage partition, and
//! gets the same hooks through [`attach_policy`]. Hooks never touch
//! coordinator state: they either answer from the pure navigation policy or
//! post a [`UserEvent`] to the event loop.

use tao::event_loop::{EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Window, WindowBuilder};
use tracing::{debug, warn};
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{PageLoadEvent, Rect, WebContext, WebView, WebViewBuilder};

use crate::bridge::{BridgeEvent, MessageOrigin};
use crate::managers::surface::{navigation_gate, NavigableSurface, PopupId, SurfaceEvent, SurfaceOwner, WindowHost};
use crate::managers::shortcut_manager::ShortcutManager;
use crate::platform;
use crate::services::navigation_policy::{NavigationVerdict, PopupShape};
use crate::services::permission_policy;
use crate::types::errors::SurfaceError;
use crate::types::layout::{Bounds, Size, WindowState};
use crate::types::tab::TabId;

const TITLEBAR_HTML: &str = include_str!("../../resources/ui/titlebar.html");

/// Events posted from webview hooks to the event loop.
#[derive(Debug)]
pub enum UserEvent {
    Surface { owner: SurfaceOwner, event: SurfaceEvent },
    Bridge { origin: MessageOrigin, body: String },
    NavigationRefused { owner: SurfaceOwner, url: String },
    PopupRequested { owner: SurfaceOwner, url: String },
    CloseWindow,
}

pub fn make_rect(bounds: Bounds) -> Rect {
    Rect {
        position: LogicalPosition::new(bounds.x, bounds.y).into(),
        size: LogicalSize::new(bounds.width, bounds.height).into(),
    }
}

fn op_err(e: wry::Error) -> SurfaceError {
    SurfaceError::Operation(e.to_string())
}

/// Wires the navigation, popup, load, title and IPC hooks of a content
/// surface owned by `owner`.
pub fn attach_policy<'a>(
    builder: WebViewBuilder<'a>,
    owner: SurfaceOwner,
    proxy: &EventLoopProxy<UserEvent>,
) -> WebViewBuilder<'a> {
    let nav_owner = owner.clone();
    let nav_proxy = proxy.clone();
    let popup_owner = owner.clone();
    let popup_proxy = proxy.clone();
    let load_owner = owner.clone();
    let load_proxy = proxy.clone();
    let title_owner = owner.clone();
    let title_proxy = proxy.clone();
    let ipc_proxy = proxy.clone();

    builder
        .with_navigation_handler(move |url: String| match navigation_gate(&nav_owner, &url) {
            NavigationVerdict::Allow => {
                let _ = nav_proxy.send_event(UserEvent::Surface {
                    owner: nav_owner.clone(),
                    event: SurfaceEvent::NavigationStarted { url },
                });
                true
            }
            NavigationVerdict::Deflect(_) => {
                let _ = nav_proxy.send_event(UserEvent::NavigationRefused {
                    owner: nav_owner.clone(),
                    url,
                });
                false
            }
        })
        .with_new_window_req_handler(move |url, _features| {
            let _ = popup_proxy.send_event(UserEvent::PopupRequested {
                owner: popup_owner.clone(),
                url,
            });
            wry::NewWindowResponse::Deny
        })
        .with_on_page_load_handler(move |event, url| {
            let event = match event {
                PageLoadEvent::Started => SurfaceEvent::LoadStarted,
                PageLoadEvent::Finished => SurfaceEvent::LoadFinished { url },
            };
            let _ = load_proxy.send_event(UserEvent::Surface {
                owner: load_owner.clone(),
                event,
            });
        })
        .with_document_title_changed_handler(move |title| {
            let _ = title_proxy.send_event(UserEvent::Surface {
                owner: title_owner.clone(),
                event: SurfaceEvent::TitleChanged { title },
            });
        })
        .with_ipc_handler(move |req: wry::http::Request<String>| {
            let _ = ipc_proxy.send_event(UserEvent::Bridge {
                origin: MessageOrigin::Content(owner.clone()),
                body: req.into_body(),
            });
        })
}

/// Script injected into every content surface.
fn content_init_script(shortcuts: &ShortcutManager) -> String {
    format!("{}\n{}", permission_policy::denial_script(), shortcuts.intercept_script())
}

/// A content webview.
pub struct WrySurface {
    webview: WebView,
}

impl NavigableSurface for WrySurface {
    fn load_url(&mut self, url: &str) -> Result<(), SurfaceError> {
        self.webview.load_url(url).map_err(op_err)
    }

    fn set_bounds(&mut self, bounds: Bounds) -> Result<(), SurfaceError> {
        self.webview.set_bounds(make_rect(bounds)).map_err(op_err)
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), SurfaceError> {
        self.webview.set_visible(visible).map_err(op_err)
    }

    fn focus(&mut self) -> Result<(), SurfaceError> {
        self.webview.focus().map_err(op_err)
    }

    fn go_back(&mut self) -> Result<(), SurfaceError> {
        self.webview.evaluate_script("history.back()").map_err(op_err)
    }

    fn go_forward(&mut self) -> Result<(), SurfaceError> {
        self.webview.evaluate_script("history.forward()").map_err(op_err)
    }

    fn reload(&mut self) -> Result<(), SurfaceError> {
        self.webview.evaluate_script("location.reload()").map_err(op_err)
    }
}

/// A top-level auth popup window and its single webview.
///
/// The webview is declared first so it is dropped before its window.
pub struct PopupWindow {
    pub id: PopupId,
    pub webview: WebView,
    pub window: Window,
}

/// Title shown on a popup window: the host of the URL it was opened for.
pub fn popup_title(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "Sign in".to_string())
}

/// The main window: title strip webview on top, tab webviews below.
pub struct WryHost {
    chrome: WebView,
    context: WebContext,
    proxy: EventLoopProxy<UserEvent>,
    init_script: String,
    titlebar_height: f64,
    devtools: bool,
    window: Window,
}

impl WryHost {
    pub fn new(
        window: Window,
        proxy: EventLoopProxy<UserEvent>,
        shortcuts: &ShortcutManager,
        titlebar_height: f64,
        devtools: bool,
    ) -> Result<Self, SurfaceError> {
        let context = WebContext::new(Some(platform::get_partition_dir()));
        let size = logical_size(&window);
        let chrome_proxy = proxy.clone();
        let chrome = WebViewBuilder::new()
            .with_html(TITLEBAR_HTML)
            .with_bounds(make_rect(Bounds {
                x: 0.0,
                y: 0.0,
                width: size.width,
                height: titlebar_height,
            }))
            .with_ipc_handler(move |req: wry::http::Request<String>| {
                let _ = chrome_proxy.send_event(UserEvent::Bridge {
                    origin: MessageOrigin::Chrome,
                    body: req.into_body(),
                });
            })
            .with_devtools(devtools)
            .build_as_child(&window)
            .map_err(|e| SurfaceError::Create(e.to_string()))?;

        Ok(Self {
            chrome,
            context,
            proxy,
            init_script: content_init_script(shortcuts),
            titlebar_height,
            devtools,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Stretches the title strip across the current width.
    pub fn layout_chrome(&self) {
        let size = logical_size(&self.window);
        let bounds = Bounds {
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: self.titlebar_height,
        };
        if let Err(e) = self.chrome.set_bounds(make_rect(bounds)) {
            warn!(error = %e, "failed to lay out title strip");
        }
    }

    /// Opens a resizable top-level auth popup on the shared partition.
    pub fn open_popup(
        &mut self,
        target: &EventLoopWindowTarget<UserEvent>,
        id: PopupId,
        url: &str,
        shape: PopupShape,
    ) -> Result<PopupWindow, SurfaceError> {
        let window = WindowBuilder::new()
            .with_title(popup_title(url))
            .with_inner_size(tao::dpi::LogicalSize::new(shape.width, shape.height))
            .with_resizable(true)
            .build(target)
            .map_err(|e| SurfaceError::Create(e.to_string()))?;

        let builder = WebViewBuilder::with_web_context(&mut self.context)
            .with_url(url)
            .with_initialization_script(self.init_script.as_str())
            .with_devtools(self.devtools);
        let webview = attach_policy(builder, SurfaceOwner::Popup(id), &self.proxy)
            .build(&window)
            .map_err(|e| SurfaceError::Create(e.to_string()))?;

        debug!(popup = %id, url, "popup window built");
        Ok(PopupWindow { id, window, webview })
    }
}

fn logical_size(window: &Window) -> Size {
    let size = window.inner_size().to_logical::<f64>(window.scale_factor());
    Size::new(size.width, size.height)
}

impl WindowHost for WryHost {
    type Surface = WrySurface;

    fn create_surface(&mut self, tab_id: &TabId, url: &str, bounds: Bounds) -> Result<WrySurface, SurfaceError> {
        let builder = WebViewBuilder::with_web_context(&mut self.context)
            .with_url(url)
            .with_bounds(make_rect(bounds))
            .with_visible(false)
            .with_initialization_script(self.init_script.as_str())
            .with_devtools(self.devtools);
        let webview = attach_policy(builder, SurfaceOwner::Tab(tab_id.clone()), &self.proxy)
            .build_as_child(&self.window)
            .map_err(|e| SurfaceError::Create(e.to_string()))?;
        Ok(WrySurface { webview })
    }

    fn inner_size(&self) -> Size {
        logical_size(&self.window)
    }

    fn window_state(&self) -> WindowState {
        WindowState {
            is_maximized: self.window.is_maximized(),
            is_fullscreen: self.window.fullscreen().is_some(),
        }
    }

    fn minimize(&mut self) {
        self.window.set_minimized(true);
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.window.set_maximized(maximized);
    }

    fn close(&mut self) {
        let _ = self.proxy.send_event(UserEvent::CloseWindow);
    }

    fn start_drag(&mut self) {
        if let Err(e) = self.window.drag_window() {
            debug!(error = %e, "window drag refused");
        }
    }

    fn emit(&mut self, event: &BridgeEvent) {
        if let Some(script) = event.to_script() {
            if let Err(e) = self.chrome.evaluate_script(&script) {
                warn!(error = %e, "failed to deliver bridge event");
            }
        }
    }
}
