//! Capability interface shared by every content container.
//!
//! Tabs and auth popups are both `NavigableSurface`s: they load URLs, report
//! navigation events, and route navigation attempts and popup requests
//! through the same policy. The window that hosts them is a `WindowHost`.

use std::fmt;

use crate::bridge::BridgeEvent;
use crate::services::navigation_policy::{decide_navigation, decide_popup_navigation, NavigationVerdict};
use crate::types::errors::SurfaceError;
use crate::types::layout::{Bounds, Size, WindowState};
use crate::types::tab::TabId;

/// Identifier of a transient auth popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(pub u64);

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popup-{}", self.0)
    }
}

/// Which container an event or request came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceOwner {
    Tab(TabId),
    Popup(PopupId),
}

/// Events a surface reports back to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A navigation passed the policy and is about to load.
    NavigationStarted { url: String },
    LoadStarted,
    LoadFinished { url: String },
    TitleChanged { title: String },
}

/// An isolated navigable content container.
///
/// Dropping a surface destroys it.
pub trait NavigableSurface {
    fn load_url(&mut self, url: &str) -> Result<(), SurfaceError>;
    fn set_bounds(&mut self, bounds: Bounds) -> Result<(), SurfaceError>;
    fn set_visible(&mut self, visible: bool) -> Result<(), SurfaceError>;
    fn focus(&mut self) -> Result<(), SurfaceError>;
    fn go_back(&mut self) -> Result<(), SurfaceError>;
    fn go_forward(&mut self) -> Result<(), SurfaceError>;
    fn reload(&mut self) -> Result<(), SurfaceError>;
}

/// The single top-level window and its presentation layer.
pub trait WindowHost {
    type Surface: NavigableSurface;

    /// Creates a hidden tab surface loading `url`, wired to the navigation
    /// policy for `tab_id`.
    fn create_surface(
        &mut self,
        tab_id: &TabId,
        url: &str,
        bounds: Bounds,
    ) -> Result<Self::Surface, SurfaceError>;
    fn inner_size(&self) -> Size;
    fn window_state(&self) -> WindowState;
    fn minimize(&mut self);
    fn set_maximized(&mut self, maximized: bool);
    fn close(&mut self);
    /// Starts an interactive window move from the title strip.
    fn start_drag(&mut self);
    /// Pushes an event to the presentation layer.
    fn emit(&mut self, event: &BridgeEvent);
}

/// Policy applied to a top-level navigation inside the surface owned by `owner`.
pub fn navigation_gate(owner: &SurfaceOwner, url: &str) -> NavigationVerdict {
    match owner {
        SurfaceOwner::Tab(_) => decide_navigation(url),
        SurfaceOwner::Popup(_) => decide_popup_navigation(url),
    }
}
