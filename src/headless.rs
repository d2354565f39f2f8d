//! In-memory window host used by the console demo and the test suite.
//!
//! `HeadlessHost` records everything the coordinator asks of a real window
//! (surfaces created, events emitted, window controls pressed) so behaviour
//! can be checked without a display.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bridge::BridgeEvent;
use crate::managers::surface::{NavigableSurface, WindowHost};
use crate::services::external_opener::{check_external_url, ExternalOpener};
use crate::types::errors::{OpenError, SurfaceError};
use crate::types::layout::{Bounds, Size, WindowState};
use crate::types::tab::{TabId, TabsState};

/// Surface that only remembers what was done to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessSurface {
    pub tab_id: Option<TabId>,
    pub url: String,
    pub loads: Vec<String>,
    pub bounds: Option<Bounds>,
    pub visible: bool,
    pub focus_count: u32,
    pub back_count: u32,
    pub forward_count: u32,
    pub reload_count: u32,
}

impl NavigableSurface for HeadlessSurface {
    fn load_url(&mut self, url: &str) -> Result<(), SurfaceError> {
        self.url = url.to_string();
        self.loads.push(url.to_string());
        Ok(())
    }

    fn set_bounds(&mut self, bounds: Bounds) -> Result<(), SurfaceError> {
        self.bounds = Some(bounds);
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), SurfaceError> {
        self.visible = visible;
        Ok(())
    }

    fn focus(&mut self) -> Result<(), SurfaceError> {
        self.focus_count += 1;
        Ok(())
    }

    fn go_back(&mut self) -> Result<(), SurfaceError> {
        self.back_count += 1;
        Ok(())
    }

    fn go_forward(&mut self) -> Result<(), SurfaceError> {
        self.forward_count += 1;
        Ok(())
    }

    fn reload(&mut self) -> Result<(), SurfaceError> {
        self.reload_count += 1;
        Ok(())
    }
}

/// Window stand-in with a configurable size and state.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub size: Size,
    pub state: WindowState,
    pub events: Vec<BridgeEvent>,
    pub created: Vec<(TabId, String)>,
    /// When set, `create_surface` fails.
    pub fail_surfaces: bool,
    pub minimized: bool,
    pub closed: bool,
    pub drags: u32,
}

impl HeadlessHost {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            state: WindowState::default(),
            events: Vec::new(),
            created: Vec::new(),
            fail_surfaces: false,
            minimized: false,
            closed: false,
            drags: 0,
        }
    }

    /// Latest tab-state event pushed to the presentation layer.
    pub fn last_tab_state(&self) -> Option<&TabsState> {
        self.events.iter().rev().find_map(|e| match e {
            BridgeEvent::TabStateChanged(state) => Some(state),
            _ => None,
        })
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(1400.0, 900.0)
    }
}

impl WindowHost for HeadlessHost {
    type Surface = HeadlessSurface;

    fn create_surface(&mut self, tab_id: &TabId, url: &str, bounds: Bounds) -> Result<HeadlessSurface, SurfaceError> {
        if self.fail_surfaces {
            return Err(SurfaceError::Create(format!("refused surface for {}", tab_id)));
        }
        self.created.push((tab_id.clone(), url.to_string()));
        Ok(HeadlessSurface {
            tab_id: Some(tab_id.clone()),
            url: url.to_string(),
            loads: vec![url.to_string()],
            bounds: Some(bounds),
            ..HeadlessSurface::default()
        })
    }

    fn inner_size(&self) -> Size {
        self.size
    }

    fn window_state(&self) -> WindowState {
        self.state
    }

    fn minimize(&mut self) {
        self.minimized = true;
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.state.is_maximized = maximized;
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn start_drag(&mut self) {
        self.drags += 1;
    }

    fn emit(&mut self, event: &BridgeEvent) {
        self.events.push(event.clone());
    }
}

/// Opener that records accepted URLs instead of launching anything.
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Rc<RefCell<Vec<String>>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the URLs opened so far.
    pub fn log(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.opened)
    }
}

impl ExternalOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        let parsed = check_external_url(url)?;
        self.opened.borrow_mut().push(parsed.to_string());
        Ok(())
    }
}
