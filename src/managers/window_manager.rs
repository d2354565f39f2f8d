//! Window/layout coordination for figdesk.
//!
//! The active tab's surface fills the window below a fixed-height title
//! strip. Geometry events apply the new bounds right away and leave a
//! confirmation pending; once the host has finished its event batch the
//! window is measured again and the bounds are reapplied only if the size
//! moved in between.

use crate::types::layout::{Bounds, Size, WindowLayout, WindowState};

/// Width kept free for the native traffic-light buttons on macOS.
#[cfg(target_os = "macos")]
const NATIVE_CONTROLS_INSET: f64 = 78.0;

#[cfg(not(target_os = "macos"))]
const NATIVE_CONTROLS_INSET: f64 = 0.0;

pub struct LayoutCoordinator {
    titlebar_height: f64,
    size: Size,
    state: WindowState,
    confirmation_pending: bool,
}

impl LayoutCoordinator {
    pub fn new(titlebar_height: f64) -> Self {
        Self {
            titlebar_height: titlebar_height.max(0.0),
            size: Size::default(),
            state: WindowState::default(),
            confirmation_pending: false,
        }
    }

    pub fn titlebar_height(&self) -> f64 {
        self.titlebar_height
    }

    pub fn controls_inset(state: WindowState) -> f64 {
        if state.is_fullscreen {
            0.0
        } else {
            NATIVE_CONTROLS_INSET
        }
    }

    pub fn layout(&self) -> WindowLayout {
        WindowLayout {
            titlebar_height: self.titlebar_height,
            window_controls_inset: Self::controls_inset(self.state),
        }
    }

    /// Content area below the title strip for a window of `size`.
    pub fn content_bounds_for(&self, size: Size) -> Bounds {
        Bounds {
            x: 0.0,
            y: self.titlebar_height,
            width: size.width.max(0.0),
            height: (size.height - self.titlebar_height).max(0.0),
        }
    }

    pub fn content_bounds(&self) -> Bounds {
        self.content_bounds_for(self.size)
    }

    pub fn window_state(&self) -> WindowState {
        self.state
    }

    /// Records a resize/maximize/fullscreen/restore and returns the bounds
    /// to apply now.
    pub fn on_geometry_event(&mut self, size: Size, state: WindowState) -> Bounds {
        self.size = size;
        self.state = state;
        self.confirmation_pending = true;
        self.content_bounds()
    }

    pub fn is_confirmation_pending(&self) -> bool {
        self.confirmation_pending
    }

    /// Settles a pending geometry event against a fresh measurement.
    ///
    /// Returns the bounds to reapply when the measured size differs from
    /// the one last applied.
    pub fn confirm(&mut self, measured: Size) -> Option<Bounds> {
        if !self.confirmation_pending {
            return None;
        }
        self.confirmation_pending = false;
        if measured == self.size {
            return None;
        }
        self.size = measured;
        Some(self.content_bounds())
    }
}
