// figdesk state managers
// Managers handle stateful operations: tabs, auth popups, persistence,
// shortcuts, and window layout.

pub mod popup_manager;
pub mod session_manager;
pub mod shortcut_manager;
pub mod surface;
pub mod tab_manager;
pub mod window_manager;
