//! figdesk native UI layer.
//!
//! Uses `wry` webviews inside a single `tao` window:
//! - a title strip webview rendering tabs and window controls
//! - one child webview per tab, all sharing one persistent partition
//! - a separate top-level window per auth popup, on the same partition
//!
//! The title strip talks to the coordinator over wry IPC; see `bridge`.

pub mod host;
pub mod shell_app;
