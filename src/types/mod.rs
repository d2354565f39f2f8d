// figdesk shared type definitions
// Each submodule defines plain data used across the shell.

pub mod errors;
pub mod layout;
pub mod session;
pub mod settings;
pub mod tab;
