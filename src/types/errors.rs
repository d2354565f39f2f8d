use thiserror::Error;

/// Errors related to tab management operations.
#[derive(Debug, Error)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(String),
    /// The content surface for a tab could not be created.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Errors reported by a navigable content surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Failed to create surface: {0}")]
    Create(String),
    #[error("Surface operation failed: {0}")]
    Operation(String),
}

/// Errors related to reading or writing the tab snapshot.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors related to loading or saving shell settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(String),
    #[error("Settings serialization error: {0}")]
    Serialization(String),
}

/// Errors when handing a URL to the operating system.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("Refusing to open URL: {0}")]
    Rejected(String),
    #[error("Failed to open URL: {0}")]
    Launch(String),
}
