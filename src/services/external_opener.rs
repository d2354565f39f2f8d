//! Hand-off of deflected URLs to the operating system's default handler.

use tracing::{info, warn};
use url::Url;

use crate::types::errors::OpenError;

/// Schemes that may leave the app.
const EXTERNAL_SCHEMES: &[&str] = &["https", "http", "mailto"];

/// Opens URLs outside the app.
pub trait ExternalOpener {
    fn open(&self, url: &str) -> Result<(), OpenError>;
}

/// Validates `url` for the external hand-off.
pub fn check_external_url(url: &str) -> Result<Url, OpenError> {
    let parsed = Url::parse(url).map_err(|e| OpenError::Rejected(format!("{}: {}", url, e)))?;
    if !EXTERNAL_SCHEMES.contains(&parsed.scheme()) {
        return Err(OpenError::Rejected(url.to_string()));
    }
    Ok(parsed)
}

/// Opens URLs with the system's default browser.
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl ExternalOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        let parsed = check_external_url(url)?;
        webbrowser::open(parsed.as_str()).map_err(|e| OpenError::Launch(e.to_string()))
    }
}

/// Deflects `url` through `opener`, swallowing any failure.
pub fn deflect(opener: &dyn ExternalOpener, url: &str) {
    match opener.open(url) {
        Ok(()) => info!(url, "opened externally"),
        Err(e) => warn!(url, error = %e, "external open dropped"),
    }
}
