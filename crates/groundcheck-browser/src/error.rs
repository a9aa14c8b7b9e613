use thiserror::Error;

use crate::dom::NodeRef;

/// Faults raised while driving the browser tab.
///
/// These are "unexpected" failures; missing UI elements are modelled as
/// rejections in the locator, validator and submitter results instead.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The remote-debugging endpoint could not be reached or attached.
    #[error("failed to attach to browser at {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    /// Endpoint discovery over HTTP failed.
    #[error("browser discovery request failed: {0}")]
    Discovery(#[from] reqwest::Error),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out after {secs}s")]
    NavigationTimeout { url: String, secs: u64 },

    /// Script evaluation failed or returned an unexpected shape.
    #[error("page script failed: {0}")]
    Script(String),

    /// The element from an earlier snapshot is no longer in the document.
    #[error("element {0} is no longer attached to the page")]
    Detached(NodeRef),

    /// Raw input dispatch (pointer events) was rejected by the browser.
    #[error("input dispatch failed: {0}")]
    Input(String),

    #[error("screenshot failed: {0}")]
    Screenshot(String),
}
