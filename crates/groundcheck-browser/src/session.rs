use std::time::Duration;

use async_trait::async_trait;

use crate::dom::{DomSnapshot, NodeRef};
use crate::error::SessionError;

/// One browser tab attached to the target app.
///
/// Every call touches the same tab, so callers must drive it sequentially.
/// Element-addressed actions take a [`NodeRef`] from the most recent
/// [`Session::snapshot`].
#[async_trait]
pub trait Session: Send + Sync {
    async fn current_url(&self) -> Result<String, SessionError>;

    /// Navigates and waits for the load to finish, bounded by `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SessionError>;

    async fn snapshot(&self) -> Result<DomSnapshot, SessionError>;

    /// Synthetic `click()` on an element.
    async fn click(&self, node: NodeRef) -> Result<(), SessionError>;

    /// Raw pointer press/release at viewport coordinates.
    async fn click_at(&self, x: f64, y: f64) -> Result<(), SessionError>;

    /// Focuses an input, replaces its value and dispatches bubbling `input`
    /// and `change` events.
    async fn fill(&self, node: NodeRef, value: &str) -> Result<(), SessionError>;

    /// Sets a select's value and dispatches a bubbling `change` event.
    async fn select(&self, node: NodeRef, option_value: &str) -> Result<(), SessionError>;

    /// PNG bytes of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>, SessionError>;

    /// Detaches from the tab. The browser itself stays open.
    async fn close(&self) -> Result<(), SessionError>;
}

/// Acquires a [`Session`] for one run.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: Session;

    async fn acquire(&self) -> Result<Self::Session, SessionError>;
}
