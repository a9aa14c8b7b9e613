use std::path::PathBuf;

use crate::session::Session;

/// Fire-and-forget screenshot sink.
///
/// Captures never affect control flow: every failure is logged and dropped.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    dir: Option<PathBuf>,
}

impl Diagnostics {
    #[must_use]
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Writes `{dir}/{step}.png`. No-op when disabled.
    pub async fn capture<S: Session + ?Sized>(&self, session: &S, step: &str) {
        let Some(dir) = &self.dir else {
            return;
        };

        let bytes = match session.screenshot().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(step, error = %e, "diagnostic screenshot failed");
                return;
            }
        };

        let path = dir.join(format!("{}.png", file_stem(step)));
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot create diagnostics dir");
            return;
        }
        match tokio::fs::write(&path, bytes).await {
            Ok(()) => tracing::debug!(path = %path.display(), "saved diagnostic screenshot"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "cannot write screenshot"),
        }
    }

    /// Captures `error-{unix_millis}` after an unexpected fault.
    pub async fn capture_error<S: Session + ?Sized>(&self, session: &S) {
        let step = format!("error-{}", chrono::Utc::now().timestamp_millis());
        self.capture(session, &step).await;
    }
}

/// Identifiers end up in step names; keep file names portable.
fn file_stem(step: &str) -> String {
    step.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
