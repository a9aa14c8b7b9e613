//! Waits for the operator to finish logging in to the target app.

use crate::diagnostics::Diagnostics;
use crate::dom::DomSnapshot;
use crate::session::Session;
use crate::settings::{settle, AutomationSettings};

/// How many of the four signals must agree on one tick.
pub const LOGIN_QUORUM: usize = 2;

const PROGRESS_EVERY_TICKS: u32 = 10;

/// Independent evidence of an authenticated page, evaluated per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginSignals {
    pub off_login_route: bool,
    pub user_element: bool,
    pub navigation_element: bool,
    pub no_password_field: bool,
}

impl LoginSignals {
    #[must_use]
    pub fn evaluate(snapshot: &DomSnapshot) -> Self {
        let url = &snapshot.url;
        Self {
            off_login_route: !url.contains("/login") && !url.contains("/signin"),
            user_element: snapshot.exists(|n| {
                n.class_contains("user")
                    || n.class_contains("profile")
                    || n.class_contains("avatar")
                    || n.href.contains("logout")
            }),
            navigation_element: snapshot.exists(|n| {
                n.is_tag("nav") || n.class_contains("menu") || n.class_contains("sidebar")
            }),
            no_password_field: !snapshot.exists(|n| {
                n.is_tag("input") && n.input_type.as_deref() == Some("password")
            }),
        }
    }

    #[must_use]
    pub fn votes(&self) -> usize {
        [
            self.off_login_route,
            self.user_element,
            self.navigation_element,
            self.no_password_field,
        ]
        .into_iter()
        .filter(|v| *v)
        .count()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.votes() >= LOGIN_QUORUM
    }
}

/// Polls the session until login is detected or `timeout_ticks` ticks pass.
///
/// Navigates to the target app first when the tab is elsewhere; a failed
/// initial navigation returns `false`. A snapshot error on a tick is logged
/// and that tick does not count as detection. Returns `false` after exactly
/// `timeout_ticks` ticks without detection.
pub async fn wait_for_login<S: Session + ?Sized>(
    session: &S,
    settings: &AutomationSettings,
    diagnostics: &Diagnostics,
    timeout_ticks: u32,
) -> bool {
    if let Err(e) = ensure_on_target(session, settings).await {
        tracing::error!(error = %e, target = %settings.target_url, "cannot open target app");
        return false;
    }

    tracing::info!(timeout_ticks, "waiting for operator login");

    for tick in 1..=timeout_ticks {
        match session.snapshot().await {
            Ok(snapshot) => {
                let signals = LoginSignals::evaluate(&snapshot);
                if signals.is_logged_in() {
                    tracing::info!(tick, votes = signals.votes(), "login detected");
                    diagnostics.capture(session, "logged-in").await;
                    return true;
                }
                if tick % PROGRESS_EVERY_TICKS == 0 {
                    let elapsed = elapsed_after(settings.timings.login_poll, tick);
                    tracing::info!(
                        tick,
                        elapsed_min = elapsed.as_secs() / 60,
                        elapsed_sec = elapsed.as_secs() % 60,
                        ?signals,
                        "still waiting for login"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(tick, error = %e, "login check failed; continuing");
            }
        }

        settle(settings.timings.login_poll).await;
    }

    tracing::warn!(timeout_ticks, "login wait timed out");
    false
}

/// Poll time spent after `tick` ticks, saturating for absurd poll settings.
fn elapsed_after(poll: std::time::Duration, tick: u32) -> std::time::Duration {
    poll.saturating_mul(tick)
}

async fn ensure_on_target<S: Session + ?Sized>(
    session: &S,
    settings: &AutomationSettings,
) -> Result<(), crate::error::SessionError> {
    let current = session.current_url().await?;
    if current.contains(&settings.target_host()) {
        return Ok(());
    }

    tracing::info!(from = %current, to = %settings.target_url, "opening target app");
    session
        .navigate(&settings.target_url, settings.timings.navigation_timeout)
        .await?;
    settle(settings.timings.after_input).await;
    Ok(())
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
