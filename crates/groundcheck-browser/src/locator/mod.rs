//! Drives the listing screen from the menu to an open detail form.

mod controls;
mod tiers;

pub use controls::{find_filter_toggle, find_identifier_input, find_menu_entry};
pub use tiers::{
    identifier_match, pointer_fallback, positional_match, resolve_result, structural_match,
    ClickTarget, LocateTier,
};

use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::error::SessionError;
use crate::session::Session;
use crate::settings::{settle, AutomationSettings};

/// The detail form of one entity is open in the tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusedView {
    pub record_id: String,
    /// The cascade tier that opened the form.
    pub tier: LocateTier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    MenuMissing,
    IdentifierInputMissing,
    ResultMissing { record_id: String },
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundReason::MenuMissing => f.write_str("ground check menu not found"),
            NotFoundReason::IdentifierInputMissing => f.write_str("identifier input not found"),
            NotFoundReason::ResultMissing { record_id } => {
                write!(f, "search result not found for identifier {record_id}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    View(FocusedView),
    NotFound(NotFoundReason),
}

const SUMMARY_NODE_LIMIT: usize = 20;

/// Searches the listing for `record_id` and opens its detail form.
///
/// Missing UI is reported as [`Located::NotFound`]; only session faults are
/// returned as errors.
pub async fn locate<S: Session + ?Sized>(
    session: &S,
    settings: &AutomationSettings,
    diagnostics: &Diagnostics,
    record_id: &str,
) -> Result<Located, SessionError> {
    let vocabulary = &settings.vocabulary;
    let timings = &settings.timings;

    let listing_url = settings.listing_url();
    tracing::debug!(url = %listing_url, record_id, "opening listing");
    session
        .navigate(&listing_url, timings.navigation_timeout)
        .await?;
    settle(timings.after_navigation).await;
    diagnostics.capture(session, "step1-dirgc").await;

    let snapshot = session.snapshot().await?;
    let Some(menu) = find_menu_entry(&snapshot, vocabulary) else {
        diagnostics.capture(session, "failed-no-gc-menu").await;
        return Ok(Located::NotFound(NotFoundReason::MenuMissing));
    };
    session.click(menu).await?;
    settle(timings.after_click).await;
    diagnostics.capture(session, "step2-after-gc-click").await;

    let snapshot = session.snapshot().await?;
    let filter_opened = match find_filter_toggle(&snapshot, vocabulary) {
        Some(toggle) => {
            session.click(toggle).await?;
            true
        }
        None => {
            tracing::debug!("no filter toggle; searching directly");
            false
        }
    };
    settle(timings.after_input).await;

    let snapshot = session.snapshot().await?;
    let Some(input) = find_identifier_input(&snapshot, vocabulary) else {
        diagnostics.capture(session, "failed-no-input").await;
        return Ok(Located::NotFound(NotFoundReason::IdentifierInputMissing));
    };
    session.fill(input, record_id).await?;
    settle(timings.after_input).await;

    if filter_opened {
        let snapshot = session.snapshot().await?;
        if let Some(toggle) = find_filter_toggle(&snapshot, vocabulary) {
            session.click(toggle).await?;
            settle(timings.after_input).await;
        }
    }
    diagnostics.capture(session, "step3-after-search").await;

    let snapshot = session.snapshot().await?;
    let clicked = match resolve_result(&snapshot, record_id) {
        Some((tier, ClickTarget::Node(node))) => {
            session.click(node).await?;
            Some(tier)
        }
        Some((tier, ClickTarget::Point { x, y })) => match session.click_at(x, y).await {
            Ok(()) => Some(tier),
            Err(e) => {
                tracing::warn!(tier = %tier, x, y, error = %e, "pointer click not dispatched");
                None
            }
        },
        None => None,
    };

    let Some(tier) = clicked else {
        diagnostics
            .capture(session, &format!("failed-no-result-{record_id}"))
            .await;
        log_result_area(&snapshot);
        return Ok(Located::NotFound(NotFoundReason::ResultMissing {
            record_id: record_id.to_string(),
        }));
    };

    settle(timings.after_click).await;
    diagnostics
        .capture(session, &format!("step4-form-opened-{record_id}"))
        .await;
    tracing::info!(record_id, tier = %tier, "result entry opened");

    Ok(Located::View(FocusedView {
        record_id: record_id.to_string(),
        tier,
    }))
}

fn log_result_area(snapshot: &crate::dom::DomSnapshot) {
    let blocks = snapshot
        .iter()
        .filter(|(_, n)| {
            ["div", "li", "article", "section"]
                .iter()
                .any(|t| n.is_tag(t))
        })
        .take(SUMMARY_NODE_LIMIT);
    for (node, n) in blocks {
        let preview: String = n.text.chars().take(80).collect();
        tracing::debug!(%node, tag = %n.tag, class = %n.class_name, text = %preview, "result area node");
    }
}

#[cfg(test)]
#[path = "locate_test.rs"]
mod tests;
