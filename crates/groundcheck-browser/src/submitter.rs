//! Applies the classification decision and saves the form.

use groundcheck_core::ExistenceCode;

use crate::diagnostics::Diagnostics;
use crate::dom::{DomSnapshot, NodeRef};
use crate::error::SessionError;
use crate::locator::FocusedView;
use crate::session::Session;
use crate::settings::{settle, AutomationSettings, UiVocabulary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejection {
    InvalidCode(String),
    DropdownUnavailable,
    SubmitMissing,
}

impl std::fmt::Display for SubmitRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitRejection::InvalidCode(raw) => write!(f, "invalid classification code: {raw}"),
            SubmitRejection::DropdownUnavailable => {
                f.write_str("classification dropdown not found or option not selectable")
            }
            SubmitRejection::SubmitMissing => f.write_str("submit control not found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// `label` is the domain label (`Found`, `Closed`, `Duplicate`).
    Submitted { label: &'static str },
    Rejected(SubmitRejection),
}

/// The classification select and the option value to pick.
#[must_use]
pub fn find_classification_option(
    snapshot: &DomSnapshot,
    vocabulary: &UiVocabulary,
    option_text: &str,
) -> Option<(NodeRef, String)> {
    snapshot.iter().find_map(|(r, n)| {
        let hinted = n.is_tag("select")
            && (n.name.to_lowercase().contains(vocabulary.classification_hint)
                || n.element_id.to_lowercase().contains(vocabulary.classification_hint));
        if !hinted {
            return None;
        }
        n.options
            .iter()
            .find(|o| o.text.contains(option_text))
            .map(|o| (r, o.value.clone()))
    })
}

/// First button, in document order, labelled as a save action.
#[must_use]
pub fn find_submit_button(snapshot: &DomSnapshot, vocabulary: &UiVocabulary) -> Option<NodeRef> {
    snapshot
        .iter()
        .find(|(_, n)| {
            n.is_tag("button") && vocabulary.submit_labels.iter().any(|l| n.text_contains(l))
        })
        .map(|(r, _)| r)
}

/// Selects the option for `code` and clicks the save button.
pub async fn submit<S: Session + ?Sized>(
    session: &S,
    settings: &AutomationSettings,
    diagnostics: &Diagnostics,
    view: &FocusedView,
    code: &ExistenceCode,
) -> Result<SubmitResult, SessionError> {
    let vocabulary = &settings.vocabulary;
    let (Some(label), Some(option_text)) = (code.label(), vocabulary.option_label(code)) else {
        return Ok(SubmitResult::Rejected(SubmitRejection::InvalidCode(
            code.to_string(),
        )));
    };

    let snapshot = session.snapshot().await?;
    let Some((dropdown, value)) = find_classification_option(&snapshot, vocabulary, option_text)
    else {
        diagnostics.capture(session, "failed-dropdown").await;
        return Ok(SubmitResult::Rejected(SubmitRejection::DropdownUnavailable));
    };
    session.select(dropdown, &value).await?;
    tracing::debug!(record_id = %view.record_id, option = option_text, "classification selected");
    settle(settings.timings.after_input).await;
    diagnostics.capture(session, "step5-before-submit").await;

    let snapshot = session.snapshot().await?;
    let Some(button) = find_submit_button(&snapshot, vocabulary) else {
        diagnostics.capture(session, "failed-no-submit").await;
        return Ok(SubmitResult::Rejected(SubmitRejection::SubmitMissing));
    };
    session.click(button).await?;
    settle(settings.timings.after_click).await;
    diagnostics.capture(session, "step6-after-submit").await;

    Ok(SubmitResult::Submitted { label })
}
