//! Per-record workflow: pre-filter, locate, validate, submit.

use async_trait::async_trait;
use groundcheck_core::{Outcome, ProcessStage, Record};

use crate::diagnostics::Diagnostics;
use crate::error::SessionError;
use crate::locator::{locate, Located};
use crate::session::Session;
use crate::settings::AutomationSettings;
use crate::submitter::{submit, SubmitResult};
use crate::validator::{validate, CoordinateCheck};

/// Turns one record into exactly one outcome. Never fails.
#[async_trait]
pub trait ProcessRecord: Send + Sync {
    async fn process(&self, record: &Record) -> Outcome;
}

/// Pre-filter decision for a record, without touching the browser.
///
/// `None` means the record goes on to the UI workflow.
#[must_use]
pub fn prefilter(record: &Record) -> Option<Outcome> {
    let reason = if record.already_checked {
        "Already checked"
    } else if record.coordinates.is_none() {
        "Empty coordinates"
    } else if record.id.is_empty() {
        "Missing identifier"
    } else {
        return None;
    };
    Some(Outcome::skipped(
        record.row,
        &record.id,
        ProcessStage::Start,
        reason,
    ))
}

/// Drives one browser session through the workflow for each record.
pub struct RecordProcessor<'a, S: ?Sized> {
    session: &'a S,
    settings: &'a AutomationSettings,
    diagnostics: &'a Diagnostics,
}

impl<'a, S: Session + ?Sized> RecordProcessor<'a, S> {
    pub fn new(session: &'a S, settings: &'a AutomationSettings, diagnostics: &'a Diagnostics) -> Self {
        Self {
            session,
            settings,
            diagnostics,
        }
    }

    async fn drive(&self, record: &Record, stage: &mut ProcessStage) -> Result<Outcome, SessionError> {
        let (row, id) = (record.row, record.id.as_str());

        let view = match locate(self.session, self.settings, self.diagnostics, id).await? {
            Located::View(view) => view,
            Located::NotFound(reason) => {
                return Ok(Outcome::failed(row, id, *stage, reason.to_string()));
            }
        };
        *stage = ProcessStage::Located;

        match validate(self.session, &view, &self.settings.vocabulary).await? {
            CoordinateCheck::Usable(coords) => {
                tracing::debug!(row, record_id = id, latitude = %coords.latitude, longitude = %coords.longitude, "form coordinates usable");
            }
            CoordinateCheck::Rejected(reason) => {
                return Ok(Outcome::skipped(row, id, *stage, reason.to_string()));
            }
        }
        *stage = ProcessStage::Validated;

        let label = match submit(
            self.session,
            self.settings,
            self.diagnostics,
            &view,
            &record.existence,
        )
        .await?
        {
            SubmitResult::Submitted { label } => label,
            SubmitResult::Rejected(reason) => {
                return Ok(Outcome::failed(row, id, *stage, reason.to_string()));
            }
        };
        *stage = ProcessStage::Submitted;

        tracing::info!(row, record_id = id, tier = %view.tier, label, "record submitted");
        Ok(Outcome::success(
            row,
            id,
            format!("IDSBR {id} marked as {label}"),
        ))
    }
}

#[async_trait]
impl<S: Session + ?Sized> ProcessRecord for RecordProcessor<'_, S> {
    async fn process(&self, record: &Record) -> Outcome {
        if let Some(skipped) = prefilter(record) {
            return skipped;
        }

        let mut stage = ProcessStage::Prefiltered;
        match self.drive(record, &mut stage).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(row = record.row, record_id = %record.id, ?stage, error = %e, "record processing fault");
                self.diagnostics.capture_error(self.session).await;
                Outcome::failed(record.row, &record.id, stage, e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "processor_test.rs"]
mod tests;
