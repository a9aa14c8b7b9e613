//! Coordinate checks on the open detail form.

use crate::dom::{DomNode, DomSnapshot};
use crate::error::SessionError;
use crate::locator::FocusedView;
use crate::session::Session;
use crate::settings::UiVocabulary;

/// Raw coordinate text as shown in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormCoordinates {
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRejection {
    MissingInputs,
    EmptyValues,
}

impl std::fmt::Display for ValidationRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValidationRejection::MissingInputs => "no coordinate inputs in form",
            ValidationRejection::EmptyValues => "form coordinates are empty",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinateCheck {
    Usable(FormCoordinates),
    Rejected(ValidationRejection),
}

/// Reads the form's coordinates from the current page.
pub async fn validate<S: Session + ?Sized>(
    session: &S,
    view: &FocusedView,
    vocabulary: &UiVocabulary,
) -> Result<CoordinateCheck, SessionError> {
    let snapshot = session.snapshot().await?;
    let check = check_coordinates(&snapshot, vocabulary);
    tracing::debug!(record_id = %view.record_id, ?check, "form coordinates checked");
    Ok(check)
}

#[must_use]
pub fn check_coordinates(snapshot: &DomSnapshot, vocabulary: &UiVocabulary) -> CoordinateCheck {
    let latitude = coordinate_input(snapshot, vocabulary.latitude_hint);
    let longitude = coordinate_input(snapshot, vocabulary.longitude_hint);

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return CoordinateCheck::Rejected(ValidationRejection::MissingInputs);
    };
    if is_blank(&latitude.value) || is_blank(&longitude.value) {
        return CoordinateCheck::Rejected(ValidationRejection::EmptyValues);
    }

    CoordinateCheck::Usable(FormCoordinates {
        latitude: latitude.value.clone(),
        longitude: longitude.value.clone(),
    })
}

fn coordinate_input<'a>(snapshot: &'a DomSnapshot, hint: &str) -> Option<&'a DomNode> {
    snapshot
        .iter()
        .map(|(_, n)| n)
        .find(|n| {
            n.is_tag("input")
                && [&n.name, &n.placeholder, &n.element_id]
                    .iter()
                    .any(|attr| attr.to_lowercase().contains(hint))
        })
}

fn is_blank(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "-"
}
