use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{non_empty, DestinationPayload};

/// Required ESS-DIVE fields, in the order they are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequiredField {
    Title,
    Description,
    Creators,
    Contacts,
    Keywords,
    TemporalStart,
    TemporalEnd,
}

impl RequiredField {
    pub const ALL: [RequiredField; 7] = [
        RequiredField::Title,
        RequiredField::Description,
        RequiredField::Creators,
        RequiredField::Contacts,
        RequiredField::Keywords,
        RequiredField::TemporalStart,
        RequiredField::TemporalEnd,
    ];

    /// Curator-facing label
    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::Title => "Title",
            RequiredField::Description => "Description / abstract",
            RequiredField::Creators => "At least one creator",
            RequiredField::Contacts => "Primary contact / maintainer",
            RequiredField::Keywords => "Keywords / tags",
            RequiredField::TemporalStart => "Temporal start date",
            RequiredField::TemporalEnd => "Temporal end date",
        }
    }

    fn is_satisfied_by(&self, payload: &DestinationPayload) -> bool {
        match self {
            RequiredField::Title => non_empty(&payload.title).is_some(),
            RequiredField::Description => non_empty(&payload.description).is_some(),
            RequiredField::Creators => payload.creators.iter().any(|p| p.is_present()),
            RequiredField::Contacts => payload.contacts.iter().any(|p| p.is_present()),
            RequiredField::Keywords => payload.keywords.iter().any(|k| !k.is_empty()),
            RequiredField::TemporalStart => {
                non_empty(&payload.temporal_coverage.start_date).is_some()
            }
            RequiredField::TemporalEnd => non_empty(&payload.temporal_coverage.end_date).is_some(),
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the required fields the payload lacks, in check order.
///
/// Absent and present-but-empty values are treated the same.
pub fn find_missing_fields(payload: &DestinationPayload) -> Vec<RequiredField> {
    RequiredField::ALL
        .into_iter()
        .filter(|field| !field.is_satisfied_by(payload))
        .collect()
}

/// Same as [`find_missing_fields`], rendered as labels.
pub fn find_missing_metadata(payload: &DestinationPayload) -> Vec<&'static str> {
    find_missing_fields(payload)
        .iter()
        .map(RequiredField::label)
        .collect()
}
