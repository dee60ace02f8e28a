use crate::types::{non_empty, DestinationPayload};

const NONE: &str = "none";

/// Multi-line, human-readable overview of a payload for curator review.
pub fn summarize_payload(payload: &DestinationPayload) -> String {
    let creators: Vec<&str> = payload
        .creators
        .iter()
        .map(|p| non_empty(&p.name).unwrap_or(""))
        .collect();
    let contacts: Vec<&str> = payload
        .contacts
        .iter()
        .map(|p| non_empty(&p.email).or(non_empty(&p.name)).unwrap_or(""))
        .collect();

    // Two optional strings; serialization cannot fail.
    let temporal = serde_json::to_string(&payload.temporal_coverage).unwrap_or_default();

    [
        format!("Title: {}", non_empty(&payload.title).unwrap_or(NONE)),
        format!("Keywords: {}", join_or_none(&payload.keywords)),
        format!("Creators: {}", join_or_none(&creators)),
        format!("Contacts: {}", join_or_none(&contacts)),
        format!("Temporal: {}", temporal),
        format!("Resources: {}", payload.resources.len()),
    ]
    .join("\n")
}

fn join_or_none<S: AsRef<str>>(items: &[S]) -> String {
    let joined = items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<&str>>()
        .join(", ");
    if joined.is_empty() {
        NONE.to_string()
    } else {
        joined
    }
}
