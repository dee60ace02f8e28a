use serde_json::Value;
use std::collections::BTreeMap;

use crate::constants::{SPATIAL_KEYS, TEMPORAL_END_KEYS, TEMPORAL_START_KEYS};
use crate::types::{
    non_empty, DestinationPayload, Person, ResourceDescriptor, SourcePackage, TemporalCoverage,
};

/// Translate a CKAN package into the ESS-DIVE dataset payload.
///
/// Pure and deterministic: absent optional fields map to `None` or empty
/// sequences, never to an error.
pub fn map_package(package: &SourcePackage) -> DestinationPayload {
    let extras = collect_extras(package);

    let title = non_empty(&package.title)
        .or_else(|| non_empty(&package.name))
        .map(str::to_string);

    let keywords = package
        .tags
        .iter()
        .filter_map(|tag| non_empty(&tag.display_name))
        .map(str::to_string)
        .collect();

    let communities = package
        .groups
        .iter()
        .filter_map(|group| non_empty(&group.name))
        .map(str::to_string)
        .collect();

    let temporal_coverage = TemporalCoverage {
        start_date: first_text(&extras, &TEMPORAL_START_KEYS),
        end_date: first_text(&extras, &TEMPORAL_END_KEYS),
    };
    let spatial_coverage = first_value(&extras, &SPATIAL_KEYS).cloned();

    let resources = package
        .resources
        .iter()
        .map(|res| ResourceDescriptor {
            id: res.id.clone(),
            name: res.name.clone(),
            url: res.url.clone(),
            format: res.format.clone(),
            description: res.description.clone(),
            size: res.size.clone(),
        })
        .collect();

    DestinationPayload {
        title,
        description: package.notes.clone(),
        keywords,
        creators: single_person(&package.author, &package.author_email),
        contacts: single_person(&package.maintainer, &package.maintainer_email),
        temporal_coverage,
        spatial_coverage,
        communities,
        source_ckan_id: package.id.clone(),
        source_ckan_name: package.name.clone(),
        resources,
        extras,
    }
}

/// Builds the key -> value map; a repeated key keeps its last value.
fn collect_extras(package: &SourcePackage) -> BTreeMap<String, Value> {
    package
        .extras
        .iter()
        .filter_map(|extra| extra.key.clone().map(|key| (key, extra.value.clone())))
        .collect()
}

fn single_person(name: &Option<String>, email: &Option<String>) -> Vec<Person> {
    if non_empty(name).is_none() && non_empty(email).is_none() {
        return Vec::new();
    }
    vec![Person {
        name: name.clone(),
        email: email.clone(),
    }]
}

/// First extras value, in key priority order, that is neither null nor blank.
fn first_value<'a>(extras: &'a BTreeMap<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| extras.get(*key))
        .find(|value| is_truthy(value))
}

fn first_text(extras: &BTreeMap<String, Value>, keys: &[&str]) -> Option<String> {
    first_value(extras, keys).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}
