use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A CKAN package as returned by `package_show` / `package_search`.
///
/// Every field is optional; CKAN instances differ in what they fill in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePackage {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub maintainer: Option<String>,
    pub maintainer_email: Option<String>,
    pub tags: Vec<SourceTag>,
    pub groups: Vec<SourceGroup>,
    pub extras: Vec<SourceExtra>,
    pub resources: Vec<SourceResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTag {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceGroup {
    pub name: Option<String>,
}

/// One `{key, value}` entry of a package's extras list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceExtra {
    pub key: Option<String>,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceResource {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub format: Option<String>,
    pub description: Option<String>,
    /// CKAN reports sizes as integers, strings or null depending on the uploader
    pub size: Value,
}

/// A name/email pair used for creators and contacts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Person {
    /// True when the entry carries a non-empty name or email.
    pub fn is_present(&self) -> bool {
        non_empty(&self.name).is_some() || non_empty(&self.email).is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalCoverage {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A resource carried through from CKAN unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub format: Option<String>,
    pub description: Option<String>,
    pub size: Value,
}

/// The dataset body posted to ESS-DIVE.
///
/// Sequence fields are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub creators: Vec<Person>,
    pub contacts: Vec<Person>,
    pub temporal_coverage: TemporalCoverage,
    pub spatial_coverage: Option<Value>,
    pub communities: Vec<String>,
    pub source_ckan_id: Option<String>,
    pub source_ckan_name: Option<String>,
    pub resources: Vec<ResourceDescriptor>,
    /// Source extras, kept verbatim for traceability
    pub extras: BTreeMap<String, Value>,
}

/// Returns the string when it is present and non-empty.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_package_tolerates_missing_and_null_fields() {
        let package: SourcePackage = serde_json::from_value(json!({
            "name": "soil-moisture",
            "title": null,
            "tags": [{"display_name": "soil"}, {"vocabulary_id": null}],
            "resources": [{"url": "https://x/a.nc", "size": 1024}],
        }))
        .unwrap();

        assert_eq!(package.name.as_deref(), Some("soil-moisture"));
        assert!(package.title.is_none());
        assert_eq!(package.tags.len(), 2);
        assert!(package.tags[1].display_name.is_none());
        assert!(package.extras.is_empty());
        assert_eq!(package.resources[0].size, json!(1024));
        assert_eq!(package.resources[0].name, None);
    }

    #[test]
    fn payload_serializes_with_destination_field_names() {
        let payload = DestinationPayload {
            title: Some("Soil moisture".to_string()),
            source_ckan_id: Some("abc".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["title"], "Soil moisture");
        assert_eq!(value["sourceCkanId"], "abc");
        assert_eq!(value["keywords"], json!([]));
        assert_eq!(
            value["temporalCoverage"],
            json!({"startDate": null, "endDate": null})
        );
        assert!(value["spatialCoverage"].is_null());
    }

    #[test]
    fn person_presence_ignores_empty_strings() {
        assert!(!Person::default().is_present());
        assert!(!Person { name: Some(String::new()), email: None }.is_present());
        assert!(Person { name: None, email: Some("a@b.org".to_string()) }.is_present());
    }
}
