use anyhow::Result;
use ckan_essdive::app::inspect_package;
use ckan_essdive::pipeline::{find_missing_metadata, resource_filename};
use ckan_essdive::SourcePackage;
use serde_json::json;

#[test]
fn test_package_show_record_through_mapping_and_review() -> Result<()> {
    // Shape of a real CKAN 2.9 package_show result, trimmed
    let record = json!({
        "id": "b5a1c6f2-0c55-4d1e-9b6b-3c2f3b1f8e10",
        "name": "snow-depth-gothic",
        "title": "Snow depth at Gothic, CO",
        "notes": "Daily snow depth from ultrasonic sensors.",
        "author": null,
        "author_email": "",
        "maintainer": "RMBL Data",
        "maintainer_email": null,
        "state": "active",
        "private": false,
        "num_tags": 2,
        "tags": [
            {"id": "t1", "name": "snow", "display_name": "snow", "state": "active"},
            {"id": "t2", "name": "cryosphere", "display_name": "cryosphere", "state": "active"}
        ],
        "groups": [
            {"id": "g1", "name": "rmbl", "title": "RMBL", "display_name": "RMBL"}
        ],
        "extras": [
            {"key": "time_start", "value": "2015-10-01"},
            {"key": "spatial", "value": "{\"type\":\"Point\",\"coordinates\":[-106.99,38.96]}"}
        ],
        "resources": [
            {
                "id": "res-1",
                "name": "snow_depth_2015_2020",
                "url": "https://data.example.org/dataset/snow/resource/res-1/download/snow_depth.csv",
                "format": "CSV",
                "description": "",
                "size": null,
                "mimetype": "text/csv"
            },
            {
                "id": "res-2",
                "name": null,
                "url": "https://data.example.org/readme",
                "format": "",
                "description": null,
                "size": "512"
            }
        ]
    });

    let package: SourcePackage = serde_json::from_value(record)?;
    let inspection = inspect_package(&package);
    let payload = &inspection.payload;

    assert_eq!(payload.title.as_deref(), Some("Snow depth at Gothic, CO"));
    assert_eq!(payload.keywords, vec!["snow", "cryosphere"]);
    assert_eq!(payload.communities, vec!["rmbl"]);
    assert!(payload.creators.is_empty());
    assert_eq!(payload.contacts.len(), 1);
    assert_eq!(payload.temporal_coverage.start_date.as_deref(), Some("2015-10-01"));
    assert!(payload.temporal_coverage.end_date.is_none());
    assert!(payload.spatial_coverage.is_some());
    assert_eq!(payload.resources[1].size, json!("512"));

    assert_eq!(
        find_missing_metadata(payload),
        vec!["At least one creator", "Temporal end date"]
    );

    assert_eq!(resource_filename(&payload.resources[0]), "snow_depth_2015_2020.csv");
    assert_eq!(resource_filename(&payload.resources[1]), "res-2");

    assert_eq!(
        inspection.summary.lines().collect::<Vec<_>>(),
        vec![
            "Title: Snow depth at Gothic, CO",
            "Keywords: snow, cryosphere",
            "Creators: none",
            "Contacts: RMBL Data",
            "Temporal: {\"startDate\":\"2015-10-01\",\"endDate\":null}",
            "Resources: 2",
        ]
    );
    Ok(())
}

#[test]
fn test_payload_json_keeps_extras_for_traceability() -> Result<()> {
    let package: SourcePackage = serde_json::from_value(json!({
        "name": "p",
        "extras": [
            {"key": "doi", "value": "10.1234/abcd"},
            {"key": "doi", "value": "10.1234/efgh"},
            {"key": "bbox", "value": "-1,-1,1,1"}
        ]
    }))?;

    let body = serde_json::to_value(inspect_package(&package).payload)?;

    assert_eq!(body["extras"], json!({"bbox": "-1,-1,1,1", "doi": "10.1234/efgh"}));
    assert_eq!(body["spatialCoverage"], json!("-1,-1,1,1"));
    assert_eq!(body["sourceCkanName"], json!("p"));
    assert!(body["sourceCkanId"].is_null());
    Ok(())
}
