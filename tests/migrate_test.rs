use anyhow::Result;
use ckan_essdive::app::{MigrateOptions, MigrateUseCase};
use ckan_essdive::gateway::essdive::DRY_RUN_REASON;
use ckan_essdive::gateway::{EssDiveGateway, SubmissionOutcome};
use ckan_essdive::infra::http_client::HttpClient;
use ckan_essdive::pipeline::{map_package, RequiredField};
use ckan_essdive::{MigrationConfig, MigrationError, SourcePackage};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn complete_package(server_uri: &str) -> Value {
    json!({
        "id": "7f3c",
        "name": "east-river-soil",
        "title": "East River soil moisture",
        "notes": "Hourly soil moisture at 10 cm.",
        "author": "A. Curator",
        "author_email": "curator@example.org",
        "maintainer": "Data Desk",
        "maintainer_email": "desk@example.org",
        "tags": [{"display_name": "soil"}],
        "groups": [{"name": "watershed"}],
        "extras": [
            {"key": "temporal_start", "value": "2019-01-01"},
            {"key": "temporal_end", "value": "2020-12-31"}
        ],
        "resources": [
            {"id": "r1", "name": "readings", "url": format!("{}/files/readings.csv", server_uri),
             "format": "CSV", "size": 8}
        ]
    })
}

async fn mount_package(server: &MockServer, package: Value) {
    Mock::given(method("GET"))
        .and(path("/api/3/action/package_show"))
        .and(query_param("id", "east-river-soil"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": package
        })))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer, stage_dir: &std::path::Path) -> MigrationConfig {
    MigrationConfig::new(&server.uri(), &server.uri())
        .with_ess_token("ess-token")
        .with_local_stage(stage_dir.to_string_lossy())
}

#[tokio::test]
async fn live_submission_posts_the_payload_with_bearer_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .and(header("Authorization", "Bearer ess-token"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "title": "East River soil moisture",
            "sourceCkanName": "east-river-soil",
            "temporalCoverage": {"startDate": "2019-01-01", "endDate": "2020-12-31"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "ess-dive-123"})))
        .expect(1)
        .mount(&server)
        .await;

    let package: SourcePackage = serde_json::from_value(complete_package(&server.uri()))?;
    let gateway = EssDiveGateway::new(HttpClient::new()?, &server.uri(), "ess-token", false, Duration::from_secs(5));

    let outcome = gateway.submit(&map_package(&package)).await?;

    assert_eq!(
        outcome,
        SubmissionOutcome::Submitted {
            response: json!({"id": "ess-dive-123"})
        }
    );
    Ok(())
}

#[tokio::test]
async fn rejected_submission_surfaces_status_and_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(422).set_body_string("creators: required"))
        .mount(&server)
        .await;

    let gateway = EssDiveGateway::new(HttpClient::new()?, &server.uri(), "ess-token", false, Duration::from_secs(5));
    let err = gateway
        .submit(&Default::default())
        .await
        .unwrap_err();

    match err {
        MigrationError::Transport { status, body, url } => {
            assert_eq!(status, 422);
            assert_eq!(body, "creators: required");
            assert!(url.ends_with("/datasets"));
        }
        other => panic!("expected transport error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn dry_run_migration_stages_files_but_never_posts() -> Result<()> {
    let server = MockServer::start().await;
    mount_package(&server, complete_package(&server.uri())).await;
    Mock::given(method("GET"))
        .and(path("/files/readings.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a,b\n1,2\n"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir()?;
    let use_case = MigrateUseCase::from_config(&config_for(&server, dir.path()))?;
    let report = use_case
        .migrate(
            "east-river-soil",
            MigrateOptions {
                stage_files: true,
                require_complete: false,
            },
        )
        .await?;

    assert_eq!(report.source, "east-river-soil");
    assert!(report.missing.is_empty());
    assert_eq!(report.staged.len(), 1);
    assert_eq!(report.staged[0].path, dir.path().join("readings.csv"));
    assert_eq!(
        report.submission,
        Some(SubmissionOutcome::Skipped {
            reason: DRY_RUN_REASON.to_string()
        })
    );
    Ok(())
}

#[tokio::test]
async fn incomplete_package_is_withheld_when_completeness_is_required() -> Result<()> {
    let server = MockServer::start().await;
    mount_package(
        &server,
        json!({"id": "7f3c", "name": "east-river-soil", "tags": [{"display_name": "soil"}]}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir()?;
    let config = config_for(&server, dir.path()).with_dry_run(false);
    let report = MigrateUseCase::from_config(&config)?
        .migrate(
            "east-river-soil",
            MigrateOptions {
                stage_files: false,
                require_complete: true,
            },
        )
        .await?;

    assert!(report.submission.is_none());
    assert!(report.staged.is_empty());
    assert_eq!(report.missing.first(), Some(&RequiredField::Description));
    assert_eq!(report.missing.last(), Some(&RequiredField::TemporalEnd));
    Ok(())
}

#[tokio::test]
async fn live_migration_without_token_fails_before_posting() -> Result<()> {
    let server = MockServer::start().await;
    mount_package(&server, complete_package(&server.uri())).await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir()?;
    let config = config_for(&server, dir.path())
        .with_ess_token("")
        .with_dry_run(false);
    let err = MigrateUseCase::from_config(&config)?
        .migrate("east-river-soil", MigrateOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::Authorization(_)));
    Ok(())
}

#[cfg(feature = "bridge")]
#[tokio::test]
async fn tapis_token_exchange_returns_the_access_token() -> Result<()> {
    use ckan_essdive::infra::tapis::fetch_token;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/oauth2/tokens"))
        .and(body_partial_json(json!({
            "username": "curator",
            "password": "hunter2",
            "grant_type": "password"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "result": {"access_token": {"access_token": "jwt-abc", "expires_in": 14400}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = fetch_token(
        &HttpClient::new()?,
        &server.uri(),
        "curator",
        "hunter2",
        Duration::from_secs(5),
    )
    .await?;

    assert_eq!(token, "jwt-abc");
    Ok(())
}

#[cfg(feature = "bridge")]
#[tokio::test]
async fn tapis_response_without_token_is_a_protocol_error() {
    use ckan_essdive::infra::tapis::fetch_token;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/oauth2/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error"})))
        .mount(&server)
        .await;

    let err = fetch_token(
        &HttpClient::new().unwrap(),
        &server.uri(),
        "curator",
        "wrong",
        Duration::from_secs(5),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, MigrationError::Protocol { .. }));
}
