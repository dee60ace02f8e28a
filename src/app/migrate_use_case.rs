use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::gateway::{CkanGateway, EssDiveGateway, SubmissionOutcome};
use crate::infra::http_client::HttpClient;
use crate::infra::tapis::TapisFiles;
use crate::pipeline::mapper::map_package;
use crate::pipeline::quality_gate::{find_missing_fields, RequiredField};
use crate::pipeline::stager::{ResourceStager, StagedFile};
use crate::pipeline::summary::summarize_payload;
use crate::types::{DestinationPayload, SourcePackage};

/// Knobs for a single package migration
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrateOptions {
    /// Download (and forward) resources before submitting
    pub stage_files: bool,
    /// Withhold submission while required fields are missing
    pub require_complete: bool,
}

/// A mapped package with its review artifacts
#[derive(Debug, Clone, Serialize)]
pub struct PackageInspection {
    pub payload: DestinationPayload,
    pub missing: Vec<RequiredField>,
    pub summary: String,
}

/// Outcome of one migration run
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub source: String,
    pub missing: Vec<RequiredField>,
    pub staged: Vec<StagedFile>,
    /// `None` when the submission was withheld for missing metadata
    pub submission: Option<SubmissionOutcome>,
}

/// CKAN -> ESS-DIVE flow: fetch, map, check, stage, submit.
pub struct MigrateUseCase {
    ckan: CkanGateway,
    essdive: EssDiveGateway,
    stager: ResourceStager,
}

impl MigrateUseCase {
    pub fn new(ckan: CkanGateway, essdive: EssDiveGateway, stager: ResourceStager) -> Self {
        Self {
            ckan,
            essdive,
            stager,
        }
    }

    /// Wires the gateways and stager from configuration. The Tapis uploader
    /// is attached only when the bridge is enabled.
    pub fn from_config(config: &MigrationConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::new()?;
        let timeouts = config.timeouts;

        let ckan = CkanGateway::new(http.clone(), &config.ckan_url, &config.ckan_key, timeouts.catalog);
        let essdive = EssDiveGateway::new(
            http.clone(),
            &config.ess_url,
            &config.ess_token,
            config.dry_run,
            timeouts.submit,
        );

        let mut stager = ResourceStager::new(
            http.clone(),
            config.local_stage.clone(),
            &config.ckan_key,
            timeouts.download,
        );
        if let Some(files) = TapisFiles::from_integration(&config.bridge(), &http, timeouts.download) {
            stager = stager.with_remote(Box::new(files));
        }

        Ok(Self::new(ckan, essdive, stager))
    }

    pub fn ckan(&self) -> &CkanGateway {
        &self.ckan
    }

    pub fn stager(&self) -> &ResourceStager {
        &self.stager
    }

    pub fn essdive(&self) -> &EssDiveGateway {
        &self.essdive
    }

    pub async fn list_packages(&self, search: Option<&str>, limit: u32) -> Result<Vec<SourcePackage>> {
        self.ckan.list_packages(search, limit).await
    }

    /// Fetches and maps a package without touching files or ESS-DIVE.
    pub async fn inspect(&self, name_or_id: &str) -> Result<PackageInspection> {
        let package = self.ckan.get_package(name_or_id).await?;
        Ok(inspect_package(&package))
    }

    pub async fn stage(&self, name_or_id: &str) -> Result<Vec<StagedFile>> {
        let inspection = self.inspect(name_or_id).await?;
        Ok(self.stager.stage_resources(&inspection.payload).await)
    }

    /// Runs the whole flow for one package.
    ///
    /// Fetch and submission errors propagate; staging failures only show up
    /// as missing entries in the report.
    pub async fn migrate(&self, name_or_id: &str, options: MigrateOptions) -> Result<MigrationReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("migrate", %run_id, package = %name_or_id);

        async move {
            let started_at = Utc::now();
            let inspection = self.inspect(name_or_id).await?;
            let source = inspection
                .payload
                .source_ckan_name
                .clone()
                .unwrap_or_else(|| name_or_id.to_string());

            if !inspection.missing.is_empty() {
                let labels: Vec<&str> = inspection.missing.iter().map(RequiredField::label).collect();
                warn!("Missing ESS-DIVE metadata: {}", labels.join(", "));
            }

            let staged = if options.stage_files {
                self.stager.stage_resources(&inspection.payload).await
            } else {
                Vec::new()
            };

            let submission = if options.require_complete && !inspection.missing.is_empty() {
                warn!("Submission withheld until required metadata is filled in");
                None
            } else {
                Some(self.essdive.submit(&inspection.payload).await?)
            };

            info!("Migration finished");
            Ok(MigrationReport {
                run_id,
                started_at,
                source,
                missing: inspection.missing,
                staged,
                submission,
            })
        }
        .instrument(span)
        .await
    }
}

/// Map, check and summarize an already-fetched package.
pub fn inspect_package(package: &SourcePackage) -> PackageInspection {
    let payload = map_package(package);
    let missing = find_missing_fields(&payload);
    let summary = summarize_payload(&payload);
    PackageInspection {
        payload,
        missing,
        summary,
    }
}
