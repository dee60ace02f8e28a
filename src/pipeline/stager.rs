use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::app::ports::RemoteStorePort;
use crate::constants::FALLBACK_RESOURCE_NAME;
use crate::error::{MigrationError, Result};
use crate::infra::http_client::HttpClient;
use crate::observability::metrics;
use crate::types::{non_empty, DestinationPayload, ResourceDescriptor};

/// A resource that made it onto local disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedFile {
    pub resource_id: Option<String>,
    pub path: PathBuf,
    pub bytes: u64,
    /// Remote location when the file was also forwarded through the bridge
    pub remote_path: Option<String>,
}

/// Downloads a payload's resources into a local staging directory and,
/// when a remote store is attached, forwards each staged file.
pub struct ResourceStager {
    http: HttpClient,
    stage_dir: PathBuf,
    api_key: String,
    timeout: Duration,
    remote: Option<Box<dyn RemoteStorePort>>,
}

impl ResourceStager {
    pub fn new(http: HttpClient, stage_dir: impl Into<PathBuf>, api_key: &str, timeout: Duration) -> Self {
        Self {
            http,
            stage_dir: stage_dir.into(),
            api_key: api_key.to_string(),
            timeout,
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteStorePort>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn stage_dir(&self) -> &Path {
        &self.stage_dir
    }

    /// Stages every resource, skipping the ones that fail.
    ///
    /// A failed download is logged and left out of the result; it never
    /// stops the remaining resources. A failed forward is logged and the
    /// local file is still reported, with no `remote_path`.
    #[instrument(skip(self, payload), fields(source = ?payload.source_ckan_name, resources = payload.resources.len()))]
    pub async fn stage_resources(&self, payload: &DestinationPayload) -> Vec<StagedFile> {
        let mut staged = Vec::new();

        for resource in &payload.resources {
            let label = resource_label(resource);
            let mut file = match self.download_resource(resource).await {
                Ok(file) => file,
                Err(err) => {
                    warn!("Could not stage {}: {}", label, err);
                    metrics::staging_failed();
                    continue;
                }
            };
            metrics::file_staged(file.bytes);

            if let Some(remote) = &self.remote {
                let file_name = resource_filename(resource);
                match remote.upload(&file.path, &file_name).await {
                    Ok(location) => {
                        metrics::file_forwarded();
                        file.remote_path = Some(location);
                    }
                    Err(err) => {
                        warn!("Could not forward {}: {}", label, err);
                        metrics::forwarding_failed();
                    }
                }
            }
            staged.push(file);
        }

        info!("Staged {} of {} resources", staged.len(), payload.resources.len());
        staged
    }

    /// Streams one resource into the staging directory, overwriting any
    /// file already at the derived path.
    pub async fn download_resource(&self, resource: &ResourceDescriptor) -> Result<StagedFile> {
        let url = non_empty(&resource.url)
            .ok_or_else(|| MigrationError::Input("Resource has no URL to download".to_string()))?;

        let path = self.stage_dir.join(resource_filename(resource));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = self
            .http
            .download_to(url, &path, &self.api_key, self.timeout)
            .await?;

        Ok(StagedFile {
            resource_id: resource.id.clone(),
            path,
            bytes,
            remote_path: None,
        })
    }
}

/// Local filename for a resource: its name, else its id, else a generic
/// name, with the URL's extension appended unless already present.
pub fn resource_filename(resource: &ResourceDescriptor) -> String {
    let base = non_empty(&resource.name)
        .or_else(|| non_empty(&resource.id))
        .unwrap_or(FALLBACK_RESOURCE_NAME);
    let name = sanitize(base);

    match non_empty(&resource.url).and_then(url_suffix) {
        Some(suffix) if !name.ends_with(&suffix) => format!("{}{}", name, suffix),
        _ => name,
    }
}

/// `.ext` of the last path segment of `url`, query and fragment ignored.
fn url_suffix(url: &str) -> Option<String> {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(&['?', '#'][..]).next().unwrap_or(url).to_string(),
    };
    let segment = path.rsplit('/').next()?;
    Path::new(segment)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
}

/// Keeps resource names from escaping the staging directory.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "." | ".." => FALLBACK_RESOURCE_NAME.to_string(),
        _ => cleaned,
    }
}

fn resource_label(resource: &ResourceDescriptor) -> String {
    non_empty(&resource.name)
        .or_else(|| non_empty(&resource.id))
        .unwrap_or("<unnamed resource>")
        .to_string()
}
