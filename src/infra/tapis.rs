//! Tapis bridge: password-grant token exchange and file uploads.
//!
//! The network client only exists in builds with the `bridge` feature.
//! Without it both operations fail with a configuration error so callers
//! can tell "not configured" apart from "not available".

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::app::ports::RemoteStorePort;
use crate::config::{BridgeConfig, BridgeIntegration};
use crate::error::{MigrationError, Result};
use crate::infra::http_client::HttpClient;

pub const TOKEN_HEADER: &str = "X-Tapis-Token";

/// Exchanges Tapis credentials for an access token.
///
/// CKAN deployments fronted by Tapis accept this token as their API key;
/// storing it is left to the caller.
#[cfg(feature = "bridge")]
pub async fn fetch_token(
    http: &HttpClient,
    base_url: &str,
    username: &str,
    password: &str,
    timeout: Duration,
) -> Result<String> {
    use serde_json::json;

    let url = format!("{}/v3/oauth2/tokens", base_url.trim_end_matches('/'));
    let body = json!({
        "username": username,
        "password": password,
        "grant_type": "password",
    });
    let response = http.post_json_anonymous(&url, &body, timeout).await?;

    response
        .pointer("/result/access_token/access_token")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| MigrationError::Protocol {
            action: "tapis token exchange".to_string(),
            envelope: response.clone(),
        })
}

#[cfg(not(feature = "bridge"))]
pub async fn fetch_token(
    _http: &HttpClient,
    _base_url: &str,
    _username: &str,
    _password: &str,
    _timeout: Duration,
) -> Result<String> {
    Err(unavailable())
}

#[cfg(not(feature = "bridge"))]
fn unavailable() -> MigrationError {
    MigrationError::Config(
        "Tapis bridge support is not compiled in; rebuild with the `bridge` feature".to_string(),
    )
}

/// Uploads into `{target_path}/{file_name}` on a Tapis storage system
pub struct TapisFiles {
    http: HttpClient,
    config: BridgeConfig,
    timeout: Duration,
}

impl TapisFiles {
    pub fn new(http: HttpClient, config: BridgeConfig, timeout: Duration) -> Self {
        Self { http, config, timeout }
    }

    /// Builds the uploader when the bridge is enabled for this run.
    pub fn from_integration(
        integration: &BridgeIntegration,
        http: &HttpClient,
        timeout: Duration,
    ) -> Option<Self> {
        match integration {
            BridgeIntegration::Enabled(config) => {
                Some(Self::new(http.clone(), config.clone(), timeout))
            }
            BridgeIntegration::Disabled => None,
        }
    }

    pub fn remote_path(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.config.target_path.trim_end_matches('/'),
            file_name
        )
    }
}

#[async_trait]
impl RemoteStorePort for TapisFiles {
    async fn upload(&self, local: &Path, file_name: &str) -> Result<String> {
        let remote = self.remote_path(file_name);
        self.post_file(local, file_name, &remote).await?;
        tracing::info!("Uploaded {} to {}:{}", local.display(), self.config.system_id, remote);
        Ok(remote)
    }
}

impl TapisFiles {
    #[cfg(feature = "bridge")]
    async fn post_file(&self, local: &Path, file_name: &str, remote: &str) -> Result<()> {
        use reqwest::multipart::{Form, Part};

        let url = format!(
            "{}/v3/files/ops/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.system_id,
            remote.trim_start_matches('/')
        );
        let bytes = tokio::fs::read(local).await?;
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let request = self
            .http
            .request(reqwest::Method::POST, &url)
            .header(TOKEN_HEADER, self.config.token.as_str())
            .multipart(form)
            .timeout(self.timeout);
        crate::infra::http_client::send(request, &url).await?;
        Ok(())
    }

    #[cfg(not(feature = "bridge"))]
    async fn post_file(&self, _local: &Path, _file_name: &str, _remote: &str) -> Result<()> {
        Err(unavailable())
    }
}
