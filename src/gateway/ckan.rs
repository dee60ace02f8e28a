use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::constants::{ACTION_PACKAGE_SEARCH, ACTION_PACKAGE_SHOW};
use crate::error::{MigrationError, Result};
use crate::infra::http_client::HttpClient;
use crate::observability::metrics;
use crate::types::SourcePackage;

/// Read-only access to a CKAN catalog's action API
pub struct CkanGateway {
    http: HttpClient,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl CkanGateway {
    pub fn new(http: HttpClient, base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Calls `GET {base}/api/3/action/{action}` and unwraps the
    /// `{success, result}` envelope.
    #[instrument(skip(self, params))]
    pub async fn request(&self, action: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/api/3/action/{}", self.base_url, action);
        let outcome = self
            .http
            .get_json(&url, params, &self.api_key, self.timeout)
            .await;
        metrics::catalog_request(action, outcome.is_ok());

        unwrap_envelope(action, outcome?)
    }

    /// Packages matching `search` (all packages when `None`), at most `limit`.
    pub async fn list_packages(&self, search: Option<&str>, limit: u32) -> Result<Vec<SourcePackage>> {
        let mut params = vec![("rows", limit.to_string())];
        if let Some(q) = search.filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }

        let result = self.request(ACTION_PACKAGE_SEARCH, &params).await?;
        let packages = match result.get("results") {
            Some(results) if !results.is_null() => {
                serde_json::from_value::<Vec<SourcePackage>>(results.clone())?
            }
            _ => Vec::new(),
        };
        info!("CKAN search returned {} packages", packages.len());
        Ok(packages)
    }

    /// One package by id or name. A `success: false` answer becomes
    /// `PackageNotFound`; HTTP failures stay `Transport`.
    pub async fn get_package(&self, name_or_id: &str) -> Result<SourcePackage> {
        let params = [("id", name_or_id.to_string())];
        let result = self
            .request(ACTION_PACKAGE_SHOW, &params)
            .await
            .map_err(|err| match err {
                MigrationError::Protocol { action, envelope } => {
                    debug!("{} rejected {}: {}", action, name_or_id, envelope);
                    MigrationError::PackageNotFound {
                        name_or_id: name_or_id.to_string(),
                        action,
                        envelope,
                    }
                }
                other => other,
            })?;
        Ok(serde_json::from_value(result)?)
    }
}

fn unwrap_envelope(action: &str, mut envelope: Value) -> Result<Value> {
    let succeeded = envelope
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !succeeded {
        return Err(MigrationError::Protocol {
            action: action.to_string(),
            envelope,
        });
    }
    Ok(envelope
        .get_mut("result")
        .map(Value::take)
        .unwrap_or(Value::Null))
}
