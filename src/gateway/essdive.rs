use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};

use crate::error::{MigrationError, Result};
use crate::infra::http_client::HttpClient;
use crate::observability::metrics;
use crate::types::DestinationPayload;

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// No request was made
    Skipped { reason: String },
    /// ESS-DIVE accepted the dataset; holds its response body
    Submitted { response: Value },
}

pub const DRY_RUN_REASON: &str = "dry_run_enabled";

/// Writes datasets to ESS-DIVE
pub struct EssDiveGateway {
    http: HttpClient,
    base_url: String,
    token: String,
    dry_run: bool,
    timeout: Duration,
}

impl EssDiveGateway {
    pub fn new(http: HttpClient, base_url: &str, token: &str, dry_run: bool, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            dry_run,
            timeout,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// POSTs the payload to `{base}/datasets`.
    ///
    /// In dry-run mode nothing is sent. A live submission without a token
    /// fails before any request is made.
    #[instrument(skip(self, payload), fields(source = ?payload.source_ckan_name))]
    pub async fn submit(&self, payload: &DestinationPayload) -> Result<SubmissionOutcome> {
        if self.dry_run {
            info!("Dry run enabled; not submitting to ESS-DIVE");
            metrics::submission_skipped();
            return Ok(SubmissionOutcome::Skipped {
                reason: DRY_RUN_REASON.to_string(),
            });
        }
        if self.token.is_empty() {
            return Err(MigrationError::Authorization(
                "ESS-DIVE token is required to write".to_string(),
            ));
        }

        let url = format!("{}/datasets", self.base_url);
        let response = self
            .http
            .post_json(&url, payload, &self.token, self.timeout)
            .await?;
        metrics::submission_accepted();
        info!("ESS-DIVE accepted dataset");
        Ok(SubmissionOutcome::Submitted { response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(token: &str, dry_run: bool) -> EssDiveGateway {
        // Port 9 (discard) is never contacted by these tests.
        EssDiveGateway::new(
            HttpClient::new().unwrap(),
            "http://127.0.0.1:9/",
            token,
            dry_run,
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn dry_run_returns_skipped_sentinel() {
        let outcome = gateway("", true)
            .submit(&DestinationPayload::default())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Skipped {
                reason: DRY_RUN_REASON.to_string()
            }
        );
    }

    #[tokio::test]
    async fn live_submission_without_token_is_unauthorized() {
        let err = gateway("   ", false)
            .submit(&DestinationPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Authorization(_)));
    }

    #[test]
    fn skipped_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(SubmissionOutcome::Skipped {
            reason: DRY_RUN_REASON.to_string(),
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({"status": "skipped", "reason": "dry_run_enabled"}));
    }
}
