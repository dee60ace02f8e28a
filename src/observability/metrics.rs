//! Migration counters, recorded through the `metrics` facade.
//!
//! Nothing is exported unless the embedding program installs a recorder.

use std::fmt;

/// Every metric the migration emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    CatalogRequestsSuccess,
    CatalogRequestsError,
    StagingFilesStaged,
    StagingBytesStaged,
    StagingFailures,
    BridgeFilesForwarded,
    BridgeForwardFailures,
    SubmissionsAccepted,
    SubmissionsSkipped,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::CatalogRequestsSuccess => "ckan_essdive_catalog_requests_success_total",
            MetricName::CatalogRequestsError => "ckan_essdive_catalog_requests_error_total",
            MetricName::StagingFilesStaged => "ckan_essdive_staging_files_total",
            MetricName::StagingBytesStaged => "ckan_essdive_staging_bytes_total",
            MetricName::StagingFailures => "ckan_essdive_staging_failures_total",
            MetricName::BridgeFilesForwarded => "ckan_essdive_bridge_files_forwarded_total",
            MetricName::BridgeForwardFailures => "ckan_essdive_bridge_forward_failures_total",
            MetricName::SubmissionsAccepted => "ckan_essdive_submissions_accepted_total",
            MetricName::SubmissionsSkipped => "ckan_essdive_submissions_skipped_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            CatalogRequestsSuccess,
            CatalogRequestsError,
            StagingFilesStaged,
            StagingBytesStaged,
            StagingFailures,
            BridgeFilesForwarded,
            BridgeForwardFailures,
            SubmissionsAccepted,
            SubmissionsSkipped,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn catalog_request(action: &str, ok: bool) {
    let metric_name = if ok {
        MetricName::CatalogRequestsSuccess
    } else {
        MetricName::CatalogRequestsError
    };
    ::metrics::counter!(metric_name.as_str(), "action" => action.to_string()).increment(1);
}

pub fn file_staged(bytes: u64) {
    ::metrics::counter!(MetricName::StagingFilesStaged.as_str()).increment(1);
    ::metrics::counter!(MetricName::StagingBytesStaged.as_str()).increment(bytes);
}

pub fn staging_failed() {
    ::metrics::counter!(MetricName::StagingFailures.as_str()).increment(1);
}

pub fn file_forwarded() {
    ::metrics::counter!(MetricName::BridgeFilesForwarded.as_str()).increment(1);
}

pub fn forwarding_failed() {
    ::metrics::counter!(MetricName::BridgeForwardFailures.as_str()).increment(1);
}

pub fn submission_accepted() {
    ::metrics::counter!(MetricName::SubmissionsAccepted.as_str()).increment(1);
}

pub fn submission_skipped() {
    ::metrics::counter!(MetricName::SubmissionsSkipped.as_str()).increment(1);
}
