use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Somewhere staged files can be forwarded after they land locally
#[async_trait]
pub trait RemoteStorePort: Send + Sync {
    /// Uploads `local` under `file_name` and returns the remote location.
    async fn upload(&self, local: &Path, file_name: &str) -> Result<String>;
}
