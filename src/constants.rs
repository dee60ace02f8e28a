/// Client identification sent with every outbound request
pub const USER_AGENT: &str = "ckan-to-ess-dive-notebook";

// Per-call-class timeouts, in seconds
pub const CATALOG_TIMEOUT_SECS: u64 = 60;
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 300;
pub const SUBMIT_TIMEOUT_SECS: u64 = 90;
pub const BRIDGE_TIMEOUT_SECS: u64 = 60;

/// Write buffer used while streaming a resource to disk (512 KiB)
pub const DOWNLOAD_CHUNK_SIZE: usize = 512 * 1024;

pub const DEFAULT_PACKAGE_LIMIT: u32 = 40;
pub const DEFAULT_STAGING_DIR: &str = "./staging";
pub const DEFAULT_TAPIS_BASE_URL: &str = "https://portals.tapis.io";

/// Filename used when a resource has neither a name nor an id
pub const FALLBACK_RESOURCE_NAME: &str = "resource";

// CKAN action names
pub const ACTION_PACKAGE_SEARCH: &str = "package_search";
pub const ACTION_PACKAGE_SHOW: &str = "package_show";

// Extras keys consulted by the mapper, in priority order
pub const TEMPORAL_START_KEYS: [&str; 2] = ["temporal_start", "time_start"];
pub const TEMPORAL_END_KEYS: [&str; 2] = ["temporal_end", "time_end"];
pub const SPATIAL_KEYS: [&str; 2] = ["spatial", "bbox"];

// Environment overrides
pub const ENV_CKAN_URL: &str = "CKAN_URL";
pub const ENV_CKAN_API_KEY: &str = "CKAN_API_KEY";
pub const ENV_ESSDIVE_URL: &str = "ESSDIVE_URL";
pub const ENV_ESSDIVE_TOKEN: &str = "ESSDIVE_TOKEN";
pub const ENV_ESSDIVE_DRY_RUN: &str = "ESSDIVE_DRY_RUN";
pub const ENV_STAGING_DIR: &str = "STAGING_DIR";
pub const ENV_TAPIS_BASE_URL: &str = "TAPIS_BASE_URL";
pub const ENV_TAPIS_TOKEN: &str = "TAPIS_TOKEN";
pub const ENV_TAPIS_SYSTEM: &str = "TAPIS_SYSTEM";
pub const ENV_TAPIS_PATH: &str = "TAPIS_PATH";
