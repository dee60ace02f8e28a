use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::constants::*;
use crate::error::{MigrationError, Result};

/// Everything a migration run needs to reach CKAN, ESS-DIVE and (optionally)
/// the Tapis bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationConfig {
    pub ckan_url: String,
    pub ckan_key: String,
    pub ess_url: String,
    pub ess_token: String,
    pub local_stage: PathBuf,
    /// Destination submission is a no-op unless this is switched off
    pub dry_run: bool,
    pub tapis_base: Option<String>,
    pub tapis_token: Option<String>,
    pub tapis_system: Option<String>,
    pub tapis_path: Option<String>,
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub catalog: Duration,
    pub download: Duration,
    pub submit: Duration,
    pub bridge: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            catalog: Duration::from_secs(CATALOG_TIMEOUT_SECS),
            download: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
            submit: Duration::from_secs(SUBMIT_TIMEOUT_SECS),
            bridge: Duration::from_secs(BRIDGE_TIMEOUT_SECS),
        }
    }
}

/// Settings for forwarding staged files to a Tapis storage system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub base_url: String,
    pub token: String,
    pub system_id: String,
    pub target_path: String,
}

/// Whether remote forwarding through the bridge is available for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeIntegration {
    Enabled(BridgeConfig),
    Disabled,
}

impl BridgeIntegration {
    pub fn is_enabled(&self) -> bool {
        matches!(self, BridgeIntegration::Enabled(_))
    }
}

impl MigrationConfig {
    pub fn new(ckan_url: &str, ess_url: &str) -> Self {
        Self {
            ckan_url: trim_base(ckan_url),
            ckan_key: String::new(),
            ess_url: trim_base(ess_url),
            ess_token: String::new(),
            local_stage: expand_home(DEFAULT_STAGING_DIR),
            dry_run: true,
            tapis_base: None,
            tapis_token: None,
            tapis_system: None,
            tapis_path: None,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_ckan_key(mut self, key: impl Into<String>) -> Self {
        self.ckan_key = key.into();
        self
    }

    pub fn with_ess_token(mut self, token: impl Into<String>) -> Self {
        self.ess_token = token.into();
        self
    }

    pub fn with_local_stage(mut self, dir: impl AsRef<str>) -> Self {
        self.local_stage = expand_home(dir.as_ref());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_tapis(
        mut self,
        base_url: &str,
        token: impl Into<String>,
        system_id: impl Into<String>,
        target_path: impl Into<String>,
    ) -> Self {
        self.tapis_base = Some(trim_base(base_url));
        self.tapis_token = Some(token.into());
        self.tapis_system = Some(system_id.into());
        self.tapis_path = Some(target_path.into());
        self
    }

    /// Reads `path` as TOML. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MigrationError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.into_config())
    }

    /// Applies environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_CKAN_URL) {
            self.ckan_url = trim_base(&v);
        }
        if let Some(v) = lookup(ENV_CKAN_API_KEY) {
            self.ckan_key = v;
        }
        if let Some(v) = lookup(ENV_ESSDIVE_URL) {
            self.ess_url = trim_base(&v);
        }
        if let Some(v) = lookup(ENV_ESSDIVE_TOKEN) {
            self.ess_token = v;
        }
        if let Some(v) = lookup(ENV_STAGING_DIR) {
            self.local_stage = expand_home(&v);
        }
        if let Some(v) = lookup(ENV_ESSDIVE_DRY_RUN) {
            match parse_flag(&v) {
                Some(flag) => self.dry_run = flag,
                None => warn!("Ignoring unrecognised {}={}", ENV_ESSDIVE_DRY_RUN, v),
            }
        }
        if let Some(v) = lookup(ENV_TAPIS_BASE_URL) {
            self.tapis_base = Some(trim_base(&v));
        }
        if let Some(v) = lookup(ENV_TAPIS_TOKEN) {
            self.tapis_token = Some(v);
        }
        if let Some(v) = lookup(ENV_TAPIS_SYSTEM) {
            self.tapis_system = Some(v);
        }
        if let Some(v) = lookup(ENV_TAPIS_PATH) {
            self.tapis_path = Some(v);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.ckan_url.is_empty() {
            return Err(MigrationError::Config("CKAN base URL is not set".to_string()));
        }
        if self.ess_url.is_empty() {
            return Err(MigrationError::Config("ESS-DIVE base URL is not set".to_string()));
        }
        Ok(())
    }

    /// Resolves the bridge settings into a capability.
    ///
    /// A fully configured bridge is `Enabled`. In a build without the
    /// `bridge` feature its operations fail with a configuration error
    /// when used.
    pub fn bridge(&self) -> BridgeIntegration {
        let (Some(base_url), Some(token), Some(system_id), Some(target_path)) = (
            filled(&self.tapis_base),
            filled(&self.tapis_token),
            filled(&self.tapis_system),
            filled(&self.tapis_path),
        ) else {
            return BridgeIntegration::Disabled;
        };

        if !cfg!(feature = "bridge") {
            warn!("Tapis settings are present but this build has no bridge support; remote uploads will fail");
        }

        BridgeIntegration::Enabled(BridgeConfig {
            base_url: base_url.to_string(),
            token: token.to_string(),
            system_id: system_id.to_string(),
            target_path: target_path.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    ckan: CkanSection,
    essdive: EssDiveSection,
    staging: StagingSection,
    tapis: TapisSection,
    timeouts: TimeoutSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CkanSection {
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct EssDiveSection {
    url: String,
    token: String,
    dry_run: bool,
}

impl Default for EssDiveSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            dry_run: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StagingSection {
    dir: String,
}

impl Default for StagingSection {
    fn default() -> Self {
        Self {
            dir: DEFAULT_STAGING_DIR.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TapisSection {
    base_url: Option<String>,
    token: Option<String>,
    system: Option<String>,
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TimeoutSection {
    catalog_secs: Option<u64>,
    download_secs: Option<u64>,
    submit_secs: Option<u64>,
    bridge_secs: Option<u64>,
}

impl ConfigFile {
    fn into_config(self) -> MigrationConfig {
        let defaults = Timeouts::default();
        let secs = |value: Option<u64>, fallback: Duration| {
            value.map(Duration::from_secs).unwrap_or(fallback)
        };

        MigrationConfig {
            ckan_url: trim_base(&self.ckan.url),
            ckan_key: self.ckan.api_key,
            ess_url: trim_base(&self.essdive.url),
            ess_token: self.essdive.token,
            local_stage: expand_home(&self.staging.dir),
            dry_run: self.essdive.dry_run,
            tapis_base: self.tapis.base_url.as_deref().map(trim_base),
            tapis_token: self.tapis.token,
            tapis_system: self.tapis.system,
            tapis_path: self.tapis.path,
            timeouts: Timeouts {
                catalog: secs(self.timeouts.catalog_secs, defaults.catalog),
                download: secs(self.timeouts.download_secs, defaults.download),
                submit: secs(self.timeouts.submit_secs, defaults.submit),
                bridge: secs(self.timeouts.bridge_secs, defaults.bridge),
            },
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expands a leading `~` to `$HOME`.
fn expand_home(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(path.trim_start_matches('~').trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}
