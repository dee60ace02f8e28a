use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    /// A call was made without something it cannot work without,
    /// e.g. a resource that has no URL.
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Transport { status: u16, url: String, body: String },

    /// CKAN answered 2xx but reported `success: false`.
    #[error("CKAN call {action} failed: {envelope}")]
    Protocol {
        action: String,
        envelope: serde_json::Value,
    },

    /// `package_show` answered `success: false` for this id or name.
    #[error("CKAN package not found: {name_or_id} ({action}: {envelope})")]
    PackageNotFound {
        name_or_id: String,
        action: String,
        envelope: serde_json::Value,
    },

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    /// Network failures and non-success HTTP statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, MigrationError::Http(_) | MigrationError::Transport { .. })
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
