// src/infra/errors.rs — Error types for recipe-sweep

use thiserror::Error;

/// Errors raised while talking to the DSS public API.
#[derive(Error, Debug)]
pub enum DssError {
    #[error("DSS API {method} {path} returned {status}: {body}")]
    Api {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid instance URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Project folder '{0}' not found under the root folder")]
    FolderNotFound(String),

    #[error("Recipe '{project_key}.{recipe}' has no outputs to build")]
    NoOutputs { project_key: String, recipe: String },

    #[error("Unexpected response from {path}: {message}")]
    Decode { path: String, message: String },
}

impl DssError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            DssError::Api { status, .. } => Some(*status),
            DssError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors raised while loading the settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("No API key configured. Add `api-key: <key>` to {path} or set DSS_API_KEY.")]
    MissingApiKey { path: String },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error("Invalid setting '{key}': {message}")]
    Invalid { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
