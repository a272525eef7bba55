//! Error types for the split-DNS synchronizer
//!
//! One taxonomy serves the whole workspace. Config, auth, and URL errors
//! are always fatal; resolution and update errors are fatal to the current
//! cycle only, and the daemon loop logs them and keeps ticking.

use thiserror::Error;

/// Result type alias for synchronizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the split-DNS synchronizer
#[derive(Error, Debug)]
pub enum Error {
    /// Config file unreadable, or not a JSON mapping of domain to
    /// reference list
    #[error("config error: {0}")]
    Config(String),

    /// No usable credentials were supplied
    #[error("auth configuration error: {0}")]
    AuthConfig(String),

    /// The API base URL could not be parsed
    #[error("invalid base URL: {0}")]
    Url(String),

    /// Fetching the device inventory failed
    #[error("listing devices: {0}")]
    DeviceList(String),

    /// A `device:` reference did not resolve to an address
    #[error("resolving device {hostname}: {reason}")]
    DeviceResolution {
        /// Hostname as written in the reference, prefix stripped
        hostname: String,
        /// What went wrong
        reason: String,
    },

    /// A `svc:` reference did not resolve to an address
    #[error("resolving service {reference}: {reason}")]
    ServiceResolution {
        /// Full reference as written in the config
        reference: String,
        /// What went wrong
        reason: String,
    },

    /// Submitting the split-DNS table failed
    #[error("updating split DNS: {0}")]
    Update(String),

    /// The API answered with a non-success status
    #[error("API returned status {code}: {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Response body, if any
        message: String,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an auth configuration error
    pub fn auth_config(msg: impl Into<String>) -> Self {
        Self::AuthConfig(msg.into())
    }

    /// Create a base-URL error
    pub fn url(msg: impl Into<String>) -> Self {
        Self::Url(msg.into())
    }

    /// Create a device-list error
    pub fn device_list(msg: impl Into<String>) -> Self {
        Self::DeviceList(msg.into())
    }

    /// Create a device resolution error
    pub fn device_resolution(hostname: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DeviceResolution {
            hostname: hostname.into(),
            reason: reason.into(),
        }
    }

    /// Create a service resolution error
    pub fn service_resolution(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ServiceResolution {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create an update error
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }

    /// Create an API status error
    pub fn api(code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}
