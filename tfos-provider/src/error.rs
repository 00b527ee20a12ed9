//! Client error types

use thiserror::Error;
use tfos_config::ConfigError;

/// Errors that can occur while building a service client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be resolved
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The API version string is not supported for the service
    #[error("Invalid {service} API version: {version}")]
    InvalidVersion { service: String, version: String },

    /// The service name is not supported
    #[error("Unsupported service: {0}")]
    UnsupportedService(String),

    /// The catalog has no endpoint for the service
    #[error("No {interface} endpoint for service type {service_type}{}", describe_region(.region))]
    EndpointNotFound {
        service_type: String,
        region: Option<String>,
        interface: String,
    },

    /// The catalog has several distinct endpoints for the service
    #[error("Discovered {count} matching endpoints for service type {service_type}")]
    MultipleEndpoints { service_type: String, count: usize },

    /// The identity service rejected the credentials
    #[error("Authentication failed (HTTP {status}): {message}")]
    AuthFailed { status: u16, message: String },

    /// Network or transport error
    #[error("HTTP error: {0}")]
    Http(String),

    /// The identity service answered with something unexpected
    #[error("Invalid identity response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Create an invalid version error
    pub fn invalid_version(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            service: service.into(),
            version: version.into(),
        }
    }

    /// Create an unsupported service error
    pub fn unsupported_service(name: impl Into<String>) -> Self {
        Self::UnsupportedService(name.into())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

fn describe_region(region: &Option<String>) -> String {
    match region {
        Some(r) => format!(" in region {}", r),
        None => String::new(),
    }
}
