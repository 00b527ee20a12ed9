//! Authenticated clients and the authentication seam

use std::fmt;

use async_trait::async_trait;
use tfos_config::{AuthOptions, Interface};

use crate::catalog::ServiceCatalog;
use crate::error::ClientResult;
use crate::services::{IdentityVersion, Service};

/// An identity token; never printed by `Debug`
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(********)")
    }
}

/// Filters applied when picking an endpoint from the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointOpts {
    pub region: Option<String>,
    pub interface: Interface,
}

/// Authenticated base client: a token plus the catalog it grants access to
#[derive(Debug, Clone)]
pub struct ProviderClient {
    /// Versioned identity URL the token was obtained from
    pub identity_endpoint: String,
    pub identity_version: IdentityVersion,
    pub token: AuthToken,
    pub catalog: ServiceCatalog,
}

/// A client bound to one service, version and region
#[derive(Debug, Clone)]
pub struct ServiceClient {
    pub service: Service,
    /// Endpoint URL as published in the catalog
    pub endpoint: String,
    /// Base URL for resource requests (endpoint plus any version path)
    pub resource_base: String,
    pub region: Option<String>,
    pub token: AuthToken,
}

impl ServiceClient {
    /// Build a resource URL from path segments
    pub fn service_url(&self, parts: &[&str]) -> String {
        format!("{}{}", self.resource_base, parts.join("/"))
    }
}

/// Exchanges resolved auth options for an authenticated base client
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        options: &AuthOptions,
        version: IdentityVersion,
    ) -> ClientResult<ProviderClient>;
}
