//! Password authentication against the Keystone identity service

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tfos_config::{AuthOptions, Interface};

use crate::catalog::{CatalogEntry, Endpoint, ServiceCatalog, base_endpoint};
use crate::client::{AuthToken, Authenticator, ProviderClient};
use crate::error::{ClientError, ClientResult};
use crate::services::IdentityVersion;

const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Upper bound for a single token request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Authenticator issuing real token requests over HTTP
pub struct KeystoneAuthenticator {
    http: reqwest::Client,
}

impl KeystoneAuthenticator {
    /// Create an authenticator with the default request timeout
    pub fn new() -> ClientResult<Self> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create an authenticator whose requests fail after `timeout`
    pub fn with_timeout(timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tfos/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self { http })
    }

    /// Create with a specific HTTP client (for custom TLS or proxies)
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn post_credentials(&self, url: &str, body: &Value) -> ClientResult<reqwest::Response> {
        log::debug!("Requesting token from {}", url);

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read response body: {}", e));
            return Err(ClientError::AuthFailed {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn authenticate_v3(&self, options: &AuthOptions) -> ClientResult<ProviderClient> {
        let identity_endpoint = identity_url(options.endpoint(), IdentityVersion::V3);
        let url = format!("{}auth/tokens", identity_endpoint);
        let response = self.post_credentials(&url, &v3_request_body(options)).await?;

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(AuthToken::new)
            .ok_or_else(|| {
                ClientError::InvalidResponse(format!("missing {} header", SUBJECT_TOKEN_HEADER))
            })?;

        let body: V3TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        Ok(ProviderClient {
            identity_endpoint,
            identity_version: IdentityVersion::V3,
            token,
            catalog: body.token.into_catalog(),
        })
    }

    async fn authenticate_v2(&self, options: &AuthOptions) -> ClientResult<ProviderClient> {
        let identity_endpoint = identity_url(options.endpoint(), IdentityVersion::V2);
        let url = format!("{}tokens", identity_endpoint);
        let response = self.post_credentials(&url, &v2_request_body(options)).await?;

        let body: V2TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        Ok(ProviderClient {
            identity_endpoint,
            identity_version: IdentityVersion::V2,
            token: AuthToken::new(body.access.token.id.clone()),
            catalog: body.access.into_catalog(),
        })
    }
}

#[async_trait]
impl Authenticator for KeystoneAuthenticator {
    async fn authenticate(
        &self,
        options: &AuthOptions,
        version: IdentityVersion,
    ) -> ClientResult<ProviderClient> {
        match version {
            IdentityVersion::V2 => self.authenticate_v2(options).await,
            IdentityVersion::V3 => self.authenticate_v3(options).await,
        }
    }
}

/// Versioned identity URL with a trailing slash
pub fn identity_url(endpoint: &str, version: IdentityVersion) -> String {
    format!("{}{}/", base_endpoint(endpoint), version.path_segment())
}

fn domain_ref(options: &AuthOptions) -> Option<Value> {
    if let Some(ref id) = options.domain_id {
        Some(json!({ "id": id }))
    } else {
        options
            .domain_name
            .as_ref()
            .map(|name| json!({ "name": name }))
    }
}

fn v3_scope(options: &AuthOptions) -> Option<Value> {
    if let Some(ref id) = options.tenant_id {
        return Some(json!({ "project": { "id": id } }));
    }
    if let Some(ref name) = options.tenant_name {
        let mut project = json!({ "name": name });
        if let Some(domain) = domain_ref(options) {
            project["domain"] = domain;
        }
        return Some(json!({ "project": project }));
    }
    domain_ref(options).map(|domain| json!({ "domain": domain }))
}

fn v3_request_body(options: &AuthOptions) -> Value {
    let mut user = json!({
        "name": options.username(),
        "password": options.password(),
    });
    if let Some(domain) = domain_ref(options) {
        user["domain"] = domain;
    }

    let mut body = json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": { "user": user }
            }
        }
    });
    if let Some(scope) = v3_scope(options) {
        body["auth"]["scope"] = scope;
    }
    body
}

fn v2_request_body(options: &AuthOptions) -> Value {
    let mut auth = json!({
        "passwordCredentials": {
            "username": options.username(),
            "password": options.password(),
        }
    });
    if let Some(ref id) = options.tenant_id {
        auth["tenantId"] = json!(id);
    } else if let Some(ref name) = options.tenant_name {
        auth["tenantName"] = json!(name);
    }
    json!({ "auth": auth })
}

#[derive(Debug, Deserialize)]
struct V3TokenResponse {
    token: V3Token,
}

#[derive(Debug, Deserialize)]
struct V3Token {
    #[serde(default)]
    catalog: Vec<V3CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct V3CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    endpoints: Vec<V3Endpoint>,
}

#[derive(Debug, Deserialize)]
struct V3Endpoint {
    interface: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    region_id: Option<String>,
    url: String,
}

impl V3Token {
    fn into_catalog(self) -> ServiceCatalog {
        let entries = self
            .catalog
            .into_iter()
            .map(|entry| CatalogEntry {
                service_type: entry.service_type,
                name: entry.name,
                endpoints: entry
                    .endpoints
                    .into_iter()
                    .filter_map(|ep| {
                        let interface = ep.interface.parse::<Interface>().ok()?;
                        Some(Endpoint {
                            interface,
                            region: ep.region,
                            region_id: ep.region_id,
                            url: ep.url,
                        })
                    })
                    .collect(),
            })
            .collect();
        ServiceCatalog::new(entries)
    }
}

#[derive(Debug, Deserialize)]
struct V2TokenResponse {
    access: V2Access,
}

#[derive(Debug, Deserialize)]
struct V2Access {
    token: V2Token,
    #[serde(default, rename = "serviceCatalog")]
    service_catalog: Vec<V2CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct V2Token {
    id: String,
}

#[derive(Debug, Deserialize)]
struct V2CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    endpoints: Vec<V2Endpoint>,
}

#[derive(Debug, Deserialize)]
struct V2Endpoint {
    #[serde(default)]
    region: Option<String>,
    #[serde(default, rename = "publicURL")]
    public_url: Option<String>,
    #[serde(default, rename = "internalURL")]
    internal_url: Option<String>,
    #[serde(default, rename = "adminURL")]
    admin_url: Option<String>,
}

impl V2Access {
    fn into_catalog(self) -> ServiceCatalog {
        let entries = self
            .service_catalog
            .into_iter()
            .map(|entry| {
                let mut endpoints = Vec::new();
                for ep in entry.endpoints {
                    for (interface, url) in [
                        (Interface::Public, ep.public_url),
                        (Interface::Internal, ep.internal_url),
                        (Interface::Admin, ep.admin_url),
                    ] {
                        if let Some(url) = url {
                            endpoints.push(Endpoint {
                                interface,
                                region: ep.region.clone(),
                                region_id: None,
                                url,
                            });
                        }
                    }
                }
                CatalogEntry {
                    service_type: entry.service_type,
                    name: entry.name,
                    endpoints,
                }
            })
            .collect();
        ServiceCatalog::new(entries)
    }
}
