//! Service catalog returned by the identity service

use tfos_config::Interface;

use crate::client::EndpointOpts;
use crate::error::{ClientError, ClientResult};

/// Services and endpoints visible to an authenticated token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceCatalog {
    pub entries: Vec<CatalogEntry>,
}

/// One service in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Service type (e.g., "compute", "volumev2")
    pub service_type: String,
    pub name: Option<String>,
    pub endpoints: Vec<Endpoint>,
}

/// One endpoint of a service
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub interface: Interface,
    pub region: Option<String>,
    pub region_id: Option<String>,
    pub url: String,
}

impl Endpoint {
    fn in_region(&self, region: Option<&str>) -> bool {
        match region {
            None => true,
            Some(r) => self.region.as_deref() == Some(r) || self.region_id.as_deref() == Some(r),
        }
    }
}

/// Ensure a URL ends with exactly one trailing slash
pub fn normalize_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

/// Strip a trailing version segment (`/v3`, `/v2.0`) and normalize
///
/// `https://keystone:5000/v2.0` and `https://keystone:5000` both become
/// `https://keystone:5000/`.
pub fn base_endpoint(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((base, last)) if is_version_segment(last) => normalize_url(base),
        _ => normalize_url(trimmed),
    }
}

fn is_version_segment(segment: &str) -> bool {
    segment.strip_prefix('v').is_some_and(|rest| {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
    })
}

impl ServiceCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Service types present in the catalog
    pub fn service_types(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.service_type.as_str())
            .collect()
    }

    /// Find the single endpoint URL for a service type, interface and region
    ///
    /// The returned URL always ends with a slash.
    pub fn locate(&self, service_type: &str, opts: &EndpointOpts) -> ClientResult<String> {
        let mut urls: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.service_type == service_type)
            .flat_map(|entry| entry.endpoints.iter())
            .filter(|ep| ep.interface == opts.interface && ep.in_region(opts.region.as_deref()))
            .map(|ep| normalize_url(&ep.url))
            .collect();
        urls.sort();
        urls.dedup();

        match urls.len() {
            0 => Err(ClientError::EndpointNotFound {
                service_type: service_type.to_string(),
                region: opts.region.clone(),
                interface: opts.interface.to_string(),
            }),
            1 => {
                let url = urls.remove(0);
                log::debug!("Located {} endpoint {}", service_type, url);
                Ok(url)
            }
            count => Err(ClientError::MultipleEndpoints {
                service_type: service_type.to_string(),
                count,
            }),
        }
    }
}
