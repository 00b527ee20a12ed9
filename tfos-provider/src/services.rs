//! Supported OpenStack services and their versioned constructors

use std::fmt;

use tfos_config::CloudEntry;

use crate::catalog::base_endpoint;
use crate::client::{EndpointOpts, ProviderClient, ServiceClient};
use crate::error::{ClientError, ClientResult};

/// Names accepted by [`Service::resolve`]
pub const SERVICE_NAMES: [&str; 11] = [
    "clustering",
    "compute",
    "container",
    "database",
    "dns",
    "identity",
    "image",
    "network",
    "object-store",
    "orchestration",
    "volume",
];

/// Identity API major version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityVersion {
    V2,
    #[default]
    V3,
}

impl IdentityVersion {
    /// Parse `identity_api_version`; unset means v3
    pub fn parse(value: Option<&str>) -> ClientResult<Self> {
        match value.map(str::trim).unwrap_or_default() {
            "" | "3" | "v3" => Ok(IdentityVersion::V3),
            "2" | "2.0" | "v2" => Ok(IdentityVersion::V2),
            other => Err(ClientError::invalid_version("identity", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityVersion::V2 => "v2",
            IdentityVersion::V3 => "v3",
        }
    }

    /// Path segment under the identity base URL
    pub fn path_segment(&self) -> &'static str {
        match self {
            IdentityVersion::V2 => "v2.0",
            IdentityVersion::V3 => "v3",
        }
    }
}

/// Block storage API major version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VolumeVersion {
    V1,
    #[default]
    V2,
}

impl VolumeVersion {
    /// Parse `volume_api_version`; unset means v2
    pub fn parse(value: Option<&str>) -> ClientResult<Self> {
        match value.map(str::trim).unwrap_or_default() {
            "" | "2" | "v2" => Ok(VolumeVersion::V2),
            "1" | "v1" => Ok(VolumeVersion::V1),
            other => Err(ClientError::invalid_version("volume", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeVersion::V1 => "v1",
            VolumeVersion::V2 => "v2",
        }
    }
}

/// Builds a service client from an authenticated base client
pub type Constructor = fn(&ProviderClient, &EndpointOpts) -> ClientResult<ServiceClient>;

/// A supported service at a concrete API version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Clustering,
    Compute,
    Container,
    Database,
    Dns,
    Identity(IdentityVersion),
    Image,
    Network,
    ObjectStore,
    Orchestration,
    Volume(VolumeVersion),
}

impl Service {
    /// Map a service name to a service, applying the cloud's version overrides
    pub fn resolve(name: &str, cloud: &CloudEntry) -> ClientResult<Self> {
        match name {
            "clustering" => Ok(Service::Clustering),
            "compute" => Ok(Service::Compute),
            "container" => Ok(Service::Container),
            "database" => Ok(Service::Database),
            "dns" => Ok(Service::Dns),
            "identity" => Ok(Service::Identity(IdentityVersion::parse(
                cloud.identity_api_version.as_deref(),
            )?)),
            "image" => Ok(Service::Image),
            "network" => Ok(Service::Network),
            "object-store" => Ok(Service::ObjectStore),
            "orchestration" => Ok(Service::Orchestration),
            "volume" => Ok(Service::Volume(VolumeVersion::parse(
                cloud.volume_api_version.as_deref(),
            )?)),
            other => Err(ClientError::unsupported_service(other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Service::Clustering => "clustering",
            Service::Compute => "compute",
            Service::Container => "container",
            Service::Database => "database",
            Service::Dns => "dns",
            Service::Identity(_) => "identity",
            Service::Image => "image",
            Service::Network => "network",
            Service::ObjectStore => "object-store",
            Service::Orchestration => "orchestration",
            Service::Volume(_) => "volume",
        }
    }

    pub fn version(&self) -> &'static str {
        match self {
            Service::Identity(v) => v.as_str(),
            Service::Volume(v) => v.as_str(),
            Service::Compute | Service::Dns | Service::Image | Service::Network => "v2",
            Service::Clustering
            | Service::Container
            | Service::Database
            | Service::ObjectStore
            | Service::Orchestration => "v1",
        }
    }

    /// Versions selectable through clouds.yaml for this service
    pub fn supported_versions(&self) -> &'static [&'static str] {
        match self {
            Service::Identity(_) => &["v2", "v3"],
            Service::Volume(_) => &["v1", "v2"],
            Service::Compute | Service::Dns | Service::Image | Service::Network => &["v2"],
            Service::Clustering
            | Service::Container
            | Service::Database
            | Service::ObjectStore
            | Service::Orchestration => &["v1"],
        }
    }

    /// Service type as published in the catalog
    pub fn catalog_type(&self) -> &'static str {
        match self {
            Service::Volume(VolumeVersion::V1) => "volume",
            Service::Volume(VolumeVersion::V2) => "volumev2",
            other => other.name(),
        }
    }

    /// Constructor for this service and version
    pub fn constructor(&self) -> Constructor {
        match self {
            Service::Clustering => new_clustering_v1,
            Service::Compute => new_compute_v2,
            Service::Container => new_container_v1,
            Service::Database => new_database_v1,
            Service::Dns => new_dns_v2,
            Service::Identity(IdentityVersion::V2) => new_identity_v2,
            Service::Identity(IdentityVersion::V3) => new_identity_v3,
            Service::Image => new_image_v2,
            Service::Network => new_network_v2,
            Service::ObjectStore => new_object_storage_v1,
            Service::Orchestration => new_orchestration_v1,
            Service::Volume(VolumeVersion::V1) => new_block_storage_v1,
            Service::Volume(VolumeVersion::V2) => new_block_storage_v2,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.version())
    }
}

fn init_client(
    client: &ProviderClient,
    eo: &EndpointOpts,
    service: Service,
    version_path: &str,
) -> ClientResult<ServiceClient> {
    let endpoint = client.catalog.locate(service.catalog_type(), eo)?;
    Ok(ServiceClient {
        service,
        resource_base: format!("{}{}", endpoint, version_path),
        endpoint,
        region: eo.region.clone(),
        token: client.token.clone(),
    })
}

/// Identity endpoints are often published unversioned or at another version,
/// so the resource base is rebuilt from the versionless root.
fn init_identity_client(
    client: &ProviderClient,
    eo: &EndpointOpts,
    version: IdentityVersion,
) -> ClientResult<ServiceClient> {
    let service = Service::Identity(version);
    let endpoint = client.catalog.locate(service.catalog_type(), eo)?;
    Ok(ServiceClient {
        service,
        resource_base: format!("{}{}/", base_endpoint(&endpoint), version.path_segment()),
        endpoint,
        region: eo.region.clone(),
        token: client.token.clone(),
    })
}

pub fn new_clustering_v1(
    client: &ProviderClient,
    eo: &EndpointOpts,
) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Clustering, "v1/")
}

pub fn new_compute_v2(client: &ProviderClient, eo: &EndpointOpts) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Compute, "")
}

pub fn new_container_v1(client: &ProviderClient, eo: &EndpointOpts) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Container, "")
}

pub fn new_database_v1(client: &ProviderClient, eo: &EndpointOpts) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Database, "")
}

pub fn new_dns_v2(client: &ProviderClient, eo: &EndpointOpts) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Dns, "v2/")
}

pub fn new_identity_v2(client: &ProviderClient, eo: &EndpointOpts) -> ClientResult<ServiceClient> {
    init_identity_client(client, eo, IdentityVersion::V2)
}

pub fn new_identity_v3(client: &ProviderClient, eo: &EndpointOpts) -> ClientResult<ServiceClient> {
    init_identity_client(client, eo, IdentityVersion::V3)
}

pub fn new_image_v2(client: &ProviderClient, eo: &EndpointOpts) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Image, "v2/")
}

pub fn new_network_v2(client: &ProviderClient, eo: &EndpointOpts) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Network, "v2.0/")
}

pub fn new_object_storage_v1(
    client: &ProviderClient,
    eo: &EndpointOpts,
) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::ObjectStore, "")
}

pub fn new_orchestration_v1(
    client: &ProviderClient,
    eo: &EndpointOpts,
) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Orchestration, "")
}

pub fn new_block_storage_v1(
    client: &ProviderClient,
    eo: &EndpointOpts,
) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Volume(VolumeVersion::V1), "")
}

pub fn new_block_storage_v2(
    client: &ProviderClient,
    eo: &EndpointOpts,
) -> ClientResult<ServiceClient> {
    init_client(client, eo, Service::Volume(VolumeVersion::V2), "")
}
