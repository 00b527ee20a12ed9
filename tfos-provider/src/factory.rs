//! Service client factory

use tfos_config::{ClientOpts, ConfigContext, SelectedCloud, resolve_cloud};

use crate::client::{Authenticator, EndpointOpts, ProviderClient, ServiceClient};
use crate::error::ClientResult;
use crate::services::{IdentityVersion, Service};

/// Authenticate against the selected cloud's identity service
pub async fn authenticated_client(
    cloud: &SelectedCloud,
    opts: &ClientOpts,
    ctx: &ConfigContext,
    authenticator: &dyn Authenticator,
) -> ClientResult<ProviderClient> {
    let auth_options = cloud.auth_options(opts, ctx)?;
    let version = IdentityVersion::parse(cloud.entry.identity_api_version.as_deref())?;
    log::debug!(
        "Authenticating {} against {} ({})",
        auth_options.username(),
        auth_options.endpoint(),
        version.as_str()
    );
    authenticator.authenticate(&auth_options, version).await
}

/// Build an authenticated, region-scoped client for a named service
///
/// The service name and its API version are checked before any request is
/// made, so invalid input never reaches the identity service.
pub async fn new_service_client(
    service_name: &str,
    opts: &ClientOpts,
    ctx: &ConfigContext,
    authenticator: &dyn Authenticator,
) -> ClientResult<ServiceClient> {
    let cloud = resolve_cloud(opts, ctx)?;
    let service = Service::resolve(service_name, &cloud.entry)?;

    let endpoint_opts = EndpointOpts {
        region: cloud.region(opts, ctx),
        interface: cloud.interface(opts, ctx)?,
    };

    let provider = authenticated_client(&cloud, opts, ctx, authenticator).await?;
    let client = (service.constructor())(&provider, &endpoint_opts)?;
    log::debug!("Created {} client at {}", service, client.resource_base);

    Ok(client)
}
