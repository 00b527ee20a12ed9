//! Caller-supplied client options

use crate::clouds::{AuthEntry, Interface};
use crate::context::{CLOUD_VAR, ConfigContext, DEFAULT_ENV_PREFIX};

/// Options supplied by the caller; the highest-precedence layer
#[derive(Debug, Clone, Default)]
pub struct ClientOpts {
    /// Cloud to select from clouds.yaml (beats `OS_CLOUD`)
    pub cloud: Option<String>,
    /// Prefix for auth and region override variables (default `OS_`)
    pub env_prefix: Option<String>,
    /// Explicit credentials, used instead of clouds.yaml when no cloud is named
    pub auth_info: Option<AuthEntry>,
    /// Region, beating both the environment and the cloud entry
    pub region_name: Option<String>,
    /// Endpoint interface used for catalog lookups
    pub interface: Option<Interface>,
}

impl ClientOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cloud(mut self, cloud: impl Into<String>) -> Self {
        self.cloud = Some(cloud.into());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn with_auth_info(mut self, auth: AuthEntry) -> Self {
        self.auth_info = Some(auth);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region_name = Some(region.into());
        self
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Prefix applied to override variable names
    pub fn env_prefix(&self) -> &str {
        self.env_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_ENV_PREFIX)
    }

    /// Cloud name requested explicitly or through `OS_CLOUD`
    pub fn requested_cloud(&self, ctx: &ConfigContext) -> Option<String> {
        self.cloud
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| ctx.var(CLOUD_VAR))
            .map(str::to_string)
    }
}
