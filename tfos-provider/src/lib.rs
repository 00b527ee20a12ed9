//! tfos Provider
//!
//! Turns resolved cloud configuration into authenticated, region-scoped
//! service clients.
//!
//! # Example
//!
//! ```ignore
//! use tfos_config::{ClientOpts, ConfigContext};
//! use tfos_provider::{new_service_client, KeystoneAuthenticator};
//!
//! let ctx = ConfigContext::from_process();
//! let authenticator = KeystoneAuthenticator::new()?;
//! let compute = new_service_client("compute", &ClientOpts::new(), &ctx, &authenticator).await?;
//! println!("compute API at {}", compute.resource_base);
//! ```

pub mod catalog;
pub mod client;
pub mod error;
pub mod factory;
pub mod keystone;
pub mod services;

pub use catalog::{CatalogEntry, Endpoint, ServiceCatalog};
pub use client::{AuthToken, Authenticator, EndpointOpts, ProviderClient, ServiceClient};
pub use error::{ClientError, ClientResult};
pub use factory::{authenticated_client, new_service_client};
pub use keystone::KeystoneAuthenticator;
pub use services::{IdentityVersion, SERVICE_NAMES, Service, VolumeVersion};
