//! tfos Config
//!
//! Resolves which OpenStack cloud to talk to and with which credentials.
//!
//! # Overview
//!
//! Resolution runs in a fixed order, each step a plain function over values:
//!
//! - **Locator**: finds `clouds.yaml` (`OS_CLIENT_CONFIG_FILE`, current directory,
//!   `~/.config/openstack`, `/etc/openstack`)
//! - **Parser / Selector**: parses the file and picks one cloud entry
//! - **Auth pipeline**: file values, then domain scope, then environment overrides,
//!   then validation
//!
//! Every environment and filesystem fact comes from a [`ConfigContext`], so the
//! same inputs always produce the same result.
//!
//! # Example
//!
//! ```ignore
//! use tfos_config::{resolve_auth_options, ClientOpts, ConfigContext};
//!
//! let ctx = ConfigContext::from_process();
//! let opts = ClientOpts::new().with_cloud("devstack");
//! let auth = resolve_auth_options(&opts, &ctx)?;
//! println!("authenticating against {}", auth.endpoint());
//! ```

pub mod auth;
pub mod clouds;
pub mod context;
pub mod error;
pub mod locator;
pub mod options;

pub use auth::{AuthOptions, resolve_auth_options, resolve_cloud};
pub use clouds::{AuthEntry, CloudEntry, CloudsFile, Interface, RegionEntry, SelectedCloud};
pub use context::ConfigContext;
pub use error::{ConfigError, ConfigResult};
pub use locator::{ConfigSource, find_config, load_clouds_yaml};
pub use options::ClientOpts;
