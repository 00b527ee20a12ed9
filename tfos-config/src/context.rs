//! Configuration context
//!
//! A snapshot of the environment variables and directories that resolution
//! is allowed to look at. Resolution never touches process state directly.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit clouds.yaml path
pub const CLIENT_CONFIG_FILE_VAR: &str = "OS_CLIENT_CONFIG_FILE";

/// Environment variable naming the cloud to select
pub const CLOUD_VAR: &str = "OS_CLOUD";

/// Default prefix for auth and region override variables
pub const DEFAULT_ENV_PREFIX: &str = "OS_";

/// File name searched for in each config directory
pub const CLOUDS_FILE_NAME: &str = "clouds.yaml";

/// System-wide config directory
pub const SYSTEM_CONFIG_DIR: &str = "/etc/openstack";

/// Environment and filesystem facts consulted during resolution
#[derive(Debug, Clone)]
pub struct ConfigContext {
    env: HashMap<String, String>,
    cwd: PathBuf,
    user_config_dir: Option<PathBuf>,
    system_config_dir: PathBuf,
}

/// Collect environment pairs, dropping any that are not valid UTF-8
fn env_snapshot(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                log::debug!(
                    "Skipping non UTF-8 environment variable {}",
                    key.unwrap_or_else(|k| k.to_string_lossy().into_owned())
                );
                None
            }
        })
        .collect()
}

impl ConfigContext {
    /// Snapshot the current process environment and directories
    pub fn from_process() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|e| {
            log::warn!("Cannot determine current directory: {}", e);
            PathBuf::from(".")
        });

        let user_config_dir = dirs::home_dir().map(|home| home.join(".config").join("openstack"));
        if user_config_dir.is_none() {
            log::warn!("Cannot find home directory, skipping user config directory");
        }

        Self {
            env: env_snapshot(std::env::vars_os()),
            cwd,
            user_config_dir,
            system_config_dir: PathBuf::from(SYSTEM_CONFIG_DIR),
        }
    }

    /// Create a context with no environment variables and no user config directory
    pub fn empty(cwd: impl Into<PathBuf>) -> Self {
        Self {
            env: HashMap::new(),
            cwd: cwd.into(),
            user_config_dir: None,
            system_config_dir: PathBuf::from(SYSTEM_CONFIG_DIR),
        }
    }

    /// Set an environment variable in this context
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Override the per-user config directory
    pub fn with_user_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.user_config_dir = dir;
        self
    }

    /// Override the system-wide config directory
    pub fn with_system_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.system_config_dir = dir.into();
        self
    }

    /// Look up an environment variable; empty values count as unset
    pub fn var(&self, key: &str) -> Option<&str> {
        self.env
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Current working directory of this context
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Candidate clouds.yaml locations in priority order
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(4);

        if let Some(explicit) = self.var(CLIENT_CONFIG_FILE_VAR) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(self.cwd.join(CLOUDS_FILE_NAME));
        if let Some(ref dir) = self.user_config_dir {
            paths.push(dir.join(CLOUDS_FILE_NAME));
        }
        paths.push(self.system_config_dir.join(CLOUDS_FILE_NAME));

        paths
    }
}
