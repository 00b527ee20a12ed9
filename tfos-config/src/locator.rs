//! clouds.yaml discovery

use std::path::PathBuf;

use crate::context::ConfigContext;
use crate::error::{ConfigError, ConfigResult};

/// A located clouds.yaml and its raw contents
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Return the first existing clouds.yaml location, if any
///
/// A candidate whose existence cannot be determined is an error rather than
/// absent, so the search never falls through past it.
pub fn find_config(ctx: &ConfigContext) -> ConfigResult<Option<PathBuf>> {
    for path in ctx.search_paths() {
        let exists = path
            .try_exists()
            .map_err(|e| ConfigError::read(&path, e.to_string()))?;
        log::debug!(
            "clouds.yaml candidate {}: {}",
            path.display(),
            if exists { "found" } else { "absent" }
        );
        if exists {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Read the first existing clouds.yaml
///
/// A candidate that exists but cannot be read is an error; the search does not
/// fall through to lower-priority locations.
pub fn load_clouds_yaml(ctx: &ConfigContext) -> ConfigResult<ConfigSource> {
    let path = find_config(ctx)?.ok_or_else(|| ConfigError::FileNotFound {
        searched: ctx.search_paths(),
    })?;

    let contents = std::fs::read(&path).map_err(|e| ConfigError::read(&path, e.to_string()))?;
    log::debug!("Loaded {} ({} bytes)", path.display(), contents.len());

    Ok(ConfigSource { path, contents })
}
