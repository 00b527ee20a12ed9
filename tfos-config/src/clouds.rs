//! clouds.yaml data model and cloud selection

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::auth::AuthOptions;
use crate::context::ConfigContext;
use crate::error::{ConfigError, ConfigResult};
use crate::options::ClientOpts;

/// Parsed clouds.yaml: cloud name to entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CloudsFile {
    #[serde(default)]
    pub clouds: BTreeMap<String, CloudEntry>,
}

/// Connection and auth settings for one OpenStack deployment
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CloudEntry {
    #[serde(default)]
    pub auth: AuthEntry,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub regions: Vec<RegionEntry>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub identity_api_version: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub volume_api_version: Option<String>,
    #[serde(default, alias = "endpoint_type")]
    pub interface: Option<Interface>,
}

/// The `auth` block of a cloud entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthEntry {
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "tenant_id")]
    pub project_id: Option<String>,
    #[serde(default, alias = "tenant_name")]
    pub project_name: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub user_domain_id: Option<String>,
    #[serde(default)]
    pub user_domain_name: Option<String>,
    #[serde(default)]
    pub project_domain_id: Option<String>,
    #[serde(default)]
    pub project_domain_name: Option<String>,
}

/// An item of the `regions` list: either a bare name or a mapping with a name
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RegionEntry {
    Name(String),
    Detailed { name: String },
}

impl RegionEntry {
    pub fn name(&self) -> &str {
        match self {
            RegionEntry::Name(name) => name,
            RegionEntry::Detailed { name } => name,
        }
    }
}

/// Endpoint interface used when looking up the service catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum Interface {
    #[default]
    #[serde(rename = "public", alias = "publicURL")]
    Public,
    #[serde(rename = "internal", alias = "internalURL")]
    Internal,
    #[serde(rename = "admin", alias = "adminURL")]
    Admin,
}

impl Interface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interface::Public => "public",
            Interface::Internal => "internal",
            Interface::Admin => "admin",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interface {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" | "publicURL" => Ok(Interface::Public),
            "internal" | "internalURL" => Ok(Interface::Internal),
            "admin" | "adminURL" => Ok(Interface::Admin),
            other => Err(ConfigError::invalid_value("interface", other)),
        }
    }
}

/// Accept `identity_api_version: 3` as well as `identity_api_version: "3"`
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a version string, got {:?}",
            other
        ))),
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl AuthEntry {
    /// Move the generic domain into the user and project domain fields
    ///
    /// A generic `domain_id`/`domain_name` fills whichever of the specific fields
    /// are unset and is then cleared. Applying this twice is a no-op.
    pub fn normalize_domains(mut self) -> Self {
        if let Some(id) = self.domain_id.take().filter(|s| !s.is_empty()) {
            if present(&self.user_domain_id).is_none() {
                self.user_domain_id = Some(id.clone());
            }
            if present(&self.project_domain_id).is_none() {
                self.project_domain_id = Some(id);
            }
        }

        if let Some(name) = self.domain_name.take().filter(|s| !s.is_empty()) {
            if present(&self.user_domain_name).is_none() {
                self.user_domain_name = Some(name.clone());
            }
            if present(&self.project_domain_name).is_none() {
                self.project_domain_name = Some(name);
            }
        }

        self
    }
}

impl CloudsFile {
    /// Parse raw clouds.yaml bytes
    pub fn from_slice(contents: &[u8]) -> ConfigResult<Self> {
        serde_yaml::from_slice(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Names of all defined clouds, sorted
    pub fn names(&self) -> Vec<String> {
        self.clouds.keys().cloned().collect()
    }

    /// Name selection would pick without an explicit name, if unambiguous
    pub fn default_name(&self, opts: &ClientOpts, ctx: &ConfigContext) -> Option<String> {
        opts.requested_cloud(ctx).or_else(|| {
            if self.clouds.len() == 1 {
                self.clouds.keys().next().cloned()
            } else {
                None
            }
        })
    }

    /// Pick one cloud: explicit option, then `OS_CLOUD`, then the sole entry
    pub fn select(mut self, opts: &ClientOpts, ctx: &ConfigContext) -> ConfigResult<SelectedCloud> {
        let (name, entry) = match opts.requested_cloud(ctx) {
            Some(name) => {
                let entry = self
                    .clouds
                    .remove(&name)
                    .ok_or_else(|| ConfigError::CloudNotFound(name.clone()))?;
                (name, entry)
            }
            None if self.clouds.len() == 1 => self
                .clouds
                .pop_first()
                .ok_or_else(|| ConfigError::AmbiguousCloud(Vec::new()))?,
            None => return Err(ConfigError::AmbiguousCloud(self.names())),
        };

        log::debug!("Selected cloud {}", name);
        Ok(SelectedCloud::new(Some(name), entry))
    }
}

/// A cloud entry chosen for this resolution, with normalized domains
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCloud {
    /// Name in clouds.yaml; `None` when built from explicit auth options
    pub name: Option<String>,
    pub entry: CloudEntry,
    /// File the entry was read from
    pub source: Option<PathBuf>,
}

impl SelectedCloud {
    pub fn new(name: Option<String>, mut entry: CloudEntry) -> Self {
        entry.auth = entry.auth.normalize_domains();
        Self {
            name,
            entry,
            source: None,
        }
    }

    pub fn with_source(mut self, path: PathBuf) -> Self {
        self.source = Some(path);
        self
    }

    /// Run the auth pipeline over this cloud's auth block
    pub fn auth_options(
        &self,
        opts: &ClientOpts,
        ctx: &ConfigContext,
    ) -> ConfigResult<AuthOptions> {
        AuthOptions::from_entry(&self.entry.auth)
            .with_domain_scope(&self.entry.auth)
            .with_env_overrides(ctx, opts.env_prefix())
            .validate()
    }

    /// Region: explicit option, then `{prefix}REGION_NAME`, then the cloud entry
    pub fn region(&self, opts: &ClientOpts, ctx: &ConfigContext) -> Option<String> {
        let env_key = format!("{}REGION_NAME", opts.env_prefix());
        opts.region_name
            .as_deref()
            .filter(|r| !r.is_empty())
            .or_else(|| ctx.var(&env_key))
            .or_else(|| present(&self.entry.region_name))
            .map(str::to_string)
    }

    /// Interface: explicit option, then `{prefix}INTERFACE`, then the cloud entry
    pub fn interface(&self, opts: &ClientOpts, ctx: &ConfigContext) -> ConfigResult<Interface> {
        if let Some(interface) = opts.interface {
            return Ok(interface);
        }
        let env_key = format!("{}INTERFACE", opts.env_prefix());
        if let Some(value) = ctx.var(&env_key) {
            return value.parse();
        }
        Ok(self.entry.interface.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CLOUDS: &str = r#"
clouds:
  devstack:
    auth:
      auth_url: http://devstack:5000/v3
      username: demo
      password: secret
      project_name: demo
      user_domain_name: Default
      project_domain_name: Default
    region_name: RegionOne
    identity_api_version: 3
    volume_api_version: "1"
  production:
    auth:
      auth_url: https://keystone.example.com
      username: ops
      password: hunter2
      tenant_id: 0123abcd
    regions:
      - RegionA
      - name: RegionB
        values:
          networks: []
    interface: internal
"#;

    fn parse(yaml: &str) -> CloudsFile {
        CloudsFile::from_slice(yaml.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_clouds() {
        let file = parse(TWO_CLOUDS);
        assert_eq!(file.names(), vec!["devstack", "production"]);

        let devstack = &file.clouds["devstack"];
        assert_eq!(devstack.region_name.as_deref(), Some("RegionOne"));
        assert_eq!(devstack.identity_api_version.as_deref(), Some("3"));
        assert_eq!(devstack.volume_api_version.as_deref(), Some("1"));
        assert_eq!(devstack.auth.user_domain_name.as_deref(), Some("Default"));

        let production = &file.clouds["production"];
        assert_eq!(production.auth.project_id.as_deref(), Some("0123abcd"));
        assert_eq!(production.interface, Some(Interface::Internal));
        let regions: Vec<&str> = production.regions.iter().map(RegionEntry::name).collect();
        assert_eq!(regions, vec!["RegionA", "RegionB"]);
    }

    #[test]
    fn test_parse_unquoted_float_version() {
        let file = parse("clouds:\n  legacy:\n    identity_api_version: 2.0\n");
        assert_eq!(
            file.clouds["legacy"].identity_api_version.as_deref(),
            Some("2.0")
        );
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let result = CloudsFile::from_slice(b"clouds: [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let result = CloudsFile::from_slice(b"clouds:\n  bad:\n    identity_api_version: [3]\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_select_sole_entry() {
        let file = parse("clouds:\n  only:\n    region_name: R1\n");
        let ctx = ConfigContext::empty("/work");

        let selected = file.select(&ClientOpts::new(), &ctx).unwrap();
        assert_eq!(selected.name.as_deref(), Some("only"));
        assert_eq!(selected.entry.region_name.as_deref(), Some("R1"));
    }

    #[test]
    fn test_select_ambiguous() {
        let ctx = ConfigContext::empty("/work");

        match parse(TWO_CLOUDS).select(&ClientOpts::new(), &ctx) {
            Err(ConfigError::AmbiguousCloud(names)) => {
                assert_eq!(names, vec!["devstack", "production"])
            }
            other => panic!("Expected AmbiguousCloud, got {:?}", other),
        }

        match parse("clouds: {}\n").select(&ClientOpts::new(), &ctx) {
            Err(ConfigError::AmbiguousCloud(names)) => assert!(names.is_empty()),
            other => panic!("Expected AmbiguousCloud, got {:?}", other),
        }
    }

    #[test]
    fn test_select_precedence() {
        let ctx = ConfigContext::empty("/work").with_var("OS_CLOUD", "production");

        let selected = parse(TWO_CLOUDS).select(&ClientOpts::new(), &ctx).unwrap();
        assert_eq!(selected.name.as_deref(), Some("production"));

        let opts = ClientOpts::new().with_cloud("devstack");
        let selected = parse(TWO_CLOUDS).select(&opts, &ctx).unwrap();
        assert_eq!(selected.name.as_deref(), Some("devstack"));
    }

    #[test]
    fn test_select_missing_cloud() {
        let ctx = ConfigContext::empty("/work");
        let opts = ClientOpts::new().with_cloud("staging");

        match parse(TWO_CLOUDS).select(&opts, &ctx) {
            Err(ConfigError::CloudNotFound(name)) => assert_eq!(name, "staging"),
            other => panic!("Expected CloudNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_domains_backfills_and_clears() {
        let auth = AuthEntry {
            domain_id: Some("d-1".to_string()),
            domain_name: Some("Acme".to_string()),
            user_domain_name: Some("Users".to_string()),
            ..Default::default()
        };

        let normalized = auth.normalize_domains();
        assert_eq!(normalized.domain_id, None);
        assert_eq!(normalized.domain_name, None);
        assert_eq!(normalized.user_domain_id.as_deref(), Some("d-1"));
        assert_eq!(normalized.project_domain_id.as_deref(), Some("d-1"));
        assert_eq!(normalized.user_domain_name.as_deref(), Some("Users"));
        assert_eq!(normalized.project_domain_name.as_deref(), Some("Acme"));

        let again = normalized.clone().normalize_domains();
        assert_eq!(again, normalized);
    }

    #[test]
    fn test_selected_cloud_is_normalized() {
        let file = parse("clouds:\n  c:\n    auth:\n      domain_id: default\n");
        let selected = file
            .select(&ClientOpts::new(), &ConfigContext::empty("/work"))
            .unwrap();

        assert_eq!(selected.entry.auth.domain_id, None);
        assert_eq!(selected.entry.auth.user_domain_id.as_deref(), Some("default"));
        assert_eq!(selected.entry.auth.project_domain_id.as_deref(), Some("default"));
    }

    #[test]
    fn test_region_precedence() {
        let cloud = SelectedCloud::new(
            Some("c".to_string()),
            CloudEntry {
                region_name: Some("FileRegion".to_string()),
                ..Default::default()
            },
        );
        let ctx = ConfigContext::empty("/work");
        assert_eq!(
            cloud.region(&ClientOpts::new(), &ctx).as_deref(),
            Some("FileRegion")
        );

        let ctx = ctx.with_var("OS_REGION_NAME", "EnvRegion");
        assert_eq!(
            cloud.region(&ClientOpts::new(), &ctx).as_deref(),
            Some("EnvRegion")
        );

        let opts = ClientOpts::new().with_region("OptRegion");
        assert_eq!(cloud.region(&opts, &ctx).as_deref(), Some("OptRegion"));
    }

    #[test]
    fn test_interface_precedence() {
        let cloud = SelectedCloud::new(
            None,
            CloudEntry {
                interface: Some(Interface::Internal),
                ..Default::default()
            },
        );
        let ctx = ConfigContext::empty("/work");
        assert_eq!(
            cloud.interface(&ClientOpts::new(), &ctx).unwrap(),
            Interface::Internal
        );

        let ctx = ctx.with_var("OS_INTERFACE", "adminURL");
        assert_eq!(
            cloud.interface(&ClientOpts::new(), &ctx).unwrap(),
            Interface::Admin
        );

        let opts = ClientOpts::new().with_interface(Interface::Public);
        assert_eq!(cloud.interface(&opts, &ctx).unwrap(), Interface::Public);

        let ctx = ConfigContext::empty("/work").with_var("OS_INTERFACE", "private");
        assert!(matches!(
            cloud.interface(&ClientOpts::new(), &ctx),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
