//! Auth option resolution
//!
//! Resolution is a pipeline of by-value steps over [`AuthOptions`]:
//!
//! 1. [`AuthOptions::from_entry`] copies the cloud's auth block
//! 2. [`AuthOptions::with_domain_scope`] lets project, then user, domains win
//! 3. [`AuthOptions::with_env_overrides`] applies `{prefix}*` variables
//! 4. [`AuthOptions::validate`] rejects options missing a required field

use std::fmt;

use crate::clouds::{AuthEntry, CloudEntry, CloudsFile, SelectedCloud};
use crate::context::ConfigContext;
use crate::error::{ConfigError, ConfigResult};
use crate::locator::load_clouds_yaml;
use crate::options::ClientOpts;

/// Fully resolved options consumed by the authentication step
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthOptions {
    /// Identity service URL
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_id: Option<String>,
    pub tenant_name: Option<String>,
    pub domain_id: Option<String>,
    pub domain_name: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

fn override_with(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}

impl AuthOptions {
    /// Direct copy of an auth block
    pub fn from_entry(auth: &AuthEntry) -> Self {
        Self {
            endpoint: non_empty(&auth.auth_url),
            username: non_empty(&auth.username),
            password: non_empty(&auth.password),
            tenant_id: non_empty(&auth.project_id),
            tenant_name: non_empty(&auth.project_name),
            domain_id: non_empty(&auth.domain_id),
            domain_name: non_empty(&auth.domain_name),
        }
    }

    /// Project domain overrides the generic domain; user domain overrides both
    pub fn with_domain_scope(mut self, auth: &AuthEntry) -> Self {
        override_with(&mut self.domain_id, non_empty(&auth.project_domain_id));
        override_with(&mut self.domain_name, non_empty(&auth.project_domain_name));
        override_with(&mut self.domain_id, non_empty(&auth.user_domain_id));
        override_with(&mut self.domain_name, non_empty(&auth.user_domain_name));
        self
    }

    /// Apply environment overrides in fixed order
    ///
    /// `PROJECT_*` variables are aliases of `TENANT_*` and are read after them,
    /// so a project value wins when both are set. `PROJECT_DOMAIN_*` likewise
    /// wins over `DOMAIN_*`.
    pub fn with_env_overrides(mut self, ctx: &ConfigContext, prefix: &str) -> Self {
        let var = |name: &str| ctx.var(&format!("{prefix}{name}")).map(str::to_string);

        override_with(&mut self.endpoint, var("AUTH_URL"));
        override_with(&mut self.username, var("USERNAME"));
        override_with(&mut self.password, var("PASSWORD"));
        override_with(&mut self.tenant_id, var("TENANT_ID"));
        override_with(&mut self.tenant_id, var("PROJECT_ID"));
        override_with(&mut self.tenant_name, var("TENANT_NAME"));
        override_with(&mut self.tenant_name, var("PROJECT_NAME"));
        override_with(&mut self.domain_id, var("DOMAIN_ID"));
        override_with(&mut self.domain_id, var("PROJECT_DOMAIN_ID"));
        override_with(&mut self.domain_name, var("DOMAIN_NAME"));
        override_with(&mut self.domain_name, var("PROJECT_DOMAIN_NAME"));

        self
    }

    /// Require endpoint, username and password, reporting the first one missing
    pub fn validate(self) -> ConfigResult<Self> {
        if self.endpoint.is_none() {
            return Err(ConfigError::missing_input("authURL"));
        }
        if self.username.is_none() {
            return Err(ConfigError::missing_input("username"));
        }
        if self.password.is_none() {
            return Err(ConfigError::missing_input("password"));
        }
        Ok(self)
    }

    /// Identity endpoint; empty before validation
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or_default()
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("tenant_id", &self.tenant_id)
            .field("tenant_name", &self.tenant_name)
            .field("domain_id", &self.domain_id)
            .field("domain_name", &self.domain_name)
            .finish()
    }
}

/// Determine the cloud entry for this invocation
///
/// Explicit `auth_info` without a requested cloud name bypasses clouds.yaml
/// entirely. Otherwise the file is located, parsed and a cloud selected.
pub fn resolve_cloud(opts: &ClientOpts, ctx: &ConfigContext) -> ConfigResult<SelectedCloud> {
    if let Some(ref auth) = opts.auth_info
        && opts.requested_cloud(ctx).is_none()
    {
        log::debug!("Using explicit auth options, clouds.yaml not consulted");
        let entry = CloudEntry {
            auth: auth.clone(),
            ..Default::default()
        };
        return Ok(SelectedCloud::new(None, entry));
    }

    let source = load_clouds_yaml(ctx)?;
    let file = CloudsFile::from_slice(&source.contents)?;
    Ok(file.select(opts, ctx)?.with_source(source.path))
}

/// Resolve validated auth options: locate, parse, select, then run the pipeline
pub fn resolve_auth_options(opts: &ClientOpts, ctx: &ConfigContext) -> ConfigResult<AuthOptions> {
    let cloud = resolve_cloud(opts, ctx)?;
    let options = cloud.auth_options(opts, ctx)?;
    log::debug!("Resolved auth options: {:?}", options);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn full_entry() -> AuthEntry {
        AuthEntry {
            auth_url: Some("https://a".to_string()),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            project_id: Some("p-id".to_string()),
            project_name: Some("p-name".to_string()),
            ..Default::default()
        }
    }

    fn empty_ctx() -> ConfigContext {
        ConfigContext::empty("/nonexistent")
    }

    #[test]
    fn test_from_entry_copies_fields() {
        let options = AuthOptions::from_entry(&full_entry());

        assert_eq!(options.endpoint(), "https://a");
        assert_eq!(options.username(), "user");
        assert_eq!(options.password(), "pass");
        assert_eq!(options.tenant_id.as_deref(), Some("p-id"));
        assert_eq!(options.tenant_name.as_deref(), Some("p-name"));
    }

    #[test]
    fn test_domain_scope_precedence() {
        let auth = AuthEntry {
            domain_id: Some("generic".to_string()),
            project_domain_id: Some("project".to_string()),
            domain_name: Some("Generic".to_string()),
            project_domain_name: Some("Project".to_string()),
            user_domain_name: Some("User".to_string()),
            ..Default::default()
        };

        let options = AuthOptions::from_entry(&auth).with_domain_scope(&auth);
        assert_eq!(options.domain_id.as_deref(), Some("project"));
        assert_eq!(options.domain_name.as_deref(), Some("User"));

        let generic_only = AuthEntry {
            domain_id: Some("generic".to_string()),
            ..Default::default()
        };
        let options = AuthOptions::from_entry(&generic_only).with_domain_scope(&generic_only);
        assert_eq!(options.domain_id.as_deref(), Some("generic"));
    }

    #[test]
    fn test_env_beats_file() {
        let ctx = empty_ctx().with_var("OS_AUTH_URL", "https://b");

        let options = AuthOptions::from_entry(&full_entry()).with_env_overrides(&ctx, "OS_");
        assert_eq!(options.endpoint(), "https://b");
        assert_eq!(options.username(), "user");
    }

    #[test]
    fn test_project_aliases_win() {
        let ctx = empty_ctx()
            .with_var("OS_TENANT_ID", "x")
            .with_var("OS_PROJECT_ID", "y")
            .with_var("OS_TENANT_NAME", "tenant")
            .with_var("OS_PROJECT_NAME", "project")
            .with_var("OS_DOMAIN_ID", "d")
            .with_var("OS_PROJECT_DOMAIN_ID", "pd")
            .with_var("OS_DOMAIN_NAME", "D");

        let options = AuthOptions::default().with_env_overrides(&ctx, "OS_");
        assert_eq!(options.tenant_id.as_deref(), Some("y"));
        assert_eq!(options.tenant_name.as_deref(), Some("project"));
        assert_eq!(options.domain_id.as_deref(), Some("pd"));
        assert_eq!(options.domain_name.as_deref(), Some("D"));
    }

    #[test]
    fn test_project_domain_name_alias_wins() {
        let ctx = empty_ctx()
            .with_var("OS_DOMAIN_NAME", "Generic")
            .with_var("OS_PROJECT_DOMAIN_NAME", "Projects");

        let options = AuthOptions::default().with_env_overrides(&ctx, "OS_");
        assert_eq!(options.domain_name.as_deref(), Some("Projects"));
    }

    #[test]
    fn test_env_beats_domain_scope() {
        let auth = AuthEntry {
            user_domain_name: Some("FileUsers".to_string()),
            project_domain_id: Some("file-project-domain".to_string()),
            ..full_entry()
        };
        let ctx = empty_ctx()
            .with_var("OS_DOMAIN_NAME", "EnvDomain")
            .with_var("OS_DOMAIN_ID", "env-domain");

        let scoped = AuthOptions::from_entry(&auth).with_domain_scope(&auth);
        assert_eq!(scoped.domain_name.as_deref(), Some("FileUsers"));
        assert_eq!(scoped.domain_id.as_deref(), Some("file-project-domain"));

        let options = scoped.with_env_overrides(&ctx, "OS_");
        assert_eq!(options.domain_name.as_deref(), Some("EnvDomain"));
        assert_eq!(options.domain_id.as_deref(), Some("env-domain"));
    }

    #[test]
    fn test_custom_prefix() {
        let ctx = empty_ctx()
            .with_var("OS_USERNAME", "ignored")
            .with_var("ALT_USERNAME", "alt");

        let options = AuthOptions::from_entry(&full_entry()).with_env_overrides(&ctx, "ALT_");
        assert_eq!(options.username(), "alt");
    }

    #[test]
    fn test_validate_reports_first_missing() {
        let missing_all = AuthOptions::default().validate();
        assert!(matches!(missing_all, Err(ConfigError::MissingInput(ref f)) if f == "authURL"));

        let missing_user = AuthOptions {
            endpoint: Some("https://a".to_string()),
            ..Default::default()
        }
        .validate();
        assert!(matches!(missing_user, Err(ConfigError::MissingInput(ref f)) if f == "username"));

        let missing_password = AuthOptions {
            endpoint: Some("https://a".to_string()),
            username: Some("user".to_string()),
            ..Default::default()
        }
        .validate();
        assert!(
            matches!(missing_password, Err(ConfigError::MissingInput(ref f)) if f == "password")
        );
    }

    #[test]
    fn test_debug_masks_password() {
        let options = AuthOptions::from_entry(&full_entry());
        let debug = format!("{:?}", options);
        assert!(!debug.contains("pass\""));
        assert!(debug.contains("********"));
    }

    #[test]
    fn test_resolve_auth_options_from_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("clouds.yaml"),
            r#"
clouds:
  mycloud:
    auth:
      auth_url: https://a
      username: demo
      password: secret
      project_name: demo
      domain_name: Default
    region_name: RegionOne
"#,
        )
        .unwrap();
        let ctx = ConfigContext::empty(dir.path())
            .with_system_config_dir(dir.path().join("etc"))
            .with_var("OS_AUTH_URL", "https://b");

        let options = resolve_auth_options(&ClientOpts::new(), &ctx).unwrap();
        assert_eq!(options.endpoint(), "https://b");
        assert_eq!(options.tenant_name.as_deref(), Some("demo"));
        assert_eq!(options.domain_name.as_deref(), Some("Default"));

        let cloud = resolve_cloud(&ClientOpts::new(), &ctx).unwrap();
        assert_eq!(cloud.name.as_deref(), Some("mycloud"));
        assert_eq!(cloud.source, Some(dir.path().join("clouds.yaml")));
    }

    #[test]
    fn test_resolve_missing_password_after_overrides() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("clouds.yaml"),
            "clouds:\n  c:\n    auth:\n      auth_url: https://a\n      username: demo\n",
        )
        .unwrap();
        let ctx = ConfigContext::empty(dir.path()).with_system_config_dir(dir.path().join("etc"));

        match resolve_auth_options(&ClientOpts::new(), &ctx) {
            Err(ConfigError::MissingInput(field)) => assert_eq!(field, "password"),
            other => panic!("Expected MissingInput, got {:?}", other),
        }

        let ctx = ctx.with_var("OS_PASSWORD", "from-env");
        let options = resolve_auth_options(&ClientOpts::new(), &ctx).unwrap();
        assert_eq!(options.password(), "from-env");
    }

    #[test]
    fn test_explicit_auth_info_skips_file() {
        let dir = tempdir().unwrap();
        let ctx = ConfigContext::empty(dir.path()).with_system_config_dir(dir.path().join("etc"));
        let opts = ClientOpts::new().with_auth_info(full_entry());

        let options = resolve_auth_options(&opts, &ctx).unwrap();
        assert_eq!(options.endpoint(), "https://a");

        let ctx = ctx.with_var("OS_CLOUD", "named");
        assert!(matches!(
            resolve_auth_options(&opts, &ctx),
            Err(ConfigError::FileNotFound { .. })
        ));
    }
}
