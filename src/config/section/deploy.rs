//! `[deploy]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [deploy]
//! host = "bycycle.org"                 # Remote host
//! remote_root = "/sites/{host}/webui"  # Base path for this host+app
//! user = ""                            # SSH user (empty = current user)
//! owner = "bycycle"                    # chown target after staging
//! group = "bycycle"
//! env = "production"                   # Target environment
//! identity_file = "~/.ssh/id_deploy"   # Optional SSH identity
//! disallowed_envs = ["development"]    # Environments that must never be deployed
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Deployment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Remote host to deploy to.
    pub host: String,

    /// Remote base path. `{host}` is substituted with the target host.
    pub remote_root: String,

    /// SSH user. Empty means the current user.
    pub user: String,

    /// Owner applied to the staged build directory.
    pub owner: String,

    /// Group applied to the staged build directory.
    pub group: String,

    /// Target environment for this deployment.
    pub env: String,

    /// SSH identity file (tilde-expanded).
    pub identity_file: Option<PathBuf>,

    /// Environments that must never receive a deployment.
    pub disallowed_envs: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            remote_root: "/sites/{host}/webui".to_string(),
            user: String::new(),
            owner: "bycycle".to_string(),
            group: "bycycle".to_string(),
            env: "production".to_string(),
            identity_file: None,
            disallowed_envs: vec!["development".to_string()],
        }
    }
}

impl DeployConfig {
    /// Resolve `remote_root` for the configured host.
    pub fn resolved_remote_root(&self) -> String {
        self.remote_root.replace("{host}", &self.host)
    }

    /// SSH target: `user@host`, or bare `host` when no user is set.
    pub fn ssh_target(&self) -> String {
        if self.user.is_empty() {
            self.host.clone()
        } else {
            format!("{}@{}", self.user, self.host)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_deploy_config() {
        let config = test_parse_config(
            r#"[deploy]
host = "bycycle.org"
user = "deploy"
owner = "bycycle"
group = "www-data"
identity_file = "~/.ssh/id_deploy""#,
        );

        assert_eq!(config.deploy.host, "bycycle.org");
        assert_eq!(config.deploy.ssh_target(), "deploy@bycycle.org");
        assert_eq!(config.deploy.group, "www-data");
        assert_eq!(
            config.deploy.identity_file,
            Some(PathBuf::from("~/.ssh/id_deploy"))
        );
    }

    #[test]
    fn test_deploy_config_defaults() {
        let config = test_parse_config("");

        assert!(config.deploy.host.is_empty());
        assert_eq!(config.deploy.remote_root, "/sites/{host}/webui");
        assert_eq!(config.deploy.env, "production");
        assert_eq!(config.deploy.disallowed_envs, vec!["development"]);
    }

    #[test]
    fn test_remote_root_substitution() {
        let config = test_parse_config("[deploy]\nhost = \"h\"");
        assert_eq!(config.deploy.resolved_remote_root(), "/sites/h/webui");
    }

    #[test]
    fn test_ssh_target_without_user() {
        let config = test_parse_config("[deploy]\nhost = \"bycycle.org\"");
        assert_eq!(config.deploy.ssh_target(), "bycycle.org");
    }
}
