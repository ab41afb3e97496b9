//! Layered application configuration.
//!
//! Defaults, then the YAML file, then `POLICY_GW__*` environment variables
//! (`__` separates nesting levels), then CLI overrides.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use policies::PoliciesConfig;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

pub const ENV_PREFIX: &str = "POLICY_GW__";

/// Keys whose environment values are taken verbatim instead of being parsed
/// into numbers or booleans (`007` must stay `007`).
const VERBATIM_ENV_KEYS: [&str; 4] = [
    "policies.oauth.prod.client_id",
    "policies.oauth.prod.client_secret",
    "policies.oauth.non_prod.client_id",
    "policies.oauth.non_prod.client_secret",
];

fn is_verbatim_key(key: &str) -> bool {
    VERBATIM_ENV_KEYS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(key))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub policies: PoliciesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Socket address to bind.
    ///
    /// # Errors
    /// Fails if `host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid server address {}:{}", self.host, self.port))
    }
}

impl AppConfig {
    /// Load the layered configuration. Without a file, only defaults and
    /// environment variables apply.
    ///
    /// # Errors
    /// Fails if the file cannot be parsed or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let env = Env::prefixed(ENV_PREFIX).split("__");
        for (key, value) in env.iter() {
            if is_verbatim_key(key.as_str()) {
                let key = key.as_str().to_ascii_lowercase();
                figment = figment.merge(Serialized::default(&key, value));
            }
        }
        figment = figment.merge(env.filter(|key| !is_verbatim_key(key.as_str())));

        figment.extract().context("failed to load configuration")
    }

    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose: u8) {
        if let Some(port) = port {
            self.server.port = port;
        }
        self.logging.apply_verbosity(verbose);
    }

    /// Effective configuration as YAML. Secrets are redacted.
    ///
    /// # Errors
    /// Fails if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const YAML: &str = r"
server:
  port: 8081
logging:
  level: debug
  format: json
policies:
  environments:
    uat: https://uat.api.example.com
  oauth:
    non_prod:
      client_id: test-id
      client_secret: test-secret
  timeouts:
    short: 2s
";

    const OVERRIDE_VARS: [&str; 4] = [
        "POLICY_GW__SERVER__PORT",
        "POLICY_GW__POLICIES__OAUTH__PROD__CLIENT_SECRET",
        "POLICY_GW__POLICIES__OAUTH__NON_PROD__CLIENT_ID",
        "POLICY_GW__POLICIES__OAUTH__NON_PROD__CLIENT_SECRET",
    ];

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        temp_env::with_vars_unset(OVERRIDE_VARS, || {
            let cfg = AppConfig::load(None).unwrap();
            assert_eq!(cfg.server.port, 3000);
            assert_eq!(cfg.server.host, "0.0.0.0");
            assert_eq!(cfg.logging.level, "info");
            assert_eq!(cfg.policies.subscription_country, "EUR");
            assert_eq!(cfg.policies.timeouts.long, Duration::from_secs(30));
        });
    }

    #[test]
    fn yaml_overrides_defaults() {
        let file = write_config(YAML);
        let cfg = temp_env::with_vars_unset(OVERRIDE_VARS, || {
            AppConfig::load(Some(file.path())).unwrap()
        });

        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.logging.format, crate::logging::LogFormat::Json);
        assert_eq!(cfg.policies.timeouts.short, Duration::from_secs(2));
        assert_eq!(cfg.policies.timeouts.long, Duration::from_secs(30));
        assert_eq!(cfg.policies.oauth.non_prod.client_secret.expose(), "test-secret");
    }

    #[test]
    fn env_overrides_yaml() {
        let file = write_config(YAML);
        temp_env::with_vars(
            [
                ("POLICY_GW__SERVER__PORT", Some("9090")),
                ("POLICY_GW__POLICIES__OAUTH__PROD__CLIENT_SECRET", Some("from-env")),
            ],
            || {
                let cfg = AppConfig::load(Some(file.path())).unwrap();
                assert_eq!(cfg.server.port, 9090);
                assert_eq!(cfg.policies.oauth.prod.client_secret.expose(), "from-env");
            },
        );
    }

    #[test]
    fn numeric_credentials_from_env_stay_strings() {
        temp_env::with_vars(
            [
                ("POLICY_GW__SERVER__PORT", None),
                ("POLICY_GW__POLICIES__OAUTH__PROD__CLIENT_SECRET", Some("123456")),
                ("POLICY_GW__POLICIES__OAUTH__NON_PROD__CLIENT_ID", Some("4711")),
                ("POLICY_GW__POLICIES__OAUTH__NON_PROD__CLIENT_SECRET", Some("007")),
            ],
            || {
                let cfg = AppConfig::load(None).unwrap();
                assert_eq!(cfg.policies.oauth.prod.client_secret.expose(), "123456");
                assert_eq!(cfg.policies.oauth.non_prod.client_id, "4711");
                assert_eq!(cfg.policies.oauth.non_prod.client_secret.expose(), "007");
                assert_eq!(cfg.server.port, 3000);
            },
        );
    }

    #[test]
    fn cli_port_wins() {
        let mut cfg = AppConfig::default();
        cfg.apply_cli_overrides(Some(7000), 2);
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("server:\n  prot: 1\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn print_config_redacts_secrets() {
        let file = write_config(YAML);
        let cfg = temp_env::with_vars_unset(OVERRIDE_VARS, || {
            AppConfig::load(Some(file.path())).unwrap()
        });
        let yaml = cfg.to_yaml().unwrap();
        assert!(!yaml.contains("test-secret"));
        assert!(yaml.contains("[REDACTED]"));
    }

    #[test]
    fn bind_addr_parses() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr().unwrap().port(), 3000);
        let bad = ServerConfig {
            host: "not an ip".to_owned(),
            port: 1,
        };
        assert!(bad.bind_addr().is_err());
    }
}
