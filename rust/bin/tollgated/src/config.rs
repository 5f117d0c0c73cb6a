//! Server configuration.
//!
//! Loaded from a TOML file, then overlaid with `TOLLGATE_*` environment
//! variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use tollgate_auth::service::{AuthConfig, CsrfConfig, JwtConfig};

const ENV_PREFIX: &str = "TOLLGATE_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Relaxes the allowed-hosts check for local development.
    #[serde(default)]
    pub debug: bool,

    /// Accepted `Host` header values. `.example.com` matches the domain
    /// and its subdomains; `*` matches anything.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,

    pub storage: StorageConfig,

    #[serde(default)]
    pub jwt: JwtSection,

    #[serde(default)]
    pub csrf: CsrfSection,

    /// Component settings (`TOLLGATE_*_SCHEMA` keys).
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtSection {
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// HMAC secret, or a PEM private key for asymmetric algorithms.
    #[serde(default)]
    pub signing_key: String,

    /// PEM public key. Optional for HMAC.
    #[serde(default)]
    pub verifying_key: Option<String>,

    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,

    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
}

impl Default for JwtSection {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            signing_key: String::new(),
            verifying_key: None,
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
        }
    }
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_ttl() -> i64 {
    300
}

fn default_refresh_ttl() -> i64 {
    86400
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfSection {
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub cookie_samesite: String,
    pub cookie_max_age_secs: i64,
}

impl Default for CsrfSection {
    fn default() -> Self {
        let defaults = CsrfConfig::default();
        Self {
            cookie_name: defaults.cookie_name,
            cookie_path: defaults.cookie_path,
            cookie_domain: defaults.cookie_domain,
            cookie_secure: defaults.cookie_secure,
            cookie_samesite: defaults.cookie_samesite,
            cookie_max_age_secs: defaults.cookie_max_age_secs,
        }
    }
}

impl ServerConfig {
    /// Resolve a context name or path to a config file.
    ///
    /// Anything containing `/` or `.` is used as a path; a bare name
    /// resolves to `/etc/tollgate/<name>.toml`.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from("/etc/tollgate").join(format!("{}.toml", name_or_path))
        }
    }

    /// Load from disk and apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: ServerConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.apply_env(std::env::vars());
        Ok(config)
    }

    /// Overlay `TOLLGATE_*` variables.
    pub fn apply_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "DEBUG" => {
                    self.debug = matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
                }
                "ALLOWED_HOSTS" => {
                    self.allowed_hosts = value
                        .split(',')
                        .map(str::trim)
                        .filter(|h| !h.is_empty())
                        .map(String::from)
                        .collect();
                }
                "SIGNING_KEY" => self.jwt.signing_key = value,
                "VERIFYING_KEY" => self.jwt.verifying_key = Some(value),
                "DATA_DIR" => self.storage.data_dir = value,
                _ if name.ends_with("_SCHEMA") => {
                    self.settings.insert(key, value);
                }
                _ => {}
            }
        }
    }

    pub fn jwt_algorithm(&self) -> anyhow::Result<Algorithm> {
        Algorithm::from_str(&self.jwt.algorithm)
            .map_err(|_| anyhow::anyhow!("unsupported JWT algorithm: {}", self.jwt.algorithm))
    }

    /// Build the auth module configuration.
    pub fn auth_config(&self) -> anyhow::Result<AuthConfig> {
        Ok(AuthConfig {
            jwt: JwtConfig {
                algorithm: self.jwt_algorithm()?,
                signing_key: self.jwt.signing_key.clone(),
                verifying_key: self.jwt.verifying_key.clone(),
            },
            access_token_ttl: self.jwt.access_ttl_secs,
            refresh_token_ttl: self.jwt.refresh_ttl_secs,
            csrf: CsrfConfig {
                cookie_name: self.csrf.cookie_name.clone(),
                cookie_path: self.csrf.cookie_path.clone(),
                cookie_domain: self.csrf.cookie_domain.clone(),
                cookie_secure: self.csrf.cookie_secure,
                cookie_samesite: self.csrf.cookie_samesite.clone(),
                cookie_max_age_secs: self.csrf.cookie_max_age_secs,
            },
            settings: self.settings.clone().into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[storage]
data_dir = "/var/lib/tollgate"

[jwt]
signing_key = "s3cret"
"#;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/tollgate/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn test_defaults() {
        let config: ServerConfig = toml::from_str(MINIMAL).unwrap();
        assert!(!config.debug);
        assert!(config.allowed_hosts.is_empty());
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.jwt.access_ttl_secs, 300);
        assert_eq!(config.csrf.cookie_name, "csrftoken");
        assert_eq!(config.csrf.cookie_max_age_secs, 31449600);
        assert!(config.settings.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tollgate.toml");
        std::fs::write(
            &path,
            r#"
debug = true
allowed_hosts = ["api.example.com"]

[storage]
data_dir = "/tmp/tollgate"

[jwt]
algorithm = "HS512"
signing_key = "k"
access_ttl_secs = 60

[csrf]
cookie_secure = true

[settings]
TOLLGATE_USER_SCHEMA = "tollgate_auth::schema::DefaultUserSchema"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.allowed_hosts, ["api.example.com"]);
        assert_eq!(config.jwt_algorithm().unwrap(), Algorithm::HS512);
        assert!(config.csrf.cookie_secure);
        assert_eq!(config.csrf.cookie_samesite, "Lax");

        let auth = config.auth_config().unwrap();
        assert_eq!(auth.access_token_ttl, 60);
        assert_eq!(auth.refresh_token_ttl, 86400);
        assert_eq!(
            auth.settings["TOLLGATE_USER_SCHEMA"],
            "tollgate_auth::schema::DefaultUserSchema"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerConfig::load(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config: ServerConfig = toml::from_str(MINIMAL).unwrap();
        config.apply_env(env(&[
            ("TOLLGATE_DEBUG", "true"),
            ("TOLLGATE_ALLOWED_HOSTS", "a.example.com, .example.org,,"),
            ("TOLLGATE_SIGNING_KEY", "from-env"),
            ("TOLLGATE_DATA_DIR", "/data"),
            ("TOLLGATE_REGISTRATION_CREATE_USER_SCHEMA", "myapp::Signup"),
            ("TOLLGATE_UNRELATED", "ignored"),
            ("HOME", "/root"),
        ]));

        assert!(config.debug);
        assert_eq!(config.allowed_hosts, ["a.example.com", ".example.org"]);
        assert_eq!(config.jwt.signing_key, "from-env");
        assert_eq!(config.storage.data_dir, "/data");
        assert_eq!(config.settings.len(), 1);
        assert_eq!(
            config.settings["TOLLGATE_REGISTRATION_CREATE_USER_SCHEMA"],
            "myapp::Signup"
        );
    }

    #[test]
    fn test_unknown_algorithm() {
        let mut config: ServerConfig = toml::from_str(MINIMAL).unwrap();
        config.jwt.algorithm = "HS999".into();
        assert!(config.auth_config().is_err());
    }
}
