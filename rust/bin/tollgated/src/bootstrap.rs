//! Startup checks. tollgated refuses to start on any of these.

use jsonwebtoken::Algorithm;

use crate::config::ServerConfig;

/// Ten years. Longer lifetimes are refused at startup.
const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Verify server configuration is ready to serve.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.jwt.signing_key.is_empty() {
        anyhow::bail!(
            "JWT signing key is empty.\n\
             Set [jwt].signing_key or TOLLGATE_SIGNING_KEY."
        );
    }

    let algorithm = config.jwt_algorithm()?;
    let hmac = matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512);
    let has_verifying_key = config
        .jwt
        .verifying_key
        .as_deref()
        .is_some_and(|k| !k.is_empty());
    if !hmac && !has_verifying_key {
        anyhow::bail!("JWT algorithm {:?} requires a verifying key.", algorithm);
    }

    for (name, ttl) in [
        ("access_ttl_secs", config.jwt.access_ttl_secs),
        ("refresh_ttl_secs", config.jwt.refresh_ttl_secs),
    ] {
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&ttl) {
            anyhow::bail!(
                "jwt.{} must be between 1 and {} seconds (got {}).",
                name,
                MAX_TOKEN_TTL_SECS,
                ttl
            );
        }
    }

    if !matches!(config.csrf.cookie_samesite.as_str(), "Lax" | "Strict" | "None") {
        anyhow::bail!(
            "csrf.cookie_samesite must be Lax, Strict or None (got {:?}).",
            config.csrf.cookie_samesite
        );
    }

    if config.allowed_hosts.is_empty() && !config.debug {
        anyhow::bail!("allowed_hosts must be set when debug is off.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ServerConfig {
        toml::from_str(
            r#"
allowed_hosts = ["api.example.com"]

[storage]
data_dir = "/tmp"

[jwt]
signing_key = "test"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_config() {
        assert!(verify_config(&valid()).is_ok());
    }

    #[test]
    fn test_empty_signing_key() {
        let mut config = valid();
        config.jwt.signing_key.clear();
        assert!(verify_config(&config).is_err());
    }

    #[test]
    fn test_empty_data_dir() {
        let mut config = valid();
        config.storage.data_dir.clear();
        assert!(verify_config(&config).is_err());
    }

    #[test]
    fn test_asymmetric_without_verifying_key() {
        let mut config = valid();
        config.jwt.algorithm = "RS256".into();
        let err = verify_config(&config).unwrap_err();
        assert!(err.to_string().contains("verifying key"));

        config.jwt.verifying_key = Some("-----BEGIN PUBLIC KEY-----".into());
        assert!(verify_config(&config).is_ok());
    }

    #[test]
    fn test_allowed_hosts_required_outside_debug() {
        let mut config = valid();
        config.allowed_hosts.clear();
        assert!(verify_config(&config).is_err());

        config.debug = true;
        assert!(verify_config(&config).is_ok());
    }

    #[test]
    fn test_token_lifetime_bounds() {
        let mut config = valid();
        config.jwt.access_ttl_secs = 0;
        assert!(verify_config(&config).is_err());

        config.jwt.access_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(verify_config(&config).is_ok());

        config.jwt.refresh_ttl_secs = i64::MAX;
        let err = verify_config(&config).unwrap_err();
        assert!(err.to_string().contains("refresh_ttl_secs"));
    }

    #[test]
    fn test_bad_samesite() {
        let mut config = valid();
        config.csrf.cookie_samesite = "lax-ish".into();
        assert!(verify_config(&config).is_err());
    }
}
