//! Runner configuration
//!
//! Loaded from an optional TOML file, then overridden by `REFNET_*`
//! environment variables (`__` separates nested keys, e.g.
//! `REFNET_PARAMS__QUALIFY_BALANCE=300`).

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile};
use refnet_referral::ReferralParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "REFNET";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub log_level: String,
    /// `pretty` or `compact`
    pub log_format: String,
    pub params: ReferralParams,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "compact".to_string(),
            params: ReferralParams::default(),
        }
    }
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: CliConfig = builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("configuration does not match the expected layout")?;
        loaded
            .params
            .validate()
            .context("invalid referral parameters")?;

        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refnet_types::Rank;
    use std::fs;

    const TEST_PREFIX: &str = "REFNET_CONFIG_TEST_UNSET";

    #[test]
    fn test_defaults_without_file() {
        let config = CliConfig::load_with_prefix(None, TEST_PREFIX).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refnet.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"

[params]
qualify_balance = 300
min_direct_partners = 3
direct_rank = "A"
"#,
        )
        .unwrap();

        let config = CliConfig::load_with_prefix(Some(&path), TEST_PREFIX).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, "compact");
        assert_eq!(config.params.qualify_balance, 300);
        assert_eq!(config.params.min_direct_partners, 3);
        assert_eq!(config.params.direct_rank, Rank::A);
        assert_eq!(config.params.bands.len(), 6);
        assert_eq!(config.params.partner_threshold, 100);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(CliConfig::load_with_prefix(Some(&path), TEST_PREFIX).is_err());
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refnet.toml");
        fs::write(&path, "[params]\nprecision = 0\n").unwrap();

        let err = CliConfig::load_with_prefix(Some(&path), TEST_PREFIX).unwrap_err();
        assert!(format!("{err:#}").contains("precision"));
    }
}
