//! Configuration for the TaaS CLI.
//!
//! Each setting is resolved from its environment variable first, then from an
//! optional JSON config file, then from a built-in default.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DIAGNOSTICS_API_URL_ENV: &str = "DIAGNOSTICS_API_URL";
pub const PLATFORM_API_HOST_ENV: &str = "AKKERIS_API_HOST";
pub const PLATFORM_API_TOKEN_ENV: &str = "AKKERIS_API_TOKEN";
pub const BETA_ENV: &str = "TAAS_BETA";
pub const CONFIG_PATH_ENV: &str = "TAAS_CONFIG_PATH";

const DEFAULT_DIAGNOSTICS_API_URL: &str = "https://alamo-self-diagnostics.octanner.io";
const DEFAULT_PLATFORM_API_HOST: &str = "apps.akkeris.io";

/// On-disk configuration. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub diagnostics_api_url: Option<String>,
    #[serde(default)]
    pub platform_api_host: Option<String>,
    #[serde(default)]
    pub beta: Option<bool>,
}

impl ConfigFile {
    /// Read the config file, treating a missing file as empty.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaasConfig {
    /// Base URL of the TaaS service, without a trailing slash.
    pub taas_base_url: String,
    /// Base URL of the platform API, without a trailing slash.
    pub platform_base_url: String,
    pub api_token: Option<String>,
    /// Whether beta commands are exposed.
    pub beta: bool,
}

impl TaasConfig {
    /// Resolve settings from the process environment and the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        let file = ConfigFile::load(&default_config_path())?;
        let mut config = Self::resolve(file, |key| env::var(key).ok());
        if config.api_token.is_none() {
            config.api_token = netrc_token_for(&config.platform_base_url);
        }
        Ok(config)
    }

    /// Resolve settings from a config file and an environment lookup.
    pub fn resolve(file: ConfigFile, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let taas_base_url = lookup(DIAGNOSTICS_API_URL_ENV)
            .or(file.diagnostics_api_url)
            .unwrap_or_else(|| DEFAULT_DIAGNOSTICS_API_URL.to_string());
        let platform_host = lookup(PLATFORM_API_HOST_ENV)
            .or(file.platform_api_host)
            .unwrap_or_else(|| DEFAULT_PLATFORM_API_HOST.to_string());
        let beta = match lookup(BETA_ENV) {
            Some(value) => is_truthy(&value),
            None => file.beta.unwrap_or(false),
        };

        Self {
            taas_base_url: trim_base(&taas_base_url),
            platform_base_url: trim_base(&with_scheme(&platform_host)),
            api_token: lookup(PLATFORM_API_TOKEN_ENV),
            beta,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Hosts may be configured bare; HTTPS is implied.
fn with_scheme(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Get the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taas")
        .join("config.json")
}

fn netrc_token_for(base_url: &str) -> Option<String> {
    let host = url::Url::parse(base_url).ok()?.host_str()?.to_string();
    let content = fs::read_to_string(home_dir()?.join(".netrc")).ok()?;
    parse_netrc_password(&content, &host)
}

/// Minimal `.netrc` reader: returns the `password` of the `machine` stanza
/// matching `host`.
fn parse_netrc_password(content: &str, host: &str) -> Option<String> {
    let mut tokens = content.split_whitespace();
    let mut in_machine = false;

    while let Some(token) = tokens.next() {
        match token {
            "machine" => in_machine = tokens.next().is_some_and(|name| name.eq_ignore_ascii_case(host)),
            "default" => in_machine = false,
            "password" if in_machine => return tokens.next().map(str::to_string),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env_or_file() {
        let config = TaasConfig::resolve(ConfigFile::default(), env_of(&[]));
        assert_eq!(config.taas_base_url, "https://alamo-self-diagnostics.octanner.io");
        assert_eq!(config.platform_base_url, "https://apps.akkeris.io");
        assert!(!config.beta);
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn env_overrides_file() {
        let file = ConfigFile {
            diagnostics_api_url: Some("https://taas.example.com/".into()),
            platform_api_host: Some("apps.example.com".into()),
            beta: Some(true),
        };
        let config = TaasConfig::resolve(
            file,
            env_of(&[
                (DIAGNOSTICS_API_URL_ENV, "http://localhost:5000/"),
                (BETA_ENV, "false"),
                (PLATFORM_API_TOKEN_ENV, "token-123"),
            ]),
        );
        assert_eq!(config.taas_base_url, "http://localhost:5000");
        assert_eq!(config.platform_base_url, "https://apps.example.com");
        assert!(!config.beta);
        assert_eq!(config.api_token.as_deref(), Some("token-123"));
    }

    #[test]
    fn beta_accepts_one_and_true() {
        for value in ["1", "true", "TRUE"] {
            assert!(TaasConfig::resolve(ConfigFile::default(), env_of(&[(BETA_ENV, value)])).beta);
        }
        assert!(!TaasConfig::resolve(ConfigFile::default(), env_of(&[(BETA_ENV, "yes")])).beta);
    }

    #[test]
    fn config_file_missing_is_empty_and_invalid_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(ConfigFile::load(&missing).unwrap(), ConfigFile::default());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        assert!(matches!(ConfigFile::load(&broken), Err(ConfigError::Parse { .. })));

        let valid = dir.path().join("config.json");
        fs::write(&valid, r#"{"beta": true}"#).unwrap();
        assert_eq!(ConfigFile::load(&valid).unwrap().beta, Some(true));
    }

    #[test]
    fn config_path_honours_override() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/taas-test.json"), || {
            assert_eq!(default_config_path(), PathBuf::from("/tmp/taas-test.json"));
        });
    }

    #[test]
    fn netrc_password_for_matching_machine() {
        let content = "machine api.example.com\n  login me\n  password nope\nmachine apps.akkeris.io\n  login me@example.com\n  password secret-token\n";
        assert_eq!(
            parse_netrc_password(content, "apps.akkeris.io").as_deref(),
            Some("secret-token")
        );
        assert_eq!(parse_netrc_password(content, "other.host"), None);
    }
}
