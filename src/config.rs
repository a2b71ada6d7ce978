use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::locale::Language;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub palabra: PalabraConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize)]
pub struct PalabraConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for PalabraConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_language: default_language(),
            listen: default_listen(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_language() -> String {
    Language::DEFAULT.code().to_string()
}
fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// No timeout unless configured: a hung call keeps its bundle loading.
    #[serde(default)]
    pub request_timeout: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            request_timeout: None,
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Config {
    /// Language of the startup selection. Validated, so the strict parse holds.
    pub fn default_language(&self) -> Language {
        Language::resolve(&self.palabra.default_language)
    }
}

impl GeminiConfig {
    /// Inline key first, then the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))
    }

    pub fn request_timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.request_timeout
            .as_deref()
            .map(|t| {
                humantime::parse_duration(t)
                    .map_err(|e| ConfigError::Validation(format!("gemini request_timeout '{t}': {e}")))
            })
            .transpose()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(ConfigError::ReadFile)
        .context("reading config file")?;
    let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    config
        .palabra
        .default_language
        .parse::<Language>()
        .map_err(|e| ConfigError::Validation(format!("default_language: {e}")))?;

    config.palabra.listen.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("listen address '{}': {}", config.palabra.listen, e))
    })?;

    if config.gemini.model.trim().is_empty() {
        return Err(ConfigError::Validation("gemini model must not be empty".to_string()).into());
    }

    if !(config.gemini.base_url.starts_with("https://") || config.gemini.base_url.starts_with("http://")) {
        return Err(ConfigError::Validation(format!(
            "gemini base_url '{}' must start with http:// or https://",
            config.gemini.base_url
        ))
        .into());
    }

    config.gemini.request_timeout()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn empty_file_gets_defaults() {
        let config = parse("");
        assert_eq!(config.palabra.log_level, "info");
        assert_eq!(config.default_language(), Language::Es);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert!(config.gemini.request_timeout().unwrap().is_none());
        validate_config(&config).unwrap();
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[palabra]\ndefault_language = \"en\"\n\n[gemini]\nmodel = \"gemini-2.5-pro\"\nrequest_timeout = \"90s\""
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        validate_config(&config).unwrap();
        assert_eq!(config.default_language(), Language::En);
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(
            config.gemini.request_timeout().unwrap(),
            Some(Duration::from_secs(90))
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn rejects_unsupported_default_language() {
        let config = parse("[palabra]\ndefault_language = \"pt\"");
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("default_language"));
    }

    #[test]
    fn rejects_bad_listen_address_and_base_url() {
        assert!(validate_config(&parse("[palabra]\nlisten = \"localhost\"")).is_err());
        assert!(validate_config(&parse("[gemini]\nbase_url = \"ftp://x\"")).is_err());
    }

    #[test]
    fn rejects_unparseable_timeout() {
        let config = parse("[gemini]\nrequest_timeout = \"soon\"");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn inline_api_key_wins_over_env() {
        let config = parse("[gemini]\napi_key = \"inline\"\napi_key_env = \"PALABRA_TEST_UNSET_KEY\"");
        assert_eq!(config.gemini.api_key().unwrap(), "inline");
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let config = parse("[gemini]\napi_key_env = \"PALABRA_TEST_DEFINITELY_UNSET\"");
        let err = config.gemini.api_key().unwrap_err();
        assert!(err.to_string().contains("PALABRA_TEST_DEFINITELY_UNSET"));
    }
}
