//! Configuration for a podcaster run.
//!
//! Two sources are read at startup:
//! - the process environment (after loading an optional `.env`), which must
//!   provide `OPENAI_API_KEY`;
//! - `channel.yaml` in the working directory, holding the channel metadata
//!   written into the RSS document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHANNEL_FILE: &str = "channel.yaml";

/// Channel metadata from `channel.yaml`.
///
/// ```yaml
/// title: My Reading List
/// link: https://podcasts.example.com/reading
/// description: Articles I meant to read, read aloud.
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
}

impl ChannelConfig {
    /// Load and validate the channel file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ChannelConfig = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::MissingField("title"));
        }
        if self.link.trim().is_empty() {
            return Err(ConfigError::MissingField("link"));
        }
        if self.description.trim().is_empty() {
            return Err(ConfigError::MissingField("description"));
        }
        Url::parse(&self.link).map_err(|e| ConfigError::InvalidLink {
            link: self.link.clone(),
            source: e,
        })?;
        Ok(())
    }
}

/// Settings taken from the environment.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingEnv(API_KEY_VAR))?;

        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("'{0}' is required")]
    MissingEnv(&'static str),

    #[error("Failed to read channel file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse channel file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("channel field `{0}` is required")]
    MissingField(&'static str),

    #[error("channel link {link:?} is not a valid URL: {source}")]
    InvalidLink {
        link: String,
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn write_channel(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CHANNEL_FILE);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_channel() {
        let (_dir, path) = write_channel(
            "title: Reading List\nlink: https://example.com/pod\ndescription: Read aloud.\n",
        );
        let config = ChannelConfig::load(&path).unwrap();
        assert_eq!(config.title, "Reading List");
        assert_eq!(config.link, "https://example.com/pod");
        assert_eq!(config.description, "Read aloud.");
    }

    #[test]
    fn test_missing_field() {
        let (_dir, path) = write_channel("title: Reading List\nlink: https://example.com/pod\n");
        let err = ChannelConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("description")));
    }

    #[test]
    fn test_blank_field() {
        let (_dir, path) =
            write_channel("title: \"  \"\nlink: https://example.com/pod\ndescription: x\n");
        let err = ChannelConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("title")));
    }

    #[test]
    fn test_relative_link_rejected() {
        let (_dir, path) = write_channel("title: t\nlink: not a url\ndescription: d\n");
        let err = ChannelConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLink { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let (_dir, path) = write_channel("title: [unclosed\n");
        let err = ChannelConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChannelConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_settings_require_api_key() {
        let env: HashMap<&str, &str> = HashMap::new();
        let err = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(API_KEY_VAR)));
        assert_eq!(err.to_string(), "'OPENAI_API_KEY' is required");
    }

    #[test]
    fn test_settings_defaults_base_url() {
        let env = HashMap::from([(API_KEY_VAR, "sk-test")]);
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_settings_base_url_override() {
        let env = HashMap::from([(API_KEY_VAR, "sk-test"), (BASE_URL_VAR, "http://127.0.0.1:9000/v1/")]);
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.base_url, "http://127.0.0.1:9000/v1");
        assert!(!format!("{:?}", settings).contains("sk-test"));
    }
}
