//! Canonical validation thresholds, loadable from TOML.
//!
//! ```toml
//! [rules]
//! password_min_len = 10
//! vote_max = 10
//! image_extensions = ["png", "webp"]
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// Error returned when loading configuration fails.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io(std::io::Error),
    /// The file is not valid TOML or has wrongly typed keys
    Parse(toml::de::Error),
    /// The values are inconsistent
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Thresholds shared by every command validator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationRules {
    /// Minimum password length
    pub password_min_len: usize,
    /// Lowest accepted vote
    pub vote_min: i64,
    /// Highest accepted vote
    pub vote_max: i64,
    /// Accepted banner image extensions, without dot
    pub image_extensions: Vec<String>,
    /// Maximum feedback comment length
    pub comment_max_len: usize,
    /// Maximum news title length
    pub title_max_len: usize,
    /// Maximum length of names (tourist, refreshment point)
    pub name_max_len: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            password_min_len: 8,
            vote_min: 1,
            vote_max: 5,
            image_extensions: ["jpg", "jpeg", "png", "gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            comment_max_len: 160,
            title_max_len: 100,
            name_max_len: 64,
        }
    }
}

/// Crate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Validation thresholds
    pub rules: ValidationRules,
}

impl Config {
    /// Parses and checks configuration from a TOML string.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Invalid` for inconsistent values.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks that the thresholds are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first inconsistent setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.rules;
        if rules.vote_min > rules.vote_max {
            return Err(ConfigError::Invalid(format!(
                "vote_min ({}) is greater than vote_max ({})",
                rules.vote_min, rules.vote_max
            )));
        }
        if rules.image_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "image_extensions must list at least one extension".to_string(),
            ));
        }
        for (name, value) in [
            ("password_min_len", rules.password_min_len),
            ("comment_max_len", rules.comment_max_len),
            ("title_max_len", rules.title_max_len),
            ("name_max_len", rules.name_max_len),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be greater than 0", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_defaults() {
        let config = Config::from_toml_str("").expect("empty config is valid");

        assert_eq!(config, Config::default());
        assert_eq!(config.rules.password_min_len, 8);
        assert_eq!((config.rules.vote_min, config.rules.vote_max), (1, 5));
    }

    #[test]
    fn partial_rules_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [rules]
            vote_max = 10
            image_extensions = ["webp"]
            "#,
        )
        .unwrap();

        assert_eq!(config.rules.vote_max, 10);
        assert_eq!(config.rules.image_extensions, vec!["webp"]);
        assert_eq!(config.rules.comment_max_len, 160);
    }

    #[test]
    fn inverted_vote_range_is_invalid() {
        let err = Config::from_toml_str("[rules]\nvote_min = 6\n").unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("vote_min"));
    }

    #[test]
    fn zero_length_limit_is_invalid() {
        let err = Config::from_toml_str("[rules]\ntitle_max_len = 0\n").unwrap_err();
        assert!(err.to_string().contains("title_max_len"));
    }

    #[test]
    fn empty_extension_list_is_invalid() {
        let err = Config::from_toml_str("[rules]\nimage_extensions = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[rules]\npasword_min_len = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_rules_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usecase-core.toml");
        std::fs::write(&path, "[rules]\nvote_max = 10\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.rules.vote_max, 10);
        assert_eq!(config.rules.vote_min, 1);
    }

    #[test]
    fn load_rejects_invalid_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usecase-core.toml");
        std::fs::write(&path, "[rules]\nvote_min = 9\n").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load("/nonexistent/usecase-core.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
