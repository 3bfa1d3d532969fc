//! Configuration file parser for ~/.config/allnews/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use crate::retry::DelayRange;
use crate::sources::FeedSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// Parsed fine but a value is out of range.
    #[error("Invalid config value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that receives `allnews_*.txt` result files.
    pub output_dir: PathBuf,

    /// Per-request timeout covering send and body read.
    pub request_timeout_secs: u64,

    /// Attempts per feed and per article before giving up.
    pub max_attempts: u32,

    /// Wait between failed feed attempts.
    pub feed_retry_delay: DelayRange,

    /// Wait between failed article attempts.
    pub article_retry_delay: DelayRange,

    /// Politeness pause between consecutive articles of one feed.
    pub article_pacing_delay: DelayRange,

    /// Upper bound on any response body.
    pub max_response_bytes: usize,

    /// Result files older than this are removed before each run.
    pub retention_minutes: u64,

    pub user_agent: String,

    /// Replaces the built-in preset list when non-empty.
    pub sources: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
            request_timeout_secs: 60,
            max_attempts: 3,
            feed_retry_delay: DelayRange::new(3.0, 6.0),
            article_retry_delay: DelayRange::new(2.0, 5.0),
            article_pacing_delay: DelayRange::new(1.0, 2.0),
            max_response_bytes: 10 * 1024 * 1024, // 10MB
            retention_minutes: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sources: Vec::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "output_dir",
        "request_timeout_secs",
        "max_attempts",
        "feed_retry_delay",
        "article_retry_delay",
        "article_pacing_delay",
        "max_response_bytes",
        "retention_minutes",
        "user_agent",
        "sources",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range values → `Err(ConfigError::Invalid)`
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to prevent memory exhaustion
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            output_dir = %config.output_dir.display(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Reject values that would make a run misbehave rather than fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        for (key, range) in [
            ("feed_retry_delay", &self.feed_retry_delay),
            ("article_retry_delay", &self.article_retry_delay),
            ("article_pacing_delay", &self.article_pacing_delay),
        ] {
            range
                .check()
                .map_err(|reason| ConfigError::Invalid { key, reason })?;
        }
        for source in &self.sources {
            if source.name.trim().is_empty() || source.url.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "sources",
                    reason: "every source needs a non-empty name and url".to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("./outputs"));
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.feed_retry_delay, DelayRange::new(3.0, 6.0));
        assert_eq!(config.article_retry_delay, DelayRange::new(2.0, 5.0));
        assert_eq!(config.article_pacing_delay, DelayRange::new(1.0, 2.0));
        assert_eq!(config.retention_minutes, 60);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.sources.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/allnews_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "   \n  \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 30\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_attempts, 3); // default
        assert_eq!(config.article_pacing_delay, DelayRange::new(1.0, 2.0)); // default
    }

    #[test]
    fn test_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let content = r#"
output_dir = "/var/tmp/news"
request_timeout_secs = 30
max_attempts = 5
max_response_bytes = 2048
retention_minutes = 15
user_agent = "allnews/0.1"

[feed_retry_delay]
min_secs = 1.0
max_secs = 2.0

[article_retry_delay]
min_secs = 0.5
max_secs = 1.5

[article_pacing_delay]
min_secs = 0.5
max_secs = 1.5

[[sources]]
name = "Example"
url = "https://example.com/rss.xml"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/var/tmp/news"));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.max_response_bytes, 2048);
        assert_eq!(config.retention_minutes, 15);
        assert_eq!(config.user_agent, "allnews/0.1");
        assert_eq!(config.feed_retry_delay, DelayRange::new(1.0, 2.0));
        assert_eq!(config.article_retry_delay, DelayRange::new(0.5, 1.5));
        assert_eq!(config.article_pacing_delay, DelayRange::new(0.5, 1.5));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].name, "Example");
        assert_eq!(config.sources[0].url, "https://example.com/rss.xml");
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let content = r#"
max_attempts = 2
totally_fake_key = "should not fail"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_attempts, 2);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_attempts = \"three\"\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_attempts = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "max_attempts",
                ..
            }
        ));
    }

    #[test]
    fn test_inverted_delay_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[article_retry_delay]\nmin_secs = 5.0\nmax_secs = 2.0\n",
        )
        .unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "article_retry_delay",
                ..
            }
        ));
    }

    #[test]
    fn test_blank_source_rejected() {
        let mut config = Config::default();
        config.sources.push(FeedSource {
            name: " ".to_string(),
            url: "https://example.com/rss".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        // Write a file just over 1MB
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
    }
}
