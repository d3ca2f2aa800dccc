//! Named counter definitions loaded from `~/.wrapcount/config.toml`.
//!
//! ```toml
//! [counters.slot]
//! threshold = 0
//! ceiling = 15
//! start = 3
//!
//! [counters.weekday]
//! threshold = 1
//! ceiling = 7
//! start = 9
//! circular_start = true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use toml::de::Error as TomlError;
use wrapcount_types::{BoundedCyclicCounter, CounterError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config: {0}")]
    Parse(#[from] TomlError),
    #[error("no counter named `{0}` in config")]
    UnknownCounter(String),
    #[error("counter `{name}` is invalid: {source}")]
    Counter { name: String, source: CounterError },
}

#[derive(Debug, Default, Deserialize)]
pub struct WrapcountConfig {
    #[serde(default)]
    pub counters: BTreeMap<String, CounterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    pub threshold: i64,
    pub ceiling: i64,
    /// Initial position. Defaults to the threshold.
    pub start: Option<i64>,
    /// Wrap an out-of-range `start` instead of rejecting it.
    #[serde(default)]
    pub circular_start: bool,
}

impl CounterConfig {
    pub fn build(&self) -> Result<BoundedCyclicCounter, CounterError> {
        let mut counter = BoundedCyclicCounter::new(self.threshold, self.ceiling)?;
        if let Some(start) = self.start {
            if self.circular_start {
                counter.move_to_circular(start);
            } else {
                counter.move_to(start)?;
            }
        }
        Ok(counter)
    }
}

impl WrapcountConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads the user config. Missing files yield `None`; unreadable or
    /// malformed ones are logged and also yield `None`.
    pub fn load() -> Option<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return None;
            }
        };

        match Self::from_toml_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                None
            }
        }
    }

    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    pub fn counter(&self, name: &str) -> Result<BoundedCyclicCounter, ConfigError> {
        let config = self
            .counters
            .get(name)
            .ok_or_else(|| ConfigError::UnknownCounter(name.to_string()))?;
        build_named(name, config)
    }

    pub fn build_all(&self) -> Result<BTreeMap<String, BoundedCyclicCounter>, ConfigError> {
        self.counters
            .iter()
            .map(|(name, config)| Ok((name.clone(), build_named(name, config)?)))
            .collect()
    }
}

fn build_named(name: &str, config: &CounterConfig) -> Result<BoundedCyclicCounter, ConfigError> {
    let counter = config.build().map_err(|source| ConfigError::Counter {
        name: name.to_string(),
        source,
    })?;
    tracing::debug!(name, %counter, "Built counter from config");
    Ok(counter)
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wrapcount").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WrapcountConfig};
    use std::fs;
    use wrapcount_types::CounterError;

    const SAMPLE: &str = r"
[counters.slot]
threshold = 0
ceiling = 15
start = 3

[counters.weekday]
threshold = 1
ceiling = 7
start = 9
circular_start = true

[counters.ring]
threshold = -4
ceiling = 4
";

    #[test]
    fn parses_named_counters() {
        let config = WrapcountConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.counters.len(), 3);

        assert_eq!(config.counter("slot").unwrap().current(), 3);
        assert_eq!(config.counter("weekday").unwrap().current(), 3);
        assert_eq!(config.counter("ring").unwrap().current(), -4);
    }

    #[test]
    fn empty_config_has_no_counters() {
        let config = WrapcountConfig::from_toml_str("").unwrap();
        assert!(config.counters.is_empty());
        assert!(config.build_all().unwrap().is_empty());
    }

    #[test]
    fn unknown_counter_is_reported() {
        let config = WrapcountConfig::from_toml_str(SAMPLE).unwrap();
        assert!(matches!(
            config.counter("missing"),
            Err(ConfigError::UnknownCounter(name)) if name == "missing"
        ));
    }

    #[test]
    fn strict_start_outside_range_is_rejected() {
        let config = WrapcountConfig::from_toml_str(
            "[counters.bad]\nthreshold = 2\nceiling = 7\nstart = 10\n",
        )
        .unwrap();
        let err = config.build_all().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Counter {
                ref name,
                source: CounterError::OutOfRange { target: 10, .. },
            } if name == "bad"
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config =
            WrapcountConfig::from_toml_str("[counters.bad]\nthreshold = 9\nceiling = 3\n").unwrap();
        assert!(matches!(
            config.counter("bad"),
            Err(ConfigError::Counter {
                source: CounterError::InvalidRange { .. },
                ..
            })
        ));
    }

    #[test]
    fn missing_bound_is_a_parse_error() {
        let err = WrapcountConfig::from_toml_str("[counters.half]\nthreshold = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn reads_config_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let counters = WrapcountConfig::from_path(&path)
            .unwrap()
            .build_all()
            .unwrap();
        assert_eq!(
            counters.keys().collect::<Vec<_>>(),
            ["ring", "slot", "weekday"]
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        let err = WrapcountConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { path: ref p, .. } if *p == path));
    }

    #[test]
    fn load_from_returns_parsed_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = WrapcountConfig::load_from(&path).expect("config loads");
        assert_eq!(config.counter("slot").unwrap().current(), 3);
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(WrapcountConfig::load_from(&dir.path().join("absent.toml")).is_none());
    }

    #[test]
    fn load_from_unreadable_path_is_none() {
        // A directory exists but cannot be read as a file.
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(WrapcountConfig::load_from(dir.path()).is_none());
    }

    #[test]
    fn load_from_malformed_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[counters.slot]\nthreshold = \"zero\"\n").unwrap();
        assert!(WrapcountConfig::load_from(&path).is_none());
    }

    #[test]
    fn default_path_lives_under_home() {
        if let Some(path) = WrapcountConfig::path() {
            assert!(path.ends_with(".wrapcount/config.toml"));
        }
    }
}
