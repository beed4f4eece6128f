//! Engine configuration from an optional TOML file plus command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nback_core::EngineConfig;

/// Flags that take precedence over the config file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub level: Option<usize>,
    pub trials: Option<usize>,
    pub interval_ms: Option<u64>,
}

pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: EngineConfig =
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!("loaded engine config from {}", path.display());
    Ok(config)
}

pub fn apply_overrides(mut config: EngineConfig, overrides: Overrides) -> EngineConfig {
    if let Some(level) = overrides.level {
        config.initial_level = level;
    }
    if let Some(trials) = overrides.trials {
        config.trials_per_round = trials;
    }
    if let Some(ms) = overrides.interval_ms {
        config.trial_interval_ms = ms;
    }
    config
}

/// Data directory: `NBACK_DATA_DIR` if set, else `~/.nback`.
pub fn data_dir() -> PathBuf {
    std::env::var("NBACK_DATA_DIR")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(nback_store::default_base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_gives_defaults() {
        assert_eq!(load_engine_config(None).unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nback.toml");
        std::fs::write(
            &path,
            "trials_per_round = 30\nmatch_probability = 0.25\nalphabet = [\"A\", \"B\", \"C\"]\n",
        )
        .unwrap();

        let config = load_engine_config(Some(&path)).unwrap();

        assert_eq!(config.trials_per_round, 30);
        assert_eq!(config.match_probability, 0.25);
        assert_eq!(config.alphabet, vec!['A', 'B', 'C']);
        assert_eq!(config.initial_level, EngineConfig::default().initial_level);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_engine_config(Some(Path::new("/nonexistent/nback.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "trials_per_round = \"many\"").unwrap();
        assert!(load_engine_config(Some(&path)).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = apply_overrides(
            EngineConfig::default(),
            Overrides {
                level: Some(4),
                trials: None,
                interval_ms: Some(1500),
            },
        );
        assert_eq!(config.initial_level, 4);
        assert_eq!(config.trials_per_round, 20);
        assert_eq!(config.trial_interval_ms, 1500);
    }
}
