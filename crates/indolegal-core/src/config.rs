//! Site configuration: playback cadence and feed behaviour.
//!
//! Resolution order: built-in defaults, then an optional JSON file, then
//! `INDOLEGAL_*` environment variables. The result is validated before use.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{IndoLegalError, Result};
use crate::feed::FeedConfig;
use crate::playback::PlaybackTimings;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "INDOLEGAL_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub playback: PlaybackTimings,
    pub feed: FeedConfig,
}

impl SiteConfig {
    /// Parse a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SiteConfig = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Keys are the full variable names, e.g. `INDOLEGAL_TYPE_TICK_MS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let p = &mut self.playback;
        override_with(&lookup, "SCAN_TICK_MS", &mut p.scan_tick_ms)?;
        override_with(&lookup, "SCAN_STEP", &mut p.scan_step)?;
        override_with(&lookup, "THINKING_MS", &mut p.thinking_ms)?;
        override_with(&lookup, "SEARCH_AT", &mut p.search_at)?;
        override_with(&lookup, "TYPE_TICK_MS", &mut p.type_tick_ms)?;
        override_with(&lookup, "LOG_TICK_MS", &mut p.log_tick_ms)?;
        override_with(&lookup, "RUBRIC_TICK_MS", &mut p.rubric_tick_ms)?;
        override_with(&lookup, "VERDICT_DELAY_MS", &mut p.verdict_delay_ms)?;

        let f = &mut self.feed;
        override_with(&lookup, "FEED_INTERVAL_MS", &mut f.interval_ms)?;
        override_with(&lookup, "FEED_CAPACITY", &mut f.capacity)?;
        override_with(&lookup, "FEED_ERROR_RATE", &mut f.error_rate)?;
        override_with(&lookup, "FEED_SEED", &mut f.seed)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.playback.validate()?;
        self.feed.validate()?;
        Ok(())
    }

    /// Defaults, then `path` if given, then the environment; validated.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }
}

/// Overwrite `slot` when `{ENV_PREFIX}{suffix}` is set to a non-empty value.
fn override_with<F, T>(lookup: &F, suffix: &str, slot: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: Parse,
{
    let key = format!("{ENV_PREFIX}{suffix}");
    let Some(raw) = lookup(&key) else {
        return Ok(());
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    *slot = T::parse(trimmed).ok_or(IndoLegalError::InvalidEnv { key, value: raw })?;
    Ok(())
}

trait Parse: Sized {
    fn parse(raw: &str) -> Option<Self>;
}

macro_rules! parse_from_str {
    ($($t:ty),*) => {
        $(impl Parse for $t {
            fn parse(raw: &str) -> Option<Self> {
                <$t as FromStr>::from_str(raw).ok()
            }
        })*
    };
}

parse_from_str!(u8, u64, usize, f32, f64);

impl Parse for Option<u64> {
    fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SiteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.playback.type_tick_ms, 30);
        assert_eq!(config.feed.capacity, 20);
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = SiteConfig::default();
        config
            .apply_overrides(env(&[
                ("INDOLEGAL_TYPE_TICK_MS", "5"),
                ("INDOLEGAL_FEED_CAPACITY", "3"),
                ("INDOLEGAL_FEED_SEED", "99"),
                ("INDOLEGAL_SEARCH_AT", "0.25"),
                ("INDOLEGAL_THINKING_MS", "  "),
            ]))
            .expect("overrides parse");
        assert_eq!(config.playback.type_tick_ms, 5);
        assert_eq!(config.playback.search_at, 0.25);
        assert_eq!(config.playback.thinking_ms, 1000);
        assert_eq!(config.feed.capacity, 3);
        assert_eq!(config.feed.seed, Some(99));
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = SiteConfig::default();
        let err = config
            .apply_overrides(env(&[("INDOLEGAL_LOG_TICK_MS", "fast")]))
            .unwrap_err();
        assert!(matches!(
            err,
            IndoLegalError::InvalidEnv { ref key, .. } if key == "INDOLEGAL_LOG_TICK_MS"
        ));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"feed": {{"interval_ms": 250}}}}"#).unwrap();
        let config = SiteConfig::load(file.path()).unwrap();
        assert_eq!(config.feed.interval_ms, 250);
        assert_eq!(config.feed.capacity, 20);
        assert_eq!(config.playback, PlaybackTimings::default());
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let mut config = SiteConfig::default();
        config
            .apply_overrides(env(&[("INDOLEGAL_SCAN_TICK_MS", "0")]))
            .unwrap();
        assert!(matches!(
            config.validate(),
            Err(IndoLegalError::Validation(_))
        ));
    }
}
