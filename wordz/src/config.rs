use std::env;
use std::time::Duration;

use dictionary::{ApiSettings, Credentials};

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_PLAYBACK_TIMEOUT_SECONDS: u64 = 15;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} must be a positive whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
    #[error("voice playback requested but this build has no audio output (rebuild with --features voice)")]
    VoiceUnavailable,
}

/// Everything read from the environment, once, at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub base_url: Option<String>,
    pub language: String,
    /// Play each pronunciation clip while rendering.
    pub voice: bool,
    pub request_timeout: Duration,
    pub playback_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let app_id = var("APPLICATION_ID")
            .or_else(|| var("OXFORD_APPLICATION_ID"))
            .ok_or(ConfigError::Missing("APPLICATION_ID"))?;
        let app_key = var("APPLICATION_KEY")
            .or_else(|| var("OXFORD_APPLICATION_KEY"))
            .ok_or(ConfigError::Missing("APPLICATION_KEY"))?;

        let seconds = |name: &'static str, default: u64| match var(name) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
                _ => Err(ConfigError::InvalidSeconds { name, value }),
            },
            None => Ok(Duration::from_secs(default)),
        };

        Ok(Config {
            credentials: Credentials::new(app_id, app_key),
            base_url: var("DICTIONARY_BASE_URL"),
            language: var("DICTIONARY_LANGUAGE").unwrap_or_else(|| "en-gb".to_string()),
            voice: var("VOICE_ACTIVATE").as_deref() == Some("1"),
            request_timeout: seconds("REQUEST_TIMEOUT_SECONDS", DEFAULT_REQUEST_TIMEOUT_SECONDS)?,
            playback_timeout: seconds("PLAYBACK_TIMEOUT_SECONDS", DEFAULT_PLAYBACK_TIMEOUT_SECONDS)?,
        })
    }

    /// Fails when voice is on but nothing can play it.
    pub fn ensure_voice_output(&self, output_available: bool) -> Result<(), ConfigError> {
        if self.voice && !output_available {
            return Err(ConfigError::VoiceUnavailable);
        }
        Ok(())
    }

    pub fn api_settings(&self) -> ApiSettings {
        let defaults = ApiSettings::default();
        ApiSettings {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            language: self.language.clone(),
            timeout: Some(self.request_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn reads_credentials_and_defaults() {
        let config = config(&[("APPLICATION_ID", "id"), ("APPLICATION_KEY", "key")]).unwrap();
        assert_eq!(config.credentials.app_id, "id");
        assert_eq!(config.credentials.app_key, "key");
        assert!(!config.voice);
        assert_eq!(config.language, "en-gb");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.playback_timeout, Duration::from_secs(15));
        assert_eq!(
            config.api_settings().base_url,
            "https://od-api.oxforddictionaries.com/api/v2"
        );
    }

    #[test]
    fn missing_credentials_are_reported() {
        let error = config(&[("APPLICATION_KEY", "key")]).unwrap_err();
        assert!(matches!(error, ConfigError::Missing("APPLICATION_ID")));
        let error = config(&[("APPLICATION_ID", "id"), ("APPLICATION_KEY", "")]).unwrap_err();
        assert!(matches!(error, ConfigError::Missing("APPLICATION_KEY")));
    }

    #[test]
    fn oxford_prefixed_credentials_are_a_fallback() {
        let config = config(&[
            ("OXFORD_APPLICATION_ID", "old-id"),
            ("OXFORD_APPLICATION_KEY", "old-key"),
        ])
        .unwrap();
        assert_eq!(config.credentials.app_id, "old-id");
        assert_eq!(config.credentials.app_key, "old-key");
    }

    #[test]
    fn only_one_enables_voice() {
        let base = [("APPLICATION_ID", "id"), ("APPLICATION_KEY", "key")];
        for (value, expected) in [("1", true), ("0", false), ("true", false), ("yes", false)] {
            let mut vars = base.to_vec();
            vars.push(("VOICE_ACTIVATE", value));
            assert_eq!(config(&vars).unwrap().voice, expected, "VOICE_ACTIVATE={value}");
        }
    }

    #[test]
    fn overrides_and_bad_timeouts() {
        let config_ok = config(&[
            ("APPLICATION_ID", "id"),
            ("APPLICATION_KEY", "key"),
            ("DICTIONARY_BASE_URL", "http://localhost:9000/api/v2"),
            ("DICTIONARY_LANGUAGE", "en-us"),
            ("REQUEST_TIMEOUT_SECONDS", "5"),
        ])
        .unwrap();
        let settings = config_ok.api_settings();
        assert_eq!(settings.base_url, "http://localhost:9000/api/v2");
        assert_eq!(settings.language, "en-us");
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));

        let error = config(&[
            ("APPLICATION_ID", "id"),
            ("APPLICATION_KEY", "key"),
            ("PLAYBACK_TIMEOUT_SECONDS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidSeconds { name: "PLAYBACK_TIMEOUT_SECONDS", .. }
        ));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        for name in ["REQUEST_TIMEOUT_SECONDS", "PLAYBACK_TIMEOUT_SECONDS"] {
            let error = config(&[("APPLICATION_ID", "id"), ("APPLICATION_KEY", "key"), (name, "0")])
                .unwrap_err();
            assert!(
                matches!(error, ConfigError::InvalidSeconds { name: n, .. } if n == name),
                "{name}=0 accepted"
            );
        }
    }

    #[test]
    fn voice_needs_audio_output() {
        let mut config = config(&[("APPLICATION_ID", "id"), ("APPLICATION_KEY", "key")]).unwrap();
        assert!(config.ensure_voice_output(false).is_ok());
        config.voice = true;
        assert!(matches!(
            config.ensure_voice_output(false),
            Err(ConfigError::VoiceUnavailable)
        ));
        assert!(config.ensure_voice_output(true).is_ok());
    }
}
