//! Service configuration derived from environment variables.

use std::env;
use std::path::PathBuf;
use stock_forecast::TrainingConfig;

/// Runtime configuration for the forecast service.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub bind: String,
    pub port: u16,
    /// Directory receiving the persisted model and scaler on each
    /// successful training run.
    pub artifacts_dir: PathBuf,
    /// Upper bound on uploaded CSV payloads.
    pub max_upload_bytes: usize,
    pub training: TrainingConfig,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            artifacts_dir: PathBuf::from("models"),
            max_upload_bytes: 16 * 1024 * 1024,
            training: TrainingConfig::default(),
        }
    }
}

impl ForecastConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut training = defaults.training.clone();
        training.window = env_usize("FORECAST_WINDOW", training.window);
        training.epochs = env_usize("FORECAST_EPOCHS", training.epochs);

        Self {
            bind: env_str("FORECAST_BIND", &defaults.bind),
            port: env_u16("FORECAST_PORT", defaults.port),
            artifacts_dir: PathBuf::from(env_str(
                "FORECAST_ARTIFACTS_DIR",
                &defaults.artifacts_dir.to_string_lossy(),
            )),
            max_upload_bytes: env_usize("FORECAST_MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            training,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_helpers_fall_back_to_defaults() {
        // Variable names chosen so nothing in the environment matches.
        assert_eq!(env_str("FORECAST_TEST_UNSET_STR", "fallback"), "fallback");
        assert_eq!(env_u16("FORECAST_TEST_UNSET_U16", 61010), 61010);
        assert_eq!(env_usize("FORECAST_TEST_UNSET_USIZE", 7), 7);
    }

    #[test]
    fn test_default_config() {
        let config = ForecastConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.training.window, 60);
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
    }
}
