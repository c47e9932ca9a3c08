use crate::error::{Result, TelemetryError};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoverConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub scene: SceneSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RefreshSettings {
    /// Tick period of the refresh loop
    pub interval_ms: u64,
    /// Chance that a tick finds the link up
    pub connect_probability: f64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            connect_probability: 0.9,
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorSettings {
    pub point_count: usize,
    pub trajectory_len: usize,
    /// Fixed seed for reproducible runs; entropy when unset
    pub seed: Option<u64>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            point_count: 1000,
            trajectory_len: 100,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SceneSettings {
    pub frame_interval_ms: u64,
    pub width: u32,
    pub height: u32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            width: 1280,
            height: 720,
        }
    }
}

impl SceneSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl RoverConfig {
    pub fn validate(self) -> Result<Self> {
        if !(0.0..=1.0).contains(&self.refresh.connect_probability) {
            return Err(TelemetryError::InvalidConfig(format!(
                "refresh.connect_probability must be within [0, 1], got {}",
                self.refresh.connect_probability
            )));
        }
        if self.refresh.interval_ms == 0 {
            return Err(TelemetryError::InvalidConfig(
                "refresh.interval_ms must be positive".to_string(),
            ));
        }
        if self.scene.frame_interval_ms == 0 {
            return Err(TelemetryError::InvalidConfig(
                "scene.frame_interval_ms must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Defaults, then `config/rover.toml` if present, then `ROVER__SECTION__KEY` variables
pub fn load_rover_config() -> Result<RoverConfig> {
    load_from("config/rover", env_source())
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix("ROVER")
        .separator("__")
        .try_parsing(true)
}

fn load_from(file_name: &str, env: config::Environment) -> Result<RoverConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(file_name).required(false))
        .add_source(env)
        .build()?;

    settings.try_deserialize::<RoverConfig>()?.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> Result<RoverConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        settings.try_deserialize::<RoverConfig>()?.validate()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.refresh.interval(), Duration::from_secs(5));
        assert_eq!(config.refresh.connect_probability, 0.9);
        assert_eq!(config.generator.point_count, 1000);
        assert_eq!(config.generator.trajectory_len, 100);
        assert!(config.generator.seed.is_none());
        assert_eq!(config.scene.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_partial_override() {
        let config = from_toml(
            r#"
            [refresh]
            interval_ms = 2000

            [generator]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.refresh.interval_ms, 2000);
        assert_eq!(config.refresh.connect_probability, 0.9);
        assert_eq!(config.generator.seed, Some(42));
        assert_eq!(config.generator.point_count, 1000);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = from_toml("[refresh]\nconnect_probability = 1.5\n").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidConfig(_)));
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let mut map = config::Map::new();
        for (key, value) in vars {
            map.insert(key.to_string(), value.to_string());
        }
        env_source().source(Some(map))
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = load_from(
            "config/missing",
            env(&[
                ("ROVER__REFRESH__INTERVAL_MS", "2000"),
                ("ROVER__GENERATOR__SEED", "7"),
                ("ROVER__REFRESH__CONNECT_PROBABILITY", "0.5"),
            ]),
        )
        .unwrap();
        assert_eq!(config.refresh.interval(), Duration::from_secs(2));
        assert_eq!(config.refresh.connect_probability, 0.5);
        assert_eq!(config.generator.seed, Some(7));
        assert_eq!(config.generator.point_count, 1000);
    }

    #[test]
    fn test_env_bad_probability_rejected() {
        let err = load_from(
            "config/missing",
            env(&[("ROVER__REFRESH__CONNECT_PROBABILITY", "2.5")]),
        )
        .unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidConfig(_)));
    }

    #[test]
    fn test_env_wins_over_file() {
        // Tests run from the package root, where config/rover.toml lives
        let config = load_from("config/rover", env(&[("ROVER__SCENE__WIDTH", "640")])).unwrap();
        assert_eq!(config.scene.width, 640);
        assert_eq!(config.scene.height, 720);
        assert_eq!(config.refresh.interval_ms, 5000);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = from_toml("[refresh]\ninterval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("interval_ms"));
    }
}
