//! Gateway configuration
//!
//! Priority (highest to lowest):
//! 1. Environment variables prefixed with `RF_RING_` (e.g. `RF_RING_SERIAL_PORT`)
//! 2. Optional configuration file (TOML, YAML or JSON by extension)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::constants::{
    ALARMS_DB_FILENAME, DEFAULT_SERIAL_PORT, OFFSETS_DB_FILENAME, SCAN_TIMER_SECS,
    TIME_RECONNECT_SECS,
};
use crate::error::{Result, RfRingError};
use crate::serial::SerialSettings;

/// Prefix of the environment overrides
pub const ENV_PREFIX: &str = "RF_RING_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RfRingConfig {
    /// Serial device path (`RF_RING_SERIAL_PORT`)
    pub serial_port: PathBuf,

    /// Seconds between reconnect attempts
    pub reconnect_interval: f64,

    /// Seconds between scan requests
    pub scan_interval: f64,

    /// Offsets parameter store file
    pub offsets_db: PathBuf,

    /// Alarm limits parameter store file
    pub alarms_db: PathBuf,
}

impl Default for RfRingConfig {
    fn default() -> Self {
        Self {
            serial_port: PathBuf::from(DEFAULT_SERIAL_PORT),
            reconnect_interval: TIME_RECONNECT_SECS,
            scan_interval: SCAN_TIMER_SECS,
            offsets_db: PathBuf::from(OFFSETS_DB_FILENAME),
            alarms_db: PathBuf::from(ALARMS_DB_FILENAME),
        }
    }
}

impl RfRingConfig {
    /// Defaults merged with the environment.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment(None)?)
    }

    /// Defaults, then `path`, then the environment.
    pub fn load_with_file(path: &Path) -> Result<Self> {
        Self::from_figment(Self::figment(Some(path))?)
    }

    /// Assemble the provider chain without extracting it.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            let extension = path
                .extension()
                .and_then(|s| s.to_str())
                .ok_or_else(|| RfRingError::config("Config file must have an extension"))?;

            figment = match extension {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => {
                    return Err(RfRingError::config(format!(
                        "Unsupported config file format: {}",
                        extension
                    )))
                },
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.serial_port.as_os_str().is_empty() {
            return Err(RfRingError::config("serial_port cannot be empty"));
        }
        if !(self.reconnect_interval.is_finite() && self.reconnect_interval > 0.0) {
            return Err(RfRingError::config(
                "reconnect_interval must be greater than zero",
            ));
        }
        if !(self.scan_interval.is_finite() && self.scan_interval > 0.0) {
            return Err(RfRingError::config("scan_interval must be greater than zero"));
        }
        Ok(())
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs_f64(self.reconnect_interval)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs_f64(self.scan_interval)
    }

    /// Framing parameters for the configured device.
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings::new(&self.serial_port)
    }
}
