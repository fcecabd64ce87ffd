//! Connection settings and inter-command pauses.
use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT_MS};
use crate::error::{Error, Result};

/// Pauses the instrument needs between writes.
///
/// Stored as milliseconds in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleDelays {
    /// Between the band select and the frequency value.
    #[serde(with = "millis")]
    pub band_select: Duration,
    /// Between writing a query and reading its answer.
    #[serde(with = "millis")]
    pub response: Duration,
    /// After every other setting.
    #[serde(with = "millis")]
    pub inter_command: Duration,
    /// After a frequency change, for the analog output to stabilise.
    #[serde(with = "millis")]
    pub frequency_settle: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        SettleDelays {
            band_select: Duration::from_millis(100),
            response: Duration::from_millis(100),
            inter_command: Duration::from_millis(100),
            frequency_settle: Duration::from_secs(5),
        }
    }
}

impl SettleDelays {
    /// No pauses at all. Useful against a simulated instrument.
    pub const fn none() -> Self {
        SettleDelays {
            band_select: Duration::ZERO,
            response: Duration::ZERO,
            inter_command: Duration::ZERO,
            frequency_settle: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Read timeout of the serial port.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub delays: SettleDelays,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl GeneratorConfig {
    pub fn new(port: impl Into<String>) -> Self {
        GeneratorConfig {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            delays: SettleDelays::default(),
        }
    }

    pub fn from_yaml(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let raw = std::fs::read_to_string(p)
            .map_err(|e| Error::Config(format!("{}: {}", p.display(), e)))?;
        log::debug!("Loading config from {}", p.display());
        Self::from_yaml(&raw)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = GeneratorConfig::from_yaml("port: COM2\n").unwrap();
        assert_eq!(config, GeneratorConfig::new("COM2"));
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.delays.frequency_settle, Duration::from_secs(5));
    }

    #[test]
    fn delays_are_read_in_millis() {
        let yaml = "\
port: /dev/ttyUSB0
baud_rate: 19200
delays:
  band_select: 20
  frequency_settle: 0
";
        let config = GeneratorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(config.delays.band_select, Duration::from_millis(20));
        assert_eq!(config.delays.frequency_settle, Duration::ZERO);
        assert_eq!(config.delays.response, Duration::from_millis(100));
    }

    #[test]
    fn config_survives_yaml() {
        let mut config = GeneratorConfig::new("COM7");
        config.delays = SettleDelays::none();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(GeneratorConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn missing_port_is_config_error() {
        assert!(matches!(
            GeneratorConfig::from_yaml("baud_rate: 9600\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn unreadable_file_is_config_error() {
        assert!(matches!(
            GeneratorConfig::load("/nonexistent/pw2102.yaml"),
            Err(Error::Config(_))
        ));
    }
}
