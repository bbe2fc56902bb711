//! Configuration – reads/writes `~/.nku/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use nku_kernel::governor::{DEFAULT_COOLDOWN, DEFAULT_THROTTLE_TEMP_C, GovernorConfig};
use nku_types::NkuError;

/// Persisted runtime configuration stored in `~/.nku/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Temperature (°C) above which inference is paused.
    #[serde(default = "default_throttle_temperature_c")]
    pub throttle_temperature_c: f32,

    /// Mandatory cooldown once the threshold is crossed, in seconds.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,

    /// Cadence of the `/watch` polling loop, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Use a simulated sensor instead of probing the platform. For demos and
    /// development machines without a usable thermal node.
    #[serde(default)]
    pub mock_sensor: bool,

    /// Explicit sysfs temperature node, overriding platform discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_path: Option<String>,
}

fn default_throttle_temperature_c() -> f32 {
    DEFAULT_THROTTLE_TEMP_C
}
fn default_cooldown_seconds() -> u64 {
    DEFAULT_COOLDOWN.as_secs()
}
fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            throttle_temperature_c: default_throttle_temperature_c(),
            cooldown_seconds: default_cooldown_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
            mock_sensor: false,
            sensor_path: None,
        }
    }
}

impl Config {
    /// The thermal-policy portion of this config, in governor terms.
    pub fn governor(&self) -> GovernorConfig {
        GovernorConfig {
            throttle_temperature_c: self.throttle_temperature_c,
            cooldown: Duration::from_secs(self.cooldown_seconds),
        }
    }

    /// Monitor polling cadence.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Return the path to `~/.nku/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".nku").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, NkuError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
///
/// Reads the file only. [`apply_env_overrides`] is a separate step so that
/// `NKU_*` variables also take effect on a machine with no config file yet.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, NkuError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| NkuError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(cfg))
}

/// Apply `NKU_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `NKU_THROTTLE_TEMP_C` | `throttle_temperature_c` |
/// | `NKU_COOLDOWN_SECONDS` | `cooldown_seconds` |
/// | `NKU_POLL_INTERVAL_MS` | `poll_interval_ms` |
/// | `NKU_MOCK_SENSOR` | `mock_sensor` (`1`, `true`, `yes`) |
/// | `NKU_SENSOR_PATH` | `sensor_path` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("NKU_THROTTLE_TEMP_C")
        && let Ok(temp) = v.parse::<f32>() {
            cfg.throttle_temperature_c = temp;
        }
    if let Ok(v) = std::env::var("NKU_COOLDOWN_SECONDS")
        && let Ok(secs) = v.parse::<u64>() {
            cfg.cooldown_seconds = secs;
        }
    if let Ok(v) = std::env::var("NKU_POLL_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>() {
            cfg.poll_interval_ms = ms;
        }
    if let Ok(v) = std::env::var("NKU_MOCK_SENSOR") {
        cfg.mock_sensor = matches!(v.as_str(), "1" | "true" | "yes");
    }
    if let Ok(v) = std::env::var("NKU_SENSOR_PATH") {
        cfg.sensor_path = Some(v);
    }
}

/// Save the config to disk, creating `~/.nku/` if necessary.
pub fn save(cfg: &Config) -> Result<(), NkuError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), NkuError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| NkuError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert!((loaded.throttle_temperature_c - 42.0).abs() < f32::EPSILON);
        assert_eq!(loaded.cooldown_seconds, 30);
        assert_eq!(loaded.poll_interval_ms, 1000);
        assert!(!loaded.mock_sensor);
        assert_eq!(loaded.sensor_path, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, "cooldown_seconds = 60\n").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.cooldown_seconds, 60);
        assert!((loaded.throttle_temperature_c - 42.0).abs() < f32::EPSILON);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn config_path_points_to_nku_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".nku"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn governor_mapping_converts_seconds() {
        let cfg = Config {
            throttle_temperature_c: 40.5,
            cooldown_seconds: 45,
            ..Config::default()
        };
        let governor = cfg.governor();
        assert!((governor.throttle_temperature_c - 40.5).abs() < f32::EPSILON);
        assert_eq!(governor.cooldown, Duration::from_secs(45));
    }

    #[test]
    fn apply_env_overrides_changes_throttle() {
        // SAFETY: this env-var is touched by no other test; no data races.
        unsafe { std::env::set_var("NKU_THROTTLE_TEMP_C", "44.5") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.throttle_temperature_c - 44.5).abs() < f32::EPSILON);
        unsafe { std::env::remove_var("NKU_THROTTLE_TEMP_C") };
    }

    #[test]
    fn apply_env_overrides_changes_cooldown() {
        // SAFETY: this env-var is touched by no other test; no data races.
        unsafe { std::env::set_var("NKU_COOLDOWN_SECONDS", "90") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.cooldown_seconds, 90);
        unsafe { std::env::remove_var("NKU_COOLDOWN_SECONDS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_poll_interval() {
        // SAFETY: this env-var is touched by no other test; no data races.
        unsafe { std::env::set_var("NKU_POLL_INTERVAL_MS", "soonish") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.poll_interval_ms, 1000); // unchanged
        unsafe { std::env::remove_var("NKU_POLL_INTERVAL_MS") };
    }

    #[test]
    fn apply_env_overrides_enables_mock_sensor() {
        // SAFETY: this env-var is touched by no other test; no data races.
        unsafe { std::env::set_var("NKU_MOCK_SENSOR", "1") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!(cfg.mock_sensor);
        unsafe { std::env::remove_var("NKU_MOCK_SENSOR") };
    }

    #[test]
    fn apply_env_overrides_sets_sensor_path() {
        // SAFETY: this env-var is touched by no other test; no data races.
        unsafe { std::env::set_var("NKU_SENSOR_PATH", "/sys/class/hwmon/hwmon0/temp1_input") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(
            cfg.sensor_path.as_deref(),
            Some("/sys/class/hwmon/hwmon0/temp1_input")
        );
        unsafe { std::env::remove_var("NKU_SENSOR_PATH") };
    }
}
