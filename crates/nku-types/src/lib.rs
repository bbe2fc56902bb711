use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Temperature substituted whenever no sensor reading is available.
/// Moderate and non-triggering: a dead sensor must neither block screening
/// forever nor report the device as dangerously hot.
pub const SAFE_FALLBACK_TEMP_C: f32 = 35.0;

/// One observation of the thermal admission gate, immutable once emitted.
///
/// The `message` wording is part of the observable contract: the screening UI
/// and the tests both match on the exact strings, so construction goes through
/// the helpers below rather than ad-hoc `format!` at call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalStatus {
    /// Whether inference may proceed right now.
    pub safe: bool,
    /// Last sampled device temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Human-readable status line (e.g., "OK: 36.5°C").
    pub message: String,
    /// Seconds left in the mandatory cooldown. `Some` only while `safe` is
    /// false and a cooldown is pending; never `Some` on a safe status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_remaining_s: Option<u64>,
}

impl ThermalStatus {
    /// Optimistic status published before the first evaluation runs.
    pub fn initializing() -> Self {
        Self {
            safe: true,
            temperature_c: SAFE_FALLBACK_TEMP_C,
            message: "Initializing...".to_string(),
            cooldown_remaining_s: None,
        }
    }

    /// Temperature at or below the throttle threshold; inference may run.
    pub fn ok(temperature_c: f32) -> Self {
        Self {
            safe: true,
            temperature_c,
            message: format!("OK: {temperature_c:.1}°C"),
            cooldown_remaining_s: None,
        }
    }

    /// Overheat just detected; a full cooldown of `cooldown_s` begins now.
    pub fn too_hot(temperature_c: f32, cooldown_s: u64) -> Self {
        Self {
            safe: false,
            temperature_c,
            message: format!("Too hot: {temperature_c:.1}°C - pausing inference"),
            cooldown_remaining_s: Some(cooldown_s),
        }
    }

    /// Mid-cooldown status with `remaining_s` seconds still to wait.
    pub fn cooling_down(temperature_c: f32, remaining_s: u64) -> Self {
        Self {
            safe: false,
            temperature_c,
            message: format!("Cooling down: {remaining_s}s remaining"),
            cooldown_remaining_s: Some(remaining_s),
        }
    }

    /// Status after an external reset cleared any pending cooldown.
    pub fn reset_ready(temperature_c: f32) -> Self {
        Self {
            safe: true,
            temperature_c,
            message: "Reset - ready".to_string(),
            cooldown_remaining_s: None,
        }
    }
}

/// Serializable thermal snapshot for logs and field-support bundles: the
/// current status plus the configuration and sensor it was produced under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalReport {
    pub safe: bool,
    pub temperature_c: f32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_remaining_s: Option<u64>,
    /// Threshold above which inference is paused.
    pub throttle_temperature_c: f32,
    /// Id of the sensor the reading came from (e.g., "battery", "sim").
    pub source: String,
    pub generated_at: DateTime<Utc>,
}

impl ThermalReport {
    pub fn new(status: ThermalStatus, throttle_temperature_c: f32, source: &str) -> Self {
        Self {
            safe: status.safe,
            temperature_c: status.temperature_c,
            message: status.message,
            cooldown_remaining_s: status.cooldown_remaining_s,
            throttle_temperature_c,
            source: source.to_string(),
            generated_at: Utc::now(),
        }
    }
}

/// Error type for the host plumbing (config files, CLI). Thermal evaluation
/// itself never returns one of these: the gate always produces a value.
#[derive(Error, Debug)]
pub enum NkuError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializing_is_optimistic() {
        let status = ThermalStatus::initializing();
        assert!(status.safe);
        assert!((status.temperature_c - SAFE_FALLBACK_TEMP_C).abs() < f32::EPSILON);
        assert_eq!(status.message, "Initializing...");
        assert_eq!(status.cooldown_remaining_s, None);
    }

    #[test]
    fn ok_message_has_one_decimal_place() {
        let status = ThermalStatus::ok(36.0);
        assert!(status.safe);
        assert_eq!(status.message, "OK: 36.0°C");
        assert_eq!(status.cooldown_remaining_s, None);
    }

    #[test]
    fn too_hot_carries_full_cooldown() {
        let status = ThermalStatus::too_hot(43.3, 30);
        assert!(!status.safe);
        assert_eq!(status.message, "Too hot: 43.3°C - pausing inference");
        assert_eq!(status.cooldown_remaining_s, Some(30));
    }

    #[test]
    fn cooling_down_counts_remaining_seconds() {
        let status = ThermalStatus::cooling_down(41.2, 25);
        assert!(!status.safe);
        assert_eq!(status.message, "Cooling down: 25s remaining");
        assert_eq!(status.cooldown_remaining_s, Some(25));
    }

    #[test]
    fn reset_ready_is_safe_with_no_cooldown() {
        let status = ThermalStatus::reset_ready(30.0);
        assert!(status.safe);
        assert_eq!(status.message, "Reset - ready");
        assert_eq!(status.cooldown_remaining_s, None);
    }

    #[test]
    fn cooldown_field_is_absent_from_safe_json() {
        let json = serde_json::to_string(&ThermalStatus::ok(36.5)).unwrap();
        assert!(!json.contains("cooldown_remaining_s"));
    }

    #[test]
    fn cooldown_field_is_present_in_throttled_json() {
        let json = serde_json::to_string(&ThermalStatus::too_hot(43.0, 30)).unwrap();
        assert!(json.contains("\"cooldown_remaining_s\":30"));
    }

    #[test]
    fn thermal_status_roundtrip() {
        let status = ThermalStatus::cooling_down(40.7, 12);
        let json = serde_json::to_string(&status).unwrap();
        let back: ThermalStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back.safe, status.safe);
        assert_eq!(back.message, status.message);
        assert_eq!(back.cooldown_remaining_s, Some(12));
    }

    #[test]
    fn report_carries_threshold_and_source() {
        let report = ThermalReport::new(ThermalStatus::ok(36.5), 42.0, "battery");
        assert!(report.safe);
        assert_eq!(report.source, "battery");
        assert!((report.throttle_temperature_c - 42.0).abs() < f32::EPSILON);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"source\":\"battery\""));
        assert!(!json.contains("cooldown_remaining_s"));
    }

    #[test]
    fn nku_error_display() {
        let err = NkuError::Config("missing home directory".to_string());
        assert!(err.to_string().contains("missing home directory"));

        let err2 = NkuError::Io(std::io::Error::other("sensor node vanished"));
        assert!(err2.to_string().contains("sensor node vanished"));
    }
}
