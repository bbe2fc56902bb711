//! Temperature readings from the Linux/Android sysfs thermal interface.
//!
//! The target handsets expose no thermal-management API; the closest usable
//! signal is the battery or SoC temperature node under `/sys`. Discovery
//! probes the well-known Android nodes first, then the generic Linux thermal
//! zones. Every failure past that point degrades to the safe fallback
//! reading, so a missing or flaky node can never take the safety gate down.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use nku_types::SAFE_FALLBACK_TEMP_C;

use crate::sensor::TemperatureSource;

/// Android battery temperature node (reports tenths of a degree Celsius).
const ANDROID_BATTERY_TEMP: &str = "/sys/class/power_supply/battery/temp";
/// Android SoC thermal zone (usually millidegrees Celsius).
const ANDROID_CPU_TEMP: &str = "/sys/devices/virtual/thermal/thermal_zone0/temp";
/// Root of the generic Linux thermal zone tree.
const LINUX_THERMAL_DIR: &str = "/sys/class/thermal";

/// A temperature sensor backed by a sysfs node.
///
/// Construct via [`discover`][Self::discover] on real devices or
/// [`from_path`][Self::from_path] when the operator knows the exact node.
/// A sensor with no usable node still works; it just always reports the
/// fallback temperature.
pub struct SysfsThermalSensor {
    id: String,
    path: Option<PathBuf>,
}

impl SysfsThermalSensor {
    /// Probe the platform for a usable temperature node.
    ///
    /// Order matters: the battery node tracks device skin temperature far
    /// better than the SoC zones on the cheap handsets this runtime targets,
    /// so it wins when present.
    pub fn discover() -> Self {
        if Path::new(ANDROID_BATTERY_TEMP).exists() {
            info!(path = ANDROID_BATTERY_TEMP, "using battery temperature sensor");
            return Self {
                id: "battery".to_string(),
                path: Some(PathBuf::from(ANDROID_BATTERY_TEMP)),
            };
        }

        if Path::new(ANDROID_CPU_TEMP).exists() {
            info!(path = ANDROID_CPU_TEMP, "using SoC temperature sensor");
            return Self {
                id: "cpu".to_string(),
                path: Some(PathBuf::from(ANDROID_CPU_TEMP)),
            };
        }

        if let Some((id, path)) = first_readable_zone() {
            info!(path = %path.display(), "using generic thermal zone sensor");
            return Self { id, path: Some(path) };
        }

        warn!("no thermal sensor found; temperature reads will use the safe fallback");
        Self {
            id: "fallback".to_string(),
            path: None,
        }
    }

    /// Use an explicit sysfs node instead of probing.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            id: "custom".to_string(),
            path: Some(path.into()),
        }
    }

    /// The node this sensor reads, if one was found.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl TemperatureSource for SysfsThermalSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_temperature(&self) -> f32 {
        let Some(path) = &self.path else {
            return SAFE_FALLBACK_TEMP_C;
        };
        match read_celsius(path) {
            Some(celsius) => celsius,
            None => {
                warn!(
                    sensor = %self.id,
                    path = %path.display(),
                    "temperature read failed; using safe fallback"
                );
                SAFE_FALLBACK_TEMP_C
            }
        }
    }
}

/// First `thermal_zone*` directory (sorted) that actually has a `temp` node.
fn first_readable_zone() -> Option<(String, PathBuf)> {
    let entries = fs::read_dir(LINUX_THERMAL_DIR).ok()?;
    let mut zones: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("thermal_zone"))
        })
        .collect();
    zones.sort();

    for zone in zones {
        let candidate = zone.join("temp");
        if candidate.exists() {
            let id = zone
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("thermal_zone")
                .to_string();
            return Some((id, candidate));
        }
    }
    None
}

fn read_celsius(path: &Path) -> Option<f32> {
    let raw = fs::read_to_string(path).ok()?;
    let raw: f32 = raw.trim().parse().ok()?;
    Some(scale_raw(raw))
}

/// Sysfs thermal nodes disagree on units: most zones report millidegrees,
/// the Android battery node reports tenths of a degree, and a handful report
/// plain degrees. Magnitude decides which one we are looking at.
fn scale_raw(raw: f32) -> f32 {
    if raw > 1000.0 {
        raw / 1000.0
    } else if raw > 100.0 {
        raw / 10.0
    } else {
        raw
    }
}
