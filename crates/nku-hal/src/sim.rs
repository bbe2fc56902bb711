//! Simulated temperature sources for tests, CI, and hardware-free demos.
//!
//! # Example
//!
//! ```rust
//! use nku_hal::sensor::TemperatureSource;
//! use nku_hal::sim::SimThermalSensor;
//!
//! let sensor = SimThermalSensor::at(36.5);
//! let handle = sensor.clone();
//!
//! // The handle steers what the (possibly boxed, given-away) sensor reads.
//! handle.set_temperature(43.0);
//! assert_eq!(sensor.read_temperature(), 43.0);
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use nku_types::SAFE_FALLBACK_TEMP_C;

use crate::sensor::TemperatureSource;

// ────────────────────────────────────────────────────────────────────────────
// Shared-handle sensor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated sensor whose reading is steered from outside.
///
/// Clones share the same underlying value, so a scenario can hold one handle,
/// hand a boxed clone to the component under test, and turn the heat up
/// mid-run.
#[derive(Clone)]
pub struct SimThermalSensor {
    temperature_c: Arc<Mutex<f32>>,
}

impl SimThermalSensor {
    /// Create a sensor reading a comfortable ambient temperature.
    pub fn new() -> Self {
        Self::at(SAFE_FALLBACK_TEMP_C)
    }

    /// Create a sensor pinned at the given temperature.
    pub fn at(temperature_c: f32) -> Self {
        Self {
            temperature_c: Arc::new(Mutex::new(temperature_c)),
        }
    }

    /// Change the simulated temperature for every handle of this sensor.
    pub fn set_temperature(&self, temperature_c: f32) {
        *self
            .temperature_c
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = temperature_c;
    }
}

impl Default for SimThermalSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureSource for SimThermalSensor {
    fn id(&self) -> &str {
        "sim"
    }

    fn read_temperature(&self) -> f32 {
        *self
            .temperature_c
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cooling-curve sensor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated sensor that starts hot and cools linearly toward an ambient
/// floor, for exercising full overheat-and-recover flows without hardware.
pub struct CoolingCurveSensor {
    peak_c: f32,
    ambient_c: f32,
    rate_c_per_s: f32,
    started: Instant,
}

impl CoolingCurveSensor {
    /// Start at `peak_c` and cool by `rate_c_per_s` each second until the
    /// reading bottoms out at `ambient_c`.
    pub fn new(peak_c: f32, ambient_c: f32, rate_c_per_s: f32) -> Self {
        Self {
            peak_c,
            ambient_c,
            rate_c_per_s,
            started: Instant::now(),
        }
    }
}

impl TemperatureSource for CoolingCurveSensor {
    fn id(&self) -> &str {
        "sim_cooling"
    }

    fn read_temperature(&self) -> f32 {
        let cooled = self.peak_c - self.rate_c_per_s * self.started.elapsed().as_secs_f32();
        cooled.max(self.ambient_c)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
