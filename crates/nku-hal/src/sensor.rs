//! Generic [`TemperatureSource`] trait for device temperature readings.

/// A source of device temperature readings.
///
/// Implementations absorb every failure mode at this boundary: a sensor that
/// cannot be read reports [`SAFE_FALLBACK_TEMP_C`][nku_types::SAFE_FALLBACK_TEMP_C]
/// instead of an error, so consumers above never see a fallible read.
pub trait TemperatureSource: Send + Sync {
    /// Stable identifier for this sensor, e.g. `"battery"` or `"sim"`.
    fn id(&self) -> &str;

    /// Current device temperature in degrees Celsius. Never fails.
    fn read_temperature(&self) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        id: String,
        temperature_c: f32,
    }

    impl TemperatureSource for FixedSource {
        fn id(&self) -> &str {
            &self.id
        }

        fn read_temperature(&self) -> f32 {
            self.temperature_c
        }
    }

    #[test]
    fn fixed_source_reads_through_trait_object() {
        let source: Box<dyn TemperatureSource> = Box::new(FixedSource {
            id: "bench".to_string(),
            temperature_c: 36.5,
        });
        assert_eq!(source.id(), "bench");
        assert!((source.read_temperature() - 36.5).abs() < f32::EPSILON);
    }
}
