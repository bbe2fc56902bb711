//! `nku-hal` – Device Sensor Abstraction
//!
//! Thin hardware layer for the screening runtime. The only hardware signal the
//! thermal-safety core consumes is device temperature, so this crate defines
//! that one capability and its implementations.
//!
//! # Modules
//!
//! - [`sensor`] – [`TemperatureSource`][sensor::TemperatureSource]:
//!   the injected, infallible temperature-reading capability. Read failures
//!   are absorbed here, at the hardware boundary, never surfaced upward.
//! - [`sysfs`] – [`SysfsThermalSensor`][sysfs::SysfsThermalSensor]:
//!   reads the Android battery/SoC nodes or generic Linux thermal zones under
//!   `/sys`, with unit auto-scaling and safe-fallback degradation.
//! - [`sim`] – [`SimThermalSensor`][sim::SimThermalSensor] /
//!   [`CoolingCurveSensor`][sim::CoolingCurveSensor]:
//!   simulated sensors for tests, CI, and demos on machines without a usable
//!   thermal node.

pub mod sensor;
pub mod sim;
pub mod sysfs;

pub use sensor::TemperatureSource;
pub use sim::{CoolingCurveSensor, SimThermalSensor};
pub use sysfs::SysfsThermalSensor;
