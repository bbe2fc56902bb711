//! `nku-kernel` – Thermal Safety & Admission Control
//!
//! The safety core of the screening runtime. It does not screen anyone; it
//! decides whether the device is cool enough to be allowed to.
//!
//! # Modules
//!
//! - [`clock`] – [`Clock`][clock::Clock]:
//!   injectable monotonic time source. Cooldown arithmetic runs on
//!   [`MonotonicClock`][clock::MonotonicClock] in production and on a
//!   hand-driven [`ManualClock`][clock::ManualClock] in tests, so every
//!   time-based behavior is deterministic under test.
//! - [`governor`] – [`ThermalGovernor`][governor::ThermalGovernor]:
//!   the admission gate every AI inference call must pass. Trips into a
//!   mandatory cooldown when the device runs hot, holds the pause until the
//!   timer fully elapses, and publishes every status to a last-value-wins
//!   stream for UI binding.

pub mod clock;
pub mod governor;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use governor::{GovernorConfig, ThermalGovernor};
