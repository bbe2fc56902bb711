//! [`ThermalGovernor`] – admission control for on-device AI inference.
//!
//! The target handsets (2 GB RAM class, no thermal-management API) overheat
//! under sustained model execution. The governor sits between the screening
//! flow and the inference pipeline: before each inference call it samples the
//! device temperature and either admits the call or enforces a mandatory
//! cooldown pause.
//!
//! # Evaluation
//!
//! Two states, **Normal** and **Cooldown**, re-evaluated synchronously on
//! every [`check_status`][ThermalGovernor::check_status] call:
//!
//! 1. Sample the temperature from the injected [`TemperatureSource`].
//! 2. In Cooldown, only elapsed time matters: while the configured pause has
//!    not fully run out, report "Cooling down" with the remaining whole
//!    seconds. The threshold is deliberately not re-checked here, so a noisy
//!    or slow sensor cannot end the pause early, and the gate cannot flap
//!    around the threshold while the device is still shedding heat.
//! 3. Once the pause has run out (or when already Normal), compare the fresh
//!    sample against the throttle threshold: strictly above it, arm a full
//!    new cooldown and report "Too hot"; otherwise report "OK".
//! 4. Publish the resulting status to the last-value-wins stream and return
//!    it.
//!
//! The cooldown timer is plain state inspected on each call. Nothing is
//! scheduled; an idle governor does no work.
//!
//! # Example
//!
//! ```rust
//! use nku_hal::SimThermalSensor;
//! use nku_kernel::governor::{GovernorConfig, ThermalGovernor};
//!
//! let sensor = SimThermalSensor::at(36.5);
//! let governor = ThermalGovernor::new(GovernorConfig::default(), Box::new(sensor.clone()));
//! assert!(governor.can_run_inference());
//!
//! sensor.set_temperature(43.0);
//! let status = governor.check_status();
//! assert!(!status.safe);
//! assert_eq!(status.message, "Too hot: 43.0°C - pausing inference");
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use nku_hal::TemperatureSource;
use nku_types::{ThermalReport, ThermalStatus};

use crate::clock::{Clock, MonotonicClock};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default throttle threshold for the 2 GB-class handsets the runtime targets.
pub const DEFAULT_THROTTLE_TEMP_C: f32 = 42.0;

/// Default mandatory pause once the threshold is crossed.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Thermal policy for one governor instance. Fixed at construction.
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    /// Temperature (°C) strictly above which inference is paused.
    pub throttle_temperature_c: f32,
    /// Mandatory minimum pause once an overheat is detected.
    pub cooldown: Duration,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            throttle_temperature_c: DEFAULT_THROTTLE_TEMP_C,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ThermalGovernor
// ─────────────────────────────────────────────────────────────────────────────

/// The thermal admission gate.
///
/// One instance per screening session, owned by whoever drives the inference
/// pipeline and shared by plain reference (or `Arc`) with any UI observer.
/// All entry points take `&self`; internal state is serialized behind a
/// mutex, so callers need no locking of their own.
pub struct ThermalGovernor {
    config: GovernorConfig,
    source: Box<dyn TemperatureSource>,
    clock: Box<dyn Clock>,
    /// `None` in Normal, `Some(instant the overheat was detected)` in
    /// Cooldown. Collapsing the state into one field makes "in cooldown
    /// without a start time" unrepresentable.
    cooldown_since: Mutex<Option<Instant>>,
    status_tx: watch::Sender<ThermalStatus>,
}

impl ThermalGovernor {
    /// Build a governor over the given sensor, timed by the real monotonic
    /// clock. The status stream starts out optimistic ("Initializing...")
    /// until the first evaluation runs.
    pub fn new(config: GovernorConfig, source: Box<dyn TemperatureSource>) -> Self {
        let (status_tx, _) = watch::channel(ThermalStatus::initializing());
        debug!(
            throttle_c = config.throttle_temperature_c,
            cooldown_s = config.cooldown.as_secs(),
            sensor = source.id(),
            "thermal governor ready"
        );
        Self {
            config,
            source,
            clock: Box::new(MonotonicClock),
            cooldown_since: Mutex::new(None),
            status_tx,
        }
    }

    /// Replace the time source, e.g. with a [`ManualClock`][crate::clock::ManualClock]
    /// to make cooldown timing deterministic in tests.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The policy this governor was built with.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Run one evaluation: sample, advance the state machine, publish, and
    /// return the resulting status.
    ///
    /// Never fails. The sensor absorbs its own read errors and the governor
    /// has no other inputs, so every call produces a status.
    pub fn check_status(&self) -> ThermalStatus {
        // Held across evaluate-and-publish: concurrent callers must never
        // interleave against a half-updated cooldown, and the stream must
        // receive statuses in evaluation order.
        let mut cooldown_since = self
            .cooldown_since
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let temperature_c = self.source.read_temperature();

        if let Some(started) = *cooldown_since {
            let elapsed_s = self.clock.now().duration_since(started).as_secs();
            let remaining_s = self.config.cooldown.as_secs().saturating_sub(elapsed_s);
            if remaining_s > 0 {
                return self.publish(ThermalStatus::cooling_down(temperature_c, remaining_s));
            }
            // Pause fully served; fall through and judge the fresh sample.
            *cooldown_since = None;
            info!(temperature_c, "cooldown elapsed; re-evaluating");
        }

        let status = if temperature_c > self.config.throttle_temperature_c {
            *cooldown_since = Some(self.clock.now());
            warn!(
                temperature_c,
                threshold_c = self.config.throttle_temperature_c,
                "device too hot; pausing inference"
            );
            ThermalStatus::too_hot(temperature_c, self.config.cooldown.as_secs())
        } else {
            ThermalStatus::ok(temperature_c)
        };
        self.publish(status)
    }

    /// Boolean admission gate for the inference pipeline.
    ///
    /// Exactly [`check_status`][Self::check_status]`().safe` - both entry
    /// points run the same evaluation, so a gate call and a status call at
    /// the same instant can never disagree.
    pub fn can_run_inference(&self) -> bool {
        self.check_status().safe
    }

    /// Discard any pending cooldown regardless of elapsed time.
    ///
    /// For external signals that make the retained pause stale: an operator
    /// override, app resume after minutes in the background, a device fresh
    /// off a cool windowsill. Publishes a safe "Reset - ready" status
    /// carrying a freshly sampled temperature; the next
    /// [`check_status`][Self::check_status] starts from Normal.
    pub fn reset(&self) {
        let mut cooldown_since = self
            .cooldown_since
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cooldown_since = None;

        let temperature_c = self.source.read_temperature();
        info!(temperature_c, "governor reset; cooldown cleared");
        self.publish(ThermalStatus::reset_ready(temperature_c));
    }

    /// Subscribe to the status stream.
    ///
    /// Last-value-wins: a new receiver immediately sees the most recent
    /// status (initially the optimistic "Initializing..." value) and is
    /// notified on every publish. Intermediate values are never queued.
    pub fn subscribe(&self) -> watch::Receiver<ThermalStatus> {
        self.status_tx.subscribe()
    }

    /// The most recently published status, without running an evaluation.
    pub fn last_status(&self) -> ThermalStatus {
        self.status_tx.borrow().clone()
    }

    /// Run an evaluation and wrap the result as a serializable
    /// [`ThermalReport`] for logs and field-support bundles.
    pub fn report(&self) -> ThermalReport {
        let status = self.check_status();
        ThermalReport::new(status, self.config.throttle_temperature_c, self.source.id())
    }

    fn publish(&self, status: ThermalStatus) -> ThermalStatus {
        self.status_tx.send_replace(status.clone());
        status
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
