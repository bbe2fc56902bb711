//! Console monitor – polls the governor and prints status transitions.
//!
//! The monitor drives [`ThermalGovernor::check_status`] at a fixed cadence and
//! subscribes to the governor's status stream, printing a coloured line each
//! time the message changes. Repeated identical statuses are not re-printed,
//! so a stable device produces one line instead of a scrolling wall.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use nku_kernel::ThermalGovernor;
use nku_types::ThermalStatus;

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render a status as a single coloured console line.
///
/// Green for safe readings, yellow while a cooldown is being served, red for
/// an over-threshold reading.
pub fn status_line(status: &ThermalStatus) -> String {
    if status.safe {
        format!("{} {}", "●".green(), status.message.green())
    } else if status.message.starts_with("Cooling down") {
        format!("{} {}", "●".yellow(), status.message.yellow())
    } else {
        format!("{} {}", "●".red(), status.message.red())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polling loop
// ─────────────────────────────────────────────────────────────────────────────

/// Poll the governor until the time `limit` elapses or `shutdown` is set.
///
/// Each tick evaluates the thermal state, then drains the status stream and
/// prints any transition. A `limit` of `None` runs until `shutdown` is set
/// (the Ctrl-C handler flips it).
pub fn run(
    governor: &ThermalGovernor,
    poll_interval: Duration,
    limit: Option<Duration>,
    shutdown: &AtomicBool,
) {
    let mut rx = governor.subscribe();
    let started = Instant::now();
    let mut last_printed = String::new();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        if let Some(limit) = limit
            && started.elapsed() >= limit
        {
            break;
        }

        governor.check_status();

        // Every evaluation republishes, so dedupe on the message text to only
        // surface actual transitions.
        if rx.has_changed().unwrap_or(false) {
            let status = rx.borrow_and_update().clone();
            if status.message != last_printed {
                println!("  {}", status_line(&status));
                last_printed = status.message;
            }
        }

        thread::sleep(poll_interval);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use nku_hal::SimThermalSensor;
    use nku_kernel::GovernorConfig;

    fn governor_at(temp_c: f32) -> ThermalGovernor {
        ThermalGovernor::new(
            GovernorConfig::default(),
            Box::new(SimThermalSensor::at(temp_c)),
        )
    }

    /// The rendered line always carries the status message verbatim.
    #[test]
    fn status_line_includes_the_status_message() {
        let status = ThermalStatus::ok(36.5);
        assert!(status_line(&status).contains(&status.message));

        let status = ThermalStatus::cooling_down(44.0, 12);
        assert!(status_line(&status).contains(&status.message));

        let status = ThermalStatus::too_hot(44.0, 30);
        assert!(status_line(&status).contains(&status.message));
    }

    /// A pre-set shutdown flag stops the loop before the first poll.
    #[test]
    fn run_returns_immediately_when_shutdown_requested() {
        let governor = governor_at(36.0);
        let shutdown = AtomicBool::new(true);

        let started = Instant::now();
        run(&governor, Duration::from_millis(5), None, &shutdown);

        assert!(started.elapsed() < Duration::from_secs(1));
        // No poll ran, so the stream still holds the boot value.
        assert_eq!(governor.last_status().message, "Initializing...");
    }

    /// A zero time limit expires before the first evaluation.
    #[test]
    fn run_honors_zero_time_limit() {
        let governor = governor_at(36.0);
        let shutdown = AtomicBool::new(false);

        run(
            &governor,
            Duration::from_millis(5),
            Some(Duration::ZERO),
            &shutdown,
        );

        assert_eq!(governor.last_status().message, "Initializing...");
    }

    /// While running, each tick re-evaluates the thermal state.
    #[test]
    fn run_drives_the_governor_while_polling() {
        let governor = governor_at(55.0); // well over the default threshold
        let shutdown = AtomicBool::new(false);

        run(
            &governor,
            Duration::from_millis(5),
            Some(Duration::from_millis(30)),
            &shutdown,
        );

        let status = governor.last_status();
        assert!(!status.safe, "hot sensor must have tripped the governor");
    }
}
