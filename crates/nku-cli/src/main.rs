//! `nku` – Nku Thermal Console
//!
//! This binary is the operator entry point for the Nku thermal governor.  It:
//!
//! 1. Initialises structured logging (with optional OTLP span export).
//! 2. Loads `~/.nku/config.toml`, writing the defaults on first run.
//! 3. Probes the device for a usable temperature sensor.
//! 4. Engages the thermal governor that gates on-device inference.
//! 5. Drops the operator into an **interactive REPL** with slash-commands
//!    (`/status`, `/gate`, `/report`, `/reset`, `/watch`, `/help`).
//! 6. Intercepts **Ctrl-C** for a clean stop.

mod config;
mod monitor;
mod repl;
mod telemetry;

use colored::Colorize;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use nku_hal::{SimThermalSensor, SysfsThermalSensor, TemperatureSource};
use nku_kernel::ThermalGovernor;

fn main() {
    // Diagnostics go through tracing; the operator-facing output below stays
    // on println! for UX consistency.
    let _telemetry = telemetry::init_tracing("nku");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── [1/3] Configuration ───────────────────────────────────────────────
    print!("  [1/3] {} … ", "Loading configuration".bold());
    io::stdout().flush().ok();
    let mut cfg = load_config();
    config::apply_env_overrides(&mut cfg);

    // ── [2/3] Sensor ──────────────────────────────────────────────────────
    print!("  [2/3] {} … ", "Probing temperature sensor".bold());
    io::stdout().flush().ok();
    let source = build_sensor(&cfg);
    println!(
        "{} – {} reads {}",
        "OK".green(),
        source.id().bold(),
        format!("{:.1}°C", source.read_temperature()).yellow()
    );

    // ── [3/3] Governor ────────────────────────────────────────────────────
    print!("  [3/3] {} … ", "Engaging thermal governor".bold());
    io::stdout().flush().ok();
    let governor = ThermalGovernor::new(cfg.governor(), source);
    println!(
        "{} (throttle {}, cooldown {}s)",
        "OK".green(),
        format!("{:.1}°C", governor.config().throttle_temperature_c).yellow(),
        governor.config().cooldown.as_secs().to_string().yellow()
    );

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(&governor, &cfg, shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Load `~/.nku/config.toml`, writing the defaults on first run.
///
/// Never aborts the boot: an unreadable or unparsable file falls back to the
/// built-in defaults with a note to the operator.
fn load_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!("{}", "OK".green());
            println!(
                "        {}",
                config::config_path().display().to_string().dimmed()
            );
            cfg
        }
        Ok(None) => {
            // First run: persist the defaults so operators have a file to edit.
            let cfg = config::Config::default();
            println!("{}", "OK".green());
            match config::save(&cfg) {
                Ok(()) => println!(
                    "        {} {}",
                    "✓ default config written to".green(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!(
                    "        {}: {}",
                    "could not write default config".yellow(),
                    e
                ),
            }
            cfg
        }
        Err(e) => {
            println!("{}", "OK".green());
            println!(
                "        {}: {} – using defaults",
                "config error".yellow(),
                e
            );
            config::Config::default()
        }
    }
}

/// Pick the temperature source for this run.
///
/// Priority: the `mock_sensor` flag, then an explicit `sensor_path`, then
/// on-device discovery.
fn build_sensor(cfg: &config::Config) -> Box<dyn TemperatureSource> {
    if cfg.mock_sensor {
        return Box::new(SimThermalSensor::new());
    }
    if let Some(path) = &cfg.sensor_path {
        return Box::new(SysfsThermalSensor::from_path(path));
    }
    Box::new(SysfsThermalSensor::discover())
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   _  __   __       "#.bold().cyan());
    println!("{}", r#"  / |/ /  / /____ __"#.bold().cyan());
    println!("{}", r#" /    /  /  '_/ // /"#.bold().cyan());
    println!("{}", r#"/_/|_/  /_/\_\\_,_/ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Nku".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Offline Health Screening Runtime");
    println!();
}
