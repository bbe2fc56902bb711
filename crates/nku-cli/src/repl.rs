//! REPL – Read-Eval-Print Loop for the Nku thermal console.
//!
//! Supported slash-commands:
//!   /help            – show this list
//!   /status          – evaluate and print the current thermal status
//!   /gate            – ask whether inference may run right now
//!   /report          – print a full thermal report as JSON
//!   /reset           – clear any active cooldown and re-sample
//!   /watch [seconds] – stream status transitions to the console
//!   /quit | /exit    – gracefully exit the console

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use nku_kernel::ThermalGovernor;

use crate::config::Config;
use crate::monitor;

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
/// The Ctrl-C handler installed in `main` flips it, so an interrupt during
/// `/watch` ends the watch and an interrupt at the prompt ends the session.
pub fn run(governor: &ThermalGovernor, cfg: &Config, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "nku>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        let mut parts = cmd.split_whitespace();
        match parts.next().unwrap_or_default() {
            "/help" => cmd_help(),
            "/status" => cmd_status(governor),
            "/gate" => cmd_gate(governor),
            "/report" => cmd_report(governor),
            "/reset" => cmd_reset(governor),
            "/watch" => cmd_watch(governor, cfg, parts.next(), &shutdown),
            "/quit" | "/exit" => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            other => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Nku Commands".bold().underline());
    println!("  {}           – evaluate and print the thermal status", "/status".bold().cyan());
    println!("  {}             – ask whether inference may run",       "/gate".bold().cyan());
    println!("  {}           – print a full thermal report as JSON",   "/report".bold().cyan());
    println!("  {}            – clear the cooldown and re-sample",     "/reset".bold().cyan());
    println!("  {} – live monitor (optional duration)",    "/watch [seconds]".bold().cyan());
    println!("  {}      – exit the console",                   "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_status(governor: &ThermalGovernor) {
    let status = governor.check_status();

    println!("{}", "Thermal Status".bold().underline());
    println!("  {}", monitor::status_line(&status));
    println!(
        "  Temperature : {}",
        format!("{:.1}°C", status.temperature_c).yellow()
    );
    println!(
        "  Threshold   : {}",
        format!("{:.1}°C", governor.config().throttle_temperature_c).yellow()
    );
    if let Some(remaining) = status.cooldown_remaining_s {
        println!("  Cooldown    : {}", format!("{remaining}s remaining").yellow());
    }
}

fn cmd_gate(governor: &ThermalGovernor) {
    if governor.can_run_inference() {
        println!("  {} {} {}", "🟢".green(), "Inference".bold(), "allowed".green());
    } else {
        println!("  {} {} {}", "🔴".red(), "Inference".bold(), "blocked".red());
    }
}

fn cmd_report(governor: &ThermalGovernor) {
    match serde_json::to_string_pretty(&governor.report()) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("{}: {}", "Error rendering report".red(), e),
    }
}

fn cmd_reset(governor: &ThermalGovernor) {
    governor.reset();
    let status = governor.last_status();
    println!(
        "  {} {} – {}",
        "✓".green(),
        status.message.green(),
        format!("{:.1}°C", status.temperature_c).yellow()
    );
}

fn cmd_watch(
    governor: &ThermalGovernor,
    cfg: &Config,
    arg: Option<&str>,
    shutdown: &Arc<AtomicBool>,
) {
    let limit = match arg {
        None => None,
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                println!(
                    "  {} '{}' is not a number of seconds, watching until Ctrl-C",
                    "Warning:".yellow(),
                    raw
                );
                None
            }
        },
    };

    match limit {
        Some(d) => println!(
            "  Watching thermal status for {}s ({} to stop early)…",
            d.as_secs(),
            "Ctrl-C".bold()
        ),
        None => println!("  Watching thermal status ({} to stop)…", "Ctrl-C".bold()),
    }

    monitor::run(governor, cfg.poll_interval(), limit, shutdown);

    // An interrupt should end the watch, not the whole session; the flag is
    // consumed here so the prompt comes back.
    if shutdown.swap(false, Ordering::SeqCst) {
        println!("  {}", "Watch stopped.".dimmed());
    }
}
