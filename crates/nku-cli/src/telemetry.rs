//! Tracing and OpenTelemetry wiring for the Nku console.
//!
//! [`init_tracing`] installs the global `tracing` subscriber once at startup.
//! On a clinic device logs stay on the console; when a collector endpoint is
//! configured (typically on a development bench) governor spans are exported
//! over OTLP/HTTP as well.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `NKU_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`); enables span export. |

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Install the global `tracing` subscriber, optionally exporting over OTLP.
///
/// Console output is compact by default and newline-delimited JSON when
/// `NKU_LOG_FORMAT=json`. Span export switches on only when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set; without it the device runs fully
/// offline with console logs alone.
///
/// The returned [`TelemetryGuard`] must live until the process exits;
/// dropping it flushes any span batch still in flight.
pub fn init_tracing(service_name: &str) -> TelemetryGuard {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let use_json = std::env::var("NKU_LOG_FORMAT").as_deref() == Ok("json");

    let provider = otlp_provider(service_name);
    // An `Option<Layer>` composes as a no-op when no exporter is configured,
    // which keeps this a single registry expression per format.
    let export_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("nku-governor")));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(export_layer);
    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }

    TelemetryGuard { provider }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shutdown guard
// ─────────────────────────────────────────────────────────────────────────────

/// Flushes and shuts down the OTLP pipeline when dropped.
///
/// Holds the [`SdkTracerProvider`], if one was built, and calls its
/// `shutdown` on drop so spans recorded right before exit still reach the
/// collector. Keep the instance alive in `main` for the whole run.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("[nku] telemetry shutdown error: {e}");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Build the OTLP tracer provider, or `None` when export is not configured.
///
/// A missing `OTEL_EXPORTER_OTLP_ENDPOINT` is the normal offline case. An
/// exporter that fails to initialise is reported on stderr and treated the
/// same way, so a bad endpoint never blocks the console from starting.
fn otlp_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[nku] OTLP exporter init failed: {e}"))
        .ok()?;

    let provider = SdkTracerProvider::builder()
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        // Simple (synchronous) exporter: this binary never starts an async
        // runtime, so a batch exporter's background tasks would have nowhere
        // to run.
        .with_simple_exporter(exporter)
        .build();

    Some(provider)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_endpoint_means_no_provider() {
        // SAFETY: single-threaded test; no other thread reads this env-var.
        unsafe { std::env::remove_var("OTEL_EXPORTER_OTLP_ENDPOINT") };

        let provider = otlp_provider("nku-test");
        assert!(provider.is_none(), "offline runs must not build a provider");
    }

    #[test]
    fn guard_without_provider_drops_cleanly() {
        drop(TelemetryGuard { provider: None }); // must not panic
    }
}
