//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing, config and lifecycle produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, watch mode only)
//! ```
//!
//! # Design Decisions
//! - Structured logging with fields, never formatted strings
//! - Metrics go through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
