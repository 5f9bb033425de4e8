//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build resolver → Apply initial routes
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop watching → Drop route table → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then resolver, then watcher
//! - Shutdown is idempotent

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
