//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ResolverConfig (validated, immutable)
//!
//! Route configuration file (JSON or TOML, v2 or v3):
//!     → loader.rs (load_route_configuration)
//!     → RouteConfigurationUpdate → RouteResolver
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs reloads the route file
//!     → update sent over mpsc to the resolver task
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the route file hot-reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_route_configuration, ConfigError};
pub use schema::{NodeConfig, ObservabilityConfig, ResolverConfig, SourceConfig};
pub use validation::ValidationError;
pub use watcher::RouteConfigWatcher;
