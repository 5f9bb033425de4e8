//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route configuration update (v2 or v3 wire objects):
//!     → v2 adapted to v3 (xds::v2)
//!     → table.rs (select virtual host for the authority)
//!     → convert.rs (wire → Route model; Struct / Error / Skip)
//!     → resolver.rs (publish snapshot atomically)
//!
//! Per RPC (path, headers):
//!     → resolver.rs (load snapshot, no lock)
//!     → route.rs (first route whose matchers all pass)
//!     → matcher.rs (path, headers, fraction)
//!     → RoutingDecision { cluster, timeout }
//! ```
//!
//! # Design Decisions
//! - Routes compiled once per update, immutable while serving
//! - Regexes compiled at conversion, never per RPC
//! - First match wins, in configuration order
//! - Randomness is injected so tests are reproducible

pub mod convert;
pub mod matcher;
pub mod random;
pub mod resolver;
pub mod route;
pub mod table;

pub use convert::{ConversionError, StructOrError};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use resolver::{ResolveError, RouteResolver, RoutingDecision};
pub use route::{ClusterSpecifier, ClusterWeight, Route, RouteAction, RouteMatch, VirtualHost};
pub use table::{RouteTable, UpdateError};
