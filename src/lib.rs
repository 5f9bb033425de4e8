//! Client-side xDS route resolution.
//!
//! Compiles control-plane route configurations (v2 or v3) into an immutable
//! route table and answers, per RPC, which cluster to call and with what
//! deadline.

pub mod config;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod routing;
pub mod xds;

pub use config::schema::ResolverConfig;
pub use lifecycle::Shutdown;
pub use routing::{RouteResolver, RoutingDecision};
