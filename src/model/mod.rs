//! Descriptive value objects: who this client is and where it runs.
//!
//! # Data Flow
//! ```text
//! [node] section of config
//!     → Node (immutable, built once)
//!     → to_wire_v2() / to_wire_v3() for discovery requests
//! ```
//!
//! # Design Decisions
//! - Plain structs with structural equality and hashing
//! - Legacy-only fields are read and written only by the v2 conversion

pub mod locality;
pub mod node;

pub use locality::{Address, Locality};
pub use node::{Node, NodeBuilder};
