//! Discovery-protocol wire object model.
//!
//! # Data Flow
//! ```text
//! Control plane (external transport)
//!     → deserialized v2 or v3 RouteConfiguration
//!     → RouteConfigurationUpdate (version envelope)
//!     → into_v3() (v2 adapted via From impls)
//!     → routing::convert (wire → route model)
//! ```
//!
//! # Design Decisions
//! - Two parallel schemas, one converter: v2 messages upgrade to v3 shapes
//! - Protobuf oneofs are enums inside `Option`, never parallel nullable fields
//! - No protobuf codec here; the transport hands over already-decoded objects

pub mod v2;
pub mod v3;

use serde::{Deserialize, Serialize};

/// Which protocol major version a wire object belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V2,
    #[default]
    V3,
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiVersion::V2 => write!(f, "v2"),
            ApiVersion::V3 => write!(f, "v3"),
        }
    }
}

impl std::str::FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v2" => Ok(ApiVersion::V2),
            "v3" => Ok(ApiVersion::V3),
            other => Err(format!("unknown API version: {}", other)),
        }
    }
}

/// A route configuration as delivered by the discovery transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteConfigurationUpdate {
    V2(v2::RouteConfiguration),
    V3(v3::RouteConfiguration),
}

impl RouteConfigurationUpdate {
    pub fn api_version(&self) -> ApiVersion {
        match self {
            RouteConfigurationUpdate::V2(_) => ApiVersion::V2,
            RouteConfigurationUpdate::V3(_) => ApiVersion::V3,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RouteConfigurationUpdate::V2(config) => &config.name,
            RouteConfigurationUpdate::V3(config) => &config.name,
        }
    }

    /// Normalize to the v3 shape the converter understands.
    pub fn into_v3(self) -> v3::RouteConfiguration {
        match self {
            RouteConfigurationUpdate::V2(config) => config.into(),
            RouteConfigurationUpdate::V3(config) => config,
        }
    }
}

impl From<v2::RouteConfiguration> for RouteConfigurationUpdate {
    fn from(config: v2::RouteConfiguration) -> Self {
        RouteConfigurationUpdate::V2(config)
    }
}

impl From<v3::RouteConfiguration> for RouteConfigurationUpdate {
    fn from(config: v3::RouteConfiguration) -> Self {
        RouteConfigurationUpdate::V3(config)
    }
}
