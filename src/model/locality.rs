//! Topology value types.

use std::fmt;

use crate::xds::v3;

/// Where a node runs: region / zone / sub-zone.
///
/// The wire shape is identical in v2 and v3, so one conversion serves both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locality {
    region: String,
    zone: String,
    sub_zone: String,
}

impl Locality {
    pub fn new(region: impl Into<String>, zone: impl Into<String>, sub_zone: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            zone: zone.into(),
            sub_zone: sub_zone.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn sub_zone(&self) -> &str {
        &self.sub_zone
    }

    pub fn to_wire(&self) -> v3::Locality {
        v3::Locality {
            region: self.region.clone(),
            zone: self.zone.clone(),
            sub_zone: self.sub_zone.clone(),
        }
    }
}

impl From<v3::Locality> for Locality {
    fn from(locality: v3::Locality) -> Self {
        Self {
            region: locality.region,
            zone: locality.zone,
            sub_zone: locality.sub_zone,
        }
    }
}

impl From<&Locality> for v3::Locality {
    fn from(locality: &Locality) -> Self {
        locality.to_wire()
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.region, self.zone, self.sub_zone)
    }
}

/// A host/port pair a node listens on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    host: String,
    port: u32,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u32) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u32 {
        self.port
    }

    pub fn to_wire(&self) -> v3::Address {
        v3::Address {
            socket_address: Some(v3::SocketAddress {
                address: self.host.clone(),
                port_value: self.port,
            }),
        }
    }

    /// Returns `None` for non-socket addresses (pipes, internal addresses).
    pub fn from_wire(address: &v3::Address) -> Option<Self> {
        address
            .socket_address
            .as_ref()
            .map(|socket| Self::new(socket.address.clone(), socket.port_value))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
