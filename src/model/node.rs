//! Client identity presented to the control plane.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::{Address, Locality};
use crate::xds::{v2, v3, ApiVersion};

/// Identity of this client as sent in discovery requests.
///
/// Built once from local configuration and never mutated. `build_version` only
/// exists on the v2 wire; the v3 conversion drops it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    id: String,
    cluster: String,
    metadata: BTreeMap<String, String>,
    locality: Option<Locality>,
    listening_addresses: Vec<Address>,
    build_version: String,
    user_agent_name: String,
    user_agent_version: String,
    client_features: Vec<String>,
}

impl Node {
    pub fn builder() -> NodeBuilder {
        NodeBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn locality(&self) -> Option<&Locality> {
        self.locality.as_ref()
    }

    pub fn listening_addresses(&self) -> &[Address] {
        &self.listening_addresses
    }

    pub fn build_version(&self) -> &str {
        &self.build_version
    }

    pub fn user_agent_name(&self) -> &str {
        &self.user_agent_name
    }

    pub fn user_agent_version(&self) -> &str {
        &self.user_agent_version
    }

    pub fn client_features(&self) -> &[String] {
        &self.client_features
    }

    fn wire_metadata(&self) -> serde_json::Map<String, Value> {
        self.metadata
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    pub fn to_wire_v3(&self) -> v3::Node {
        v3::Node {
            id: self.id.clone(),
            cluster: self.cluster.clone(),
            metadata: self.wire_metadata(),
            locality: self.locality.as_ref().map(Locality::to_wire),
            user_agent_name: self.user_agent_name.clone(),
            user_agent_version: self.user_agent_version.clone(),
            client_features: self.client_features.clone(),
            listening_addresses: self.listening_addresses.iter().map(Address::to_wire).collect(),
        }
    }

    pub fn to_wire_v2(&self) -> v2::Node {
        v2::Node {
            id: self.id.clone(),
            cluster: self.cluster.clone(),
            metadata: self.wire_metadata(),
            locality: self.locality.as_ref().map(Locality::to_wire),
            build_version: self.build_version.clone(),
            user_agent_name: self.user_agent_name.clone(),
            user_agent_version: self.user_agent_version.clone(),
            client_features: self.client_features.clone(),
            listening_addresses: self.listening_addresses.iter().map(Address::to_wire).collect(),
        }
    }

    /// Serialized wire form for the requested protocol version.
    pub fn to_wire_json(&self, version: ApiVersion) -> Result<Value, serde_json::Error> {
        match version {
            ApiVersion::V2 => serde_json::to_value(self.to_wire_v2()),
            ApiVersion::V3 => serde_json::to_value(self.to_wire_v3()),
        }
    }

    pub fn from_wire_v3(node: &v3::Node) -> Self {
        Self {
            id: node.id.clone(),
            cluster: node.cluster.clone(),
            metadata: metadata_from_wire(&node.metadata),
            locality: node.locality.clone().map(Locality::from),
            listening_addresses: node
                .listening_addresses
                .iter()
                .filter_map(Address::from_wire)
                .collect(),
            build_version: String::new(),
            user_agent_name: node.user_agent_name.clone(),
            user_agent_version: node.user_agent_version.clone(),
            client_features: node.client_features.clone(),
        }
    }

    pub fn from_wire_v2(node: &v2::Node) -> Self {
        Self {
            id: node.id.clone(),
            cluster: node.cluster.clone(),
            metadata: metadata_from_wire(&node.metadata),
            locality: node.locality.clone().map(Locality::from),
            listening_addresses: node
                .listening_addresses
                .iter()
                .filter_map(Address::from_wire)
                .collect(),
            build_version: node.build_version.clone(),
            user_agent_name: node.user_agent_name.clone(),
            user_agent_version: node.user_agent_version.clone(),
            client_features: node.client_features.clone(),
        }
    }
}

// Non-string metadata values keep their JSON text.
fn metadata_from_wire(metadata: &serde_json::Map<String, Value>) -> BTreeMap<String, String> {
    metadata
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

/// Incremental construction of a [`Node`].
#[derive(Debug, Default)]
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.node.id = id.into();
        self
    }

    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.node.cluster = cluster.into();
        self
    }

    pub fn metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.node.metadata = metadata;
        self
    }

    pub fn locality(mut self, locality: Locality) -> Self {
        self.node.locality = Some(locality);
        self
    }

    pub fn add_listening_address(mut self, address: Address) -> Self {
        self.node.listening_addresses.push(address);
        self
    }

    pub fn build_version(mut self, version: impl Into<String>) -> Self {
        self.node.build_version = version.into();
        self
    }

    pub fn user_agent_name(mut self, name: impl Into<String>) -> Self {
        self.node.user_agent_name = name.into();
        self
    }

    pub fn user_agent_version(mut self, version: impl Into<String>) -> Self {
        self.node.user_agent_version = version.into();
        self
    }

    pub fn add_client_feature(mut self, feature: impl Into<String>) -> Self {
        self.node.client_features.push(feature.into());
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}
