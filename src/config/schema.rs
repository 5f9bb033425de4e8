//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the resolver process.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::{Address, Locality, Node};
use crate::xds::ApiVersion;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Target authority and randomness.
    pub resolver: ResolverSettings,

    /// Where route configurations come from.
    pub source: SourceConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Identity presented to the control plane.
    pub node: NodeConfig,
}

/// `[resolver]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ResolverSettings {
    /// Authority used to select the virtual host.
    pub authority: String,

    /// Fixed RNG seed for reproducible weighted selection.
    pub seed: Option<u64>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            authority: "localhost".to_string(),
            seed: None,
        }
    }
}

/// `[source]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Route configuration file (JSON, or TOML by extension).
    pub route_config_path: Option<PathBuf>,

    /// Wire version of the route configuration file.
    pub api_version: ApiVersion,

    /// Reload the route file when it changes.
    pub watch: bool,

    /// Poll interval for the file watcher in seconds.
    pub poll_interval_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            route_config_path: None,
            api_version: ApiVersion::V3,
            watch: false,
            poll_interval_secs: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// `[node]` section.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct NodeConfig {
    pub id: String,
    pub cluster: String,
    pub metadata: BTreeMap<String, String>,
    pub locality: Option<LocalityConfig>,
    pub listening_addresses: Vec<AddressConfig>,
    /// Only sent on v2.
    pub build_version: String,
    pub user_agent_name: String,
    pub user_agent_version: String,
    pub client_features: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LocalityConfig {
    pub region: String,
    pub zone: String,
    pub sub_zone: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AddressConfig {
    pub host: String,
    pub port: u32,
}

impl NodeConfig {
    pub fn to_node(&self) -> Node {
        let mut builder = Node::builder()
            .id(&self.id)
            .cluster(&self.cluster)
            .metadata(self.metadata.clone())
            .build_version(&self.build_version)
            .user_agent_name(&self.user_agent_name)
            .user_agent_version(&self.user_agent_version);

        if let Some(locality) = &self.locality {
            builder = builder.locality(Locality::new(
                &locality.region,
                &locality.zone,
                &locality.sub_zone,
            ));
        }
        for address in &self.listening_addresses {
            builder = builder.add_listening_address(Address::new(&address.host, address.port));
        }
        for feature in &self.client_features {
            builder = builder.add_client_feature(feature);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.resolver.authority, "localhost");
        assert_eq!(config.source.api_version, ApiVersion::V3);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: ResolverConfig = toml::from_str(
            r#"
            [resolver]
            authority = "foo.googleapis.com"

            [source]
            api_version = "v2"
            "#,
        )
        .unwrap();

        assert_eq!(config.resolver.authority, "foo.googleapis.com");
        assert_eq!(config.resolver.seed, None);
        assert_eq!(config.source.api_version, ApiVersion::V2);
        assert_eq!(config.source.poll_interval_secs, 2);
        assert_eq!(config.observability, ObservabilityConfig::default());
    }

    #[test]
    fn test_node_config_to_node() {
        let config: ResolverConfig = toml::from_str(
            r#"
            [node]
            id = "NODE_ID"
            cluster = "CLUSTER"
            build_version = "v1"
            user_agent_name = "agent"
            client_features = ["feature-1"]

            [node.metadata]
            TRAFFICDIRECTOR_NETWORK_NAME = "default"

            [node.locality]
            region = "region"
            zone = "zone"
            sub_zone = "subzone"

            [[node.listening_addresses]]
            host = "www.foo.com"
            port = 8080
            "#,
        )
        .unwrap();

        let node = config.node.to_node();
        assert_eq!(node.id(), "NODE_ID");
        assert_eq!(node.cluster(), "CLUSTER");
        assert_eq!(node.build_version(), "v1");
        assert_eq!(
            node.metadata().get("TRAFFICDIRECTOR_NETWORK_NAME").map(String::as_str),
            Some("default")
        );
        assert_eq!(node.locality(), Some(&Locality::new("region", "zone", "subzone")));
        assert_eq!(node.listening_addresses(), &[Address::new("www.foo.com", 8080)]);
        assert_eq!(node.client_features(), &["feature-1".to_string()]);
    }
}
