//! Wire object model for the v3 discovery API.
//!
//! These types mirror the protobuf messages of `envoy.config.route.v3` and
//! `envoy.config.core.v3` closely enough that a deserialized control-plane
//! response maps onto them field by field. Each protobuf `oneof` is an enum held
//! in an `Option` and flattened into its parent, so an unset oneof is `None`.
//! Wrapper types (`BoolValue`, `UInt32Value`, `Duration`) are `Option`s so that an
//! explicit zero is distinguishable from an absent field.

use serde::{Deserialize, Serialize};

/// `google.protobuf.Duration`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct Duration {
    pub seconds: i64,
    pub nanos: i32,
}

impl Duration {
    pub fn from_secs(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub fn from_micros(micros: i64) -> Self {
        Self::from_nanos(micros.saturating_mul(1_000))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self {
            seconds: nanos / 1_000_000_000,
            nanos: (nanos % 1_000_000_000) as i32,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Total length in nanoseconds, saturating at the `i64` bounds.
    pub fn as_nanos(&self) -> i64 {
        self.seconds
            .saturating_mul(1_000_000_000)
            .saturating_add(i64::from(self.nanos))
    }
}

/// The top-level route configuration delivered by RDS (or inlined in LDS).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfiguration {
    pub name: String,
    pub virtual_hosts: Vec<VirtualHost>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VirtualHost {
    pub name: String,
    pub domains: Vec<String>,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Route {
    pub name: String,
    #[serde(rename = "match")]
    pub route_match: Option<RouteMatch>,
    #[serde(flatten)]
    pub action: Option<route::Action>,
}

/// Nested message and enum types in `Route`.
pub mod route {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Action {
        Route(super::RouteAction),
        Redirect(super::RedirectAction),
        DirectResponse(super::DirectResponseAction),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteMatch {
    #[serde(flatten)]
    pub path_specifier: Option<route_match::PathSpecifier>,
    /// `google.protobuf.BoolValue`; protobuf treats an absent value as `true`.
    pub case_sensitive: Option<bool>,
    pub runtime_fraction: Option<RuntimeFractionalPercent>,
    pub headers: Vec<HeaderMatcher>,
    pub query_parameters: Vec<QueryParameterMatcher>,
}

/// Nested message and enum types in `RouteMatch`.
pub mod route_match {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PathSpecifier {
        Prefix(String),
        Path(String),
        SafeRegex(super::RegexMatcher),
        ConnectMatcher(super::ConnectMatcher),
    }
}

/// Matches HTTP CONNECT requests; never meaningful for RPC traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectMatcher {}

/// `envoy.type.matcher.v3.RegexMatcher` (RE2 dialect).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegexMatcher {
    pub regex: String,
}

impl RegexMatcher {
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderMatcher {
    pub name: String,
    #[serde(flatten)]
    pub header_match_specifier: Option<header_matcher::HeaderMatchSpecifier>,
    pub invert_match: bool,
}

/// Nested message and enum types in `HeaderMatcher`.
pub mod header_matcher {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum HeaderMatchSpecifier {
        ExactMatch(String),
        SafeRegexMatch(super::RegexMatcher),
        RangeMatch(super::Int64Range),
        PresentMatch(bool),
        PrefixMatch(String),
        SuffixMatch(String),
    }
}

/// Half-open `[start, end)` range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Int64Range {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryParameterMatcher {
    pub name: String,
    pub present_match: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeFractionalPercent {
    pub default_value: Option<FractionalPercent>,
    pub runtime_key: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FractionalPercent {
    pub numerator: u32,
    pub denominator: DenominatorType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenominatorType {
    #[default]
    Hundred,
    TenThousand,
    Million,
}

impl DenominatorType {
    /// The integer scale this denominator stands for.
    pub fn scale(self) -> u32 {
        match self {
            DenominatorType::Hundred => 100,
            DenominatorType::TenThousand => 10_000,
            DenominatorType::Million => 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteAction {
    #[serde(flatten)]
    pub cluster_specifier: Option<route_action::ClusterSpecifier>,
    pub timeout: Option<Duration>,
    pub max_grpc_timeout: Option<Duration>,
}

/// Nested message and enum types in `RouteAction`.
pub mod route_action {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ClusterSpecifier {
        Cluster(String),
        ClusterHeader(String),
        WeightedClusters(super::WeightedCluster),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightedCluster {
    pub clusters: Vec<ClusterWeight>,
    pub total_weight: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterWeight {
    pub name: String,
    /// `google.protobuf.UInt32Value`.
    pub weight: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectAction {
    pub host_redirect: String,
    pub path_redirect: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DirectResponseAction {
    pub status: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct Locality {
    pub region: String,
    pub zone: String,
    pub sub_zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SocketAddress {
    pub address: String,
    pub port_value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Address {
    pub socket_address: Option<SocketAddress>,
}

/// `envoy.config.core.v3.Node`.
///
/// `metadata` stands in for `google.protobuf.Struct`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Node {
    pub id: String,
    pub cluster: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub locality: Option<Locality>,
    pub user_agent_name: String,
    pub user_agent_version: String,
    pub client_features: Vec<String>,
    pub listening_addresses: Vec<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_nanos() {
        assert_eq!(Duration::from_secs(6).as_nanos(), 6_000_000_000);
        assert_eq!(Duration::from_micros(20).as_nanos(), 20_000);
        assert!(Duration::from_nanos(0).is_zero());
        assert_eq!(Duration::from_secs(i64::MAX).as_nanos(), i64::MAX);
    }

    #[test]
    fn test_route_from_json() {
        let json = r#"{
            "name": "route-blade",
            "match": { "prefix": "/service/", "case_sensitive": true },
            "route": { "cluster": "cluster-foo", "timeout": { "seconds": 3 } }
        }"#;
        let route: Route = serde_json::from_str(json).unwrap();
        let route_match = route.route_match.unwrap();
        assert_eq!(
            route_match.path_specifier,
            Some(route_match::PathSpecifier::Prefix("/service/".into()))
        );
        assert_eq!(route_match.case_sensitive, Some(true));
        match route.action {
            Some(route::Action::Route(action)) => {
                assert_eq!(
                    action.cluster_specifier,
                    Some(route_action::ClusterSpecifier::Cluster("cluster-foo".into()))
                );
                assert_eq!(action.timeout, Some(Duration::from_secs(3)));
                assert_eq!(action.max_grpc_timeout, None);
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_unset_oneofs_from_json() {
        let route: Route = serde_json::from_str(r#"{ "name": "empty", "match": {} }"#).unwrap();
        assert_eq!(route.action, None);
        assert_eq!(route.route_match.unwrap().path_specifier, None);
    }

    #[test]
    fn test_header_matcher_from_json() {
        let json = r#"{ "name": "timeout", "range_match": { "start": 10, "end": 20 }, "invert_match": true }"#;
        let matcher: HeaderMatcher = serde_json::from_str(json).unwrap();
        assert_eq!(
            matcher.header_match_specifier,
            Some(header_matcher::HeaderMatchSpecifier::RangeMatch(Int64Range {
                start: 10,
                end: 20
            }))
        );
        assert!(matcher.invert_match);
    }

    #[test]
    fn test_denominator_scale() {
        let fraction: FractionalPercent =
            serde_json::from_str(r#"{ "numerator": 5, "denominator": "TEN_THOUSAND" }"#).unwrap();
        assert_eq!(fraction.denominator.scale(), 10_000);
        assert_eq!(FractionalPercent::default().denominator.scale(), 100);
    }
}
