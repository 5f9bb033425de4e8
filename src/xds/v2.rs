//! Wire object model for the legacy v2 discovery API.
//!
//! Only messages whose shape differs from v3 are defined here; the rest are
//! shared with [`super::v3`]. Every v2 message converts into its v3 counterpart
//! with `From`, so conversion and matching logic exist once.
//!
//! # Differences from v3
//! - `RouteMatch` carries the deprecated `regex` path specifier (no `connect_matcher`)
//! - `HeaderMatcher` carries the deprecated `regex_match` specifier
//! - `Node` carries the legacy `build_version`

use serde::{Deserialize, Serialize};

use super::v3;

pub use super::v3::{
    Address, ClusterWeight, DenominatorType, DirectResponseAction, Duration, FractionalPercent,
    Int64Range, Locality, QueryParameterMatcher, RedirectAction, RegexMatcher, RouteAction,
    RuntimeFractionalPercent, SocketAddress, WeightedCluster,
};
pub use super::v3::route_action;

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
        /// Deprecated ECMAScript regex.
        Regex(String),
        SafeRegex(super::RegexMatcher),
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
        /// Deprecated ECMAScript regex.
        RegexMatch(String),
        SafeRegexMatch(super::RegexMatcher),
        RangeMatch(super::Int64Range),
        PresentMatch(bool),
        PrefixMatch(String),
        SuffixMatch(String),
    }
}

/// `envoy.api.v2.core.Node`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Node {
    pub id: String,
    pub cluster: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub locality: Option<Locality>,
    /// Deprecated upstream, still sent by v2 clients.
    pub build_version: String,
    pub user_agent_name: String,
    pub user_agent_version: String,
    pub client_features: Vec<String>,
    pub listening_addresses: Vec<Address>,
}

impl From<RouteConfiguration> for v3::RouteConfiguration {
    fn from(config: RouteConfiguration) -> Self {
        Self {
            name: config.name,
            virtual_hosts: config.virtual_hosts.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<VirtualHost> for v3::VirtualHost {
    fn from(host: VirtualHost) -> Self {
        Self {
            name: host.name,
            domains: host.domains,
            routes: host.routes.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Route> for v3::Route {
    fn from(route: Route) -> Self {
        let action = route.action.map(|action| match action {
            route::Action::Route(action) => v3::route::Action::Route(action),
            route::Action::Redirect(redirect) => v3::route::Action::Redirect(redirect),
            route::Action::DirectResponse(response) => v3::route::Action::DirectResponse(response),
        });
        Self {
            name: route.name,
            route_match: route.route_match.map(Into::into),
            action,
        }
    }
}

impl From<RouteMatch> for v3::RouteMatch {
    fn from(route_match: RouteMatch) -> Self {
        use route_match::PathSpecifier;
        use v3::route_match::PathSpecifier as V3PathSpecifier;

        let path_specifier = match route_match.path_specifier {
            Some(PathSpecifier::Prefix(prefix)) => Some(V3PathSpecifier::Prefix(prefix)),
            Some(PathSpecifier::Path(path)) => Some(V3PathSpecifier::Path(path)),
            Some(PathSpecifier::SafeRegex(regex)) => Some(V3PathSpecifier::SafeRegex(regex)),
            Some(PathSpecifier::Regex(regex)) => {
                tracing::warn!(%regex, "deprecated v2 regex path specifier has no v3 equivalent");
                None
            }
            None => None,
        };
        Self {
            path_specifier,
            case_sensitive: route_match.case_sensitive,
            runtime_fraction: route_match.runtime_fraction,
            headers: route_match.headers.into_iter().map(Into::into).collect(),
            query_parameters: route_match.query_parameters,
        }
    }
}

impl From<HeaderMatcher> for v3::HeaderMatcher {
    fn from(matcher: HeaderMatcher) -> Self {
        use header_matcher::HeaderMatchSpecifier;
        use v3::header_matcher::HeaderMatchSpecifier as V3Specifier;

        let header_match_specifier = match matcher.header_match_specifier {
            Some(HeaderMatchSpecifier::ExactMatch(value)) => Some(V3Specifier::ExactMatch(value)),
            Some(HeaderMatchSpecifier::SafeRegexMatch(regex)) => {
                Some(V3Specifier::SafeRegexMatch(regex))
            }
            Some(HeaderMatchSpecifier::RangeMatch(range)) => Some(V3Specifier::RangeMatch(range)),
            Some(HeaderMatchSpecifier::PresentMatch(present)) => {
                Some(V3Specifier::PresentMatch(present))
            }
            Some(HeaderMatchSpecifier::PrefixMatch(prefix)) => Some(V3Specifier::PrefixMatch(prefix)),
            Some(HeaderMatchSpecifier::SuffixMatch(suffix)) => Some(V3Specifier::SuffixMatch(suffix)),
            Some(HeaderMatchSpecifier::RegexMatch(regex)) => {
                tracing::warn!(
                    header = %matcher.name,
                    %regex,
                    "deprecated v2 regex_match header specifier has no v3 equivalent"
                );
                None
            }
            None => None,
        };
        Self {
            name: matcher.name,
            header_match_specifier,
            invert_match: matcher.invert_match,
        }
    }
}
