//! Wire → route model conversion.
//!
//! # Responsibilities
//! - Validate v3 route descriptors against what this client supports
//! - Compile regexes once, at conversion time
//! - Derive the effective per-route timeout
//! - Report each node as converted, rejected, or skipped
//!
//! # Design Decisions
//! - Expected failures are values (`StructOrError`), never panics
//! - Error and Skip are distinct: malformed config fails the update,
//!   recognized-but-unsupported features are dropped silently
//! - Skips are whole-route: the rest of the route list still applies

use thiserror::Error;

use crate::observability::metrics;
use crate::routing::matcher::{
    FractionMatcher, HeaderMatchKind, HeaderMatcher, PathMatcher, Range, SafeRegex,
};
use crate::routing::route::{
    ClusterSpecifier, ClusterWeight, Route, RouteAction, RouteMatch, VirtualHost,
    DEFAULT_TIMEOUT_NANOS, INFINITE_TIMEOUT_NANOS,
};
use crate::xds::v3;

/// Outcome of converting one wire node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum StructOrError<T> {
    /// Converted successfully.
    Struct(T),
    /// Invalid for this client; carries a human-readable detail.
    Error(String),
    /// Uses a recognized but unsupported feature; ignore without error.
    Skip,
}

impl<T> StructOrError<T> {
    pub fn from_error(detail: impl Into<String>) -> Self {
        StructOrError::Error(detail.into())
    }

    pub fn as_struct(&self) -> Option<&T> {
        match self {
            StructOrError::Struct(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_struct(self) -> Option<T> {
        match self {
            StructOrError::Struct(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match self {
            StructOrError::Error(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, StructOrError::Skip)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StructOrError<U> {
        match self {
            StructOrError::Struct(value) => StructOrError::Struct(f(value)),
            StructOrError::Error(detail) => StructOrError::Error(detail),
            StructOrError::Skip => StructOrError::Skip,
        }
    }
}

/// Unwraps a `Struct`, returning `Error` and `Skip` from the enclosing function.
macro_rules! try_struct {
    ($expr:expr) => {
        match $expr {
            StructOrError::Struct(value) => value,
            StructOrError::Error(detail) => return StructOrError::Error(detail),
            StructOrError::Skip => return StructOrError::Skip,
        }
    };
}

/// A route configuration that cannot be installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("virtual host {virtual_host:?}: route #{index} ({route:?}) is invalid: {detail}")]
    InvalidRoute {
        virtual_host: String,
        index: usize,
        route: String,
        detail: String,
    },
}

impl ConversionError {
    pub fn detail(&self) -> &str {
        match self {
            ConversionError::InvalidRoute { detail, .. } => detail,
        }
    }
}

/// Convert one route.
///
/// A skip in either the match or the action skips the whole route.
pub fn convert_route(route: &v3::Route) -> StructOrError<Route> {
    let default_match = v3::RouteMatch::default();
    let route_match = try_struct!(convert_route_match(
        route.route_match.as_ref().unwrap_or(&default_match)
    ));

    let action = match &route.action {
        Some(v3::route::Action::Route(action)) => try_struct!(convert_route_action(action)),
        Some(v3::route::Action::Redirect(_)) => {
            tracing::debug!(route = %route.name, "Skipping route with redirect action");
            return StructOrError::Skip;
        }
        Some(v3::route::Action::DirectResponse(_)) => {
            tracing::debug!(route = %route.name, "Skipping route with direct response action");
            return StructOrError::Skip;
        }
        None => return StructOrError::from_error("Unknown action type: action is not set"),
    };

    StructOrError::Struct(Route::new(route_match, action))
}

pub fn convert_route_match(proto: &v3::RouteMatch) -> StructOrError<RouteMatch> {
    use v3::route_match::PathSpecifier;

    if !proto.query_parameters.is_empty() {
        return StructOrError::Skip;
    }
    if proto.case_sensitive == Some(false) {
        return StructOrError::from_error("Unsupported match option: case insensitive");
    }

    let path_matcher = match &proto.path_specifier {
        Some(PathSpecifier::Prefix(prefix)) => PathMatcher::Prefix(prefix.clone()),
        Some(PathSpecifier::Path(path)) => PathMatcher::Exact(path.clone()),
        Some(PathSpecifier::SafeRegex(regex)) => match SafeRegex::new(regex.regex.as_str()) {
            Ok(regex) => PathMatcher::Regex(regex),
            Err(e) => {
                return StructOrError::from_error(format!(
                    "Malformed safe regex pattern {:?}: {}",
                    regex.regex, e
                ))
            }
        },
        Some(PathSpecifier::ConnectMatcher(_)) => {
            return StructOrError::from_error("Unsupported path match type: connect_matcher")
        }
        None => return StructOrError::from_error("Unknown path match type: path specifier is not set"),
    };

    let mut header_matchers = Vec::with_capacity(proto.headers.len());
    for header in &proto.headers {
        header_matchers.push(try_struct!(convert_header_matcher(header)));
    }

    let fraction_matcher = proto.runtime_fraction.as_ref().map(|fraction| {
        let percent = fraction.default_value.unwrap_or_default();
        FractionMatcher::new(percent.numerator, percent.denominator.scale())
    });

    StructOrError::Struct(RouteMatch::new(path_matcher, header_matchers, fraction_matcher))
}

pub fn convert_header_matcher(proto: &v3::HeaderMatcher) -> StructOrError<HeaderMatcher> {
    use v3::header_matcher::HeaderMatchSpecifier;

    let kind = match &proto.header_match_specifier {
        Some(HeaderMatchSpecifier::ExactMatch(value)) => HeaderMatchKind::Exact(value.clone()),
        Some(HeaderMatchSpecifier::SafeRegexMatch(regex)) => match SafeRegex::new(regex.regex.as_str()) {
            Ok(regex) => HeaderMatchKind::Regex(regex),
            Err(e) => {
                return StructOrError::from_error(format!(
                    "Malformed safe regex pattern {:?} for header {:?}: {}",
                    regex.regex, proto.name, e
                ))
            }
        },
        Some(HeaderMatchSpecifier::RangeMatch(range)) => {
            HeaderMatchKind::Range(Range::new(range.start, range.end))
        }
        Some(HeaderMatchSpecifier::PresentMatch(present)) => HeaderMatchKind::Present(*present),
        Some(HeaderMatchSpecifier::PrefixMatch(prefix)) => HeaderMatchKind::Prefix(prefix.clone()),
        Some(HeaderMatchSpecifier::SuffixMatch(suffix)) => HeaderMatchKind::Suffix(suffix.clone()),
        None => {
            return StructOrError::from_error(format!(
                "Unknown header matcher type for header {:?}",
                proto.name
            ))
        }
    };

    StructOrError::Struct(HeaderMatcher::new(proto.name.clone(), kind, proto.invert_match))
}

/// An unset weight counts as zero.
pub fn convert_cluster_weight(proto: &v3::ClusterWeight) -> ClusterWeight {
    ClusterWeight::new(proto.name.clone(), proto.weight.unwrap_or(0))
}

pub fn convert_route_action(proto: &v3::RouteAction) -> StructOrError<RouteAction> {
    use v3::route_action::ClusterSpecifier as WireClusterSpecifier;

    let cluster_specifier = match &proto.cluster_specifier {
        Some(WireClusterSpecifier::Cluster(cluster)) => ClusterSpecifier::Cluster(cluster.clone()),
        Some(WireClusterSpecifier::WeightedClusters(weighted)) => {
            let clusters: Vec<ClusterWeight> =
                weighted.clusters.iter().map(convert_cluster_weight).collect();
            if clusters.is_empty() {
                return StructOrError::from_error("No cluster found in weighted cluster list");
            }
            let total: u64 = clusters.iter().map(|c| u64::from(c.weight())).sum();
            if total == 0 {
                return StructOrError::from_error("Sum of cluster weights should be above 0");
            }
            if total > u64::from(u32::MAX) {
                return StructOrError::from_error(format!(
                    "Sum of cluster weights should be below {}, got {}",
                    u32::MAX,
                    total
                ));
            }
            ClusterSpecifier::WeightedClusters(clusters)
        }
        Some(WireClusterSpecifier::ClusterHeader(header)) => {
            tracing::debug!(%header, "Skipping route action with cluster_header specifier");
            return StructOrError::Skip;
        }
        None => return StructOrError::from_error("Unknown cluster specifier: cluster specifier is not set"),
    };

    StructOrError::Struct(RouteAction::new(effective_timeout_nanos(proto), cluster_specifier))
}

/// `max_grpc_timeout`, when set, overrides `timeout`. On either field zero
/// means no deadline. Neither set falls back to 15 seconds.
fn effective_timeout_nanos(proto: &v3::RouteAction) -> i64 {
    let configured = proto.max_grpc_timeout.or(proto.timeout);
    match configured {
        Some(duration) if duration.is_zero() => INFINITE_TIMEOUT_NANOS,
        Some(duration) => duration.as_nanos(),
        None => DEFAULT_TIMEOUT_NANOS,
    }
}

/// Convert a virtual host's route list, preserving order.
///
/// Skipped routes are dropped; the first invalid route rejects the whole host.
pub fn convert_virtual_host(proto: &v3::VirtualHost) -> Result<VirtualHost, ConversionError> {
    let mut routes = Vec::with_capacity(proto.routes.len());
    let mut skipped = 0usize;

    for (index, route) in proto.routes.iter().enumerate() {
        match convert_route(route) {
            StructOrError::Struct(converted) => routes.push(converted),
            StructOrError::Skip => {
                skipped += 1;
                tracing::debug!(
                    virtual_host = %proto.name,
                    route = %route.name,
                    index,
                    "Route uses unsupported features, ignoring"
                );
            }
            StructOrError::Error(detail) => {
                return Err(ConversionError::InvalidRoute {
                    virtual_host: proto.name.clone(),
                    index,
                    route: route.name.clone(),
                    detail,
                });
            }
        }
    }

    if skipped > 0 {
        metrics::record_routes_skipped(skipped);
    }

    Ok(VirtualHost::new(proto.name.clone(), proto.domains.clone(), routes))
}
