//! Compiled route model.
//!
//! # Responsibilities
//! - Aggregate matcher primitives into a conjunctive `RouteMatch`
//! - Describe where a matched RPC goes (`RouteAction`) and its deadline
//! - Pick one cluster out of a weighted set
//!
//! # Design Decisions
//! - Immutable after conversion; shared read-only by concurrent lookups
//! - Cluster selection is an enum: single cluster or weighted list, never both
//! - `i64::MAX` nanoseconds stands for "no timeout"

use std::time::Duration;

use http::HeaderMap;

use crate::routing::matcher::{FractionMatcher, HeaderMatcher, PathMatcher};
use crate::routing::random::RandomSource;

/// Sentinel timeout meaning "never time out".
pub const INFINITE_TIMEOUT_NANOS: i64 = i64::MAX;

/// Timeout applied when the route sets neither `timeout` nor `max_grpc_timeout`.
pub const DEFAULT_TIMEOUT_NANOS: i64 = 15 * 1_000_000_000;

/// Looks up a header the way matchers see it.
///
/// Repeated values are joined with `,`. Binary (`-bin`) headers and values
/// that are not visible ASCII are treated as absent.
pub fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    if name.ends_with("-bin") {
        return None;
    }
    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}

/// Conditions a request must satisfy for a route to apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteMatch {
    path_matcher: PathMatcher,
    header_matchers: Vec<HeaderMatcher>,
    fraction_matcher: Option<FractionMatcher>,
}

impl RouteMatch {
    pub fn new(
        path_matcher: PathMatcher,
        header_matchers: Vec<HeaderMatcher>,
        fraction_matcher: Option<FractionMatcher>,
    ) -> Self {
        Self {
            path_matcher,
            header_matchers,
            fraction_matcher,
        }
    }

    /// Match on path alone, no header or fraction constraints.
    pub fn with_path(path_matcher: PathMatcher) -> Self {
        Self::new(path_matcher, Vec::new(), None)
    }

    pub fn path_matcher(&self) -> &PathMatcher {
        &self.path_matcher
    }

    pub fn header_matchers(&self) -> &[HeaderMatcher] {
        &self.header_matchers
    }

    pub fn fraction_matcher(&self) -> Option<&FractionMatcher> {
        self.fraction_matcher.as_ref()
    }

    /// Path AND every header AND (no fraction OR the random draw falls inside it).
    ///
    /// The fraction is sampled last so traffic rejected by path or headers
    /// does not consume draws.
    pub fn matches(&self, path: &str, headers: &HeaderMap, random: &dyn RandomSource) -> bool {
        if !self.path_matcher.matches(path) {
            return false;
        }
        let headers_match = self.header_matchers.iter().all(|matcher| {
            let value = header_value(headers, matcher.name());
            matcher.matches(value.as_deref())
        });
        if !headers_match {
            return false;
        }
        match &self.fraction_matcher {
            Some(fraction) => fraction.sample(random),
            None => true,
        }
    }
}

/// One member of a weighted cluster split.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterWeight {
    name: String,
    weight: u32,
}

impl ClusterWeight {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClusterSpecifier {
    Cluster(String),
    /// Declaration order is preserved; total weight is non-zero.
    WeightedClusters(Vec<ClusterWeight>),
}

/// What to do with an RPC once its route matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteAction {
    timeout_nanos: i64,
    cluster_specifier: ClusterSpecifier,
}

impl RouteAction {
    pub fn new(timeout_nanos: i64, cluster_specifier: ClusterSpecifier) -> Self {
        Self {
            timeout_nanos,
            cluster_specifier,
        }
    }

    pub fn timeout_nanos(&self) -> i64 {
        self.timeout_nanos
    }

    /// `None` when the route has no deadline.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_nanos == INFINITE_TIMEOUT_NANOS {
            None
        } else {
            Some(Duration::from_nanos(self.timeout_nanos.max(0) as u64))
        }
    }

    pub fn cluster_specifier(&self) -> &ClusterSpecifier {
        &self.cluster_specifier
    }

    pub fn cluster(&self) -> Option<&str> {
        match &self.cluster_specifier {
            ClusterSpecifier::Cluster(cluster) => Some(cluster.as_str()),
            ClusterSpecifier::WeightedClusters(_) => None,
        }
    }

    pub fn weighted_clusters(&self) -> Option<&[ClusterWeight]> {
        match &self.cluster_specifier {
            ClusterSpecifier::Cluster(_) => None,
            ClusterSpecifier::WeightedClusters(clusters) => Some(clusters.as_slice()),
        }
    }

    /// Choose the destination cluster.
    ///
    /// Weights form consecutive sub-ranges of `[0, total)`; the cluster whose
    /// sub-range contains a uniform draw wins.
    pub fn select_cluster(&self, random: &dyn RandomSource) -> &str {
        match &self.cluster_specifier {
            ClusterSpecifier::Cluster(cluster) => cluster.as_str(),
            ClusterSpecifier::WeightedClusters(clusters) => {
                let total: u64 = clusters.iter().map(|c| u64::from(c.weight)).sum();
                let draw = random.next_below(total);
                let mut upper = 0u64;
                for cluster in clusters {
                    upper += u64::from(cluster.weight);
                    if draw < upper {
                        return &cluster.name;
                    }
                }
                // Only reachable with a zero total, which conversion rejects.
                clusters.last().map(|c| c.name.as_str()).unwrap_or_default()
            }
        }
    }
}

/// A match/action pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    route_match: RouteMatch,
    action: RouteAction,
}

impl Route {
    pub fn new(route_match: RouteMatch, action: RouteAction) -> Self {
        Self {
            route_match,
            action,
        }
    }

    pub fn route_match(&self) -> &RouteMatch {
        &self.route_match
    }

    pub fn action(&self) -> &RouteAction {
        &self.action
    }

    /// True for a catch-all: `""` or `"/"` prefix with no header or fraction constraints.
    pub fn is_default_route(&self) -> bool {
        let catch_all_path = matches!(
            self.route_match.path_matcher.prefix(),
            Some("") | Some("/")
        );
        catch_all_path
            && self.route_match.header_matchers.is_empty()
            && self.route_match.fraction_matcher.is_none()
    }
}

/// Routes scoped to a set of authorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualHost {
    name: String,
    domains: Vec<String>,
    routes: Vec<Route>,
}

impl VirtualHost {
    pub fn new(name: impl Into<String>, domains: Vec<String>, routes: Vec<Route>) -> Self {
        Self {
            name: name.into(),
            domains,
            routes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route, in configuration order, whose match succeeds.
    pub fn find_route(
        &self,
        path: &str,
        headers: &HeaderMap,
        random: &dyn RandomSource,
    ) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.route_match.matches(path, headers, random))
    }
}
