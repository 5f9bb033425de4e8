//! Shared builders for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use http::{HeaderMap, HeaderName, HeaderValue};
use xds_router::routing::RandomSource;
use xds_router::xds::v3;
use xds_router::xds::v3::header_matcher::HeaderMatchSpecifier;
use xds_router::xds::v3::route_action::ClusterSpecifier;
use xds_router::xds::v3::route_match::PathSpecifier;

pub fn route(name: &str, path_specifier: PathSpecifier, cluster_specifier: ClusterSpecifier) -> v3::Route {
    v3::Route {
        name: name.into(),
        route_match: Some(v3::RouteMatch {
            path_specifier: Some(path_specifier),
            ..Default::default()
        }),
        action: Some(v3::route::Action::Route(v3::RouteAction {
            cluster_specifier: Some(cluster_specifier),
            ..Default::default()
        })),
    }
}

pub fn prefix_route(prefix: &str, cluster: &str) -> v3::Route {
    route(
        &format!("{}-route", cluster),
        PathSpecifier::Prefix(prefix.into()),
        ClusterSpecifier::Cluster(cluster.into()),
    )
}

pub fn weighted_route(prefix: &str, weights: &[(&str, u32)]) -> v3::Route {
    route(
        "weighted",
        PathSpecifier::Prefix(prefix.into()),
        ClusterSpecifier::WeightedClusters(v3::WeightedCluster {
            clusters: weights
                .iter()
                .map(|(name, weight)| v3::ClusterWeight {
                    name: name.to_string(),
                    weight: Some(*weight),
                })
                .collect(),
            total_weight: None,
        }),
    )
}

pub fn with_header(mut route: v3::Route, name: &str, specifier: HeaderMatchSpecifier) -> v3::Route {
    if let Some(route_match) = route.route_match.as_mut() {
        route_match.headers.push(v3::HeaderMatcher {
            name: name.into(),
            header_match_specifier: Some(specifier),
            invert_match: false,
        });
    }
    route
}

pub fn virtual_host(name: &str, domains: &[&str], routes: Vec<v3::Route>) -> v3::VirtualHost {
    v3::VirtualHost {
        name: name.into(),
        domains: domains.iter().map(|d| d.to_string()).collect(),
        routes,
    }
}

/// One catch-all virtual host holding `routes`.
pub fn route_config(routes: Vec<v3::Route>) -> v3::RouteConfiguration {
    v3::RouteConfiguration {
        name: "test-routes".into(),
        virtual_hosts: vec![virtual_host("vh", &["*"], routes)],
    }
}

pub fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    map
}

/// Replays a fixed sequence of draws, each reduced modulo the bound.
#[derive(Debug)]
pub struct ScriptedRandom {
    draws: Mutex<VecDeque<u64>>,
}

impl ScriptedRandom {
    pub fn new(draws: &[u64]) -> Self {
        Self {
            draws: Mutex::new(draws.iter().copied().collect()),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        let draw = self.draws.lock().unwrap().pop_front().expect("script exhausted");
        draw % bound
    }
}

/// Write `content` to a per-process temp file and return its path.
pub fn write_temp(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("xds-router-it-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
