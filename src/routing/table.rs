//! Virtual host selection and the compiled route table.
//!
//! # Responsibilities
//! - Pick the virtual host serving a target authority
//! - Convert only that host's routes into an immutable `RouteTable`
//!
//! # Design Decisions
//! - Domain ranking: exact > longest `*.suffix` > longest `prefix.*` > `*`
//! - Ties go to the virtual host declared first
//! - Patterns with a wildcard anywhere else never match

use http::HeaderMap;
use thiserror::Error;

use crate::routing::convert::{convert_virtual_host, ConversionError};
use crate::routing::random::RandomSource;
use crate::routing::route::{Route, VirtualHost};
use crate::xds::v3;

/// Why a route configuration could not be installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("no virtual host in route configuration {route_config:?} matches authority {authority:?}")]
    NoVirtualHost {
        route_config: String,
        authority: String,
    },

    #[error("route configuration {route_config:?} rejected: {source}")]
    Conversion {
        route_config: String,
        #[source]
        source: ConversionError,
    },

    #[error("resolver is shut down")]
    ShutDown,
}

/// How a domain pattern matched an authority. Variant order is match strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DomainMatch {
    Universal,
    /// `foo.*`, ranked by pattern length.
    Prefix(usize),
    /// `*.foo.com`, ranked by pattern length.
    Suffix(usize),
    Exact,
}

/// Match one `domains` entry against an authority, case-insensitively.
pub fn match_domain(pattern: &str, authority: &str) -> Option<DomainMatch> {
    let pattern = pattern.to_ascii_lowercase();
    let authority = authority.to_ascii_lowercase();

    if pattern == "*" {
        return Some(DomainMatch::Universal);
    }
    if !pattern.contains('*') {
        return (pattern == authority).then_some(DomainMatch::Exact);
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        if suffix.contains('*') {
            return None;
        }
        let matched = authority.len() > suffix.len() && authority.ends_with(suffix);
        return matched.then_some(DomainMatch::Suffix(pattern.len()));
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        if prefix.contains('*') {
            return None;
        }
        let matched = authority.len() > prefix.len() && authority.starts_with(prefix);
        return matched.then_some(DomainMatch::Prefix(pattern.len()));
    }

    None
}

/// Best-matching virtual host for `authority`, if any.
pub fn find_virtual_host<'a>(
    virtual_hosts: &'a [v3::VirtualHost],
    authority: &str,
) -> Option<&'a v3::VirtualHost> {
    let mut best: Option<(DomainMatch, &v3::VirtualHost)> = None;

    for virtual_host in virtual_hosts {
        let strongest = virtual_host
            .domains
            .iter()
            .filter_map(|domain| match_domain(domain, authority))
            .max();
        if let Some(strength) = strongest {
            let better = match best {
                Some((current, _)) => strength > current,
                None => true,
            };
            if better {
                best = Some((strength, virtual_host));
            }
        }
    }

    best.map(|(_, virtual_host)| virtual_host)
}

/// Compiled routes of the virtual host serving one authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    route_config_name: String,
    virtual_host: VirtualHost,
}

impl RouteTable {
    /// Select the virtual host for `authority` and convert its routes.
    pub fn build(config: &v3::RouteConfiguration, authority: &str) -> Result<Self, UpdateError> {
        let wire_host = find_virtual_host(&config.virtual_hosts, authority).ok_or_else(|| {
            UpdateError::NoVirtualHost {
                route_config: config.name.clone(),
                authority: authority.to_string(),
            }
        })?;

        let virtual_host =
            convert_virtual_host(wire_host).map_err(|source| UpdateError::Conversion {
                route_config: config.name.clone(),
                source,
            })?;

        Ok(Self {
            route_config_name: config.name.clone(),
            virtual_host,
        })
    }

    pub fn from_virtual_host(route_config_name: impl Into<String>, virtual_host: VirtualHost) -> Self {
        Self {
            route_config_name: route_config_name.into(),
            virtual_host,
        }
    }

    pub fn route_config_name(&self) -> &str {
        &self.route_config_name
    }

    pub fn virtual_host(&self) -> &VirtualHost {
        &self.virtual_host
    }

    pub fn routes(&self) -> &[Route] {
        self.virtual_host.routes()
    }

    pub fn find_route(
        &self,
        path: &str,
        headers: &HeaderMap,
        random: &dyn RandomSource,
    ) -> Option<&Route> {
        self.virtual_host.find_route(path, headers, random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xds::v3::route_action::ClusterSpecifier;
    use crate::xds::v3::route_match::PathSpecifier;

    fn wire_host(name: &str, domains: &[&str]) -> v3::VirtualHost {
        v3::VirtualHost {
            name: name.into(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
            routes: vec![v3::Route {
                name: format!("{}-default", name),
                route_match: Some(v3::RouteMatch {
                    path_specifier: Some(PathSpecifier::Prefix(String::new())),
                    ..Default::default()
                }),
                action: Some(v3::route::Action::Route(v3::RouteAction {
                    cluster_specifier: Some(ClusterSpecifier::Cluster(format!("{}-cluster", name))),
                    ..Default::default()
                })),
            }],
        }
    }

    #[test]
    fn test_match_domain() {
        assert_eq!(match_domain("foo.com", "FOO.com"), Some(DomainMatch::Exact));
        assert_eq!(match_domain("foo.com", "bar.com"), None);
        assert_eq!(match_domain("*", "anything"), Some(DomainMatch::Universal));
        assert_eq!(
            match_domain("*.foo.com", "api.foo.com"),
            Some(DomainMatch::Suffix(9))
        );
        assert_eq!(match_domain("*.foo.com", ".foo.com"), None);
        assert_eq!(
            match_domain("foo.*", "foo.internal"),
            Some(DomainMatch::Prefix(5))
        );
        assert_eq!(match_domain("f*o.com", "foo.com"), None);
        assert_eq!(match_domain("*.foo.*", "a.foo.b"), None);
    }

    #[test]
    fn test_domain_match_ordering() {
        assert!(DomainMatch::Exact > DomainMatch::Suffix(100));
        assert!(DomainMatch::Suffix(3) > DomainMatch::Prefix(100));
        assert!(DomainMatch::Suffix(10) > DomainMatch::Suffix(3));
        assert!(DomainMatch::Prefix(1) > DomainMatch::Universal);
    }

    #[test]
    fn test_find_virtual_host_precedence() {
        let hosts = vec![
            wire_host("universal", &["*"]),
            wire_host("prefix", &["api.*"]),
            wire_host("short-suffix", &["*.com"]),
            wire_host("long-suffix", &["*.foo.com"]),
            wire_host("exact", &["api.foo.com"]),
        ];

        let pick = |authority: &str| find_virtual_host(&hosts, authority).map(|h| h.name.as_str());
        assert_eq!(pick("api.foo.com"), Some("exact"));
        assert_eq!(pick("www.foo.com"), Some("long-suffix"));
        assert_eq!(pick("www.bar.com"), Some("short-suffix"));
        assert_eq!(pick("api.internal"), Some("prefix"));
        assert_eq!(pick("localhost"), Some("universal"));
    }

    #[test]
    fn test_find_virtual_host_first_wins_on_tie() {
        let hosts = vec![wire_host("first", &["*"]), wire_host("second", &["*"])];
        assert_eq!(
            find_virtual_host(&hosts, "x").map(|h| h.name.as_str()),
            Some("first")
        );
        assert!(find_virtual_host(&[], "x").is_none());
    }

    #[test]
    fn test_build_route_table() {
        let config = v3::RouteConfiguration {
            name: "routes".into(),
            virtual_hosts: vec![wire_host("a", &["a.example"]), wire_host("b", &["b.example"])],
        };

        let table = RouteTable::build(&config, "b.example").unwrap();
        assert_eq!(table.route_config_name(), "routes");
        assert_eq!(table.virtual_host().name(), "b");
        assert_eq!(table.routes().len(), 1);
        assert_eq!(table.routes()[0].action().cluster(), Some("b-cluster"));

        let err = RouteTable::build(&config, "c.example").unwrap_err();
        assert!(matches!(err, UpdateError::NoVirtualHost { .. }));
    }

    #[test]
    fn test_build_ignores_invalid_routes_in_other_hosts() {
        let mut broken = wire_host("broken", &["broken.example"]);
        broken.routes[0].action = None;
        let config = v3::RouteConfiguration {
            name: "routes".into(),
            virtual_hosts: vec![broken, wire_host("ok", &["ok.example"])],
        };

        assert!(RouteTable::build(&config, "ok.example").is_ok());
        let err = RouteTable::build(&config, "broken.example").unwrap_err();
        assert!(matches!(err, UpdateError::Conversion { .. }));
    }
}
