//! Per-RPC route resolution over an atomically published snapshot.
//!
//! # Responsibilities
//! - Accept route configuration updates (v2 or v3) for one authority
//! - Publish each compiled table as a whole
//! - Resolve `(path, headers)` to a cluster and timeout
//!
//! # Design Decisions
//! - Updates compile off to the side, then swap in with one pointer store
//! - Readers never lock; a lookup sees either the old or the new table
//! - A rejected update leaves the current snapshot in place

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use http::HeaderMap;
use serde::Serialize;
use thiserror::Error;

use crate::observability::metrics;
use crate::routing::random::{RandomSource, ThreadRandom};
use crate::routing::route::INFINITE_TIMEOUT_NANOS;
use crate::routing::table::{RouteTable, UpdateError};
use crate::xds::RouteConfigurationUpdate;

/// Why an RPC could not be routed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no route configuration loaded")]
    NotLoaded,

    #[error("no route matches path {path:?}")]
    NoMatchingRoute { path: String },
}

/// Where an RPC goes and how long it may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub cluster: String,
    pub timeout_nanos: i64,
}

impl RoutingDecision {
    /// `None` when the route sets no deadline.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_nanos == INFINITE_TIMEOUT_NANOS {
            None
        } else {
            Some(Duration::from_nanos(self.timeout_nanos.max(0) as u64))
        }
    }
}

/// One published generation of the route table.
#[derive(Debug)]
pub struct Snapshot {
    version: u64,
    table: RouteTable,
}

impl Snapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}

/// Routes RPCs for a single target authority.
#[derive(Debug)]
pub struct RouteResolver {
    authority: String,
    snapshot: ArcSwapOption<Snapshot>,
    next_version: AtomicU64,
    shut_down: AtomicBool,
    random: Arc<dyn RandomSource>,
}

impl RouteResolver {
    pub fn new(authority: impl Into<String>) -> Self {
        Self::with_random(authority, Arc::new(ThreadRandom))
    }

    /// Use an injected random source for weighted and fractional decisions.
    pub fn with_random(authority: impl Into<String>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            authority: authority.into(),
            snapshot: ArcSwapOption::empty(),
            next_version: AtomicU64::new(1),
            shut_down: AtomicBool::new(false),
            random,
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.load().is_some()
    }

    /// Current snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.load_full()
    }

    /// Compile and publish a new route configuration.
    ///
    /// On error nothing is published; the previous snapshot keeps serving.
    pub fn update_route_configuration(
        &self,
        update: impl Into<RouteConfigurationUpdate>,
    ) -> Result<u64, UpdateError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(UpdateError::ShutDown);
        }

        let update = update.into();
        let api_version = update.api_version();
        let config = update.into_v3();

        let table = match RouteTable::build(&config, &self.authority) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(
                    route_config = %config.name,
                    authority = %self.authority,
                    %api_version,
                    error = %e,
                    "Route configuration rejected, keeping previous table"
                );
                metrics::record_route_update("rejected");
                return Err(e);
            }
        };

        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let route_count = table.routes().len();
        let virtual_host = table.virtual_host().name().to_string();
        self.snapshot.store(Some(Arc::new(Snapshot { version, table })));

        // A concurrent shutdown may have cleared the slot before our store.
        if self.shut_down.load(Ordering::Acquire) {
            self.snapshot.store(None);
            return Err(UpdateError::ShutDown);
        }

        metrics::record_route_update("accepted");
        metrics::set_routes_active(route_count);
        tracing::info!(
            route_config = %config.name,
            %virtual_host,
            authority = %self.authority,
            %api_version,
            version,
            routes = route_count,
            "Route configuration applied"
        );

        Ok(version)
    }

    /// Route one RPC. First matching route wins.
    pub fn resolve(&self, path: &str, headers: &HeaderMap) -> Result<RoutingDecision, ResolveError> {
        let guard = self.snapshot.load();
        let snapshot = match guard.as_ref() {
            Some(snapshot) => snapshot,
            None => {
                metrics::record_resolution("not_loaded");
                return Err(ResolveError::NotLoaded);
            }
        };

        let route = match snapshot.table.find_route(path, headers, self.random.as_ref()) {
            Some(route) => route,
            None => {
                tracing::debug!(path, version = snapshot.version, "No route matched");
                metrics::record_resolution("no_match");
                return Err(ResolveError::NoMatchingRoute {
                    path: path.to_string(),
                });
            }
        };

        let action = route.action();
        let decision = RoutingDecision {
            cluster: action.select_cluster(self.random.as_ref()).to_string(),
            timeout_nanos: action.timeout_nanos(),
        };
        metrics::record_resolution("matched");
        tracing::trace!(path, cluster = %decision.cluster, "Resolved route");
        Ok(decision)
    }

    /// Drop the current table and refuse further updates.
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Release);
        self.snapshot.store(None);
        metrics::set_routes_active(0);
        tracing::info!(authority = %self.authority, "Route resolver shut down");
    }
}
