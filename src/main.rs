//! xds-router command line.
//!
//! ```text
//!   route file (JSON/TOML, v2/v3) ──▶ config::loader ──▶ RouteConfigurationUpdate
//!                                                              │
//!                                                              ▼
//!                         routing::table (virtual host for the authority)
//!                                                              │
//!                                                              ▼
//!                         routing::convert (Struct / Error / Skip per route)
//!                                                              │
//!                                                              ▼
//!   (path, headers) ──────▶ routing::resolver (snapshot) ──▶ RoutingDecision
//! ```
//!
//! Subcommands:
//! - `check`   convert a route file and report every route's outcome
//! - `resolve` route a single RPC and print the decision as JSON
//! - `node`    print the configured node identity in v2 or v3 wire form
//! - `watch`   keep a resolver up to date with a route file until signalled

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use http::{HeaderMap, HeaderName, HeaderValue};

use xds_router::config::{load_config, load_route_configuration, ResolverConfig, RouteConfigWatcher};
use xds_router::lifecycle::signals::spawn_signal_handler;
use xds_router::lifecycle::startup::{build_resolver, random_source};
use xds_router::lifecycle::Shutdown;
use xds_router::observability::{logging, metrics};
use xds_router::routing::convert::{convert_route, StructOrError};
use xds_router::routing::table::find_virtual_host;
use xds_router::routing::RouteResolver;
use xds_router::xds::ApiVersion;

#[derive(Parser)]
#[command(name = "xds-router")]
#[command(about = "Resolve RPC routes from xDS route configurations", long_about = None)]
struct Cli {
    /// Resolver configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a route configuration and report each route's outcome
    Check {
        routes: PathBuf,
        #[arg(long)]
        api_version: Option<ApiVersion>,
        #[arg(long)]
        authority: Option<String>,
    },
    /// Resolve one RPC against a route configuration
    Resolve {
        routes: PathBuf,
        #[arg(long)]
        path: String,
        /// Request header as `name=value`; repeatable.
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
        #[arg(long)]
        api_version: Option<ApiVersion>,
        #[arg(long)]
        authority: Option<String>,
    },
    /// Print the configured node identity as wire JSON
    Node {
        #[arg(long, default_value = "v3")]
        api_version: ApiVersion,
    },
    /// Apply the configured route file and follow its changes
    Watch,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got {:?}", raw)),
    }
}

fn load_resolver_config(path: Option<&Path>) -> Result<ResolverConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(ResolverConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_resolver_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    match cli.command {
        Commands::Check {
            routes,
            api_version,
            authority,
        } => check(&config, &routes, api_version, authority),
        Commands::Resolve {
            routes,
            path,
            headers,
            api_version,
            authority,
        } => resolve(&config, &routes, &path, &headers, api_version, authority),
        Commands::Node { api_version } => {
            let node = config.node.to_node();
            println!(
                "{}",
                serde_json::to_string_pretty(&node.to_wire_json(api_version)?)?
            );
            Ok(())
        }
        Commands::Watch => watch(config).await,
    }
}

fn check(
    config: &ResolverConfig,
    routes: &Path,
    api_version: Option<ApiVersion>,
    authority: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let api_version = api_version.unwrap_or(config.source.api_version);
    let authority = authority.unwrap_or_else(|| config.resolver.authority.clone());
    let route_config = load_route_configuration(routes, api_version)?.into_v3();

    let selected = find_virtual_host(&route_config.virtual_hosts, &authority).map(|vh| vh.name.as_str());
    println!("route configuration {:?} ({})", route_config.name, api_version);

    let mut invalid = 0usize;
    for virtual_host in &route_config.virtual_hosts {
        let marker = if Some(virtual_host.name.as_str()) == selected {
            format!(" [selected for {}]", authority)
        } else {
            String::new()
        };
        println!(
            "virtual host {:?} domains={:?}{}",
            virtual_host.name, virtual_host.domains, marker
        );

        for (index, route) in virtual_host.routes.iter().enumerate() {
            match convert_route(route) {
                StructOrError::Struct(converted) => {
                    let destination = match converted.action().weighted_clusters() {
                        Some(weights) => weights
                            .iter()
                            .map(|w| format!("{}:{}", w.name(), w.weight()))
                            .collect::<Vec<_>>()
                            .join(","),
                        None => converted.action().cluster().unwrap_or_default().to_string(),
                    };
                    println!("  #{} {:?} ok -> {}", index, route.name, destination);
                }
                StructOrError::Skip => println!("  #{} {:?} skipped", index, route.name),
                StructOrError::Error(detail) => {
                    invalid += 1;
                    println!("  #{} {:?} error: {}", index, route.name, detail);
                }
            }
        }
    }

    if selected.is_none() {
        println!("no virtual host matches authority {:?}", authority);
    }
    if invalid > 0 {
        return Err(format!("{} invalid route(s)", invalid).into());
    }
    Ok(())
}

fn resolve(
    config: &ResolverConfig,
    routes: &Path,
    path: &str,
    header_pairs: &[(String, String)],
    api_version: Option<ApiVersion>,
    authority: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let api_version = api_version.unwrap_or(config.source.api_version);
    let authority = authority.unwrap_or_else(|| config.resolver.authority.clone());

    let mut headers = HeaderMap::new();
    for (name, value) in header_pairs {
        headers.append(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }

    let resolver = RouteResolver::with_random(authority, random_source(config));
    resolver.update_route_configuration(load_route_configuration(routes, api_version)?)?;
    let decision = resolver.resolve(path, &headers)?;

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

async fn watch(config: ResolverConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let resolver = build_resolver(&config)?;
    let shutdown = Arc::new(Shutdown::new());
    let mut shutdown_rx = shutdown.subscribe();
    let signal_task = spawn_signal_handler(shutdown.clone());

    // The watcher stops when its handle is dropped, so it lives for the whole loop.
    let (_watcher, mut updates) = match (&config.source.route_config_path, config.source.watch) {
        (Some(path), true) => {
            let (watcher, rx) = RouteConfigWatcher::new(
                path,
                config.source.api_version,
                Duration::from_secs(config.source.poll_interval_secs),
            );
            (Some(watcher.run()?), Some(rx))
        }
        _ => (None, None),
    };

    tracing::info!(
        authority = %resolver.authority(),
        loaded = resolver.is_loaded(),
        watching = updates.is_some(),
        "Resolver running"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            update = recv_update(&mut updates) => match update {
                Some(update) => {
                    // Rejections are logged inside the resolver; the old table keeps serving.
                    let _ = resolver.update_route_configuration(update);
                }
                None => {
                    tracing::warn!("Route configuration watcher stopped");
                    updates = None;
                }
            },
        }
    }

    resolver.shutdown();
    signal_task.abort();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn recv_update<T>(updates: &mut Option<tokio::sync::mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
