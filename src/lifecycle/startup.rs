//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the resolver from validated configuration
//! - Apply the initial route configuration, if one is configured
//!
//! # Design Decisions
//! - Fail fast: an unreadable or invalid initial route file is fatal
//! - A configured seed makes weighted selection reproducible

use std::sync::Arc;

use thiserror::Error;

use crate::config::loader::{load_route_configuration, ConfigError};
use crate::config::schema::ResolverConfig;
use crate::routing::random::{RandomSource, SeededRandom, ThreadRandom};
use crate::routing::resolver::RouteResolver;
use crate::routing::table::UpdateError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("initial route configuration rejected: {0}")]
    Update(#[from] UpdateError),
}

pub fn random_source(config: &ResolverConfig) -> Arc<dyn RandomSource> {
    match config.resolver.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    }
}

/// Create the resolver and load `source.route_config_path` into it.
pub fn build_resolver(config: &ResolverConfig) -> Result<RouteResolver, StartupError> {
    let resolver = RouteResolver::with_random(&config.resolver.authority, random_source(config));

    if let Some(path) = &config.source.route_config_path {
        let update = load_route_configuration(path, config.source.api_version)?;
        resolver.update_route_configuration(update)?;
    } else {
        tracing::info!("No route configuration path configured, starting empty");
    }

    Ok(resolver)
}
