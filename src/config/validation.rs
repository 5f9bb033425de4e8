//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (poll interval > 0, ports valid)
//! - Check cross-section consistency (watch needs a route file)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResolverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ResolverConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("resolver.authority must not be empty")]
    EmptyAuthority,

    #[error("source.poll_interval_secs must be greater than 0")]
    ZeroPollInterval,

    #[error("source.watch requires source.route_config_path")]
    WatchWithoutRouteConfig,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("node.listening_addresses[{index}]: {reason}")]
    InvalidListeningAddress { index: usize, reason: String },
}

pub fn validate_config(config: &ResolverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.resolver.authority.trim().is_empty() {
        errors.push(ValidationError::EmptyAuthority);
    }

    if config.source.poll_interval_secs == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }
    if config.source.watch && config.source.route_config_path.is_none() {
        errors.push(ValidationError::WatchWithoutRouteConfig);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (index, address) in config.node.listening_addresses.iter().enumerate() {
        if address.host.is_empty() {
            errors.push(ValidationError::InvalidListeningAddress {
                index,
                reason: "host must not be empty".to_string(),
            });
        }
        if address.port > u32::from(u16::MAX) {
            errors.push(ValidationError::InvalidListeningAddress {
                index,
                reason: format!("port {} out of range", address.port),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
