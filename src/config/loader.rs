//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::schema::ResolverConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::xds::{v2, v3, ApiVersion, RouteConfigurationUpdate};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ResolverConfig, ConfigError> {
    let content = read(path)?;
    let config: ResolverConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_wire<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    if is_toml {
        Ok(toml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Load a wire route configuration. `.toml` files parse as TOML, anything else as JSON.
pub fn load_route_configuration(
    path: &Path,
    version: ApiVersion,
) -> Result<RouteConfigurationUpdate, ConfigError> {
    let content = read(path)?;
    let update = match version {
        ApiVersion::V2 => {
            RouteConfigurationUpdate::V2(parse_wire::<v2::RouteConfiguration>(path, &content)?)
        }
        ApiVersion::V3 => {
            RouteConfigurationUpdate::V3(parse_wire::<v3::RouteConfiguration>(path, &content)?)
        }
    };

    tracing::debug!(
        path = %path.display(),
        %version,
        route_config = %update.name(),
        "Loaded route configuration"
    );
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("xds-router-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/xds-router.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_config_validation_failure() {
        let path = temp_file(
            "invalid.toml",
            r#"
            [source]
            poll_interval_secs = 0
            "#,
        );
        match load_config(&path).unwrap_err() {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::ZeroPollInterval]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_route_configuration_json_and_toml() {
        let json = temp_file(
            "routes.json",
            r#"{
                "name": "json-routes",
                "virtual_hosts": [{
                    "name": "vh",
                    "domains": ["*"],
                    "routes": [{"match": {"prefix": "/"}, "route": {"cluster": "c"}}]
                }]
            }"#,
        );
        let update = load_route_configuration(&json, ApiVersion::V3).unwrap();
        assert_eq!(update.api_version(), ApiVersion::V3);
        assert_eq!(update.name(), "json-routes");

        let toml_path = temp_file(
            "routes.toml",
            r#"
            name = "toml-routes"

            [[virtual_hosts]]
            name = "vh"
            domains = ["*"]

            [[virtual_hosts.routes]]
            match = { prefix = "/" }
            route = { cluster = "c" }
            "#,
        );
        let update = load_route_configuration(&toml_path, ApiVersion::V2).unwrap();
        assert_eq!(update.api_version(), ApiVersion::V2);
        assert_eq!(update.name(), "toml-routes");
    }

    #[test]
    fn test_load_route_configuration_bad_json() {
        let path = temp_file("broken.json", "{ not json");
        let err = load_route_configuration(&path, ApiVersion::V3).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
