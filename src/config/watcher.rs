//! Route configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_route_configuration;
use crate::xds::{ApiVersion, RouteConfigurationUpdate};

/// Monitors a route configuration file and emits a fresh update on each change.
pub struct RouteConfigWatcher {
    path: PathBuf,
    api_version: ApiVersion,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<RouteConfigurationUpdate>,
}

impl RouteConfigWatcher {
    /// Create a new RouteConfigWatcher.
    ///
    /// Returns the watcher and a receiver for route configuration updates.
    pub fn new(
        path: &Path,
        api_version: ApiVersion,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<RouteConfigurationUpdate>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                api_version,
                poll_interval,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// Watching stops when the returned watcher is dropped. A file that fails
    /// to load is logged and produces no update.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let api_version = self.api_version;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = %path.display(), "Route configuration change detected, reloading");
                        match load_route_configuration(&path, api_version) {
                            Ok(update) => {
                                let _ = tx.send(update);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload route configuration, keeping current table"
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, %api_version, "Route configuration watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_watcher_emits_update_on_change() {
        let dir = std::env::temp_dir().join(format!("xds-router-watch-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("routes.json");
        fs::write(&path, r#"{"name": "first"}"#).unwrap();

        let (watcher, mut rx) =
            RouteConfigWatcher::new(&path, ApiVersion::V3, Duration::from_millis(100));
        let _guard = watcher.run().unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        fs::write(&path, r#"{"name": "second"}"#).unwrap();

        let update = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Some(update) if update.name() == "second" => return Some(update),
                    Some(_) => continue,
                    None => return None,
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(update.map(|u| u.api_version()), Some(ApiVersion::V3));
    }
}
