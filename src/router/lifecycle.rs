// Install / activate lifecycle
// Author: kelexine (https://github.com/kelexine)

use super::CacheRouter;
use crate::cache::{CacheStorage, RequestKey};
use crate::error::{Result, RouterError};
use crate::network::{Fetcher, ResourceRequest};
use serde::Serialize;
use tracing::{debug, error, info};

/// Lifecycle states of the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Activated,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        }
    }

    /// Requests are intercepted only once activation has claimed clients.
    pub fn can_intercept(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }
}

/// What the install step achieved.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub precached: usize,
    pub error: Option<String>,
}

impl CacheRouter {
    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    fn set_state(&self, next: WorkerState) {
        let mut state = self.state.write();
        if *state != next {
            debug!("Worker state {} -> {}", state.as_str(), next.as_str());
            *state = next;
        }
    }

    /// Leave `installing` without waiting for older instances to go away.
    pub fn skip_waiting(&self) {
        self.set_state(WorkerState::Installed);
    }

    /// Pre-cache the critical resources into the static partition.
    ///
    /// All-or-nothing: if any fetch fails or answers non-2xx, nothing is
    /// written and the failure is logged. The router ends up `installed`
    /// either way.
    pub async fn install(&self) -> InstallReport {
        self.set_state(WorkerState::Installing);
        crate::metrics::record_event("install");
        info!("Caching {} critical resources...", self.config.critical_resources.len());

        let report = match self.precache().await {
            Ok(precached) => {
                info!("Critical resources cached ({})", precached);
                InstallReport {
                    precached,
                    error: None,
                }
            }
            Err(e) => {
                error!("Failed to cache critical resources: {}", e);
                InstallReport {
                    precached: 0,
                    error: Some(e.to_string()),
                }
            }
        };

        self.skip_waiting();
        report
    }

    async fn precache(&self) -> Result<usize> {
        let partition = &self.config.static_cache;
        self.storage.open(partition).await;

        let fetches = self.config.critical_urls()?.into_iter().map(|url| async move {
            let request = ResourceRequest::from_url(url);
            let response = self.fetcher.fetch(&request).await?;
            if !response.is_ok() {
                return Err(RouterError::Install(format!(
                    "{} answered {}",
                    request.url, response.status
                )));
            }
            Ok((RequestKey::from(&request), response))
        });

        let entries = futures::future::try_join_all(fetches).await?;
        let count = entries.len();
        self.storage.put_all(partition, entries).await?;
        crate::metrics::update_cache_entries(partition, self.storage.keys(partition).await.len());
        Ok(count)
    }

    /// Delete every partition not named as one of the two current partitions,
    /// then start intercepting. Returns the deleted names.
    pub async fn activate(&self) -> Vec<String> {
        self.set_state(WorkerState::Activating);
        crate::metrics::record_event("activate");

        let current = [&self.config.static_cache, &self.config.dynamic_cache];
        let stale: Vec<String> = self
            .storage
            .partitions()
            .await
            .into_iter()
            .filter(|name| !current.contains(&name))
            .collect();

        futures::future::join_all(stale.iter().map(|name| {
            info!("Deleting old cache: {}", name);
            self.storage.delete_partition(name)
        }))
        .await;

        // claim clients
        self.set_state(WorkerState::Activated);
        info!("Cache router activated");
        stale
    }
}
