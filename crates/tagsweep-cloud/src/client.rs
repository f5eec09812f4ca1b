//! Coordinating client running every registered manager for a cluster

use crate::error::{CloudError, Result};
use crate::manager::ResourceManager;
use crate::report::Report;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Ordered set of resource managers sharing one cluster sweep
#[derive(Default)]
pub struct ClusterClient {
    managers: Vec<Box<dyn ResourceManager>>,
}

impl ClusterClient {
    pub fn new(managers: Vec<Box<dyn ResourceManager>>) -> Self {
        Self { managers }
    }

    /// Append a manager. Managers run in registration order.
    pub fn register(&mut self, manager: Box<dyn ResourceManager>) {
        self.managers.push(manager);
    }

    pub fn manager_names(&self) -> Vec<&str> {
        self.managers.iter().map(|m| m.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Run every manager once and collect their items.
    ///
    /// The first failing manager stops the run; managers after it are not
    /// invoked and no report is produced.
    pub async fn delete_resources_for_cluster(
        &mut self,
        cluster_id: &str,
        tags: &BTreeMap<String, String>,
        dry_run: bool,
    ) -> Result<Report> {
        let mut items = Vec::new();

        for manager in self.managers.iter_mut() {
            let name = manager.name().to_string();
            debug!(cluster_id, manager = %name, dry_run, "running manager");

            match manager
                .delete_resources_for_cluster(cluster_id, tags, dry_run)
                .await
            {
                Ok(found) => {
                    debug!(manager = %name, count = found.len(), "manager finished");
                    items.extend(found);
                }
                Err(e) => {
                    error!(manager = %name, "failed to run manager: {}", e);
                    return Err(CloudError::Manager {
                        manager: name,
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(Report::new(items))
    }
}
