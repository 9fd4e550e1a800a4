//! Registration Task
//!
//! Background task that registers the agent, retrying on failure.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::agent::ShellAgent;

/// Spawns a task that installs and activates `agent`.
///
/// A failed registration is not fatal: requests keep passing through to the
/// network while the task sleeps for `retry_interval_secs` and tries again.
/// The task ends once the agent controls pages.
///
/// # Example
/// ```ignore
/// let handle = spawn_registration_task(agent.clone(), 30);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_registration_task(agent: Arc<ShellAgent>, retry_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(retry_interval_secs);

    tokio::spawn(async move {
        let mut attempt: u32 = 1;

        loop {
            match agent.register().await {
                Ok(report) => {
                    info!(
                        "Agent registered on attempt {}: {} stale caches removed",
                        attempt,
                        report.deleted.len()
                    );
                    return;
                }
                Err(err) => {
                    warn!(
                        "Agent registration attempt {} failed, running without offline support: {}",
                        attempt, err
                    );
                }
            }

            tokio::time::sleep(interval).await;
            attempt += 1;
        }
    })
}
