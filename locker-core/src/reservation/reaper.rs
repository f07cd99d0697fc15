use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::time::interval;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::ports::{AssignmentsRepository, LockStore};

const HOLD_KEY_PATTERN: &str = "locker:hold:*";

#[derive(Debug, Clone, Copy)]
pub struct ReaperConfig {
    pub sweep_interval: Duration,
}

/// Converges expired `hold` rows to `expired` through two independent paths
/// so a gap in one doesn't leave a locker stuck: a Redis keyspace-notification
/// subscription reacts as soon as a hold TTL fires, and a periodic sweep
/// catches anything missed (subscription drop, notifications disabled).
pub struct ExpiryReaper {
    assignments: Arc<dyn AssignmentsRepository>,
    lock_store: Arc<dyn LockStore>,
    config: ReaperConfig,
    shutdown_rx: Arc<Mutex<mpsc::Receiver<()>>>,
}

pub struct ReaperHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl ReaperHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}

impl ExpiryReaper {
    pub fn spawn(
        assignments: Arc<dyn AssignmentsRepository>,
        lock_store: Arc<dyn LockStore>,
        config: ReaperConfig,
    ) -> ReaperHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let reaper = Arc::new(Self {
            assignments,
            lock_store,
            config,
            shutdown_rx: Arc::new(Mutex::new(shutdown_rx)),
        });

        let task = tokio::spawn(async move { reaper.run().await });
        ReaperHandle { shutdown_tx, task }
    }

    async fn run(self: Arc<Self>) {
        info!("starting expiry reaper");

        let subscriber = self.clone();
        let subscribe_task = tokio::spawn(async move {
            subscriber.watch_expirations().await;
        });

        let sweeper = self.clone();
        let sweep_task = tokio::spawn(async move {
            sweeper.periodic_sweep().await;
        });

        {
            let mut shutdown_rx = self.shutdown_rx.lock().await;
            let _ = shutdown_rx.recv().await;
        }

        info!("shutting down expiry reaper");
        subscribe_task.abort();
        sweep_task.abort();
    }

    /// React to Redis `__keyevent@0__:expired` notifications as they arrive.
    /// Best-effort: a dropped subscription just leaves expiry to the sweep.
    async fn watch_expirations(&self) {
        let mut stream = match self.lock_store.subscribe_key_expirations(HOLD_KEY_PATTERN).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = ?err, "key expiration subscription unavailable, relying on periodic sweep");
                return;
            }
        };

        while let Some(event) = stream.next().await {
            if let Some(locker_id) = parse_hold_key(&event.key) {
                match self.assignments.expire_hold(locker_id).await {
                    Ok(true) => debug!(locker_id, "expired hold via keyspace notification"),
                    Ok(false) => {}
                    Err(err) => error!(locker_id, error = ?err, "failed to expire hold"),
                }
            }
        }
    }

    /// Catch anything the event-driven path missed: any row still in `hold`
    /// whose Redis key is already gone is stale and gets expired.
    async fn periodic_sweep(&self) {
        let mut ticker = interval(self.config.sweep_interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.sweep_once().await {
                error!(error = ?err, "expiry sweep failed");
            }
        }
    }

    async fn sweep_once(&self) -> crate::error::Result<()> {
        let holds = self.assignments.list_active_holds().await?;
        for hold in holds {
            let key = super::engine::hold_key(hold.locker_id);
            if !self.lock_store.exists(&key).await? {
                match self.assignments.expire_hold(hold.locker_id).await {
                    Ok(true) => debug!(locker_id = hold.locker_id, "expired hold via periodic sweep"),
                    Ok(false) => {}
                    Err(err) => error!(locker_id = hold.locker_id, error = ?err, "failed to expire hold"),
                }
            }
        }
        Ok(())
    }
}

fn parse_hold_key(key: &str) -> Option<i32> {
    key.rsplit(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_locker_id_out_of_a_hold_key() {
        assert_eq!(parse_hold_key("locker:hold:42"), Some(42));
        assert_eq!(parse_hold_key("locker:hold:not-a-number"), None);
    }
}
