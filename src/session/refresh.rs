use log::{ debug, info };
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use super::SessionClient;

/// Periodically reconciles the shared session with the server's history.
///
/// A tick is skipped when the client is busy (a user action or the previous
/// refresh still holds the lock), so fetches never overlap for one session.
pub fn spawn_history_refresh(
    client: Arc<Mutex<SessionClient>>,
    interval: Duration,
    shutdown: CancellationToken
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("History refresh stopped");
                    break;
                }
                _ = ticker.tick() => {
                    refresh_once(&client).await;
                }
            }
        }
    })
}

/// Runs one refresh unless the client is busy. Returns `false` when skipped.
pub async fn refresh_once(client: &Arc<Mutex<SessionClient>>) -> bool {
    let mut guard = match client.try_lock() {
        Ok(g) => g,
        Err(_) => {
            debug!("Session busy, skipping history refresh");
            return false;
        }
    };
    if !guard.session().is_active() {
        return true;
    }
    // Failures are already logged by the client; the next tick retries.
    let _ = guard.refresh_history().await;
    true
}
