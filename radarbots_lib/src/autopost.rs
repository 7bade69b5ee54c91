//! Recurring stats submission.

use crate::client::{Client, StatsPayload};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running autopost loop.
///
/// Dropping the handle detaches the loop; it keeps posting until the runtime shuts down.
pub struct AutopostHandle {
    payload: StatsPayload,
    interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl AutopostHandle {
    pub(crate) fn spawn(
        runtime: &Handle,
        client: Client,
        payload: StatsPayload,
        interval: Duration,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = runtime.spawn(async move {
            info!(
                "Starting stats autopost ({} guilds, {} shards) every {:?}",
                payload.guilds, payload.shards, interval
            );

            // First tick completes immediately.
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut listening = true;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        // Each submission runs on its own so a hung request never
                        // holds up the next tick.
                        let client = client.clone();
                        tokio::spawn(async move {
                            match client.submit(payload).await {
                                Ok(body) => debug!("Autopost accepted: {}", body),
                                Err(e) => warn!("Autopost submission failed: {}", e),
                            }
                        });
                    }
                    changed = shutdown_rx.changed(), if listening => match changed {
                        Ok(()) if *shutdown_rx.borrow() => {
                            info!("Stats autopost shutting down");
                            break;
                        }
                        Ok(()) => {}
                        // Handle dropped; the loop is detached.
                        Err(_) => listening = false,
                    },
                }
            }
        });

        Self {
            payload,
            interval,
            shutdown_tx,
            task,
        }
    }

    /// Counts sent on every tick.
    pub fn payload(&self) -> StatsPayload {
        self.payload
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop scheduling new submissions and wait for the loop to exit.
    /// Submissions already in flight run to completion.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }

    /// Cancel the loop without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::{client_with, MockTransport};
    use reqwest::Method;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::time::sleep;

    fn ok() -> MockTransport {
        MockTransport::json(200, serde_json::json!({"ok": true}))
    }

    #[tokio::test(start_paused = true)]
    async fn posts_immediately_then_every_interval() {
        let (client, requests) = client_with(ok());
        let handle = client.autopost_stats(Some(10), Some(2)).unwrap();
        assert_eq!(handle.interval(), Duration::from_secs(120));

        sleep(Duration::from_secs(1)).await;
        assert_eq!(requests.lock().unwrap().len(), 1);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(requests.lock().unwrap().len(), 1);

        sleep(Duration::from_secs(60)).await;
        {
            let requests = requests.lock().unwrap();
            assert_eq!(requests.len(), 2);
            for req in requests.iter() {
                assert_eq!(req.method, Method::POST);
                assert_eq!(req.url.path(), "/api/bot/1234/stats");
                let body: Value = serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
                assert_eq!(body, serde_json::json!({"guilds": 10, "shards": 2}));
            }
        }

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_loop() {
        let (client, requests) = client_with(ok());
        let handle = client.autopost_stats(Some(3), None).unwrap();
        sleep(Duration::from_secs(1)).await;
        assert!(handle.is_running());
        handle.stop().await;

        sleep(Duration::from_secs(600)).await;
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abort_ends_the_loop() {
        let (client, requests) = client_with(ok());
        let handle = client.autopost_stats(Some(3), None).unwrap();
        sleep(Duration::from_secs(1)).await;
        handle.abort();

        sleep(Duration::from_secs(600)).await;
        assert!(!handle.is_running());
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_keeps_posting() {
        let (client, requests) = client_with(ok());
        drop(client.autopost_stats(Some(3), None).unwrap());

        sleep(Duration::from_secs(241)).await;
        assert_eq!(requests.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_loop() {
        let (client, requests) = client_with(MockTransport::json(
            403,
            serde_json::json!({"error": "bad token"}),
        ));
        let handle = client.autopost_stats(Some(3), None).unwrap();

        sleep(Duration::from_secs(121)).await;
        assert_eq!(requests.lock().unwrap().len(), 2);
        assert!(handle.is_running());
        handle.stop().await;
    }

    #[tokio::test]
    async fn invalid_counts_spawn_nothing() {
        let (client, requests) = client_with(ok());
        assert!(client.autopost_stats(None, Some(1)).is_err());
        assert!(client.autopost_stats(Some(1), Some(0)).is_err());
        tokio::task::yield_now().await;
        assert!(requests.lock().unwrap().is_empty());
    }
}
