use std::time::Duration;

use reqwest::Client;

use crate::config::SyncSettings;
use crate::db::Database;
use crate::error::AppError;
use crate::sync::SyncEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

/// Pure edge detection over consecutive probe results.
pub fn transition(previous: LinkState, observed: LinkState) -> Option<Transition> {
    match (previous, observed) {
        (LinkState::Offline, LinkState::Online) => Some(Transition::CameOnline),
        (LinkState::Online, LinkState::Offline) => Some(Transition::WentOffline),
        _ => None,
    }
}

/// Polls a probe URL and fires an unattended sync run on every
/// Offline -> Online edge. Going offline only changes the reported state;
/// it never triggers anything.
pub struct ConnectivityMonitor {
    probe_url: String,
    interval: Duration,
    client: Client,
}

impl ConnectivityMonitor {
    pub fn new(probe_url: String, interval_secs: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent("lead-courier")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            probe_url,
            interval: Duration::from_secs(interval_secs.max(1)),
            client,
        })
    }

    /// Any HTTP reply proves the link is up, even an error status; only a
    /// transport failure counts as offline.
    pub async fn probe(&self) -> LinkState {
        match self.client.get(&self.probe_url).send().await {
            Ok(_) => LinkState::Online,
            Err(e) => {
                tracing::debug!("Probe failed: {e}");
                LinkState::Offline
            }
        }
    }

    /// Runs until the process is terminated. Starts Offline, so a reachable
    /// endpoint triggers a first sync on the initial tick.
    pub async fn watch(&self, db: &Database, engine: &SyncEngine) -> Result<(), AppError> {
        tracing::info!(
            probe = %self.probe_url,
            interval_secs = self.interval.as_secs(),
            "Watching connectivity"
        );
        let mut state = LinkState::Offline;
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            ticker.tick().await;
            let observed = self.probe().await;
            match transition(state, observed) {
                Some(Transition::CameOnline) => {
                    tracing::info!("Connection restored, starting background sync");
                    self.silent_sync(db, engine).await;
                }
                Some(Transition::WentOffline) => {
                    tracing::info!("Connection lost, captures stay local");
                }
                None => {}
            }
            state = observed;
        }
    }

    /// Unattended run: log-only reporting, rate limit still enforced.
    async fn silent_sync(&self, db: &Database, engine: &SyncEngine) {
        let settings = match SyncSettings::load(db) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("Background sync skipped, settings unreadable: {e}");
                return;
            }
        };

        match engine.run(db, &settings, false).await {
            Ok(report) => tracing::info!(
                run = %report.run_id,
                sent = report.sent,
                failed = report.failed,
                deferred = report.deferred,
                "Background sync finished"
            ),
            Err(AppError::RateLimited { minutes_remaining }) => {
                tracing::warn!(minutes_remaining, "Background sync rate limited");
            }
            Err(AppError::SyncInProgress) => {
                tracing::debug!("Background sync skipped, a run is already active");
            }
            Err(e) => tracing::error!("Background sync failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_fire_only_on_change() {
        assert_eq!(
            transition(LinkState::Offline, LinkState::Online),
            Some(Transition::CameOnline)
        );
        assert_eq!(
            transition(LinkState::Online, LinkState::Offline),
            Some(Transition::WentOffline)
        );
        assert_eq!(transition(LinkState::Online, LinkState::Online), None);
        assert_eq!(transition(LinkState::Offline, LinkState::Offline), None);
    }

    #[test]
    fn test_interval_floor() {
        let monitor = ConnectivityMonitor::new("http://localhost:1".into(), 0).unwrap();
        assert_eq!(monitor.interval, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_unreachable_probe_is_offline() {
        // Port 9 (discard) is closed on loopback, so this fails fast.
        let monitor = ConnectivityMonitor::new("http://127.0.0.1:9/".into(), 5).unwrap();
        assert_eq!(monitor.probe().await, LinkState::Offline);
    }
}
