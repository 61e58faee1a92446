pub mod extract;
pub mod ratelimit;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use reqwest::Client;
use uuid::Uuid;

use crate::config::{INGEST_URL, SyncSettings};
use crate::db::Database;
use crate::delivery::{DeliveryRequest, DeliveryRoute, RouteReply};
use crate::error::AppError;
use crate::mapper;
use self::ratelimit::RateLimitWindow;

/// Outcome of one route attempt for one lead. Success means HTTP 2xx;
/// anything else falls through to the next route.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Status(u16),
    Transport(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Status(status) if (200..300).contains(status))
    }
}

/// Diagnostic entry for one attempted route. Advisory only: nothing in the
/// run's control flow depends on it.
#[derive(Debug, Clone)]
pub struct RouteAttempt {
    pub route: String,
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u128,
}

/// Per-lead delivery trail within a run.
#[derive(Debug, Clone)]
pub struct RecordTrail {
    pub lead_id: i64,
    pub attempts: Vec<RouteAttempt>,
    /// Set when the lead was delivered and marked synced.
    pub remote_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub attempted: usize,
    pub sent: u32,
    pub failed: u32,
    /// Pending leads pushed past the rate allowance into a future run.
    pub deferred: usize,
    pub trails: Vec<RecordTrail>,
}

impl RunReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            attempted: 0,
            sent: 0,
            failed: 0,
            deferred: 0,
            trails: Vec::new(),
        }
    }
}

/// Batch sender over the pending queue. One engine instance per process;
/// the busy flag rejects a run started while another is active, so runs
/// never interleave.
pub struct SyncEngine {
    routes: Vec<Arc<dyn DeliveryRoute>>,
    client: Client,
    busy: AtomicBool,
}

impl SyncEngine {
    pub fn new(routes: Vec<Arc<dyn DeliveryRoute>>) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent("lead-courier")
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            routes,
            client,
            busy: AtomicBool::new(false),
        })
    }

    /// Runs one sync pass over the pending queue. `mass` bypasses the rate
    /// cap check (successes still count toward the window). Engine-level
    /// failures abort with an error; per-lead delivery failures do not.
    pub async fn run(
        &self,
        db: &Database,
        settings: &SyncSettings,
        mass: bool,
    ) -> Result<RunReport, AppError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::SyncInProgress);
        }
        let result = self.run_locked(db, settings, mass).await;
        self.busy.store(false, Ordering::SeqCst);
        result
    }

    async fn run_locked(
        &self,
        db: &Database,
        settings: &SyncSettings,
        mass: bool,
    ) -> Result<RunReport, AppError> {
        let run_id = Uuid::new_v4();
        let mut report = RunReport::new(run_id);

        tracing::debug!(%run_id, "Sync run: checking");
        let api_key = settings.require_api_key()?.to_string();

        let mut pending = db.list_pending()?;
        if pending.is_empty() {
            tracing::debug!(%run_id, "Sync run: completed, queue empty");
            return Ok(report);
        }

        if !mass {
            let now = Utc::now();
            let window = RateLimitWindow::load(db)?
                .map(|w| w.refreshed(now))
                .unwrap_or_else(|| RateLimitWindow::fresh(now));
            // Persist the reset so the stored state matches what this run saw.
            window.store(db)?;

            if window.is_exhausted() {
                let minutes_remaining = window.minutes_until_reset(now);
                tracing::warn!(%run_id, minutes_remaining, "Sync run: rate limited");
                return Err(AppError::RateLimited { minutes_remaining });
            }

            let allowance = window.remaining() as usize;
            if pending.len() > allowance {
                report.deferred = pending.len() - allowance;
                pending.truncate(allowance);
                tracing::info!(
                    %run_id,
                    deferred = report.deferred,
                    "Batch truncated to the remaining rate allowance"
                );
            }
        }

        let catalog = db.program_catalog()?;
        tracing::debug!(%run_id, batch = pending.len(), "Sync run: sending");

        for lead in &pending {
            report.attempted += 1;
            let payload = mapper::map_lead(lead, settings, &catalog);
            let body = serde_json::to_value(&payload)?;
            let request_json = serde_json::to_string(&body)?;

            let request = DeliveryRequest {
                target_url: INGEST_URL,
                api_key: &api_key,
                environment: &settings.environment,
                body: &body,
            };

            let (trail, success) = self.deliver(lead.id, &request).await;

            match success {
                Some(reply) => {
                    let parsed: serde_json::Value =
                        serde_json::from_str(&reply.body).unwrap_or(serde_json::Value::Null);
                    let remote_id = extract::extract_remote_id(&parsed);
                    db.mark_synced(lead.id, &remote_id, &request_json, &reply.body)?;
                    report.sent += 1;
                    report.trails.push(RecordTrail {
                        remote_id: Some(remote_id),
                        ..trail
                    });
                }
                None => {
                    tracing::warn!(lead = lead.id, "All delivery paths failed, lead stays pending");
                    report.failed += 1;
                    report.trails.push(trail);
                }
            }
        }

        // Window accounting happens for mass runs too: the override only
        // bypasses the cap check.
        if report.sent > 0 {
            let now = Utc::now();
            let mut window = RateLimitWindow::load(db)?
                .map(|w| w.refreshed(now))
                .unwrap_or_else(|| RateLimitWindow::fresh(now));
            window.count += report.sent;
            window.store(db)?;
        }

        tracing::debug!(
            %run_id,
            sent = report.sent,
            failed = report.failed,
            "Sync run: completed"
        );
        Ok(report)
    }

    /// Walks the route list for one lead until a 2xx reply or exhaustion.
    async fn deliver(
        &self,
        lead_id: i64,
        request: &DeliveryRequest<'_>,
    ) -> (RecordTrail, Option<RouteReply>) {
        let mut trail = RecordTrail {
            lead_id,
            attempts: Vec::new(),
            remote_id: None,
        };

        for route in &self.routes {
            tracing::debug!(lead = lead_id, route = route.name(), "Trying delivery path");
            let started = Instant::now();
            let (outcome, reply) = match route.deliver(&self.client, request).await {
                Ok(reply) => (AttemptOutcome::Status(reply.status), Some(reply)),
                Err(e) => (AttemptOutcome::Transport(e.to_string()), None),
            };
            let success = outcome.is_success();
            trail.attempts.push(RouteAttempt {
                route: route.name().to_string(),
                outcome,
                elapsed_ms: started.elapsed().as_millis(),
            });

            if success {
                return (trail, reply);
            }
        }

        (trail, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use serde_json::json;

    use crate::db::models::NewLead;

    struct FixedRoute {
        name: &'static str,
        status: u16,
        body: String,
    }

    #[async_trait]
    impl DeliveryRoute for FixedRoute {
        fn name(&self) -> &str {
            self.name
        }

        async fn deliver(
            &self,
            _client: &Client,
            _request: &DeliveryRequest<'_>,
        ) -> anyhow::Result<RouteReply> {
            Ok(RouteReply {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    struct DeadRoute {
        name: &'static str,
    }

    #[async_trait]
    impl DeliveryRoute for DeadRoute {
        fn name(&self) -> &str {
            self.name
        }

        async fn deliver(
            &self,
            _client: &Client,
            _request: &DeliveryRequest<'_>,
        ) -> anyhow::Result<RouteReply> {
            anyhow::bail!("connection refused")
        }
    }

    fn ok_route(body: serde_json::Value) -> Arc<dyn DeliveryRoute> {
        Arc::new(FixedRoute {
            name: "ok",
            status: 200,
            body: body.to_string(),
        })
    }

    fn engine(routes: Vec<Arc<dyn DeliveryRoute>>) -> SyncEngine {
        SyncEngine::new(routes).unwrap()
    }

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn settings(db: &Database) -> SyncSettings {
        db.set_setting("api_key", "secret").unwrap();
        SyncSettings::load(db).unwrap()
    }

    fn queue_lead(db: &Database) -> i64 {
        let lead = NewLead {
            first_name: "Lucía".into(),
            last_name: "Gómez".into(),
            email: "lucia@example.com".into(),
            phone_prefix: "+34".into(),
            phone: "600123456".into(),
            age: Some("21".into()),
            country: "ES".into(),
            province: Some("Madrid".into()),
            region: None,
            program: "Grado en Odontología".into(),
            study_level: Some("Grado".into()),
            consent_given: true,
            consent_text: "Acepto".into(),
            created_at: "2026-03-14T10:30:00Z".into(),
        };
        db.insert_lead(&lead).unwrap()
    }

    #[tokio::test]
    async fn test_empty_queue_completes_with_zero_sends() {
        let db = test_db();
        let settings = settings(&db);
        let engine = engine(vec![ok_route(json!({"id": "x"}))]);

        let report = engine.run(&db, &settings, false).await.unwrap();
        assert_eq!(report.attempted, 0);
        assert_eq!(report.sent, 0);
    }

    #[tokio::test]
    async fn test_missing_api_key_aborts_before_delivery() {
        let db = test_db();
        let settings = SyncSettings::load(&db).unwrap();
        queue_lead(&db);
        let engine = engine(vec![ok_route(json!({"id": "x"}))]);

        let err = engine.run(&db, &settings, false).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(_)));
        assert_eq!(db.list_pending().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_path_fallback_after_server_error() {
        let db = test_db();
        let settings = settings(&db);
        let id = queue_lead(&db);

        let engine = engine(vec![
            Arc::new(FixedRoute {
                name: "direct",
                status: 500,
                body: "server error".into(),
            }),
            ok_route(json!({"id": "42"})),
        ]);

        let report = engine.run(&db, &settings, false).await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 0);

        let trail = &report.trails[0];
        assert_eq!(trail.attempts.len(), 2);
        assert!(!trail.attempts[0].outcome.is_success());
        assert!(trail.attempts[1].outcome.is_success());
        assert_eq!(trail.remote_id.as_deref(), Some("42"));

        let lead = db.get_lead(id).unwrap().unwrap();
        assert!(lead.synced);
        assert_eq!(lead.remote_id.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_exhausted_paths_leave_lead_pending() {
        let db = test_db();
        let settings = settings(&db);
        let id = queue_lead(&db);

        let engine = engine(vec![
            Arc::new(DeadRoute { name: "direct" }),
            Arc::new(DeadRoute { name: "relay" }),
        ]);

        let report = engine.run(&db, &settings, false).await.unwrap();
        assert_eq!(report.sent, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(report.trails[0].attempts.len(), 2);
        assert!(matches!(
            report.trails[0].attempts[0].outcome,
            AttemptOutcome::Transport(_)
        ));

        let lead = db.get_lead(id).unwrap().unwrap();
        assert!(!lead.synced);
    }

    #[tokio::test]
    async fn test_failed_lead_does_not_abort_run() {
        let db = test_db();
        let settings = settings(&db);
        queue_lead(&db);
        queue_lead(&db);

        // A 404 on every route fails each lead individually, yet both leads
        // are attempted.
        let engine = engine(vec![Arc::new(FixedRoute {
            name: "direct",
            status: 404,
            body: "not found".into(),
        })]);

        let report = engine.run(&db, &settings, false).await.unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_rate_limited_run_sends_nothing() {
        let db = test_db();
        let settings = settings(&db);
        queue_lead(&db);

        RateLimitWindow {
            started_at: Utc::now(),
            count: ratelimit::WINDOW_CAP,
        }
        .store(&db)
        .unwrap();

        let engine = engine(vec![ok_route(json!({"id": "x"}))]);
        let err = engine.run(&db, &settings, false).await.unwrap_err();
        match err {
            AppError::RateLimited { minutes_remaining } => {
                assert!(minutes_remaining > 0 && minutes_remaining <= 30);
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
        assert_eq!(db.list_pending().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_expired_window_resets_before_run() {
        let db = test_db();
        let settings = settings(&db);
        queue_lead(&db);

        RateLimitWindow {
            started_at: Utc::now() - Duration::minutes(31),
            count: ratelimit::WINDOW_CAP,
        }
        .store(&db)
        .unwrap();

        let engine = engine(vec![ok_route(json!({"id": "9"}))]);
        let report = engine.run(&db, &settings, false).await.unwrap();
        assert_eq!(report.sent, 1);

        let window = RateLimitWindow::load(&db).unwrap().unwrap();
        assert_eq!(window.count, 1);
    }

    #[tokio::test]
    async fn test_batch_truncated_to_allowance_oldest_first() {
        let db = test_db();
        let settings = settings(&db);
        let first = queue_lead(&db);
        let second = queue_lead(&db);
        let third = queue_lead(&db);

        RateLimitWindow {
            started_at: Utc::now(),
            count: ratelimit::WINDOW_CAP - 2,
        }
        .store(&db)
        .unwrap();

        let engine = engine(vec![ok_route(json!({"id": "x"}))]);
        let report = engine.run(&db, &settings, false).await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.sent, 2);
        assert_eq!(report.deferred, 1);

        assert!(db.get_lead(first).unwrap().unwrap().synced);
        assert!(db.get_lead(second).unwrap().unwrap().synced);
        assert!(!db.get_lead(third).unwrap().unwrap().synced);

        let window = RateLimitWindow::load(&db).unwrap().unwrap();
        assert_eq!(window.count, ratelimit::WINDOW_CAP);
    }

    #[tokio::test]
    async fn test_mass_run_bypasses_cap_but_still_counts() {
        let db = test_db();
        let settings = settings(&db);
        queue_lead(&db);

        let window_start = Utc::now();
        RateLimitWindow {
            started_at: window_start,
            count: ratelimit::WINDOW_CAP,
        }
        .store(&db)
        .unwrap();

        let engine = engine(vec![ok_route(json!({"id": "m1"}))]);
        let report = engine.run(&db, &settings, true).await.unwrap();
        assert_eq!(report.sent, 1);

        let window = RateLimitWindow::load(&db).unwrap().unwrap();
        assert_eq!(window.count, ratelimit::WINDOW_CAP + 1);
    }

    #[tokio::test]
    async fn test_busy_engine_rejects_second_run() {
        let db = test_db();
        let settings = settings(&db);
        let engine = engine(vec![ok_route(json!({"id": "x"}))]);

        engine.busy.store(true, Ordering::SeqCst);
        let err = engine.run(&db, &settings, false).await.unwrap_err();
        assert!(matches!(err, AppError::SyncInProgress));

        // A finished run releases the guard.
        engine.busy.store(false, Ordering::SeqCst);
        assert!(engine.run(&db, &settings, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_json_success_body_syncs_with_placeholder() {
        let db = test_db();
        let settings = settings(&db);
        let id = queue_lead(&db);

        let engine = engine(vec![Arc::new(FixedRoute {
            name: "direct",
            status: 200,
            body: "accepted, thanks".into(),
        })]);

        let report = engine.run(&db, &settings, false).await.unwrap();
        assert_eq!(report.sent, 1);
        let lead = db.get_lead(id).unwrap().unwrap();
        assert_eq!(lead.remote_id.as_deref(), Some(extract::PLACEHOLDER_ID));
    }

    #[tokio::test]
    async fn test_diagnostics_recorded_on_success() {
        let db = test_db();
        let settings = settings(&db);
        let id = queue_lead(&db);

        let engine = engine(vec![ok_route(json!({"lead_id": "L-1"}))]);
        engine.run(&db, &settings, false).await.unwrap();

        let lead = db.get_lead(id).unwrap().unwrap();
        let request: serde_json::Value =
            serde_json::from_str(lead.last_request.as_deref().unwrap()).unwrap();
        assert_eq!(request["lead_phoneNumber"], "34600123456");
        assert_eq!(
            lead.last_response.as_deref().unwrap(),
            json!({"lead_id": "L-1"}).to_string()
        );
    }
}
