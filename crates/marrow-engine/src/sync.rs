//! HTTP harvest sink that reports completed grows to the player backend.
//!
//! Each harvest becomes one `PATCH {base}/api/players/{id}/complete-grow`
//! with `{ "harvestedAmount": .., "potencyScore": .. }`. The request runs on
//! a spawned task so the tick loop never waits on the network. Failures
//! are logged and, once [`HttpHarvestSink::settle`] collects them, put on
//! the session feed as notices; the local result stays authoritative.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use marrow_core::{HarvestSink, Session, SinkError};
use marrow_types::{HarvestResult, PlayerId};
use rand::Rng;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Request body for the backend's complete-grow endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteGrowRequest {
    harvested_amount: u32,
    potency_score: u32,
}

impl From<&HarvestResult> for CompleteGrowRequest {
    fn from(result: &HarvestResult) -> Self {
        Self {
            harvested_amount: result.weight,
            potency_score: result.potency,
        }
    }
}

/// Sends harvests to the backend over HTTP, fire and forget.
pub struct HttpHarvestSink {
    client: reqwest::Client,
    base_url: String,
    pending: Mutex<Vec<JoinHandle<Result<(), String>>>>,
}

impl HttpHarvestSink {
    /// Create a sink posting to `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Sync {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            pending: Mutex::new(Vec::new()),
        })
    }

    fn complete_grow_url(&self, user_id: PlayerId) -> String {
        format!("{}/api/players/{user_id}/complete-grow", self.base_url)
    }

    /// Wait for in-flight requests so a clean shutdown does not cancel
    /// them. Returns the reason for every request that failed.
    pub async fn flush(&self) -> Vec<String> {
        let pending: Vec<_> = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let mut failures = Vec::new();
        for handle in pending {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => failures.push(reason),
                Err(e) => {
                    warn!(error = %e, "Harvest sync task did not finish");
                    failures.push(format!("sync task did not finish: {e}"));
                }
            }
        }
        failures
    }

    /// Flush, then note each failure on the session feed. Returns how many
    /// requests failed.
    pub async fn settle<R: Rng>(&self, session: &mut Session<R>) -> usize {
        let failures = self.flush().await;
        for reason in &failures {
            session.note_sync_failure(reason);
        }
        failures.len()
    }
}

async fn send_complete_grow(
    client: reqwest::Client,
    url: String,
    body: CompleteGrowRequest,
) -> Result<(), String> {
    let response = match client.patch(&url).json(&body).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "Harvest sync request failed");
            return Err(format!("request failed: {e}"));
        }
    };

    let status = response.status();
    if status.is_success() {
        info!(%url, weight = body.harvested_amount, "Harvest synced");
        return Ok(());
    }
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    warn!(%url, %status, body = %error_body, "Backend rejected harvest sync");
    Err(format!("backend returned {status}"))
}

impl HarvestSink for HttpHarvestSink {
    fn record_harvest(&self, user_id: PlayerId, result: &HarvestResult) -> Result<(), SinkError> {
        let handle = Handle::try_current().map_err(|e| SinkError::Unavailable {
            reason: format!("no async runtime for harvest sync: {e}"),
        })?;

        let url = self.complete_grow_url(user_id);
        let body = CompleteGrowRequest::from(result);
        debug!(%url, ?body, "Queueing harvest sync");

        let task = handle.spawn(send_complete_grow(self.client.clone(), url, body));
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use marrow_core::config::LivesConfig;
    use marrow_core::{
        IdleInput, LivesAccount, LivesLedger, MemoryStore, NoOpCallback, SessionControl,
        SessionRegistry, run_session,
    };
    use marrow_sim::EventChances;
    use marrow_types::{
        DefenseKind, DefenseProfile, SeedProfile, SessionInput, SessionOutcome,
        SoilProfile,
    };
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn calm_input() -> SessionInput {
        SessionInput {
            user_id: PlayerId::new(),
            seed: Some(SeedProfile {
                name: String::from("Calm Bones"),
                water_drain_rate: Some(0.0),
                nutrient_drain_rate: Some(0.0),
                image_ref: None,
            }),
            soil: Some(SoilProfile {
                name: String::from("Still Soil"),
                water_drain_rate: None,
                nutrient_drain_rate: None,
                image_ref: None,
            }),
            defense: Some(DefenseProfile {
                kind: DefenseKind::Vault,
                name: String::from("Vault"),
            }),
            feeding_schedule: None,
        }
    }

    fn result() -> HarvestResult {
        HarvestResult {
            strain_name: String::from("Marrow Kush"),
            weight: 123,
            potency: 45,
        }
    }

    #[test]
    fn request_body_uses_backend_field_names() {
        let body = serde_json::to_value(CompleteGrowRequest::from(&result())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "harvestedAmount": 123, "potencyScore": 45 })
        );
    }

    #[test]
    fn url_ignores_trailing_slash_on_base() {
        let sink = HttpHarvestSink::new("http://backend:5000/", Duration::from_secs(1)).unwrap();
        let user = PlayerId::new();
        assert_eq!(
            sink.complete_grow_url(user),
            format!("http://backend:5000/api/players/{user}/complete-grow")
        );
    }

    #[test]
    fn recording_outside_a_runtime_is_an_error() {
        let sink = HttpHarvestSink::new("http://backend:5000", Duration::from_secs(1)).unwrap();
        let err = sink.record_harvest(PlayerId::new(), &result()).unwrap_err();
        assert!(err.to_string().contains("no async runtime"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported_on_flush() {
        // Port 9 (discard) on localhost refuses connections.
        let sink = HttpHarvestSink::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        sink.record_harvest(PlayerId::new(), &result()).unwrap();
        let failures = sink.flush().await;
        assert_eq!(failures.len(), 1);
        assert!(failures.first().unwrap().contains("request failed"));
        assert!(sink.pending.lock().unwrap().is_empty());
        assert!(sink.flush().await.is_empty());
    }

    #[tokio::test]
    async fn failed_sync_leaves_a_notice_and_keeps_the_harvest() {
        let mut ledger = LivesLedger::new(MemoryStore::new(), LivesConfig::default());
        ledger.set_lives(1).unwrap();
        let mut session = Session::start(
            calm_input(),
            &mut ledger,
            &SessionRegistry::new(),
            EventChances::none(),
            SmallRng::seed_from_u64(3),
        )
        .unwrap();
        let sink = HttpHarvestSink::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();

        let report = run_session(
            &mut session,
            &mut ledger,
            &Arc::new(SessionControl::new(0)),
            &mut IdleInput,
            &sink,
            &mut NoOpCallback,
        )
        .await
        .unwrap();
        assert!(report.outcome.as_ref().and_then(SessionOutcome::harvest).is_some());

        assert_eq!(sink.settle(&mut session).await, 1);
        let notice = session.state().events.first().unwrap();
        assert_eq!(notice.title.as_deref(), Some("Sync Failed"));
    }
}
