//! Common test utilities for the dashboard integration tests

#![allow(dead_code, unreachable_pub, clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use vysyamala_core::CurrentUser;
use vysyamala_dashboard::{DashboardError, DashboardResult, DashboardTransport, QueryParams};

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging once per test binary
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// A privileged operator
pub fn admin() -> CurrentUser {
    CurrentUser::new("1", "7")
}

/// An ordinary staff member
pub fn staff() -> CurrentUser {
    CurrentUser::new("15", "3")
}

enum Scripted {
    Ready(DashboardResult<Value>),
    Gated(oneshot::Receiver<DashboardResult<Value>>),
}

/// In-memory transport answering requests from a script
///
/// Responses are consumed in request order. A gated response blocks its
/// request until the test releases it through the returned sender.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<(String, QueryParams)>>,
    export: Mutex<Bytes>,
}

impl ScriptedTransport {
    /// Empty script
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer the next request immediately with `body`
    pub fn push_json(&self, body: Value) {
        self.script.lock().push_back(Scripted::Ready(Ok(body)));
    }

    /// Fail the next request
    pub fn push_error(&self, error: DashboardError) {
        self.script.lock().push_back(Scripted::Ready(Err(error)));
    }

    /// Hold the next request until the sender fires
    pub fn push_gated(&self) -> oneshot::Sender<DashboardResult<Value>> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().push_back(Scripted::Gated(rx));
        tx
    }

    /// Body returned by every download
    pub fn set_export(&self, bytes: &'static [u8]) {
        *self.export.lock() = Bytes::from_static(bytes);
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<(String, QueryParams)> {
        self.requests.lock().clone()
    }

    /// Number of requests seen so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Query of the `index`-th request
    pub fn query(&self, index: usize) -> QueryParams {
        self.requests.lock().get(index).map(|(_, q)| q.clone()).expect("request")
    }

    /// Yield until `count` requests were issued
    pub async fn wait_for_requests(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.request_count() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("requests were not issued in time");
    }
}

#[async_trait]
impl DashboardTransport for ScriptedTransport {
    async fn get_json(&self, path: &str, query: &QueryParams) -> DashboardResult<Value> {
        self.requests.lock().push((path.to_string(), query.clone()));
        let next = self.script.lock().pop_front();
        match next {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(DashboardError::invalid_request("gate dropped"))),
            None => Err(DashboardError::invalid_request("no scripted response")),
        }
    }

    async fn get_bytes(&self, path: &str, query: &QueryParams) -> DashboardResult<Bytes> {
        self.requests.lock().push((path.to_string(), query.clone()));
        Ok(self.export.lock().clone())
    }
}

/// Marriage response with one row per `(id, name)`
pub fn marriage_body(total: u64, rows: &[(&str, &str)]) -> Value {
    let data: Vec<Value> = rows
        .iter()
        .map(|(id, name)| json!({"ProfileId": id, "Profile_name": name}))
        .collect();
    json!({
        "status": true,
        "total_profiles": total,
        "plan_counts": {"premium": {"total": 4, "tn": 3, "non-tn": 1}},
        "data": data,
    })
}

/// Daily Work response with one row per id
pub fn daily_work_body(ids: &[&str]) -> Value {
    let data: Vec<Value> = ids
        .iter()
        .map(|id| json!({"ProfileId": id, "Profile_name": format!("Name {id}")}))
        .collect();
    json!({
        "status": true,
        "counts_by_type": {"all": {"todays_work": ids.len()}},
        "filtered_count": ids.len(),
        "data": data,
    })
}

/// Advance search response
pub fn search_body(total: u64, ids: &[&str]) -> Value {
    let profiles: Vec<Value> = ids
        .iter()
        .map(|id| json!({"profile_id": id, "profile_name": format!("Name {id}")}))
        .collect();
    json!({"Status": 1, "total_count": total, "profiles": profiles})
}
