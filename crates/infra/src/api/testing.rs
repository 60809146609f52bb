//! Scripted inner client for decorator tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_core::{ApiRequest, ApiResponse, EntitySerializer, HttpApiClient, HttpTransport};
use bridgekit_domain::RemoteApiError;
use parking_lot::Mutex;
use serde_json::Value;

pub(crate) const SCRIPTED_SERVICE: &str = "Scripted API";

type CallResult = Result<ApiResponse, RemoteApiError>;

/// Plays back queued results, then repeats a fallback forever.
pub(crate) struct ScriptedClient {
    queued: Mutex<VecDeque<CallResult>>,
    fallback: CallResult,
    calls: AtomicUsize,
    serializer_swaps: AtomicUsize,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedClient {
    pub(crate) fn always(result: CallResult) -> Arc<Self> {
        Self::sequence(Vec::new(), result)
    }

    pub(crate) fn sequence(queued: Vec<CallResult>, fallback: CallResult) -> Arc<Self> {
        Arc::new(Self {
            queued: Mutex::new(queued.into()),
            fallback,
            calls: AtomicUsize::new(0),
            serializer_swaps: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn ok() -> CallResult {
        Ok(ApiResponse::new(200, Value::Null))
    }

    pub(crate) fn status(code: u16) -> CallResult {
        Err(RemoteApiError::from_status(SCRIPTED_SERVICE, code, format!("status {code}")))
    }

    pub(crate) fn connection_failure() -> CallResult {
        Err(RemoteApiError::connection(SCRIPTED_SERVICE, "connection refused"))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn serializer_swaps(&self) -> usize {
        self.serializer_swaps.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpApiClient for ScriptedClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RemoteApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
        let next = self.queued.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    fn service_name(&self) -> &str {
        SCRIPTED_SERVICE
    }

    fn escape_string(&self, value: &str) -> String {
        format!("escaped:{value}")
    }

    fn set_entity_serializer(&self, _serializer: Arc<dyn EntitySerializer>) {
        self.serializer_swaps.fetch_add(1, Ordering::SeqCst);
    }

    fn transport(
        &self,
        _session_token: Option<&str>,
    ) -> Result<Arc<dyn HttpTransport>, RemoteApiError> {
        Err(RemoteApiError::from_status(SCRIPTED_SERVICE, 500, "no transport in tests"))
    }
}
