//! Port interfaces for the decorated API client

use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_domain::constants::PAYLOAD_DECODE_FAILURE_STATUS;
use bridgekit_domain::RemoteApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiRequest, ApiResponse, Headers, QueryParams};
use crate::serializer::EntitySerializer;
use crate::transport::HttpTransport;

/// Call contract shared by the base caller and every decorator.
#[async_trait]
pub trait HttpApiClient: Send + Sync {
    /// Execute one logical call.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RemoteApiError>;

    /// Component name used to tag errors and logs.
    fn service_name(&self) -> &str;

    /// Percent-encode a value for use as a single path segment.
    fn escape_string(&self, value: &str) -> String;

    /// Replace the serializer used for payloads and response bodies.
    fn set_entity_serializer(&self, serializer: Arc<dyn EntitySerializer>);

    /// Transport the base caller would use for `session_token`.
    fn transport(
        &self,
        session_token: Option<&str>,
    ) -> Result<Arc<dyn HttpTransport>, RemoteApiError>;
}

/// Typed helpers over [`HttpApiClient::execute`].
#[async_trait]
pub trait HttpApiClientExt: HttpApiClient {
    async fn do_get<T>(
        &self,
        path: &str,
        headers: Headers,
        query: QueryParams,
    ) -> Result<T, RemoteApiError>
    where
        T: DeserializeOwned + Send,
    {
        let request = ApiRequest::get(path).with_headers(headers).with_query(query);
        let response = self.execute(request).await?;
        decode_payload(self.service_name(), response)
    }

    async fn do_post<T, B>(
        &self,
        path: &str,
        headers: Headers,
        query: QueryParams,
        payload: &B,
    ) -> Result<T, RemoteApiError>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync + ?Sized,
    {
        let payload = encode_payload(self.service_name(), payload)?;
        let request = ApiRequest::post(path, payload).with_headers(headers).with_query(query);
        let response = self.execute(request).await?;
        decode_payload(self.service_name(), response)
    }

    async fn do_put<T, B>(
        &self,
        path: &str,
        headers: Headers,
        query: QueryParams,
        payload: &B,
    ) -> Result<T, RemoteApiError>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync + ?Sized,
    {
        let payload = encode_payload(self.service_name(), payload)?;
        let request = ApiRequest::put(path, payload).with_headers(headers).with_query(query);
        let response = self.execute(request).await?;
        decode_payload(self.service_name(), response)
    }

    async fn do_delete<T>(
        &self,
        path: &str,
        headers: Headers,
        query: QueryParams,
    ) -> Result<T, RemoteApiError>
    where
        T: DeserializeOwned + Send,
    {
        let request = ApiRequest::delete(path).with_headers(headers).with_query(query);
        let response = self.execute(request).await?;
        decode_payload(self.service_name(), response)
    }
}

impl<C: HttpApiClient + ?Sized> HttpApiClientExt for C {}

fn encode_payload<B: Serialize + ?Sized>(
    component: &str,
    payload: &B,
) -> Result<serde_json::Value, RemoteApiError> {
    serde_json::to_value(payload).map_err(|e| {
        RemoteApiError::from_status(
            component,
            PAYLOAD_DECODE_FAILURE_STATUS,
            format!("Failed to encode request payload: {e}"),
        )
    })
}

fn decode_payload<T: DeserializeOwned>(
    component: &str,
    response: ApiResponse,
) -> Result<T, RemoteApiError> {
    serde_json::from_value(response.body).map_err(|e| {
        tracing::warn!(component, status = response.status, error = %e, "Response payload did not match expected type");
        RemoteApiError::from_status(
            component,
            PAYLOAD_DECODE_FAILURE_STATUS,
            format!("Failed to decode response payload: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde::Deserialize;
    use serde_json::{json, Value};

    use super::*;
    use crate::transport::TransportError;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Info {
        version: String,
    }

    /// Records requests and answers with a fixed body.
    struct StubClient {
        body: Value,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl StubClient {
        fn new(body: Value) -> Self {
            Self { body, seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl HttpApiClient for StubClient {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RemoteApiError> {
            self.seen.lock().push(request);
            Ok(ApiResponse::new(200, self.body.clone()))
        }

        fn service_name(&self) -> &str {
            "Stub API"
        }

        fn escape_string(&self, value: &str) -> String {
            value.to_string()
        }

        fn set_entity_serializer(&self, _serializer: Arc<dyn EntitySerializer>) {}

        fn transport(
            &self,
            _session_token: Option<&str>,
        ) -> Result<Arc<dyn HttpTransport>, RemoteApiError> {
            Err(RemoteApiError::connection("Stub API", TransportError::build("none").to_string()))
        }
    }

    #[tokio::test]
    async fn do_get_decodes_typed_body() {
        let client = StubClient::new(json!({"version": "1.55"}));

        let info: Info = client
            .do_get("/v1/info", Headers::new(), vec![("a".into(), "b".into())])
            .await
            .unwrap();

        assert_eq!(info, Info { version: "1.55".into() });
        let seen = client.seen.lock();
        assert_eq!(seen[0].query, vec![("a".to_string(), "b".to_string())]);
    }

    #[tokio::test]
    async fn do_post_sends_serialized_payload_through_dyn_client() {
        let client: Arc<dyn HttpApiClient> = Arc::new(StubClient::new(Value::Null));

        let _: () = client
            .do_post("/v1/stream", Headers::new(), QueryParams::new(), &json!({"name": "room"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn mismatched_body_is_a_500_remote_error() {
        let client = StubClient::new(json!({"unexpected": true}));

        let err = client.do_get::<Info>("/v1/info", Headers::new(), QueryParams::new()).await.unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.component(), "Stub API");
    }
}
