//! HTTP transport for the document backend
//!
//! Every endpoint answers with a `{ code, msg, data }` envelope. The client
//! unwraps `data` when `code` is 200 and turns anything else into an error
//! carrying the backend's message.

use reqwest::{multipart, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::errors::{ApiError, ApiResult};
use crate::config::Config;

/// Application code the backend uses for success
pub const SUCCESS_CODE: i64 = 200;

/// Response envelope shared by all endpoints
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Unwrap the payload, failing on any code other than 200
    pub fn into_result(self) -> ApiResult<T> {
        if self.code != SUCCESS_CODE {
            let msg = if self.msg.is_empty() {
                "Error".to_string()
            } else {
                self.msg
            };
            return Err(ApiError::Application {
                code: self.code,
                msg,
            });
        }

        match self.data {
            Some(data) => Ok(data),
            // Endpoints without a payload send null; let T decide whether that is acceptable.
            None => Ok(serde_json::from_value(Value::Null)?),
        }
    }
}

/// Client for the backend REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ApiError::Config("base URL is empty".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from application configuration
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(config.base_url.clone(), Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path; absolute URLs pass through unchanged
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and unwrap the response envelope
    pub async fn request<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, &url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.send(builder, &url).await
    }

    /// `GET` without query parameters
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<T, (), ()>(Method::GET, path, None, None).await
    }

    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.request::<T, Q, ()>(Method::GET, path, Some(query), None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request::<T, (), B>(Method::POST, path, None, Some(body)).await
    }

    /// Send a multipart form with `PUT`
    pub async fn put_multipart<T>(&self, path: &str, form: multipart::Form) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("PUT {} (multipart)", url);

        let builder = self.client.put(&url).multipart(form);
        self.send(builder, &url).await
    }

    /// Fetch raw bytes, bypassing the envelope (file downloads)
    pub async fn fetch_bytes(&self, path: &str) -> ApiResult<Vec<u8>> {
        let url = self.url(path);
        debug!("GET {} (raw)", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            ApiError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Download from {} failed with status {}", url, status);
            return Err(ApiError::Status { status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, url: &str) -> ApiResult<T> {
        let response = builder.send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            ApiError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Response error from {}: {} {}", url, status, body);
            return Err(ApiError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        envelope.into_result().map_err(|e| {
            warn!("Backend rejected request to {}: {}", url, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer a single HTTP request with `response` and return the base URL
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        name: String,
    }

    fn envelope<T: DeserializeOwned>(value: Value) -> Envelope<T> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_success_unwraps_data() {
        let env = envelope::<Payload>(json!({"code": 200, "msg": "ok", "data": {"name": "docs"}}));
        assert_eq!(env.into_result().unwrap(), Payload { name: "docs".into() });
    }

    #[test]
    fn test_non_200_code_is_application_error() {
        let env = envelope::<Payload>(json!({"code": 500, "msg": "folder not found", "data": null}));
        match env.into_result() {
            Err(ApiError::Application { code, msg }) => {
                assert_eq!(code, 500);
                assert_eq!(msg, "folder not found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_message_defaults_to_error() {
        let env = envelope::<Value>(json!({"code": 401}));
        let err = env.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Error (code 401)");
    }

    #[test]
    fn test_null_data_for_unit_payloads() {
        let env = envelope::<Value>(json!({"code": 200, "msg": "", "data": null}));
        assert_eq!(env.into_result().unwrap(), Value::Null);

        let env = envelope::<Payload>(json!({"code": 200, "msg": ""}));
        assert!(matches!(env.into_result(), Err(ApiError::Json(_))));
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/api/v1/file/delete"), "http://localhost:8080/api/v1/file/delete");
        assert_eq!(client.url("api/v1/file/folder/detail"), "http://localhost:8080/api/v1/file/folder/detail");
        assert_eq!(client.url("https://cdn.example.com/a.pdf"), "https://cdn.example.com/a.pdf");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(matches!(
            ApiClient::new("  ", Duration::from_secs(1)),
            Err(ApiError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_request_unwraps_envelope() {
        let base = serve_once(http_response("200 OK", r#"{"code":200,"msg":"","data":{"name":"docs"}}"#)).await;
        let client = ApiClient::new(base, Duration::from_secs(5)).unwrap();

        let payload: Payload = client.fetch("/api/v1/file/getAllFolder").await.unwrap();
        assert_eq!(payload, Payload { name: "docs".into() });
    }

    #[tokio::test]
    async fn test_request_surfaces_application_error() {
        let base = serve_once(http_response("200 OK", r#"{"code":403,"msg":"no access","data":null}"#)).await;
        let client = ApiClient::new(base, Duration::from_secs(5)).unwrap();

        let err = client.fetch::<Value>("/api/v1/tag/config/all").await.unwrap_err();
        assert!(matches!(err, ApiError::Application { code: 403, ref msg } if msg == "no access"));
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let base = serve_once(http_response("500 Internal Server Error", "boom")).await;
        let client = ApiClient::new(base, Duration::from_secs(5)).unwrap();

        match client.fetch::<Value>("/api/v1/file/getAllFolder").await {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = client.fetch::<Value>("/api/v1/file/getAllFolder").await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }
}
