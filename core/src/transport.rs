//! Executing requests built by `TripClient`.
//!
//! # Design
//! The client core never touches the network; a `Transport` performs the
//! round-trip and hands back the raw response. `UreqTransport` is the
//! production implementation. ureq is blocking, so each call runs on tokio's
//! blocking pool and the awaiting caller is suspended, not blocked.
//!
//! Status validation is not the transport's job: `check_status` is applied
//! by every `TripClient::parse_*` method, so hosts that run their own HTTP
//! stack get the same behavior.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip. No retries, no caching.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}

/// Map any status outside 200..=299 to `ApiError::HttpError`.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..=299).contains(&response.status) {
        Ok(())
    } else {
        Err(ApiError::HttpError {
            status: response.status,
        })
    }
}

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking ureq agent driven from async code.
///
/// `execute` must be awaited inside a Tokio runtime, since the call is handed
/// to its blocking pool. Awaited anywhere else it fails with
/// `ApiError::Unknown`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `connect` bounds connection setup, `total` bounds the whole exchange.
    pub fn new(connect: Duration, total: Duration) -> Self {
        // 4xx/5xx come back as data so `check_status` decides what they mean.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(connect))
            .timeout_global(Some(total))
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.connect_timeout(), config.request_timeout())
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime to run the request on");
            return Err(ApiError::Unknown);
        };
        let agent = self.agent.clone();
        let response = runtime
            .spawn_blocking(move || send(&agent, request))
            .await
            .map_err(|e| {
                warn!(error = %e, "request task did not complete");
                ApiError::Unknown
            })??;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }
}

fn send(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;

    let result = match method {
        HttpMethod::Get => with_headers(agent.get(&url), &headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(&url), &headers).call(),
        HttpMethod::Post => send_body(with_headers(agent.post(&url), &headers), body),
        HttpMethod::Put => send_body(with_headers(agent.put(&url), &headers), body),
        HttpMethod::Patch => send_body(with_headers(agent.patch(&url), &headers), body),
    };
    let mut response = result.map_err(classify)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.body_mut().read_to_vec().map_err(classify)?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn classify(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::StatusCode(status) => ApiError::HttpError { status },
        ureq::Error::BadUri(uri) => ApiError::InvalidUrl(uri),
        ureq::Error::Protocol(_) => ApiError::InvalidResponse,
        other => ApiError::NetworkError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_inclusive() {
        for status in [200, 201, 204, 299] {
            assert!(check_status(&HttpResponse::new(status, "")).is_ok(), "{status}");
        }
    }

    #[test]
    fn redirects_and_informational_are_errors() {
        for status in [100, 199, 300, 304] {
            assert_eq!(
                check_status(&HttpResponse::new(status, "")),
                Err(ApiError::HttpError { status })
            );
        }
    }

    #[test]
    fn classify_maps_bad_uri() {
        let err = classify(ureq::Error::BadUri("::".into()));
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn classify_maps_host_not_found_to_network_error() {
        let err = classify(ureq::Error::HostNotFound);
        assert!(matches!(err, ApiError::NetworkError(_)));
    }

    fn get(url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Accepts one connection, reads the request head and answers with
    /// `reply` before closing.
    fn serve_once(reply: &'static [u8]) -> (String, std::thread::JoinHandle<()>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 512];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            stream.write_all(reply).unwrap();
        });
        (format!("http://{addr}/trips"), handle)
    }

    #[tokio::test]
    async fn malformed_status_line_is_invalid_response() {
        let (url, server) = serve_once(b"garbage\r\n\r\n");
        let err = UreqTransport::default().execute(get(url)).await.unwrap_err();
        server.join().unwrap();
        assert_eq!(err, ApiError::InvalidResponse);
    }

    #[tokio::test]
    async fn error_status_is_returned_as_data() {
        let (url, server) =
            serve_once(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\n\r\n");
        let response = UreqTransport::default().execute(get(url)).await.unwrap();
        server.join().unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(check_status(&response), Err(ApiError::HttpError { status: 503 }));
    }

    struct NoopWake;

    impl std::task::Wake for NoopWake {
        fn wake(self: Arc<Self>) {}
    }

    #[test]
    fn execute_outside_a_runtime_fails_cleanly() {
        use std::future::Future;
        use std::task::{Context, Poll, Waker};

        let transport = UreqTransport::default();
        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        let mut call = std::pin::pin!(transport.execute(get("http://127.0.0.1:9/trips".into())));
        match call.as_mut().poll(&mut cx) {
            Poll::Ready(Err(err)) => assert_eq!(err, ApiError::Unknown),
            _ => panic!("expected an immediate ApiError::Unknown"),
        }
    }
}
