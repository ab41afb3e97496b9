use crate::builder::HttpClientBuilder;
use crate::config::{HttpClientConfig, TransportSecurity};
use crate::request::RequestBuilder;
use bytes::Bytes;
use http::HeaderValue;
use http_body_util::Full;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use std::fmt;
use std::time::Duration;

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Pooled HTTP client
///
/// Cheap to clone; clones share the connection pool. Safe to use from many
/// tasks at once.
#[derive(Clone)]
pub struct HttpClient {
    inner: HyperClient,
    user_agent: HeaderValue,
    default_timeout: Duration,
    max_body_size: usize,
    transport: TransportSecurity,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("user_agent", &self.user_agent)
            .field("default_timeout", &self.default_timeout)
            .field("max_body_size", &self.max_body_size)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a builder for configuring the client
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub(crate) fn from_parts(
        inner: HyperClient,
        user_agent: HeaderValue,
        config: &HttpClientConfig,
    ) -> Self {
        Self {
            inner,
            user_agent,
            default_timeout: config.request_timeout,
            max_body_size: config.max_body_size,
            transport: config.transport,
        }
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::GET, url)
    }

    /// Start a POST request
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::POST, url)
    }

    /// Start a request with an arbitrary method
    pub fn request(&self, method: http::Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.inner.clone(),
            method,
            url.to_owned(),
            self.user_agent.clone(),
            self.default_timeout,
            self.max_body_size,
            self.transport,
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client() -> HttpClient {
        HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_http_client_get() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/test")
                .header("accept", "application/json");
            then.status(200).json_body(json!({"success": true}));
        });

        let client = test_client();
        let url = format!("{}/test", server.base_url());
        let resp = client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        m.assert();
    }

    #[tokio::test]
    async fn test_http_client_post_form() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/submit")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("key1=value1&key2=value%26two");
            then.status(200).json_body(json!({"received": true}));
        });

        let client = test_client();
        let url = format!("{}/submit", server.base_url());

        let resp = client
            .post(&url)
            .form(&[("key1", "value1"), ("key2", "value&two")])
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        m.assert();
    }

    #[tokio::test]
    async fn test_default_user_agent_is_sent() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/ua")
                .header("user-agent", crate::DEFAULT_USER_AGENT);
            then.status(204);
        });

        let client = test_client();
        let url = format!("{}/ua", server.base_url());
        let resp = client.get(&url).send().await.unwrap();

        assert_eq!(resp.status(), http::StatusCode::NO_CONTENT);
        m.assert();
    }

    #[tokio::test]
    async fn test_json_body_parsing() {
        #[derive(serde::Deserialize)]
        struct TestResponse {
            name: String,
            value: i32,
        }

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json");
            then.status(200).json_body(json!({"name": "test", "value": 42}));
        });

        let client = test_client();
        let url = format!("{}/json", server.base_url());

        let data: TestResponse = client.get(&url).send().await.unwrap().json().unwrap();
        assert_eq!(data.name, "test");
        assert_eq!(data.value, 42);
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let server = MockServer::start();
        let large_body = "x".repeat(64 * 1024);
        server.mock(|when, then| {
            when.method(GET).path("/large");
            then.status(200).body(&large_body);
        });

        let client = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .max_body_size(1024)
            .build()
            .unwrap();

        let url = format!("{}/large", server.base_url());
        let result = client.get(&url).send().await;

        assert!(matches!(result, Err(HttpError::BodyTooLarge { limit: 1024 })));
    }

    #[tokio::test]
    async fn test_non_2xx_keeps_full_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/error");
            then.status(404)
                .header("content-type", "application/json")
                .body(r#"{"error": "not found"}"#);
        });

        let client = test_client();
        let url = format!("{}/error", server.base_url());

        let result = client.get(&url).send().await.unwrap().error_for_status();
        match result {
            Err(HttpError::HttpStatus {
                status,
                body,
                content_type,
            }) => {
                assert_eq!(status, http::StatusCode::NOT_FOUND);
                assert_eq!(body.as_ref(), br#"{"error": "not found"}"#);
                assert_eq!(content_type, Some("application/json".to_owned()));
            }
            other => panic!("Expected HttpStatus error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_per_request_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(500));
        });

        let client = test_client();
        let url = format!("{}/slow", server.base_url());
        let result = client
            .get(&url)
            .timeout(Duration::from_millis(50))
            .send()
            .await;

        match result {
            Err(HttpError::Timeout(d)) => assert_eq!(d, Duration::from_millis(50)),
            other => panic!("Expected Timeout error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind and drop a listener to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = test_client();
        let result = client
            .get(&format!("http://127.0.0.1:{port}/none"))
            .send()
            .await;

        let err = result.unwrap_err();
        assert!(
            matches!(err, HttpError::Transport(_)),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_http_rejected_when_tls_only() {
        let client = HttpClient::builder().build().unwrap();
        let result = client.get("http://example.com/").send().await;

        assert!(matches!(result, Err(HttpError::InvalidScheme { .. })));
    }

    #[tokio::test]
    async fn test_relative_url_rejected() {
        let client = test_client();
        let result = client.get("/relative/path").send().await;

        assert!(matches!(result, Err(HttpError::InvalidUri { .. })));
    }

    #[tokio::test]
    async fn test_client_is_clone() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/shared");
            then.status(200);
        });

        let client = test_client();
        let url = format!("{}/shared", server.base_url());

        let mut handles = Vec::new();
        for _ in 0..5 {
            let client = client.clone();
            let url = url.clone();
            handles.push(tokio::spawn(async move {
                client.get(&url).send().await.unwrap().status()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), http::StatusCode::OK);
        }
        m.assert_calls(5);
    }
}
