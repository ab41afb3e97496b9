use crate::client::HyperClient;
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, read_body_limited};
use bytes::Bytes;
use http::Request;
use http::header::{HeaderName, HeaderValue};
use http_body_util::Full;
use std::time::Duration;

/// Body type for the request builder
#[derive(Clone, Debug)]
enum BodyKind {
    Empty,
    Form(Bytes),
}

/// HTTP request builder with fluent API
///
/// Created by [`HttpClient::get`](crate::HttpClient::get) and friends. Header
/// errors are deferred and reported by [`send()`](RequestBuilder::send).
///
/// This crate does not compose query strings. Build the URL with `url::Url`
/// and pass the final string.
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    client: HyperClient,
    method: http::Method,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: BodyKind,
    timeout: Duration,
    max_body_size: usize,
    transport_security: TransportSecurity,
    /// Error captured during building (deferred to `send()`)
    error: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(
        client: HyperClient,
        method: http::Method,
        url: String,
        user_agent: HeaderValue,
        timeout: Duration,
        max_body_size: usize,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            client,
            method,
            url,
            headers: vec![(http::header::USER_AGENT, user_agent)],
            body: BodyKind::Empty,
            timeout,
            max_body_size,
            transport_security,
            error: None,
        }
    }

    /// Add a single header to the request
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.retain(|(existing, _)| *existing != name);
                self.headers.push((name, value));
            }
            (Err(e), _) => {
                self.error = Some(HttpError::InvalidHeaderName(e));
            }
            (_, Err(e)) => {
                self.error = Some(HttpError::InvalidHeaderValue(e));
            }
        }
        self
    }

    /// Add a header whose value must not show up in debug output
    /// (`Authorization` and the like).
    pub fn sensitive_header(mut self, name: &str, value: &str) -> Self {
        self = self.header(name, value);
        if let Some((_, value)) = self.headers.last_mut() {
            value.set_sensitive(true);
        }
        self
    }

    /// Set request body as form URL-encoded
    ///
    /// Content-Type becomes `application/x-www-form-urlencoded` unless one was
    /// already provided.
    ///
    /// # Errors
    ///
    /// Returns `Err(HttpError::FormEncode)` if encoding fails, or any deferred
    /// header error.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let form_string = serde_urlencoded::to_string(fields)?;
        self.body = BodyKind::Form(Bytes::from(form_string));
        Ok(self)
    }

    /// Override the client's default timeout for this request only.
    ///
    /// The timeout covers connecting, sending, and reading the whole body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate URL and scheme against transport security configuration.
    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let uri: http::Uri =
            self.url
                .parse()
                .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::ParseError,
                    reason: e.to_string(),
                })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        match uri.scheme_str() {
            Some("https") => Ok(uri),
            Some("http") => match self.transport_security {
                TransportSecurity::AllowInsecureHttp => Ok(uri),
                TransportSecurity::TlsOnly => Err(HttpError::InvalidScheme {
                    scheme: "http".to_owned(),
                    reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
                }),
            },
            Some(scheme) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            None => Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    /// Send the request and buffer the response body.
    ///
    /// Any HTTP status is returned as `Ok`; use
    /// [`HttpResponse::error_for_status`] to turn non-2xx into an error.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if:
    /// - a header or the URL is invalid
    /// - the URL scheme is not allowed by the transport security mode
    /// - the connection fails (`Transport`/`Tls`)
    /// - the request does not finish within its timeout (`Timeout`)
    /// - the body exceeds the configured limit (`BodyTooLarge`)
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let uri = self.validate_url()?;
        let mut builder = Request::builder().method(self.method).uri(uri);

        let has_content_type = self
            .headers
            .iter()
            .any(|(name, _)| name == http::header::CONTENT_TYPE);
        if !has_content_type && matches!(self.body, BodyKind::Form(_)) {
            builder = builder.header(
                http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            );
        }

        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        let body_bytes = match self.body {
            BodyKind::Empty => Bytes::new(),
            BodyKind::Form(b) => b,
        };
        let request = builder.body(Full::new(body_bytes))?;

        let timeout = self.timeout;
        let max_body_size = self.max_body_size;
        let client = self.client;

        let exchange = async move {
            let response = client.request(request).await?;
            let (parts, body) = response.into_parts();
            let body = read_body_limited(body, max_body_size).await?;
            Ok::<_, HttpError>(HttpResponse::new(parts.status, parts.headers, body))
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| HttpError::Timeout(timeout))?
    }
}
