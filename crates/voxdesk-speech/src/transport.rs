//! Request/response capability the speech clients are written against.

use std::fmt;
use std::io::Read;
use std::time::Duration;
use voxdesk_core::{SpeechConfig, SpeechError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    /// The response body is consumed incrementally. Bounded by the stream
    /// timeout instead of the request timeout.
    pub streaming: bool,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            content_type: None,
            body: Vec::new(),
            streaming: false,
        }
    }

    pub fn post(url: impl Into<String>, content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            content_type: Some(content_type),
            body,
            streaming: false,
        }
    }

    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }
}

/// Status code plus a blocking body reader. A read of 0 bytes is end of stream.
pub struct HttpResponse {
    pub status: u16,
    body: Box<dyn Read>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Read + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_body(self) -> Box<dyn Read> {
        self.body
    }

    /// Read the whole body as UTF-8 text.
    pub fn text(mut self) -> Result<String, SpeechError> {
        let mut text = String::new();
        self.body.read_to_string(&mut text)?;
        Ok(text)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// One synchronous HTTP exchange. `Err` means no response was obtained;
/// non-success statuses come back as `Ok`.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, SpeechError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, SpeechError> {
        (**self).send(request)
    }
}

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    request_timeout: Duration,
    stream_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| SpeechError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            request_timeout: config.request_timeout(),
            stream_timeout: config.stream_timeout(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, SpeechError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        if let Some(content_type) = request.content_type {
            builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if request.method == Method::Post {
            builder = builder.body(request.body);
        }
        // Covers the body too: a server that stalls mid-stream fails the read
        builder = builder.timeout(if request.streaming {
            self.stream_timeout
        } else {
            self.request_timeout
        });

        let response = builder.send().map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "request failed");
            SpeechError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        tracing::trace!(url = %request.url, status, "response received");
        Ok(HttpResponse::new(status, response))
    }
}

/// Validate a service base URL and strip trailing slashes.
pub fn normalize_endpoint(url: &str) -> Result<String, SpeechError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| SpeechError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SpeechError::InvalidEndpoint {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(url.trim_end_matches('/').to_string())
}
