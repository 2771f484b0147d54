// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! The boundary between this crate and the HTTP stack that actually puts bytes on the wire.
//!
//! Connection pooling, TLS, and authentication challenges are explicitly out of scope for this
//! crate; [`Transport`] is the trait an application implements over whatever blocking HTTP
//! client it prefers. No implementation ships here.

use std::fmt;
use std::io::Read;

use http::{HeaderMap, Method, Uri};

/// A request ready to be sent over the wire.
#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> TransportRequest {
        TransportRequest {
            method,
            uri,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> TransportRequest {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> TransportRequest {
        self.body = Some(body);
        self
    }
}

/// A response as read off the wire.
///
/// `body` is boxed rather than buffered eagerly so the resource operation layer can stream it
/// into the Multi-Status parser without holding more than one response in memory at a time.
pub struct TransportResponse {
    pub status: http::StatusCode,
    pub headers: HeaderMap,
    pub body: Box<dyn Read + Send>,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// An opaque, transport-native failure: DNS resolution, TLS handshake, socket I/O, and so on.
#[derive(thiserror::Error, Debug)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> TransportError {
        TransportError {
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> TransportError {
        TransportError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// The HTTP client a [`crate::resource::DavResource`] issues requests through.
///
/// Implementors MUST NOT follow redirects themselves: a 3xx response MUST be returned as-is so
/// that the resource operation layer can apply its own redirect discipline (protocol-level
/// constraints the underlying client has no way to know about).
pub trait Transport {
    /// Self-reports whether this implementation follows redirects on its own rather than
    /// returning the 3xx response untouched. [`crate::resource::DavResource::new`] asserts this
    /// is `false` in debug builds — a transport that auto-redirects silently defeats the
    /// resource layer's downgrade refusal and hop limit, which never see the intermediate hops.
    ///
    /// Defaults to `false`; only override this to return `true` if the implementation genuinely
    /// cannot be configured not to follow redirects, so the fail-fast assertion can catch it.
    fn follows_redirects(&self) -> bool {
        false
    }

    /// Executes a single request and returns the raw response, unfollowed.
    ///
    /// # Errors
    ///
    /// If the request could not be sent or the response could not be read at all (DNS failure,
    /// connection refused, I/O error). A non-2xx status code is NOT an error at this layer.
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// A scripted in-memory [`Transport`], for exercising the engine without a live server.
///
/// Enabled by the `test-util` feature so both this crate's own tests and a downstream crate's
/// integration tests can use it; not part of the default build.
#[cfg(any(test, feature = "test-util"))]
pub mod mock {
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Mutex;

    use http::{HeaderMap, StatusCode};

    use super::{Transport, TransportError, TransportRequest, TransportResponse};

    /// A scripted in-memory transport for exercising the engine without a live server.
    pub struct MockTransport {
        responses: Mutex<VecDeque<(StatusCode, HeaderMap, Vec<u8>)>>,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl MockTransport {
        pub fn new(responses: Vec<(StatusCode, HeaderMap, Vec<u8>)>) -> MockTransport {
            MockTransport {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> std::sync::MutexGuard<'_, Vec<TransportRequest>> {
            self.requests.lock().unwrap()
        }
    }

    impl Transport for MockTransport {
        fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
            let (status, headers, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TransportError::new("mock transport exhausted"))?;
            self.requests.lock().unwrap().push(request);
            Ok(TransportResponse {
                status,
                headers,
                body: Box::new(Cursor::new(body)),
            })
        }
    }
}
