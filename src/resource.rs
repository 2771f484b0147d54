// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! The resource operation layer: composes requests against a [`DavResource`]'s `location`,
//! enforces conditional headers and the redirect discipline, and translates non-2xx statuses
//! into [`DavError`].

use std::io::Read;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode, Uri};

use crate::builder;
use crate::error::{parse_error_precondition, parse_retry_after, translate_status, DavError, StatusContext};
use crate::multistatus::{self, MultistatusResult};
use crate::qname::QName;
use crate::response::ResponseElement;
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// HTTP methods this crate issues beyond the standard set, built once and cloned per request.
pub(crate) mod methods {
    use http::Method;

    pub fn propfind() -> Method {
        Method::from_bytes(b"PROPFIND").expect("PROPFIND is a valid method token")
    }

    pub fn proppatch() -> Method {
        Method::from_bytes(b"PROPPATCH").expect("PROPPATCH is a valid method token")
    }

    pub fn mkcol() -> Method {
        Method::from_bytes(b"MKCOL").expect("MKCOL is a valid method token")
    }

    pub fn copy() -> Method {
        Method::from_bytes(b"COPY").expect("COPY is a valid method token")
    }

    pub fn mov() -> Method {
        Method::from_bytes(b"MOVE").expect("MOVE is a valid method token")
    }

    pub fn report() -> Method {
        Method::from_bytes(b"REPORT").expect("REPORT is a valid method token")
    }

    pub fn search() -> Method {
        Method::from_bytes(b"SEARCH").expect("SEARCH is a valid method token")
    }
}

/// The `Depth` header value for PROPFIND and the CalDAV/CardDAV REPORT variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
    Infinity,
}

impl Depth {
    fn header_value(self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }
}

/// Construction-time tuning for the redirect discipline in [`DavResource`]'s operations.
#[derive(Debug, Clone, Copy)]
pub struct RedirectPolicy {
    pub max_redirects: u32,
}

impl Default for RedirectPolicy {
    fn default() -> RedirectPolicy {
        RedirectPolicy { max_redirects: 5 }
    }
}

/// A handle to a single remote resource: a location, the transport to reach it through, and the
/// redirect policy to apply. `location` is updated in place as redirects (or a successful MOVE)
/// are followed; a handle is single-threaded-use, since concurrent operations would race on it.
pub struct DavResource {
    transport: Box<dyn Transport>,
    location: Uri,
    redirect_policy: RedirectPolicy,
}

impl DavResource {
    /// # Panics
    ///
    /// In debug builds, if `transport` self-reports that it follows redirects itself
    /// (see [`Transport::follows_redirects`]) — this is a fail-fast contract violation, not a
    /// recoverable condition, since every redirect would then bypass this crate's own discipline.
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, location: Uri) -> DavResource {
        debug_assert!(
            !transport.follows_redirects(),
            "Transport implementations must not follow redirects themselves; \
             see Transport::follows_redirects",
        );
        DavResource {
            transport,
            location,
            redirect_policy: RedirectPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_redirect_policy(mut self, redirect_policy: RedirectPolicy) -> DavResource {
        self.redirect_policy = redirect_policy;
        self
    }

    #[must_use]
    pub fn location(&self) -> &Uri {
        &self.location
    }

    /// Sends `OPTIONS`, with compression explicitly disabled since some servers mishandle it on
    /// this verb. Does not follow redirects.
    ///
    /// # Errors
    ///
    /// If the transport fails, or the response is a non-2xx status.
    pub fn options(&mut self) -> Result<Vec<String>, DavError> {
        let response = self.execute_with_redirects(false, |location| {
            let mut headers = HeaderMap::new();
            headers.insert(http::header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));
            Ok(TransportRequest::new(Method::OPTIONS, location.clone()).with_headers(headers))
        })?;

        let (status, headers, buf) = read_to_completion(response)?;
        if !status.is_success() {
            return Err(status_error(status, &headers, &buf));
        }

        let capabilities = headers
            .get(HeaderName::from_static("dav"))
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(capabilities)
    }

    /// Sends `PROPFIND` for the given properties, driving Multi-Status parsing and invoking
    /// `callback` once per `<D:response>` in document order.
    ///
    /// # Errors
    ///
    /// If the transport fails, the redirect discipline is violated, the response isn't 207, or
    /// the body can't be parsed.
    pub fn propfind(
        &mut self,
        depth: Depth,
        props: &[QName],
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        self.execute_multistatus(methods::propfind(), builder::propfind(props), Some(depth), callback)
    }

    /// Sends `PROPFIND` with `<allprop/>`, requesting every property the server is willing to
    /// return.
    ///
    /// # Errors
    ///
    /// Same as [`DavResource::propfind`].
    pub fn propfind_allprop(
        &mut self,
        depth: Depth,
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        self.execute_multistatus(methods::propfind(), builder::propfind_allprop(), Some(depth), callback)
    }

    /// Sends `PROPPATCH` applying the given property mutations.
    ///
    /// # Errors
    ///
    /// Same as [`DavResource::propfind`].
    pub fn prop_patch(
        &mut self,
        updates: &[builder::PropertyUpdate],
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        self.execute_multistatus(methods::proppatch(), builder::propertyupdate(updates), None, callback)
    }

    /// Sends an extended `MKCOL` (RFC 5689), following redirects. `DAV:collection` is implied;
    /// `resourcetypes` adds further resource types (e.g. `{CALDAV}calendar`) and MUST NOT repeat
    /// it. Pass an empty slice for a plain MKCOL with no body.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response is a non-2xx status.
    pub fn mkcol(&mut self, resourcetypes: &[QName]) -> Result<(), DavError> {
        let body = if resourcetypes.is_empty() {
            None
        } else {
            Some(builder::mkcol(resourcetypes).into_bytes())
        };

        let response = self.execute_with_redirects(true, |location| {
            let mut headers = HeaderMap::new();
            let mut request = TransportRequest::new(methods::mkcol(), location.clone());
            if let Some(body) = &body {
                headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/xml; charset=utf-8"));
                request = request.with_headers(headers).with_body(body.clone());
            }
            Ok(request)
        })?;

        let (status, headers, buf) = read_to_completion(response)?;
        if !status.is_success() {
            return Err(status_error(status, &headers, &buf));
        }

        Ok(())
    }

    /// Sends `HEAD`, following redirects.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response is a non-2xx status.
    pub fn head(&mut self) -> Result<(StatusCode, HeaderMap), DavError> {
        let response = self.execute_with_redirects(true, |location| {
            Ok(TransportRequest::new(Method::HEAD, location.clone()))
        })?;

        let (status, headers, buf) = read_to_completion(response)?;
        if !status.is_success() {
            return Err(status_error(status, &headers, &buf));
        }

        Ok((status, headers))
    }

    /// Sends `GET`, following redirects. `handler` is invoked with the response only on success,
    /// so it can stream the body without this layer buffering it first; on error the body is
    /// buffered internally to extract a precondition code, then released.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response is a non-2xx status.
    pub fn get<T>(
        &mut self,
        accept: &str,
        extra_headers: HeaderMap,
        handler: impl FnOnce(StatusCode, &HeaderMap, &mut (dyn Read + Send)) -> T,
    ) -> Result<T, DavError> {
        self.get_impl(accept, extra_headers, None, handler)
    }

    /// Sends a ranged `GET` (`Range: bytes=offset-(offset+size-1)`), following redirects. The
    /// handler MUST inspect the returned status to distinguish full (200) from partial (206)
    /// content — some servers ignore `Range` entirely.
    ///
    /// # Errors
    ///
    /// Same as [`DavResource::get`].
    pub fn get_range<T>(
        &mut self,
        accept: &str,
        offset: u64,
        size: u64,
        extra_headers: HeaderMap,
        handler: impl FnOnce(StatusCode, &HeaderMap, &mut (dyn Read + Send)) -> T,
    ) -> Result<T, DavError> {
        let end = offset + size.saturating_sub(1);
        self.get_impl(accept, extra_headers, Some(format!("bytes={offset}-{end}")), handler)
    }

    fn get_impl<T>(
        &mut self,
        accept: &str,
        extra_headers: HeaderMap,
        range: Option<String>,
        handler: impl FnOnce(StatusCode, &HeaderMap, &mut (dyn Read + Send)) -> T,
    ) -> Result<T, DavError> {
        let accept = accept.to_string();
        let response = self.execute_with_redirects(true, |location| {
            let mut headers = extra_headers.clone();
            headers.insert(http::header::ACCEPT, HeaderValue::from_str(&accept).map_err(http::Error::from)?);
            if let Some(range) = &range {
                headers.insert(http::header::RANGE, HeaderValue::from_str(range).map_err(http::Error::from)?);
            }
            Ok(TransportRequest::new(Method::GET, location.clone()).with_headers(headers))
        })?;

        let TransportResponse { status, headers, mut body } = response;

        if !status.is_success() {
            let mut buf = Vec::new();
            body.read_to_end(&mut buf)?;
            return Err(status_error(status, &headers, &buf));
        }

        Ok(handler(status, &headers, &mut *body))
    }

    /// Sends `PUT`, following redirects. Exactly one of `if_etag`/`if_none_match_star` governs
    /// the optimistic-concurrency precondition; `if_schedule_tag` is an additional CalDAV
    /// precondition layered on top. Returns the new `ETag` if the server sent one.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response is a non-2xx status (notably `412` on a
    /// conditional mismatch).
    pub fn put(
        &mut self,
        body: Vec<u8>,
        if_etag: Option<&str>,
        if_schedule_tag: Option<&str>,
        if_none_match_star: bool,
    ) -> Result<Option<String>, DavError> {
        let response = self.execute_with_redirects(true, |location| {
            let mut headers = HeaderMap::new();
            if let Some(etag) = if_etag {
                headers.insert(
                    http::header::IF_MATCH,
                    HeaderValue::from_str(&quoted_string(etag)).map_err(http::Error::from)?,
                );
            }
            if let Some(tag) = if_schedule_tag {
                headers.insert(
                    HeaderName::from_static("if-schedule-tag-match"),
                    HeaderValue::from_str(&quoted_string(tag)).map_err(http::Error::from)?,
                );
            }
            if if_none_match_star {
                headers.insert(http::header::IF_NONE_MATCH, HeaderValue::from_static("*"));
            }
            Ok(TransportRequest::new(Method::PUT, location.clone())
                .with_headers(headers)
                .with_body(body.clone()))
        })?;

        let (status, headers, buf) = read_to_completion(response)?;
        if !status.is_success() {
            return Err(status_error(status, &headers, &buf));
        }

        header_as_string(&headers, &http::header::ETAG)
    }

    /// Deletes the resource at the current location, which may be a collection. A `207`
    /// response (some member resource failed) is treated as an error per RFC 4918 §9.6.1.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response is a non-2xx status.
    pub fn delete(&mut self, if_etag: Option<&str>, if_schedule_tag: Option<&str>) -> Result<(), DavError> {
        let response = self.execute_with_redirects(true, |location| {
            let mut headers = HeaderMap::new();
            if let Some(etag) = if_etag {
                headers.insert(
                    http::header::IF_MATCH,
                    HeaderValue::from_str(&quoted_string(etag)).map_err(http::Error::from)?,
                );
            }
            if let Some(tag) = if_schedule_tag {
                headers.insert(
                    HeaderName::from_static("if-schedule-tag-match"),
                    HeaderValue::from_str(&quoted_string(tag)).map_err(http::Error::from)?,
                );
            }
            Ok(TransportRequest::new(Method::DELETE, location.clone()).with_headers(headers))
        })?;

        let (status, headers, buf) = read_to_completion(response)?;
        if status == StatusCode::MULTI_STATUS {
            return Err(DavError::UnexpectedStatus(status));
        }
        if !status.is_success() {
            return Err(status_error(status, &headers, &buf));
        }

        Ok(())
    }

    /// Copies the resource at the current location to `dest`. A `207` response (partial
    /// failure) is treated as an error.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response is a non-2xx status.
    pub fn copy(&mut self, dest: &Uri, force_overwrite: bool) -> Result<(), DavError> {
        self.copy_or_move(methods::copy(), dest, force_overwrite, false)
    }

    /// Moves the resource at the current location to `dest`. On success, `location` is updated
    /// to the `Location` response header if present, else to `dest`. A `207` response (partial
    /// failure) is treated as an error.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response is a non-2xx status.
    pub fn mov(&mut self, dest: &Uri, force_overwrite: bool) -> Result<(), DavError> {
        self.copy_or_move(methods::mov(), dest, force_overwrite, true)
    }

    fn copy_or_move(
        &mut self,
        method: Method,
        dest: &Uri,
        force_overwrite: bool,
        update_location: bool,
    ) -> Result<(), DavError> {
        let destination = dest.to_string();
        let response = self.execute_with_redirects(true, |location| {
            let mut headers = HeaderMap::new();
            headers.insert(
                HeaderName::from_static("destination"),
                HeaderValue::from_str(&destination).map_err(http::Error::from)?,
            );
            if !force_overwrite {
                headers.insert(HeaderName::from_static("overwrite"), HeaderValue::from_static("F"));
            }
            Ok(TransportRequest::new(method.clone(), location.clone()).with_headers(headers))
        })?;

        let (status, headers, buf) = read_to_completion(response)?;
        if status == StatusCode::MULTI_STATUS {
            return Err(DavError::UnexpectedStatus(status));
        }
        if !status.is_success() {
            return Err(status_error(status, &headers, &buf));
        }

        if update_location {
            let resolved = headers
                .get(http::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(|value| crate::xmlutils::resolve_href(&self.location, value).map_err(DavError::from))
                .transpose()?;
            self.location = resolved.unwrap_or_else(|| dest.clone());
        }

        Ok(())
    }

    /// Sends `SEARCH` (RFC 5323) with a caller-supplied XML body, driving Multi-Status parsing.
    ///
    /// # Errors
    ///
    /// Same as [`DavResource::propfind`].
    pub fn search(
        &mut self,
        body: String,
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        self.execute_multistatus(methods::search(), body, None, callback)
    }

    pub(crate) fn execute_multistatus(
        &mut self,
        method: Method,
        body: String,
        depth: Option<Depth>,
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        let body = body.into_bytes();
        let response = self.execute_with_redirects(true, |location| {
            let mut headers = HeaderMap::new();
            headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/xml; charset=utf-8"));
            if let Some(depth) = depth {
                headers.insert(HeaderName::from_static("depth"), HeaderValue::from_static(depth.header_value()));
            }
            Ok(TransportRequest::new(method.clone(), location.clone())
                .with_headers(headers)
                .with_body(body.clone()))
        })?;

        let (status, headers, buf) = read_to_completion(response)?;
        if !status.is_success() {
            return Err(status_error(status, &headers, &buf));
        }

        let content_type = headers.get(http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
        multistatus::validate(status, content_type, &buf)?;

        multistatus::parse(&buf, &self.location, callback).map_err(DavError::from)
    }

    /// Submits `build(location)` through the transport, following 3xx responses up to
    /// `redirect_policy.max_redirects` hops: refusing any HTTPS→HTTP downgrade, any redirect
    /// missing a `Location` header, and re-submitting the same request (method, body, headers
    /// unchanged) against the resolved target.
    fn execute_with_redirects(
        &mut self,
        follow_redirects: bool,
        build: impl Fn(&Uri) -> Result<TransportRequest, DavError>,
    ) -> Result<TransportResponse, DavError> {
        let mut hops = 0u32;
        loop {
            let request = build(&self.location)?;
            let response = self.transport.execute(request)?;

            if !follow_redirects || !response.status.is_redirection() {
                return Ok(response);
            }

            hops += 1;
            if hops > self.redirect_policy.max_redirects {
                return Err(DavError::TooManyRedirects);
            }

            let location = response
                .headers
                .get(http::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or(DavError::RedirectWithoutLocation)?;
            let target = crate::xmlutils::resolve_href(&self.location, location)?;

            if self.location.scheme_str() == Some("https") && target.scheme_str() == Some("http") {
                return Err(DavError::InsecureRedirect);
            }

            log::debug!("following redirect from {} to {target}", self.location);
            self.location = target;
        }
    }
}

fn read_to_completion(response: TransportResponse) -> Result<(StatusCode, HeaderMap, Vec<u8>), DavError> {
    let TransportResponse { status, headers, mut body } = response;
    let mut buf = Vec::new();
    body.read_to_end(&mut buf)?;
    Ok((status, headers, buf))
}

/// Translates a non-2xx status into a [`DavError`], reading the `Retry-After` header and, if the
/// body is XML, the `<D:error>` precondition codes.
fn status_error(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> DavError {
    let retry_after = headers
        .get(http::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_retry_after);

    let is_xml = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |ct| ct.to_ascii_lowercase().contains("xml"));
    let precondition = if is_xml { parse_error_precondition(body) } else { Vec::new() };

    translate_status(status, StatusContext { retry_after, precondition }).unwrap_or(DavError::UnexpectedStatus(status))
}

fn header_as_string(headers: &HeaderMap, name: &HeaderName) -> Result<Option<String>, DavError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| DavError::InvalidResponse(format!("{name} header was not valid UTF-8")))
        })
        .transpose()
}

/// Whether `value` is already a valid RFC 7230 quoted-string.
fn is_already_quoted(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"'
}

/// Quotes a conditional-header value (an `ETag` or `Schedule-Tag`) per RFC 7230's quoted-string
/// rules: embedded `"` and `\` are backslash-escaped and the result is wrapped in double quotes,
/// unless `value` is already syntactically a quoted-string.
fn quoted_string(value: &str) -> String {
    if is_already_quoted(value) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::DISPLAY_NAME;
    use crate::transport::mock::MockTransport;

    fn resource(responses: Vec<(StatusCode, HeaderMap, Vec<u8>)>, location: &str) -> DavResource {
        DavResource::new(Box::new(MockTransport::new(responses)), location.parse().unwrap())
    }

    struct SelfRedirectingTransport;

    impl crate::transport::Transport for SelfRedirectingTransport {
        fn follows_redirects(&self) -> bool {
            true
        }

        fn execute(
            &self,
            _request: crate::transport::TransportRequest,
        ) -> Result<crate::transport::TransportResponse, crate::transport::TransportError> {
            unreachable!("construction should fail before any request is sent")
        }
    }

    #[test]
    #[should_panic(expected = "must not follow redirects")]
    fn test_new_panics_on_self_redirecting_transport() {
        DavResource::new(Box::new(SelfRedirectingTransport), "https://a/".parse().unwrap());
    }

    #[test]
    fn test_quoted_string_escapes_and_wraps() {
        assert_eq!(quoted_string("abc"), "\"abc\"");
        assert_eq!(quoted_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quoted_string("\"already\""), "\"already\"");
    }

    #[test]
    fn test_propfind_minimal_round_trip() {
        let body = br#"<?xml version="1.0"?>
        <multistatus xmlns="DAV:">
            <response>
                <href>/dav/</href>
                <propstat>
                    <prop><displayname>My Collection</displayname></prop>
                    <status>HTTP/1.1 200 OK</status>
                </propstat>
            </response>
        </multistatus>"#;
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        let mut resource = resource(vec![(StatusCode::MULTI_STATUS, headers, body.to_vec())], "https://example.com/dav/");

        let mut seen = Vec::new();
        let result = resource
            .propfind(Depth::Zero, &[DISPLAY_NAME], |element| seen.push(element))
            .unwrap();

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].href, "https://example.com/dav/");
        assert!(result.sync_token.is_none());
    }

    #[test]
    fn test_https_to_http_redirect_refused() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::LOCATION, HeaderValue::from_static("http://a/x"));
        let mut resource = resource(vec![(StatusCode::FOUND, headers, Vec::new())], "https://a/x");

        let err = resource.head().unwrap_err();
        assert!(matches!(err, DavError::InsecureRedirect));
    }

    #[test]
    fn test_redirect_limit_enforced() {
        let responses = (0..10)
            .map(|_| {
                let mut headers = HeaderMap::new();
                headers.insert(http::header::LOCATION, HeaderValue::from_static("/other"));
                (StatusCode::FOUND, headers, Vec::new())
            })
            .collect();
        let mut resource = resource(responses, "https://a/x");

        let err = resource.head().unwrap_err();
        assert!(matches!(err, DavError::TooManyRedirects));
    }

    #[test]
    fn test_move_updates_location_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::LOCATION, HeaderValue::from_static("/b"));
        let mut resource = resource(vec![(StatusCode::CREATED, headers, Vec::new())], "https://a/a");

        resource.mov(&"https://a/b".parse().unwrap(), false).unwrap();
        assert_eq!(resource.location().path(), "/b");
    }

    #[test]
    fn test_move_falls_back_to_destination_without_location() {
        let mut resource = resource(vec![(StatusCode::CREATED, HeaderMap::new(), Vec::new())], "https://a/a");

        let dest: Uri = "https://a/b".parse().unwrap();
        resource.mov(&dest, false).unwrap();
        assert_eq!(resource.location(), &dest);
    }

    #[test]
    fn test_put_conditional_miss_reports_precondition_failed() {
        let mut resource = resource(vec![(StatusCode::PRECONDITION_FAILED, HeaderMap::new(), Vec::new())], "https://a/x");

        let err = resource.put(b"data".to_vec(), Some("abc"), None, false).unwrap_err();
        assert!(matches!(err, DavError::PreconditionFailed { .. }));
    }

    #[test]
    fn test_delete_with_multistatus_response_is_an_error() {
        let mut resource = resource(vec![(StatusCode::MULTI_STATUS, HeaderMap::new(), Vec::new())], "https://a/x");

        let err = resource.delete(None, None).unwrap_err();
        assert!(matches!(err, DavError::UnexpectedStatus(StatusCode::MULTI_STATUS)));
    }

    #[test]
    fn test_options_parses_dav_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("dav"), HeaderValue::from_static("1, 2, calendar-access"));
        let mut resource = resource(vec![(StatusCode::OK, headers, Vec::new())], "https://a/");

        let capabilities = resource.options().unwrap();
        assert_eq!(capabilities, vec!["1", "2", "calendar-access"]);
    }
}
