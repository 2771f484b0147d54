// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! Status lines, the typed error taxonomy, and the status-to-error translator.

use std::fmt;
use std::time::Duration;

use http::StatusCode;

use crate::qname::QName;
use crate::transport::TransportError;

/// An HTTP status line, as found verbatim inside `<D:status>` and returned by method calls.
///
/// The integer `code` is authoritative; `version` and `reason` are advisory and are kept around
/// only because some servers put diagnostic text in the reason phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub version: String,
    pub code: StatusCode,
    pub reason: String,
}

impl Status {
    /// Parses a status-line-shaped string, e.g. `"HTTP/1.1 404 Not Found"`.
    ///
    /// # Errors
    ///
    /// If the line has fewer than two space-separated fields, or the second field is not a
    /// valid three-digit status code.
    pub fn parse(line: &str) -> Result<Status, ParseStatusError> {
        let mut parts = line.trim().splitn(3, ' ');
        let version = parts.next().filter(|s| !s.is_empty()).ok_or(ParseStatusError)?;
        let code = parts.next().ok_or(ParseStatusError)?;
        let code = StatusCode::from_bytes(code.as_bytes()).map_err(|_| ParseStatusError)?;
        let reason = parts.next().unwrap_or_default();

        Ok(Status {
            version: version.to_string(),
            code,
            reason: reason.to_string(),
        })
    }
}

/// Returned when a status line cannot be parsed.
///
/// See: <https://www.rfc-editor.org/rfc/rfc2068#section-6.1>
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("malformed status line")]
pub struct ParseStatusError;

/// A precondition code extracted from a `<D:error>` response body, e.g. `{DAV:}lock-token-submitted`.
pub type Precondition = QName;

/// An error raised while pulling `<D:response>`/`<D:propstat>`/property elements out of a
/// Multi-Status body.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("missing required field '{0}' in response XML")]
    MissingData(&'static str),

    #[error(transparent)]
    Status(#[from] ParseStatusError),

    #[error(transparent)]
    Reader(#[from] quick_xml::Error),

    #[error("the response was not valid utf-8")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("expected a 207 Multi-Status response, got {0}")]
    NotMultistatus(StatusCode),
}

/// The typed error taxonomy this crate's public operations return.
#[derive(thiserror::Error, Debug)]
pub enum DavError {
    #[error("the transport failed to execute the request")]
    Transport(#[from] TransportError),

    #[error("could not parse the response XML")]
    Xml(#[from] ParseError),

    #[error("failed to build the request body or URL")]
    InvalidInput(#[from] http::Error),

    #[error("failed to read the response body")]
    Io(#[from] std::io::Error),

    #[error("the server response was syntactically valid but did not make sense: {0}")]
    InvalidResponse(String),

    #[error("authentication is required ({precondition:?})")]
    Unauthorized { precondition: Vec<Precondition> },

    #[error("the server refused the request ({precondition:?})")]
    Forbidden { precondition: Vec<Precondition> },

    #[error("the requested resource does not exist")]
    NotFound,

    #[error("the request conflicts with the current state of the resource")]
    Conflict { precondition: Vec<Precondition> },

    #[error("a conditional header was not satisfied ({precondition:?})")]
    PreconditionFailed { precondition: Vec<Precondition> },

    #[error("the server is temporarily unavailable, retry after {retry_after:?}")]
    ServiceUnavailable { retry_after: Option<Duration> },

    #[error("unexpected response status: {0}")]
    UnexpectedStatus(StatusCode),

    #[error("redirected without a Location header")]
    RedirectWithoutLocation,

    #[error("exceeded the maximum number of redirects")]
    TooManyRedirects,

    #[error("refusing to follow a redirect from https to http")]
    InsecureRedirect,
}

/// The raw ingredients the translator needs from a response, kept separate from any concrete
/// transport response type so it can be reused by both the resource layer and the Multi-Status
/// per-response parser.
#[derive(Debug, Default)]
pub struct StatusContext {
    pub retry_after: Option<Duration>,
    pub precondition: Vec<Precondition>,
}

/// Translates an HTTP status code into the typed taxonomy. 2xx and 3xx are not errors at this
/// layer — redirects are handled by the resource operation layer, and success is simply the
/// absence of an error.
#[must_use]
pub fn translate_status(status: StatusCode, context: StatusContext) -> Option<DavError> {
    match status.as_u16() {
        200..=399 => None,
        401 => Some(DavError::Unauthorized {
            precondition: context.precondition,
        }),
        403 => Some(DavError::Forbidden {
            precondition: context.precondition,
        }),
        404 => Some(DavError::NotFound),
        409 => Some(DavError::Conflict {
            precondition: context.precondition,
        }),
        412 => Some(DavError::PreconditionFailed {
            precondition: context.precondition,
        }),
        503 => Some(DavError::ServiceUnavailable {
            retry_after: context.retry_after,
        }),
        _ => Some(DavError::UnexpectedStatus(status)),
    }
}

/// Parses a `Retry-After` header value, per RFC 7231 §7.1.3: either delay-seconds or an
/// HTTP-date. A date in the past yields a zero duration rather than `None` — the server is still
/// telling the caller to retry, just immediately.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let target = chrono::DateTime::parse_from_rfc2822(trimmed).ok()?;
    let now = chrono::Utc::now();
    Some(
        (target.with_timezone(&chrono::Utc) - now)
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}

/// Extracts every precondition/postcondition element's qualified name from a `<D:error>`
/// response body, in document order. RFC 4918 §11 allows a server to report more than one
/// simultaneously, e.g. `<D:error><D:lock-token-submitted/><D:no-conflicting-lock/></D:error>`
/// yields both `{DAV:}lock-token-submitted` and `{DAV:}no-conflicting-lock`.
///
/// Returns an empty `Vec` if the body is absent, empty, or not a recognisable `<D:error>`
/// element; this mirrors the property registry's "unknown or malformed decodes to absent, never
/// fails the enclosing parse" convention.
#[must_use]
pub fn parse_error_precondition(body: &[u8]) -> Vec<Precondition> {
    use quick_xml::events::Event;
    use quick_xml::name::ResolveResult;
    use quick_xml::NsReader;

    let mut reader = NsReader::from_reader(body);
    reader.config_mut().trim_text(true);

    // Skip down into the <D:error> element itself.
    loop {
        match reader.read_resolved_event() {
            Ok((ResolveResult::Bound(ns), Event::Start(e)))
                if ns.as_ref() == crate::names::DAV.as_bytes()
                    && e.local_name().as_ref() == b"error" =>
            {
                break;
            }
            Ok((_, Event::Eof)) | Err(_) => return Vec::new(),
            _ => continue,
        }
    }

    let mut preconditions = Vec::new();
    loop {
        match reader.read_resolved_event() {
            Ok((ResolveResult::Bound(ns), Event::Start(e) | Event::Empty(e))) => {
                let namespace = String::from_utf8_lossy(ns.as_ref()).into_owned();
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                preconditions.push(QName::new(namespace, local));
            }
            Ok((_, Event::End(e))) if e.local_name().as_ref() == b"error" => return preconditions,
            Ok((_, Event::Eof)) | Err(_) => return preconditions,
            _ => continue,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.version, self.code.as_u16(), self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let status = Status::parse("HTTP/1.1 404 Not Found").unwrap();
        assert_eq!(status.version, "HTTP/1.1");
        assert_eq!(status.code, StatusCode::NOT_FOUND);
        assert_eq!(status.reason, "Not Found");
    }

    #[test]
    fn test_parse_status_without_reason() {
        let status = Status::parse("HTTP/1.1 204").unwrap();
        assert_eq!(status.code, StatusCode::NO_CONTENT);
        assert_eq!(status.reason, "");
    }

    #[test]
    fn test_parse_status_rejects_garbage() {
        assert!(Status::parse("not a status line").is_err());
        assert!(Status::parse("").is_err());
    }

    #[test]
    fn test_translate_status() {
        assert!(matches!(
            translate_status(StatusCode::NOT_FOUND, StatusContext::default()),
            Some(DavError::NotFound)
        ));
        assert!(translate_status(StatusCode::OK, StatusContext::default()).is_none());
        assert!(translate_status(StatusCode::MULTIPLE_CHOICES, StatusContext::default()).is_none());
    }

    #[test]
    fn test_parse_retry_after_delay_seconds() {
        assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after("soon"), None);
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let future = chrono::Utc::now() + chrono::Duration::seconds(90);
        let header = future.to_rfc2822();
        let parsed = parse_retry_after(&header).expect("HTTP-date Retry-After should parse");
        // Allow a little slack for the time elapsed between computing `future` and parsing it.
        assert!(parsed.as_secs() >= 85 && parsed.as_secs() <= 90);
    }

    #[test]
    fn test_parse_retry_after_http_date_in_the_past() {
        let header = "Wed, 21 Oct 2015 07:28:00 GMT";
        assert_eq!(parse_retry_after(header), Some(Duration::ZERO));
    }

    #[test]
    fn test_parse_error_precondition_single() {
        let body = br#"<?xml version="1.0" encoding="utf-8" ?>
            <D:error xmlns:D="DAV:">
                <D:lock-token-submitted/>
            </D:error>"#;
        let preconditions = parse_error_precondition(body);
        assert_eq!(preconditions.len(), 1);
        assert_eq!(preconditions[0].namespace(), "DAV:");
        assert_eq!(preconditions[0].local(), "lock-token-submitted");
    }

    #[test]
    fn test_parse_error_precondition_multiple() {
        let body = br#"<?xml version="1.0" encoding="utf-8" ?>
            <D:error xmlns:D="DAV:">
                <D:lock-token-submitted/>
                <D:no-conflicting-lock/>
            </D:error>"#;
        let preconditions = parse_error_precondition(body);
        assert_eq!(preconditions.len(), 2);
        assert_eq!(preconditions[0].local(), "lock-token-submitted");
        assert_eq!(preconditions[1].local(), "no-conflicting-lock");
    }

    #[test]
    fn test_parse_error_precondition_absent() {
        assert!(parse_error_precondition(b"").is_empty());
        assert!(parse_error_precondition(b"<D:multistatus xmlns:D=\"DAV:\"/>").is_empty());
    }
}
