// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! Drives the property registry and response parser over a complete 207 Multi-Status body,
//! dispatching each `<D:response>` to a caller-supplied callback and collecting whatever
//! top-level properties (`sync-token`, chiefly) aren't themselves responses.

use http::{StatusCode, Uri};
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::ParseError;
use crate::names::DAV;
use crate::property;
use crate::response::{self, ResponseElement};

/// Whatever is left over from a Multi-Status body once every `<D:response>` has been dispatched.
#[derive(Debug, Default, Clone)]
pub struct MultistatusResult {
    pub sync_token: Option<String>,
}

/// Checks that a response is plausibly a Multi-Status body before attempting to parse it.
///
/// A status other than 207 is an error. A missing or unexpected `Content-Type` is only logged —
/// some servers omit it or mislabel it, and the bytes are sniffed for a leading `<?xml` or `<`
/// regardless.
///
/// # Errors
///
/// If `status` isn't 207, or the body doesn't look like XML at all.
pub fn validate(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> Result<(), ParseError> {
    if status != StatusCode::MULTI_STATUS {
        return Err(ParseError::NotMultistatus(status));
    }

    match content_type {
        Some(ct) if ct.to_ascii_lowercase().contains("xml") => {}
        Some(ct) => warn!("multistatus response had an unexpected content-type: {ct}"),
        None => warn!("multistatus response had no content-type header"),
    }

    let sniffed = skip_leading_whitespace(body);
    if !sniffed.starts_with(b"<?xml") && !sniffed.starts_with(b"<") {
        return Err(ParseError::MissingData("xml body"));
    }

    Ok(())
}

fn skip_leading_whitespace(body: &[u8]) -> &[u8] {
    let mut i = 0;
    while i < body.len() && body[i].is_ascii_whitespace() {
        i += 1;
    }
    &body[i..]
}

/// Parses a complete Multi-Status body, invoking `callback` once per response element.
///
/// `base` is the absolute URL the originating request was made against: each response's
/// `<D:href>` is resolved against it, and it's used to compute each response's
/// [`crate::response::HrefRelation`].
///
/// # Errors
///
/// If the body is truncated, malformed, or missing its `<D:multistatus>` root; individual
/// unrecognised top-level children are skipped and logged rather than failing the parse.
pub fn parse(
    body: &[u8],
    base: &Uri,
    mut callback: impl FnMut(ResponseElement),
) -> Result<MultistatusResult, ParseError> {
    let mut reader = NsReader::from_reader(body);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"multistatus" =>
            {
                break;
            }
            (_, Event::Eof) => {
                return Err(ParseError::MissingData("incomplete or invalid multistatus body"));
            }
            _ => {}
        }
    }

    let mut result = MultistatusResult::default();

    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"multistatus" =>
            {
                break;
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"response" =>
            {
                for element in response::parse_response(&mut reader, base)? {
                    callback(element);
                }
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"sync-token" =>
            {
                result.sync_token = property::read_text(&mut reader, DAV.as_bytes(), b"sync-token")?;
            }
            (_, Event::Start(_)) => {
                debug!("skipping unrecognised multistatus child element");
                skip_unknown_child(&mut reader)?;
            }
            (_, Event::Eof) => {
                return Err(ParseError::MissingData("incomplete or invalid multistatus body"));
            }
            _ => {}
        }
    }

    Ok(result)
}

/// Skips the remainder of an unrecognised element's subtree, given a reader positioned right
/// after its `Start` event.
fn skip_unknown_child(reader: &mut NsReader<&[u8]>) -> Result<(), ParseError> {
    let mut depth: i32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => return Err(property::unexpected_eof()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;

    fn base(url: &str) -> Uri {
        url.parse().unwrap()
    }

    #[test]
    fn test_validate_rejects_non_207() {
        let err = validate(StatusCode::OK, Some("application/xml"), b"<multistatus/>").unwrap_err();
        assert!(matches!(err, ParseError::NotMultistatus(StatusCode::OK)));
    }

    #[test]
    fn test_validate_sniffs_body_without_content_type() {
        assert!(validate(StatusCode::MULTI_STATUS, None, b"<?xml version=\"1.0\"?><multistatus/>").is_ok());
        assert!(validate(StatusCode::MULTI_STATUS, None, b"not xml at all").is_err());
    }

    #[test]
    fn test_parse_collects_responses_and_sync_token() {
        let body = br#"<?xml version="1.0" encoding="utf-8"?>
        <multistatus xmlns="DAV:">
            <response>
                <href>/dav/calendars/user/a/</href>
                <propstat>
                    <prop><displayname>A</displayname></prop>
                    <status>HTTP/1.1 200 OK</status>
                </propstat>
            </response>
            <response>
                <href>/dav/calendars/user/b/</href>
                <propstat>
                    <prop><displayname>B</displayname></prop>
                    <status>HTTP/1.1 200 OK</status>
                </propstat>
            </response>
            <sync-token>https://example.com/sync/1234</sync-token>
        </multistatus>"#;

        let mut names = Vec::new();
        let result = parse(body, &base("https://example.com/dav/calendars/user/"), |element| {
            if let Some(Property::DisplayName(name)) =
                element.propstat.first().and_then(|p| p.properties.first())
            {
                names.push(name.clone());
            }
        })
        .unwrap();

        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(result.sync_token.as_deref(), Some("https://example.com/sync/1234"));
    }

    #[test]
    fn test_parse_skips_unrecognised_top_level_element() {
        let body = br#"<?xml version="1.0"?>
        <multistatus xmlns="DAV:">
            <responsedescription>nothing to see here</responsedescription>
            <response>
                <href>/dav/x/</href>
                <propstat>
                    <prop><getetag>"x"</getetag></prop>
                    <status>HTTP/1.1 200 OK</status>
                </propstat>
            </response>
        </multistatus>"#;

        let mut count = 0;
        parse(body, &base("https://example.com/dav/"), |_| count += 1).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_parse_rejects_truncated_body() {
        let body = br#"<?xml version="1.0"?><multistatus xmlns="DAV:"><response><href>/a/</href>"#;
        assert!(parse(body, &base("https://example.com/"), |_| {}).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_root() {
        assert!(parse(b"<?xml version=\"1.0\"?><nonsense/>", &base("https://example.com/"), |_| {}).is_err());
    }
}
