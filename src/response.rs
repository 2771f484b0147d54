// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! Parses a single `<D:response>` element into an href, an optional per-response status, and a
//! property set partitioned by the status of each `<D:propstat>` group.

use http::Uri;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{ParseError, Precondition, Status};
use crate::names::DAV;
use crate::property::{self, read_hrefs, read_text, unexpected_eof, Property};
use crate::qname::QName;
use crate::xmlutils::{has_origin_mismatch, resolve_href, unquote_href};

/// How a response's href relates to the resource the request was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrefRelation {
    /// The response describes the requested resource itself (hrefs equal, modulo trailing slash).
    Requested,
    /// The response describes a resource strictly below the requested collection.
    Member,
    /// Neither of the above — e.g. a sibling returned by a REPORT with mismatched scoping.
    Other,
}

/// One `<D:propstat>` group: a status shared by every property decoded alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct PropStat {
    pub status: Status,
    pub properties: Vec<Property>,
}

/// A fully decoded `<D:response>` element, one per href it named.
#[derive(Debug, Clone)]
pub struct ResponseElement {
    /// The absolute URL of the resource this response describes, resolved against the request's
    /// base URL per RFC 4918 §8.3.
    pub href: String,
    /// `true` if `href`'s scheme/authority differ from the request's — the server named a
    /// resource on a different origin than the one the request was made against.
    pub href_origin_mismatch: bool,
    pub status: Option<Status>,
    pub propstat: Vec<PropStat>,
    pub error: Vec<Precondition>,
    pub response_description: Option<String>,
    pub location: Option<String>,
    pub href_relation: HrefRelation,
}

/// Parses one `<D:response>` element, given a reader positioned right after its `Start` event.
///
/// A response element naming more than one `<D:href>` (the `add_href` case RFC 4918 allows for
/// reporting on several identically-propstat'd resources at once) yields one [`ResponseElement`]
/// per href, all sharing the same propstat/status/error/diagnostic content. Each href is resolved
/// into an absolute URL against `base`, the URL the originating request was made against.
pub(crate) fn parse_response(
    reader: &mut NsReader<&[u8]>,
    base: &Uri,
) -> Result<Vec<ResponseElement>, ParseError> {
    let mut hrefs = Vec::new();
    let mut status = None;
    let mut propstat = Vec::new();
    let mut error = Vec::new();
    let mut response_description = None;
    let mut location = None;

    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"response" =>
            {
                break;
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"href" =>
            {
                if let Some(href) = read_text(reader, DAV.as_bytes(), b"href")? {
                    hrefs.push(href);
                }
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"status" =>
            {
                status = parse_status(reader)?;
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"propstat" =>
            {
                propstat.push(parse_propstat(reader)?);
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"error" =>
            {
                error = parse_error(reader)?;
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes()
                    && e.local_name().as_ref() == b"responsedescription" =>
            {
                response_description =
                    read_text(reader, DAV.as_bytes(), b"responsedescription")?;
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"location" =>
            {
                location = read_hrefs(reader, DAV.as_bytes(), b"location")?.into_iter().next();
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }

    if hrefs.is_empty() {
        return Err(ParseError::MissingData("href"));
    }

    Ok(hrefs
        .into_iter()
        .map(|raw_href| {
            let (href, href_origin_mismatch, href_relation) = match resolve_href(base, &raw_href) {
                Ok(resolved) => {
                    let mismatch = has_origin_mismatch(base, &resolved);
                    let relation = classify_href(&resolved, base);
                    (resolved.to_string(), mismatch, relation)
                }
                Err(err) => {
                    log::warn!("could not resolve response href {raw_href:?} against {base}: {err}");
                    (raw_href, false, HrefRelation::Other)
                }
            };
            ResponseElement {
                href,
                href_origin_mismatch,
                status: status.clone(),
                propstat: propstat.clone(),
                error: error.clone(),
                response_description: response_description.clone(),
                location: location.clone(),
                href_relation,
            }
        })
        .collect())
}

fn parse_status(reader: &mut NsReader<&[u8]>) -> Result<Option<Status>, ParseError> {
    let text = read_text(reader, DAV.as_bytes(), b"status")?;
    text.map(|line| Status::parse(&line).map_err(ParseError::from))
        .transpose()
}

fn parse_propstat(reader: &mut NsReader<&[u8]>) -> Result<PropStat, ParseError> {
    let mut status = None;
    let mut properties = Vec::new();

    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"propstat" =>
            {
                break;
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"status" =>
            {
                status = parse_status(reader)?;
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"prop" =>
            {
                properties = parse_prop(reader)?;
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }

    Ok(PropStat {
        status: status.ok_or(ParseError::MissingData("status"))?,
        properties,
    })
}

/// Parses the children of `<D:prop>`, keeping at most one decoded [`Property`] per qualified
/// name (last one wins), per the "duplicates resolved by last-wins" invariant.
fn parse_prop(reader: &mut NsReader<&[u8]>) -> Result<Vec<Property>, ParseError> {
    let mut decoded: Vec<(QName, Property)> = Vec::new();

    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"prop" =>
            {
                break;
            }
            (ResolveResult::Bound(ns), Event::Start(e)) => {
                let name = QName::new(
                    String::from_utf8_lossy(ns.as_ref()).into_owned(),
                    String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                );
                let value = property::decode(reader, &name)?;
                upsert(&mut decoded, name, value);
            }
            (ResolveResult::Bound(ns), Event::Empty(e)) => {
                let name = QName::new(
                    String::from_utf8_lossy(ns.as_ref()).into_owned(),
                    String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                );
                let value = property::decode_empty(&name);
                upsert(&mut decoded, name, value);
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }

    Ok(decoded.into_iter().map(|(_, value)| value).collect())
}

fn upsert(decoded: &mut Vec<(QName, Property)>, name: QName, value: Property) {
    if let Some(entry) = decoded.iter_mut().find(|(existing, _)| *existing == name) {
        entry.1 = value;
    } else {
        decoded.push((name, value));
    }
}

/// Collects every direct child element's qualified name, per RFC 4918 §11's allowance for more
/// than one simultaneous precondition/postcondition code in a single `<D:error>`.
fn parse_error(reader: &mut NsReader<&[u8]>) -> Result<Vec<Precondition>, ParseError> {
    let mut preconditions = Vec::new();

    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"error" =>
            {
                break;
            }
            (ResolveResult::Bound(ns), Event::Start(e) | Event::Empty(e)) => {
                preconditions.push(QName::new(
                    String::from_utf8_lossy(ns.as_ref()).into_owned(),
                    String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ));
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }

    Ok(preconditions)
}

/// Classifies `resolved` relative to `base` by comparing percent-decoded paths; the scheme and
/// authority are intentionally ignored here (an origin mismatch is reported separately via
/// [`has_origin_mismatch`]).
fn classify_href(resolved: &Uri, base: &Uri) -> HrefRelation {
    let href_path = unquote_href(resolved.path())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| resolved.path().to_string());
    let base_path = unquote_href(base.path())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| base.path().to_string());
    let href_path = href_path.trim_end_matches('/');
    let base_path = base_path.trim_end_matches('/');

    if href_path == base_path {
        HrefRelation::Requested
    } else if let Some(rest) = href_path.strip_prefix(base_path) {
        if rest.starts_with('/') {
            HrefRelation::Member
        } else {
            HrefRelation::Other
        }
    } else {
        HrefRelation::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{CALENDAR_HOME_SET, DISPLAY_NAME, GETETAG};

    fn parse(xml: &str, base: &str) -> Vec<ResponseElement> {
        let base: Uri = base.parse().unwrap();
        let mut reader = NsReader::from_reader(xml.as_bytes());
        reader.config_mut().trim_text(true);
        loop {
            match reader.read_resolved_event().unwrap() {
                (_, Event::Start(_)) => break,
                (_, Event::Eof) => panic!("no response start tag"),
                _ => {}
            }
        }
        parse_response(&mut reader, &base).unwrap()
    }

    #[test]
    fn test_single_propstat() {
        let xml = r#"<response xmlns="DAV:">
            <href>/dav/calendars/user/personal/</href>
            <propstat>
                <prop>
                    <displayname>Personal</displayname>
                    <getetag>"abc"</getetag>
                </prop>
                <status>HTTP/1.1 200 OK</status>
            </propstat>
        </response>"#;
        let responses = parse(xml, "https://example.com/dav/calendars/user/");
        assert_eq!(responses.len(), 1);
        let r = &responses[0];
        assert_eq!(r.href, "https://example.com/dav/calendars/user/personal/");
        assert!(!r.href_origin_mismatch);
        assert_eq!(r.href_relation, HrefRelation::Member);
        assert_eq!(r.propstat.len(), 1);
        assert!(r.propstat[0].properties.contains(&Property::DisplayName("Personal".to_string())));
        assert!(r.propstat[0].properties.contains(&Property::GetEtag("abc".to_string())));
    }

    #[test]
    fn test_multiple_propstat_groups() {
        let xml = r#"<response xmlns="DAV:">
            <href>/dav/calendars/user/personal/</href>
            <propstat>
                <prop><displayname>Personal</displayname></prop>
                <status>HTTP/1.1 200 OK</status>
            </propstat>
            <propstat>
                <prop><getetag/></prop>
                <status>HTTP/1.1 404 Not Found</status>
            </propstat>
        </response>"#;
        let responses = parse(xml, "https://example.com/dav/calendars/user/personal/");
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].href_relation, HrefRelation::Requested);
        assert_eq!(responses[0].propstat.len(), 2);
        assert_eq!(responses[0].propstat[1].status.code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_multiple_hrefs_share_propstat() {
        let xml = r#"<response xmlns="DAV:">
            <href>/dav/a/</href>
            <href>/dav/b/</href>
            <propstat>
                <prop><displayname>Shared</displayname></prop>
                <status>HTTP/1.1 200 OK</status>
            </propstat>
        </response>"#;
        let responses = parse(xml, "https://example.com/dav/");
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].href, "https://example.com/dav/a/");
        assert_eq!(responses[1].href, "https://example.com/dav/b/");
        assert_eq!(responses[0].propstat, responses[1].propstat);
    }

    #[test]
    fn test_response_without_props_top_level_status() {
        let xml = r#"<response xmlns="DAV:">
            <href>/dav/gone/</href>
            <status>HTTP/1.1 404 Not Found</status>
        </response>"#;
        let responses = parse(xml, "https://example.com/dav/");
        assert_eq!(responses[0].status.as_ref().unwrap().code, http::StatusCode::NOT_FOUND);
        assert!(responses[0].propstat.is_empty());
    }

    #[test]
    fn test_duplicate_property_last_wins() {
        let xml = r#"<response xmlns="DAV:">
            <href>/dav/x/</href>
            <propstat>
                <prop>
                    <displayname>first</displayname>
                    <displayname>second</displayname>
                </prop>
                <status>HTTP/1.1 200 OK</status>
            </propstat>
        </response>"#;
        let responses = parse(xml, "https://example.com/dav/");
        assert_eq!(responses[0].propstat[0].properties.len(), 1);
        assert_eq!(
            responses[0].propstat[0].properties[0],
            Property::DisplayName("second".to_string())
        );
    }

    #[test]
    fn test_classify_href_other() {
        let xml = r#"<response xmlns="DAV:">
            <href>/elsewhere/</href>
            <propstat>
                <prop><getetag>"x"</getetag></prop>
                <status>HTTP/1.1 200 OK</status>
            </propstat>
        </response>"#;
        let responses = parse(xml, "https://example.com/dav/calendars/user/");
        assert_eq!(responses[0].href_relation, HrefRelation::Other);
    }

    #[test]
    fn test_href_on_different_origin_is_flagged() {
        let xml = r#"<response xmlns="DAV:">
            <href>https://other.example.com/dav/x/</href>
            <propstat>
                <prop><getetag>"x"</getetag></prop>
                <status>HTTP/1.1 200 OK</status>
            </propstat>
        </response>"#;
        let responses = parse(xml, "https://example.com/dav/");
        assert!(responses[0].href_origin_mismatch);
        assert_eq!(responses[0].href, "https://other.example.com/dav/x/");
    }

    #[test]
    fn test_error_and_home_set_property() {
        let xml = r#"<response xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
            <href>/dav/</href>
            <error><D:lock-token-submitted xmlns:D="DAV:"/></error>
            <propstat>
                <prop><C:calendar-home-set><href>/dav/calendars/user/</href></C:calendar-home-set></prop>
                <status>HTTP/1.1 200 OK</status>
            </propstat>
        </response>"#;
        let responses = parse(xml, "https://example.com/dav/");
        assert_eq!(responses[0].error.len(), 1);
        assert_eq!(responses[0].error[0].local(), "lock-token-submitted");
        assert!(responses[0].propstat[0].properties.contains(&Property::CalendarHomeSet(
            vec!["/dav/calendars/user/".to_string()]
        )));
        let _ = CALENDAR_HOME_SET;
        let _ = DISPLAY_NAME;
        let _ = GETETAG;
    }
}
