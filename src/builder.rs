// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! Builds XML request bodies for PROPFIND, PROPPATCH and the REPORT variants this crate knows
//! about (`calendar-query`, `calendar-multiget`, `addressbook-query`, `addressbook-multiget`,
//! `sync-collection`).
//!
//! Every body uses the same fixed namespace prefix map, declared once on the document element:
//! the default namespace is `DAV:`, `C:` is CalDAV, `CARD:` is CardDAV.

use std::fmt::Write as _;

use crate::names::{CALDAV, CARDDAV, DAV};
use crate::qname::QName;
use crate::xmlutils::{escape_text, quote_href};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8" ?>"#;
const ROOT_NAMESPACES: &str = r#"xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav" xmlns:CARD="urn:ietf:params:xml:ns:carddav""#;

fn prefix_for(namespace: &str) -> &'static str {
    if namespace == DAV {
        ""
    } else if namespace == CALDAV {
        "C:"
    } else if namespace == CARDDAV {
        "CARD:"
    } else {
        ""
    }
}

fn qualified(name: &QName) -> String {
    format!("{}{}", prefix_for(name.namespace()), name.local())
}

fn write_prop_request(body: &mut String, props: &[QName]) {
    body.push_str("<prop>");
    for name in props {
        let _ = write!(body, "<{}/>", qualified(name));
    }
    body.push_str("</prop>");
}

fn write_hrefs(body: &mut String, hrefs: &[&str]) {
    for href in hrefs {
        let _ = write!(body, "<href>{}</href>", escape_text(&quote_href(href.as_bytes())));
    }
}

/// Builds a `PROPFIND` body requesting the given properties.
#[must_use]
pub fn propfind(props: &[QName]) -> String {
    let mut body = format!("{XML_DECLARATION}\n<propfind {ROOT_NAMESPACES}>");
    write_prop_request(&mut body, props);
    body.push_str("</propfind>");
    body
}

/// Builds a `PROPFIND` body requesting every property the server knows about (`<allprop/>`).
#[must_use]
pub fn propfind_allprop() -> String {
    format!("{XML_DECLARATION}\n<propfind {ROOT_NAMESPACES}><allprop/></propfind>")
}

/// Builds an extended `MKCOL` body (RFC 5689) setting additional resource types on the new
/// collection. `DAV:collection` is implied and always present; `resourcetypes` MUST NOT repeat it.
#[must_use]
pub fn mkcol(resourcetypes: &[QName]) -> String {
    let mut body = format!("{XML_DECLARATION}\n<mkcol {ROOT_NAMESPACES}><set><prop><resourcetype><collection/>");
    for name in resourcetypes {
        let _ = write!(body, "<{}/>", qualified(name));
    }
    body.push_str("</resourcetype></prop></set></mkcol>");
    body
}

/// One property mutation for a `PROPPATCH` request: set a value, or remove the property.
pub enum PropertyUpdate<'a> {
    Set(QName, &'a str),
    Remove(QName),
}

/// Builds a `PROPPATCH` body applying the given mutations, in order.
#[must_use]
pub fn propertyupdate(updates: &[PropertyUpdate]) -> String {
    let mut body = format!("{XML_DECLARATION}\n<propertyupdate {ROOT_NAMESPACES}>");
    for update in updates {
        match update {
            PropertyUpdate::Set(name, value) => {
                let _ = write!(
                    body,
                    "<set><prop><{tag}>{text}</{tag}></prop></set>",
                    tag = qualified(name),
                    text = escape_text(value)
                );
            }
            PropertyUpdate::Remove(name) => {
                let _ = write!(
                    body,
                    "<remove><prop><{tag}/></prop></remove>",
                    tag = qualified(name)
                );
            }
        }
    }
    body.push_str("</propertyupdate>");
    body
}

/// Builds a `calendar-multiget`/`addressbook-multiget` REPORT body.
#[must_use]
pub fn multiget(report_tag: &str, props: &[QName], hrefs: &[&str]) -> String {
    let mut body = format!("{XML_DECLARATION}\n<C:{report_tag} {ROOT_NAMESPACES}>");
    write_prop_request(&mut body, props);
    write_hrefs(&mut body, hrefs);
    let _ = write!(body, "</C:{report_tag}>");
    body
}

/// A CalDAV `time-range` filter, as used inside `comp-filter` (RFC 4791 §9.9).
#[derive(Debug, Clone)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// A single CalDAV `comp-filter` element, possibly nested (RFC 4791 §9.7).
#[derive(Debug, Clone)]
pub struct CompFilter {
    pub name: String,
    pub time_range: Option<TimeRange>,
    pub children: Vec<CompFilter>,
}

fn write_comp_filter(body: &mut String, filter: &CompFilter) {
    let _ = write!(body, "<C:comp-filter name=\"{}\">", escape_text(&filter.name));
    if let Some(range) = &filter.time_range {
        body.push_str("<C:time-range");
        if let Some(start) = &range.start {
            let _ = write!(body, " start=\"{}\"", escape_text(start));
        }
        if let Some(end) = &range.end {
            let _ = write!(body, " end=\"{}\"", escape_text(end));
        }
        body.push_str("/>");
    }
    for child in &filter.children {
        write_comp_filter(body, child);
    }
    body.push_str("</C:comp-filter>");
}

/// Builds a `calendar-query` REPORT body (RFC 4791 §7.8).
#[must_use]
pub fn calendar_query(props: &[QName], filter: &CompFilter) -> String {
    let mut body = format!("{XML_DECLARATION}\n<C:calendar-query {ROOT_NAMESPACES}>");
    write_prop_request(&mut body, props);
    body.push_str("<C:filter>");
    write_comp_filter(&mut body, filter);
    body.push_str("</C:filter></C:calendar-query>");
    body
}

/// Builds a `calendar-multiget` REPORT body (RFC 4791 §7.9).
#[must_use]
pub fn calendar_multiget(props: &[QName], hrefs: &[&str]) -> String {
    multiget("calendar-multiget", props, hrefs)
}

/// Builds an `addressbook-multiget` REPORT body (RFC 6352 §8.7).
#[must_use]
pub fn addressbook_multiget(props: &[QName], hrefs: &[&str]) -> String {
    multiget("addressbook-multiget", props, hrefs)
}

/// A single `prop-filter` text-match clause for an `addressbook-query` (RFC 6352 §10.5).
#[derive(Debug, Clone)]
pub struct PropFilter {
    pub name: String,
    pub text_match: Option<String>,
}

/// Builds an `addressbook-query` REPORT body (RFC 6352 §10.3).
#[must_use]
pub fn addressbook_query(props: &[QName], filters: &[PropFilter]) -> String {
    let mut body = format!("{XML_DECLARATION}\n<CARD:addressbook-query {ROOT_NAMESPACES}>");
    write_prop_request(&mut body, props);
    body.push_str("<CARD:filter>");
    for filter in filters {
        let _ = write!(body, "<CARD:prop-filter name=\"{}\">", escape_text(&filter.name));
        if let Some(text) = &filter.text_match {
            let _ = write!(body, "<CARD:text-match>{}</CARD:text-match>", escape_text(text));
        }
        body.push_str("</CARD:prop-filter>");
    }
    body.push_str("</CARD:filter></CARD:addressbook-query>");
    body
}

/// Builds a `sync-collection` REPORT body (RFC 6578 §3.2).
#[must_use]
pub fn sync_collection(props: &[QName], sync_token: Option<&str>, limit: Option<u32>) -> String {
    let mut body = format!("{XML_DECLARATION}\n<sync-collection {ROOT_NAMESPACES}>");
    let _ = write!(body, "<sync-token>{}</sync-token>", escape_text(sync_token.unwrap_or_default()));
    body.push_str("<sync-level>1</sync-level>");
    if let Some(limit) = limit {
        let _ = write!(body, "<limit><nresults>{limit}</nresults></limit>");
    }
    write_prop_request(&mut body, props);
    body.push_str("</sync-collection>");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{DISPLAY_NAME, GETETAG};

    #[test]
    fn test_propfind_lists_requested_props() {
        let body = propfind(&[DISPLAY_NAME, GETETAG]);
        assert!(body.contains("<propfind xmlns=\"DAV:\""));
        assert!(body.contains("<displayname/>"));
        assert!(body.contains("<getetag/>"));
    }

    #[test]
    fn test_propertyupdate_set_and_remove() {
        let body = propertyupdate(&[
            PropertyUpdate::Set(DISPLAY_NAME, "New name"),
            PropertyUpdate::Remove(GETETAG),
        ]);
        assert!(body.contains("<set><prop><displayname>New name</displayname></prop></set>"));
        assert!(body.contains("<remove><prop><getetag/></prop></remove>"));
    }

    #[test]
    fn test_propertyupdate_escapes_value() {
        let body = propertyupdate(&[PropertyUpdate::Set(DISPLAY_NAME, "Tom & Jerry")]);
        assert!(body.contains("Tom &amp; Jerry"));
    }

    #[test]
    fn test_calendar_multiget_quotes_hrefs() {
        let body = calendar_multiget(&[GETETAG], &["/dav/cal/event one.ics"]);
        assert!(body.contains("<C:calendar-multiget"));
        assert!(body.contains("<href>/dav/cal/event%20one.ics</href>"));
    }

    #[test]
    fn test_calendar_query_with_time_range() {
        let filter = CompFilter {
            name: "VCALENDAR".to_string(),
            time_range: None,
            children: vec![CompFilter {
                name: "VEVENT".to_string(),
                time_range: Some(TimeRange {
                    start: Some("20230101T000000Z".to_string()),
                    end: Some("20230201T000000Z".to_string()),
                }),
                children: vec![],
            }],
        };
        let body = calendar_query(&[GETETAG], &filter);
        assert!(body.contains(r#"<C:comp-filter name="VCALENDAR">"#));
        assert!(body.contains(r#"<C:comp-filter name="VEVENT">"#));
        assert!(body.contains(r#"<C:time-range start="20230101T000000Z" end="20230201T000000Z"/>"#));
    }

    #[test]
    fn test_sync_collection_without_token_requests_full_sync() {
        let body = sync_collection(&[GETETAG], None, None);
        assert!(body.contains("<sync-token></sync-token>"));
        assert!(body.contains("<sync-level>1</sync-level>"));
        assert!(!body.contains("<limit>"));
    }

    #[test]
    fn test_sync_collection_with_token_and_limit() {
        let body = sync_collection(&[GETETAG], Some("opaque-token-1"), Some(50));
        assert!(body.contains("<sync-token>opaque-token-1</sync-token>"));
        assert!(body.contains("<limit><nresults>50</nresults></limit>"));
    }

    #[test]
    fn test_mkcol_lists_extra_resourcetype() {
        let body = mkcol(&[crate::names::CALENDAR]);
        assert!(body.contains("<mkcol "));
        assert!(body.contains("<collection/>"));
        assert!(body.contains("<C:calendar/>"));
    }

    #[test]
    fn test_addressbook_query_prop_filter() {
        let body = addressbook_query(
            &[GETETAG],
            &[PropFilter {
                name: "FN".to_string(),
                text_match: Some("Doe".to_string()),
            }],
        );
        assert!(body.contains(r#"<CARD:prop-filter name="FN">"#));
        assert!(body.contains("<CARD:text-match>Doe</CARD:text-match>"));
    }
}
