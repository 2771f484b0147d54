// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! The property registry: a `QName -> decoder` table covering the WebDAV, CalDAV and CardDAV
//! properties in [`crate::names`], plus the ability for an application to register more.
//!
//! This finishes what the original `xml.rs` in the teacher crate started but never wired up: a
//! streaming decode keyed by qualified name instead of one hand-written `Parser` impl per call
//! site.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::ParseError;
use crate::names::*;
use crate::qname::QName;

/// The decoded flags of a `resourcetype` property (RFC 4918 §15.9, plus the CalDAV/CardDAV
/// extensions).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResourceType {
    pub is_collection: bool,
    pub is_principal: bool,
    pub is_calendar: bool,
    pub is_calendar_proxy_read: bool,
    pub is_calendar_proxy_write: bool,
    pub is_subscribed_calendar: bool,
    pub is_address_book: bool,
}

/// A decoded property value.
///
/// `Unknown` is the sentinel for any QName with no registered factory: it carries the name so a
/// caller can at least tell which property was skipped, without ever failing the enclosing parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    ResourceType(ResourceType),
    GetEtag(String),
    GetContentType(String),
    GetContentLength(Option<u64>),
    GetLastModified(Option<String>),
    CreationDate(Option<String>),
    DisplayName(String),
    CurrentUserPrincipal(Option<String>),
    CurrentUserPrivilegeSet(Vec<QName>),
    SupportedReportSet(Vec<QName>),
    Owner(Option<String>),
    GroupMembership(Vec<String>),
    QuotaAvailableBytes(Option<u64>),
    QuotaUsedBytes(Option<u64>),
    LockDiscovery(Vec<String>),
    CalendarHomeSet(Vec<String>),
    CalendarDescription(String),
    CalendarColour(String),
    CalendarTimezone(String),
    SupportedCalendarComponentSet(Vec<String>),
    CalendarData(String),
    MaxResourceSize(Option<u64>),
    ScheduleTag(String),
    AddressbookHomeSet(Vec<String>),
    AddressbookDescription(String),
    SupportedAddressData(Vec<String>),
    AddressData(String),
    Unknown(QName),
}

/// Decodes a property whose parser is positioned right after the element's `Start` event.
pub type PropertyFactory = fn(&mut NsReader<&[u8]>) -> Result<Property, ParseError>;

static REGISTRY: Lazy<RwLock<HashMap<QName, PropertyFactory>>> = Lazy::new(|| {
    let mut table: HashMap<QName, PropertyFactory> = HashMap::new();
    table.insert(RESOURCETYPE, decode_resourcetype);
    table.insert(GETETAG, decode_getetag);
    table.insert(GETCONTENTTYPE, decode_getcontenttype);
    table.insert(GETCONTENTLENGTH, decode_getcontentlength);
    table.insert(GETLASTMODIFIED, decode_getlastmodified);
    table.insert(CREATIONDATE, decode_creationdate);
    table.insert(DISPLAY_NAME, decode_displayname);
    table.insert(CURRENT_USER_PRINCIPAL, decode_current_user_principal);
    table.insert(CURRENT_USER_PRIVILEGE_SET, decode_current_user_privilege_set);
    table.insert(SUPPORTED_REPORT_SET, decode_supported_report_set);
    table.insert(OWNER, decode_owner);
    table.insert(GROUP_MEMBERSHIP, decode_group_membership);
    table.insert(QUOTA_AVAILABLE_BYTES, decode_quota_available_bytes);
    table.insert(QUOTA_USED_BYTES, decode_quota_used_bytes);
    table.insert(LOCKDISCOVERY, decode_lockdiscovery);
    table.insert(CALENDAR_HOME_SET, decode_calendar_home_set);
    table.insert(CALENDAR_DESCRIPTION, decode_calendar_description);
    table.insert(CALENDAR_COLOUR, decode_calendar_colour);
    table.insert(CALENDAR_TIMEZONE, decode_calendar_timezone);
    table.insert(
        SUPPORTED_CALENDAR_COMPONENT_SET,
        decode_supported_calendar_component_set,
    );
    table.insert(CALENDAR_DATA, decode_calendar_data);
    table.insert(MAX_RESOURCE_SIZE, decode_max_resource_size);
    table.insert(SCHEDULE_TAG, decode_schedule_tag);
    table.insert(ADDRESSBOOK_HOME_SET, decode_addressbook_home_set);
    table.insert(ADDRESSBOOK_DESCRIPTION, decode_addressbook_description);
    table.insert(SUPPORTED_ADDRESS_DATA, decode_supported_address_data);
    table.insert(ADDRESS_DATA, decode_address_data);
    RwLock::new(table)
});

fn registry_read() -> std::sync::RwLockReadGuard<'static, HashMap<QName, PropertyFactory>> {
    REGISTRY.read().unwrap_or_else(PoisonError::into_inner)
}

fn registry_write() -> std::sync::RwLockWriteGuard<'static, HashMap<QName, PropertyFactory>> {
    REGISTRY.write().unwrap_or_else(PoisonError::into_inner)
}

/// Registers a decoder for an application-defined property.
///
/// Overwrites any previously registered factory for the same name, including the built-in ones —
/// this lets an application override a default decoder if a server's dialect demands it.
pub fn register_property(name: QName, factory: PropertyFactory) {
    registry_write().insert(name, factory);
}

/// Decodes one property element, given a reader positioned right after its `Start` event.
///
/// Unregistered names decode to [`Property::Unknown`] after their subtree is skipped; this never
/// fails the enclosing parse.
pub(crate) fn decode(reader: &mut NsReader<&[u8]>, name: &QName) -> Result<Property, ParseError> {
    let factory = registry_read().get(name).copied();
    match factory {
        Some(factory) => factory(reader),
        None => {
            skip_subtree(reader, name)?;
            Ok(Property::Unknown(name.clone()))
        }
    }
}

/// Decodes a self-closed (`<prop/>`-shaped) property element, which carries no body to read.
pub(crate) fn decode_empty(name: &QName) -> Property {
    if *name == RESOURCETYPE {
        Property::ResourceType(ResourceType::default())
    } else if *name == GETETAG {
        Property::GetEtag(String::new())
    } else if *name == GETCONTENTTYPE {
        Property::GetContentType(String::new())
    } else if *name == DISPLAY_NAME {
        Property::DisplayName(String::new())
    } else if *name == CURRENT_USER_PRIVILEGE_SET {
        Property::CurrentUserPrivilegeSet(Vec::new())
    } else if *name == SUPPORTED_REPORT_SET {
        Property::SupportedReportSet(Vec::new())
    } else if *name == GROUP_MEMBERSHIP {
        Property::GroupMembership(Vec::new())
    } else if *name == LOCKDISCOVERY {
        Property::LockDiscovery(Vec::new())
    } else if *name == CALENDAR_HOME_SET {
        Property::CalendarHomeSet(Vec::new())
    } else if *name == ADDRESSBOOK_HOME_SET {
        Property::AddressbookHomeSet(Vec::new())
    } else {
        Property::Unknown(name.clone())
    }
}

pub(crate) fn unexpected_eof() -> ParseError {
    ParseError::Reader(quick_xml::Error::UnexpectedEof(String::new()))
}

/// Skips the remainder of an element's subtree, given a reader positioned right after its
/// `Start` event. Used for properties with no registered factory.
fn skip_subtree(reader: &mut NsReader<&[u8]>, name: &QName) -> Result<(), ParseError> {
    let mut depth: u32 = 0;
    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if depth == 0 && name.matches(ns.as_ref(), e.local_name().as_ref()) =>
            {
                return Ok(());
            }
            (_, Event::Start(_)) => depth += 1,
            (_, Event::End(_)) => depth = depth.saturating_sub(1),
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Reads the text (or CDATA) content of an element, given a reader positioned right after its
/// `Start` event, stopping at the matching `End`.
pub(crate) fn read_text(
    reader: &mut NsReader<&[u8]>,
    namespace: &[u8],
    local: &[u8],
) -> Result<Option<String>, ParseError> {
    let mut value = None;
    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == namespace && e.local_name().as_ref() == local =>
            {
                return Ok(value);
            }
            (_, Event::Text(text)) => value = Some(text.unescape()?.into_owned()),
            (_, Event::CData(cdata)) => {
                value = Some(std::str::from_utf8(&cdata.into_inner())?.to_string());
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn decode_text(
    reader: &mut NsReader<&[u8]>,
    namespace: &[u8],
    local: &[u8],
) -> Result<String, ParseError> {
    Ok(read_text(reader, namespace, local)?.unwrap_or_default())
}

/// Collects every `<D:href>` text value found anywhere inside the element, regardless of
/// nesting (e.g. `href-set` wrappers, `locktoken` wrappers), stopping at the matching `End`.
pub(crate) fn read_hrefs(
    reader: &mut NsReader<&[u8]>,
    namespace: &[u8],
    local: &[u8],
) -> Result<Vec<String>, ParseError> {
    let mut hrefs = Vec::new();
    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == namespace && e.local_name().as_ref() == local =>
            {
                return Ok(hrefs);
            }
            (ResolveResult::Bound(ns), Event::Start(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"href" =>
            {
                if let Some(href) = read_text(reader, DAV.as_bytes(), b"href")? {
                    hrefs.push(href);
                }
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Collects the qualified name of every self-closed leaf element found anywhere inside the
/// element (e.g. `<privilege><read/></privilege>` yields `{DAV:}read`), stopping at the matching
/// `End`. Used for privilege sets and report sets, whose interesting content is always a bare
/// element name nested a level or two down.
fn read_qname_leaves(
    reader: &mut NsReader<&[u8]>,
    namespace: &[u8],
    local: &[u8],
) -> Result<Vec<QName>, ParseError> {
    let mut names = Vec::new();
    let mut depth: u32 = 0;
    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if depth == 0 && ns.as_ref() == namespace && e.local_name().as_ref() == local =>
            {
                return Ok(names);
            }
            (_, Event::Start(_)) => depth += 1,
            (_, Event::End(_)) => depth = depth.saturating_sub(1),
            (ResolveResult::Bound(ns), Event::Empty(e)) => {
                names.push(QName::new(
                    String::from_utf8_lossy(ns.as_ref()).into_owned(),
                    String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ));
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn find_attr(element: &BytesStart, key: &[u8]) -> Option<String> {
    element.attributes().find_map(|attr| {
        let attr = attr.ok()?;
        if attr.key.as_ref() == key {
            attr.unescape_value().ok().map(std::borrow::Cow::into_owned)
        } else {
            None
        }
    })
}

/// An etag is delivered as a quoted string, optionally prefixed with a weak marker; callers
/// generally want the bare value. See RFC 7232 §2.3.
fn strip_weak_and_quotes(raw: &str) -> String {
    raw.strip_prefix("W/").unwrap_or(raw).trim_matches('"').to_string()
}

/// `getlastmodified` is an HTTP-date, i.e. the RFC 1123 form of RFC 2822; a malformed date
/// decodes to `None` rather than failing the parse, per the registry's "absent on failure"
/// convention.
fn parse_rfc1123_date(raw: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|_| raw.trim().to_string())
}

/// `creationdate` is an ISO 8601 / RFC 3339 date-time; a malformed date decodes to `None` rather
/// than failing the parse, per the registry's "absent on failure" convention.
fn parse_iso8601_date(raw: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|_| raw.trim().to_string())
}

fn decode_resourcetype(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let mut resource_type = ResourceType::default();
    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == DAV.as_bytes() && e.local_name().as_ref() == b"resourcetype" =>
            {
                break;
            }
            (ResolveResult::Bound(ns), Event::Empty(e)) => {
                match (ns.as_ref(), e.local_name().as_ref()) {
                    (n, b"collection") if n == DAV.as_bytes() => resource_type.is_collection = true,
                    (n, b"principal") if n == DAV.as_bytes() => resource_type.is_principal = true,
                    (n, b"calendar") if n == CALDAV.as_bytes() => resource_type.is_calendar = true,
                    (n, b"calendar-proxy-read") if n == CALDAV.as_bytes() => {
                        resource_type.is_calendar_proxy_read = true;
                    }
                    (n, b"calendar-proxy-write") if n == CALDAV.as_bytes() => {
                        resource_type.is_calendar_proxy_write = true;
                    }
                    (n, b"subscribed") if n == CALDAV.as_bytes() => {
                        resource_type.is_subscribed_calendar = true;
                    }
                    (n, b"addressbook") if n == CARDDAV.as_bytes() => {
                        resource_type.is_address_book = true;
                    }
                    _ => {}
                }
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }
    Ok(Property::ResourceType(resource_type))
}

fn decode_getetag(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let raw = decode_text(reader, DAV.as_bytes(), b"getetag")?;
    Ok(Property::GetEtag(strip_weak_and_quotes(&raw)))
}

fn decode_getcontenttype(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    Ok(Property::GetContentType(decode_text(
        reader,
        DAV.as_bytes(),
        b"getcontenttype",
    )?))
}

fn decode_getcontentlength(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let raw = read_text(reader, DAV.as_bytes(), b"getcontentlength")?;
    Ok(Property::GetContentLength(raw.and_then(|t| t.parse().ok())))
}

fn decode_getlastmodified(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let raw = read_text(reader, DAV.as_bytes(), b"getlastmodified")?;
    Ok(Property::GetLastModified(
        raw.as_deref().and_then(parse_rfc1123_date),
    ))
}

fn decode_creationdate(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let raw = read_text(reader, DAV.as_bytes(), b"creationdate")?;
    Ok(Property::CreationDate(raw.as_deref().and_then(parse_iso8601_date)))
}

fn decode_displayname(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    Ok(Property::DisplayName(decode_text(
        reader,
        DAV.as_bytes(),
        b"displayname",
    )?))
}

fn decode_current_user_principal(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let hrefs = read_hrefs(reader, DAV.as_bytes(), b"current-user-principal")?;
    Ok(Property::CurrentUserPrincipal(hrefs.into_iter().next()))
}

fn decode_current_user_privilege_set(
    reader: &mut NsReader<&[u8]>,
) -> Result<Property, ParseError> {
    let names = read_qname_leaves(reader, DAV.as_bytes(), b"current-user-privilege-set")?;
    Ok(Property::CurrentUserPrivilegeSet(names))
}

fn decode_supported_report_set(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let names = read_qname_leaves(reader, DAV.as_bytes(), b"supported-report-set")?;
    Ok(Property::SupportedReportSet(names))
}

fn decode_owner(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let hrefs = read_hrefs(reader, DAV.as_bytes(), b"owner")?;
    Ok(Property::Owner(hrefs.into_iter().next()))
}

fn decode_group_membership(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let hrefs = read_hrefs(reader, DAV.as_bytes(), b"group-membership")?;
    Ok(Property::GroupMembership(hrefs))
}

fn decode_quota_available_bytes(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let raw = read_text(reader, DAV.as_bytes(), b"quota-available-bytes")?;
    Ok(Property::QuotaAvailableBytes(raw.and_then(|t| t.parse().ok())))
}

fn decode_quota_used_bytes(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let raw = read_text(reader, DAV.as_bytes(), b"quota-used-bytes")?;
    Ok(Property::QuotaUsedBytes(raw.and_then(|t| t.parse().ok())))
}

fn decode_lockdiscovery(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let hrefs = read_hrefs(reader, DAV.as_bytes(), b"lockdiscovery")?;
    Ok(Property::LockDiscovery(hrefs))
}

fn decode_calendar_home_set(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let hrefs = read_hrefs(reader, CALDAV.as_bytes(), b"calendar-home-set")?;
    Ok(Property::CalendarHomeSet(hrefs))
}

fn decode_calendar_description(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    Ok(Property::CalendarDescription(decode_text(
        reader,
        CALDAV.as_bytes(),
        b"calendar-description",
    )?))
}

fn decode_calendar_colour(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    // Some servers (e.g. cyrus-imapd) emit this element unprefixed rather than bound to the
    // apple ical namespace; the text content is read regardless of which namespace matched.
    Ok(Property::CalendarColour(decode_text(
        reader,
        APPLE_ICAL.as_bytes(),
        b"calendar-color",
    )?))
}

fn decode_calendar_timezone(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    Ok(Property::CalendarTimezone(decode_text(
        reader,
        CALDAV.as_bytes(),
        b"calendar-timezone",
    )?))
}

fn decode_supported_calendar_component_set(
    reader: &mut NsReader<&[u8]>,
) -> Result<Property, ParseError> {
    let mut components = Vec::new();
    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == CALDAV.as_bytes()
                    && e.local_name().as_ref() == b"supported-calendar-component-set" =>
            {
                break;
            }
            (ResolveResult::Bound(ns), Event::Empty(e))
                if ns.as_ref() == CALDAV.as_bytes() && e.local_name().as_ref() == b"comp" =>
            {
                if let Some(name) = find_attr(&e, b"name") {
                    components.push(name);
                }
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }
    Ok(Property::SupportedCalendarComponentSet(components))
}

fn decode_calendar_data(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    Ok(Property::CalendarData(decode_text(
        reader,
        CALDAV.as_bytes(),
        b"calendar-data",
    )?))
}

fn decode_max_resource_size(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let raw = read_text(reader, CALDAV.as_bytes(), b"max-resource-size")?;
    Ok(Property::MaxResourceSize(raw.and_then(|t| t.parse().ok())))
}

fn decode_schedule_tag(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    Ok(Property::ScheduleTag(decode_text(
        reader,
        CALDAV.as_bytes(),
        b"schedule-tag",
    )?))
}

fn decode_addressbook_home_set(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let hrefs = read_hrefs(reader, CARDDAV.as_bytes(), b"addressbook-home-set")?;
    Ok(Property::AddressbookHomeSet(hrefs))
}

fn decode_addressbook_description(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    Ok(Property::AddressbookDescription(decode_text(
        reader,
        CARDDAV.as_bytes(),
        b"addressbook-description",
    )?))
}

fn decode_supported_address_data(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    let mut types = Vec::new();
    loop {
        match reader.read_resolved_event()? {
            (ResolveResult::Bound(ns), Event::End(e))
                if ns.as_ref() == CARDDAV.as_bytes()
                    && e.local_name().as_ref() == b"supported-address-data" =>
            {
                break;
            }
            (ResolveResult::Bound(ns), Event::Empty(e))
                if ns.as_ref() == CARDDAV.as_bytes()
                    && e.local_name().as_ref() == b"address-data-type" =>
            {
                if let Some(content_type) = find_attr(&e, b"content-type") {
                    types.push(content_type);
                }
            }
            (_, Event::Eof) => return Err(unexpected_eof()),
            _ => {}
        }
    }
    Ok(Property::SupportedAddressData(types))
}

fn decode_address_data(reader: &mut NsReader<&[u8]>) -> Result<Property, ParseError> {
    Ok(Property::AddressData(decode_text(
        reader,
        CARDDAV.as_bytes(),
        b"address-data",
    )?))
}
