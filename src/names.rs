// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! Names of WebDAV, CalDAV and CardDAV elements and properties.

use crate::qname::QName;

/// Namespace for properties defined in the WebDav specifications.
pub const DAV: &str = "DAV:";
/// Namespace for properties defined in the CalDav specifications.
pub const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";
/// Namespace for properties defined in the CardDav specifications.
pub const CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";
/// Namespace for the non-standard but widely implemented `calendar-color` property.
pub const APPLE_ICAL: &str = "http://apple.com/ns/ical/";

// Structural elements (not properties, but still addressed by QName while parsing).
pub const HREF: QName = QName::from_static(DAV, "href");
pub const RESPONSE: QName = QName::from_static(DAV, "response");
pub const STATUS: QName = QName::from_static(DAV, "status");
pub const PROPSTAT: QName = QName::from_static(DAV, "propstat");
pub const PROP: QName = QName::from_static(DAV, "prop");
pub const MULTISTATUS: QName = QName::from_static(DAV, "multistatus");
pub const ERROR: QName = QName::from_static(DAV, "error");
pub const RESPONSEDESCRIPTION: QName = QName::from_static(DAV, "responsedescription");
pub const LOCATION: QName = QName::from_static(DAV, "location");
pub const SYNC_TOKEN: QName = QName::from_static(DAV, "sync-token");
pub const COLLECTION: QName = QName::from_static(DAV, "collection");
pub const PRIVILEGE: QName = QName::from_static(DAV, "privilege");
pub const REPORT: QName = QName::from_static(DAV, "report");
pub const ACTIVELOCK: QName = QName::from_static(DAV, "activelock");

// WebDAV core properties (spec.md section 4.6).
pub const RESOURCETYPE: QName = QName::from_static(DAV, "resourcetype");
pub const GETETAG: QName = QName::from_static(DAV, "getetag");
pub const GETCONTENTTYPE: QName = QName::from_static(DAV, "getcontenttype");
pub const GETCONTENTLENGTH: QName = QName::from_static(DAV, "getcontentlength");
pub const GETLASTMODIFIED: QName = QName::from_static(DAV, "getlastmodified");
pub const CREATIONDATE: QName = QName::from_static(DAV, "creationdate");
pub const DISPLAY_NAME: QName = QName::from_static(DAV, "displayname");
pub const CURRENT_USER_PRINCIPAL: QName = QName::from_static(DAV, "current-user-principal");
pub const CURRENT_USER_PRIVILEGE_SET: QName =
    QName::from_static(DAV, "current-user-privilege-set");
pub const SUPPORTED_REPORT_SET: QName = QName::from_static(DAV, "supported-report-set");
pub const OWNER: QName = QName::from_static(DAV, "owner");
pub const GROUP_MEMBERSHIP: QName = QName::from_static(DAV, "group-membership");
pub const QUOTA_AVAILABLE_BYTES: QName = QName::from_static(DAV, "quota-available-bytes");
pub const QUOTA_USED_BYTES: QName = QName::from_static(DAV, "quota-used-bytes");
pub const LOCKDISCOVERY: QName = QName::from_static(DAV, "lockdiscovery");
pub const SYNC_COLLECTION: QName = QName::from_static(DAV, "sync-collection");

// Resource types recognised inside a `resourcetype` property.
pub const PRINCIPAL: QName = QName::from_static(DAV, "principal");
pub const CALENDAR_PROXY_READ: QName = QName::from_static(CALDAV, "calendar-proxy-read");
pub const CALENDAR_PROXY_WRITE: QName = QName::from_static(CALDAV, "calendar-proxy-write");
pub const SUBSCRIBED: QName = QName::from_static(CALDAV, "subscribed");

// CalDAV properties.
pub const CALENDAR: QName = QName::from_static(CALDAV, "calendar");
/// Defined in <https://www.rfc-editor.org/rfc/rfc4791#section-6.2.1>
pub const CALENDAR_HOME_SET: QName = QName::from_static(CALDAV, "calendar-home-set");
pub const CALENDAR_DESCRIPTION: QName = QName::from_static(CALDAV, "calendar-description");
pub const CALENDAR_COLOUR: QName = QName::from_static(APPLE_ICAL, "calendar-color");
pub const CALENDAR_TIMEZONE: QName = QName::from_static(CALDAV, "calendar-timezone");
pub const SUPPORTED_CALENDAR_COMPONENT_SET: QName =
    QName::from_static(CALDAV, "supported-calendar-component-set");
pub const CALENDAR_DATA: QName = QName::from_static(CALDAV, "calendar-data");
pub const MAX_RESOURCE_SIZE: QName = QName::from_static(CALDAV, "max-resource-size");
pub const SCHEDULE_TAG: QName = QName::from_static(CALDAV, "schedule-tag");
pub const CALENDAR_QUERY: QName = QName::from_static(CALDAV, "calendar-query");
pub const CALENDAR_MULTIGET: QName = QName::from_static(CALDAV, "calendar-multiget");
pub const COMP_FILTER: QName = QName::from_static(CALDAV, "comp-filter");
pub const TIME_RANGE: QName = QName::from_static(CALDAV, "time-range");

// CardDAV properties.
pub const ADDRESSBOOK: QName = QName::from_static(CARDDAV, "addressbook");
pub const ADDRESSBOOK_HOME_SET: QName = QName::from_static(CARDDAV, "addressbook-home-set");
pub const ADDRESSBOOK_DESCRIPTION: QName = QName::from_static(CARDDAV, "addressbook-description");
pub const SUPPORTED_ADDRESS_DATA: QName = QName::from_static(CARDDAV, "supported-address-data");
pub const ADDRESS_DATA: QName = QName::from_static(CARDDAV, "address-data");
pub const ADDRESSBOOK_QUERY: QName = QName::from_static(CARDDAV, "addressbook-query");
pub const ADDRESSBOOK_MULTIGET: QName = QName::from_static(CARDDAV, "addressbook-multiget");
