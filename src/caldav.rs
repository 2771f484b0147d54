// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! CalDAV (RFC 4791) collection operations layered on top of [`DavCollection`]:
//! `calendar-query` (time-range and component-type filtering) and `calendar-multiget`.

use std::ops::{Deref, DerefMut};

use crate::builder::{self, CompFilter, TimeRange};
use crate::collection::DavCollection;
use crate::error::DavError;
use crate::multistatus::MultistatusResult;
use crate::qname::QName;
use crate::resource::methods;
use crate::response::ResponseElement;

/// A collection known to be a CalDAV calendar, adding the `calendar-query`/`calendar-multiget`
/// REPORT variants on top of [`DavCollection`]'s `sync-collection`.
pub struct DavCalendar {
    collection: DavCollection,
}

impl DavCalendar {
    #[must_use]
    pub fn new(collection: DavCollection) -> DavCalendar {
        DavCalendar { collection }
    }

    #[must_use]
    pub fn into_collection(self) -> DavCollection {
        self.collection
    }

    /// Sends a `calendar-query` REPORT (RFC 4791 §7.8), filtering by component type and
    /// optionally a time range.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response can't be parsed as Multi-Status.
    pub fn calendar_query(
        &mut self,
        props: &[QName],
        filter: &CompFilter,
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        let body = builder::calendar_query(props, filter);
        self.collection.execute_multistatus(methods::report(), body, None, callback)
    }

    /// Sends a `calendar-query` filtering a single component type (e.g. `VEVENT`) to a time
    /// range, the common case for incremental calendar fetches.
    ///
    /// # Errors
    ///
    /// Same as [`DavCalendar::calendar_query`].
    pub fn calendar_query_time_range(
        &mut self,
        props: &[QName],
        component: &str,
        time_range: TimeRange,
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        let filter = CompFilter {
            name: "VCALENDAR".to_string(),
            time_range: None,
            children: vec![CompFilter {
                name: component.to_string(),
                time_range: Some(time_range),
                children: vec![],
            }],
        };
        self.calendar_query(props, &filter, callback)
    }

    /// Sends a `calendar-multiget` REPORT (RFC 4791 §7.9) fetching specific member resources by
    /// href.
    ///
    /// # Errors
    ///
    /// Same as [`DavCalendar::calendar_query`].
    pub fn calendar_multiget(
        &mut self,
        props: &[QName],
        hrefs: &[&str],
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        let body = builder::calendar_multiget(props, hrefs);
        self.collection.execute_multistatus(methods::report(), body, None, callback)
    }
}

impl Deref for DavCalendar {
    type Target = DavCollection;

    fn deref(&self) -> &DavCollection {
        &self.collection
    }
}

impl DerefMut for DavCalendar {
    fn deref_mut(&mut self) -> &mut DavCollection {
        &mut self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{CALENDAR_DATA, GETETAG};
    use crate::resource::DavResource;
    use crate::transport::mock::MockTransport;
    use http::{HeaderMap, HeaderValue, StatusCode};

    fn calendar(body: &[u8]) -> DavCalendar {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        let resource = DavResource::new(
            Box::new(MockTransport::new(vec![(StatusCode::MULTI_STATUS, headers, body.to_vec())])),
            "https://example.com/dav/calendars/personal/".parse().unwrap(),
        );
        DavCalendar::new(DavCollection::new(resource))
    }

    #[test]
    fn test_calendar_query_time_range() {
        let body = br#"<?xml version="1.0"?>
        <multistatus xmlns="DAV:">
            <response>
                <href>/dav/calendars/personal/event1.ics</href>
                <propstat>
                    <prop><getetag>"1"</getetag></prop>
                    <status>HTTP/1.1 200 OK</status>
                </propstat>
            </response>
        </multistatus>"#;
        let mut calendar = calendar(body);

        let mut hrefs = Vec::new();
        calendar
            .calendar_query_time_range(
                &[GETETAG],
                "VEVENT",
                TimeRange {
                    start: Some("20230101T000000Z".to_string()),
                    end: Some("20230201T000000Z".to_string()),
                },
                |element| hrefs.push(element.href),
            )
            .unwrap();

        assert_eq!(
            hrefs,
            vec!["https://example.com/dav/calendars/personal/event1.ics".to_string()]
        );
    }

    #[test]
    fn test_calendar_multiget_fetches_calendar_data() {
        let body = br#"<?xml version="1.0"?>
        <multistatus xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
            <response>
                <href>/dav/calendars/personal/event1.ics</href>
                <propstat>
                    <prop><C:calendar-data>BEGIN:VCALENDAR\nEND:VCALENDAR</C:calendar-data></prop>
                    <status>HTTP/1.1 200 OK</status>
                </propstat>
            </response>
        </multistatus>"#;
        let mut calendar = calendar(body);

        let mut seen = Vec::new();
        calendar
            .calendar_multiget(&[CALENDAR_DATA], &["/dav/calendars/personal/event1.ics"], |element| {
                seen.push(element);
            })
            .unwrap();

        assert_eq!(seen.len(), 1);
    }
}
