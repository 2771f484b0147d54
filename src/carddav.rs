// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! CardDAV (RFC 6352) collection operations layered on top of [`DavCollection`]:
//! `addressbook-query` (property text-match filtering) and `addressbook-multiget`.

use std::ops::{Deref, DerefMut};

use crate::builder::{self, PropFilter};
use crate::collection::DavCollection;
use crate::error::DavError;
use crate::multistatus::MultistatusResult;
use crate::qname::QName;
use crate::resource::methods;
use crate::response::ResponseElement;

/// A collection known to be a CardDAV address book, adding the
/// `addressbook-query`/`addressbook-multiget` REPORT variants on top of [`DavCollection`]'s
/// `sync-collection`.
pub struct DavAddressBook {
    collection: DavCollection,
}

impl DavAddressBook {
    #[must_use]
    pub fn new(collection: DavCollection) -> DavAddressBook {
        DavAddressBook { collection }
    }

    #[must_use]
    pub fn into_collection(self) -> DavCollection {
        self.collection
    }

    /// Sends an `addressbook-query` REPORT (RFC 6352 §10.3), filtering members by one or more
    /// `prop-filter` text-match clauses.
    ///
    /// # Errors
    ///
    /// If the transport fails or the response can't be parsed as Multi-Status.
    pub fn addressbook_query(
        &mut self,
        props: &[QName],
        filters: &[PropFilter],
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        let body = builder::addressbook_query(props, filters);
        self.collection.execute_multistatus(methods::report(), body, None, callback)
    }

    /// Sends an `addressbook-multiget` REPORT (RFC 6352 §8.7) fetching specific member resources
    /// by href.
    ///
    /// # Errors
    ///
    /// Same as [`DavAddressBook::addressbook_query`].
    pub fn addressbook_multiget(
        &mut self,
        props: &[QName],
        hrefs: &[&str],
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        let body = builder::addressbook_multiget(props, hrefs);
        self.collection.execute_multistatus(methods::report(), body, None, callback)
    }
}

impl Deref for DavAddressBook {
    type Target = DavCollection;

    fn deref(&self) -> &DavCollection {
        &self.collection
    }
}

impl DerefMut for DavAddressBook {
    fn deref_mut(&mut self) -> &mut DavCollection {
        &mut self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{ADDRESS_DATA, GETETAG};
    use crate::resource::DavResource;
    use crate::transport::mock::MockTransport;
    use http::{HeaderMap, HeaderValue, StatusCode};

    fn addressbook(body: &[u8]) -> DavAddressBook {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        let resource = DavResource::new(
            Box::new(MockTransport::new(vec![(StatusCode::MULTI_STATUS, headers, body.to_vec())])),
            "https://example.com/dav/contacts/personal/".parse().unwrap(),
        );
        DavAddressBook::new(DavCollection::new(resource))
    }

    #[test]
    fn test_addressbook_query_filters_by_prop() {
        let body = br#"<?xml version="1.0"?>
        <multistatus xmlns="DAV:">
            <response>
                <href>/dav/contacts/personal/jdoe.vcf</href>
                <propstat>
                    <prop><getetag>"1"</getetag></prop>
                    <status>HTTP/1.1 200 OK</status>
                </propstat>
            </response>
        </multistatus>"#;
        let mut addressbook = addressbook(body);

        let mut hrefs = Vec::new();
        addressbook
            .addressbook_query(
                &[GETETAG],
                &[PropFilter {
                    name: "FN".to_string(),
                    text_match: Some("Doe".to_string()),
                }],
                |element| hrefs.push(element.href),
            )
            .unwrap();

        assert_eq!(
            hrefs,
            vec!["https://example.com/dav/contacts/personal/jdoe.vcf".to_string()]
        );
    }

    #[test]
    fn test_addressbook_multiget_fetches_address_data() {
        let body = br#"<?xml version="1.0"?>
        <multistatus xmlns="DAV:" xmlns:CARD="urn:ietf:params:xml:ns:carddav">
            <response>
                <href>/dav/contacts/personal/jdoe.vcf</href>
                <propstat>
                    <prop><CARD:address-data>BEGIN:VCARD\nEND:VCARD</CARD:address-data></prop>
                    <status>HTTP/1.1 200 OK</status>
                </propstat>
            </response>
        </multistatus>"#;
        let mut addressbook = addressbook(body);

        let mut seen = Vec::new();
        addressbook
            .addressbook_multiget(
                &[ADDRESS_DATA],
                &["/dav/contacts/personal/jdoe.vcf"],
                |element| seen.push(element),
            )
            .unwrap();

        assert_eq!(seen.len(), 1);
    }
}
