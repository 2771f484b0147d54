// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! The shared base behind [`crate::caldav::DavCalendar`] and
//! [`crate::carddav::DavAddressBook`]: a [`DavResource`] plus the one REPORT variant (RFC 6578
//! `sync-collection`) that isn't CalDAV- or CardDAV-specific.

use std::ops::{Deref, DerefMut};

use crate::builder;
use crate::error::DavError;
use crate::multistatus::MultistatusResult;
use crate::qname::QName;
use crate::resource::{methods, DavResource};
use crate::response::ResponseElement;

/// A resource known to be a WebDAV collection, adding collection-wide REPORT operations on top
/// of [`DavResource`]'s per-resource ones.
pub struct DavCollection {
    resource: DavResource,
}

impl DavCollection {
    #[must_use]
    pub fn new(resource: DavResource) -> DavCollection {
        DavCollection { resource }
    }

    #[must_use]
    pub fn into_resource(self) -> DavResource {
        self.resource
    }

    /// Enumerates changes since `sync_token` (RFC 6578 §3.2). Pass `None` to request a full
    /// initial sync. `callback` is invoked once per changed member, in document order; the
    /// returned [`MultistatusResult::sync_token`] MUST be persisted and passed as `sync_token` on
    /// the next call.
    ///
    /// # Errors
    ///
    /// If the transport fails, the server doesn't support `sync-collection`, or the response
    /// can't be parsed. A `507 Insufficient Storage`-equivalent "token too old" condition
    /// surfaces as a regular [`DavError`]; the caller must fall back to a full PROPFIND re-sync.
    pub fn sync_collection(
        &mut self,
        props: &[QName],
        sync_token: Option<&str>,
        limit: Option<u32>,
        callback: impl FnMut(ResponseElement),
    ) -> Result<MultistatusResult, DavError> {
        let body = builder::sync_collection(props, sync_token, limit);
        self.resource.execute_multistatus(methods::report(), body, None, callback)
    }
}

impl Deref for DavCollection {
    type Target = DavResource;

    fn deref(&self) -> &DavResource {
        &self.resource
    }
}

impl DerefMut for DavCollection {
    fn deref_mut(&mut self) -> &mut DavResource {
        &mut self.resource
    }
}
