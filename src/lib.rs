#![warn(clippy::pedantic)]

//! A blocking WebDAV/CalDAV/CardDAV client library.
//!
//! [`DavResource`](resource::DavResource) is the entry point: it wraps a single location behind a
//! caller-supplied [`Transport`](transport::Transport) and exposes the WebDAV verb set (PROPFIND,
//! PROPPATCH, MKCOL, GET, PUT, DELETE, COPY, MOVE, OPTIONS, SEARCH), including redirect handling.
//!
//! [`DavCollection`](collection::DavCollection) layers `sync-collection` on top of a resource
//! known to be a collection; [`DavCalendar`](caldav::DavCalendar) and
//! [`DavAddressBook`](carddav::DavAddressBook) add the CalDAV and CardDAV REPORT variants
//! respectively. All three `Deref`/`DerefMut` down to the type underneath, so the whole verb set
//! stays reachable regardless of which level a caller is holding.

pub mod builder;
pub mod caldav;
pub mod carddav;
pub mod collection;
pub mod error;
pub mod multistatus;
pub mod names;
pub mod property;
pub mod qname;
pub mod resource;
pub mod response;
pub mod transport;
pub mod xmlutils;

pub use caldav::DavCalendar;
pub use carddav::DavAddressBook;
pub use collection::DavCollection;
pub use error::DavError;
pub use resource::{DavResource, Depth, RedirectPolicy};
pub use transport::{Transport, TransportError, TransportRequest, TransportResponse};
