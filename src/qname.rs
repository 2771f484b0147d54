// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! Qualified XML element names.

use std::borrow::Cow;
use std::fmt;

/// A namespace URI and local name pair.
///
/// Identity is structural equality: two `QName`s are equal iff both fields match, regardless of
/// whatever prefix a document happened to bind to the namespace.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: Cow<'static, str>,
    local: Cow<'static, str>,
}

impl QName {
    /// Builds a `QName` from a namespace URI and a local name known at compile time.
    #[must_use]
    pub const fn from_static(namespace: &'static str, local: &'static str) -> QName {
        QName {
            namespace: Cow::Borrowed(namespace),
            local: Cow::Borrowed(local),
        }
    }

    /// Builds a `QName` from owned strings, for properties registered at runtime.
    #[must_use]
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> QName {
        QName {
            namespace: Cow::Owned(namespace.into()),
            local: Cow::Owned(local.into()),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Returns `true` if this name's namespace and local name match the given bytes, as produced
    /// by a `quick_xml` namespace resolution.
    #[must_use]
    pub(crate) fn matches(&self, namespace: &[u8], local: &[u8]) -> bool {
        self.namespace.as_bytes() == namespace && self.local.as_bytes() == local
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::QName;

    #[test]
    fn test_structural_equality() {
        let a = QName::from_static("DAV:", "displayname");
        let b = QName::new("DAV:", "displayname");
        assert_eq!(a, b);

        let c = QName::from_static("DAV:", "getetag");
        assert_ne!(a, c);
    }

    #[test]
    fn test_matches() {
        let name = QName::from_static("DAV:", "displayname");
        assert!(name.matches(b"DAV:", b"displayname"));
        assert!(!name.matches(b"DAV:", b"getetag"));
        assert!(!name.matches(b"urn:ietf:params:xml:ns:caldav", b"displayname"));
    }
}
