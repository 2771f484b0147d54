// Copyright 2023 Hugo Osvaldo Barrera
//
// SPDX-License-Identifier: EUPL-1.2

//! XML primitives shared by the builder and the parsers: text escaping and href quoting.
//!
//! Pull-parsing itself is layered directly on `quick_xml::NsReader` by [`crate::property`],
//! [`crate::response`] and [`crate::multistatus`]; this module only holds the bits that don't
//! belong to any one of those (escaping rules are shared between the builder and property
//! factories, href quoting between the builder and the response parser).

use std::borrow::Cow;

use http::uri::PathAndQuery;
use http::Uri;
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters that are escaped for hrefs.
const DISALLOWED_FOR_HREF: &AsciiSet = &NON_ALPHANUMERIC.remove(b'/').remove(b'.');

/// Replaces characters that need to be escaped in XML text content.
///
/// `<` --> `&lt;`
/// `>` --> `&gt;`
/// `&` --> `&amp;`
///
/// This IS NOT usable in other contexts of XML encoding (e.g.: attribute values).
#[must_use]
pub fn escape_text(raw: &str) -> Cow<str> {
    // This function is strongly based on `escape_partial` from `quick-xml`:
    {
        // The MIT License (MIT)
        //
        // Copyright (c) 2016 Johann Tuffe
        //
        // Permission is hereby granted, free of charge, to any person obtaining a copy
        // of this software and associated documentation files (the "Software"), to deal
        // in the Software without restriction, including without limitation the rights
        // to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
        // copies of the Software, and to permit persons to whom the Software is
        // furnished to do so, subject to the following conditions:
        //
        //
        // The above copyright notice and this permission notice shall be included in
        // all copies or substantial portions of the Software.
        //
        //
        // THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
        // IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
        // FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.  IN NO EVENT SHALL THE
        // AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
        // LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
        // OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
        // THE SOFTWARE.
        let bytes = raw.as_bytes();
        let mut escaped = None;
        let mut iter = bytes.iter();
        let mut pos = 0;
        while let Some(i) = iter.position(|&b| matches!(b, b'<' | b'>' | b'&')) {
            let escaped = escaped.get_or_insert_with(|| Vec::with_capacity(raw.len()));
            let new_pos = pos + i;
            escaped.extend_from_slice(&bytes[pos..new_pos]);
            match bytes[new_pos] {
                b'<' => escaped.extend_from_slice(b"&lt;"),
                b'>' => escaped.extend_from_slice(b"&gt;"),
                b'&' => escaped.extend_from_slice(b"&amp;"),
                _ => unreachable!("Only '<', '>' and '&', are escaped"),
            }
            pos = new_pos + 1;
        }

        if let Some(mut escaped) = escaped {
            if let Some(raw) = bytes.get(pos..) {
                escaped.extend_from_slice(raw);
            }
            Cow::Owned(
                String::from_utf8(escaped).expect("manually escaped string must be valid utf-8"),
            )
        } else {
            Cow::Borrowed(raw)
        }
    }
    // End copied code.
}

/// URL-encodes an href.
///
/// The input parameter MUST NOT already be url-encoded.
#[must_use]
pub fn quote_href(href: &[u8]) -> Cow<str> {
    Cow::from(percent_encode(href, DISALLOWED_FOR_HREF))
}

/// Percent-decodes an href found in a `<D:href>` element's text.
///
/// # Errors
///
/// If the decoded bytes are not valid UTF-8.
pub fn unquote_href(href: &str) -> Result<Cow<str>, std::str::Utf8Error> {
    percent_decode_str(href).decode_utf8()
}

/// Resolves a `<D:href>` (or a redirect `Location`) against the base URL it is relative to: a
/// root-relative path (`/a/b`) keeps `base`'s scheme and authority; anything else is parsed as an
/// absolute URI in its own right, which may or may not share `base`'s origin.
///
/// # Errors
///
/// If `href` is neither a root-relative path nor a valid absolute URI.
pub(crate) fn resolve_href(base: &Uri, href: &str) -> Result<Uri, http::Error> {
    if href.starts_with('/') {
        let mut parts = base.clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::try_from(href).map_err(http::Error::from)?);
        Uri::from_parts(parts).map_err(http::Error::from)
    } else {
        Uri::try_from(href).map_err(http::Error::from)
    }
}

/// `true` if `resolved`'s scheme and authority differ from `base`'s — a response naming a
/// resource on a different origin than the one the request was made against.
#[must_use]
pub(crate) fn has_origin_mismatch(base: &Uri, resolved: &Uri) -> bool {
    base.scheme_str() != resolved.scheme_str() || base.authority() != resolved.authority()
}
