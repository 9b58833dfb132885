//! Content-type classification predicates.
//!
//! Leaf helpers used by the assemblers and example extractors to pick a
//! preferred media type out of a `content` map. Matching is deliberately
//! loose (substring-based) because real-world definitions carry parameters
//! (`application/json; charset=utf-8`) and vendor suffixes
//! (`application/vnd.github+json`).

const JSON_MIMES: &[&str] = &[
    "application/json",
    "application/x-json",
    "text/json",
    "text/x-json",
    "+json",
];

const XML_MIMES: &[&str] = &[
    "application/xml",
    "application/xml-external-parsed-entity",
    "application/xml-dtd",
    "text/xml",
    "text/xml-external-parsed-entity",
    "+xml",
];

const MULTIPART_MIMES: &[&str] = &[
    "multipart/mixed",
    "multipart/related",
    "multipart/form-data",
    "multipart/alternative",
];

/// Is this content type JSON or a JSON-compatible vendor type?
pub fn is_json(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    JSON_MIMES.iter().any(|m| mime.contains(m))
}

/// Is this content type XML or an XML-compatible vendor type?
pub fn is_xml(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    XML_MIMES.iter().any(|m| mime.contains(m))
}

/// Is this content type `application/x-www-form-urlencoded`?
pub fn is_form_url_encoded(mime: &str) -> bool {
    mime.to_ascii_lowercase()
        .contains("application/x-www-form-urlencoded")
}

/// Is this content type one of the multipart families?
pub fn is_multipart(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    MULTIPART_MIMES.iter().any(|m| mime.contains(m))
}

/// Is this content type the `*/*` wildcard?
pub fn is_wildcard(mime: &str) -> bool {
    mime == "*/*"
}

// ===========================================================================
// Tests
// ===========================================================================
