//! HTTP method normalization.
//!
//! The `http.request.method` attribute must stay low-cardinality, so the
//! method token is folded into a closed set of canonical spellings. Tokens
//! outside the set collapse to the `_OTHER` sentinel while the verbatim
//! token is kept for diagnostics (`http.request.method_original`).

use std::fmt::{self, Display};

/// Sentinel reported as the canonical method for unrecognized tokens.
pub const OTHER_METHOD: &str = "_OTHER";

/// An HTTP request method, normalized to its canonical spelling.
///
/// Matching is ASCII-case-insensitive, so `get`, `Get` and `gEt` all map
/// to [`HttpMethod::Get`]. Anything outside the known set becomes
/// [`HttpMethod::Other`] carrying the raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Connect,
    Trace,
    Patch,
    /// Unrecognized method; the verbatim token is preserved.
    Other(String),
}

impl HttpMethod {
    /// Normalizes a raw method token.
    ///
    /// Total over all inputs; the empty string is `Other("")`.
    pub fn normalize(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("GET") {
            Self::Get
        } else if raw.eq_ignore_ascii_case("POST") {
            Self::Post
        } else if raw.eq_ignore_ascii_case("PUT") {
            Self::Put
        } else if raw.eq_ignore_ascii_case("DELETE") {
            Self::Delete
        } else if raw.eq_ignore_ascii_case("HEAD") {
            Self::Head
        } else if raw.eq_ignore_ascii_case("OPTIONS") {
            Self::Options
        } else if raw.eq_ignore_ascii_case("CONNECT") {
            Self::Connect
        } else if raw.eq_ignore_ascii_case("TRACE") {
            Self::Trace
        } else if raw.eq_ignore_ascii_case("PATCH") {
            Self::Patch
        } else {
            Self::Other(raw.to_owned())
        }
    }

    /// The canonical upper-case spelling, or [`OTHER_METHOD`] for
    /// unrecognized methods. The input casing never leaks through here.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Patch => "PATCH",
            Self::Other(_) => OTHER_METHOD,
        }
    }

    /// The verbatim token, present only when the method is unrecognized.
    pub fn original(&self) -> Option<&str> {
        match self {
            Self::Other(raw) => Some(raw),
            _ => None,
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
