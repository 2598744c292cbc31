//! Splitting of `host[:port]` authority strings.
//!
//! Request targets carry their network address as a single `host[:port]`
//! token (the authority). This module splits that token into the host and
//! an optional numeric port so they can be recorded as the `server.address`
//! and `server.port` attributes.
//!
//! The splitter is deliberately forgiving: telemetry extraction must never
//! be the reason a request fails. Only two shapes are rejected outright —
//! an unterminated `[` and garbage after a bracketed host. A port segment
//! that is not all decimal digits simply yields no port.

use thiserror::Error;

/// Errors for authority strings that cannot be split at all.
///
/// Callers are expected to recover by omitting the server attributes; see
/// [`Values::extract_request`](crate::Values::extract_request).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The address opens a `[` bracket that is never closed.
    #[error("address has an unterminated '[' bracket")]
    UnterminatedBracket,

    /// More than one colon follows a bracketed host.
    #[error("address has too many colons")]
    TooManyColons,

    /// A bracketed host is followed by something other than `:port`.
    #[error("unexpected characters after bracketed host")]
    TrailingCharacters,
}

/// Splits a `host[:port]` authority into its host and optional port.
///
/// The host is returned as a slice of the input; nothing is allocated.
/// IPv6 literals with a port must be bracketed (`[addr]:port`); without a
/// port they may appear bracketed or bare (a bare multi-colon string is
/// treated as a host with no port, never as `host:port`). Zone identifiers
/// (`%eth0`, `%25eth0`) are kept verbatim in the host.
///
/// The port is `Some` exactly when a syntactically valid all-digit segment
/// follows the host. A non-numeric segment (`example.com:port`) yields
/// `None` rather than an error, and numeric values are passed through
/// without a 0..=65535 range check; range validation is a caller concern.
///
/// # Examples
///
/// ```
/// use otel_http_attrs::split_address;
///
/// assert_eq!(split_address("example.com:8080"), Ok(("example.com", Some(8080))));
/// assert_eq!(split_address("[fe80::1]:8080"), Ok(("fe80::1", Some(8080))));
/// assert_eq!(split_address("fe80::1"), Ok(("fe80::1", None)));
/// assert_eq!(split_address(":8080"), Ok(("", Some(8080))));
/// assert!(split_address("[fe80::1").is_err());
/// ```
pub fn split_address(address: &str) -> Result<(&str, Option<i64>), AddressError> {
    if let Some(bracketed) = address.strip_prefix('[') {
        let (host, rest) = bracketed
            .split_once(']')
            .ok_or(AddressError::UnterminatedBracket)?;
        let port = match rest.strip_prefix(':') {
            None if rest.is_empty() => None,
            None => return Err(AddressError::TrailingCharacters),
            Some(segment) if segment.contains(':') => {
                return Err(AddressError::TooManyColons);
            }
            Some(segment) => parse_port(segment),
        };
        return Ok((host, port));
    }

    match address.split_once(':') {
        None => Ok((address, None)),
        // A second colon means an unbracketed IPv6 literal, not host:port.
        Some((_, rest)) if rest.contains(':') => Ok((address, None)),
        Some((host, segment)) => Ok((host, parse_port(segment))),
    }
}

/// Parses an all-decimal-digit port segment, `None` for anything else.
fn parse_port(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
