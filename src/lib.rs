//! HTTP attribute extraction following the OpenTelemetry semantic
//! conventions.
//!
//! This crate derives the standard request/response attributes
//! (`http.request.method`, `url.scheme`, `server.address`, `server.port`,
//! `network.protocol.name`, `network.protocol.version`,
//! `http.response.status_code`, `http.route`) from an in-flight HTTP
//! request so they can be attached to a trace span and a metrics
//! recording. It performs no I/O and manages no spans; it is the
//! extraction layer a tracing middleware builds on.
//!
//! # Features
//!
//! - **Semantic-convention names**: attribute keys come from
//!   [`opentelemetry-semantic-conventions`], never hand-written strings
//! - **Low-cardinality by construction**: methods are normalized into a
//!   closed set, with the raw token preserved separately for diagnostics
//! - **Tolerant of malformed input**: a bad authority or port can cost an
//!   attribute, never the request
//! - **Framework-agnostic**: works with any server through two small
//!   descriptor traits, with impls for the [`http`] crate's types
//!
//! # Architecture
//!
//! - [`split_address`]: splits a `host[:port]` authority, including
//!   bracketed IPv6 literals, into host and optional port
//! - [`HttpMethod`]: normalizes a method token into its canonical
//!   spelling, collapsing unknown tokens to the `_OTHER` sentinel
//! - [`Values`]: the per-request accumulator tying both together and
//!   producing the metric and span attribute views
//!
//! # Quick Start
//!
//! ```
//! use otel_http_attrs::Values;
//!
//! # fn main() -> Result<(), otel_http_attrs::ExtractError> {
//! let request = http::Request::builder()
//!     .method("GET")
//!     .uri("http://example.com/users/123")
//!     .body(())
//!     .unwrap();
//!
//! // One accumulator per request: request facts at ingress...
//! let mut values = Values::new();
//! values.extract_request(&request)?;
//!
//! // ...response facts once the handler has run, with the matched
//! // route template when the router knows one.
//! values.extract_response(&200_u16, Some("/users/{id}"));
//!
//! // Hand the views to the metrics recording and the span.
//! for attribute in values.metric_attributes() {
//!     println!("{}={:?}", attribute.key, attribute.value);
//! }
//! let _span_attributes = values.span_attributes();
//! # Ok(())
//! # }
//! ```
//!
//! # Attribute views
//!
//! [`Values::span_attributes`] returns everything accumulated.
//! [`Values::metric_attributes`] returns the same list minus
//! `http.request.method_original`, whose cardinality is unbounded.
//! `http.route` is a matched template and appears in both views.
//!
//! # Concurrency
//!
//! A [`Values`] is owned by exactly one request-handling task and needs no
//! locking. [`split_address`] and [`HttpMethod::normalize`] are pure and
//! freely reentrant.
//!
//! [`opentelemetry-semantic-conventions`]: https://docs.rs/opentelemetry-semantic-conventions

mod address;
mod extract;
mod method;

pub use address::{split_address, AddressError};
pub use extract::{ExtractError, RequestDescriptor, ResponseDescriptor, Values};
pub use method::{HttpMethod, OTHER_METHOD};
