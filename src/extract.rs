//! Attribute accumulation for HTTP requests and responses.
//!
//! A [`Values`] is created per in-flight request, fed the request
//! descriptor at ingress and the response descriptor once the handler has
//! run, and read out as a flat list of [`KeyValue`] pairs for a metrics
//! recording or a span. Attribute names follow the OpenTelemetry HTTP
//! semantic conventions and come from the semantic-conventions crate, so
//! they cannot drift from the registry.
//!
//! Descriptor access goes through the [`RequestDescriptor`] and
//! [`ResponseDescriptor`] traits. Implementations are provided for the
//! `http` crate's [`http::Request`] and [`http::Response`], which covers
//! hyper- and axum-based servers; custom server types implement the traits
//! directly.
//!
//! Extraction never fails the host request: a malformed authority is
//! logged at debug level and the server attributes are omitted, an
//! unrecognized method is reported through the `_OTHER` sentinel, and a
//! non-numeric port simply goes unrecorded.

use indexmap::IndexMap;
use opentelemetry::{KeyValue, Value};
use opentelemetry_semantic_conventions as semconv;
use thiserror::Error;

use crate::address::split_address;
use crate::method::HttpMethod;

/// Errors from [`Values::extract_request`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The descriptor could not provide a method token; nothing about the
    /// request is usable and no attributes were set.
    #[error("request descriptor provides no method token")]
    UnusableRequest,
}

/// Request-side facts needed for attribute extraction.
///
/// `None` from any accessor except [`method_token`](Self::method_token)
/// means the fact is unknown and its attributes are omitted. A descriptor
/// that cannot even name a method token is structurally unusable and makes
/// extraction fail as a whole.
pub trait RequestDescriptor {
    /// The raw HTTP method token, in whatever casing the client sent.
    fn method_token(&self) -> Option<&str>;

    /// The URI scheme (`http`, `https`), when known.
    fn scheme(&self) -> Option<&str> {
        None
    }

    /// The `host[:port]` authority the request was addressed to.
    fn authority(&self) -> Option<&str> {
        None
    }

    /// Application protocol as a `(name, version)` pair, e.g.
    /// `("http", "1.1")`.
    fn protocol(&self) -> Option<(&str, &str)> {
        None
    }
}

impl<B> RequestDescriptor for http::Request<B> {
    fn method_token(&self) -> Option<&str> {
        Some(self.method().as_str())
    }

    fn scheme(&self) -> Option<&str> {
        self.uri().scheme_str()
    }

    /// Authority from the request target, falling back to the `Host`
    /// header for origin-form targets. Header values that are not visible
    /// ASCII are treated as unknown.
    fn authority(&self) -> Option<&str> {
        self.uri()
            .authority()
            .map(|authority| authority.as_str())
            .or_else(|| {
                self.headers()
                    .get(http::header::HOST)
                    .and_then(|value| value.to_str().ok())
            })
    }

    fn protocol(&self) -> Option<(&str, &str)> {
        match self.version() {
            http::Version::HTTP_09 => Some(("http", "0.9")),
            http::Version::HTTP_10 => Some(("http", "1.0")),
            http::Version::HTTP_11 => Some(("http", "1.1")),
            http::Version::HTTP_2 => Some(("http", "2")),
            http::Version::HTTP_3 => Some(("http", "3")),
            _ => None,
        }
    }
}

/// Response-side facts needed for attribute extraction.
pub trait ResponseDescriptor {
    /// The HTTP status code.
    fn status_code(&self) -> i64;
}

impl<B> ResponseDescriptor for http::Response<B> {
    fn status_code(&self) -> i64 {
        i64::from(self.status().as_u16())
    }
}

impl ResponseDescriptor for http::StatusCode {
    fn status_code(&self) -> i64 {
        i64::from(self.as_u16())
    }
}

impl ResponseDescriptor for u16 {
    fn status_code(&self) -> i64 {
        i64::from(*self)
    }
}

/// Per-request attribute accumulator.
///
/// One `Values` belongs to exactly one in-flight request. It is mutated at
/// most twice, by [`extract_request`](Self::extract_request) and
/// [`extract_response`](Self::extract_response), and read through
/// [`metric_attributes`](Self::metric_attributes) and
/// [`span_attributes`](Self::span_attributes). Reads are valid in any
/// state and reflect whatever has been accumulated so far; a fresh
/// instance yields empty lists.
///
/// Attribute names are unique: writing a name again replaces its value but
/// keeps its original position, so repeated reads stay in a stable order.
///
/// # Examples
///
/// ```
/// use otel_http_attrs::Values;
///
/// let request = http::Request::builder()
///     .method("GET")
///     .uri("http://example.com/users/123")
///     .body(())
///     .unwrap();
///
/// let mut values = Values::new();
/// values.extract_request(&request)?;
/// values.extract_response(&200_u16, Some("/users/{id}"));
///
/// // Hand these to a metrics recording and a span, respectively.
/// let metric_attributes = values.metric_attributes();
/// let span_attributes = values.span_attributes();
/// # assert_eq!(metric_attributes.len(), 7);
/// # assert_eq!(span_attributes.len(), 7);
/// # Ok::<(), otel_http_attrs::ExtractError>(())
/// ```
#[derive(Debug, Default)]
pub struct Values {
    attributes: IndexMap<&'static str, Value>,
}

impl Values {
    /// Creates an empty accumulator for one request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts request-time attributes from a descriptor.
    ///
    /// Populates `http.request.method` (and, for unrecognized methods,
    /// `http.request.method_original`), `url.scheme`, `server.address`,
    /// `server.port`, `network.protocol.name` and
    /// `network.protocol.version`, as far as the descriptor provides them.
    /// The canonical method attribute never carries the client's casing.
    ///
    /// A malformed authority does not fail extraction; it is logged and
    /// the server attributes are omitted. The only error is a descriptor
    /// with no method token, in which case no attributes are set.
    pub fn extract_request<R>(&mut self, request: &R) -> Result<(), ExtractError>
    where
        R: RequestDescriptor + ?Sized,
    {
        let raw_method = request.method_token().ok_or(ExtractError::UnusableRequest)?;

        let method = HttpMethod::normalize(raw_method);
        self.insert(
            semconv::attribute::HTTP_REQUEST_METHOD,
            Value::String(method.as_str().to_string().into()),
        );
        if let Some(original) = method.original() {
            self.insert(
                semconv::attribute::HTTP_REQUEST_METHOD_ORIGINAL,
                Value::String(original.to_string().into()),
            );
        }

        if let Some(scheme) = request.scheme() {
            self.insert(
                semconv::attribute::URL_SCHEME,
                Value::String(scheme.to_string().into()),
            );
        }

        if let Some(authority) = request.authority() {
            match split_address(authority) {
                Ok((host, port)) => {
                    self.insert(
                        semconv::attribute::SERVER_ADDRESS,
                        Value::String(host.to_string().into()),
                    );
                    if let Some(port) = port {
                        self.insert(semconv::attribute::SERVER_PORT, Value::I64(port));
                    }
                }
                Err(error) => {
                    tracing::debug!(
                        authority,
                        error = %error,
                        "skipping server address attributes for malformed authority"
                    );
                }
            }
        }

        if let Some((name, version)) = request.protocol() {
            self.insert(
                semconv::attribute::NETWORK_PROTOCOL_NAME,
                Value::String(name.to_string().into()),
            );
            self.insert(
                semconv::attribute::NETWORK_PROTOCOL_VERSION,
                Value::String(version.to_string().into()),
            );
        }

        Ok(())
    }

    /// Extracts response-time attributes.
    ///
    /// Records `http.response.status_code` and, when a matched route
    /// template is known, `http.route`. Requests that never matched a
    /// route (a router-level 404) pass `None` and simply carry no route
    /// attribute.
    pub fn extract_response<R>(&mut self, response: &R, route: Option<&str>)
    where
        R: ResponseDescriptor + ?Sized,
    {
        self.insert(
            semconv::attribute::HTTP_RESPONSE_STATUS_CODE,
            Value::I64(response.status_code()),
        );
        if let Some(route) = route.filter(|route| !route.is_empty()) {
            self.insert(
                semconv::attribute::HTTP_ROUTE,
                Value::String(route.to_string().into()),
            );
        }
    }

    /// Attributes for a metrics recording.
    ///
    /// Everything accumulated except `http.request.method_original`, whose
    /// cardinality is unbounded. `http.route` is a matched template and
    /// stays in: it is exactly as bounded as the set of registered routes.
    pub fn metric_attributes(&self) -> Vec<KeyValue> {
        self.attributes
            .iter()
            .filter(|&(&name, _)| name != semconv::attribute::HTTP_REQUEST_METHOD_ORIGINAL)
            .map(|(name, value)| KeyValue::new(*name, value.clone()))
            .collect()
    }

    /// Attributes for a trace span: everything accumulated, including the
    /// original method token for unrecognized methods.
    pub fn span_attributes(&self) -> Vec<KeyValue> {
        self.attributes
            .iter()
            .map(|(name, value)| KeyValue::new(*name, value.clone()))
            .collect()
    }

    // Last write wins for the value; the first write fixes the position.
    fn insert(&mut self, name: &'static str, value: Value) {
        self.attributes.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_request(uri: &str) -> http::Request<()> {
        http::Request::builder()
            .method("GET")
            .uri(uri)
            .body(())
            .expect("valid request")
    }

    #[test]
    fn fresh_accumulator_reads_empty() {
        let values = Values::new();
        assert!(values.metric_attributes().is_empty());
        assert!(values.span_attributes().is_empty());
    }

    #[test]
    fn get_request_without_port() {
        let mut values = Values::new();
        values
            .extract_request(&get_request("http://example.com/path?query=test"))
            .unwrap();
        values.extract_response(&200_u16, None);

        assert_eq!(
            values.metric_attributes(),
            vec![
                KeyValue::new("http.request.method", "GET"),
                KeyValue::new("url.scheme", "http"),
                KeyValue::new("server.address", "example.com"),
                KeyValue::new("network.protocol.name", "http"),
                KeyValue::new("network.protocol.version", "1.1"),
                KeyValue::new("http.response.status_code", 200_i64),
            ]
        );
    }

    #[test]
    fn explicit_port_and_route() {
        let mut values = Values::new();
        values
            .extract_request(&get_request("http://example.com:9999/path?query=test"))
            .unwrap();
        values.extract_response(&200_u16, Some("/path/${id}"));

        assert_eq!(
            values.metric_attributes(),
            vec![
                KeyValue::new("http.request.method", "GET"),
                KeyValue::new("url.scheme", "http"),
                KeyValue::new("server.address", "example.com"),
                KeyValue::new("server.port", 9999_i64),
                KeyValue::new("network.protocol.name", "http"),
                KeyValue::new("network.protocol.version", "1.1"),
                KeyValue::new("http.response.status_code", 200_i64),
                KeyValue::new("http.route", "/path/${id}"),
            ]
        );
    }

    #[test]
    fn canonical_method_never_carries_input_casing() {
        let request = http::Request::builder()
            .method("get")
            .uri("http://example.com/")
            .body(())
            .unwrap();

        let mut values = Values::new();
        values.extract_request(&request).unwrap();

        let attributes = values.span_attributes();
        assert!(attributes.contains(&KeyValue::new("http.request.method", "GET")));
        assert!(!attributes
            .iter()
            .any(|kv| kv.key.as_str() == "http.request.method_original"));
    }

    #[test]
    fn metric_view_drops_original_method() {
        let request = http::Request::builder()
            .method("BANANA")
            .uri("http://example.com/")
            .body(())
            .unwrap();

        let mut values = Values::new();
        values.extract_request(&request).unwrap();

        let span = values.span_attributes();
        assert!(span.contains(&KeyValue::new("http.request.method", "_OTHER")));
        assert!(span.contains(&KeyValue::new("http.request.method_original", "BANANA")));

        let metric = values.metric_attributes();
        assert!(metric.contains(&KeyValue::new("http.request.method", "_OTHER")));
        assert!(!metric
            .iter()
            .any(|kv| kv.key.as_str() == "http.request.method_original"));
    }

    #[test]
    fn authority_falls_back_to_host_header() {
        let request = http::Request::builder()
            .method("GET")
            .uri("/users/123")
            .header(http::header::HOST, "localhost:8080")
            .body(())
            .unwrap();

        let mut values = Values::new();
        values.extract_request(&request).unwrap();

        let attributes = values.span_attributes();
        assert!(attributes.contains(&KeyValue::new("server.address", "localhost")));
        assert!(attributes.contains(&KeyValue::new("server.port", 8080_i64)));
    }

    #[test]
    fn malformed_authority_omits_server_attributes() {
        let request = http::Request::builder()
            .method("GET")
            .uri("/path")
            .header(http::header::HOST, "[fe80::1")
            .body(())
            .unwrap();

        let mut values = Values::new();
        values.extract_request(&request).unwrap();

        let attributes = values.span_attributes();
        assert!(attributes.contains(&KeyValue::new("http.request.method", "GET")));
        assert!(!attributes
            .iter()
            .any(|kv| kv.key.as_str() == "server.address" || kv.key.as_str() == "server.port"));
    }

    #[test]
    fn empty_host_with_port_keeps_empty_address() {
        let request = http::Request::builder()
            .method("GET")
            .uri("/")
            .header(http::header::HOST, ":8080")
            .body(())
            .unwrap();

        let mut values = Values::new();
        values.extract_request(&request).unwrap();

        let attributes = values.span_attributes();
        assert!(attributes.contains(&KeyValue::new("server.address", "")));
        assert!(attributes.contains(&KeyValue::new("server.port", 8080_i64)));
    }

    #[test]
    fn empty_route_is_not_recorded() {
        let mut values = Values::new();
        values.extract_response(&404_u16, Some(""));

        assert_eq!(
            values.metric_attributes(),
            vec![KeyValue::new("http.response.status_code", 404_i64)]
        );
    }

    #[test]
    fn response_descriptor_impls_agree() {
        let response = http::Response::builder()
            .status(http::StatusCode::IM_A_TEAPOT)
            .body(())
            .unwrap();

        assert_eq!(response.status_code(), 418);
        assert_eq!(http::StatusCode::IM_A_TEAPOT.status_code(), 418);
        assert_eq!(418_u16.status_code(), 418);
    }

    #[test]
    fn repeated_response_extraction_overwrites_status() {
        let mut values = Values::new();
        values
            .extract_request(&get_request("http://example.com/"))
            .unwrap();
        values.extract_response(&200_u16, None);
        values.extract_response(&404_u16, Some("/missing/{id}"));

        let attributes = values.metric_attributes();
        let statuses: Vec<_> = attributes
            .iter()
            .filter(|kv| kv.key.as_str() == "http.response.status_code")
            .collect();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].value, Value::I64(404));
        // The first write fixed the position: the status stays ahead of the
        // route even though its value was rewritten afterwards.
        assert_eq!(
            attributes.last().map(|kv| kv.key.as_str()),
            Some("http.route")
        );
    }

    #[test]
    fn attribute_names_stay_unique() {
        let mut values = Values::new();
        values
            .extract_request(&get_request("http://example.com:8080/a"))
            .unwrap();
        values
            .extract_request(&get_request("https://other.example:9090/b"))
            .unwrap();
        values.extract_response(&200_u16, Some("/a/{id}"));
        values.extract_response(&500_u16, Some("/b/{id}"));

        for attributes in [values.metric_attributes(), values.span_attributes()] {
            let mut names: Vec<_> = attributes.iter().map(|kv| kv.key.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), attributes.len(), "duplicate attribute name");
        }

        // Last write wins for the value.
        assert!(values
            .span_attributes()
            .contains(&KeyValue::new("server.address", "other.example")));
        assert!(values
            .span_attributes()
            .contains(&KeyValue::new("http.route", "/b/{id}")));
    }

    #[test]
    fn reads_are_idempotent() {
        let mut values = Values::new();
        values
            .extract_request(&get_request("http://example.com/"))
            .unwrap();

        assert_eq!(values.metric_attributes(), values.metric_attributes());
        assert_eq!(values.span_attributes(), values.span_attributes());
    }

    struct Opaque;

    impl RequestDescriptor for Opaque {
        fn method_token(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn unusable_descriptor_sets_no_attributes() {
        let mut values = Values::new();
        assert_eq!(
            values.extract_request(&Opaque),
            Err(ExtractError::UnusableRequest)
        );
        assert!(values.span_attributes().is_empty());
    }
}
