//! Raw request data as the host layer hands it over.
//!
//! The host owns transport concerns: it has already matched the route,
//! URL-decoded the path, and parsed any JSON payload. `RawRequest` is the
//! borrowed view the binding core reads for the duration of one call. The
//! query string is kept as an order-preserving multi-map so repeated keys
//! survive (`q=1&q=2`).

use serde_json::Value;

/// The raw request triple: path, query multi-map, optional decoded body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRequest {
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RawRequest {
    pub fn new(path: impl Into<String>) -> Self {
        RawRequest {
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Build from a combined path-and-query string such as
    /// `/users?limit=10&offset=20`, URL-decoding the query pairs.
    #[must_use]
    pub fn from_url(path_and_query: &str) -> Self {
        let path = path_and_query
            .split('?')
            .next()
            .unwrap_or("/")
            .to_string();
        RawRequest {
            path,
            query: parse_query_params(path_and_query),
            body: None,
        }
    }

    #[must_use]
    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_query_pairs(
        mut self,
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query.extend(pairs);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Every value for `key`, in encounter order.
    #[must_use]
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Parse query string parameters from a URL path.
///
/// Extracts everything after the `?` character and URL-decodes parameter
/// names and values, preserving encounter order and repeated keys.
#[must_use]
pub fn parse_query_params(path: &str) -> Vec<(String, String)> {
    if let Some(pos) = path.find('?') {
        let query_str = &path[pos + 1..];
        url::form_urlencoded::parse(query_str.as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    } else {
        Vec::new()
    }
}
