//! Per-request options.

use crate::pagination::RANGE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::collections::HashMap;

/// Options for one logical HTTP exchange.
///
/// The path may be relative (resolved against the client's base URL) or a
/// full absolute URL. Headers live in an [`http::HeaderMap`], which is
/// case-insensitive by construction; inserting an existing name overwrites it,
/// so the last write wins.
///
/// The lifecycle clones these options for each pagination fetch, overriding
/// only the `range` header; redirects rewrite the resolved URL without
/// touching the options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path, or an absolute URL.
    pub path: String,

    /// Additional headers for this request.
    pub headers: HeaderMap,

    /// Query parameters for this request.
    pub query_params: HashMap<String, String>,

    /// Raw mode: return the body as-is, skipping JSON decoding and pagination.
    pub raw: bool,

    /// Partial mode: accept a single page even when the server advertises a
    /// continuation header.
    pub partial: bool,
}

impl RequestOptions {
    /// Creates new options with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query_params: HashMap::new(),
            raw: false,
            partial: false,
        }
    }

    /// Adds a header to the request. Header names are matched
    /// case-insensitively and re-adding a name replaces the previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Adds multiple query parameters to the request.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Enables raw mode: pagination is not attempted even if the server
    /// advertises a continuation header.
    ///
    /// To also skip JSON decoding, pass raw-mode options to
    /// [`Client::call_raw`](crate::Client::call_raw) (or use
    /// [`Client::get_raw`](crate::Client::get_raw)), which returns the body
    /// as a string. [`Client::call`](crate::Client::call) always decodes into
    /// the requested type.
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Enables partial mode: only the first page is fetched even if the
    /// server advertises a continuation header.
    pub fn partial(mut self) -> Self {
        self.partial = true;
        self
    }

    /// Sets the `range` header, requesting a specific page.
    ///
    /// The lifecycle uses this to echo a server's `next-range` value back on
    /// continuation fetches. Callers starting from a known offset can set the
    /// `range` header themselves via [`with_header`](Self::with_header).
    pub(crate) fn with_range(mut self, range: HeaderValue) -> Self {
        self.headers.insert(RANGE, range);
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive_and_last_write_wins() {
        let options = RequestOptions::new(Method::GET, "/things")
            .with_header("Accept", "text/plain")
            .unwrap()
            .with_header("accept", "application/json")
            .unwrap();

        assert_eq!(options.headers.len(), 1);
        assert_eq!(
            options.headers.get("ACCEPT").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn invalid_header_name_is_a_configuration_error() {
        let result = RequestOptions::new(Method::GET, "/").with_header("bad name", "v");
        assert!(matches!(
            result,
            Err(crate::Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn with_range_sets_the_range_header() {
        let options = RequestOptions::new(Method::GET, "/things")
            .with_range(HeaderValue::from_static("id ]100.."));
        assert_eq!(options.headers.get("range").unwrap(), "id ]100..");
    }
}
