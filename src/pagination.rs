//! Range-header pagination.
//!
//! Servers that paginate with partial responses advertise the next page in a
//! `next-range` header; the client requests it by echoing that value back in
//! the `range` header of the next fetch. Pages whose bodies are JSON arrays
//! are concatenated into one array before deserialization.
//!
//! Pagination applies only to GET requests that are neither raw nor partial.

use http::{HeaderMap, HeaderName};
use serde_json::Value;

/// Header a server sets to advertise the next page.
pub const NEXT_RANGE: HeaderName = HeaderName::from_static("next-range");

/// Header the client sets to request a specific page.
pub const RANGE: HeaderName = HeaderName::from_static("range");

/// Extracts the continuation value from response headers, if the server
/// indicated more data is available.
pub fn continuation(headers: &HeaderMap) -> Option<String> {
    headers
        .get(NEXT_RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Parses a page body as a JSON array.
///
/// Returns `None` when the body is not an appendable sequence; the caller
/// treats the exchange as non-paginated in that case.
pub fn parse_page(body: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

/// Serializes accumulated pages back into a single JSON array body.
pub fn merge_pages(items: Vec<Value>) -> String {
    Value::Array(items).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn continuation_reads_next_range_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.insert("Next-Range", HeaderValue::from_static("id ]100.."));

        assert_eq!(continuation(&headers), Some("id ]100..".to_string()));
    }

    #[test]
    fn no_continuation_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(continuation(&headers), None);
    }

    #[test]
    fn parse_page_accepts_arrays_only() {
        assert_eq!(parse_page("[1, 2]").unwrap().len(), 2);
        assert!(parse_page("{\"a\": 1}").is_none());
        assert!(parse_page("\"text\"").is_none());
        assert!(parse_page("not json").is_none());
    }

    #[test]
    fn merge_pages_round_trips_through_json() {
        let mut items = parse_page("[1, 2]").unwrap();
        items.extend(parse_page("[3]").unwrap());

        let merged = merge_pages(items);
        assert_eq!(
            serde_json::from_str::<Vec<u32>>(&merged).unwrap(),
            vec![1, 2, 3]
        );
    }
}
