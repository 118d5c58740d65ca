//! Redirect classification and URL rewriting.
//!
//! Redirects are followed manually rather than by the transport so the hop
//! count, the rewritten method, and the missing-location case stay under this
//! crate's control. The underlying `reqwest::Client` is built with redirects
//! disabled.

use crate::{Error, Result};
use http::{header::LOCATION, HeaderMap, Method, StatusCode};
use url::Url;

/// Maximum number of redirect hops before failing with
/// [`Error::TooManyRedirects`].
pub const MAX_REDIRECTS: usize = 10;

/// Returns `true` for the redirect statuses this crate follows:
/// 301, 302, 303, 307, and 308.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Returns the method to use after following a redirect.
///
/// 303 (See Other) always converts to GET and the body is dropped; the other
/// redirect statuses preserve the original method.
pub fn redirect_method(status: StatusCode, method: &Method) -> Method {
    if status == StatusCode::SEE_OTHER {
        Method::GET
    } else {
        method.clone()
    }
}

/// Resolves the `location` header of a redirect response against the current
/// URL.
///
/// Relative locations are joined against `current`; absolute locations replace
/// it. Fails with [`Error::MissingLocation`] if the header is absent or not
/// valid UTF-8, and [`Error::InvalidUrl`] if the value does not resolve.
pub fn resolve_location(current: &Url, status: StatusCode, headers: &HeaderMap) -> Result<Url> {
    let location = headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::MissingLocation {
            status,
            url: current.to_string(),
        })?;

    Ok(current.join(location)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn classifies_redirect_statuses() {
        for code in [301, 302, 303, 307, 308] {
            assert!(is_redirect(StatusCode::from_u16(code).unwrap()));
        }
        for code in [200, 204, 300, 304, 400, 404, 500] {
            assert!(!is_redirect(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn see_other_converts_to_get() {
        assert_eq!(
            redirect_method(StatusCode::SEE_OTHER, &Method::POST),
            Method::GET
        );
        assert_eq!(
            redirect_method(StatusCode::MOVED_PERMANENTLY, &Method::POST),
            Method::POST
        );
        assert_eq!(
            redirect_method(StatusCode::PERMANENT_REDIRECT, &Method::PUT),
            Method::PUT
        );
    }

    #[test]
    fn resolves_relative_location() {
        let current = Url::parse("https://api.example.com/v1/things").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/v2/things"));

        let next = resolve_location(&current, StatusCode::MOVED_PERMANENTLY, &headers).unwrap();
        assert_eq!(next.as_str(), "https://api.example.com/v2/things");
    }

    #[test]
    fn resolves_absolute_location() {
        let current = Url::parse("https://api.example.com/v1/things").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            LOCATION,
            HeaderValue::from_static("https://other.example.com/elsewhere"),
        );

        let next = resolve_location(&current, StatusCode::FOUND, &headers).unwrap();
        assert_eq!(next.as_str(), "https://other.example.com/elsewhere");
    }

    #[test]
    fn missing_location_is_an_error() {
        let current = Url::parse("https://api.example.com/v1/things").unwrap();
        let headers = HeaderMap::new();

        let err = resolve_location(&current, StatusCode::FOUND, &headers).unwrap_err();
        match err {
            Error::MissingLocation { status, url } => {
                assert_eq!(status, StatusCode::FOUND);
                assert_eq!(url, "https://api.example.com/v1/things");
            }
            other => panic!("expected MissingLocation, got {:?}", other),
        }
    }
}
