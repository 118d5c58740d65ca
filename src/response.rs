//! Response wrapper that preserves both parsed data and raw response details.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A wrapper around a successful HTTP response.
///
/// Provides the deserialized response data plus metadata about the exchange:
/// latency, status, headers, the raw body, and how many attempts and
/// pagination fetches it took.
///
/// # Examples
///
/// ```no_run
/// use fetchling::Client;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), fetchling::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// let response = client.get::<User>("/users/123").await?;
///
/// println!("User: {}", response.data.name);
/// println!("Request took {:?}", response.latency);
/// println!("Status: {}", response.status);
/// if response.is_paginated() {
///     println!("Fetched in {} pages", response.pages);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized response data.
    pub data: T,

    /// The raw response body as a string.
    ///
    /// For paginated responses this is the concatenated JSON array of all
    /// pages, not the body of any single fetch.
    pub raw_body: String,

    /// The HTTP status code of the (final) response.
    pub status: StatusCode,

    /// The response headers of the final fetch.
    pub headers: HeaderMap,

    /// The total latency of the request, including all retries, redirect
    /// hops, and pagination fetches.
    pub latency: Duration,

    /// The number of attempts made, counting retries across the whole
    /// lifecycle. `1` when everything succeeded first try. Redirect hops and
    /// pagination fetches are not attempts.
    pub attempts: usize,

    /// The number of pagination fetches. `1` for non-paginated responses.
    pub pages: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    ///
    /// Typically called internally by the client after deserializing a body.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
        pages: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
            pages,
        }
    }

    /// Maps the response data to a different type, preserving the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fetchling::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     42,
    ///     "42".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    ///     1,
    ///     1,
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
            pages: self.pages,
        }
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns `true` if the body was assembled from more than one page.
    pub fn is_paginated(&self) -> bool {
        self.pages > 1
    }

    /// Returns a response header value by name (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// # use fetchling::Response;
    /// # use http::{HeaderMap, StatusCode, HeaderValue};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new(
    ///     (),
    ///     String::new(),
    ///     StatusCode::OK,
    ///     headers,
    ///     Duration::from_millis(100),
    ///     1,
    ///     1,
    /// );
    ///
    /// assert_eq!(response.header("Content-Type").unwrap(), "application/json");
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
