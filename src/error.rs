//! Error types for the request lifecycle.
//!
//! Every error that can surface from a call carries enough context to debug it
//! without re-running the request: HTTP errors keep the method, URL, status,
//! raw body, and headers; decode failures keep the raw body and the serde
//! message.

use http::{HeaderMap, Method, StatusCode};

/// The main error type for HTTP calls.
///
/// # Examples
///
/// ```no_run
/// use fetchling::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// match client.get::<serde_json::Value>("/endpoint").await {
///     Ok(response) => println!("Success: {:?}", response.data),
///     Err(Error::HttpError { method, url, status, raw_response, .. }) => {
///         eprintln!("{} {} failed with {}: {}", method, url, status, raw_response);
///     }
///     Err(Error::TooManyRedirects { hops, url }) => {
///         eprintln!("Redirect loop after {} hops, last URL {}", hops, url);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    ///
    /// This wraps the underlying `reqwest::Error` and indicates problems at the
    /// network layer rather than the HTTP protocol layer.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out before a response arrived.
    #[error("Request timed out")]
    Timeout,

    /// Failed to serialize the request body to JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize the response body into the expected type.
    ///
    /// Preserves both the raw response text and the serde error message.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The server returned a non-2xx, non-redirect HTTP status code.
    ///
    /// Includes the method and final URL (after any redirects) so the failing
    /// exchange can be identified in logs.
    #[error("HTTP error {status} for {method} {url}: {raw_response}")]
    HttpError {
        /// The HTTP method of the failing request
        method: Method,
        /// The URL the request was sent to
        url: String,
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// A redirect chain exceeded the hop limit.
    #[error("Too many redirects ({hops} hops), last URL {url}")]
    TooManyRedirects {
        /// Number of hops followed before giving up
        hops: usize,
        /// The last URL in the chain
        url: String,
    },

    /// A redirect response did not carry a `location` header.
    #[error("Redirect {status} from {url} is missing a location header")]
    MissingLocation {
        /// The redirect status code
        status: StatusCode,
        /// The URL that returned the redirect
        url: String,
    },

    /// Invalid configuration was provided.
    ///
    /// Covers invalid header names/values, a missing URL (no base URL and a
    /// relative request path), and client construction failures.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// All retry attempts were exhausted.
    ///
    /// Wraps the last error encountered before giving up.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// The number of attempts made (initial try plus retries)
        attempts: usize,
        /// The last error encountered
        last_error: Box<Error>,
    },

    /// An invalid URL was provided or produced by a redirect.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Converts a transport error from reqwest, mapping timeouts to their own
    /// variant so retry predicates can distinguish them.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(e)
        }
    }

    /// Returns `true` if this error is a transport-level failure worth retrying.
    ///
    /// Only network errors and timeouts qualify. HTTP status errors do not;
    /// retrying those is opt-in via a retry predicate such as
    /// [`RetryOn5xx`](crate::retry::RetryOn5xx).
    ///
    /// # Examples
    ///
    /// ```
    /// use fetchling::Error;
    ///
    /// assert!(Error::Timeout.is_retryable());
    /// assert!(!Error::ConfigurationError("bad header".to_string()).is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout)
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::MissingLocation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for HTTP calls.
pub type Result<T> = std::result::Result<T, Error>;
