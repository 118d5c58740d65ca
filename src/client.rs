//! HTTP client with the request lifecycle loop.
//!
//! The [`Client`] type is the main entry point. One logical call runs the
//! whole lifecycle: send, retry transport failures with backoff, follow
//! redirects up to the hop limit, then paginate GET responses that advertise a
//! continuation header. Use [`ClientBuilder`] to configure and create clients.

use crate::{
    pagination,
    redirect::{is_redirect, redirect_method, resolve_location, MAX_REDIRECTS},
    request::RequestOptions,
    retry::{RetryOnTransport, RetryPredicate, RetryStrategy},
    stream::ByteStream,
    Error, Response, Result,
};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// An HTTP client for making API calls with JSON handling, retries, redirect
/// following, and range pagination.
///
/// The client is designed to be reused across requests: it holds the
/// connection pool and configuration shared by all calls. Cloning is cheap.
///
/// # Examples
///
/// ```no_run
/// use fetchling::{Client, RetryStrategy};
/// use std::time::Duration;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct CreateUser {
///     name: String,
///     email: String,
/// }
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
///     email: String,
/// }
///
/// # async fn example() -> Result<(), fetchling::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// // GET request; redirects are followed and paginated responses are
/// // assembled automatically.
/// let user = client.get::<User>("/users/123").await?;
/// println!("User: {}", user.data.name);
///
/// // POST request with a JSON body
/// let new_user = CreateUser {
///     name: "Alice".to_string(),
///     email: "alice@example.com".to_string(),
/// };
/// let created = client.post::<_, User>("/users", &new_user).await?;
/// println!("Created user with ID: {}", created.data.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Option<Url>,
    default_headers: HeaderMap,
    retry_strategy: RetryStrategy,
    retry_predicate: Box<dyn RetryPredicate>,
    timeout: Option<Duration>,
}

/// Counters for one logical call. Retries and redirect hops accumulate across
/// the whole lifecycle, pagination fetches included, so the caps bound the
/// call as a whole rather than each fetch.
///
/// `sends` counts every request put on the wire (hops and pagination fetches
/// included); `retries` counts only failed sends, and is what the retry caps
/// and the reported attempt count are based on.
#[derive(Default)]
struct Counters {
    sends: usize,
    retries: usize,
    hops: usize,
}

impl Counters {
    /// Attempt count as reported to callers: failed sends plus the final
    /// successful one. Redirect hops and pagination fetches are not attempts.
    fn attempts(&self) -> usize {
        self.retries + 1
    }
}

/// One buffered HTTP exchange after retries and redirects have resolved.
struct Exchange {
    status: http::StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Makes a typed HTTP request, running the full lifecycle.
    ///
    /// Serializes `body` to JSON (reqwest sets content-type and length),
    /// sends the request, retries transport failures per the configured
    /// strategy, follows redirects, assembles paginated GET responses, and
    /// deserializes the final body.
    ///
    /// # Type Parameters
    ///
    /// * `Req` - The request body type (must implement `Serialize`)
    /// * `Res` - The response body type (must implement `DeserializeOwned`)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchling::{Client, RequestOptions};
    /// use http::Method;
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize)]
    /// struct Query { term: String }
    ///
    /// #[derive(Deserialize)]
    /// struct Matches { results: Vec<String> }
    ///
    /// # async fn example() -> Result<(), fetchling::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com")?
    ///     .build()?;
    ///
    /// let options = RequestOptions::new(Method::POST, "/search");
    /// let query = Query { term: "rust".to_string() };
    ///
    /// let response = client.call::<_, Matches>(options, Some(&query)).await?;
    /// println!("Found {} results", response.data.results.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<Req, Res>(
        &self,
        options: RequestOptions,
        body: Option<&Req>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let start = Instant::now();
        let json = match body {
            Some(body) => Some(
                serde_json::to_value(body)
                    .map_err(|e| Error::SerializationFailed(e.to_string()))?,
            ),
            None => None,
        };

        let mut counters = Counters::default();
        let mut exchange = self.perform(&options, json.as_ref(), &mut counters).await?;
        let mut pages = 1;

        // Pagination: GET only, suppressed by raw and partial modes, and only
        // when the first page is an appendable JSON array.
        if options.method == Method::GET && !options.raw && !options.partial {
            if let Some(first) = pagination::continuation(&exchange.headers) {
                // The body must be an appendable sequence, otherwise the
                // continuation header is left for the caller to act on.
                if let Some(mut items) = pagination::parse_page(&exchange.body) {
                    let mut next = Some(first);

                    while let Some(range) = next {
                        let range = HeaderValue::from_str(&range).map_err(|e| {
                            Error::ConfigurationError(format!("Invalid next-range value: {}", e))
                        })?;
                        let page_options = options.clone().with_range(range);
                        let page = self
                            .perform(&page_options, json.as_ref(), &mut counters)
                            .await?;
                        pages += 1;

                        match pagination::parse_page(&page.body) {
                            Some(more) => items.extend(more),
                            None => {
                                return Err(Error::DeserializationFailed {
                                    raw_response: page.body,
                                    serde_error: "continuation page is not a JSON array"
                                        .to_string(),
                                    status: page.status,
                                });
                            }
                        }

                        next = pagination::continuation(&page.headers);
                        exchange.status = page.status;
                        exchange.headers = page.headers;
                    }

                    tracing::debug!(pages, items = items.len(), "Assembled paginated response");
                    exchange.body = pagination::merge_pages(items);
                }
            }
        }

        let latency = start.elapsed();
        tracing::info!(
            status = exchange.status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            attempts = counters.attempts(),
            pages,
            "Received HTTP response"
        );

        match serde_json::from_str::<Res>(&exchange.body) {
            Ok(data) => Ok(Response::new(
                data,
                exchange.body,
                exchange.status,
                exchange.headers,
                latency,
                counters.attempts(),
                pages,
            )),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %exchange.body,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response: exchange.body,
                    serde_error: e.to_string(),
                    status: exchange.status,
                })
            }
        }
    }

    /// Makes a request in raw mode: the response body is returned as a string
    /// without JSON decoding, and pagination is not attempted.
    ///
    /// Retries and redirect following still apply.
    pub async fn call_raw(&self, options: RequestOptions) -> Result<Response<String>> {
        let options = options.raw();
        let start = Instant::now();
        let mut counters = Counters::default();
        let exchange = self.perform(&options, None, &mut counters).await?;
        let latency = start.elapsed();

        tracing::info!(
            status = exchange.status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            attempts = counters.attempts(),
            "Received HTTP response"
        );

        Ok(Response::new(
            exchange.body.clone(),
            exchange.body,
            exchange.status,
            exchange.headers,
            latency,
            counters.attempts(),
            1,
        ))
    }

    /// Runs the send/retry/redirect machinery and buffers the body.
    async fn perform(
        &self,
        options: &RequestOptions,
        body: Option<&Value>,
        counters: &mut Counters,
    ) -> Result<Exchange> {
        let response = self.send(options, body, counters).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(Error::from_transport)?;

        Ok(Exchange {
            status,
            headers,
            body,
        })
    }

    /// The lifecycle loop: sends the request, retrying transport failures per
    /// the configured strategy and following redirects up to the hop limit.
    ///
    /// Returns the live response on a 2xx status; the body is not consumed.
    async fn send(
        &self,
        options: &RequestOptions,
        mut body: Option<&Value>,
        counters: &mut Counters,
    ) -> Result<reqwest::Response> {
        let mut url = self.resolve_url(options)?;
        let mut method = options.method.clone();

        loop {
            counters.sends += 1;

            let err = match self.execute(&method, &url, options, body).await {
                Ok(response) => {
                    let status = response.status();

                    if is_redirect(status) {
                        counters.hops += 1;
                        if counters.hops > MAX_REDIRECTS {
                            return Err(Error::TooManyRedirects {
                                hops: counters.hops,
                                url: url.to_string(),
                            });
                        }

                        let next = resolve_location(&url, status, response.headers())?;
                        let next_method = redirect_method(status, &method);
                        tracing::debug!(
                            status = status.as_u16(),
                            location = %next,
                            hop = counters.hops,
                            "Following redirect"
                        );
                        if next_method != method {
                            // 303 rewrites to GET; the original body is dropped
                            body = None;
                        }
                        method = next_method;
                        url = next;
                        continue;
                    }

                    if status.is_success() {
                        return Ok(response);
                    }

                    let headers = response.headers().clone();
                    let raw_response = response.text().await.unwrap_or_default();
                    if status.is_client_error() {
                        tracing::error!(
                            status = status.as_u16(),
                            response = %raw_response,
                            "Client error (4xx)"
                        );
                    } else {
                        tracing::warn!(
                            status = status.as_u16(),
                            response = %raw_response,
                            "Server error"
                        );
                    }

                    Error::HttpError {
                        method: method.clone(),
                        url: url.to_string(),
                        status,
                        raw_response,
                        headers,
                    }
                }
                Err(e) => e,
            };

            tracing::warn!(
                error = %err,
                send = counters.sends,
                method = %method,
                url = %url,
                "Request attempt failed"
            );

            counters.retries += 1;
            if !self.inner.retry_predicate.should_retry(&err, counters.retries) {
                return Err(err);
            }

            match self.inner.retry_strategy.delay_for_attempt(counters.retries) {
                Some(delay) => {
                    tracing::info!(
                        delay_ms = delay.as_millis() as u64,
                        retry = counters.retries,
                        "Retrying request after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(Error::MaxRetriesExceeded {
                        attempts: counters.retries,
                        last_error: Box::new(err),
                    });
                }
            }
        }
    }

    /// Executes a single request attempt.
    async fn execute(
        &self,
        method: &Method,
        url: &Url,
        options: &RequestOptions,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        // insert (not append) so per-request headers replace defaults and the
        // last write wins regardless of name casing
        let mut headers = self.inner.default_headers.clone();
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut request = self
            .inner
            .http_client
            .request(method.clone(), url.clone())
            .headers(headers);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(Error::from_transport)
    }

    /// Resolves the target URL for a request.
    ///
    /// An absolute request path wins; a relative path is joined to the base
    /// URL. Query parameters from the options are appended to the result.
    fn resolve_url(&self, options: &RequestOptions) -> Result<Url> {
        let mut url = match Url::parse(&options.path) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.inner.base_url {
                Some(base) => base.join(&options.path)?,
                None => {
                    return Err(Error::ConfigurationError(format!(
                        "No URL: path {:?} is relative and no base URL is configured",
                        options.path
                    )));
                }
            },
            Err(e) => return Err(e.into()),
        };

        for (key, value) in &options.query_params {
            url.query_pairs_mut().append_pair(key, value);
        }

        Ok(url)
    }

    /// Makes a GET request to the specified path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchling::Client;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct User { name: String }
    ///
    /// # async fn example() -> Result<(), fetchling::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com")?
    ///     .build()?;
    ///
    /// let user: fetchling::Response<User> = client.get("/users/123").await?;
    /// println!("User: {}", user.data.name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<Res>(&self, path: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let options = RequestOptions::new(Method::GET, path);
        self.call::<(), Res>(options, None).await
    }

    /// Makes a GET request in raw mode, returning the body as a string.
    ///
    /// No JSON decoding and no pagination; a `next-range` header, if present,
    /// is left in the response headers for the caller.
    pub async fn get_raw(&self, path: impl Into<String>) -> Result<Response<String>> {
        self.call_raw(RequestOptions::new(Method::GET, path)).await
    }

    /// Makes a POST request to the specified path with a JSON body.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchling::Client;
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize)]
    /// struct CreateUser { name: String }
    ///
    /// #[derive(Deserialize)]
    /// struct User { id: u64, name: String }
    ///
    /// # async fn example() -> Result<(), fetchling::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com")?
    ///     .build()?;
    ///
    /// let request = CreateUser { name: "Alice".to_string() };
    /// let user: fetchling::Response<User> = client.post("/users", &request).await?;
    /// println!("Created user ID: {}", user.data.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let options = RequestOptions::new(Method::POST, path);
        self.call(options, Some(body)).await
    }

    /// Makes a PUT request to the specified path with a JSON body.
    pub async fn put<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let options = RequestOptions::new(Method::PUT, path);
        self.call(options, Some(body)).await
    }

    /// Makes a PATCH request to the specified path with a JSON body.
    pub async fn patch<Req, Res>(
        &self,
        path: impl Into<String>,
        body: &Req,
    ) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let options = RequestOptions::new(Method::PATCH, path);
        self.call(options, Some(body)).await
    }

    /// Makes a DELETE request to the specified path.
    pub async fn delete<Res>(&self, path: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let options = RequestOptions::new(Method::DELETE, path);
        self.call::<(), Res>(options, None).await
    }

    /// Makes a GET request and returns the body as a byte stream.
    ///
    /// Retries and redirect following apply to the exchange; the body is not
    /// buffered, decoded, or paginated. Non-2xx statuses surface as
    /// [`Error::HttpError`] before any bytes are yielded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchling::Client;
    /// use futures_util::StreamExt;
    ///
    /// # async fn example() -> Result<(), fetchling::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://files.example.com")?
    ///     .build()?;
    ///
    /// let mut stream = client.stream("/large-file").await?;
    /// while let Some(chunk) = stream.next().await {
    ///     let chunk = chunk?;
    ///     // write chunk somewhere
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn stream(&self, path: impl Into<String>) -> Result<ByteStream> {
        self.stream_with(RequestOptions::new(Method::GET, path))
            .await
    }

    /// Like [`stream`](Client::stream), but with explicit request options.
    pub async fn stream_with(&self, options: RequestOptions) -> Result<ByteStream> {
        let options = options.raw();
        let mut counters = Counters::default();
        let response = self.send(&options, None, &mut counters).await?;
        Ok(ByteStream::new(response))
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use fetchling::{ClientBuilder, RetryStrategy};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), fetchling::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .retry_strategy(RetryStrategy::ExponentialBackoff {
///         initial_delay: Duration::from_millis(100),
///         max_delay: Duration::from_secs(10),
///         max_retries: 3,
///         jitter: true,
///     })
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    retry_strategy: RetryStrategy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    timeout: Option<Duration>,
    proxy: Option<reqwest::Proxy>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings: exponential
    /// backoff with five retries, transport-error retry predicate, no base
    /// URL, no timeout, no proxy.
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            retry_strategy: RetryStrategy::default(),
            retry_predicate: None,
            timeout: None,
            proxy: None,
        }
    }

    /// Sets the base URL that relative request paths resolve against.
    ///
    /// Optional: requests made with absolute URLs work without one. A call
    /// with a relative path and no base URL fails with
    /// [`Error::ConfigurationError`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header included in all requests.
    ///
    /// Per-request headers with the same name take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the retry strategy for failed requests.
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default only transport errors (network failures and timeouts) are
    /// retried; see [`RetryOnTransport`].
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Routes all requests through the given proxy.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fetchling::Client;
    ///
    /// # async fn example() -> Result<(), fetchling::Error> {
    /// let proxy = reqwest::Proxy::all("http://proxy.internal:3128")
    ///     .map_err(|e| fetchling::Error::ConfigurationError(e.to_string()))?;
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com")?
    ///     .proxy(proxy)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// The underlying transport is built with redirect following disabled;
    /// the lifecycle follows redirects itself so the hop cap and
    /// missing-location handling stay in this crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());

        if let Some(proxy) = self.proxy {
            builder = builder.proxy(proxy);
        }

        let http_client = builder.build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnTransport));

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: self.base_url,
                default_headers: self.default_headers,
                retry_strategy: self.retry_strategy,
                retry_predicate,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(base: &str) -> Client {
        Client::builder().base_url(base).unwrap().build().unwrap()
    }

    #[test]
    fn resolve_url_joins_relative_paths() {
        let client = client_with_base("https://api.example.com");
        let options = RequestOptions::new(Method::GET, "/users/123");

        let url = client.resolve_url(&options).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/users/123");
    }

    #[test]
    fn resolve_url_prefers_absolute_paths() {
        let client = client_with_base("https://api.example.com");
        let options = RequestOptions::new(Method::GET, "https://other.example.com/x");

        let url = client.resolve_url(&options).unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/x");
    }

    #[test]
    fn resolve_url_appends_query_params() {
        let client = client_with_base("https://api.example.com");
        let options =
            RequestOptions::new(Method::GET, "/users").with_query_param("page", "2");

        let url = client.resolve_url(&options).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/users?page=2");
    }

    #[test]
    fn relative_path_without_base_url_is_an_error() {
        let client = Client::builder().build().unwrap();
        let options = RequestOptions::new(Method::GET, "/users");

        let err = client.resolve_url(&options).unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }
}
