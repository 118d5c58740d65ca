//! Streaming response bodies.

use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use http::{HeaderMap, StatusCode};
use std::pin::Pin;
use std::task::{Context, Poll};

/// A response body delivered as a stream of byte chunks.
///
/// Produced by [`Client::stream`](crate::Client::stream). The exchange itself
/// has already gone through the retry and redirect machinery; only the body
/// remains unbuffered. No JSON decoding or pagination is applied.
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
/// let mut stream = client.stream("/archive.tar.gz").await?;
/// println!("Status: {}", stream.status);
///
/// while let Some(chunk) = stream.next().await {
///     let chunk = chunk?;
///     println!("got {} bytes", chunk.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ByteStream {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
}

impl ByteStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        Self {
            status,
            headers,
            inner: Box::pin(response.bytes_stream()),
        }
    }

    /// Returns a response header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Drains the stream into a single buffer.
    pub async fn collect(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.inner.next().await {
            buf.extend_from_slice(&chunk.map_err(Error::from_transport)?);
        }
        Ok(buf.freeze())
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner
            .as_mut()
            .poll_next(cx)
            .map(|opt| opt.map(|chunk| chunk.map_err(Error::from_transport)))
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
