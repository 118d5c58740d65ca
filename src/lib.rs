//! # Fetchling - a small, convenience-first HTTP client wrapper
//!
//! Fetchling wraps `reqwest` with the plumbing most API clients end up
//! rewriting: typed JSON requests and responses, case-insensitive header
//! handling, manual redirect following with a hop cap, transient-error retry
//! with exponential backoff, and automatic pagination for servers that use
//! `next-range`/`range` continuation headers.
//!
//! One logical call runs the whole lifecycle: send, retry transport failures,
//! follow redirects, fetch continuation pages, decode. The transport, TLS,
//! and proxying are all `reqwest`'s; this crate only owns the lifecycle.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fetchling::Client;
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//!     email: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fetchling::Error> {
//!     let client = Client::builder()
//!         .base_url("https://api.example.com")?
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     // GET: redirects are followed, transient failures retried, and if the
//!     // server paginates with next-range headers the pages are concatenated.
//!     let users = client.get::<Vec<User>>("/users").await?;
//!     println!("{} users in {} pages", users.data.len(), users.pages);
//!
//!     // POST with automatic JSON encoding
//!     let new_user = CreateUser {
//!         name: "Alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!     };
//!     let created = client.post::<_, User>("/users", &new_user).await?;
//!     println!("Created user with ID: {}", created.data.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lifecycle
//!
//! - Transport failures (connection errors, timeouts) are retried with
//!   exponential backoff, five retries by default. HTTP status errors are
//!   surfaced immediately unless a custom [`RetryPredicate`] opts in.
//! - Redirects (301/302/303/307/308) are followed up to 10 hops; 303 rewrites
//!   the method to GET and drops the body. A redirect without a `location`
//!   header, or a chain past the cap, is an error.
//! - GET responses carrying a `next-range` header and a JSON array body are
//!   refetched with `range` set to the continuation value until the header
//!   disappears; the arrays are concatenated before decoding. Opt out per
//!   request with [`RequestOptions::partial`] or
//!   [`RequestOptions::raw`].
//!
//! ## Error Handling
//!
//! Errors keep the raw response around:
//!
//! ```no_run
//! use fetchling::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().base_url("https://api.example.com")?.build()?;
//! match client.get::<serde_json::Value>("/endpoint").await {
//!     Ok(response) => {
//!         println!("Success: {:?}", response.data);
//!     }
//!     Err(Error::DeserializationFailed { raw_response, serde_error, status }) => {
//!         eprintln!("Failed to deserialize (status {}):", status);
//!         eprintln!("  Raw response: {}", raw_response);
//!         eprintln!("  Error: {}", serde_error);
//!     }
//!     Err(Error::HttpError { method, url, status, raw_response, .. }) => {
//!         eprintln!("{} {} returned {}: {}", method, url, status, raw_response);
//!     }
//!     Err(e) => {
//!         eprintln!("Other error: {}", e);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming
//!
//! For large downloads, [`Client::stream`] returns the body as a byte stream
//! after the retry/redirect machinery has resolved the exchange:
//!
//! ```no_run
//! use fetchling::Client;
//! use futures_util::StreamExt;
//!
//! # async fn example() -> Result<(), fetchling::Error> {
//! # let client = Client::builder().base_url("https://files.example.com")?.build()?;
//! let mut stream = client.stream("/archive.tar.gz").await?;
//! while let Some(chunk) = stream.next().await {
//!     let chunk = chunk?;
//!     // write chunk somewhere
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod pagination;
pub mod redirect;
mod request;
mod response;
pub mod retry;
mod stream;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use request::RequestOptions;
pub use response::Response;
pub use retry::{RetryPredicate, RetryStrategy};
pub use stream::ByteStream;
