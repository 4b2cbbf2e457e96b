//! Transport primitives for token exchanges and order fetches.
//!
//! The module exposes [`HttpClient`], the keeper's only dependency on an HTTP stack.
//! Callers provide an implementation (typically behind `Arc<T>` where `T: HttpClient`)
//! and the keeper hands it fully-built [`HttpRequest`] values; the implementation
//! reports back a status code and raw body. The default [`ReqwestHttpClient`] adapter
//! lives behind the `reqwest` feature.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing the keeper's outbound calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared
/// between a [`TokenManager`](crate::manager::TokenManager) and any number of
/// fetchers, and the returned futures must be `Send` so the periodic poller can run
/// them from a spawned task. The transport's own timeout policy applies; the keeper
/// never retries at this layer.
pub trait HttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes the request and resolves to the raw status + body pair.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// HTTP methods the keeper issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// `GET` request without a body.
	Get,
	/// `POST` request carrying a form-encoded body.
	Post,
}

/// Outbound request descriptor handed to [`HttpClient`] implementations.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method to use.
	pub method: HttpMethod,
	/// Fully-resolved request URL.
	pub url: Url,
	/// Header name/value pairs; the keeper only sets `Authorization` and `Content-Type`.
	pub headers: Vec<(&'static str, String)>,
	/// Raw request body, if any (form-encoded for token requests).
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Builds a bodyless `GET` request for the given URL.
	pub fn get(url: Url) -> Self {
		Self { method: HttpMethod::Get, url, headers: Vec::new(), body: None }
	}

	/// Builds a `POST` request carrying the given body.
	pub fn post(url: Url, body: impl Into<Vec<u8>>) -> Self {
		Self { method: HttpMethod::Post, url, headers: Vec::new(), body: Some(body.into()) }
	}

	/// Appends a header pair.
	pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}
}

/// Raw response surfaced back to the keeper.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for 2xx status codes.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI; configure
/// any custom [`ReqwestClient`] accordingly before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = match request.method {
				HttpMethod::Get => client.get(request.url),
				HttpMethod::Post => client.post(request.url),
			};

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, body })
		})
	}
}
