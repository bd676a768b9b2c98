//! Transport primitives for Contracts Server exchanges.
//!
//! [`ContractsHttpClient`] is the client's only dependency on an HTTP stack. It executes one
//! request and hands back a [`TransportResponse`] whose body has not been read yet, so the
//! client can reject an unbounded or oversized body before buffering it.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Request handed to the transport.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Future returned by [`ContractsHttpClient::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<TransportResponse<E>, E>> + 'a + Send>>;
/// Deferred body read; dropping it without polling discards the body.
pub type BodyFuture<E> = Pin<Box<dyn Future<Output = Result<Vec<u8>, E>> + Send>>;

/// Abstraction over HTTP transports able to execute Contracts Server requests.
///
/// Connection pooling, TLS, and timeouts belong to the implementation. The client calls
/// [`execute`](ContractsHttpClient::execute) exactly once per exchange and never retries.
/// Implementations must be `Send + Sync + 'static` so a single transport can back many clients
/// used concurrently.
pub trait ContractsHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request`, resolving once the status line and headers are available.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Response head plus a body that is only read on demand.
pub struct TransportResponse<E> {
	/// HTTP status returned by the backend.
	pub status: http::StatusCode,
	/// Declared body length; `None` when the backend did not report one.
	pub content_length: Option<u64>,
	body: BodyFuture<E>,
}
impl<E> TransportResponse<E>
where
	E: 'static + Send,
{
	/// Builds a response whose body is read through `body`.
	pub fn new(status: http::StatusCode, content_length: Option<u64>, body: BodyFuture<E>) -> Self {
		Self { status, content_length, body }
	}

	/// Builds a response around an in-memory body, declaring its exact length.
	pub fn from_bytes(status: http::StatusCode, body: impl Into<Vec<u8>>) -> Self {
		let body = body.into();
		let content_length = u64::try_from(body.len()).ok();

		Self::new(status, content_length, Box::pin(async move { Ok(body) }))
	}

	/// Overrides the declared length, e.g. to simulate a backend that omits `Content-Length`.
	pub fn with_content_length(mut self, content_length: Option<u64>) -> Self {
		self.content_length = content_length;

		self
	}

	/// Reads the whole body.
	pub async fn read_body(self) -> Result<Vec<u8>, E> {
		self.body.await
	}
}
impl<E> Debug for TransportResponse<E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TransportResponse")
			.field("status", &self.status)
			.field("content_length", &self.content_length)
			.finish_non_exhaustive()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints answer directly, so [`ReqwestHttpClient::new`] disables redirect following.
/// Configure any custom [`ReqwestClient`] passed to [`ReqwestHttpClient::with_client`] the same
/// way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a reqwest client that does not follow redirects.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

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
impl ContractsHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = self.0.execute(request).await?;
			let status = response.status();
			let content_length = response.content_length();
			let body: BodyFuture<ReqwestError> =
				Box::pin(async move { response.bytes().await.map(|bytes| bytes.to_vec()) });

			Ok(TransportResponse::new(status, content_length, body))
		})
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
