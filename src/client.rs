//! Contracts Server client.
//!
//! [`ContractsClient`] owns an immutable base URL and an injected [`ContractsHttpClient`]. Each
//! exchange performs exactly one request, bounds the response before buffering it, and maps the
//! outcome into [`Error`]. Nothing is retried, cached, or refreshed here; callers own retry
//! policy and token lifetime.

mod access_token;
mod pro_token;

// crates.io
use http::header::{ACCEPT, CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	api::{self, Endpoint},
	bound::{self, Payload},
	error::{ConfigError, TransportError},
	http::{ContractsHttpClient, HttpRequest, TransportResponse},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const APPLICATION_JSON: &str = "application/json";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestContractsClient = ContractsClient<ReqwestHttpClient>;

/// Talks to the Contracts Server backend.
///
/// The client holds no mutable state, so one instance can serve concurrent callers as long as
/// the injected transport is itself safe to share.
pub struct ContractsClient<C>
where
	C: ?Sized + ContractsHttpClient,
{
	/// Base URL the API version and endpoint paths are appended to.
	pub base_url: Url,
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
}
impl<C> ContractsClient<C>
where
	C: ?Sized + ContractsHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(base_url: Url, http_client: impl Into<Arc<C>>) -> Self {
		Self { base_url, http_client: http_client.into() }
	}

	/// Resolves `base_url + /v1 + endpoint path`, keeping any path prefix of the base URL.
	pub fn endpoint_url(&self, endpoint: &Endpoint) -> Result<Url> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidBaseUrl { url: self.base_url.to_string() })?
			.pop_if_empty()
			.extend(endpoint.segments());

		Ok(url)
	}

	fn build_request(&self, endpoint: &Endpoint, body: Vec<u8>) -> Result<HttpRequest> {
		let url = self.endpoint_url(endpoint)?;
		let mut builder = http::Request::builder()
			.method(endpoint.method.clone())
			.uri(url.as_str())
			.header(ACCEPT, APPLICATION_JSON);

		if !body.is_empty() {
			builder = builder.header(CONTENT_TYPE, APPLICATION_JSON);
		}

		builder.body(body).map_err(|e| ConfigError::from(e).into())
	}

	async fn send(&self, request: HttpRequest) -> Result<TransportResponse<C::TransportError>> {
		let response = self.http_client.execute(request).await.map_err(TransportError::network)?;

		bound::check_length(response.content_length)
			.map_err(|e| Error::invalid_length(Payload::ResponseBody, e))?;

		Ok(response)
	}
}
#[cfg(feature = "reqwest")]
impl ContractsClient<ReqwestHttpClient> {
	/// Creates a client backed by a fresh reqwest transport that does not follow redirects.
	pub fn new(base_url: Url) -> Result<Self> {
		Ok(Self::with_http_client(base_url, ReqwestHttpClient::new()?))
	}
}
impl<C> Clone for ContractsClient<C>
where
	C: ?Sized + ContractsHttpClient,
{
	fn clone(&self) -> Self {
		Self { base_url: self.base_url.clone(), http_client: Arc::clone(&self.http_client) }
	}
}
impl<C> Debug for ContractsClient<C>
where
	C: ?Sized + ContractsHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ContractsClient").field("base_url", &self.base_url.as_str()).finish()
	}
}

/// Reads the body and re-checks the bound against the bytes actually received.
async fn read_bounded<E>(response: TransportResponse<E>) -> Result<Vec<u8>>
where
	E: 'static + Send + Sync + StdError,
{
	let body = response.read_body().await.map_err(TransportError::body)?;

	bound::check_len(&body).map_err(|e| Error::invalid_length(Payload::ResponseBody, e))?;

	Ok(body)
}

/// Decodes a flat JSON envelope and takes the token stored under `key`.
fn decode_token(body: &[u8], key: &'static str) -> Result<String> {
	let mut envelope =
		api::decode_envelope(body).map_err(|source| Error::MalformedBody { source })?;

	envelope.remove(key).ok_or(Error::MissingField { key })
}

/// Builds [`Error::UnexpectedStatus`]; the status survives a body that cannot be read.
async fn unexpected_status<E>(response: TransportResponse<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let status = response.status.as_u16();
	let body = match read_bounded(response).await {
		Ok(body) => String::from_utf8_lossy(&body).into_owned(),
		Err(e) => format!("<body unavailable: {e}>"),
	};

	Error::UnexpectedStatus { status, body }
}
