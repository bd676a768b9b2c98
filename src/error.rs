//! Client-level error types shared by both token exchanges.
//!
//! Every call makes exactly one attempt; none of these errors is retried by the crate. Messages
//! never contain the user JWT or any returned token.

// self
use crate::{
	_prelude::*,
	bound::{LengthError, Payload},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller cancelled the context before the exchange completed.
	#[error("Request was cancelled before the contracts server replied.")]
	Cancelled,
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, body read).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Inbound or outbound payload violates the size bound.
	#[error("Invalid {payload} length: {source}.")]
	InvalidLength {
		/// Which payload failed the bound.
		payload: Payload,
		/// Bound violation details.
		#[source]
		source: LengthError,
	},
	/// Response body is not a flat JSON object of strings.
	#[error("Contracts server returned malformed JSON.")]
	MalformedBody {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response JSON is well formed but lacks the token key.
	#[error("Expected key `{key}` not found in the response.")]
	MissingField {
		/// JSON key the endpoint should have returned.
		key: &'static str,
	},
	/// Backend judged the user JWT invalid (HTTP 401).
	#[error("Contracts server rejected the user JWT (fingerprint {fingerprint}).")]
	RejectedIdentity {
		/// Short SHA-256 fingerprint of the rejected JWT; never the JWT itself.
		fingerprint: String,
	},
	/// Backend could not validate the entitlement against the upstream store (HTTP 500).
	#[error("Contracts server could not validate the user entitlement against the store.")]
	BackendValidationFailure,
	/// Backend replied with a status outside the documented contract.
	#[error("Contracts server replied with an unexpected status {status}: {body}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Raw response body, lossily decoded as UTF-8.
		body: String,
	},
}
impl Error {
	/// Returns a stable label for the error kind, suitable for metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Cancelled => "cancelled",
			Self::Config(_) => "config",
			Self::Transport(_) => "transport",
			Self::InvalidLength { .. } => "invalid_length",
			Self::MalformedBody { .. } => "malformed_body",
			Self::MissingField { .. } => "missing_field",
			Self::RejectedIdentity { .. } => "rejected_identity",
			Self::BackendValidationFailure => "backend_validation_failure",
			Self::UnexpectedStatus { .. } => "unexpected_status",
		}
	}

	pub(crate) fn invalid_length(payload: Payload, source: LengthError) -> Self {
		Self::InvalidLength { payload, source }
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Base URL cannot carry path segments (e.g. `mailto:`).
	#[error("Base URL `{url}` cannot be extended with API paths.")]
	InvalidBaseUrl {
		/// Offending base URL.
		url: String,
	},
	/// Request body could not be encoded.
	#[error("Request body could not be encoded.")]
	RequestEncode(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client failed to execute the request.
	#[error("Network error occurred while calling the contracts server.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client failed while reading the response body.
	#[error("Failed to read the contracts server response body.")]
	Body {
		/// Transport-specific read error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific body read error.
	pub fn body(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Body { source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn messages_identify_the_failure() {
		let err = Error::invalid_length(Payload::UserJwt, LengthError::Empty);

		assert_eq!(err.to_string(), "Invalid user JWT length: empty.");
		assert_eq!(
			Error::MissingField { key: "azure_ad_token" }.to_string(),
			"Expected key `azure_ad_token` not found in the response."
		);
		assert_eq!(
			Error::UnexpectedStatus { status: 422, body: "nope".into() }.to_string(),
			"Contracts server replied with an unexpected status 422: nope."
		);
	}
}
