//! JSON envelopes exchanged with the Contracts Server.
//!
//! Every body on the wire is a flat JSON object whose values are all strings. Inbound bodies are
//! decoded as an [`Envelope`] so anything else (arrays, nested or non-string values, `null`) is
//! rejected before a key is looked up. The named records below are what each side writes.

// std
use std::collections::BTreeMap;
// self
use crate::_prelude::*;

/// Decoded Contracts Server body: JSON keys to string values.
pub type Envelope = BTreeMap<String, String>;

/// Decodes `body` as a flat JSON object of strings; bytes after the object are ignored.
pub fn decode_envelope(
	body: &[u8],
) -> Result<Envelope, serde_path_to_error::Error<serde_json::Error>> {
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
}

/// Response body of `GET /v1/token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccessTokenResponse {
	/// Short-lived access token.
	#[serde(rename = "azure_ad_token")]
	pub token: String,
}
impl AccessTokenResponse {
	/// Wraps a token value.
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: token.into() }
	}
}

/// Request body of `POST /v1/subscription`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRequest {
	/// User JWT generated on the client.
	#[serde(rename = "ms_store_id_key")]
	pub user_jwt: String,
}
impl SubscriptionRequest {
	/// Wraps a user JWT.
	pub fn new(user_jwt: impl Into<String>) -> Self {
		Self { user_jwt: user_jwt.into() }
	}
}
impl Debug for SubscriptionRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SubscriptionRequest").field("user_jwt", &"<redacted>").finish()
	}
}

/// Response body of `POST /v1/subscription`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubscriptionResponse {
	/// Pro token granted for the user's entitlement.
	#[serde(rename = "contract_token")]
	pub token: String,
}
impl SubscriptionResponse {
	/// Wraps a token value.
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: token.into() }
	}
}
