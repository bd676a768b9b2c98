//! Contracts Server REST API constants shared by the client and the mock backend.
//!
//! Paths, JSON keys, and the payload size limit live here only, so the client and the mock
//! backend can never disagree about the wire contract.

pub mod wire;

pub use wire::*;

// crates.io
use http::Method;
// self
use crate::_prelude::*;

/// Current Contracts Server REST API version prefix.
pub const VERSION: &str = "/v1";
/// Path where clients GET the short-lived access token.
pub const TOKEN_PATH: &str = "/token";
/// Path where clients POST the user JWT to obtain a Pro token.
pub const SUBSCRIPTION_PATH: &str = "/subscription";
/// Largest token-bearing payload accepted in either direction, in bytes.
///
/// Real access tokens stay between 1.2kB and 1.7kB; Pro tokens are much smaller.
pub const TOKEN_MAX_SIZE: u64 = 4096;
/// JSON key of the access token in the `/v1/token` response.
pub const AD_TOKEN_KEY: &str = "azure_ad_token";
/// JSON key of the user JWT in the `/v1/subscription` request.
pub const JWT_KEY: &str = "ms_store_id_key";
/// JSON key of the Pro token in the `/v1/subscription` response.
pub const PRO_TOKEN_KEY: &str = "contract_token";

/// Access token endpoint.
pub const TOKEN_ENDPOINT: Endpoint = Endpoint {
	name: "access_token",
	method: Method::GET,
	path: TOKEN_PATH,
	request_key: None,
	response_key: AD_TOKEN_KEY,
};
/// Entitlement exchange endpoint.
pub const SUBSCRIPTION_ENDPOINT: Endpoint = Endpoint {
	name: "subscription",
	method: Method::POST,
	path: SUBSCRIPTION_PATH,
	request_key: Some(JWT_KEY),
	response_key: PRO_TOKEN_KEY,
};

/// Fixed binding between an operation and its HTTP method, path, and JSON keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
	/// Stable label used in spans and logs.
	pub name: &'static str,
	/// HTTP method the endpoint accepts.
	pub method: Method,
	/// Path suffix below [`VERSION`].
	pub path: &'static str,
	/// JSON key carried by the request body, if the endpoint takes one.
	pub request_key: Option<&'static str>,
	/// JSON key carrying the token in the response body.
	pub response_key: &'static str,
}
impl Endpoint {
	/// Full route served by the backend, e.g. `/v1/token`.
	pub fn route(&self) -> String {
		format!("{VERSION}{}", self.path)
	}

	/// Path segments appended to a base URL, e.g. `["v1", "token"]`.
	pub fn segments(&self) -> impl Iterator<Item = &'static str> {
		[VERSION, self.path].into_iter().flat_map(|part| part.split('/')).filter(|s| !s.is_empty())
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} {}{}", self.method, VERSION, self.path)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn routes_join_version_and_path() {
		assert_eq!(TOKEN_ENDPOINT.route(), "/v1/token");
		assert_eq!(SUBSCRIPTION_ENDPOINT.route(), "/v1/subscription");
		assert_eq!(SUBSCRIPTION_ENDPOINT.segments().collect::<Vec<_>>(), ["v1", "subscription"]);
		assert_eq!(TOKEN_ENDPOINT.to_string(), "GET /v1/token");
	}
}
