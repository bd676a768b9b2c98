//! Mock backend settings, loadable from YAML by the `contracts-mock` binary.

// self
use crate::_prelude::*;

/// Value returned by default to `GET /v1/token`, wrapped in a JSON object.
pub const DEFAULT_AD_TOKEN: &str = "eHy_ADToken";
/// Value returned by default to `POST /v1/subscription`, wrapped in a JSON object.
pub const DEFAULT_PRO_TOKEN: &str = "CHx_ProToken";
/// Default listen address; port 0 picks an ephemeral port.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:0";

/// Behavior of the mock backend. Changes after [`serve`](crate::mock::MockBackend::serve) have
/// no effect on the running server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// `GET /v1/token` behavior.
	pub token: EndpointSettings,
	/// `POST /v1/subscription` behavior.
	pub subscription: EndpointSettings,
	/// Address to listen on.
	pub address: String,
}
impl Settings {
	/// Overrides the access token returned on success.
	pub fn with_token_value(mut self, value: impl Into<String>) -> Self {
		self.token.value = Some(value.into());

		self
	}

	/// Overrides the status code of the access token endpoint.
	pub fn with_token_status(mut self, status: u16) -> Self {
		self.token.status = status;

		self
	}

	/// Overrides the Pro token returned on success.
	pub fn with_subscription_value(mut self, value: impl Into<String>) -> Self {
		self.subscription.value = Some(value.into());

		self
	}

	/// Overrides the status code of the subscription endpoint.
	pub fn with_subscription_status(mut self, status: u16) -> Self {
		self.subscription.status = status;

		self
	}

	/// Overrides the listen address.
	pub fn with_address(mut self, address: impl Into<String>) -> Self {
		self.address = address.into();

		self
	}

	pub(crate) fn token_value(&self) -> &str {
		self.token.value.as_deref().unwrap_or(DEFAULT_AD_TOKEN)
	}

	pub(crate) fn subscription_value(&self) -> &str {
		self.subscription.value.as_deref().unwrap_or(DEFAULT_PRO_TOKEN)
	}
}
impl Default for Settings {
	fn default() -> Self {
		Self {
			token: EndpointSettings {
				value: Some(DEFAULT_AD_TOKEN.into()),
				..EndpointSettings::default()
			},
			subscription: EndpointSettings {
				value: Some(DEFAULT_PRO_TOKEN.into()),
				..EndpointSettings::default()
			},
			address: DEFAULT_ADDRESS.into(),
		}
	}
}

/// Behavior of a single endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
	/// Token returned on success; `None` falls back to the endpoint's default sentinel.
	pub value: Option<String>,
	/// Status code; anything but 200 short-circuits with a mock error body.
	pub status: u16,
	/// Leaves the route unmounted, so requests get 404.
	pub disabled: bool,
	/// Holds every request open until the backend is stopped, then answers it with
	/// `503 server stopped` before the connection closes.
	pub blocked: bool,
}
impl Default for EndpointSettings {
	fn default() -> Self {
		Self { value: None, status: 200, disabled: false, blocked: false }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_use_sentinel_tokens() {
		let settings = Settings::default();

		assert_eq!(settings.token_value(), DEFAULT_AD_TOKEN);
		assert_eq!(settings.subscription_value(), DEFAULT_PRO_TOKEN);
		assert_eq!(settings.token.status, 200);
		assert_eq!(settings.address, DEFAULT_ADDRESS);
	}

	#[test]
	fn knobs_override_independently() {
		let settings = Settings::default().with_token_status(500).with_subscription_value("other");

		assert_eq!(settings.token.status, 500);
		assert_eq!(settings.token_value(), DEFAULT_AD_TOKEN);
		assert_eq!(settings.subscription.status, 200);
		assert_eq!(settings.subscription_value(), "other");
	}

	#[test]
	fn partial_endpoint_keeps_default_value() {
		let settings: Settings = serde_json::from_str(r#"{"token":{"blocked":true}}"#)
			.expect("Partial settings should deserialize.");

		assert!(settings.token.blocked);
		assert_eq!(settings.token.status, 200);
		assert_eq!(settings.token_value(), DEFAULT_AD_TOKEN);
		assert_eq!(settings.subscription, Settings::default().subscription);
	}
}
