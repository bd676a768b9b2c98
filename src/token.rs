//! Opaque token wrappers that keep secrets out of logs.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Short-lived access token returned by `GET /v1/token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Pro token returned by `POST /v1/subscription` for a validated entitlement.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProToken(String);
impl ProToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for ProToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for ProToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ProToken").field(&"<redacted>").finish()
	}
}
impl Display for ProToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Derives a short, non-reversible label for identity material so errors and logs can refer to
/// it without carrying it.
///
/// The label is the first 9 bytes of the SHA-256 digest, base64url-encoded (12 characters).
pub fn fingerprint(secret: &str) -> String {
	let digest = Sha256::digest(secret.as_bytes());

	URL_SAFE_NO_PAD.encode(&digest[..9])
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let access = AccessToken::new("eHy_ADToken");
		let pro = ProToken::new("CHx_ProToken");

		assert_eq!(format!("{access:?}"), "AccessToken(\"<redacted>\")");
		assert_eq!(format!("{pro:?}"), "ProToken(\"<redacted>\")");
		assert_eq!(format!("{access}"), "<redacted>");
		assert_eq!(pro.expose(), "CHx_ProToken");
	}

	#[test]
	fn fingerprint_is_stable_and_hides_input() {
		let jwt = "header.payload.signature";
		let label = fingerprint(jwt);

		assert_eq!(label.len(), 12);
		assert_eq!(label, fingerprint(jwt));
		assert_ne!(label, fingerprint("other.jwt.value"));
		assert!(!label.contains("payload"));
	}
}
