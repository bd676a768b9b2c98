//! Size bound applied to every token-bearing payload, inbound or outbound.

// self
use crate::{_prelude::*, api::TOKEN_MAX_SIZE};

/// Payload whose length failed the bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload {
	/// Body of a Contracts Server response.
	ResponseBody,
	/// User JWT about to be sent to the Contracts Server.
	UserJwt,
}
impl Payload {
	/// Returns a stable label suitable for error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			Payload::ResponseBody => "response content",
			Payload::UserJwt => "user JWT",
		}
	}
}
impl Display for Payload {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Reasons a length falls outside `0 < length <= TOKEN_MAX_SIZE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum LengthError {
	/// Length was not reported, so the body would have to be streamed without a bound.
	#[error("length is unknown")]
	Unknown,
	/// Payload is empty.
	#[error("empty")]
	Empty,
	/// Payload exceeds the limit.
	#[error("too big: {length} bytes, limit is {limit}")]
	TooLarge {
		/// Observed length in bytes.
		length: u64,
		/// Maximum accepted length in bytes.
		limit: u64,
	},
}

/// Checks that `0 < length <= TOKEN_MAX_SIZE`; `None` stands for an unknown length.
pub fn check_length(length: Option<u64>) -> Result<(), LengthError> {
	match length {
		None => Err(LengthError::Unknown),
		Some(0) => Err(LengthError::Empty),
		Some(length) if length > TOKEN_MAX_SIZE =>
			Err(LengthError::TooLarge { length, limit: TOKEN_MAX_SIZE }),
		Some(_) => Ok(()),
	}
}

/// [`check_length`] for an in-memory payload.
pub fn check_len(payload: &[u8]) -> Result<(), LengthError> {
	check_length(Some(u64::try_from(payload.len()).unwrap_or(u64::MAX)))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn accepts_only_lengths_inside_the_bound() {
		assert_eq!(check_length(None), Err(LengthError::Unknown));
		assert_eq!(check_length(Some(0)), Err(LengthError::Empty));
		assert_eq!(check_length(Some(1)), Ok(()));
		assert_eq!(check_length(Some(TOKEN_MAX_SIZE)), Ok(()));
		assert_eq!(
			check_length(Some(TOKEN_MAX_SIZE + 1)),
			Err(LengthError::TooLarge { length: TOKEN_MAX_SIZE + 1, limit: TOKEN_MAX_SIZE })
		);
	}

	#[test]
	fn slice_helper_matches_declared_check() {
		assert_eq!(check_len(b""), Err(LengthError::Empty));
		assert_eq!(check_len(&[b'x'; 4096]), Ok(()));
		assert!(matches!(check_len(&[b'x'; 4097]), Err(LengthError::TooLarge { .. })));
	}

	#[test]
	fn error_messages_name_the_limit() {
		let err = LengthError::TooLarge { length: 5000, limit: TOKEN_MAX_SIZE };

		assert_eq!(err.to_string(), "too big: 5000 bytes, limit is 4096");
	}
}
