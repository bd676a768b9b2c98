//! Spans and counters around the two Contracts Server exchanges.
//!
//! Each call to [`get_access_token`](crate::client::ContractsClient::get_access_token) or
//! [`exchange_user_token`](crate::client::ContractsClient::exchange_user_token) records one
//! `attempt` and then exactly one `success` or `failure`. A failure also records the
//! [`Error::kind`] label (`invalid_length`, `rejected_identity`, ...).
//!
//! Without the matching feature each helper compiles to a no-op. The default `mock` feature
//! turns on `tracing`; `metrics` is always opt-in.
//!
//! - `tracing` wraps the exchange in a `contracts_client.exchange` span carrying the `exchange`
//!   label and the public method name as `stage`, and logs the failure kind at debug level.
//! - `metrics` feeds `contracts_client_exchange_total{exchange, outcome}` and
//!   `contracts_client_exchange_errors_total{exchange, kind}`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Which endpoint an exchange talks to; the `exchange` label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
	/// `GET /v1/token`.
	AccessToken,
	/// `POST /v1/subscription`.
	ProToken,
}
impl ExchangeKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeKind::AccessToken => "access_token",
			ExchangeKind::ProToken => "pro_token",
		}
	}
}
impl Display for ExchangeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Stage of a single exchange call; the `outcome` label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
	/// Call entered, before the JWT bound or any request.
	Attempt,
	/// Token decoded and returned to the caller.
	Success,
	/// Any [`Error`], cancellation included.
	Failure,
}
impl ExchangeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeOutcome::Attempt => "attempt",
			ExchangeOutcome::Success => "success",
			ExchangeOutcome::Failure => "failure",
		}
	}
}
impl Display for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
