// self
use crate::{
	_prelude::*,
	obs::{ExchangeKind, ExchangeOutcome},
};

/// Records an exchange outcome via the global metrics recorder (when enabled).
pub fn record_exchange_outcome(kind: ExchangeKind, outcome: ExchangeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"contracts_client_exchange_total",
			"exchange" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records the error kind of a failed exchange (when enabled).
pub fn record_exchange_error(kind: ExchangeKind, error: &Error) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"contracts_client_exchange_errors_total",
			"exchange" => kind.as_str(),
			"kind" => error.kind()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, error);
	}
}
