//! `GET /v1/token`: fetch the short-lived access token identifying the backend.

// crates.io
use http::StatusCode;
// self
use crate::{
	_prelude::*,
	api::{AD_TOKEN_KEY, TOKEN_ENDPOINT},
	client::{self, ContractsClient},
	context::Context,
	http::ContractsHttpClient,
	obs::{self, ExchangeKind, ExchangeOutcome, ExchangeSpan},
	token::AccessToken,
};

impl<C> ContractsClient<C>
where
	C: ?Sized + ContractsHttpClient,
{
	/// Returns a short-lived access token identifying the Contracts Server backend.
	///
	/// The body must be a flat JSON object of strings. A present-but-empty token value is
	/// returned as is; only a missing key is an error.
	pub async fn get_access_token(&self, ctx: &Context) -> Result<AccessToken> {
		const KIND: ExchangeKind = ExchangeKind::AccessToken;

		let span = ExchangeSpan::new(KIND, "get_access_token");

		obs::record_exchange_outcome(KIND, ExchangeOutcome::Attempt);

		let result = span
			.instrument(ctx.run(async {
				let request = self.build_request(&TOKEN_ENDPOINT, Vec::new())?;
				let response = self.send(request).await?;

				if response.status != StatusCode::OK {
					return Err(client::unexpected_status(response).await);
				}

				let body = client::read_bounded(response).await?;
				let token = client::decode_token(&body, AD_TOKEN_KEY)?;

				Ok(AccessToken::new(token))
			}))
			.await;

		match &result {
			Ok(_) => obs::record_exchange_outcome(KIND, ExchangeOutcome::Success),
			Err(e) => {
				span.record_failure(e);
				obs::record_exchange_outcome(KIND, ExchangeOutcome::Failure);
				obs::record_exchange_error(KIND, e);
			},
		}

		result
	}
}
