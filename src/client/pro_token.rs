//! `POST /v1/subscription`: trade a user JWT for a Pro token.

// crates.io
use http::StatusCode;
// self
use crate::{
	_prelude::*,
	api::{PRO_TOKEN_KEY, SUBSCRIPTION_ENDPOINT, SubscriptionRequest},
	bound::{self, Payload},
	client::{self, ContractsClient},
	context::Context,
	error::ConfigError,
	http::ContractsHttpClient,
	obs::{self, ExchangeKind, ExchangeOutcome, ExchangeSpan},
	token::{self, ProToken},
};

impl<C> ContractsClient<C>
where
	C: ?Sized + ContractsHttpClient,
{
	/// Exchanges `user_jwt` for the Pro token tied to the user's subscription.
	///
	/// The JWT must satisfy the same size bound as responses; an empty or oversized JWT is
	/// rejected before any request is sent. Status codes map as follows: 401 is
	/// [`Error::RejectedIdentity`], 500 is [`Error::BackendValidationFailure`], and anything other
	/// than 200 is [`Error::UnexpectedStatus`].
	pub async fn exchange_user_token(&self, ctx: &Context, user_jwt: &str) -> Result<ProToken> {
		const KIND: ExchangeKind = ExchangeKind::ProToken;

		let span = ExchangeSpan::new(KIND, "exchange_user_token");

		obs::record_exchange_outcome(KIND, ExchangeOutcome::Attempt);

		let result = span
			.instrument(async {
				bound::check_len(user_jwt.as_bytes())
					.map_err(|e| Error::invalid_length(Payload::UserJwt, e))?;

				ctx.run(self.post_user_token(user_jwt)).await
			})
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

	async fn post_user_token(&self, user_jwt: &str) -> Result<ProToken> {
		let body =
			serde_json::to_vec(&SubscriptionRequest::new(user_jwt)).map_err(ConfigError::from)?;
		let request = self.build_request(&SUBSCRIPTION_ENDPOINT, body)?;
		let response = self.send(request).await?;

		match response.status {
			StatusCode::OK => (),
			StatusCode::UNAUTHORIZED =>
				return Err(Error::RejectedIdentity { fingerprint: token::fingerprint(user_jwt) }),
			StatusCode::INTERNAL_SERVER_ERROR => return Err(Error::BackendValidationFailure),
			_ => return Err(client::unexpected_status(response).await),
		}

		let body = client::read_bounded(response).await?;
		let token = client::decode_token(&body, PRO_TOKEN_KEY)?;

		Ok(ProToken::new(token))
	}
}
