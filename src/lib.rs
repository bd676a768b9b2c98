//! Client for the Contracts Server token exchange: fetch a short-lived access token, then trade
//! a user identity assertion (JWT) for an opaque Pro token, with size-bounded responses and a
//! small, typed error taxonomy.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod bound;
pub mod client;
pub mod context;
pub mod error;
pub mod http;
#[cfg(feature = "mock")] pub mod mock;
pub mod obs;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest", feature = "mock"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use reqwest::redirect::Policy;
	// self
	use crate::{
		client::{ContractsClient, ReqwestContractsClient},
		http::ReqwestHttpClient,
		mock::{MockBackend, Settings},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests. Redirects stay disabled, as in [`ReqwestHttpClient::new`].
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Starts a [`MockBackend`] with `settings` and returns it alongside a reqwest-backed client
	/// pointed at the bound address.
	pub async fn serve_mock_backend(settings: Settings) -> (MockBackend, ReqwestContractsClient) {
		let backend = MockBackend::new(settings);
		let address = backend.serve().await.expect("Mock backend should bind a local address.");
		let client =
			ContractsClient::with_http_client(base_url(&address), test_reqwest_http_client());

		(backend, client)
	}

	/// Builds the base URL for a `host:port` address returned by the mock backend.
	pub fn base_url(address: &str) -> Url {
		Url::parse(&format!("http://{address}")).expect("Mock backend address should form a URL.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "cli")]
use {clap as _, color_eyre as _, serde_yaml as _, tracing_subscriber as _};
#[cfg(test)] use httpmock as _;
