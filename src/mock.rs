//! In-process mock of the Contracts Server backend for client-side contract tests.
//!
//! [`MockBackend`] serves `GET /v1/token` and `POST /v1/subscription` on a local listener with
//! the responses described by [`Settings`]. It is a test double; do not use it in production.

mod settings;

pub use settings::*;

// std
use std::net::TcpListener as StdTcpListener;
// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::State,
	http::{Method, StatusCode, Uri},
	response::{IntoResponse, Response},
	routing::any,
};
use tokio::{net::TcpListener, sync::watch, task::JoinHandle};
// self
use crate::{
	_prelude::*,
	api::{
		AccessTokenResponse, Endpoint, JWT_KEY, SUBSCRIPTION_ENDPOINT, SubscriptionResponse,
		TOKEN_ENDPOINT, decode_envelope,
	},
};

/// Failures starting or stopping the mock backend.
#[derive(Debug, ThisError)]
pub enum MockError {
	/// [`MockBackend::serve`] was called on a running backend.
	#[error("Mock backend is already serving.")]
	AlreadyServing,
	/// [`MockBackend::stop`] was called on a backend that is not running.
	#[error("Mock backend is already stopped.")]
	AlreadyStopped,
	/// Listener could not be bound.
	#[error("Failed to listen over TCP on {address}.")]
	Bind {
		/// Requested listen address.
		address: String,
		/// Underlying socket failure.
		#[source]
		source: std::io::Error,
	},
	/// Serve task panicked or was aborted.
	#[error("Mock backend serve task failed.")]
	Join(#[from] tokio::task::JoinError),
}

/// Mock Contracts Server whose behavior is fixed by [`Settings`] when it starts serving.
#[derive(Debug)]
pub struct MockBackend {
	/// Behavior applied to the next [`serve`](MockBackend::serve) call.
	pub settings: Settings,
	running: Mutex<Option<Running>>,
}
impl MockBackend {
	/// Creates a backend with the provided settings.
	pub fn new(settings: Settings) -> Self {
		Self { settings, running: Mutex::new(None) }
	}

	/// Starts serving on a background task and returns the bound `host:port` address.
	///
	/// Must be called from within a Tokio runtime. Dropping the backend without calling
	/// [`stop`](MockBackend::stop) leaves the server running until the runtime shuts down.
	pub async fn serve(&self) -> Result<String, MockError> {
		let mut running = self.running.lock();

		if running.is_some() {
			return Err(MockError::AlreadyServing);
		}

		let bind_error = |source: std::io::Error| MockError::Bind {
			address: self.settings.address.clone(),
			source,
		};
		let listener = StdTcpListener::bind(&self.settings.address).map_err(bind_error)?;

		listener.set_nonblocking(true).map_err(bind_error)?;

		let listener = TcpListener::from_std(listener).map_err(bind_error)?;
		let address = listener.local_addr().map_err(bind_error)?.to_string();
		let (shutdown, shutdown_rx) = watch::channel(false);
		let router =
			router(Shared { settings: self.settings.clone(), shutdown: shutdown_rx.clone() });
		let task = tokio::spawn(async move {
			let signal = wait_for_shutdown(shutdown_rx);

			if let Err(e) = axum::serve(listener, router).with_graceful_shutdown(signal).await {
				tracing::error!(error = %e, "failed to serve the mock contracts server");
			}
		});

		tracing::info!(%address, "mock contracts server listening");

		*running = Some(Running { address: address.clone(), shutdown, task });

		Ok(address)
	}

	/// Stops the server and waits for the serve task to finish.
	///
	/// Requests held by a `blocked` endpoint are answered with `503 server stopped` rather than
	/// having their connection dropped, so graceful shutdown can drain them.
	pub async fn stop(&self) -> Result<(), MockError> {
		let Running { shutdown, task, .. } =
			self.running.lock().take().ok_or(MockError::AlreadyStopped)?;

		shutdown.send_replace(true);
		task.await?;

		tracing::info!("mock contracts server stopped");

		Ok(())
	}

	/// Bound `host:port` address while serving.
	pub fn address(&self) -> Option<String> {
		self.running.lock().as_ref().map(|running| running.address.clone())
	}
}
impl Default for MockBackend {
	fn default() -> Self {
		Self::new(Settings::default())
	}
}

#[derive(Debug)]
struct Running {
	address: String,
	shutdown: watch::Sender<bool>,
	task: JoinHandle<()>,
}

#[derive(Clone)]
struct Shared {
	settings: Settings,
	shutdown: watch::Receiver<bool>,
}

fn router(shared: Shared) -> Router {
	let mut router = Router::new();

	if !shared.settings.token.disabled {
		router = router.route(&TOKEN_ENDPOINT.route(), any(handle_token));
	}
	if !shared.settings.subscription.disabled {
		router = router.route(&SUBSCRIPTION_ENDPOINT.route(), any(handle_subscription));
	}

	router.with_state(Arc::new(shared))
}

/// Resolves on stop; stays pending if the backend is dropped without stopping.
async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
	if rx.wait_for(|stopped| *stopped).await.is_err() {
		std::future::pending::<()>().await;
	}
}

async fn handle_token(State(shared): State<Arc<Shared>>, method: Method, uri: Uri) -> Response {
	let settings = &shared.settings;

	if let Some(rejection) = screen(&shared, &TOKEN_ENDPOINT, &settings.token, &method, &uri).await
	{
		return rejection;
	}

	Json(AccessTokenResponse::new(settings.token_value())).into_response()
}

async fn handle_subscription(
	State(shared): State<Arc<Shared>>,
	method: Method,
	uri: Uri,
	body: Bytes,
) -> Response {
	let settings = &shared.settings;

	if let Some(rejection) =
		screen(&shared, &SUBSCRIPTION_ENDPOINT, &settings.subscription, &method, &uri).await
	{
		return rejection;
	}

	let mut envelope = match decode_envelope(&body) {
		Ok(envelope) => envelope,
		Err(e) => return bad_request(&uri, "Bad Request", &e),
	};
	let user_jwt = match envelope.remove(JWT_KEY) {
		Some(user_jwt) => user_jwt,
		None => return bad_request(&uri, "JSON payload does not contain the expected key", &""),
	};

	if user_jwt.is_empty() {
		return bad_request(&uri, "JWT cannot be empty", &"");
	}

	Json(SubscriptionResponse::new(settings.subscription_value())).into_response()
}

/// Applies the checks shared by both endpoints; `Some` carries the response to send instead of
/// the token.
async fn screen(
	shared: &Shared,
	endpoint: &Endpoint,
	settings: &EndpointSettings,
	method: &Method,
	uri: &Uri,
) -> Option<Response> {
	tracing::info!(endpoint = uri.path(), %method, "received request");

	if *method != endpoint.method {
		let message = format!("this endpoint only supports {}", endpoint.method);

		return Some(bad_request(uri, &message, method));
	}
	if settings.blocked {
		wait_for_shutdown(shared.shutdown.clone()).await;

		tracing::debug!(endpoint = uri.path(), "mock server stopped while blocking");

		return Some((StatusCode::SERVICE_UNAVAILABLE, "server stopped").into_response());
	}
	if settings.status != StatusCode::OK.as_u16() {
		let status =
			StatusCode::from_u16(settings.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		tracing::warn!(endpoint = uri.path(), status = settings.status, "configured mock error");

		return Some((status, format!("mock error: {}", settings.status)).into_response());
	}

	None
}

fn bad_request(uri: &Uri, message: &str, cause: &dyn Display) -> Response {
	tracing::error!(endpoint = uri.path(), %cause, "bad request: {message}");

	(StatusCode::BAD_REQUEST, format!("{message}\n")).into_response()
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// std
	use std::time::Duration;
	// self
	use super::*;
	use crate::{
		_preludet::{base_url, serve_mock_backend},
		bound::LengthError,
		context::Context,
	};

	async fn raw_post(address: &Url, path: &str, body: &'static str) -> (u16, String) {
		let url = address.join(path).expect("Mock path should join.");
		let response = ReqwestClient::new()
			.post(url)
			.body(body)
			.send()
			.await
			.expect("Mock backend should answer raw requests.");
		let status = response.status().as_u16();
		let text = response.text().await.expect("Mock response body should be readable.");

		(status, text)
	}

	#[tokio::test]
	async fn serve_binds_ephemeral_port_once() {
		let backend = MockBackend::default();
		let address = backend.serve().await.expect("Mock backend should start.");

		assert!(address.starts_with("127.0.0.1:"));
		assert!(!address.ends_with(":0"));
		assert!(matches!(backend.serve().await, Err(MockError::AlreadyServing)));

		backend.stop().await.expect("Mock backend should stop.");

		assert!(matches!(backend.stop().await, Err(MockError::AlreadyStopped)));
	}

	#[tokio::test]
	async fn bind_failure_names_the_address() {
		let backend = MockBackend::new(Settings::default().with_address("not-an-address"));
		let err = backend.serve().await.expect_err("Invalid address should not bind.");

		assert!(matches!(err, MockError::Bind { ref address, .. } if address == "not-an-address"));
	}

	#[tokio::test]
	async fn default_settings_round_trip() {
		let (backend, client) = serve_mock_backend(Settings::default()).await;
		let ctx = Context::background();
		let access = client.get_access_token(&ctx).await.expect("Access token should be served.");
		let pro = client
			.exchange_user_token(&ctx, "validjwt")
			.await
			.expect("Pro token should be served.");

		assert_eq!(access.expose(), DEFAULT_AD_TOKEN);
		assert_eq!(pro.expose(), DEFAULT_PRO_TOKEN);

		backend.stop().await.expect("Mock backend should stop.");
	}

	#[tokio::test]
	async fn configured_values_are_served() {
		let settings =
			Settings::default().with_token_value("custom-ad").with_subscription_value("custom-pro");
		let (backend, client) = serve_mock_backend(settings).await;
		let ctx = Context::background();

		assert_eq!(
			client.get_access_token(&ctx).await.expect("Access token should be served.").expose(),
			"custom-ad"
		);
		assert_eq!(
			client
				.exchange_user_token(&ctx, "validjwt")
				.await
				.expect("Pro token should be served.")
				.expose(),
			"custom-pro"
		);

		backend.stop().await.expect("Mock backend should stop.");
	}

	#[tokio::test]
	async fn status_overrides_map_to_client_errors() {
		let settings = Settings::default().with_token_status(503).with_subscription_status(401);
		let (backend, client) = serve_mock_backend(settings).await;
		let ctx = Context::background();
		let err = client.get_access_token(&ctx).await.expect_err("503 should fail.");

		assert!(matches!(
			err,
			Error::UnexpectedStatus { status: 503, ref body } if body == "mock error: 503"
		));

		let err = client.exchange_user_token(&ctx, "validjwt").await.expect_err("401 should fail.");

		assert!(matches!(err, Error::RejectedIdentity { .. }));

		backend.stop().await.expect("Mock backend should stop.");

		let (backend, client) =
			serve_mock_backend(Settings::default().with_subscription_status(500)).await;
		let err = client.exchange_user_token(&ctx, "validjwt").await.expect_err("500 should fail.");

		assert!(matches!(err, Error::BackendValidationFailure));

		backend.stop().await.expect("Mock backend should stop.");
	}

	#[tokio::test]
	async fn wrong_method_is_a_bad_request() {
		let (backend, _) = serve_mock_backend(Settings::default()).await;
		let address = base_url(&backend_address(&backend));
		let (status, body) = raw_post(&address, "/v1/token", "").await;

		assert_eq!(status, 400);
		assert_eq!(body, "this endpoint only supports GET\n");

		let response = ReqwestClient::new()
			.get(address.join("/v1/subscription").expect("Mock path should join."))
			.send()
			.await
			.expect("Mock backend should answer.");

		assert_eq!(response.status().as_u16(), 400);

		backend.stop().await.expect("Mock backend should stop.");
	}

	#[tokio::test]
	async fn subscription_validates_request_body() {
		let (backend, _) = serve_mock_backend(Settings::default()).await;
		let address = base_url(&backend_address(&backend));

		for (body, expected) in [
			("invalid JSON", "Bad Request\n"),
			(r#"["validjwt"]"#, "Bad Request\n"),
			(r#"{"ms_store_id_key": 5}"#, "Bad Request\n"),
			(r#"{"unexpected_key": "x"}"#, "JSON payload does not contain the expected key\n"),
			(r#"{"ms_store_id_key": ""}"#, "JWT cannot be empty\n"),
		] {
			let (status, text) = raw_post(&address, "/v1/subscription", body).await;

			assert_eq!(status, 400, "Body {body:?} should be rejected.");
			assert_eq!(text, expected);
		}

		backend.stop().await.expect("Mock backend should stop.");
	}

	#[tokio::test]
	async fn disabled_endpoint_is_not_found() {
		let mut settings = Settings::default();

		settings.token.disabled = true;

		let (backend, client) = serve_mock_backend(settings).await;
		let address = base_url(&backend_address(&backend));
		let response = ReqwestClient::new()
			.get(address.join("/v1/token").expect("Mock path should join."))
			.send()
			.await
			.expect("Mock backend should answer.");

		assert_eq!(response.status().as_u16(), 404);

		// The 404 has an empty body, which fails the length bound before the status is read.
		let err = client
			.get_access_token(&Context::background())
			.await
			.expect_err("Disabled endpoint should fail.");

		assert!(matches!(err, Error::InvalidLength { source: LengthError::Empty, .. }));

		client
			.exchange_user_token(&Context::background(), "validjwt")
			.await
			.expect("Other endpoint should keep serving.");

		backend.stop().await.expect("Mock backend should stop.");
	}

	#[tokio::test]
	async fn blocked_endpoint_holds_until_stop() {
		let mut settings = Settings::default();

		settings.token.blocked = true;

		let (backend, client) = serve_mock_backend(settings).await;
		let pending = {
			let client = client.clone();

			tokio::spawn(async move { client.get_access_token(&Context::background()).await })
		};

		tokio::time::sleep(Duration::from_millis(50)).await;

		assert!(!pending.is_finished(), "Blocked endpoint should not answer before stop.");

		backend.stop().await.expect("Mock backend should stop.");

		let err = pending
			.await
			.expect("Blocked request task should not panic.")
			.expect_err("Stopped server should not serve a token.");

		assert!(matches!(
			err,
			Error::UnexpectedStatus { status: 503, ref body } if body == "server stopped"
		));
	}

	#[tokio::test]
	async fn cancellation_releases_blocked_request() {
		let mut settings = Settings::default();

		settings.subscription.blocked = true;

		let (backend, client) = serve_mock_backend(settings).await;
		let (ctx, handle) = Context::with_cancel();
		let pending = {
			let client = client.clone();
			let ctx = ctx.clone();

			tokio::spawn(async move { client.exchange_user_token(&ctx, "validjwt").await })
		};

		tokio::time::sleep(Duration::from_millis(50)).await;
		handle.cancel();

		let result = tokio::time::timeout(Duration::from_secs(5), pending)
			.await
			.expect("Cancelled request should return promptly.")
			.expect("Blocked request task should not panic.");

		assert!(matches!(result, Err(Error::Cancelled)));

		backend.stop().await.expect("Mock backend should stop.");
	}

	fn backend_address(backend: &MockBackend) -> String {
		backend.address().expect("Running backend should expose its address.")
	}
}
