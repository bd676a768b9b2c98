//! Caller-owned cancellation for token exchanges.
//!
//! The client imposes no timeouts of its own. Callers wanting a deadline cancel the context from
//! a timer they control.

// crates.io
use tokio::sync::watch;
// self
use crate::_prelude::*;

/// Cancellation scope passed to every exchange.
#[derive(Clone, Debug)]
pub struct Context {
	cancelled: Option<watch::Receiver<bool>>,
}
impl Context {
	/// Context that is never cancelled.
	pub fn background() -> Self {
		Self { cancelled: None }
	}

	/// Context cancelled through the returned [`CancelHandle`].
	pub fn with_cancel() -> (Self, CancelHandle) {
		let (tx, rx) = watch::channel(false);

		(Self { cancelled: Some(rx) }, CancelHandle(tx))
	}

	/// Returns whether the context has been cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.as_ref().is_some_and(|rx| *rx.borrow())
	}

	/// Resolves once the context is cancelled; never resolves for [`Context::background`] or
	/// when the handle is dropped without cancelling.
	pub async fn cancelled(&self) {
		if let Some(rx) = &self.cancelled {
			let mut rx = rx.clone();

			if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
				return;
			}
		}

		std::future::pending::<()>().await
	}

	/// Runs `fut` unless the context is, or becomes, cancelled first.
	pub async fn run<F, T>(&self, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		if self.is_cancelled() {
			return Err(Error::Cancelled);
		}

		tokio::select! {
			biased;
			_ = self.cancelled() => Err(Error::Cancelled),
			result = fut => result,
		}
	}
}
impl Default for Context {
	fn default() -> Self {
		Self::background()
	}
}

/// Cancels the [`Context`] it was created with, and every clone of it.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);
impl CancelHandle {
	/// Cancels the context. Idempotent.
	pub fn cancel(&self) {
		self.0.send_replace(true);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn background_runs_to_completion() {
		let value = Context::background().run(async { Ok(7) }).await.expect("Run should succeed.");

		assert_eq!(value, 7);
	}

	#[tokio::test]
	async fn cancelled_context_fails_fast() {
		let (ctx, handle) = Context::with_cancel();

		handle.cancel();

		assert!(ctx.is_cancelled());

		let err = ctx
			.run(std::future::pending::<Result<()>>())
			.await
			.expect_err("Cancelled context must not wait on the future.");

		assert!(matches!(err, Error::Cancelled));
	}

	#[tokio::test]
	async fn cancelling_mid_flight_aborts_the_future() {
		let (ctx, handle) = Context::with_cancel();
		let clone = ctx.clone();
		let task = tokio::spawn(async move { clone.run(std::future::pending::<Result<()>>()).await });

		tokio::task::yield_now().await;
		handle.cancel();

		let result = task.await.expect("Task should not panic.");

		assert!(matches!(result, Err(Error::Cancelled)));
	}

	#[tokio::test]
	async fn dropped_handle_does_not_cancel() {
		let (ctx, handle) = Context::with_cancel();

		drop(handle);

		assert!(!ctx.is_cancelled());
		assert_eq!(ctx.run(async { Ok(1) }).await.expect("Run should succeed."), 1);
	}
}
