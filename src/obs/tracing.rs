// self
use crate::{_prelude::*, obs::FetchKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFetch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFetch<F> = F;

/// A span builder used by keeper operations.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the provided fetch kind + stage.
	pub fn new(kind: FetchKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_keeper.fetch", endpoint = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFetch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warning line through `tracing` when the feature is enabled.
pub fn warn(message: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::warn!("{message}");
	#[cfg(not(feature = "tracing"))]
	{
		let _ = message;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn fetch_span_builds_without_tracing() {
		let span = FetchSpan::new(FetchKind::Orders, "test");
		// Compile-time smoke test; the span must exist even when tracing is disabled.
		let _ = format!("{span:?}");
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FetchSpan::new(FetchKind::Token, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
