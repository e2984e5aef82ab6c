// self
use crate::{
	_prelude::*,
	obs::{self, FlowOutcome, FlowStage},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span covering one flow stage from attempt to outcome.
///
/// [`FlowSpan::start`] counts the attempt; [`FlowSpan::finish`] records the outcome on both the
/// span's `outcome` field and the metrics counter.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	stage: FlowStage,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span named `identity_engine.flow` for `stage`.
	pub fn new(stage: FlowStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"identity_engine.flow",
				stage = stage.as_str(),
				outcome = tracing::field::Empty
			);

			Self { stage, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			Self { stage }
		}
	}

	/// Opens the span and counts an attempt for `stage`.
	pub fn start(stage: FlowStage) -> Self {
		obs::record_flow_outcome(stage, FlowOutcome::Attempt);

		Self::new(stage)
	}

	/// Stage this span was opened for.
	pub fn stage(&self) -> FlowStage {
		self.stage
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

	/// Records the outcome of `result` and hands it back unchanged.
	pub fn finish<T, E>(&self, result: Result<T, E>) -> Result<T, E>
	where
		E: Display,
	{
		#[cfg(feature = "tracing")]
		{
			let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

			self.span.record("outcome", outcome.as_str());

			if let Err(e) = &result {
				tracing::debug!(parent: &self.span, error = %e, "Flow stage failed.");
			}
		}

		obs::record_result(self.stage, result)
	}
}
