// self
use crate::{_prelude::*, obs::Operation};

/// Future returned by [`CallSpan::instrument`]; a plain passthrough without the `tracing` feature.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`CallSpan::instrument`]; a plain passthrough without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// `douyin_openapi.call` span wrapping one outbound request or token exchange.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span carrying the operation label and stage.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				span: tracing::info_span!(
					"douyin_openapi.call",
					operation = operation.as_str(),
					stage
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Attaches the span to `fut` so it is entered on every poll.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Decision taken by the access-token provider for one lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialEvent {
	/// Live entry served straight from the cache.
	Hit,
	/// Entry filled by a concurrent caller while this one waited on the guard.
	Coalesced,
	/// Cache miss; a token exchange follows.
	Refresh,
	/// Fresh token too short-lived to cache.
	Uncached,
}
impl CredentialEvent {
	/// Stable label used as the `event` field.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialEvent::Hit => "hit",
			CredentialEvent::Coalesced => "coalesced",
			CredentialEvent::Refresh => "refresh",
			CredentialEvent::Uncached => "uncached",
		}
	}
}

/// Emits a `debug!` event for a credential cache decision; the token itself is never logged.
pub(crate) fn credential_event(cache_key: &str, event: CredentialEvent) {
	#[cfg(feature = "tracing")]
	tracing::debug!(cache_key, event = event.as_str(), "credential cache");
	#[cfg(not(feature = "tracing"))]
	let _ = (cache_key, event);
}
