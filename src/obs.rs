//! Optional observability helpers for platform calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `douyin_openapi.call` with the `operation`
//!   and `stage` fields; credential refreshes additionally emit `debug!` events.
//! - Enable `metrics` to increment the `douyin_openapi_call_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Access-token exchange.
	AccessToken,
	/// Mini-app login.
	Code2Session,
	/// Payment order creation.
	CreateOrder,
	/// Payment order lookup.
	QueryOrder,
	/// Refund creation.
	CreateRefund,
	/// Refund lookup.
	QueryRefund,
	/// Settlement request.
	Settle,
	/// Settlement lookup.
	QuerySettle,
	/// Unsettled amount lookup.
	UnsettleAmount,
	/// Settlement return creation.
	CreateReturn,
	/// Settlement return lookup.
	QueryReturn,
	/// Merchant balance lookup.
	QueryMerchantBalance,
	/// Merchant withdrawal.
	MerchantWithdraw,
	/// Withdrawal order lookup.
	QueryWithdrawOrder,
	/// Order push.
	OrderPush,
	/// URL link generation.
	UrlLinkGenerate,
	/// Private message delivery.
	SendPrivateMessage,
	/// Private message recall.
	RecallPrivateMessage,
	/// Inbound payment-family callback.
	Callback,
	/// Inbound webhook.
	Webhook,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::AccessToken => "access_token",
			Operation::Code2Session => "code2session",
			Operation::CreateOrder => "create_order",
			Operation::QueryOrder => "query_order",
			Operation::CreateRefund => "create_refund",
			Operation::QueryRefund => "query_refund",
			Operation::Settle => "settle",
			Operation::QuerySettle => "query_settle",
			Operation::UnsettleAmount => "unsettle_amount",
			Operation::CreateReturn => "create_return",
			Operation::QueryReturn => "query_return",
			Operation::QueryMerchantBalance => "query_merchant_balance",
			Operation::MerchantWithdraw => "merchant_withdraw",
			Operation::QueryWithdrawOrder => "query_withdraw_order",
			Operation::OrderPush => "order_push",
			Operation::UrlLinkGenerate => "url_link_generate",
			Operation::SendPrivateMessage => "send_private_message",
			Operation::RecallPrivateMessage => "recall_private_message",
			Operation::Callback => "callback",
			Operation::Webhook => "webhook",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a facade operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}

	/// Maps a finished call onto its outcome label.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a [`CallSpan`] and records attempt plus final outcome.
pub(crate) async fn observe<T, Fut>(operation: Operation, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::new(operation, stage);

	record_call_outcome(operation, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	record_call_outcome(operation, CallOutcome::of(&result));

	result
}
