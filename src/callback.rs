//! Verification and two-stage decoding of payment-family callbacks.
//!
//! The platform posts a [`CallbackEnvelope`] whose `msg` field holds the real payload as JSON
//! text. The envelope is decoded first; when signature checking is enabled the SHA-1 signature
//! over `[token, timestamp, nonce, msg]` is verified; only then is `msg` decoded into the typed
//! message selected by the caller or by the envelope `type`.

// crates.io
use sha1::{Digest, Sha1};
// self
use crate::{
	_prelude::*,
	api::OpenApi,
	http::{self, OpenApiHttpClient},
	obs::{self, CallOutcome, Operation},
};

/// Sorts `parts` byte-wise, concatenates them, and returns the lowercase SHA-1 hex digest.
pub fn compute_signature<I, S>(parts: I) -> String
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut parts = parts.into_iter().collect::<Vec<_>>();

	parts.sort_unstable_by(|a, b| a.as_ref().cmp(b.as_ref()));

	let mut hasher = Sha1::new();

	for part in &parts {
		hasher.update(part.as_ref().as_bytes());
	}

	hex::encode(hasher.finalize())
}

/// Checks `signature` against [`compute_signature`] over `parts`.
pub fn verify_signature<I, S>(signature: &str, parts: I) -> Result<()>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	if signatures_match(&compute_signature(parts), signature) {
		Ok(())
	} else {
		Err(Error::SignatureMismatch { context: "callback", received: signature.to_owned() })
	}
}

/// Compares two hex signatures without short-circuiting on the first differing byte.
pub(crate) fn signatures_match(expected: &str, received: &str) -> bool {
	let (expected, received) = (expected.as_bytes(), received.as_bytes());

	expected.len() == received.len()
		&& expected.iter().zip(received).fold(0_u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Outer callback document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackEnvelope {
	/// Unix timestamp, as text.
	pub timestamp: String,
	/// Random nonce.
	pub nonce: String,
	/// Embedded JSON payload.
	pub msg: String,
	/// SHA-1 signature over token, timestamp, nonce, and msg.
	pub msg_signature: String,
	/// `payment`, `refund`, `settle`, or `withdraw`.
	#[serde(rename = "type")]
	pub kind: String,
}

/// Envelope together with its decoded payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Callback<M> {
	/// Outer document as received.
	pub envelope: CallbackEnvelope,
	/// Decoded `msg`.
	pub message: M,
}

/// Payment result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentCallback {
	/// Mini-app identifier.
	pub appid: String,
	/// Merchant-side order number.
	pub cp_orderno: String,
	/// Opaque value supplied at creation.
	pub cp_extra: String,
	/// Channel, as text: 1 WeChat, 2 Alipay, 10 Douyin Pay.
	pub way: String,
	/// Channel-side transaction number.
	pub payment_order_no: String,
	/// Paid amount in fen.
	pub total_amount: i64,
	/// `SUCCESS` or `CANCEL`.
	pub status: String,
	/// Receiving merchant.
	pub seller_uid: String,
	/// Extra platform data.
	pub extra: String,
	/// Associated video or live item.
	pub item_id: String,
	/// Platform order number.
	pub order_id: String,
}

/// Refund result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefundCallback {
	/// Mini-app identifier.
	pub appid: String,
	/// Merchant-side refund number.
	pub cp_refundno: String,
	/// Opaque value supplied at creation.
	pub cp_extra: String,
	/// `SUCCESS` or `FAIL`.
	pub status: String,
	/// Refunded amount in fen.
	pub refund_amount: i64,
	/// Whether the order had been fully settled.
	pub is_all_settled: bool,
	/// Unix timestamp of completion.
	pub refunded_at: i64,
	/// Status detail.
	pub message: String,
	/// Platform order number.
	pub order_id: String,
	/// Platform refund number.
	pub refund_no: String,
}

/// Settlement result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleCallback {
	/// Mini-app identifier.
	pub app_id: String,
	/// Merchant-side settlement number.
	pub cp_settle_no: String,
	/// Opaque value supplied at creation.
	pub cp_extra: String,
	/// `SUCCESS` or `FAIL`.
	pub status: String,
	/// Platform fee in fen.
	pub rake: i64,
	/// Commission in fen.
	pub commission: i64,
	/// Split description.
	pub settle_detail: String,
	/// Unix timestamp of completion.
	pub settled_at: i64,
	/// Status detail.
	pub message: String,
	/// Platform order number.
	pub order_id: String,
	/// Channel-side settlement id.
	pub channel_settle_id: String,
	/// Settled amount in fen.
	pub settle_amount: i64,
	/// Platform settlement number.
	pub settle_no: String,
	/// Merchant-side order number.
	pub out_order_no: String,
	/// Whether the platform settled automatically.
	pub is_auto_settle: bool,
}

/// Merchant withdrawal result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawCallback {
	/// `SUCCESS`, `FAIL`, or `REEXCHANGE`.
	pub status: String,
	/// Opaque value supplied at creation.
	pub extra: String,
	/// Status detail.
	pub message: String,
	/// Unix timestamp of completion.
	pub withdraw_at: i64,
	/// Platform withdrawal number.
	pub order_id: String,
	/// Merchant-side withdrawal number.
	pub out_order_id: String,
	/// Channel-side withdrawal number.
	pub ch_order_id: String,
}

/// Callback decoded according to its envelope `type`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackMessage {
	/// `payment`.
	Payment(Callback<PaymentCallback>),
	/// `refund`.
	Refund(Callback<RefundCallback>),
	/// `settle`.
	Settle(Callback<SettleCallback>),
	/// `withdraw`.
	Withdraw(Callback<WithdrawCallback>),
}

/// Acknowledgement body returned to the platform after handling a callback or webhook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAck {
	/// Zero acknowledges receipt.
	pub err_no: i64,
	/// Free-form detail.
	pub err_tips: String,
}
impl CallbackAck {
	/// Acknowledges successful handling.
	pub fn success() -> Self {
		Self { err_no: 0, err_tips: "success".into() }
	}

	/// Reports a failure so the platform retries delivery.
	pub fn failure(code: i64, tips: impl Into<String>) -> Self {
		Self { err_no: code, err_tips: tips.into() }
	}
}

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Decodes a payment callback.
	pub fn pay_callback(&self, body: &str, check_sign: bool) -> Result<Callback<PaymentCallback>> {
		self.observed_callback(body, check_sign)
	}

	/// Decodes a refund callback.
	pub fn refund_callback(&self, body: &str, check_sign: bool) -> Result<Callback<RefundCallback>> {
		self.observed_callback(body, check_sign)
	}

	/// Decodes a settlement callback.
	pub fn settle_callback(&self, body: &str, check_sign: bool) -> Result<Callback<SettleCallback>> {
		self.observed_callback(body, check_sign)
	}

	/// Decodes a merchant withdrawal callback.
	pub fn withdraw_callback(
		&self,
		body: &str,
		check_sign: bool,
	) -> Result<Callback<WithdrawCallback>> {
		self.observed_callback(body, check_sign)
	}

	/// Decodes any payment-family callback, choosing the message type from the envelope.
	pub fn decode_callback(&self, body: &str, check_sign: bool) -> Result<CallbackMessage> {
		let result = self.verified_envelope(body, check_sign).and_then(|envelope| {
			let kind = envelope.kind.clone();

			match kind.as_str() {
				"payment" => decode_message(envelope).map(CallbackMessage::Payment),
				"refund" => decode_message(envelope).map(CallbackMessage::Refund),
				"settle" => decode_message(envelope).map(CallbackMessage::Settle),
				"withdraw" => decode_message(envelope).map(CallbackMessage::Withdraw),
				_ => Err(Error::UnsupportedEvent { event: envelope.kind }),
			}
		});

		obs::record_call_outcome(Operation::Callback, CallOutcome::of(&result));

		result
	}

	fn observed_callback<M>(&self, body: &str, check_sign: bool) -> Result<Callback<M>>
	where
		M: DeserializeOwned,
	{
		let result = self.verified_envelope(body, check_sign).and_then(decode_message);

		obs::record_call_outcome(Operation::Callback, CallOutcome::of(&result));

		result
	}

	fn verified_envelope(&self, body: &str, check_sign: bool) -> Result<CallbackEnvelope> {
		let envelope: CallbackEnvelope = http::decode_json("callback", None, body.as_bytes())?;

		if check_sign {
			verify_signature(
				&envelope.msg_signature,
				[
					self.config().token.expose(),
					envelope.timestamp.as_str(),
					envelope.nonce.as_str(),
					envelope.msg.as_str(),
				],
			)?;
		}

		Ok(envelope)
	}
}

fn decode_message<M>(envelope: CallbackEnvelope) -> Result<Callback<M>>
where
	M: DeserializeOwned,
{
	let message = http::decode_json("callback msg", None, envelope.msg.as_bytes())?;

	Ok(Callback { envelope, message })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn signature_is_order_independent() {
		let signature = compute_signature(["token", "1602507471", "797", "{}"]);

		verify_signature(&signature, ["{}", "797", "token", "1602507471"])
			.expect("Permuted parts should verify.");
		assert_eq!(signature.len(), 40);
	}

	#[test]
	fn mutated_parts_or_signature_fail() {
		let signature = compute_signature(["token", "1602507471", "797", "{}"]);
		let err = verify_signature(&signature, ["token", "1602507472", "797", "{}"])
			.expect_err("Changed timestamp must fail.");

		assert!(matches!(err, Error::SignatureMismatch { context: "callback", .. }));

		let mut tampered = signature.clone();

		tampered.replace_range(0..1, if signature.starts_with('0') { "1" } else { "0" });

		verify_signature(&tampered, ["token", "1602507471", "797", "{}"])
			.expect_err("Changed signature must fail.");
	}

	#[test]
	fn signature_comparison_needs_identical_bytes() {
		let signature = compute_signature(["token", "1602507471", "797", "{}"]);

		let mut last_differs = signature.clone();

		last_differs.replace_range(39..40, if signature.ends_with('0') { "1" } else { "0" });

		assert!(signatures_match(&signature, &signature.clone()));
		assert!(!signatures_match(&signature, &last_differs));
		assert!(!signatures_match(&signature, &signature[..39]));
		assert!(!signatures_match(&signature, ""));
	}

	#[test]
	fn signature_matches_plain_sha1_of_sorted_concatenation() {
		let expected = hex::encode(Sha1::digest(b"abc"));

		assert_eq!(compute_signature(["c", "a", "b"]), expected);
	}

	#[test]
	fn ack_serializes_platform_shape() {
		let value =
			serde_json::to_value(CallbackAck::success()).expect("Acknowledgement should serialize.");

		assert_eq!(value, serde_json::json!({ "err_no": 0, "err_tips": "success" }));
	}
}
