//! Payment orders and refunds.

// self
use crate::{
	_prelude::*,
	api::{OpenApi, impl_envelope},
	http::OpenApiHttpClient,
	obs::Operation,
	sign::{SignableRequest, SigningFields},
};

const CREATE_ORDER_PATH: &str = "/api/apps/ecpay/v1/create_order";
const QUERY_ORDER_PATH: &str = "/api/apps/ecpay/v1/query_order";
const CREATE_REFUND_PATH: &str = "/api/apps/ecpay/v1/create_refund";
const QUERY_REFUND_PATH: &str = "/api/apps/ecpay/v1/query_refund";

/// Parameters for [`OpenApi::create_order`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateOrderParams {
	/// Merchant-side order number, unique per app.
	pub out_order_no: String,
	/// Amount in fen.
	pub total_amount: i64,
	/// Short goods description.
	pub subject: String,
	/// Goods detail.
	pub body: String,
	/// Seconds until the order expires.
	pub valid_time: i64,
	/// Opaque value echoed back in callbacks.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cp_extra: Option<String>,
	/// Callback URL overriding the console setting.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notify_url: Option<String>,
	/// Service-provider id; never signed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thirdparty_id: Option<String>,
	/// Receiving merchant in multi-store mode.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub store_uid: Option<String>,
	/// `1` suppresses the payment notification message.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub disable_msg: Option<i64>,
	/// Page opened from the payment notification.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub msg_page: Option<String>,
	/// Delivery fee breakdown.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expand_order_info: Option<ExpandOrderInfo>,
	/// Comma-separated payment channels to hide, e.g. `LIMIT_WX`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit_pay_way: Option<String>,
}
impl SignableRequest for CreateOrderParams {
	fn signing_fields(&self) -> SigningFields {
		let expand_order_info = self.expand_order_info.as_ref().map(ExpandOrderInfo::signing_text);

		SigningFields::new()
			.text("out_order_no", &self.out_order_no)
			.integer("total_amount", self.total_amount)
			.text("subject", &self.subject)
			.text("body", &self.body)
			.integer("valid_time", self.valid_time)
			.opt_text("cp_extra", self.cp_extra.as_deref())
			.opt_text("notify_url", self.notify_url.as_deref())
			.opt_text("thirdparty_id", self.thirdparty_id.as_deref())
			.opt_text("store_uid", self.store_uid.as_deref())
			.opt_integer("disable_msg", self.disable_msg)
			.opt_text("msg_page", self.msg_page.as_deref())
			.opt_text("expand_order_info", expand_order_info.as_deref())
			.opt_text("limit_pay_way", self.limit_pay_way.as_deref())
	}
}

/// Delivery fees attached to an order, in fen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExpandOrderInfo {
	/// Delivery fee before discounts.
	pub original_delivery_fee: i64,
	/// Delivery fee actually charged.
	pub actual_delivery_fee: i64,
}
impl ExpandOrderInfo {
	/// Compact JSON text, identical to the serialized form.
	fn signing_text(&self) -> String {
		format!(
			r#"{{"original_delivery_fee":{},"actual_delivery_fee":{}}}"#,
			self.original_delivery_fee, self.actual_delivery_fee
		)
	}
}

/// Response returned by [`OpenApi::create_order`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateOrderResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Created order.
	pub data: CreateOrderData,
}
impl_envelope!(CreateOrderResponse, err_no, err_tips);

/// Order handle passed to the client-side payment call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateOrderData {
	/// Platform order number.
	pub order_id: String,
	/// Token for the client-side cashier.
	pub order_token: String,
}

#[derive(Debug, Serialize)]
struct QueryOrderRequest<'a> {
	out_order_no: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	thirdparty_id: Option<&'a str>,
}
impl SignableRequest for QueryOrderRequest<'_> {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.text("out_order_no", self.out_order_no)
			.opt_text("thirdparty_id", self.thirdparty_id)
	}
}

/// Response returned by [`OpenApi::query_order`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryOrderResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Merchant-side order number.
	pub out_order_no: String,
	/// Platform order number.
	pub order_id: String,
	/// Payment state.
	pub payment_info: PaymentInfo,
}
impl_envelope!(QueryOrderResponse, err_no, err_tips);

/// Payment state of an order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaymentInfo {
	/// Paid amount in fen.
	pub total_fee: i64,
	/// `SUCCESS`, `TIMEOUT`, `PROCESSING`, or `FAIL`.
	pub order_status: String,
	/// Payment time, `yyyy-MM-dd hh:mm:ss`.
	pub pay_time: String,
	/// Channel: 1 WeChat, 2 Alipay, 10 Douyin Pay.
	pub way: i64,
	/// Channel-side transaction number.
	pub channel_no: String,
	/// Receiving merchant.
	pub seller_uid: String,
	/// Associated video or live item.
	pub item_id: String,
	/// Affiliate attribution.
	pub cps_info: String,
}

/// Parameters for [`OpenApi::create_refund`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateRefundParams {
	/// Order being refunded.
	pub out_order_no: String,
	/// Merchant-side refund number.
	pub out_refund_no: String,
	/// Refund reason.
	pub reason: String,
	/// Amount in fen.
	pub refund_amount: i64,
	/// Opaque value echoed back in callbacks.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cp_extra: Option<String>,
	/// Callback URL overriding the console setting.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notify_url: Option<String>,
	/// Service-provider id; never signed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thirdparty_id: Option<String>,
	/// `1` suppresses the refund notification message.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub disable_msg: Option<i64>,
	/// Page opened from the refund notification.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub msg_page: Option<String>,
}
impl SignableRequest for CreateRefundParams {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.text("out_order_no", &self.out_order_no)
			.text("out_refund_no", &self.out_refund_no)
			.text("reason", &self.reason)
			.integer("refund_amount", self.refund_amount)
			.opt_text("cp_extra", self.cp_extra.as_deref())
			.opt_text("notify_url", self.notify_url.as_deref())
			.opt_text("thirdparty_id", self.thirdparty_id.as_deref())
			.opt_integer("disable_msg", self.disable_msg)
			.opt_text("msg_page", self.msg_page.as_deref())
	}
}

/// Response returned by [`OpenApi::create_refund`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateRefundResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Platform refund number.
	pub refund_no: String,
}
impl_envelope!(CreateRefundResponse, err_no, err_tips);

#[derive(Debug, Serialize)]
struct QueryRefundRequest<'a> {
	out_refund_no: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	thirdparty_id: Option<&'a str>,
}
impl SignableRequest for QueryRefundRequest<'_> {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.text("out_refund_no", self.out_refund_no)
			.opt_text("thirdparty_id", self.thirdparty_id)
	}
}

/// Response returned by [`OpenApi::query_refund`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryRefundResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Refund state.
	#[serde(rename = "refundInfo")]
	pub refund_info: RefundInfo,
}
impl_envelope!(QueryRefundResponse, err_no, err_tips);

/// Refund state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefundInfo {
	/// Platform refund number.
	pub refund_no: String,
	/// Refunded amount in fen.
	pub refund_amount: i64,
	/// `SUCCESS`, `PROCESSING`, or `FAIL`.
	pub refund_status: String,
	/// Unix timestamp of completion.
	pub refunded_at: i64,
	/// Whether the order had been fully settled.
	pub is_all_settled: bool,
	/// Opaque value supplied at creation.
	pub cp_extra: String,
	/// Status detail.
	pub msg: String,
}

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Creates a payment order.
	pub async fn create_order(&self, params: &CreateOrderParams) -> Result<CreateOrderResponse> {
		self.signed_post(Operation::CreateOrder, CREATE_ORDER_PATH, params).await
	}

	/// Looks up the payment state of an order.
	pub async fn query_order(
		&self,
		out_order_no: &str,
		thirdparty_id: Option<&str>,
	) -> Result<QueryOrderResponse> {
		let request = QueryOrderRequest { out_order_no, thirdparty_id };

		self.signed_post(Operation::QueryOrder, QUERY_ORDER_PATH, &request).await
	}

	/// Requests a refund.
	pub async fn create_refund(&self, params: &CreateRefundParams) -> Result<CreateRefundResponse> {
		self.signed_post(Operation::CreateRefund, CREATE_REFUND_PATH, params).await
	}

	/// Looks up the state of a refund.
	pub async fn query_refund(
		&self,
		out_refund_no: &str,
		thirdparty_id: Option<&str>,
	) -> Result<QueryRefundResponse> {
		let request = QueryRefundRequest { out_refund_no, thirdparty_id };

		self.signed_post(Operation::QueryRefund, QUERY_REFUND_PATH, &request).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::sign::RequestSigner;

	#[test]
	fn expand_order_info_signs_as_its_json() {
		let info = ExpandOrderInfo { original_delivery_fee: 10, actual_delivery_fee: 8 };

		assert_eq!(
			info.signing_text(),
			serde_json::to_string(&info).expect("Fee breakdown should serialize.")
		);
	}

	#[test]
	fn create_order_signature_ignores_unset_and_excluded_fields() {
		let signer = RequestSigner::new("salt");
		let params = CreateOrderParams {
			out_order_no: "A1".into(),
			total_amount: 100,
			subject: "goods".into(),
			body: "detail".into(),
			valid_time: 900,
			..Default::default()
		};
		let with_provider =
			CreateOrderParams { thirdparty_id: Some("tt-provider".into()), ..params.clone() };

		assert_eq!(
			signer.sign_request(&params),
			signer.sign([("a", "A1"), ("b", "100"), ("c", "goods"), ("d", "detail"), ("e", "900")])
		);
		assert_eq!(signer.sign_request(&params), signer.sign_request(&with_provider));
	}

	#[test]
	fn unset_optionals_are_not_serialized() {
		let params = CreateRefundParams {
			out_order_no: "A1".into(),
			out_refund_no: "R1".into(),
			reason: "damaged".into(),
			refund_amount: 50,
			disable_msg: Some(0),
			..Default::default()
		};
		let value = serde_json::to_value(&params).expect("Refund params should serialize.");

		assert_eq!(
			value,
			serde_json::json!({
				"out_order_no": "A1",
				"out_refund_no": "R1",
				"reason": "damaged",
				"refund_amount": 50,
				"disable_msg": 0,
			})
		);
	}
}
