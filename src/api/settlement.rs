//! Settlement, unsettled amounts, and settlement returns.

// self
use crate::{
	_prelude::*,
	api::{OpenApi, impl_envelope},
	error::ConfigError,
	http::OpenApiHttpClient,
	obs::Operation,
	sign::{SignableRequest, SigningFields},
};

const SETTLE_PATH: &str = "/api/apps/ecpay/v1/settle";
const QUERY_SETTLE_PATH: &str = "/api/apps/ecpay/v1/query_settle";
const UNSETTLE_AMOUNT_PATH: &str = "/api/apps/ecpay/v1/unsettle_amount";
const CREATE_RETURN_PATH: &str = "/api/apps/ecpay/v1/create_return";
const QUERY_RETURN_PATH: &str = "/api/apps/ecpay/v1/query_return";

/// Parameters for [`OpenApi::settle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SettleParams {
	/// Merchant-side settlement number.
	pub out_settle_no: String,
	/// Order being settled.
	pub out_order_no: String,
	/// Settlement description.
	pub settle_desc: String,
	/// Callback URL overriding the console setting.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notify_url: Option<String>,
	/// Opaque value echoed back in callbacks.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cp_extra: Option<String>,
	/// Service-provider id; never signed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thirdparty_id: Option<String>,
	/// `"true"` closes the order for further settlement.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub finish: Option<String>,
}

/// One split of a settlement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SettleItem {
	/// Receiving merchant.
	pub merchant_uid: String,
	/// Amount in fen.
	pub amount: i64,
}

#[derive(Debug, Serialize)]
struct SettleRequest<'a> {
	#[serde(flatten)]
	params: &'a SettleParams,
	#[serde(skip_serializing_if = "Option::is_none")]
	settle_params: Option<String>,
}
impl SignableRequest for SettleRequest<'_> {
	fn signing_fields(&self) -> SigningFields {
		let params = self.params;

		SigningFields::new()
			.text("out_settle_no", &params.out_settle_no)
			.text("out_order_no", &params.out_order_no)
			.text("settle_desc", &params.settle_desc)
			.opt_text("notify_url", params.notify_url.as_deref())
			.opt_text("cp_extra", params.cp_extra.as_deref())
			.opt_text("thirdparty_id", params.thirdparty_id.as_deref())
			.opt_text("finish", params.finish.as_deref())
			.opt_text("settle_params", self.settle_params.as_deref())
	}
}

/// Response returned by [`OpenApi::settle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettleResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Platform settlement number.
	pub settle_no: String,
}
impl_envelope!(SettleResponse, err_no, err_tips);

#[derive(Debug, Serialize)]
struct QuerySettleRequest<'a> {
	out_settle_no: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	thirdparty_id: Option<&'a str>,
}
impl SignableRequest for QuerySettleRequest<'_> {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.text("out_settle_no", self.out_settle_no)
			.opt_text("thirdparty_id", self.thirdparty_id)
	}
}

/// Response returned by [`OpenApi::query_settle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuerySettleResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Settlement state.
	pub settle_info: SettleInfo,
}
impl_envelope!(QuerySettleResponse, err_no, err_tips);

/// Settlement state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettleInfo {
	/// Platform settlement number.
	pub settle_no: String,
	/// Settled amount in fen.
	pub settle_amount: i64,
	/// `SUCCESS`, `PROCESSING`, or `FAIL`.
	pub settle_status: String,
	/// Split description.
	pub settle_detail: String,
	/// Unix timestamp of completion.
	pub settled_at: i64,
	/// Platform fee in fen.
	pub rake: i64,
	/// Commission in fen.
	pub commission: i64,
	/// Opaque value supplied at creation.
	pub cp_extra: String,
	/// Status detail.
	pub msg: String,
}

#[derive(Debug, Serialize)]
struct UnsettleAmountRequest<'a> {
	out_order_no: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	thirdparty_id: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	out_item_order_no: Option<&'a str>,
}
impl SignableRequest for UnsettleAmountRequest<'_> {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.text("out_order_no", self.out_order_no)
			.opt_text("thirdparty_id", self.thirdparty_id)
			.opt_text("out_item_order_no", self.out_item_order_no)
	}
}

/// Response returned by [`OpenApi::unsettle_amount`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UnsettleAmountResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Unsettled balance.
	pub data: UnsettleAmountData,
}
impl_envelope!(UnsettleAmountResponse, err_no, err_tips);

/// Amount of an order still available for settlement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UnsettleAmountData {
	/// Merchant-side order number.
	pub out_order_no: String,
	/// Remaining amount in fen.
	pub unsettle_amount: i64,
	/// Breakdown of the remaining amount.
	pub detail: UnsettleDetail,
}

/// Breakdown of an unsettled amount.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UnsettleDetail {
	/// Original payment.
	pub pay_info: AmountPortion,
	/// Refunds deducted so far.
	pub refund_info: Vec<RefundPortion>,
	/// Payment fee in fen.
	pub payment_rake: i64,
	/// Local-life fee in fen.
	pub life_rake: i64,
	/// Commission in fen.
	pub commission: i64,
}

/// Paid amount of an order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AmountPortion {
	/// Merchant-side order number.
	pub out_order_no: String,
	/// Amount in fen.
	pub amount: i64,
}

/// Refunded amount of an order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefundPortion {
	/// Merchant-side refund number.
	pub out_refund_no: String,
	/// Amount in fen.
	pub amount: i64,
}

/// Parameters for [`OpenApi::create_return`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateReturnParams {
	/// Merchant-side settlement number; either this or `settle_no` is required.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub out_settle_no: Option<String>,
	/// Platform settlement number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub settle_no: Option<String>,
	/// Merchant-side return number.
	pub out_return_no: String,
	/// Merchant whose split is returned.
	pub merchant_uid: String,
	/// Amount in fen.
	pub return_amount: i64,
	/// Return description.
	pub return_desc: String,
	/// Opaque value echoed back in queries.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cp_extra: Option<String>,
	/// Service-provider id; never signed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thirdparty_id: Option<String>,
}
impl SignableRequest for CreateReturnParams {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.opt_text("out_settle_no", self.out_settle_no.as_deref())
			.opt_text("settle_no", self.settle_no.as_deref())
			.text("out_return_no", &self.out_return_no)
			.text("merchant_uid", &self.merchant_uid)
			.integer("return_amount", self.return_amount)
			.text("return_desc", &self.return_desc)
			.opt_text("cp_extra", self.cp_extra.as_deref())
			.opt_text("thirdparty_id", self.thirdparty_id.as_deref())
	}
}

#[derive(Debug, Serialize)]
struct QueryReturnRequest<'a> {
	#[serde(skip_serializing_if = "Option::is_none")]
	return_no: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	out_return_no: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	thirdparty_id: Option<&'a str>,
}
impl SignableRequest for QueryReturnRequest<'_> {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.opt_text("return_no", self.return_no)
			.opt_text("out_return_no", self.out_return_no)
			.opt_text("thirdparty_id", self.thirdparty_id)
	}
}

/// Response returned by [`OpenApi::create_return`] and [`OpenApi::query_return`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReturnResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Return state.
	pub return_info: ReturnInfo,
}
impl_envelope!(ReturnResponse, err_no, err_tips);

/// Settlement return state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReturnInfo {
	/// Mini-app identifier.
	pub app_id: String,
	/// Service-provider id.
	pub thirdparty_id: String,
	/// Platform settlement number.
	pub settle_no: String,
	/// Merchant-side settlement number.
	pub out_settle_no: String,
	/// Merchant-side return number.
	pub out_return_no: String,
	/// Merchant whose split was returned.
	pub merchant_uid: String,
	/// Amount in fen.
	pub return_amount: i64,
	/// `SUCCESS`, `PROCESSING`, or `FAIL`.
	pub return_status: String,
	/// Platform return number.
	pub return_no: String,
	/// Failure detail.
	pub fail_reason: String,
	/// Unix timestamp of completion.
	pub finish_time: i64,
	/// Opaque value supplied at creation.
	pub cp_extra: String,
}

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Settles an order, splitting it across `items` when any are given.
	pub async fn settle(&self, params: &SettleParams, items: &[SettleItem]) -> Result<SettleResponse> {
		const OPERATION: Operation = Operation::Settle;

		let settle_params = if items.is_empty() {
			None
		} else {
			Some(serde_json::to_string(items).map_err(|source| ConfigError::RequestEncode {
				operation: OPERATION.as_str(),
				source,
			})?)
		};
		let request = SettleRequest { params, settle_params };

		self.signed_post(OPERATION, SETTLE_PATH, &request).await
	}

	/// Looks up the state of a settlement.
	pub async fn query_settle(
		&self,
		out_settle_no: &str,
		thirdparty_id: Option<&str>,
	) -> Result<QuerySettleResponse> {
		let request = QuerySettleRequest { out_settle_no, thirdparty_id };

		self.signed_post(Operation::QuerySettle, QUERY_SETTLE_PATH, &request).await
	}

	/// Looks up how much of an order can still be settled.
	pub async fn unsettle_amount(
		&self,
		out_order_no: &str,
		thirdparty_id: Option<&str>,
		out_item_order_no: Option<&str>,
	) -> Result<UnsettleAmountResponse> {
		let request = UnsettleAmountRequest { out_order_no, thirdparty_id, out_item_order_no };

		self.signed_post(Operation::UnsettleAmount, UNSETTLE_AMOUNT_PATH, &request).await
	}

	/// Returns part of a settled split.
	pub async fn create_return(&self, params: &CreateReturnParams) -> Result<ReturnResponse> {
		self.signed_post(Operation::CreateReturn, CREATE_RETURN_PATH, params).await
	}

	/// Looks up the state of a settlement return.
	pub async fn query_return(
		&self,
		return_no: Option<&str>,
		out_return_no: Option<&str>,
		thirdparty_id: Option<&str>,
	) -> Result<ReturnResponse> {
		let request = QueryReturnRequest { return_no, out_return_no, thirdparty_id };

		self.signed_post(Operation::QueryReturn, QUERY_RETURN_PATH, &request).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn settle_request_embeds_items_as_json_text() {
		let params = SettleParams {
			out_settle_no: "S1".into(),
			out_order_no: "A1".into(),
			settle_desc: "split".into(),
			..Default::default()
		};
		let items = [SettleItem { merchant_uid: "m1".into(), amount: 30 }];
		let request = SettleRequest {
			params: &params,
			settle_params: Some(serde_json::to_string(&items).expect("Items should serialize.")),
		};
		let value = serde_json::to_value(&request).expect("Settle request should serialize.");

		assert_eq!(value["settle_params"], r#"[{"merchant_uid":"m1","amount":30}]"#);
		assert_eq!(value["out_settle_no"], "S1");
		assert!(
			request
				.signing_fields()
				.iter()
				.any(|(name, value)| name == "settle_params" && value.starts_with('['))
		);
	}

	#[test]
	fn unsettle_detail_decodes_nested_refunds() {
		let body = r#"{
			"err_no": 0,
			"err_tips": "",
			"data": {
				"out_order_no": "A1",
				"unsettle_amount": 70,
				"detail": {
					"pay_info": { "out_order_no": "A1", "amount": 100 },
					"refund_info": [{ "out_refund_no": "R1", "amount": 30 }],
					"payment_rake": 1,
					"life_rake": 0,
					"commission": 0
				}
			}
		}"#;
		let response: UnsettleAmountResponse =
			serde_json::from_str(body).expect("Unsettled amount should decode.");

		assert_eq!(response.data.unsettle_amount, 70);
		assert_eq!(response.data.detail.refund_info[0].out_refund_no, "R1");
		assert_eq!(response.data.detail.pay_info.amount, 100);
	}
}
