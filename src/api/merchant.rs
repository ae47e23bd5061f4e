//! Merchant balances and withdrawals for service-provider (SaaS) integrations.

// self
use crate::{
	_prelude::*,
	api::{OpenApi, impl_envelope},
	http::OpenApiHttpClient,
	obs::Operation,
	sign::{SignableRequest, SigningFields},
};

const QUERY_MERCHANT_BALANCE_PATH: &str = "/api/apps/ecpay/saas/query_merchant_balance";
const MERCHANT_WITHDRAW_PATH: &str = "/api/apps/ecpay/saas/merchant_withdraw";
const QUERY_WITHDRAW_ORDER_PATH: &str = "/api/apps/ecpay/saas/query_withdraw_order";

/// Parameters for [`OpenApi::query_merchant_balance`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryMerchantBalanceParams {
	/// Service-provider id; never signed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thirdparty_id: Option<String>,
	/// Merchant being queried.
	pub merchant_uid: String,
	/// `alipay`, `wx`, `hz`, or `yeepay`.
	pub channel_type: String,
	/// Merchant entity kind.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub merchant_entity: Option<i64>,
}
impl SignableRequest for QueryMerchantBalanceParams {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.opt_text("thirdparty_id", self.thirdparty_id.as_deref())
			.text("merchant_uid", &self.merchant_uid)
			.text("channel_type", &self.channel_type)
			.opt_integer("merchant_entity", self.merchant_entity)
	}
}

/// Response returned by [`OpenApi::query_merchant_balance`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryMerchantBalanceResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Balances held by the channel.
	pub account_info: AccountInfo,
	/// Payout account.
	pub settle_info: SettleAccountInfo,
	/// Merchant entity kind.
	pub merchant_entity: i64,
}
impl_envelope!(QueryMerchantBalanceResponse, err_no, err_tips);

/// Balances in fen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccountInfo {
	/// Total online balance.
	pub online_balance: i64,
	/// Balance that can be withdrawn now.
	#[serde(rename = "withdrawable_balacne", alias = "withdrawable_balance")]
	pub withdrawable_balance: i64,
	/// Frozen balance.
	pub freeze_balance: i64,
}

/// Account receiving withdrawals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettleAccountInfo {
	/// Account kind.
	pub settle_type: i64,
	/// Account holder.
	pub settle_account: String,
	/// Masked card number.
	pub bankcard_no: String,
	/// Bank name.
	pub bank_name: String,
}

/// Parameters for [`OpenApi::merchant_withdraw`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MerchantWithdrawParams {
	/// Service-provider id; never signed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thirdparty_id: Option<String>,
	/// Merchant withdrawing funds.
	pub merchant_uid: String,
	/// `alipay`, `wx`, `hz`, or `yeepay`.
	pub channel_type: String,
	/// Amount in fen.
	pub withdraw_amount: i64,
	/// Merchant-side withdrawal number.
	pub out_order_id: String,
	/// Callback URL for the withdrawal result.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub callback: Option<String>,
	/// Opaque value echoed back in callbacks.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cp_extra: Option<String>,
	/// Merchant entity kind.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub merchant_entity: Option<i64>,
}
impl SignableRequest for MerchantWithdrawParams {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.opt_text("thirdparty_id", self.thirdparty_id.as_deref())
			.text("merchant_uid", &self.merchant_uid)
			.text("channel_type", &self.channel_type)
			.integer("withdraw_amount", self.withdraw_amount)
			.text("out_order_id", &self.out_order_id)
			.opt_text("callback", self.callback.as_deref())
			.opt_text("cp_extra", self.cp_extra.as_deref())
			.opt_integer("merchant_entity", self.merchant_entity)
	}
}

/// Response returned by [`OpenApi::merchant_withdraw`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MerchantWithdrawResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Platform withdrawal number.
	pub order_id: String,
	/// Merchant entity kind.
	pub merchant_entity: i64,
}
impl_envelope!(MerchantWithdrawResponse, err_no, err_tips);

/// Parameters for [`OpenApi::query_withdraw_order`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryWithdrawOrderParams {
	/// Service-provider id; never signed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thirdparty_id: Option<String>,
	/// Merchant that withdrew.
	pub merchant_uid: String,
	/// `alipay`, `wx`, `hz`, or `yeepay`.
	pub channel_type: String,
	/// Merchant-side withdrawal number.
	pub out_order_id: String,
}
impl SignableRequest for QueryWithdrawOrderParams {
	fn signing_fields(&self) -> SigningFields {
		SigningFields::new()
			.opt_text("thirdparty_id", self.thirdparty_id.as_deref())
			.text("merchant_uid", &self.merchant_uid)
			.text("channel_type", &self.channel_type)
			.text("out_order_id", &self.out_order_id)
	}
}

/// Response returned by [`OpenApi::query_withdraw_order`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryWithdrawOrderResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// `SUCCESS`, `FAIL`, `PROCESSING`, or `REEXCHANGE` (bounced by the bank).
	pub status: String,
	/// Status detail.
	#[serde(rename = "statusMsg")]
	pub status_msg: String,
}
impl_envelope!(QueryWithdrawOrderResponse, err_no, err_tips);

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Looks up a merchant's withdrawable balance.
	pub async fn query_merchant_balance(
		&self,
		params: &QueryMerchantBalanceParams,
	) -> Result<QueryMerchantBalanceResponse> {
		self.signed_post(Operation::QueryMerchantBalance, QUERY_MERCHANT_BALANCE_PATH, params).await
	}

	/// Withdraws merchant funds to the payout account.
	pub async fn merchant_withdraw(
		&self,
		params: &MerchantWithdrawParams,
	) -> Result<MerchantWithdrawResponse> {
		self.signed_post(Operation::MerchantWithdraw, MERCHANT_WITHDRAW_PATH, params).await
	}

	/// Looks up the state of a withdrawal.
	pub async fn query_withdraw_order(
		&self,
		params: &QueryWithdrawOrderParams,
	) -> Result<QueryWithdrawOrderResponse> {
		self.signed_post(Operation::QueryWithdrawOrder, QUERY_WITHDRAW_ORDER_PATH, params).await
	}
}
