//! Order push, which mirrors merchant orders into the Douyin order center.

// crates.io
use serde::Serializer;
// self
use crate::{
	_prelude::*,
	api::{ApiEnvelope, OpenApi},
	http::OpenApiHttpClient,
	obs::Operation,
};

const ORDER_PUSH_PATH: &str = "/api/apps/order/v2/push";

/// Parameters for [`OpenApi::order_push`]; the access token is filled in by the facade.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderPushParams {
	/// Open-platform client key; required for POI orders.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_key: Option<String>,
	/// Merchant-side shop id; required for POI orders.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ext_shop_id: Option<String>,
	/// Host app showing the order, currently always `douyin`.
	pub app_name: String,
	/// Buyer's open id from `code2session`.
	pub open_id: String,
	/// Order state for ordinary orders: 0 unpaid, 1 paid, 2 cancelled, 4 redeemed, 5 refunding,
	/// 6 refunded, 8 refund failed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_status: Option<i64>,
	/// 0 ordinary, 9101 group-buy voucher, 9001 scenic ticket.
	pub order_type: i64,
	/// Millisecond timestamp of the last change.
	pub update_time: i64,
	/// Free-form business data.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub extra: Option<String>,
	/// Order detail, sent as embedded JSON text.
	#[serde(serialize_with = "as_json_text")]
	pub order_detail: OrderDetail,
}

/// Order contents shown in the order center.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
	/// Merchant-side order number, the `out_order_no` of the payment.
	pub order_id: String,
	/// Millisecond creation timestamp.
	pub create_time: i64,
	/// Display status, e.g. `已支付`.
	pub status: String,
	/// Number of goods.
	pub amount: i64,
	/// Total price in fen.
	pub total_price: i64,
	/// Mini-app page showing the order.
	pub detail_url: String,
	/// Line items; must not be empty.
	pub item_list: Vec<OrderItem>,
}

/// One line item of an [`OrderDetail`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderItem {
	/// Merchant-side goods id.
	pub item_code: String,
	/// Image URL.
	pub img: String,
	/// Title.
	pub title: String,
	/// Subtitle.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sub_title: Option<String>,
	/// Quantity.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub amount: Option<i64>,
	/// Line price in fen.
	pub price: i64,
}

#[derive(Serialize)]
struct OrderPushRequest<'a> {
	access_token: &'a str,
	#[serde(flatten)]
	params: &'a OrderPushParams,
}

/// Response returned by [`OpenApi::order_push`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderPushResponse {
	/// Platform error code.
	pub err_code: i64,
	/// Platform error message.
	pub err_msg: String,
	/// Additional failure detail.
	pub body: String,
}
impl ApiEnvelope for OrderPushResponse {
	fn error_code(&self) -> i64 {
		self.err_code
	}

	fn error_message(&self) -> String {
		if self.body.is_empty() {
			self.err_msg.clone()
		} else {
			format!("{} {}", self.err_msg, self.body)
		}
	}
}

fn as_json_text<S>(detail: &OrderDetail, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let text = serde_json::to_string(detail).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&text)
}

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Pushes an order to the Douyin order center.
	pub async fn order_push(&self, params: &OrderPushParams) -> Result<OrderPushResponse> {
		let token = self.access_token().await?;
		let request = OrderPushRequest { access_token: token.expose(), params };

		self.developer_post(Operation::OrderPush, ORDER_PUSH_PATH, &request).await
	}
}
