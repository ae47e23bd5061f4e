//! Open-platform webhooks (`verify_webhook`, private-message authorization, message callbacks).

// crates.io
use sha1::{Digest, Sha1};
// self
use crate::{
	_prelude::*,
	api::OpenApi,
	callback,
	http::{self, OpenApiHttpClient},
	obs::{self, CallOutcome, Operation},
};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "X-Douyin-Signature";

/// Lowercase SHA-1 hex digest of the app secret followed by the raw body.
pub fn webhook_signature(app_secret: &str, body: &str) -> String {
	let mut hasher = Sha1::new();

	hasher.update(app_secret.as_bytes());
	hasher.update(body.as_bytes());

	hex::encode(hasher.finalize())
}

/// Outer webhook document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Webhook {
	/// Event name selecting the shape of `content`.
	pub event: String,
	/// Open-platform client key.
	pub client_key: String,
	/// Sender's open id.
	pub from_user_id: String,
	/// Recipient's open id.
	pub to_user_id: String,
	/// Embedded JSON payload.
	pub content: String,
}

/// Webhook together with its decoded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookDelivery {
	/// Outer document as received.
	pub webhook: Webhook,
	/// Decoded `content`.
	pub event: WebhookEvent,
}

/// Decoded webhook content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
	/// `verify_webhook`: echo the challenge back to finish registration.
	VerifyWebhook(VerifyWebhook),
	/// `im_authorize`: a user granted or revoked private-message authorization.
	ImAuthorize(ImAuthorizeEvent),
	/// `im_authorize_message_callback`: delivery report for a private message.
	ImAuthorizeMessage(ImMessageEvent),
}

/// Challenge sent while registering the webhook; serialize it as the response body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyWebhook {
	/// Value to echo.
	pub challenge: i64,
}

/// Private-message authorization change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImAuthorizeEvent {
	/// Unix timestamp of creation.
	pub create_time: i64,
	/// Unix timestamp of expiry.
	pub expire_time: i64,
	/// Unix timestamp of the last update.
	pub update_time: i64,
	/// Kind of change.
	pub operation_type: i64,
	/// Authorization state.
	pub auth_status: i64,
	/// Where the authorization came from.
	pub source: String,
	/// Free-form data.
	pub extra: String,
	/// Platform trace id.
	pub log_id: String,
}

/// Private-message delivery report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImMessageEvent {
	/// Conversation id.
	pub conversation_short_id: String,
	/// Message id.
	pub server_message_id: String,
	/// Conversation kind.
	pub conversation_type: i64,
	/// Millisecond timestamp of creation.
	pub create_time: i64,
	/// Message kind.
	pub message_type: String,
	/// Text body.
	pub text: String,
	/// Image body.
	pub image: String,
	/// Video item id.
	pub item_id: String,
	/// Card content.
	pub content: String,
	/// Card title.
	pub title: String,
	/// Card actions.
	pub actions: String,
	/// Sender profile.
	pub user_infos: UserInfo,
}

/// Profile attached to a message callback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
	/// Open id.
	pub open_id: String,
	/// Nickname.
	pub nick_name: String,
	/// Avatar URL.
	pub avatar: String,
}

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Verifies and decodes a webhook delivery.
	///
	/// `signature` is the value of the [`SIGNATURE_HEADER`] header. The signature is checked
	/// against the raw body before anything is decoded.
	pub fn handle_webhook(
		&self,
		signature: &str,
		body: &str,
		check_sign: bool,
	) -> Result<WebhookDelivery> {
		let result = self.decode_webhook(signature, body, check_sign);

		obs::record_call_outcome(Operation::Webhook, CallOutcome::of(&result));

		result
	}

	fn decode_webhook(&self, signature: &str, body: &str, check_sign: bool) -> Result<WebhookDelivery> {
		if check_sign
			&& !callback::signatures_match(
				&webhook_signature(self.config().app_secret.expose(), body),
				signature,
			) {
			return Err(Error::SignatureMismatch { context: "webhook", received: signature.to_owned() });
		}

		let webhook: Webhook = http::decode_json("webhook", None, body.as_bytes())?;
		let content = webhook.content.as_bytes();
		let event = match webhook.event.as_str() {
			"verify_webhook" =>
				WebhookEvent::VerifyWebhook(http::decode_json("webhook content", None, content)?),
			"im_authorize" =>
				WebhookEvent::ImAuthorize(http::decode_json("webhook content", None, content)?),
			"im_authorize_message_callback" => WebhookEvent::ImAuthorizeMessage(http::decode_json(
				"webhook content",
				None,
				content,
			)?),
			other => return Err(Error::UnsupportedEvent { event: other.to_owned() }),
		};

		Ok(WebhookDelivery { webhook, event })
	}
}
