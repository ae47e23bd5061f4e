//! Private messages sent to users who authorized the app.

// crates.io
use serde::{Serializer, ser::SerializeMap};
// self
use crate::{
	_prelude::*,
	api::{ApiEnvelope, OpenApi, impl_envelope},
	http::{self, JsonRequest, OpenApiHttpClient},
	obs::Operation,
};

const SEND_MESSAGE_PATH: &str = "/im/authorize/send/msg/";
const RECALL_MESSAGE_PATH: &str = "/im/authorize/recall/msg/";
const ACCESS_TOKEN_HEADER: &str = "access-token";

/// Parameters for [`OpenApi::send_private_message`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendMessageParams {
	/// Recipient's open id.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to_user_id: Option<String>,
	/// Message body.
	pub content: MessageContent,
}

/// Message body, serialized as `{"msg_type": n, <kind>: {...}}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageContent {
	/// Plain text (type 1).
	Text {
		/// Message text.
		text: String,
	},
	/// Uploaded image (type 2).
	Image {
		/// Media id of the image.
		media_id: String,
	},
	/// Published video (type 3).
	Video {
		/// Video item id.
		item_id: String,
	},
	/// Text, image, or call card (type 4).
	Card {
		/// Card id.
		card_id: String,
	},
	/// Group invitation card (type 9).
	GroupInvitation {
		/// Group id.
		group_id: String,
	},
	/// Mini-app card (type 10).
	AppletCard(AppletCard),
}
impl MessageContent {
	/// Numeric `msg_type` of the variant.
	pub const fn msg_type(&self) -> i64 {
		match self {
			MessageContent::Text { .. } => 1,
			MessageContent::Image { .. } => 2,
			MessageContent::Video { .. } => 3,
			MessageContent::Card { .. } => 4,
			MessageContent::GroupInvitation { .. } => 9,
			MessageContent::AppletCard(_) => 10,
		}
	}
}
impl Serialize for MessageContent {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(2))?;

		map.serialize_entry("msg_type", &self.msg_type())?;

		match self {
			MessageContent::Text { text } => map.serialize_entry("text", &Single::Text { text })?,
			MessageContent::Image { media_id } =>
				map.serialize_entry("image", &Single::Image { media_id })?,
			MessageContent::Video { item_id } => map.serialize_entry("video", &Single::Video { item_id })?,
			MessageContent::Card { card_id } => map.serialize_entry("card", &Single::Card { card_id })?,
			MessageContent::GroupInvitation { group_id } =>
				map.serialize_entry("group_invitation", &Single::Group { group_id })?,
			MessageContent::AppletCard(card) => map.serialize_entry("applet_card", card)?,
		}

		map.end()
	}
}

/// Single-field payload objects nested under the message kind.
#[derive(Serialize)]
#[serde(untagged)]
enum Single<'a> {
	Text { text: &'a str },
	Image { media_id: &'a str },
	Video { item_id: &'a str },
	Card { card_id: &'a str },
	Group { group_id: &'a str },
}

/// Mini-app card payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AppletCard {
	/// Card template.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub card_template_id: Option<String>,
	/// Page opened by the card.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// Page query.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	/// Target mini-app.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub app_id: Option<String>,
	/// Deep-link schema.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema: Option<String>,
}

/// Response returned by [`OpenApi::send_private_message`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SendMessageResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_msg: String,
	/// Delivered message.
	pub data: SendMessageData,
	/// Platform trace id.
	pub log_id: String,
}
impl_envelope!(SendMessageResponse, err_no, err_msg);

/// Delivered message handle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SendMessageData {
	/// Message id used for recall.
	pub msg_id: String,
}

/// Parameters for [`OpenApi::recall_private_message`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecallMessageParams {
	/// Message to recall.
	pub msg_id: String,
	/// Conversation holding the message.
	pub conversation_id: String,
}

/// Response returned by [`OpenApi::recall_private_message`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecallMessageResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_msg: String,
	/// Platform trace id.
	pub log_id: String,
}
impl_envelope!(RecallMessageResponse, err_no, err_msg);

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Sends a private message on behalf of the account identified by `open_id`.
	pub async fn send_private_message(
		&self,
		open_id: &str,
		params: &SendMessageParams,
	) -> Result<SendMessageResponse> {
		self.open_post(Operation::SendPrivateMessage, SEND_MESSAGE_PATH, open_id, params).await
	}

	/// Recalls a previously sent private message.
	pub async fn recall_private_message(
		&self,
		open_id: &str,
		params: &RecallMessageParams,
	) -> Result<RecallMessageResponse> {
		self.open_post(Operation::RecallPrivateMessage, RECALL_MESSAGE_PATH, open_id, params).await
	}

	async fn open_post<B, T>(
		&self,
		operation: Operation,
		path: &'static str,
		open_id: &str,
		body: &B,
	) -> Result<T>
	where
		B: Serialize,
		T: DeserializeOwned + ApiEnvelope,
	{
		let token = self.access_token().await?;
		let mut url = self.config().endpoints.open_url(path)?;

		url.query_pairs_mut().append_pair("open_id", open_id);

		let body = http::encode_body(operation, body)?;
		let request =
			JsonRequest::new(url, body).with_header(ACCESS_TOKEN_HEADER, token.expose());

		self.execute(operation, request).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn content_carries_numeric_type_and_kind_object() {
		let text = serde_json::to_value(MessageContent::Text { text: "hi".into() })
			.expect("Text content should serialize.");
		let group = serde_json::to_value(MessageContent::GroupInvitation { group_id: "g".into() })
			.expect("Group content should serialize.");
		let card = serde_json::to_value(MessageContent::AppletCard(AppletCard {
			path: Some("pages/index".into()),
			..Default::default()
		}))
		.expect("Applet card should serialize.");

		assert_eq!(text, serde_json::json!({ "msg_type": 1, "text": { "text": "hi" } }));
		assert_eq!(group, serde_json::json!({ "msg_type": 9, "group_invitation": { "group_id": "g" } }));
		assert_eq!(
			card,
			serde_json::json!({ "msg_type": 10, "applet_card": { "path": "pages/index" } })
		);
	}
}
