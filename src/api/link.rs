//! URL links that open a mini-app page from outside Douyin.

// self
use crate::{
	_prelude::*,
	api::{OpenApi, impl_envelope},
	http::OpenApiHttpClient,
	obs::Operation,
};

const URL_LINK_GENERATE_PATH: &str = "/api/apps/url_link/generate";

/// Parameters for [`OpenApi::url_link_generate`]; the access token is filled in by the facade.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UrlLinkParams {
	/// Target mini-app.
	pub ma_app_id: String,
	/// Host app, `douyin` or `douyinlite`.
	pub app_name: String,
	/// Published page path without query; empty opens the home page.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// Query as JSON text, e.g. `{"id":"1"}`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	/// Unix timestamp after which the link stops working; at most 180 days ahead.
	pub expire_time: i64,
}

#[derive(Serialize)]
struct UrlLinkRequest<'a> {
	access_token: &'a str,
	#[serde(flatten)]
	params: &'a UrlLinkParams,
}

/// Response returned by [`OpenApi::url_link_generate`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UrlLinkResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Generated link.
	pub url_link: String,
}
impl_envelope!(UrlLinkResponse, err_no, err_tips);

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Generates a URL link for a mini-app page.
	pub async fn url_link_generate(&self, params: &UrlLinkParams) -> Result<UrlLinkResponse> {
		let token = self.access_token().await?;
		let request = UrlLinkRequest { access_token: token.expose(), params };

		self.developer_post(Operation::UrlLinkGenerate, URL_LINK_GENERATE_PATH, &request).await
	}
}
