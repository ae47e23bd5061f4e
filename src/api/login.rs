//! Mini-app login (`code2session`).

// self
use crate::{
	_prelude::*,
	api::{OpenApi, impl_envelope},
	http::OpenApiHttpClient,
	obs::Operation,
};

const CODE2SESSION_PATH: &str = "/api/apps/v2/jscode2session";

#[derive(Debug, Serialize)]
struct Code2SessionRequest<'a> {
	appid: &'a str,
	secret: &'a str,
	#[serde(skip_serializing_if = "str::is_empty")]
	code: &'a str,
	#[serde(skip_serializing_if = "str::is_empty")]
	anonymous_code: &'a str,
}

/// Response returned by [`OpenApi::code2session`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Code2SessionResponse {
	/// Platform error code.
	pub err_no: i64,
	/// Platform error message.
	pub err_tips: String,
	/// Session payload.
	pub data: Code2SessionData,
}
impl_envelope!(Code2SessionResponse, err_no, err_tips);

/// Session established by a successful login.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Code2SessionData {
	/// Session key used to decrypt user data on the client.
	pub session_key: String,
	/// Per-app user identifier; empty for anonymous logins.
	pub openid: String,
	/// Anonymous user identifier.
	pub anonymous_openid: String,
	/// Cross-app user identifier.
	pub unionid: String,
}

impl<C> OpenApi<C>
where
	C: ?Sized + OpenApiHttpClient,
{
	/// Exchanges a login `code` (or `anonymous_code`) for a session.
	pub async fn code2session(
		&self,
		code: &str,
		anonymous_code: &str,
	) -> Result<Code2SessionResponse> {
		let config = self.config();
		let request = Code2SessionRequest {
			appid: config.app_id.as_ref(),
			secret: config.app_secret.expose(),
			code,
			anonymous_code,
		};

		self.developer_post(Operation::Code2Session, CODE2SESSION_PATH, &request).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_codes_are_omitted() {
		let request =
			Code2SessionRequest { appid: "tt1", secret: "s", code: "c", anonymous_code: "" };
		let value = serde_json::to_value(&request).expect("Login request should serialize.");

		assert_eq!(value, serde_json::json!({ "appid": "tt1", "secret": "s", "code": "c" }));
	}
}
