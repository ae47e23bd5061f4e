// crates.io
use httpmock::prelude::*;
use md5::{Digest, Md5};
use serde_json::json;
// self
use douyin_openapi::{
	_preludet::*,
	api::{CreateOrderParams, CreateRefundParams, CreateReturnParams, SettleItem, SettleParams},
	sign::RequestSigner,
};

#[tokio::test]
async fn create_order_posts_signed_body() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let params = CreateOrderParams {
		out_order_no: "A1".into(),
		total_amount: 100,
		subject: "Sub".into(),
		body: "Body".into(),
		valid_time: 900,
		cp_extra: Some("extra".into()),
		thirdparty_id: Some("tp-1".into()),
		..Default::default()
	};
	// Values sorted byte-wise with the salt; `thirdparty_id` never takes part.
	let expected_sign = hex::encode(Md5::digest(b"100&900&A1&Body&Sub&extra&salt-value"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/create_order").json_body(json!({
				"app_id": TEST_APP_ID,
				"out_order_no": "A1",
				"total_amount": 100,
				"subject": "Sub",
				"body": "Body",
				"valid_time": 900,
				"cp_extra": "extra",
				"thirdparty_id": "tp-1",
				"sign": expected_sign
			}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"err_no": 0,
				"err_tips": "",
				"data": { "order_id": "N7", "order_token": "order-token" }
			}));
		})
		.await;
	let response = api.create_order(&params).await?;

	assert_eq!(response.data.order_id, "N7");
	assert_eq!(response.data.order_token, "order-token");

	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn query_order_maps_platform_error() {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/query_order");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "err_no": 2008, "err_tips": "sign is invalid" }));
		})
		.await;
	let err = api.query_order("A1", None).await.expect_err("Non-zero err_no must fail.");

	assert!(matches!(
		err,
		Error::Api { operation: "query_order", code: 2008, ref message } if message == "sign is invalid"
	));

	mock.assert_async().await;
}

#[tokio::test]
async fn undecodable_response_reports_status() {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/query_refund");
			then.status(502).body("<html>bad gateway</html>");
		})
		.await;
	let err = api.query_refund("R1", None).await.expect_err("HTML body must fail to decode.");

	assert!(matches!(err, Error::Decode { status: Some(502), .. }));

	mock.assert_async().await;
}

#[tokio::test]
async fn create_refund_signs_optional_fields() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let params = CreateRefundParams {
		out_order_no: "A1".into(),
		out_refund_no: "R1".into(),
		reason: "damaged".into(),
		refund_amount: 30,
		disable_msg: Some(1),
		..Default::default()
	};
	let expected_sign = RequestSigner::new(TEST_SALT).sign([
		("out_order_no", "A1"),
		("out_refund_no", "R1"),
		("reason", "damaged"),
		("refund_amount", "30"),
		("disable_msg", "1"),
	]);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/create_refund").json_body(json!({
				"app_id": TEST_APP_ID,
				"out_order_no": "A1",
				"out_refund_no": "R1",
				"reason": "damaged",
				"refund_amount": 30,
				"disable_msg": 1,
				"sign": expected_sign
			}));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "err_no": 0, "err_tips": "", "refund_no": "RN1" }));
		})
		.await;
	let response = api.create_refund(&params).await?;

	assert_eq!(response.refund_no, "RN1");

	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn settle_embeds_items_as_json_text() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let params = SettleParams {
		out_settle_no: "S1".into(),
		out_order_no: "A1".into(),
		settle_desc: "split".into(),
		..Default::default()
	};
	let items = [SettleItem { merchant_uid: "m-1".into(), amount: 50 }];
	let settle_params = r#"[{"merchant_uid":"m-1","amount":50}]"#;
	let expected_sign = RequestSigner::new(TEST_SALT).sign([
		("out_settle_no", "S1"),
		("out_order_no", "A1"),
		("settle_desc", "split"),
		("settle_params", settle_params),
	]);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/settle").json_body(json!({
				"app_id": TEST_APP_ID,
				"out_settle_no": "S1",
				"out_order_no": "A1",
				"settle_desc": "split",
				"settle_params": settle_params,
				"sign": expected_sign
			}));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "err_no": 0, "err_tips": "", "settle_no": "SN1" }));
		})
		.await;
	let response = api.settle(&params, &items).await?;

	assert_eq!(response.settle_no, "SN1");

	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn unsettle_amount_decodes_breakdown() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/unsettle_amount");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"err_no": 0,
				"err_tips": "",
				"data": {
					"out_order_no": "A1",
					"unsettle_amount": 70,
					"detail": {
						"pay_info": { "out_order_no": "A1", "amount": 100 },
						"refund_info": [{ "out_refund_no": "R1", "amount": 30 }],
						"payment_rake": 1
					}
				}
			}));
		})
		.await;
	let response = api.unsettle_amount("A1", None, None).await?;

	assert_eq!(response.data.unsettle_amount, 70);
	assert_eq!(response.data.detail.pay_info.amount, 100);
	assert_eq!(response.data.detail.refund_info.len(), 1);
	assert_eq!(response.data.detail.payment_rake, 1);

	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn code2session_sends_credentials_unsigned() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/v2/jscode2session").json_body(json!({
				"appid": TEST_APP_ID,
				"secret": TEST_APP_SECRET,
				"code": "login-code"
			}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"err_no": 0,
				"err_tips": "success",
				"data": { "session_key": "sk", "openid": "o-1", "unionid": "u-1" }
			}));
		})
		.await;
	let response = api.code2session("login-code", "").await?;

	assert_eq!(response.data.openid, "o-1");
	assert_eq!(response.data.session_key, "sk");
	assert!(response.data.anonymous_openid.is_empty());

	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn create_return_posts_signed_body() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let params = CreateReturnParams {
		out_settle_no: Some("S1".into()),
		out_return_no: "R1".into(),
		merchant_uid: "M1".into(),
		return_amount: 10,
		return_desc: "desc".into(),
		thirdparty_id: Some("tp-1".into()),
		..Default::default()
	};
	let expected_sign = hex::encode(Md5::digest(b"10&M1&R1&S1&desc&salt-value"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/create_return").json_body(json!({
				"app_id": TEST_APP_ID,
				"out_settle_no": "S1",
				"out_return_no": "R1",
				"merchant_uid": "M1",
				"return_amount": 10,
				"return_desc": "desc",
				"thirdparty_id": "tp-1",
				"sign": expected_sign
			}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"err_no": 0,
				"err_tips": "",
				"return_info": {
					"out_return_no": "R1",
					"return_amount": 10,
					"return_status": "PROCESSING",
					"return_no": "RN"
				}
			}));
		})
		.await;
	let response = api.create_return(&params).await?;

	assert_eq!(response.return_info.return_no, "RN");
	assert_eq!(response.return_info.return_status, "PROCESSING");
	assert_eq!(response.return_info.return_amount, 10);

	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn query_return_signs_only_present_identifiers() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let expected_sign = hex::encode(Md5::digest(b"R1&salt-value"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/query_return").json_body(json!({
				"app_id": TEST_APP_ID,
				"out_return_no": "R1",
				"sign": expected_sign
			}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"err_no": 0,
				"err_tips": "",
				"return_info": {
					"out_return_no": "R1",
					"return_status": "SUCCESS",
					"finish_time": 1700000000
				}
			}));
		})
		.await;
	let response = api.query_return(None, Some("R1"), None).await?;

	assert_eq!(response.return_info.return_status, "SUCCESS");
	assert_eq!(response.return_info.finish_time, 1_700_000_000);

	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn query_settle_posts_signed_body_and_maps_platform_error() {
	let server = MockServer::start_async().await;
	let (api, _) = build_reqwest_test_api(TEST_APP_ID, &server.base_url());
	let expected_sign = hex::encode(Md5::digest(b"S1&salt-value"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/apps/ecpay/v1/query_settle").json_body(json!({
				"app_id": TEST_APP_ID,
				"out_settle_no": "S1",
				"sign": expected_sign
			}));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "err_no": 5, "err_tips": "nope" }));
		})
		.await;
	let err = api.query_settle("S1", None).await.expect_err("Non-zero err_no must fail.");

	assert!(matches!(
		err,
		Error::Api { operation: "query_settle", code: 5, ref message } if message == "nope"
	));
	assert_eq!(err.api_code(), Some(5));

	mock.assert_async().await;
}
