//! Salted MD5 request signatures for the payment, settlement, and merchant endpoints.
//!
//! Each signed request type lists its fields explicitly through [`SignableRequest`]. The signer
//! drops excluded names and blank values, appends the salt, sorts the remaining values
//! byte-wise, joins them with `&`, and renders the MD5 digest as lowercase hex. Field names only
//! matter for exclusion; the digest depends on the values alone.

// crates.io
use md5::{Digest, Md5};
// self
use crate::{_prelude::*, auth::Secret};

/// Field names that never contribute to a signature.
pub const EXCLUDED_FIELDS: [&str; 6] =
	["other_settle_params", "app_id", "thirdparty_id", "sign", "salt", "token"];

/// Request types that can enumerate their signable fields.
pub trait SignableRequest {
	/// Returns the request's `(name, value)` pairs in any order.
	fn signing_fields(&self) -> SigningFields;
}

/// Ordered list of stringified request fields fed to [`RequestSigner`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SigningFields(Vec<(&'static str, String)>);
impl SigningFields {
	/// Creates an empty field list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a textual field.
	pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.0.push((name, value.into()));

		self
	}

	/// Adds a textual field when present.
	pub fn opt_text(self, name: &'static str, value: Option<&str>) -> Self {
		match value {
			Some(value) => self.text(name, value),
			None => self,
		}
	}

	/// Adds an integer field; zero is kept.
	pub fn integer(self, name: &'static str, value: i64) -> Self {
		self.text(name, value.to_string())
	}

	/// Adds an integer field when present.
	pub fn opt_integer(self, name: &'static str, value: Option<i64>) -> Self {
		match value {
			Some(value) => self.integer(name, value),
			None => self,
		}
	}

	/// Iterates over the collected pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (*name, value.as_str()))
	}
}

/// Computes request signatures from a shared salt.
#[derive(Clone, Debug)]
pub struct RequestSigner {
	salt: Secret,
}
impl RequestSigner {
	/// Creates a signer for the provided salt.
	pub fn new(salt: impl Into<Secret>) -> Self {
		Self { salt: salt.into() }
	}

	/// Signs arbitrary `(name, value)` pairs.
	pub fn sign<'a, I>(&self, fields: I) -> String
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let mut values = fields
			.into_iter()
			.filter(|(name, _)| !EXCLUDED_FIELDS.contains(name))
			.filter_map(|(_, value)| normalize(value))
			.collect::<Vec<_>>();

		values.push(self.salt.expose());
		values.sort_unstable();

		hex::encode(Md5::digest(values.join("&").as_bytes()))
	}

	/// Signs a request through its explicit field list.
	pub fn sign_request(&self, request: &impl SignableRequest) -> String {
		let fields = request.signing_fields();

		self.sign(fields.iter())
	}
}

/// Trims whitespace and one pair of surrounding quotes; blank and `null` values are dropped.
fn normalize(raw: &str) -> Option<&str> {
	let mut value = raw.trim();

	if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
		value = value[1..value.len() - 1].trim();
	}

	if value.is_empty() || value == "null" { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn md5_hex(input: &str) -> String {
		hex::encode(Md5::digest(input.as_bytes()))
	}

	#[test]
	fn signature_is_sorted_salted_md5() {
		let signer = RequestSigner::new("salt");
		let sign = signer.sign([("out_order_no", "A1"), ("total_amount", "100"), ("subject", "b")]);

		assert_eq!(sign, md5_hex("100&A1&b&salt"));
		assert_eq!(sign.len(), 32);
		assert!(sign.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
	}

	#[test]
	fn permutation_does_not_change_signature() {
		let signer = RequestSigner::new("salt");
		let forward = signer.sign([("a", "x"), ("b", "y"), ("c", "z")]);
		let backward = signer.sign([("c", "z"), ("a", "x"), ("b", "y")]);

		assert_eq!(forward, backward);
	}

	#[test]
	fn excluded_blank_and_null_values_are_skipped() {
		let signer = RequestSigner::new("salt");
		let baseline = signer.sign([("subject", "item")]);
		let noisy = signer.sign([
			("subject", "item"),
			("app_id", "tt1"),
			("thirdparty_id", "tp"),
			("sign", "old"),
			("other_settle_params", "[]"),
			("cp_extra", "   "),
			("notify_url", "null"),
			("body", "\"null\""),
			("msg_page", "\"\""),
		]);

		assert_eq!(baseline, noisy);
	}

	#[test]
	fn zero_is_kept_and_quotes_are_stripped() {
		let signer = RequestSigner::new("salt");

		assert_eq!(signer.sign([("disable_msg", "0")]), md5_hex("0&salt"));
		assert_eq!(signer.sign([("subject", " \" item \" ")]), md5_hex("item&salt"));
		assert_eq!(signer.sign([("subject", "\"")]), md5_hex("\"&salt"));
	}

	#[test]
	fn optional_integers_sign_only_when_present() {
		let fields = SigningFields::new()
			.opt_integer("disable_msg", None)
			.opt_integer("valid_time", Some(0))
			.opt_text("cp_extra", None)
			.integer("total_amount", 1);
		let collected = fields.iter().collect::<Vec<_>>();

		assert_eq!(collected, vec![("valid_time", "0"), ("total_amount", "1")]);
	}
}
