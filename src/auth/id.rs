//! Mini-app identifier.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const APP_ID_MAX_LEN: usize = 64;

/// Error returned when an app id is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum AppIdError {
	/// The app id was empty.
	#[error("App id cannot be empty.")]
	Empty,
	/// The app id contains whitespace; usually a copy-paste accident.
	#[error("App id contains whitespace.")]
	ContainsWhitespace,
	/// The app id exceeded the allowed length.
	#[error("App id exceeds {max} bytes.")]
	TooLong {
		/// Maximum permitted byte count.
		max: usize,
	},
}

/// Mini-app identifier issued by the platform, e.g. `tt07e3715e98c9aac0`.
///
/// The id is embedded in signed bodies, token requests, and the default cache key, so it is
/// validated once on construction.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId(String);
impl AppId {
	/// Validates and wraps `value`.
	pub fn new(value: impl Into<String>) -> Result<Self, AppIdError> {
		let value = value.into();

		if value.is_empty() {
			return Err(AppIdError::Empty);
		}
		if value.chars().any(char::is_whitespace) {
			return Err(AppIdError::ContainsWhitespace);
		}
		if value.len() > APP_ID_MAX_LEN {
			return Err(AppIdError::TooLong { max: APP_ID_MAX_LEN });
		}

		Ok(Self(value))
	}
}
impl Deref for AppId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for AppId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<AppId> for String {
	fn from(value: AppId) -> Self {
		value.0
	}
}
impl TryFrom<String> for AppId {
	type Error = AppIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for AppId {
	type Err = AppIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for AppId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "AppId({})", self.0)
	}
}
impl Display for AppId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
