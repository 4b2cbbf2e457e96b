//! Keeper configuration: credentials, endpoints, and quota knobs.

// self
use crate::{_prelude::*, error::ConfigError};

/// Default token request budget per quota window.
pub const DEFAULT_MAX_TOKEN_REQUESTS: u32 = 5;
/// Default quota window length.
pub const DEFAULT_QUOTA_WINDOW: Duration = Duration::HOUR;

/// Validated configuration shared by [`TokenManager`](crate::manager::TokenManager) and
/// [`OrderFetcher`](crate::orders::OrderFetcher).
///
/// All four credential/endpoint fields are mandatory; construction fails with a
/// [`ConfigError`] when any of them is empty or a URL does not parse as absolute. The
/// quota knobs default to five token requests per rolling hour and exist mainly so
/// tests can shrink the window.
#[derive(Clone)]
pub struct KeeperConfig {
	/// OAuth 2.0 client identifier used for HTTP Basic authentication.
	pub client_id: String,
	/// OAuth 2.0 client secret paired with the identifier.
	pub client_secret: String,
	/// Absolute URL of the client-credentials token endpoint.
	pub token_url: Url,
	/// Absolute URL of the downstream order list endpoint.
	pub order_list_url: Url,
	/// Maximum number of token fetches allowed per quota window.
	pub max_token_requests: u32,
	/// Length of the rolling quota window.
	pub quota_window: Duration,
}
impl KeeperConfig {
	/// Validates and builds a configuration from the four required fields.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		token_url: &str,
		order_list_url: &str,
	) -> Result<Self, ConfigError> {
		let client_id = non_empty("client_id", client_id.into())?;
		let client_secret = non_empty("client_secret", client_secret.into())?;
		let token_url = absolute_url("token_url", token_url)?;
		let order_list_url = absolute_url("order_list_url", order_list_url)?;

		Ok(Self {
			client_id,
			client_secret,
			token_url,
			order_list_url,
			max_token_requests: DEFAULT_MAX_TOKEN_REQUESTS,
			quota_window: DEFAULT_QUOTA_WINDOW,
		})
	}

	/// Overrides the token request budget per window.
	pub fn with_max_token_requests(mut self, max: u32) -> Result<Self, ConfigError> {
		if max == 0 {
			return Err(ConfigError::ZeroQuotaBudget);
		}

		self.max_token_requests = max;

		Ok(self)
	}

	/// Overrides the quota window length.
	pub fn with_quota_window(mut self, window: Duration) -> Self {
		self.quota_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}
}
impl Debug for KeeperConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeeperConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("token_url", &self.token_url.as_str())
			.field("order_list_url", &self.order_list_url.as_str())
			.field("max_token_requests", &self.max_token_requests)
			.field("quota_window", &self.quota_window)
			.finish()
	}
}

fn non_empty(field: &'static str, value: String) -> Result<String, ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::EmptyField { field }) } else { Ok(value) }
}

fn absolute_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
	if value.trim().is_empty() {
		return Err(ConfigError::EmptyField { field });
	}

	Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })
}
