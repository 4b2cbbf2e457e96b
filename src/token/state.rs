//! Cached token state owned by the manager and mutated only under its lock.

// self
use crate::{_prelude::*, token::{DEFAULT_TOKEN_TYPE, TokenSecret}};

/// Cached access token, its type label, and margined expiry.
///
/// The secret and the expiry are set and cleared together; a state with a token but
/// no expiry (or the reverse) cannot be constructed through this API.
#[derive(Clone, Debug)]
pub struct TokenState {
	access_token: Option<TokenSecret>,
	token_type: String,
	expires_at: Option<OffsetDateTime>,
}
impl TokenState {
	/// Stores a freshly issued token together with its margined expiry.
	pub fn store(&mut self, token: TokenSecret, token_type: Option<String>, expires_at: OffsetDateTime) {
		self.access_token = Some(token);
		self.token_type = token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.into());
		self.expires_at = Some(expires_at);
	}

	/// Drops the cached token and expiry; the type label resets to the default.
	pub fn clear(&mut self) {
		self.access_token = None;
		self.token_type = DEFAULT_TOKEN_TYPE.into();
		self.expires_at = None;
	}

	/// Returns `true` when a token is cached and `now` is strictly before its expiry.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		match (&self.access_token, self.expires_at) {
			(Some(token), Some(expires_at)) => !token.is_empty() && now < expires_at,
			_ => false,
		}
	}

	/// Returns the cached secret, if any.
	pub fn secret(&self) -> Option<&TokenSecret> {
		self.access_token.as_ref()
	}

	/// Returns `true` when any token is cached, valid or not.
	pub fn has_token(&self) -> bool {
		self.access_token.as_ref().is_some_and(|token| !token.is_empty())
	}

	/// Returns the token type label used when building authorization headers.
	pub fn token_type(&self) -> &str {
		&self.token_type
	}

	/// Returns the margined expiry instant, if a token is cached.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Whole seconds until expiry at `now`, floored at zero.
	pub fn remaining_seconds_at(&self, now: OffsetDateTime) -> i64 {
		self.expires_at.map_or(0, |expires_at| (expires_at - now).whole_seconds().max(0))
	}

	/// Builds `"<token_type> <token>"` from the cached secret, if one is present.
	pub fn authorization_header(&self) -> Option<String> {
		self.access_token.as_ref().map(|token| format!("{} {}", self.token_type, token.expose()))
	}
}
impl Default for TokenState {
	fn default() -> Self {
		Self { access_token: None, token_type: DEFAULT_TOKEN_TYPE.into(), expires_at: None }
	}
}
