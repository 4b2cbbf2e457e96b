//! Token-domain models: secrets, cached state, wire payloads, and snapshots.

pub mod secret;
pub mod state;

pub use secret::*;
pub use state::*;

// self
use crate::_prelude::*;

/// Fraction of `expires_in` the keeper actually trusts.
///
/// Callers may hold a token for the duration of an outbound request; shaving the
/// usable lifetime to 90% prevents a token from expiring between the validity check
/// and its use by a downstream call.
pub const SAFETY_MARGIN_RATIO: f64 = 0.9;

/// Token type the keeper assumes when the endpoint omits `token_type`.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Wire payload returned by the client-credentials token endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenEndpointResponse {
	/// Issued access token; an absent field deserializes as empty and is rejected by
	/// the manager so missing and empty tokens fail identically.
	#[serde(default)]
	pub access_token: String,
	/// Token type label, defaulting to `Bearer` when absent.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Token lifetime in seconds as reported by the endpoint.
	pub expires_in: i64,
}
impl TokenEndpointResponse {
	/// Computes the margined expiry instant for a token issued at `issued_at`.
	pub fn margined_expiry(&self, issued_at: OffsetDateTime) -> OffsetDateTime {
		issued_at + Duration::seconds_f64(self.expires_in as f64 * SAFETY_MARGIN_RATIO)
	}
}

/// Read-only snapshot of the manager's token and quota state.
///
/// Computed fresh on every call and never fails; `remaining_seconds` is floored at
/// zero so an expired token never reports negative time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
	/// Whether any token is cached, valid or not.
	pub has_token: bool,
	/// Whether the cached token is still within its margined lifetime.
	pub is_valid: bool,
	/// Whole seconds until expiry, floored at zero.
	pub remaining_seconds: i64,
	/// Token fetches consumed in the current quota window.
	pub requests_used: u32,
	/// Token fetches still available in the current quota window.
	pub requests_remaining: u32,
	/// Margined expiry instant, when a token is cached.
	#[serde(with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn margined_expiry_applies_the_safety_ratio() {
		let response = TokenEndpointResponse {
			access_token: "token".into(),
			token_type: None,
			expires_in: 100,
		};
		let issued_at = macros::datetime!(2025-06-01 12:00 UTC);

		assert_eq!(response.margined_expiry(issued_at), issued_at + Duration::seconds(90));
	}

	#[test]
	fn wire_payload_defaults_the_token_type() {
		let response: TokenEndpointResponse =
			serde_json::from_str("{\"access_token\":\"abc\",\"expires_in\":3600}")
				.expect("Payload without token_type should deserialize.");

		assert_eq!(response.token_type, None);
		assert_eq!(response.expires_in, 3600);
	}
}
