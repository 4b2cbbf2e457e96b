//! Keeper-level error types shared across the manager, fetcher, and transport layers.

// self
use crate::_prelude::*;

/// Keeper-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical keeper error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Hourly token request budget is exhausted; retry once the window rolls.
	#[error("Hourly token request quota is exhausted; resets at {reset_at}.")]
	QuotaExceeded {
		/// Instant when the current quota window rolls over.
		reset_at: OffsetDateTime,
	},
	/// Token endpoint call failed (network, HTTP status, or payload shape).
	#[error(transparent)]
	TokenFetch(#[from] TokenFetchError),
	/// Order endpoint call failed (network, HTTP status, or payload shape).
	#[error(transparent)]
	OrderFetch(#[from] OrderFetchError),
}
impl Error {
	/// Returns the quota reset instant when the error is a quota rejection.
	pub fn quota_reset_at(&self) -> Option<OffsetDateTime> {
		match self {
			Self::QuotaExceeded { reset_at } => Some(*reset_at),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required configuration field was empty.
	#[error("Configuration field `{field}` must not be empty.")]
	EmptyField {
		/// Name of the offending field.
		field: &'static str,
	},
	/// A configured endpoint is not a valid absolute URL.
	#[error("Configuration field `{field}` is not a valid absolute URL.")]
	InvalidUrl {
		/// Name of the offending field.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The periodic fetch interval must be at least one minute.
	#[error("Periodic fetch interval must be a positive number of minutes.")]
	NonPositiveInterval,
	/// The quota budget must allow at least one request.
	#[error("Quota budget must allow at least one request per window.")]
	ZeroQuotaBudget,
}

/// Failures raised while obtaining a token from the token endpoint.
#[derive(Debug, ThisError)]
pub enum TokenFetchError {
	/// Underlying HTTP transport reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint answered with a non-success HTTP status.
	#[error("Token endpoint returned HTTP status {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint response omitted the access token or sent it empty.
	#[error("Token endpoint response is missing an access token.")]
	MissingAccessToken,
}
impl TokenFetchError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Failures raised while fetching the downstream order list.
#[derive(Debug, ThisError)]
pub enum OrderFetchError {
	/// Underlying HTTP transport reported a network failure.
	#[error("Network error occurred while calling the order endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Order endpoint answered with a non-success HTTP status.
	#[error("Order endpoint returned HTTP status {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Order endpoint responded with malformed JSON that could not be parsed.
	#[error("Order endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl OrderFetchError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
