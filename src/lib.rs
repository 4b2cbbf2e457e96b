//! Rust's client-credentials token keeper—cached access tokens, hourly quota guards, and a
//! periodic order poller in one crate built for service clients.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod http;
pub mod manager;
pub mod obs;
pub mod orders;
pub mod quota;
pub mod token;

#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::KeeperConfig, http::ReqwestHttpClient, manager::TokenManager, orders::OrderFetcher,
	};

	/// Token manager type alias used by reqwest-backed integration tests.
	pub type ReqwestTokenManager = TokenManager<ReqwestHttpClient>;
	/// Order fetcher type alias used by reqwest-backed integration tests.
	pub type ReqwestOrderFetcher = OrderFetcher<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a [`KeeperConfig`] pointing at the provided mock endpoints.
	pub fn test_keeper_config(token_url: &str, order_list_url: &str) -> KeeperConfig {
		KeeperConfig::new("test-client", "test-secret", token_url, order_list_url)
			.expect("Test keeper configuration should be valid.")
	}

	/// Constructs a [`TokenManager`] backed by the insecure test transport.
	pub fn build_reqwest_test_manager(config: KeeperConfig) -> Arc<ReqwestTokenManager> {
		Arc::new(TokenManager::with_http_client(config, test_reqwest_http_client()))
	}

	/// Constructs an [`OrderFetcher`] sharing the manager's configuration.
	pub fn build_reqwest_test_fetcher(
		config: KeeperConfig,
	) -> (Arc<ReqwestOrderFetcher>, Arc<ReqwestTokenManager>) {
		let manager = build_reqwest_test_manager(config);
		let fetcher =
			Arc::new(OrderFetcher::with_http_client(manager.clone(), test_reqwest_http_client()));

		(fetcher, manager)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
