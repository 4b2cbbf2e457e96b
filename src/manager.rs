//! Token lifecycle manager: caching, expiry math, quota guarding, and the
//! client-credentials exchange itself.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	config::KeeperConfig,
	error::TokenFetchError,
	http::{HttpClient, HttpRequest},
	obs::{self, FetchKind, FetchOutcome, FetchSpan},
	quota::QuotaWindow,
	token::{TokenEndpointResponse, TokenInfo, TokenSecret, TokenState},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const CLIENT_CREDENTIALS_BODY: &str = "grant_type=client_credentials";

#[cfg(feature = "reqwest")]
/// Token manager specialized for the crate's default reqwest transport.
pub type ReqwestTokenManager = TokenManager<ReqwestHttpClient>;

/// Caches one client-credentials token per credential pair and guards the hourly
/// fetch budget.
///
/// All token and quota state lives behind a single mutex whose holds are in-memory
/// only, so lock latency stays bounded while the HTTP exchange itself runs without
/// the lock. Two cold callers may therefore both reach the token endpoint and each
/// consume one quota slot; the last writer under the lock wins the cached value.
/// That race is deliberate—serializing callers through the network round trip would
/// block unrelated readers for the full latency of the exchange.
pub struct TokenManager<C>
where
	C: ?Sized + HttpClient,
{
	/// HTTP client used for every token exchange.
	pub http_client: Arc<C>,
	config: KeeperConfig,
	state: Mutex<ManagerState>,
}
impl<C> TokenManager<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates a manager that reuses the caller-provided transport.
	pub fn with_http_client(config: KeeperConfig, http_client: impl Into<Arc<C>>) -> Self {
		let quota = QuotaWindow::new(
			config.max_token_requests,
			config.quota_window,
			OffsetDateTime::now_utc(),
		);

		Self {
			http_client: http_client.into(),
			config,
			state: Mutex::new(ManagerState { token: TokenState::default(), quota }),
		}
	}

	/// Returns the validated configuration the manager was built with.
	pub fn config(&self) -> &KeeperConfig {
		&self.config
	}

	/// Returns `true` iff a token is cached and the current instant is strictly
	/// before its margined expiry. Pure read; never touches quota state.
	pub fn is_token_valid(&self) -> bool {
		self.state.lock().token.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Rolls the quota window when it has elapsed, then reports whether another
	/// token fetch is allowed right now.
	pub fn can_make_token_request(&self) -> bool {
		self.state.lock().quota.can_request_at(OffsetDateTime::now_utc())
	}

	/// Read-only snapshot of token and quota state; never fails.
	pub fn token_info(&self) -> TokenInfo {
		let now = OffsetDateTime::now_utc();
		let state = self.state.lock();

		TokenInfo {
			has_token: state.token.has_token(),
			is_valid: state.token.is_valid_at(now),
			remaining_seconds: state.token.remaining_seconds_at(now),
			requests_used: state.quota.used(),
			requests_remaining: state.quota.remaining(),
			expires_at: state.token.expires_at(),
		}
	}

	/// Drops the cached token so the next [`valid_token`](Self::valid_token) call
	/// performs a fresh exchange. Quota state is untouched.
	pub fn invalidate_token(&self) {
		self.state.lock().token.clear();
	}

	/// Returns the cached token, refreshing it first when missing or expired.
	///
	/// Repeated calls within the validity window return the identical secret and
	/// issue zero network requests. A refresh fails with
	/// [`Error::QuotaExceeded`] when the hourly budget is spent and with
	/// [`Error::TokenFetch`] on transport, status, or payload failures.
	pub async fn valid_token(&self) -> Result<TokenSecret> {
		let span = FetchSpan::new(FetchKind::Token, "valid_token");

		span.instrument(async move {
			if let Some(cached) = self.cached_token() {
				return Ok(cached);
			}

			obs::record_fetch_outcome(FetchKind::Token, FetchOutcome::Attempt);

			let result = self.exchange_client_credentials().await;

			match &result {
				Ok(_) => obs::record_fetch_outcome(FetchKind::Token, FetchOutcome::Success),
				Err(_) => obs::record_fetch_outcome(FetchKind::Token, FetchOutcome::Failure),
			}

			result
		})
		.await
	}

	/// Builds `"<token_type> <token>"` from [`valid_token`](Self::valid_token);
	/// shares its failure modes.
	pub async fn authorization_header(&self) -> Result<String> {
		let token = self.valid_token().await?;
		let token_type = self.state.lock().token.token_type().to_owned();

		Ok(format!("{token_type} {}", token.expose()))
	}

	fn cached_token(&self) -> Option<TokenSecret> {
		let now = OffsetDateTime::now_utc();
		let state = self.state.lock();

		if state.token.is_valid_at(now) { state.token.secret().cloned() } else { None }
	}

	async fn exchange_client_credentials(&self) -> Result<TokenSecret> {
		{
			let now = OffsetDateTime::now_utc();
			let mut state = self.state.lock();

			if !state.quota.can_request_at(now) {
				return Err(Error::QuotaExceeded { reset_at: state.quota.resets_at() });
			}
		}

		// The lock is released for the duration of the exchange, so concurrent cold
		// callers may each run one and each consume one quota slot.
		let response = self
			.http_client
			.execute(self.token_request())
			.await
			.map_err(|e| Error::TokenFetch(TokenFetchError::network(e)))?;

		if !response.is_success() {
			return Err(TokenFetchError::Status { status: response.status }.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
		let payload: TokenEndpointResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TokenFetchError::Parse { source })?;

		if payload.access_token.is_empty() {
			return Err(TokenFetchError::MissingAccessToken.into());
		}

		let secret = TokenSecret::new(payload.access_token.clone());
		let now = OffsetDateTime::now_utc();
		let expires_at = payload.margined_expiry(now);

		{
			let mut state = self.state.lock();

			state.token.store(secret.clone(), payload.token_type.clone(), expires_at);
			state.quota.record_request();
		}

		Ok(secret)
	}

	fn token_request(&self) -> HttpRequest {
		let credentials =
			STANDARD.encode(format!("{}:{}", self.config.client_id, self.config.client_secret));

		HttpRequest::post(self.config.token_url.clone(), CLIENT_CREDENTIALS_BODY)
			.header("Authorization", format!("Basic {credentials}"))
			.header("Content-Type", "application/x-www-form-urlencoded")
	}
}
impl<C> Debug for TokenManager<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager").field("config", &self.config).finish()
	}
}

struct ManagerState {
	token: TokenState,
	quota: QuotaWindow,
}
