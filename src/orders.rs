//! Periodic order polling built on top of the token manager.
//!
//! [`OrderFetcher`] is a thin consumer: it asks the manager for an authorization
//! header, GETs the configured order endpoint, and publishes results (or failures)
//! to registered listeners. The periodic loop converts every failure into an error
//! event so a bad tick never stops the schedule.

// crates.io
use tokio::task::JoinHandle;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, OrderFetchError},
	http::{HttpClient, HttpRequest},
	manager::TokenManager,
	obs::{self, FetchKind, FetchOutcome, FetchSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Default polling interval in minutes.
pub const DEFAULT_FETCH_INTERVAL_MINUTES: u64 = 5;

#[cfg(feature = "reqwest")]
/// Order fetcher specialized for the crate's default reqwest transport.
pub type ReqwestOrderFetcher = OrderFetcher<ReqwestHttpClient>;

/// Immutable order snapshot as returned by the order endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
	/// Order identifier.
	pub id: u64,
	/// Human-readable product name.
	pub product_name: String,
	/// Ordered quantity.
	pub quantity: u32,
	/// Unit price.
	pub price: f64,
	/// Instant the order was placed.
	#[serde(with = "time::serde::rfc3339")]
	pub order_date: OffsetDateTime,
	/// Order status label.
	pub status: String,
	/// Customer display name.
	pub customer_name: String,
}

type UpdatedListener = Arc<dyn Fn(&[OrderItem]) + Send + Sync>;
type ErrorListener = Arc<dyn Fn(&Error) + Send + Sync>;

/// Periodic poller that fetches the order list with a managed token.
///
/// At most one periodic task exists per fetcher. Stopping (or dropping) the fetcher
/// aborts the task, which deterministically prevents further ticks; a tick whose
/// HTTP call is already in flight may still complete and publish its outcome.
pub struct OrderFetcher<C>
where
	C: ?Sized + HttpClient,
{
	inner: Arc<FetcherInner<C>>,
	ticker: Mutex<Option<JoinHandle<()>>>,
}
impl<C> OrderFetcher<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates a fetcher that shares the manager's transport and configuration.
	pub fn new(manager: Arc<TokenManager<C>>) -> Self {
		let http_client = manager.http_client.clone();

		Self::with_http_client(manager, http_client)
	}

	/// Creates a fetcher with a dedicated transport (the endpoint still comes from
	/// the manager's configuration).
	pub fn with_http_client(manager: Arc<TokenManager<C>>, http_client: impl Into<Arc<C>>) -> Self {
		let order_list_url = manager.config().order_list_url.clone();

		Self {
			inner: Arc::new(FetcherInner {
				http_client: http_client.into(),
				manager,
				order_list_url,
				updated_listeners: Mutex::new(Vec::new()),
				error_listeners: Mutex::new(Vec::new()),
			}),
			ticker: Mutex::new(None),
		}
	}

	/// Registers a listener for successful periodic fetches.
	pub fn on_order_list_updated(&self, listener: impl Fn(&[OrderItem]) + Send + Sync + 'static) {
		self.inner.updated_listeners.lock().push(Arc::new(listener));
	}

	/// Registers a listener for failed periodic fetches.
	pub fn on_error(&self, listener: impl Fn(&Error) + Send + Sync + 'static) {
		self.inner.error_listeners.lock().push(Arc::new(listener));
	}

	/// Fetches the order list once, using a fresh authorization header.
	///
	/// Fails with [`Error::OrderFetch`] on transport, status, or payload problems
	/// and propagates the manager's token failures unchanged. An empty JSON array
	/// yields an empty list.
	pub async fn order_list(&self) -> Result<Vec<OrderItem>> {
		self.inner.order_list().await
	}

	/// Starts the periodic loop: one immediate fetch, then one per interval.
	///
	/// Must be called from within a tokio runtime. A zero interval is a
	/// configuration error; calling while already running warns and keeps the
	/// existing schedule.
	pub fn start_periodic_fetch(&self, interval_minutes: u64) -> Result<()> {
		if interval_minutes == 0 {
			return Err(ConfigError::NonPositiveInterval.into());
		}

		let mut guard = self.ticker.lock();

		if guard.as_ref().is_some_and(|handle| !handle.is_finished()) {
			obs::warn("Periodic order fetch is already running; ignoring start request.");

			return Ok(());
		}

		let inner = Arc::clone(&self.inner);
		let period = std::time::Duration::from_secs(interval_minutes * 60);
		let handle = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);

			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

			loop {
				ticker.tick().await;

				// A failed tick becomes an error event; the schedule itself never dies.
				match inner.order_list().await {
					Ok(orders) => inner.notify_updated(&orders),
					Err(error) => inner.notify_error(&error),
				}
			}
		});

		*guard = Some(handle);

		Ok(())
	}

	/// Aborts the periodic task; safe to call when nothing is running.
	pub fn stop_periodic_fetch(&self) {
		if let Some(handle) = self.ticker.lock().take() {
			handle.abort();
		}
	}

	/// Returns `true` iff a periodic task is currently scheduled.
	pub fn is_running(&self) -> bool {
		self.ticker.lock().as_ref().is_some_and(|handle| !handle.is_finished())
	}
}
impl<C> Debug for OrderFetcher<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OrderFetcher")
			.field("order_list_url", &self.inner.order_list_url.as_str())
			.field("running", &self.is_running())
			.finish()
	}
}
impl<C> Drop for OrderFetcher<C>
where
	C: ?Sized + HttpClient,
{
	fn drop(&mut self) {
		self.stop_periodic_fetch();
	}
}

/// State shared between the fetcher handle and its periodic task.
struct FetcherInner<C>
where
	C: ?Sized + HttpClient,
{
	http_client: Arc<C>,
	manager: Arc<TokenManager<C>>,
	order_list_url: Url,
	updated_listeners: Mutex<Vec<UpdatedListener>>,
	error_listeners: Mutex<Vec<ErrorListener>>,
}
impl<C> FetcherInner<C>
where
	C: ?Sized + HttpClient,
{
	async fn order_list(&self) -> Result<Vec<OrderItem>> {
		let span = FetchSpan::new(FetchKind::Orders, "order_list");

		span.instrument(async move {
			obs::record_fetch_outcome(FetchKind::Orders, FetchOutcome::Attempt);

			let result = self.fetch_order_list().await;

			match &result {
				Ok(_) => obs::record_fetch_outcome(FetchKind::Orders, FetchOutcome::Success),
				Err(_) => obs::record_fetch_outcome(FetchKind::Orders, FetchOutcome::Failure),
			}

			result
		})
		.await
	}

	async fn fetch_order_list(&self) -> Result<Vec<OrderItem>> {
		let authorization = self.manager.authorization_header().await?;
		let request =
			HttpRequest::get(self.order_list_url.clone()).header("Authorization", authorization);
		let response = self
			.http_client
			.execute(request)
			.await
			.map_err(|e| Error::OrderFetch(OrderFetchError::network(e)))?;

		if !response.is_success() {
			return Err(OrderFetchError::Status { status: response.status }.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
		let orders = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| OrderFetchError::Parse { source })?;

		Ok(orders)
	}

	// Listener lists are cloned out of the lock before invocation so a slow or
	// re-subscribing listener cannot deadlock the fetcher.
	fn notify_updated(&self, orders: &[OrderItem]) {
		let listeners = self.updated_listeners.lock().clone();

		for listener in listeners {
			listener(orders);
		}
	}

	fn notify_error(&self, error: &Error) {
		let listeners = self.error_listeners.lock().clone();

		for listener in listeners {
			listener(error);
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn order_item_uses_camel_case_wire_names() {
		let json = "{\"id\":7,\"productName\":\"Widget\",\"quantity\":3,\"price\":19.99,\
			\"orderDate\":\"2025-06-01T10:30:00Z\",\"status\":\"shipped\",\
			\"customerName\":\"Ada\"}";
		let order: OrderItem =
			serde_json::from_str(json).expect("Order payload should deserialize.");

		assert_eq!(order.id, 7);
		assert_eq!(order.product_name, "Widget");
		assert_eq!(order.quantity, 3);
		assert_eq!(order.price, 19.99);
		assert_eq!(order.order_date, macros::datetime!(2025-06-01 10:30 UTC));
		assert_eq!(order.status, "shipped");
		assert_eq!(order.customer_name, "Ada");

		let rendered = serde_json::to_string(&order).expect("Order should serialize.");

		assert!(rendered.contains("\"productName\""));
		assert!(rendered.contains("\"customerName\""));
	}

	#[test]
	fn empty_array_parses_to_an_empty_list() {
		let orders: Vec<OrderItem> =
			serde_json::from_str("[]").expect("Empty array should deserialize.");

		assert!(orders.is_empty());
	}
}
