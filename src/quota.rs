//! Rolling-window budget for outbound token requests.

// self
use crate::_prelude::*;

/// Tracks how many token fetches happened inside the current window.
///
/// The window rolls lazily: any accessor that takes `now` first resets the counter
/// when the window has fully elapsed. Only successful fetches consume budget, so a
/// rejected or failed exchange never burns a slot.
#[derive(Clone, Debug)]
pub struct QuotaWindow {
	max_requests: u32,
	window: Duration,
	used: u32,
	window_start: OffsetDateTime,
}
impl QuotaWindow {
	/// Creates a fresh window starting at `now`.
	pub fn new(max_requests: u32, window: Duration, now: OffsetDateTime) -> Self {
		Self { max_requests, window, used: 0, window_start: now }
	}

	/// Rolls the window when it has elapsed, then reports whether budget remains.
	pub fn can_request_at(&mut self, now: OffsetDateTime) -> bool {
		self.roll_at(now);

		self.used < self.max_requests
	}

	/// Records one consumed token fetch.
	pub fn record_request(&mut self) {
		self.used = self.used.saturating_add(1);
	}

	/// Instant at which the current window rolls over.
	pub fn resets_at(&self) -> OffsetDateTime {
		self.window_start + self.window
	}

	/// Fetches consumed inside the current window.
	pub fn used(&self) -> u32 {
		self.used
	}

	/// Fetches still available inside the current window.
	pub fn remaining(&self) -> u32 {
		self.max_requests.saturating_sub(self.used)
	}

	fn roll_at(&mut self, now: OffsetDateTime) {
		if now - self.window_start >= self.window {
			self.used = 0;
			self.window_start = now;
		}
	}
}
