use std::num::NonZeroU64;

/// Monotonic non-zero counter shared by the handle and observer allocators.
///
/// Not synchronized; owners advance it under their own lock.
#[derive(Debug, Clone)]
pub(crate) struct MonotonicCounter {
	next: NonZeroU64,
}

impl Default for MonotonicCounter {
	fn default() -> Self {
		Self { next: NonZeroU64::MIN }
	}
}

impl MonotonicCounter {
	/// Returns the current value and advances by one.
	pub fn advance(&mut self) -> NonZeroU64 {
		let value = self.next;
		// 2^64 allocations cannot happen within a process lifetime.
		self.next = value.saturating_add(1);
		value
	}

	/// Value the next call to [`Self::advance`] returns.
	pub const fn peek(&self) -> NonZeroU64 {
		self.next
	}
}
