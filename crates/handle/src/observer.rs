use std::fmt;
use std::num::NonZeroU64;

use crate::counter::MonotonicCounter;

/// Identifier of a registered destroy observer, used by its owner to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(NonZeroU64);

impl ObserverId {
	/// Returns the numeric value.
	pub const fn get(self) -> u64 {
		self.0.get()
	}
}

impl fmt::Display for ObserverId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "observer#{}", self.0)
	}
}

/// Allocator of never-reused observer identifiers.
#[derive(Debug, Clone, Default)]
pub struct ObserverIdAllocator {
	counter: MonotonicCounter,
}

impl ObserverIdAllocator {
	/// Creates an allocator whose first identifier is 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocates the next identifier.
	#[allow(clippy::should_implement_trait, reason = "not an iterator")]
	pub fn next(&mut self) -> ObserverId {
		ObserverId(self.counter.advance())
	}
}
