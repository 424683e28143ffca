use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::counter::MonotonicCounter;

/// Raw boundary value meaning "no handle".
pub const INVALID_RAW_HANDLE: i64 = 0;

/// Identifier of one attached host context.
///
/// Backed by [`NonZeroU64`], so the invalid sentinel is not representable and
/// `Option<ContextHandle>` has the size of a `u64`. On the managed side the
/// value travels as a signed 64-bit integer; see [`ContextHandle::from_raw`]
/// and [`ContextHandle::to_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ContextHandle(NonZeroU64);

impl ContextHandle {
	/// Wraps an already-validated handle value.
	pub const fn new(value: NonZeroU64) -> Self {
		Self(value)
	}

	/// Returns the numeric value.
	pub const fn get(self) -> u64 {
		self.0.get()
	}

	/// Converts a raw boundary value. `0` and negative values yield `None`.
	pub fn from_raw(raw: i64) -> Option<Self> {
		Self::try_from(raw).ok()
	}

	/// Converts to the raw boundary representation.
	#[allow(clippy::cast_possible_wrap, reason = "allocation never reaches 2^63")]
	pub const fn to_raw(self) -> i64 {
		self.0.get() as i64
	}
}

impl fmt::Display for ContextHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Rejected raw handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidHandleValue {
	/// The "no handle" sentinel.
	#[error("handle 0 is the invalid sentinel")]
	Zero,
	/// Negative values are never issued.
	#[error("negative handle value {0}")]
	Negative(i64),
}

impl TryFrom<u64> for ContextHandle {
	type Error = InvalidHandleValue;

	fn try_from(value: u64) -> Result<Self, Self::Error> {
		NonZeroU64::new(value).map(Self).ok_or(InvalidHandleValue::Zero)
	}
}

impl TryFrom<i64> for ContextHandle {
	type Error = InvalidHandleValue;

	fn try_from(raw: i64) -> Result<Self, Self::Error> {
		let value = u64::try_from(raw).map_err(|_| InvalidHandleValue::Negative(raw))?;
		Self::try_from(value)
	}
}

impl From<ContextHandle> for u64 {
	fn from(handle: ContextHandle) -> Self {
		handle.get()
	}
}

impl From<ContextHandle> for i64 {
	fn from(handle: ContextHandle) -> Self {
		handle.to_raw()
	}
}

/// Allocator of strictly increasing handles, starting at 1.
///
/// Values are never reissued. The allocator is not synchronized: the handle
/// table advances it under the same lock that guards its map, so allocation
/// order and insertion order agree.
#[derive(Debug, Clone, Default)]
pub struct HandleAllocator {
	counter: MonotonicCounter,
}

impl HandleAllocator {
	/// Creates an allocator whose first handle is 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocates the next handle.
	#[allow(clippy::should_implement_trait, reason = "not an iterator")]
	pub fn next(&mut self) -> ContextHandle {
		ContextHandle(self.counter.advance())
	}

	/// Returns the handle the next allocation will produce.
	pub const fn peek(&self) -> ContextHandle {
		ContextHandle(self.counter.peek())
	}
}
