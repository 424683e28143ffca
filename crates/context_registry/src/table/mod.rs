//! Handle allocation and instance lookup.

use std::fmt;
use std::sync::Arc;

use hostctx_handle::{ContextHandle, HandleAllocator};
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

/// Map and allocator under a single lock.
///
/// Both MUST change together: a handle is allocated and inserted in the same
/// critical section, so no reader can see a handle value before its entry.
struct TableState<I> {
	entries: HashMap<ContextHandle, Arc<I>>,
	allocator: HandleAllocator,
}

/// Mapping from live handles to the instances they name.
///
/// Entries are non-owning in the sense that the host framework keeps its own
/// reference; the table only keeps the instance reachable while attached.
pub struct HandleTable<I> {
	state: RwLock<TableState<I>>,
}

impl<I> Default for HandleTable<I> {
	fn default() -> Self {
		Self::new()
	}
}

impl<I> HandleTable<I> {
	/// Creates an empty table whose first handle is 1.
	pub fn new() -> Self {
		Self {
			state: RwLock::new(TableState {
				entries: HashMap::default(),
				allocator: HandleAllocator::new(),
			}),
		}
	}

	/// Stores `instance` under a fresh handle, strictly greater than every
	/// handle issued before.
	pub fn register(&self, instance: Arc<I>) -> ContextHandle {
		let mut state = self.state.write();
		let handle = state.allocator.next();
		state.entries.insert(handle, instance);
		handle
	}

	/// Returns the instance registered under `handle`.
	pub fn lookup(&self, handle: ContextHandle) -> Option<Arc<I>> {
		self.state.read().entries.get(&handle).cloned()
	}

	/// Resolves a raw boundary value. The sentinel and negative values miss
	/// without taking the lock.
	pub fn lookup_raw(&self, raw: i64) -> Option<Arc<I>> {
		self.lookup(ContextHandle::from_raw(raw)?)
	}

	/// Removes the mapping for `handle`, returning the evicted instance.
	///
	/// Absent handles are left alone and yield `None`.
	pub fn remove(&self, handle: ContextHandle) -> Option<Arc<I>> {
		self.state.write().entries.remove(&handle)
	}

	/// Returns true while `handle` is registered.
	pub fn contains(&self, handle: ContextHandle) -> bool {
		self.state.read().entries.contains_key(&handle)
	}

	/// Number of live handles.
	pub fn len(&self) -> usize {
		self.state.read().entries.len()
	}

	/// Returns true when no handle is live.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Live handles in allocation order.
	pub fn handles(&self) -> Vec<ContextHandle> {
		let mut handles: Vec<_> = self.state.read().entries.keys().copied().collect();
		handles.sort_unstable();
		handles
	}
}

impl<I> fmt::Debug for HandleTable<I> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.read();
		f.debug_struct("HandleTable")
			.field("live", &state.entries.len())
			.field("next", &state.allocator.peek())
			.finish()
	}
}

#[cfg(test)]
mod tests;
