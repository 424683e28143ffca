//! The context registry and its teardown protocol.

use std::fmt;
use std::sync::Arc;

use hostctx_handle::{ContextHandle, ObserverId};
use tracing::{debug, trace};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::notifier::{BroadcastReport, NotifierSet};
use crate::observer::DestroyObserver;
use crate::table::HandleTable;

/// Outcome of [`ContextRegistry::unregister`].
#[derive(Debug)]
pub enum Unregistered<I> {
	/// The handle was live; it is gone now and observers were notified.
	Removed {
		/// Instance that was registered under the handle.
		instance: Arc<I>,
		/// What the destroy broadcast did.
		report: BroadcastReport,
	},
	/// The handle was not registered. Nothing happened.
	Absent,
}

impl<I> Unregistered<I> {
	/// Returns true when this call removed the handle.
	pub fn was_removed(&self) -> bool {
		matches!(self, Self::Removed { .. })
	}

	/// The evicted instance, if any.
	pub fn instance(&self) -> Option<&Arc<I>> {
		match self {
			Self::Removed { instance, .. } => Some(instance),
			Self::Absent => None,
		}
	}

	/// The broadcast report, if a broadcast ran.
	pub fn report(&self) -> Option<BroadcastReport> {
		match self {
			Self::Removed { report, .. } => Some(*report),
			Self::Absent => None,
		}
	}
}

/// Directory of attached host contexts plus the destroy-notification channel.
///
/// One registry is constructed explicitly at process start and shared by
/// `Arc` with every component that needs it; tests build isolated ones.
///
/// Per handle the lifecycle is `unregistered -> registered -> unregistered`,
/// and the second transition is terminal: the value is never issued again.
pub struct ContextRegistry<I> {
	table: HandleTable<I>,
	notifiers: NotifierSet,
}

impl<I> Default for ContextRegistry<I> {
	fn default() -> Self {
		Self::new()
	}
}

impl<I> ContextRegistry<I> {
	/// Creates a registry with default configuration.
	pub fn new() -> Self {
		Self::with_config(&RegistryConfig::default())
	}

	/// Creates a registry from `config`.
	pub fn with_config(config: &RegistryConfig) -> Self {
		Self {
			table: HandleTable::new(),
			notifiers: NotifierSet::new(config.observer_panics),
		}
	}

	/// Admits `instance` under a fresh handle.
	pub fn register(&self, instance: Arc<I>) -> ContextHandle {
		let handle = self.table.register(instance);
		debug!(%handle, "context registered");
		handle
	}

	/// Returns the instance registered under `handle`.
	pub fn lookup(&self, handle: ContextHandle) -> Option<Arc<I>> {
		let found = self.table.lookup(handle);
		trace!(%handle, found = found.is_some(), "context lookup");
		found
	}

	/// Like [`lookup`](Self::lookup) for a raw boundary value.
	pub fn lookup_raw(&self, raw: i64) -> Option<Arc<I>> {
		self.lookup(ContextHandle::from_raw(raw)?)
	}

	/// Returns the instance registered under `handle`, or
	/// [`RegistryError::NotFound`].
	pub fn resolve(&self, handle: ContextHandle) -> Result<Arc<I>> {
		self.lookup(handle).ok_or(RegistryError::NotFound { handle: handle.to_raw() })
	}

	/// Like [`resolve`](Self::resolve) for a raw boundary value.
	pub fn resolve_raw(&self, raw: i64) -> Result<Arc<I>> {
		self.lookup_raw(raw).ok_or(RegistryError::NotFound { handle: raw })
	}

	/// Evicts `handle` and broadcasts its destruction.
	///
	/// The mapping is removed under the table lock, the lock is released, and
	/// only then are observers notified; no lookup that starts after removal
	/// can see the handle. Absent handles (never issued, or already removed
	/// by an earlier detach) are a silent no-op with no broadcast, so of any
	/// number of racing calls for one handle exactly one broadcasts.
	pub fn unregister(&self, handle: ContextHandle) -> Unregistered<I> {
		let Some(instance) = self.table.remove(handle) else {
			debug!(%handle, "unregister of absent context ignored");
			return Unregistered::Absent;
		};
		debug!(%handle, observers = self.notifiers.len(), "context unregistered");
		let report = self.notifiers.broadcast(handle);
		Unregistered::Removed { instance, report }
	}

	/// Like [`unregister`](Self::unregister) for a raw boundary value.
	pub fn unregister_raw(&self, raw: i64) -> Unregistered<I> {
		match ContextHandle::from_raw(raw) {
			Some(handle) => self.unregister(handle),
			None => Unregistered::Absent,
		}
	}

	/// Registers a destroy observer for every future teardown.
	///
	/// The observer stays registered until its owner calls
	/// [`unwatch`](Self::unwatch); disposing it is the owner's job too.
	pub fn watch_destroy(&self, observer: Arc<dyn DestroyObserver>) -> ObserverId {
		self.notifiers.add_observer(observer)
	}

	/// Removes a destroy observer without disposing it.
	pub fn unwatch(&self, id: ObserverId) -> Option<Arc<dyn DestroyObserver>> {
		self.notifiers.remove_observer(id)
	}

	/// Returns true while `handle` is registered.
	pub fn contains(&self, handle: ContextHandle) -> bool {
		self.table.contains(handle)
	}

	/// Number of live handles.
	pub fn len(&self) -> usize {
		self.table.len()
	}

	/// Returns true when no context is registered.
	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	/// Live handles in allocation order.
	pub fn handles(&self) -> Vec<ContextHandle> {
		self.table.handles()
	}

	/// Number of registered destroy observers.
	pub fn observer_count(&self) -> usize {
		self.notifiers.len()
	}

	/// The underlying observer set.
	pub fn notifiers(&self) -> &NotifierSet {
		&self.notifiers
	}
}

impl<I> fmt::Debug for ContextRegistry<I> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContextRegistry")
			.field("table", &self.table)
			.field("notifiers", &self.notifiers)
			.finish()
	}
}
