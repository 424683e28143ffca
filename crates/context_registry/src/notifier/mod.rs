//! Destroy-observer collection and broadcast.
//!
//! The observer list is published through an [`ArcSwap`]. Writers serialize on
//! a mutex, clone the current list, edit the clone and publish it. A broadcast
//! loads the published list exactly once before invoking anyone, so:
//!
//! * every observer present at broadcast start is notified exactly once;
//! * observers added during the broadcast wait for the next one;
//! * observers removed during the broadcast are still notified by it.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use arc_swap::ArcSwap;
use hostctx_handle::{ContextHandle, ObserverId, ObserverIdAllocator};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::config::ObserverPanicPolicy;
use crate::observer::DestroyObserver;

/// One registered observer.
#[derive(Clone)]
pub struct ObserverEntry {
	id: ObserverId,
	observer: Arc<dyn DestroyObserver>,
}

impl ObserverEntry {
	/// Identifier returned when the observer was added.
	pub fn id(&self) -> ObserverId {
		self.id
	}

	/// The observer itself.
	pub fn observer(&self) -> &Arc<dyn DestroyObserver> {
		&self.observer
	}
}

impl fmt::Debug for ObserverEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ObserverEntry").field(&self.id).finish()
	}
}

/// Immutable point-in-time copy of the observer list, in insertion order.
pub type ObserverSnapshot = Arc<Vec<ObserverEntry>>;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
	/// Handle that was torn down.
	pub handle: ContextHandle,
	/// Observers whose `notify` was invoked (the snapshot size).
	pub invoked: usize,
	/// Invoked observers that panicked.
	pub panicked: usize,
}

/// Ordered set of destroy observers.
pub struct NotifierSet {
	entries: ArcSwap<Vec<ObserverEntry>>,
	/// Serializes writers; also owns id allocation.
	ids: Mutex<ObserverIdAllocator>,
	panic_policy: ObserverPanicPolicy,
}

impl Default for NotifierSet {
	fn default() -> Self {
		Self::new(ObserverPanicPolicy::default())
	}
}

impl NotifierSet {
	/// Creates an empty set.
	pub fn new(panic_policy: ObserverPanicPolicy) -> Self {
		Self {
			entries: ArcSwap::from_pointee(Vec::new()),
			ids: Mutex::new(ObserverIdAllocator::new()),
			panic_policy,
		}
	}

	/// Appends `observer`. Insertion order is invocation order.
	pub fn add_observer(&self, observer: Arc<dyn DestroyObserver>) -> ObserverId {
		let mut ids = self.ids.lock();
		let id = ids.next();
		let mut next = (*self.entries.load_full()).clone();
		next.push(ObserverEntry { id, observer });
		let count = next.len();
		self.entries.store(Arc::new(next));
		debug!(observer = %id, count, "destroy observer added");
		id
	}

	/// Removes the observer registered as `id`.
	///
	/// This is the owner's removal path; broadcasts never remove anyone.
	/// Disposal stays with the caller.
	pub fn remove_observer(&self, id: ObserverId) -> Option<Arc<dyn DestroyObserver>> {
		let _ids = self.ids.lock();
		let current = self.entries.load_full();
		let pos = current.iter().position(|entry| entry.id == id)?;
		let mut next = (*current).clone();
		let removed = next.remove(pos);
		let count = next.len();
		self.entries.store(Arc::new(next));
		debug!(observer = %id, count, "destroy observer removed");
		Some(removed.observer)
	}

	/// Returns the current observer list.
	pub fn snapshot(&self) -> ObserverSnapshot {
		self.entries.load_full()
	}

	/// Number of registered observers.
	pub fn len(&self) -> usize {
		self.entries.load().len()
	}

	/// Returns true when no observer is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Notifies every observer present right now that `handle` is gone.
	///
	/// Runs with no lock held. Under [`ObserverPanicPolicy::Propagate`] the
	/// first observer panic is resumed after the whole snapshot was notified.
	pub fn broadcast(&self, handle: ContextHandle) -> BroadcastReport {
		let snapshot = self.snapshot();
		let mut report = BroadcastReport {
			handle,
			invoked: 0,
			panicked: 0,
		};
		let mut first_panic = None;

		for entry in snapshot.iter() {
			report.invoked += 1;
			let result = panic::catch_unwind(AssertUnwindSafe(|| entry.observer.notify(handle)));
			if let Err(payload) = result {
				report.panicked += 1;
				error!(%handle, observer = %entry.id, panic = panic_message(&*payload), "destroy observer panicked");
				if self.panic_policy == ObserverPanicPolicy::Propagate && first_panic.is_none() {
					first_panic = Some(payload);
				}
			}
		}

		if let Some(payload) = first_panic {
			panic::resume_unwind(payload);
		}
		report
	}
}

impl fmt::Debug for NotifierSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NotifierSet")
			.field("observers", &self.len())
			.field("panic_policy", &self.panic_policy)
			.finish()
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		msg
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.as_str()
	} else {
		"non-string panic payload"
	}
}
