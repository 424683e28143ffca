//! Destroy observers.

use std::fmt;
use std::sync::Arc;

use hostctx_handle::ContextHandle;
use parking_lot::Mutex;

/// Capability notified when a context handle is torn down.
///
/// The registry keeps a non-owning `Arc` for broadcasting only and never calls
/// [`dispose`](Self::dispose); the owner disposes the observer before letting
/// go of it. One observer may watch any number of handles over its lifetime.
pub trait DestroyObserver: Send + Sync {
	/// Called once per teardown of `handle`, with no registry lock held.
	fn notify(&self, handle: ContextHandle);

	/// Releases whatever the observer holds. Later `notify` calls must be no-ops.
	fn dispose(&self);
}

type Callback = dyn Fn(ContextHandle) + Send + Sync;

/// Closure-backed [`DestroyObserver`].
///
/// Disposing drops the closure and everything it captured.
pub struct FnObserver {
	callback: Mutex<Option<Arc<Callback>>>,
}

impl FnObserver {
	/// Wraps `callback`.
	pub fn new<F>(callback: F) -> Self
	where
		F: Fn(ContextHandle) + Send + Sync + 'static,
	{
		Self {
			callback: Mutex::new(Some(Arc::new(callback))),
		}
	}

	/// Wraps `callback` and returns it ready for registration.
	pub fn shared<F>(callback: F) -> Arc<Self>
	where
		F: Fn(ContextHandle) + Send + Sync + 'static,
	{
		Arc::new(Self::new(callback))
	}

	/// Returns true once [`DestroyObserver::dispose`] has run.
	pub fn is_disposed(&self) -> bool {
		self.callback.lock().is_none()
	}
}

impl DestroyObserver for FnObserver {
	fn notify(&self, handle: ContextHandle) {
		// Clone out so the callback may dispose this observer.
		let callback = self.callback.lock().clone();
		if let Some(callback) = callback {
			callback(handle);
		}
	}

	fn dispose(&self) {
		self.callback.lock().take();
	}
}

impl fmt::Debug for FnObserver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FnObserver").field("disposed", &self.is_disposed()).finish()
	}
}
