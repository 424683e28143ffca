//! Native side of the boundary.
//!
//! An [`EngineContext`] resolves host resources from the raw handles the
//! managed side hands to native code, and lets native code subscribe to engine
//! destruction. It installs exactly one observer in the registry and fans each
//! notification out to its own subscribers.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use std::thread::{self, ThreadId};

use hostctx_registry::{ContextHandle, DestroyObserver, FnObserver, ObserverId};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::HostRegistry;
use crate::config::{EngineContextConfig, ThreadAffinity};
use crate::error::{EngineContextError, Result};
use crate::host::HostContext;
use crate::resources::{ActivityRef, MessengerRef, TextureRegistryRef, ViewRef};

static INSTALLED: OnceLock<Arc<HostRegistry>> = OnceLock::new();

/// Installs the process-wide registry used by [`EngineContext::from_installed`].
///
/// Returns false if a registry was already installed; the first one stays.
pub fn install_registry(registry: Arc<HostRegistry>) -> bool {
	let installed = INSTALLED.set(registry).is_ok();
	if installed {
		debug!("engine context registry installed");
	}
	installed
}

/// The process-wide registry, if installed.
pub fn installed_registry() -> Option<Arc<HostRegistry>> {
	INSTALLED.get().cloned()
}

/// Token for one destroy subscription, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DestroySubscription(u64);

type DestroyCallback = dyn Fn(i64) + Send + Sync;

#[derive(Default)]
struct Subscribers {
	next_id: u64,
	entries: Vec<(DestroySubscription, Arc<DestroyCallback>)>,
}

impl Subscribers {
	fn dispatch(this: &Mutex<Self>, handle: ContextHandle) {
		// Copy out and release: a callback may subscribe or unsubscribe.
		let snapshot: Vec<_> = this.lock().entries.iter().map(|(_, cb)| Arc::clone(cb)).collect();
		debug!(%handle, subscribers = snapshot.len(), "engine destroyed");
		for callback in snapshot {
			callback(handle.to_raw());
		}
	}
}

/// Native-side view of the engine contexts known to a registry.
pub struct EngineContext {
	registry: Arc<HostRegistry>,
	subscribers: Arc<Mutex<Subscribers>>,
	observer: Arc<FnObserver>,
	observer_id: ObserverId,
	owner_thread: Option<ThreadId>,
}

impl EngineContext {
	/// Creates a context over `registry` and starts listening for destruction.
	pub fn new(registry: Arc<HostRegistry>, config: &EngineContextConfig) -> Self {
		let subscribers = Arc::new(Mutex::new(Subscribers::default()));
		let weak: Weak<Mutex<Subscribers>> = Arc::downgrade(&subscribers);
		let observer = FnObserver::shared(move |handle| {
			if let Some(subscribers) = weak.upgrade() {
				Subscribers::dispatch(&subscribers, handle);
			}
		});
		let observer_id = registry.watch_destroy(observer.clone());
		let owner_thread = match config.thread_affinity {
			ThreadAffinity::Any => None,
			ThreadAffinity::CreatingThread => Some(thread::current().id()),
		};
		Self {
			registry,
			subscribers,
			observer,
			observer_id,
			owner_thread,
		}
	}

	/// Creates a context over the registry set by [`install_registry`].
	pub fn from_installed(config: &EngineContextConfig) -> Result<Self> {
		let registry = installed_registry().ok_or(EngineContextError::PluginNotLoaded)?;
		Ok(Self::new(registry, config))
	}

	/// The registry this context reads from.
	pub fn registry(&self) -> &Arc<HostRegistry> {
		&self.registry
	}

	/// View for the engine behind `handle`.
	pub fn get_flutter_view(&self, handle: i64) -> Result<ViewRef> {
		let context = self.resolve(handle)?;
		context.flutter_view().ok_or(EngineContextError::ResourceUnavailable { resource: "view", handle })
	}

	/// Message transport for the engine behind `handle`.
	pub fn get_binary_messenger(&self, handle: i64) -> Result<MessengerRef> {
		Ok(self.resolve(handle)?.binary_messenger())
	}

	/// Texture registry for the engine behind `handle`.
	pub fn get_texture_registry(&self, handle: i64) -> Result<TextureRegistryRef> {
		Ok(self.resolve(handle)?.texture_registry())
	}

	/// Activity hosting the engine behind `handle`.
	pub fn get_activity(&self, handle: i64) -> Result<ActivityRef> {
		let context = self.resolve(handle)?;
		context.activity().ok_or(EngineContextError::ResourceUnavailable { resource: "activity", handle })
	}

	/// Calls `callback` with the raw handle of every engine destroyed from now
	/// on, until the subscription is cancelled or this context is dropped.
	pub fn register_destroy_notification<F>(&self, callback: F) -> Result<DestroySubscription>
	where
		F: Fn(i64) + Send + Sync + 'static,
	{
		self.check_thread()?;
		let mut subscribers = self.subscribers.lock();
		subscribers.next_id += 1;
		let token = DestroySubscription(subscribers.next_id);
		subscribers.entries.push((token, Arc::new(callback)));
		Ok(token)
	}

	/// Cancels a subscription. Returns false if it was not active.
	pub fn unregister_destroy_notification(&self, token: DestroySubscription) -> Result<bool> {
		self.check_thread()?;
		let mut subscribers = self.subscribers.lock();
		let before = subscribers.entries.len();
		subscribers.entries.retain(|(t, _)| *t != token);
		Ok(subscribers.entries.len() != before)
	}

	fn resolve(&self, handle: i64) -> Result<Arc<HostContext>> {
		self.check_thread()?;
		self.registry.resolve_raw(handle).map_err(|err| {
			warn!(handle, "engine handle did not resolve");
			EngineContextError::from(err)
		})
	}

	fn check_thread(&self) -> Result<()> {
		match self.owner_thread {
			Some(owner) if owner != thread::current().id() => Err(EngineContextError::InvalidThread),
			_ => Ok(()),
		}
	}
}

impl Drop for EngineContext {
	fn drop(&mut self) {
		self.registry.unwatch(self.observer_id);
		self.observer.dispose();
	}
}

impl fmt::Debug for EngineContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EngineContext")
			.field("observer", &self.observer_id)
			.field("subscribers", &self.subscribers.lock().entries.len())
			.field("owner_thread", &self.owner_thread)
			.finish()
	}
}

#[cfg(test)]
mod tests;
