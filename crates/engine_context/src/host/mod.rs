//! Host-framework side of the boundary.
//!
//! The host calls [`HostSession::attach`] when an engine session begins and
//! [`HostSession::detach`] when it ends. Detach may fire more than once under
//! some lifecycle orderings; only the first one unregisters.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hostctx_registry::ContextHandle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::HostRegistry;
use crate::resources::{ActivityRef, MessengerRef, TextureRegistryRef, ViewRef};

/// Method channel the handle query is served on.
pub const ENGINE_CONTEXT_CHANNEL: &str = "dev.hostctx.engine_context";

/// Method name of the handle query.
pub const GET_ENGINE_HANDLE: &str = "getEngineHandle";

/// Resources the engine exposes for its whole attached lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineBinding {
	/// Engine-level view; headless engines have none.
	pub view: Option<ViewRef>,
	/// Message transport.
	pub messenger: MessengerRef,
	/// Texture registry.
	pub textures: TextureRegistryRef,
}

/// Resources available while an activity hosts the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityBinding {
	/// The activity.
	pub activity: ActivityRef,
	/// View found inside the activity, if any.
	pub view: Option<ViewRef>,
}

/// One attached engine session, as stored in the registry.
#[derive(Debug)]
pub struct HostContext {
	engine: EngineBinding,
	activity: RwLock<Option<ActivityBinding>>,
}

impl HostContext {
	/// Creates a context with no activity attached.
	pub fn new(engine: EngineBinding) -> Self {
		Self {
			engine,
			activity: RwLock::new(None),
		}
	}

	/// Engine-level resources.
	pub fn engine(&self) -> &EngineBinding {
		&self.engine
	}

	/// Current activity binding.
	pub fn activity_binding(&self) -> Option<ActivityBinding> {
		*self.activity.read()
	}

	/// Current activity.
	pub fn activity(&self) -> Option<ActivityRef> {
		self.activity_binding().map(|binding| binding.activity)
	}

	/// The activity's view while one is attached, the engine view otherwise.
	pub fn flutter_view(&self) -> Option<ViewRef> {
		self.activity_binding().and_then(|binding| binding.view).or(self.engine.view)
	}

	/// Message transport.
	pub fn binary_messenger(&self) -> MessengerRef {
		self.engine.messenger
	}

	/// Texture registry.
	pub fn texture_registry(&self) -> TextureRegistryRef {
		self.engine.textures
	}

	fn set_activity(&self, binding: Option<ActivityBinding>) {
		*self.activity.write() = binding;
	}
}

/// Incoming method call on [`ENGINE_CONTEXT_CHANNEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
	/// Method name.
	pub method: String,
}

impl MethodCall {
	/// Builds a call to `method`.
	pub fn new(method: impl Into<String>) -> Self {
		Self { method: method.into() }
	}
}

/// Reply to a [`MethodCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MethodResponse {
	/// The call succeeded with this value.
	Success(i64),
	/// The method is unknown.
	NotImplemented,
}

/// Host-side lifetime of one engine context.
///
/// Dropping the session detaches it.
pub struct HostSession {
	registry: Arc<HostRegistry>,
	context: Arc<HostContext>,
	handle: ContextHandle,
	detached: AtomicBool,
}

impl HostSession {
	/// Registers a fresh context for `engine`.
	pub fn attach(registry: Arc<HostRegistry>, engine: EngineBinding) -> Self {
		let context = Arc::new(HostContext::new(engine));
		let handle = registry.register(Arc::clone(&context));
		info!(%handle, "host session attached");
		Self {
			registry,
			context,
			handle,
			detached: AtomicBool::new(false),
		}
	}

	/// Handle issued at attach. Stays valid as a value after detach but no
	/// longer resolves.
	pub fn handle(&self) -> ContextHandle {
		self.handle
	}

	/// The registered context.
	pub fn context(&self) -> &Arc<HostContext> {
		&self.context
	}

	/// Records the activity now hosting the engine.
	pub fn attach_activity(&self, binding: ActivityBinding) {
		debug!(handle = %self.handle, activity = ?binding.activity, "activity attached");
		self.context.set_activity(Some(binding));
	}

	/// Clears the activity binding.
	pub fn detach_activity(&self) {
		debug!(handle = %self.handle, "activity detached");
		self.context.set_activity(None);
	}

	/// Configuration change in progress. The previous activity stays visible
	/// until the replacement arrives.
	pub fn detach_activity_for_config_changes(&self) {
		debug!(handle = %self.handle, "activity detached for config change");
	}

	/// Replacement activity after a configuration change.
	pub fn reattach_activity_for_config_changes(&self, binding: ActivityBinding) {
		self.attach_activity(binding);
	}

	/// Ends the session: unregisters the handle, which broadcasts its
	/// destruction. Returns false when the session was already detached.
	pub fn detach(&self) -> bool {
		if self.detached.swap(true, Ordering::AcqRel) {
			debug!(handle = %self.handle, "repeated detach ignored");
			return false;
		}
		let removed = self.registry.unregister(self.handle).was_removed();
		info!(handle = %self.handle, removed, "host session detached");
		removed
	}

	/// Returns true once [`detach`](Self::detach) has run.
	pub fn is_detached(&self) -> bool {
		self.detached.load(Ordering::Acquire)
	}

	/// Serves the managed side's handle query.
	pub fn handle_method_call(&self, call: &MethodCall) -> MethodResponse {
		if call.method == GET_ENGINE_HANDLE {
			MethodResponse::Success(self.handle.to_raw())
		} else {
			MethodResponse::NotImplemented
		}
	}
}

impl Drop for HostSession {
	fn drop(&mut self) {
		self.detach();
	}
}

impl std::fmt::Debug for HostSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HostSession")
			.field("handle", &self.handle)
			.field("detached", &self.is_detached())
			.finish()
	}
}
