//! Both sides of the host boundary, built on [`hostctx_registry`].
//!
//! * [`host`]: what the host framework drives. A [`HostSession`] registers a
//!   [`HostContext`] on attach, answers the "what is my handle" method call and
//!   unregisters on detach, however many times detach fires.
//! * [`context`]: what native code uses. An [`EngineContext`] resolves
//!   resources from raw handles with typed errors and fans destroy
//!   notifications out to native subscribers.

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod error;
pub mod host;
mod resources;

pub use config::{EngineContextConfig, ThreadAffinity};
pub use context::{DestroySubscription, EngineContext, install_registry, installed_registry};
pub use error::{EngineContextError, Result};
pub use host::{
	ActivityBinding, ENGINE_CONTEXT_CHANNEL, EngineBinding, GET_ENGINE_HANDLE, HostContext, HostSession, MethodCall,
	MethodResponse,
};
pub use resources::{ActivityRef, MessengerRef, TextureRegistryRef, ViewRef};

/// Registry specialised to host contexts.
pub type HostRegistry = hostctx_registry::ContextRegistry<HostContext>;
