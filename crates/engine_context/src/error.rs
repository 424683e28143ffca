//! Native-facing error type.

use hostctx_registry::RegistryError;

/// Errors returned by [`EngineContext`](crate::EngineContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineContextError {
	/// No engine is registered under this handle (never issued, or destroyed).
	#[error("invalid engine handle {handle}")]
	InvalidHandle {
		/// Raw handle value the caller passed.
		handle: i64,
	},
	/// The context is bound to its creating thread and was used elsewhere.
	#[error("engine context used off its platform thread")]
	InvalidThread,
	/// No registry was installed for [`EngineContext::from_installed`](crate::EngineContext::from_installed).
	#[error("engine context registry not installed")]
	PluginNotLoaded,
	/// The engine is live but the resource is not attached right now.
	#[error("{resource} not available for engine handle {handle}")]
	ResourceUnavailable {
		/// Resource name.
		resource: &'static str,
		/// Raw handle value the caller passed.
		handle: i64,
	},
}

impl From<RegistryError> for EngineContextError {
	fn from(err: RegistryError) -> Self {
		match err {
			RegistryError::NotFound { handle } => Self::InvalidHandle { handle },
		}
	}
}

/// Result alias for engine context operations.
pub type Result<T, E = EngineContextError> = std::result::Result<T, E>;
