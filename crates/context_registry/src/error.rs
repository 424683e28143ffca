//! Registry error type.

/// Errors surfaced by handle resolution.
///
/// Absence is expected, never fatal: callers treat the context as gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// The handle was never issued, or its context has been unregistered.
	#[error("no context registered for handle {handle}")]
	NotFound {
		/// Raw value that failed to resolve.
		handle: i64,
	},
}

/// Result alias for registry operations.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
