//! Registry configuration.

use serde::{Deserialize, Serialize};

/// What a broadcast does when an observer panics inside `notify`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverPanicPolicy {
	/// Log the panic and keep notifying the remaining observers.
	#[default]
	Isolate,
	/// Notify the remaining observers, then resume the first panic.
	Propagate,
}

/// Tunables for a [`ContextRegistry`](crate::ContextRegistry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Panic handling during destroy broadcasts.
	pub observer_panics: ObserverPanicPolicy,
}
