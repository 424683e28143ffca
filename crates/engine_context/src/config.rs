//! Engine context configuration.

use serde::{Deserialize, Serialize};

/// Which threads may call into an [`EngineContext`](crate::EngineContext).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadAffinity {
	/// Any thread.
	#[default]
	Any,
	/// Only the thread that created the context (the platform thread).
	CreatingThread,
}

/// Tunables for an [`EngineContext`](crate::EngineContext).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineContextConfig {
	/// Thread check applied to every call.
	pub thread_affinity: ThreadAffinity,
}
