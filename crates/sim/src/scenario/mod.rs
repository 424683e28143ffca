//! Scenario files: configuration plus an ordered list of lifecycle steps.
//!
//! ```toml
//! [registry]
//! observer_panics = "isolate"
//!
//! [[step]]
//! action = "attach"
//! session = "main"
//!
//! [[step]]
//! action = "detach"
//! session = "main"
//! ```

use std::path::{Path, PathBuf};

use hostctx_engine::{EngineContextConfig, EngineContextError};
use hostctx_registry::RegistryConfig;
use serde::Deserialize;

mod runner;

pub use runner::{Event, Runner};

/// A parsed scenario file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
	/// Registry tunables.
	pub registry: RegistryConfig,
	/// Native engine context tunables.
	pub engine: EngineContextConfig,
	/// Steps, executed in order.
	#[serde(rename = "step")]
	pub steps: Vec<Step>,
}

impl Scenario {
	/// Reads and parses a scenario file.
	pub fn load(path: &Path) -> Result<Self, ScenarioError> {
		let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::parse(&text)
	}

	/// Parses scenario text.
	pub fn parse(text: &str) -> Result<Self, ScenarioError> {
		Ok(toml::from_str(text)?)
	}
}

/// Expected liveness for lookup steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
	/// The handle must resolve.
	Live,
	/// The handle must not resolve.
	Gone,
}

/// One lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
	/// Host attaches a new engine session.
	Attach {
		session: String,
		#[serde(default)]
		view: Option<usize>,
		#[serde(default)]
		headless: bool,
	},
	/// An activity starts hosting the session's engine.
	AttachActivity { session: String, activity: usize },
	/// The activity goes away.
	DetachActivity { session: String },
	/// Host detaches the session. May be repeated.
	Detach { session: String },
	/// Native code resolves the session's handle.
	Lookup {
		session: String,
		#[serde(default)]
		expect: Option<Expect>,
	},
	/// Native code resolves a raw handle value directly.
	Resolve {
		handle: i64,
		#[serde(default)]
		expect: Option<Expect>,
	},
	/// Managed side sends a method call on the session's channel.
	Query { session: String, method: String },
	/// A named destroy observer starts watching.
	Watch { observer: String },
	/// A named destroy observer is removed and disposed.
	Unwatch { observer: String },
}

/// Scenario loading and execution failures.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
	#[error("failed to read {path}: {source}")]
	Io { path: PathBuf, source: std::io::Error },

	#[error("invalid scenario: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("step {step}: unknown session {name:?}")]
	UnknownSession { step: usize, name: String },

	#[error("step {step}: session {name:?} already attached")]
	DuplicateSession { step: usize, name: String },

	#[error("step {step}: unknown observer {name:?}")]
	UnknownObserver { step: usize, name: String },

	#[error("step {step}: observer {name:?} already watching")]
	DuplicateObserver { step: usize, name: String },

	#[error("step {step}: null {what} reference")]
	NullReference { step: usize, what: &'static str },

	#[error(transparent)]
	Engine(#[from] EngineContextError),

	#[error("step {step}: expected {target} to be {expected:?}, got {actual:?}")]
	Expectation {
		step: usize,
		target: String,
		expected: Expect,
		actual: Expect,
	},
}
