use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hostctx_engine::{
	ActivityBinding, ActivityRef, EngineBinding, EngineContext, EngineContextConfig, EngineContextError, HostRegistry, HostSession,
	MessengerRef, MethodCall, MethodResponse, TextureRegistryRef, ViewRef,
};
use hostctx_registry::{DestroyObserver, FnObserver, ObserverId, RegistryConfig};
use parking_lot::Mutex;
use tracing::debug;

use super::{Expect, ScenarioError, Step};

/// Something observable that happened while running a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	Attached { session: String, handle: i64 },
	Detached { session: String, handle: i64, removed: bool },
	Destroyed { observer: String, handle: i64 },
	NativeDestroyed { handle: i64 },
	Resolved { target: String, outcome: Expect },
	Answered { session: String, method: String, response: MethodResponse },
	Watching { observer: String },
	Unwatched { observer: String },
}

impl fmt::Display for Event {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Attached { session, handle } => write!(f, "attach    {session} -> {handle}"),
			Self::Detached { session, handle, removed } => {
				write!(f, "detach    {session} ({handle}){}", if *removed { "" } else { " ignored" })
			}
			Self::Destroyed { observer, handle } => write!(f, "destroyed {handle} -> {observer}"),
			Self::NativeDestroyed { handle } => write!(f, "destroyed {handle} -> native"),
			Self::Resolved { target, outcome } => write!(f, "resolve   {target}: {outcome:?}"),
			Self::Answered { session, method, response } => write!(f, "query     {session}.{method} = {response:?}"),
			Self::Watching { observer } => write!(f, "watch     {observer}"),
			Self::Unwatched { observer } => write!(f, "unwatch   {observer}"),
		}
	}
}

type EventLog = Arc<Mutex<Vec<Event>>>;

/// Executes scenario steps against one isolated registry.
pub struct Runner {
	registry: Arc<HostRegistry>,
	engine: EngineContext,
	log: EventLog,
	/// Attach order, for deterministic teardown.
	order: Vec<String>,
	sessions: HashMap<String, HostSession>,
	observers: HashMap<String, (ObserverId, Arc<FnObserver>)>,
	/// Source of fake platform references.
	next_ref: usize,
}

impl Runner {
	/// Builds a fresh registry and native engine context.
	pub fn new(registry: &RegistryConfig, engine: &EngineContextConfig) -> Self {
		let registry = Arc::new(HostRegistry::with_config(registry));
		let engine = EngineContext::new(Arc::clone(&registry), engine);
		Self {
			registry,
			engine,
			log: EventLog::default(),
			order: Vec::new(),
			sessions: HashMap::new(),
			observers: HashMap::new(),
			next_ref: 0x1000,
		}
	}

	/// Runs `steps`, then detaches every remaining session in attach order
	/// and disposes every remaining observer.
	pub fn run(mut self, steps: &[Step]) -> Result<Vec<Event>, ScenarioError> {
		let log = Arc::clone(&self.log);
		self.engine
			.register_destroy_notification(move |handle| log.lock().push(Event::NativeDestroyed { handle }))?;

		for (index, step) in steps.iter().enumerate() {
			debug!(step = index + 1, ?step, "running step");
			self.step(index + 1, step)?;
		}

		for name in std::mem::take(&mut self.order) {
			if let Some(session) = self.sessions.remove(&name) {
				self.detach(name, &session);
			}
		}
		for (_, (id, observer)) in self.observers.drain() {
			self.registry.unwatch(id);
			observer.dispose();
		}
		Ok(std::mem::take(&mut *self.log.lock()))
	}

	fn step(&mut self, step: usize, action: &Step) -> Result<(), ScenarioError> {
		match action {
			Step::Attach { session, view, headless } => {
				if self.sessions.contains_key(session) {
					return Err(ScenarioError::DuplicateSession {
						step,
						name: session.clone(),
					});
				}
				let binding = self.engine_binding(step, *view, *headless)?;
				let attached = HostSession::attach(Arc::clone(&self.registry), binding);
				self.push(Event::Attached {
					session: session.clone(),
					handle: attached.handle().to_raw(),
				});
				self.order.push(session.clone());
				self.sessions.insert(session.clone(), attached);
			}
			Step::AttachActivity { session, activity } => {
				let activity = ActivityRef::from_raw(*activity).ok_or(ScenarioError::NullReference { step, what: "activity" })?;
				let view = ViewRef::from_raw(self.fresh_ref());
				self.session(step, session)?.attach_activity(ActivityBinding { activity, view });
			}
			Step::DetachActivity { session } => self.session(step, session)?.detach_activity(),
			Step::Detach { session } => {
				let attached = self.session(step, session)?;
				let handle = attached.handle().to_raw();
				let removed = attached.detach();
				self.push(Event::Detached {
					session: session.clone(),
					handle,
					removed,
				});
			}
			Step::Lookup { session, expect } => {
				let handle = self.session(step, session)?.handle().to_raw();
				self.resolve(step, format!("{session} ({handle})"), handle, *expect)?;
			}
			Step::Resolve { handle, expect } => self.resolve(step, handle.to_string(), *handle, *expect)?,
			Step::Query { session, method } => {
				let response = self.session(step, session)?.handle_method_call(&MethodCall::new(method.as_str()));
				self.push(Event::Answered {
					session: session.clone(),
					method: method.clone(),
					response,
				});
			}
			Step::Watch { observer } => {
				if self.observers.contains_key(observer) {
					return Err(ScenarioError::DuplicateObserver {
						step,
						name: observer.clone(),
					});
				}
				let log = Arc::clone(&self.log);
				let name = observer.clone();
				let watcher = FnObserver::shared(move |handle| {
					log.lock().push(Event::Destroyed {
						observer: name.clone(),
						handle: handle.to_raw(),
					});
				});
				let id = self.registry.watch_destroy(watcher.clone());
				self.observers.insert(observer.clone(), (id, watcher));
				self.push(Event::Watching { observer: observer.clone() });
			}
			Step::Unwatch { observer } => {
				let (id, watcher) = self.observers.remove(observer).ok_or_else(|| ScenarioError::UnknownObserver {
					step,
					name: observer.clone(),
				})?;
				self.registry.unwatch(id);
				watcher.dispose();
				self.push(Event::Unwatched { observer: observer.clone() });
			}
		}
		Ok(())
	}

	fn resolve(&self, step: usize, target: String, handle: i64, expect: Option<Expect>) -> Result<(), ScenarioError> {
		let outcome = match self.engine.get_binary_messenger(handle) {
			Ok(_) => Expect::Live,
			Err(EngineContextError::InvalidHandle { .. }) => Expect::Gone,
			Err(err) => return Err(err.into()),
		};
		match expect {
			Some(expected) if expected != outcome => {
				return Err(ScenarioError::Expectation {
					step,
					target,
					expected,
					actual: outcome,
				});
			}
			_ => {}
		}
		self.push(Event::Resolved { target, outcome });
		Ok(())
	}

	fn detach(&self, name: String, session: &HostSession) {
		let handle = session.handle().to_raw();
		if session.detach() {
			self.push(Event::Detached {
				session: name,
				handle,
				removed: true,
			});
		}
	}

	fn session(&self, step: usize, name: &str) -> Result<&HostSession, ScenarioError> {
		self.sessions.get(name).ok_or_else(|| ScenarioError::UnknownSession {
			step,
			name: name.to_string(),
		})
	}

	fn engine_binding(&mut self, step: usize, view: Option<usize>, headless: bool) -> Result<EngineBinding, ScenarioError> {
		let view = match (headless, view) {
			(true, _) => None,
			(false, Some(raw)) => Some(ViewRef::from_raw(raw).ok_or(ScenarioError::NullReference { step, what: "view" })?),
			(false, None) => ViewRef::from_raw(self.fresh_ref()),
		};
		let messenger = MessengerRef::from_raw(self.fresh_ref()).ok_or(ScenarioError::NullReference { step, what: "messenger" })?;
		let textures = TextureRegistryRef::from_raw(self.fresh_ref()).ok_or(ScenarioError::NullReference { step, what: "textures" })?;
		Ok(EngineBinding { view, messenger, textures })
	}

	fn fresh_ref(&mut self) -> usize {
		self.next_ref += 0x10;
		self.next_ref
	}

	fn push(&self, event: Event) {
		self.log.lock().push(event);
	}
}
