use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::host::{ActivityBinding, EngineBinding, HostSession};

fn engine() -> EngineBinding {
	EngineBinding {
		view: ViewRef::from_raw(0x10),
		messenger: MessengerRef::from_raw(0x20).expect("non-null"),
		textures: TextureRegistryRef::from_raw(0x30).expect("non-null"),
	}
}

fn setup() -> (Arc<HostRegistry>, EngineContext) {
	let registry = Arc::new(HostRegistry::new());
	let context = EngineContext::new(Arc::clone(&registry), &EngineContextConfig::default());
	(registry, context)
}

#[test]
fn resolves_resources_of_live_engines() {
	let (registry, context) = setup();
	let session = HostSession::attach(registry, engine());
	let raw = session.handle().to_raw();

	assert_eq!(context.get_flutter_view(raw), Ok(ViewRef::from_raw(0x10).expect("non-null")));
	assert_eq!(context.get_binary_messenger(raw), Ok(MessengerRef::from_raw(0x20).expect("non-null")));
	assert_eq!(context.get_texture_registry(raw), Ok(TextureRegistryRef::from_raw(0x30).expect("non-null")));
	assert_eq!(
		context.get_activity(raw),
		Err(EngineContextError::ResourceUnavailable { resource: "activity", handle: raw })
	);

	session.attach_activity(ActivityBinding {
		activity: ActivityRef::from_raw(0x40).expect("non-null"),
		view: None,
	});
	assert_eq!(context.get_activity(raw), Ok(ActivityRef::from_raw(0x40).expect("non-null")));
}

#[test]
fn unknown_and_destroyed_handles_are_invalid() {
	let (registry, context) = setup();
	let session = HostSession::attach(registry, engine());
	let raw = session.handle().to_raw();
	session.detach();

	assert_eq!(context.get_binary_messenger(raw), Err(EngineContextError::InvalidHandle { handle: raw }));
	assert_eq!(context.get_flutter_view(0), Err(EngineContextError::InvalidHandle { handle: 0 }));
	assert_eq!(context.get_texture_registry(-5), Err(EngineContextError::InvalidHandle { handle: -5 }));
	assert_eq!(context.get_activity(999), Err(EngineContextError::InvalidHandle { handle: 999 }));
}

#[test]
fn destroy_notifications_reach_subscribers_with_raw_handle() {
	let (registry, context) = setup();
	let seen = Arc::new(Mutex::new(Vec::new()));
	let seen_cb = Arc::clone(&seen);
	context
		.register_destroy_notification(move |handle| seen_cb.lock().push(handle))
		.expect("any thread allowed");

	let first = HostSession::attach(Arc::clone(&registry), engine());
	let second = HostSession::attach(registry, engine());
	second.detach();
	first.detach();
	first.detach();

	assert_eq!(*seen.lock(), vec![2, 1]);
}

#[test]
fn unsubscribed_callbacks_stop_firing() {
	let (registry, context) = setup();
	let hits = Arc::new(AtomicUsize::new(0));
	let hits_cb = Arc::clone(&hits);
	let token = context
		.register_destroy_notification(move |_| {
			hits_cb.fetch_add(1, Ordering::SeqCst);
		})
		.expect("subscribe");

	HostSession::attach(Arc::clone(&registry), engine()).detach();
	assert_eq!(context.unregister_destroy_notification(token), Ok(true));
	assert_eq!(context.unregister_destroy_notification(token), Ok(false));
	HostSession::attach(registry, engine()).detach();

	assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_the_context_removes_its_observer() {
	let (registry, context) = setup();
	let hits = Arc::new(AtomicUsize::new(0));
	let hits_cb = Arc::clone(&hits);
	context
		.register_destroy_notification(move |_| {
			hits_cb.fetch_add(1, Ordering::SeqCst);
		})
		.expect("subscribe");
	assert_eq!(registry.observer_count(), 1);

	drop(context);
	assert_eq!(registry.observer_count(), 0);
	HostSession::attach(registry, engine()).detach();
	assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn creating_thread_affinity_rejects_other_threads() {
	let registry = Arc::new(HostRegistry::new());
	let config = EngineContextConfig {
		thread_affinity: ThreadAffinity::CreatingThread,
	};
	let context = EngineContext::new(Arc::clone(&registry), &config);
	let session = HostSession::attach(registry, engine());
	let raw = session.handle().to_raw();

	assert!(context.get_binary_messenger(raw).is_ok());
	thread::scope(|scope| {
		let other = scope.spawn(|| {
			(
				context.get_binary_messenger(raw),
				context.register_destroy_notification(|_| {}).map(|_| ()),
			)
		});
		let (lookup, subscribe) = other.join().expect("thread panicked");
		assert_eq!(lookup, Err(EngineContextError::InvalidThread));
		assert_eq!(subscribe, Err(EngineContextError::InvalidThread));
	});
}

#[test]
fn from_installed_requires_an_installed_registry() {
	let config = EngineContextConfig::default();
	if installed_registry().is_none() {
		assert_eq!(
			EngineContext::from_installed(&config).map(|_| ()),
			Err(EngineContextError::PluginNotLoaded)
		);
	}

	let registry = Arc::new(HostRegistry::new());
	install_registry(Arc::clone(&registry));
	assert!(!install_registry(Arc::new(HostRegistry::new())));

	let installed = installed_registry().expect("installed");
	assert!(Arc::ptr_eq(&installed, &registry));
	let context = EngineContext::from_installed(&config).expect("installed registry");
	assert!(Arc::ptr_eq(context.registry(), &registry));
}

#[test]
fn config_parses_thread_affinity() {
	let config: EngineContextConfig = toml::from_str("thread_affinity = \"creating_thread\"").expect("valid config");
	assert_eq!(config.thread_affinity, ThreadAffinity::CreatingThread);
	assert_eq!(toml::from_str::<EngineContextConfig>("").expect("empty config"), EngineContextConfig::default());
}
