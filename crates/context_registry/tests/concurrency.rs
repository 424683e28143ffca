//! Cross-thread behaviour of the registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use hostctx_registry::{ContextHandle, ContextRegistry, FnObserver};
use parking_lot::Mutex;

const THREADS: usize = 8;

#[test]
fn concurrent_registers_yield_unique_increasing_handles() {
	let registry = Arc::new(ContextRegistry::new());
	let barrier = Arc::new(Barrier::new(THREADS));

	let workers: Vec<_> = (0..THREADS)
		.map(|t| {
			let registry = Arc::clone(&registry);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				barrier.wait();
				(0..200).map(|i| registry.register(Arc::new((t, i)))).collect::<Vec<_>>()
			})
		})
		.collect();

	let mut all = Vec::new();
	for worker in workers {
		let handles = worker.join().expect("worker panicked");
		assert!(handles.windows(2).all(|w| w[0] < w[1]), "per-thread handles must increase");
		all.extend(handles);
	}

	all.sort_unstable();
	all.dedup();
	assert_eq!(all.len(), THREADS * 200);
	assert_eq!(all.first().map(|h| h.get()), Some(1));
	assert_eq!(all.last().map(|h| h.get()), Some((THREADS * 200) as u64));
	for h in &all {
		assert!(registry.lookup(*h).is_some());
	}
}

#[test]
fn racing_unregisters_broadcast_exactly_once() {
	let registry = Arc::new(ContextRegistry::new());
	let counts: Arc<Mutex<HashMap<ContextHandle, usize>>> = Arc::default();
	let counts_cb = Arc::clone(&counts);
	registry.watch_destroy(FnObserver::shared(move |h| {
		*counts_cb.lock().entry(h).or_default() += 1;
	}));

	for _ in 0..50 {
		let h = registry.register(Arc::new(()));
		let barrier = Arc::new(Barrier::new(THREADS));
		let removed = Arc::new(AtomicUsize::new(0));
		let workers: Vec<_> = (0..THREADS)
			.map(|_| {
				let registry = Arc::clone(&registry);
				let barrier = Arc::clone(&barrier);
				let removed = Arc::clone(&removed);
				thread::spawn(move || {
					barrier.wait();
					if registry.unregister(h).was_removed() {
						removed.fetch_add(1, Ordering::SeqCst);
					}
				})
			})
			.collect();
		for worker in workers {
			worker.join().expect("worker panicked");
		}
		assert_eq!(removed.load(Ordering::SeqCst), 1);
		assert_eq!(counts.lock().get(&h), Some(&1));
	}
	assert!(registry.is_empty());
}

#[test]
fn lookup_after_unregister_returns_never_sees_the_handle() {
	let registry = Arc::new(ContextRegistry::new());
	let h = registry.register(Arc::new("ctx"));
	let unregistered = Arc::new(AtomicBool::new(false));
	let barrier = Arc::new(Barrier::new(THREADS + 1));

	let readers: Vec<_> = (0..THREADS)
		.map(|_| {
			let registry = Arc::clone(&registry);
			let unregistered = Arc::clone(&unregistered);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				barrier.wait();
				loop {
					let done = unregistered.load(Ordering::Acquire);
					let found = registry.lookup(h).is_some();
					if done {
						assert!(!found, "handle visible after unregister returned");
						break;
					}
				}
			})
		})
		.collect();

	barrier.wait();
	registry.unregister(h);
	unregistered.store(true, Ordering::Release);

	for reader in readers {
		reader.join().expect("reader panicked");
	}
}

#[test]
fn observers_present_at_start_see_every_teardown() {
	let registry = Arc::new(ContextRegistry::new());
	let stable_hits = Arc::new(AtomicUsize::new(0));
	let hits = Arc::clone(&stable_hits);
	registry.watch_destroy(FnObserver::shared(move |_| {
		hits.fetch_add(1, Ordering::SeqCst);
	}));

	let handles: Vec<_> = (0..100).map(|i| registry.register(Arc::new(i))).collect();
	let barrier = Arc::new(Barrier::new(2));

	let churn = {
		let registry = Arc::clone(&registry);
		let barrier = Arc::clone(&barrier);
		thread::spawn(move || {
			barrier.wait();
			for _ in 0..100 {
				let id = registry.watch_destroy(FnObserver::shared(|_| {}));
				registry.unwatch(id);
			}
		})
	};

	barrier.wait();
	for h in &handles {
		registry.unregister(*h);
	}
	churn.join().expect("churn panicked");

	assert_eq!(stable_hits.load(Ordering::SeqCst), handles.len());
	assert_eq!(registry.observer_count(), 1);
}
