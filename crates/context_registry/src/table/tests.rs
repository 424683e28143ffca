use pretty_assertions::assert_eq;

use super::*;

fn raw(handle: ContextHandle) -> i64 {
	handle.to_raw()
}

#[test]
fn handles_are_never_reused() {
	let table = HandleTable::new();
	let a = table.register(Arc::new("A"));
	let b = table.register(Arc::new("B"));
	assert_eq!((raw(a), raw(b)), (1, 2));
	assert_eq!(table.lookup(a).as_deref(), Some(&"A"));
	assert_eq!(table.lookup(b).as_deref(), Some(&"B"));

	assert_eq!(table.remove(a).as_deref(), Some(&"A"));
	assert!(table.lookup(a).is_none());
	assert_eq!(table.lookup(b).as_deref(), Some(&"B"));

	let c = table.register(Arc::new("C"));
	assert_eq!(raw(c), 3);
	assert!(table.lookup(a).is_none());
}

#[test]
fn remove_absent_is_a_no_op() {
	let table = HandleTable::<u32>::new();
	let never_issued = ContextHandle::from_raw(999).expect("positive raw handle");
	assert!(table.remove(never_issued).is_none());

	let h = table.register(Arc::new(7));
	assert!(table.remove(h).is_some());
	assert!(table.remove(h).is_none());
	assert!(table.is_empty());
}

#[test]
fn raw_lookup_rejects_sentinel_and_negatives() {
	let table = HandleTable::new();
	let h = table.register(Arc::new(1u8));
	assert_eq!(table.lookup_raw(raw(h)).as_deref(), Some(&1));
	assert!(table.lookup_raw(0).is_none());
	assert!(table.lookup_raw(-1).is_none());
	assert!(table.lookup_raw(i64::MAX).is_none());
}

#[test]
fn shared_instance_identity_is_preserved() {
	let table = HandleTable::new();
	let instance = Arc::new(String::from("engine"));
	let h = table.register(Arc::clone(&instance));
	let found = table.lookup(h).expect("registered");
	assert!(Arc::ptr_eq(&found, &instance));
}

#[test]
fn handles_listed_in_allocation_order() {
	let table = HandleTable::new();
	let hs: Vec<_> = (0..5).map(|i| table.register(Arc::new(i))).collect();
	table.remove(hs[2]);
	assert_eq!(table.handles(), vec![hs[0], hs[1], hs[3], hs[4]]);
	assert_eq!(table.len(), 4);
	assert!(!table.contains(hs[2]));
}
