//! Handle-indexed registry of host contexts with destroy-notification broadcast.
//!
//! Native code never holds a live reference into the managed host. It holds a
//! [`ContextHandle`] and resolves it through a [`ContextRegistry`] whenever it
//! needs the context. When the host tears a context down, the registry removes
//! the handle and then tells every registered [`DestroyObserver`] about it, so
//! native state keyed by that handle can be released.
//!
//! * [`HandleTable`]: handle allocation and instance lookup.
//! * [`NotifierSet`]: observer collection and the snapshot-based broadcast.
//! * [`ContextRegistry`]: the two combined into the teardown protocol.
//!
//! # Concurrency
//!
//! The table sits behind one `RwLock`; allocation happens under its write lock
//! so handle order and insertion order agree. The observer list is
//! copy-on-write: writers serialize on a mutex and publish a fresh list, and a
//! broadcast loads the published list once and iterates that snapshot with no
//! lock held. Observers may therefore register or unregister contexts and
//! add or remove observers from inside [`DestroyObserver::notify`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod notifier;
pub mod observer;
pub mod registry;
pub mod table;

pub use config::{ObserverPanicPolicy, RegistryConfig};
pub use error::{RegistryError, Result};
pub use hostctx_handle::{ContextHandle, INVALID_RAW_HANDLE, ObserverId};
pub use notifier::{BroadcastReport, NotifierSet, ObserverEntry, ObserverSnapshot};
pub use observer::{DestroyObserver, FnObserver};
pub use registry::{ContextRegistry, Unregistered};
pub use table::HandleTable;
