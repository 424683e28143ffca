//! Opaque handles that cross the native/managed boundary.
//!
//! A [`ContextHandle`] names one attached host context. Values are handed out
//! by a [`HandleAllocator`] starting at 1 and are never reissued, so a stale
//! handle held by an asynchronous consumer resolves to nothing instead of to an
//! unrelated context that happened to receive the same number.
//!
//! [`ObserverId`] plays the same role for destroy observers registered with a
//! context registry.

#![warn(missing_docs)]

mod counter;
mod handle;
mod observer;

pub use handle::{ContextHandle, HandleAllocator, INVALID_RAW_HANDLE, InvalidHandleValue};
pub use observer::{ObserverId, ObserverIdAllocator};
