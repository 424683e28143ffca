//! Opaque references to host-owned objects.
//!
//! The registry never looks inside these; they are the platform pointers or
//! global references the host hands over at attach time.

use std::fmt;
use std::num::NonZeroUsize;

macro_rules! opaque_ref {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Copy, PartialEq, Eq, Hash)]
		pub struct $name(NonZeroUsize);

		impl $name {
			/// Wraps a raw platform reference. Null yields `None`.
			pub const fn from_raw(raw: usize) -> Option<Self> {
				match NonZeroUsize::new(raw) {
					Some(raw) => Some(Self(raw)),
					None => None,
				}
			}

			/// Returns the raw platform reference.
			pub const fn as_raw(self) -> usize {
				self.0.get()
			}
		}

		impl fmt::Debug for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, concat!(stringify!($name), "({:#x})"), self.0.get())
			}
		}
	};
}

opaque_ref! {
	/// Native view (window handle or platform view object).
	ViewRef
}

opaque_ref! {
	/// Binary message transport of an engine.
	MessengerRef
}

opaque_ref! {
	/// Texture / surface registry of an engine.
	TextureRegistryRef
}

opaque_ref! {
	/// Activity hosting an engine, where the platform has one.
	ActivityRef
}
