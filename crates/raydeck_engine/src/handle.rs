//! Typed resource handles.
//!
//! The engine hands out raw 64-bit ids where zero means "invalid". Each
//! resource kind gets its own newtype over `NonZeroU64`, so a model handle
//! cannot be passed where a scene is expected and the zero sentinel never
//! survives past `from_raw`.

use std::fmt;
use std::num::NonZeroU64;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Wrap a raw engine id. Returns `None` for the zero sentinel.
            #[inline]
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// Raw engine id (never zero).
            #[inline]
            pub fn raw(self) -> u64 {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{:#x}"), self.0.get())
            }
        }
    };
}

define_handle!(
    /// A loaded model.
    ModelHandle,
    "Model"
);
define_handle!(
    /// A scene under construction or finalized for rendering.
    SceneHandle,
    "Scene"
);
define_handle!(
    /// A camera.
    CameraHandle,
    "Camera"
);
define_handle!(
    /// An RGB float image.
    ImageHandle,
    "Image"
);
