/// Process-wide unique identifiers
///
/// Each identifier type draws from its own atomic counter starting at 1, so
/// ids are never reused for the lifetime of the process and `0` never appears.

use std::fmt;

macro_rules! unique_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn next() -> Self {
                static NEXT: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(1);
                Self(NEXT.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
            }

            /// Raw value of the id
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

unique_id!(
    /// Identity of a [`Context`](crate::recording::Context)
    ContextId
);
unique_id!(
    /// Identity of a [`Recorder`](crate::recording::Recorder)
    RecorderId
);
unique_id!(
    /// Identity of a snapped [`Recording`](crate::recording::Recording)
    RecordingId
);
unique_id!(
    /// Identity of an [`Image`](crate::image::Image)
    ImageId
);
unique_id!(
    /// Stable identity of a promise image registration
    RegistrationId
);
unique_id!(
    /// Identity of a [`DescriptorPool`](crate::descriptor::DescriptorPool)
    PoolId
);
