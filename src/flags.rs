//! Load/store policy flags.
//!
//! The policy is a type, not a value: `Aligned | Streaming` evaluates at
//! compile time to [`StreamingAligned`], and the load/store entry points
//! monomorphize on it. No flag survives to runtime.
//!
//! Sanctioned combinations:
//!
//! * [`Aligned`] — pointer is vector-aligned (the default).
//! * [`Unaligned`] — no alignment assumption.
//! * `Aligned | Streaming` — non-temporal, bypassing the cache.
//! * `Unaligned | Streaming` — non-temporal without the alignment promise;
//!   degrades to ordinary unaligned access where the ISA has no such form.

mod sealed {
    pub trait Sealed {}
}

/// A load/store policy. Sealed; the four types in this module are the
/// complete set.
pub trait LoadStoreFlag: sealed::Sealed + Copy + Default + 'static {
    /// Whether the pointer is promised to be vector-aligned.
    const IS_ALIGNED: bool;
    /// Whether the access should bypass the cache hierarchy. A hint only;
    /// never a correctness change.
    const IS_STREAMING: bool;
}

macro_rules! flag {
    ($(#[$doc:meta])* $name:ident, aligned = $aligned:expr, streaming = $streaming:expr) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl sealed::Sealed for $name {}

        impl LoadStoreFlag for $name {
            const IS_ALIGNED: bool = $aligned;
            const IS_STREAMING: bool = $streaming;
        }
    };
}

flag!(
    /// The pointer is aligned to the vector width.
    Aligned, aligned = true, streaming = false
);
flag!(
    /// No alignment assumption.
    Unaligned, aligned = false, streaming = false
);
flag!(
    /// Aligned and non-temporal. Spelled `Aligned | Streaming`.
    StreamingAligned, aligned = true, streaming = true
);
flag!(
    /// Unaligned and non-temporal. Spelled `Unaligned | Streaming`.
    StreamingUnaligned, aligned = false, streaming = true
);

/// The streaming modifier; combine with [`Aligned`] or [`Unaligned`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Streaming;

impl core::ops::BitOr<Streaming> for Aligned {
    type Output = StreamingAligned;
    #[inline(always)]
    fn bitor(self, _: Streaming) -> StreamingAligned {
        StreamingAligned
    }
}

impl core::ops::BitOr<Aligned> for Streaming {
    type Output = StreamingAligned;
    #[inline(always)]
    fn bitor(self, _: Aligned) -> StreamingAligned {
        StreamingAligned
    }
}

impl core::ops::BitOr<Streaming> for Unaligned {
    type Output = StreamingUnaligned;
    #[inline(always)]
    fn bitor(self, _: Streaming) -> StreamingUnaligned {
        StreamingUnaligned
    }
}

impl core::ops::BitOr<Unaligned> for Streaming {
    type Output = StreamingUnaligned;
    #[inline(always)]
    fn bitor(self, _: Unaligned) -> StreamingUnaligned {
        StreamingUnaligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy<F: LoadStoreFlag>(_: F) -> (bool, bool) {
        (F::IS_ALIGNED, F::IS_STREAMING)
    }

    #[test]
    fn flag_algebra_produces_the_four_policies() {
        assert_eq!(policy(Aligned), (true, false));
        assert_eq!(policy(Unaligned), (false, false));
        assert_eq!(policy(Aligned | Streaming), (true, true));
        assert_eq!(policy(Streaming | Unaligned), (false, true));
    }
}
