//! Resolved instruction-set capabilities.
//!
//! `build.rs` reduces the ambient target configuration (or the
//! `LANEWISE_IMPL` override) to a set of `lanewise_*` cfgs; this module turns
//! those cfgs back into ordinary constants the rest of the crate — and user
//! code — can consult. Exactly one [`Implementation`] tier is active per
//! build, plus an orthogonal [`ExtraInstructions`] set.

use bitflags::bitflags;

/// Identifies a SIMD instruction-set tier.
///
/// On x86 every tier from [`Sse2`](Implementation::Sse2) upward includes all
/// lower SSE tiers; [`Mic`](Implementation::Mic) is disjoint from the x86
/// ladder. The active tier for this build is [`CURRENT`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Implementation {
    /// Fundamental types only, one lane per vector.
    Scalar,
    /// x86 SSE + SSE2 (16-byte registers).
    Sse2,
    /// SSE2 + SSE3.
    Sse3,
    /// SSE3 + SSSE3.
    Ssse3,
    /// SSSE3 + SSE4.1.
    Sse41,
    /// SSE4.1 + SSE4.2.
    Sse42,
    /// x86 AVX (32-byte float registers, VEX encoding).
    Avx,
    /// AVX + AVX2 (32-byte integer registers).
    Avx2,
    /// Intel Xeon Phi. Kept for completeness of the tier set; no Rust
    /// toolchain targets it, so it is never resolved as the active tier.
    Mic,
}

impl Implementation {
    /// Tier name as spelled in the `LANEWISE_IMPL` override.
    pub const fn name(self) -> &'static str {
        match self {
            Implementation::Scalar => "scalar",
            Implementation::Sse2 => "sse2",
            Implementation::Sse3 => "sse3",
            Implementation::Ssse3 => "ssse3",
            Implementation::Sse41 => "sse4.1",
            Implementation::Sse42 => "sse4.2",
            Implementation::Avx => "avx",
            Implementation::Avx2 => "avx2",
            Implementation::Mic => "mic",
        }
    }

    /// Whether code compiled for `self` may use instructions of `other`.
    ///
    /// The x86 ladder is a chain of strict supersets; `Mic` implies only
    /// itself (and scalar), as does `Scalar`.
    pub const fn implies(self, other: Implementation) -> bool {
        match (self, other) {
            (_, Implementation::Scalar) => true,
            (Implementation::Mic, Implementation::Mic) => true,
            (Implementation::Mic, _) | (_, Implementation::Mic) => false,
            (a, b) => a as u8 >= b as u8,
        }
    }

    /// The tiers that must be available for `self` to operate, lowest first.
    pub const fn required(self) -> &'static [Implementation] {
        use Implementation::*;
        match self {
            Scalar => &[],
            Sse2 => &[Sse2],
            Sse3 => &[Sse2, Sse3],
            Ssse3 => &[Sse2, Sse3, Ssse3],
            Sse41 => &[Sse2, Sse3, Ssse3, Sse41],
            Sse42 => &[Sse2, Sse3, Ssse3, Sse41, Sse42],
            Avx => &[Sse2, Sse3, Ssse3, Sse41, Sse42, Avx],
            Avx2 => &[Sse2, Sse3, Ssse3, Sse41, Sse42, Avx, Avx2],
            Mic => &[Mic],
        }
    }
}

bitflags! {
    /// Instruction-set extensions orthogonal to the [`Implementation`] tier.
    ///
    /// Any subset may be present together with a given tier.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ExtraInstructions: u32 {
        /// Fused multiply-add, three-operand form.
        const FMA = 1 << 0;
        /// Fused multiply-add, four-operand form.
        const FMA4 = 1 << 1;
        /// AMD XOP instructions.
        const XOP = 1 << 2;
        /// Hardware float16 conversions.
        const F16C = 1 << 3;
        /// The population-count instruction.
        const POPCNT = 1 << 4;
        /// AMD SSE4a instructions.
        const SSE4A = 1 << 5;
    }
}

/// The single instruction-set tier this build targets.
#[cfg(lanewise_avx2)]
pub const CURRENT: Implementation = Implementation::Avx2;
/// The single instruction-set tier this build targets.
#[cfg(all(lanewise_avx, not(lanewise_avx2)))]
pub const CURRENT: Implementation = Implementation::Avx;
/// The single instruction-set tier this build targets.
#[cfg(all(lanewise_sse42, not(lanewise_avx)))]
pub const CURRENT: Implementation = Implementation::Sse42;
/// The single instruction-set tier this build targets.
#[cfg(all(lanewise_sse41, not(lanewise_sse42)))]
pub const CURRENT: Implementation = Implementation::Sse41;
/// The single instruction-set tier this build targets.
#[cfg(all(lanewise_ssse3, not(lanewise_sse41)))]
pub const CURRENT: Implementation = Implementation::Ssse3;
/// The single instruction-set tier this build targets.
#[cfg(all(lanewise_sse3, not(lanewise_ssse3)))]
pub const CURRENT: Implementation = Implementation::Sse3;
/// The single instruction-set tier this build targets.
#[cfg(all(lanewise_sse2, not(lanewise_sse3)))]
pub const CURRENT: Implementation = Implementation::Sse2;
/// The single instruction-set tier this build targets.
#[cfg(not(lanewise_sse2))]
pub const CURRENT: Implementation = Implementation::Scalar;

/// The extra-instruction extensions available to this build.
pub const EXTRA: ExtraInstructions = ExtraInstructions::from_bits_truncate(
    (cfg!(lanewise_fma) as u32) * ExtraInstructions::FMA.bits()
        | (cfg!(lanewise_fma4) as u32) * ExtraInstructions::FMA4.bits()
        | (cfg!(lanewise_xop) as u32) * ExtraInstructions::XOP.bits()
        | (cfg!(lanewise_f16c) as u32) * ExtraInstructions::F16C.bits()
        | (cfg!(lanewise_popcnt) as u32) * ExtraInstructions::POPCNT.bits()
        | (cfg!(lanewise_sse4a) as u32) * ExtraInstructions::SSE4A.bits(),
);

/// True when the compiler emits all vector instructions in VEX form.
///
/// Recorded independently of [`CURRENT`]: a build may keep 16-byte logical
/// registers while still encoding every operation with the AVX prefix.
pub const VEX_ENCODING: bool = cfg!(lanewise_vex);

/// Reports the resolved capabilities through the `log` facade.
///
/// Intended for one-shot use at startup or in tests; lane operations
/// themselves never log.
pub fn log_selected() {
    log::debug!(
        "lanewise: implementation {} ({} byte registers), extra {:?}, vex {}",
        CURRENT.name(),
        crate::backend::Active::WIDTH_BYTES,
        EXTRA,
        VEX_ENCODING,
    );
}

use crate::backend::Backend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_ordered() {
        assert!(Implementation::Avx2.implies(Implementation::Sse2));
        assert!(Implementation::Sse42.implies(Implementation::Sse41));
        assert!(!Implementation::Sse2.implies(Implementation::Sse3));
        assert!(!Implementation::Mic.implies(Implementation::Sse2));
        assert!(!Implementation::Avx2.implies(Implementation::Mic));
        assert!(Implementation::Mic.implies(Implementation::Scalar));
    }

    #[test]
    fn requirements_include_self() {
        for impl_ in [
            Implementation::Sse2,
            Implementation::Sse42,
            Implementation::Avx2,
        ] {
            assert_eq!(*impl_.required().last().unwrap(), impl_);
        }
        assert!(Implementation::Scalar.required().is_empty());
    }

    #[test]
    fn current_is_consistent() {
        for dep in CURRENT.required() {
            assert!(CURRENT.implies(*dep));
        }
    }
}
