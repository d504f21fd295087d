//! Backend abstraction: one operation table per (backend, element) pair.
//!
//! A [`Backend`] names a register family and, through its generic associated
//! types, the concrete register wrapper used for each lane element. The
//! operation tables ([`LaneOps`] and its category extensions) are implemented
//! directly on those wrappers; `Vector` and `Mask` forward to them under
//! `where` bounds, so an operation that a category does not define simply
//! does not exist for that element type.
//!
//! Exactly one backend is [`Active`] per build, selected from the cfgs the
//! build script emits. The scalar backend always compiles and is the
//! reference semantics for the others.

use crate::element::LaneElement;

pub mod scalar;

#[cfg(lanewise_sse2)]
pub mod sse;

#[cfg(lanewise_avx2)]
pub mod avx2;

pub use scalar::Scalar;

#[cfg(lanewise_sse2)]
pub use sse::Sse;

#[cfg(lanewise_avx2)]
pub use avx2::Avx2;

/// The backend the build resolved to. `Vector<T>` without an explicit
/// backend parameter uses this one.
#[cfg(lanewise_avx2)]
pub type Active = Avx2;

/// The backend the build resolved to. `Vector<T>` without an explicit
/// backend parameter uses this one.
#[cfg(all(lanewise_sse2, not(lanewise_avx2)))]
pub type Active = Sse;

/// The backend the build resolved to. `Vector<T>` without an explicit
/// backend parameter uses this one.
#[cfg(not(lanewise_sse2))]
pub type Active = Scalar;

/// Upper bound on the lane count of any backend/element pair; sizes the
/// stack buffers of generic per-lane paths.
pub const MAX_LANES: usize = 16;

/// A register family. Implementations are zero-sized type-level names.
pub trait Backend: Copy + Clone + core::fmt::Debug + PartialEq + 'static {
    /// Register width in bytes.
    const WIDTH_BYTES: usize;
    /// Short lowercase name, for diagnostics.
    const NAME: &'static str;

    /// Register wrapper holding the lanes of a `T` vector.
    type Repr<T: LaneElement>: Copy + Send + Sync + 'static;
    /// Register wrapper holding the per-lane truth values of a `T` mask.
    type MaskRepr<T: LaneElement>: Copy + Send + Sync + 'static;
}

// ============================================================================
// Operation tables
// ============================================================================

/// Operations every (backend, element) pair provides.
///
/// Integer arithmetic wraps; float arithmetic is IEEE. The `unsafe` load and
/// store functions require `LANES` readable (or writable) elements at `ptr`,
/// and the aligned variants additionally require the backend's register
/// alignment; violations are undefined behavior.
pub trait LaneOps<T: LaneElement>: Copy + Send + Sync + 'static {
    /// The mask produced by comparisons and consumed by [`blend`](Self::blend).
    type Mask: MaskOps;

    /// Number of lanes.
    const LANES: usize;

    fn splat(v: T) -> Self;
    fn zero() -> Self;

    /// # Safety
    /// `ptr` must point to `LANES` readable elements, aligned to the
    /// register width.
    unsafe fn load_aligned(ptr: *const T) -> Self;
    /// # Safety
    /// `ptr` must point to `LANES` readable elements.
    unsafe fn load_unaligned(ptr: *const T) -> Self;
    /// Non-temporal aligned load where the ISA has one, otherwise an
    /// ordinary aligned load.
    ///
    /// # Safety
    /// As [`load_aligned`](Self::load_aligned).
    unsafe fn load_streaming(ptr: *const T) -> Self;
    /// # Safety
    /// `ptr` must point to `LANES` writable elements, aligned to the
    /// register width.
    unsafe fn store_aligned(self, ptr: *mut T);
    /// # Safety
    /// `ptr` must point to `LANES` writable elements.
    unsafe fn store_unaligned(self, ptr: *mut T);
    /// Non-temporal aligned store.
    ///
    /// # Safety
    /// As [`store_aligned`](Self::store_aligned).
    unsafe fn store_streaming(self, ptr: *mut T);

    /// Reads one lane. `lane` must be below `LANES`.
    fn extract(self, lane: usize) -> T;
    /// Returns `self` with one lane replaced. `lane` must be below `LANES`.
    fn insert(self, lane: usize, v: T) -> Self;

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    /// Lane division. Synthesized lane-by-lane for integer elements; integer
    /// division by zero panics.
    fn div(self, rhs: Self) -> Self;
    fn min(self, rhs: Self) -> Self;
    fn max(self, rhs: Self) -> Self;

    fn cmp_eq(self, rhs: Self) -> Self::Mask;
    fn cmp_ne(self, rhs: Self) -> Self::Mask;
    fn cmp_lt(self, rhs: Self) -> Self::Mask;
    fn cmp_le(self, rhs: Self) -> Self::Mask;
    fn cmp_gt(self, rhs: Self) -> Self::Mask;
    fn cmp_ge(self, rhs: Self) -> Self::Mask;

    /// Lane-wise select: `if_true` where the mask is set, `if_false`
    /// elsewhere.
    fn blend(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;

    /// `self * mul + add`. A single rounding when the build carries the FMA
    /// extension; multiply-then-add otherwise.
    fn fused_multiply_add(self, mul: Self, add: Self) -> Self;
}

/// Operations that exist only for integral elements. Using one of these on a
/// float vector is a type error.
pub trait IntLaneOps<T: LaneElement>: LaneOps<T> {
    fn and(self, rhs: Self) -> Self;
    fn or(self, rhs: Self) -> Self;
    fn xor(self, rhs: Self) -> Self;
    fn not(self) -> Self;
    /// Shifts every lane left by the same count; counts at or beyond the
    /// lane width drain to zero.
    fn shl_imm(self, count: u32) -> Self;
    /// Shifts every lane right by the same count; logical for unsigned
    /// elements, arithmetic for signed.
    fn shr_imm(self, count: u32) -> Self;
    /// Per-lane shift counts taken from `counts`.
    fn shl_lanes(self, counts: Self) -> Self;
    /// Per-lane shift counts taken from `counts`.
    fn shr_lanes(self, counts: Self) -> Self;
    /// Lane remainder; division by zero panics.
    fn rem(self, rhs: Self) -> Self;
}

/// Operations that exist only for floating-point elements.
pub trait FloatLaneOps<T: LaneElement>: LaneOps<T> {
    fn sqrt(self) -> Self;
    /// `1 / x`; may use the ISA's approximate reciprocal for `f32`.
    fn reciprocal(self) -> Self;
    /// `1 / sqrt(x)`; may use the ISA's approximation for `f32`.
    fn rsqrt(self) -> Self;
    /// Rounds to nearest, ties to even.
    fn round(self) -> Self;
    fn floor(self) -> Self;
    fn ceil(self) -> Self;
    fn trunc(self) -> Self;
    fn is_nan(self) -> Self::Mask;
    fn is_finite(self) -> Self::Mask;
    /// Magnitude of `self`, sign of `sign`.
    fn copy_sign(self, sign: Self) -> Self;
}

/// Operations that exist only for signed (integral or float) elements.
pub trait SignedLaneOps<T: LaneElement>: LaneOps<T> {
    fn neg(self) -> Self;
    /// Wrapping for integers, sign-bit clear for floats.
    fn abs(self) -> Self;
    /// Per-lane sign-bit test.
    fn is_negative(self) -> Self::Mask;
}

/// The explicit cast table between reprs of the same backend.
///
/// Rules: float to int truncates toward zero (out-of-range lanes are
/// backend-defined); int to float rounds to nearest; same-width
/// signed/unsigned converts modulo 2^n; when the lane counts differ, the low
/// `min(src, dst)` lanes convert and the remaining destination lanes are
/// zero.
pub trait ConvertFrom<Src>: Sized {
    fn convert_from(src: Src) -> Self;
}

/// Per-lane truth values.
///
/// `to_bits` is the canonical observable: bit `n` is lane `n`. The default
/// methods derive everything countable from it.
pub trait MaskOps: Copy + Send + Sync + 'static {
    /// Number of lanes.
    const LANES: usize;

    /// All lanes set to `v`.
    fn splat(v: bool) -> Self;
    /// One bit per lane, lane 0 in bit 0; bits at and above `LANES` are zero.
    fn to_bits(self) -> u64;

    fn and(self, rhs: Self) -> Self;
    fn or(self, rhs: Self) -> Self;
    fn xor(self, rhs: Self) -> Self;
    fn not(self) -> Self;

    /// Truth value of one lane. `lane` must be below `LANES`.
    #[inline(always)]
    fn test(self, lane: usize) -> bool {
        debug_assert!(lane < Self::LANES);
        self.to_bits() >> lane & 1 != 0
    }

    /// Number of set lanes.
    #[inline(always)]
    fn count(self) -> usize {
        self.to_bits().count_ones() as usize
    }

    #[inline(always)]
    fn any(self) -> bool {
        self.to_bits() != 0
    }

    #[inline(always)]
    fn all(self) -> bool {
        self.to_bits() == (u64::MAX >> (64 - Self::LANES))
    }
}
