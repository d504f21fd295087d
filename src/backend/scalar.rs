//! One-lane reference backend.
//!
//! Always compiled, on every architecture. Each operation delegates to the
//! element's scalar semantics, which makes this backend the executable
//! definition the register backends are tested against.

use super::{Backend, ConvertFrom, FloatLaneOps, IntLaneOps, LaneOps, MaskOps, SignedLaneOps};
use crate::element::{FloatElement, IntegerElement, LaneElement, SignedElement};

/// The scalar register family: one element per "register".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scalar;

impl Backend for Scalar {
    // Diagnostics only: the widest single lane.
    const WIDTH_BYTES: usize = 8;
    const NAME: &'static str = "scalar";

    type Repr<T: LaneElement> = ScalarVec<T>;
    type MaskRepr<T: LaneElement> = bool;
}

/// A single lane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(transparent)]
pub struct ScalarVec<T>(pub(crate) T);

impl MaskOps for bool {
    const LANES: usize = 1;

    #[inline(always)]
    fn splat(v: bool) -> bool {
        v
    }
    #[inline(always)]
    fn to_bits(self) -> u64 {
        self as u64
    }
    #[inline(always)]
    fn and(self, rhs: bool) -> bool {
        self & rhs
    }
    #[inline(always)]
    fn or(self, rhs: bool) -> bool {
        self | rhs
    }
    #[inline(always)]
    fn xor(self, rhs: bool) -> bool {
        self ^ rhs
    }
    #[inline(always)]
    fn not(self) -> bool {
        !self
    }
}

impl<T: LaneElement> LaneOps<T> for ScalarVec<T> {
    type Mask = bool;

    const LANES: usize = 1;

    #[inline(always)]
    fn splat(v: T) -> Self {
        ScalarVec(v)
    }
    #[inline(always)]
    fn zero() -> Self {
        ScalarVec(T::ZERO)
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const T) -> Self {
        ScalarVec(unsafe { ptr.read() })
    }
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const T) -> Self {
        ScalarVec(unsafe { ptr.read_unaligned() })
    }
    #[inline(always)]
    unsafe fn load_streaming(ptr: *const T) -> Self {
        ScalarVec(unsafe { ptr.read() })
    }
    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut T) {
        unsafe { ptr.write(self.0) }
    }
    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut T) {
        unsafe { ptr.write_unaligned(self.0) }
    }
    #[inline(always)]
    unsafe fn store_streaming(self, ptr: *mut T) {
        unsafe { ptr.write(self.0) }
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> T {
        debug_assert_eq!(lane, 0);
        self.0
    }
    #[inline(always)]
    fn insert(self, lane: usize, v: T) -> Self {
        debug_assert_eq!(lane, 0);
        ScalarVec(v)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_add(rhs.0))
    }
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_sub(rhs.0))
    }
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_mul(rhs.0))
    }
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_div(rhs.0))
    }
    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_min(rhs.0))
    }
    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_max(rhs.0))
    }

    #[inline(always)]
    fn cmp_eq(self, rhs: Self) -> bool {
        self.0 == rhs.0
    }
    #[inline(always)]
    fn cmp_ne(self, rhs: Self) -> bool {
        self.0 != rhs.0
    }
    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> bool {
        self.0 < rhs.0
    }
    #[inline(always)]
    fn cmp_le(self, rhs: Self) -> bool {
        self.0 <= rhs.0
    }
    #[inline(always)]
    fn cmp_gt(self, rhs: Self) -> bool {
        self.0 > rhs.0
    }
    #[inline(always)]
    fn cmp_ge(self, rhs: Self) -> bool {
        self.0 >= rhs.0
    }

    #[inline(always)]
    fn blend(mask: bool, if_true: Self, if_false: Self) -> Self {
        if mask {
            if_true
        } else {
            if_false
        }
    }

    #[inline(always)]
    fn fused_multiply_add(self, mul: Self, add: Self) -> Self {
        ScalarVec(self.0.lane_mul(mul.0).lane_add(add.0))
    }
}

impl<T: IntegerElement> IntLaneOps<T> for ScalarVec<T> {
    #[inline(always)]
    fn and(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_and(rhs.0))
    }
    #[inline(always)]
    fn or(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_or(rhs.0))
    }
    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_xor(rhs.0))
    }
    #[inline(always)]
    fn not(self) -> Self {
        ScalarVec(self.0.lane_not())
    }
    #[inline(always)]
    fn shl_imm(self, count: u32) -> Self {
        ScalarVec(self.0.lane_shl(count))
    }
    #[inline(always)]
    fn shr_imm(self, count: u32) -> Self {
        ScalarVec(self.0.lane_shr(count))
    }
    #[inline(always)]
    fn shl_lanes(self, counts: Self) -> Self {
        ScalarVec(self.0.lane_shl(counts.0.to_lane_index() as u32))
    }
    #[inline(always)]
    fn shr_lanes(self, counts: Self) -> Self {
        ScalarVec(self.0.lane_shr(counts.0.to_lane_index() as u32))
    }
    #[inline(always)]
    fn rem(self, rhs: Self) -> Self {
        ScalarVec(self.0.lane_rem(rhs.0))
    }
}

impl<T: FloatElement> FloatLaneOps<T> for ScalarVec<T> {
    #[inline(always)]
    fn sqrt(self) -> Self {
        ScalarVec(self.0.lane_sqrt())
    }
    #[inline(always)]
    fn reciprocal(self) -> Self {
        ScalarVec(self.0.lane_recip())
    }
    #[inline(always)]
    fn rsqrt(self) -> Self {
        ScalarVec(self.0.lane_rsqrt())
    }
    #[inline(always)]
    fn round(self) -> Self {
        ScalarVec(self.0.lane_round())
    }
    #[inline(always)]
    fn floor(self) -> Self {
        ScalarVec(self.0.lane_floor())
    }
    #[inline(always)]
    fn ceil(self) -> Self {
        ScalarVec(self.0.lane_ceil())
    }
    #[inline(always)]
    fn trunc(self) -> Self {
        ScalarVec(self.0.lane_trunc())
    }
    #[inline(always)]
    fn is_nan(self) -> bool {
        self.0.lane_is_nan()
    }
    #[inline(always)]
    fn is_finite(self) -> bool {
        self.0.lane_is_finite()
    }
    #[inline(always)]
    fn copy_sign(self, sign: Self) -> Self {
        ScalarVec(self.0.lane_copy_sign(sign.0))
    }
}

impl<T: SignedElement> SignedLaneOps<T> for ScalarVec<T> {
    #[inline(always)]
    fn neg(self) -> Self {
        ScalarVec(self.0.lane_neg())
    }
    #[inline(always)]
    fn abs(self) -> Self {
        ScalarVec(self.0.lane_abs())
    }
    #[inline(always)]
    fn is_negative(self) -> bool {
        self.0.lane_is_negative()
    }
}

macro_rules! scalar_cast {
    ($($src:ty => $dst:ty),+ $(,)?) => {$(
        impl ConvertFrom<ScalarVec<$src>> for ScalarVec<$dst> {
            #[inline(always)]
            fn convert_from(src: ScalarVec<$src>) -> Self {
                ScalarVec(src.0 as $dst)
            }
        }
    )+};
}

// Float-to-int truncates toward zero; out-of-range lanes are backend-defined
// (this backend saturates, per Rust cast semantics).
scalar_cast!(
    f32 => i32, i32 => f32,
    f32 => u32, u32 => f32,
    f64 => f32, f32 => f64,
    f64 => i32, i32 => f64,
    i32 => u32, u32 => i32,
    i16 => u16, u16 => i16,
);
