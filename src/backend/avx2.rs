//! 256-bit x86 backend (AVX2).
//!
//! Compiled only when the build resolves to the AVX2 tier, so every helper
//! may assume the full AVX2 instruction set; only FMA stays behind its own
//! cfg. Layout and naming mirror the 128-bit backend.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;
use core::marker::PhantomData;

use super::{Backend, ConvertFrom, FloatLaneOps, IntLaneOps, LaneOps, MaskOps, SignedLaneOps};
use crate::element::LaneElement;

/// The 256-bit x86 register family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Avx2;

impl Backend for Avx2 {
    const WIDTH_BYTES: usize = 32;
    const NAME: &'static str = "avx2";

    type Repr<T: LaneElement> = Avx2Vec<T>;
    type MaskRepr<T: LaneElement> = Avx2Mask<T>;
}

#[derive(Copy, Clone)]
#[repr(C)]
union Avx2Reg {
    ps: __m256,
    pd: __m256d,
    i: __m256i,
}

/// One 256-bit register of `T` lanes.
#[repr(transparent)]
pub struct Avx2Vec<T>(Avx2Reg, PhantomData<T>);

impl<T> Copy for Avx2Vec<T> {}
impl<T> Clone for Avx2Vec<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

/// Comparison result: each lane all-ones or all-zeros.
#[repr(transparent)]
pub struct Avx2Mask<T>(__m256i, PhantomData<T>);

impl<T> Copy for Avx2Mask<T> {}
impl<T> Clone for Avx2Mask<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Avx2Vec<T> {
    #[inline(always)]
    fn from_ps(v: __m256) -> Self {
        Avx2Vec(Avx2Reg { ps: v }, PhantomData)
    }
    #[inline(always)]
    fn from_pd(v: __m256d) -> Self {
        Avx2Vec(Avx2Reg { pd: v }, PhantomData)
    }
    #[inline(always)]
    fn from_i(v: __m256i) -> Self {
        Avx2Vec(Avx2Reg { i: v }, PhantomData)
    }
    #[inline(always)]
    fn ps(self) -> __m256 {
        unsafe { self.0.ps }
    }
    #[inline(always)]
    fn pd(self) -> __m256d {
        unsafe { self.0.pd }
    }
    #[inline(always)]
    fn i(self) -> __m256i {
        unsafe { self.0.i }
    }
}

#[inline(always)]
fn all_ones() -> __m256i {
    unsafe { _mm256_set1_epi32(-1) }
}

#[inline(always)]
fn not_si256(v: __m256i) -> __m256i {
    unsafe { _mm256_xor_si256(v, all_ones()) }
}

#[inline(always)]
fn select_si256(mask: __m256i, if_true: __m256i, if_false: __m256i) -> __m256i {
    unsafe { _mm256_blendv_epi8(if_false, if_true, mask) }
}

#[inline(always)]
fn flip_sign_epi32(v: __m256i) -> __m256i {
    unsafe { _mm256_xor_si256(v, _mm256_set1_epi32(i32::MIN)) }
}

#[inline(always)]
fn flip_sign_epi16(v: __m256i) -> __m256i {
    unsafe { _mm256_xor_si256(v, _mm256_set1_epi16(i16::MIN)) }
}

// ============================================================================
// Lane buffers
// ============================================================================

macro_rules! avx2_int_buf {
    ($elem:ty, $lanes:expr) => {
        impl Avx2Vec<$elem> {
            #[inline(always)]
            fn to_buf(self) -> [$elem; $lanes] {
                let mut buf = [0 as $elem; $lanes];
                unsafe { _mm256_storeu_si256(buf.as_mut_ptr() as *mut __m256i, self.i()) };
                buf
            }
            #[inline(always)]
            fn from_buf(buf: [$elem; $lanes]) -> Self {
                Self::from_i(unsafe { _mm256_loadu_si256(buf.as_ptr() as *const __m256i) })
            }
            #[inline(always)]
            fn zip_lanes(self, rhs: Self, f: impl Fn($elem, $elem) -> $elem) -> Self {
                let (a, b) = (self.to_buf(), rhs.to_buf());
                let mut out = [0 as $elem; $lanes];
                for lane in 0..$lanes {
                    out[lane] = f(a[lane], b[lane]);
                }
                Self::from_buf(out)
            }
        }
    };
}

avx2_int_buf!(i32, 8);
avx2_int_buf!(u32, 8);
avx2_int_buf!(i16, 16);
avx2_int_buf!(u16, 16);

impl Avx2Vec<f32> {
    #[inline(always)]
    fn to_buf(self) -> [f32; 8] {
        let mut buf = [0.0f32; 8];
        unsafe { _mm256_storeu_ps(buf.as_mut_ptr(), self.ps()) };
        buf
    }
    #[inline(always)]
    fn from_buf(buf: [f32; 8]) -> Self {
        Self::from_ps(unsafe { _mm256_loadu_ps(buf.as_ptr()) })
    }
}

impl Avx2Vec<f64> {
    #[inline(always)]
    fn to_buf(self) -> [f64; 4] {
        let mut buf = [0.0f64; 4];
        unsafe { _mm256_storeu_pd(buf.as_mut_ptr(), self.pd()) };
        buf
    }
    #[inline(always)]
    fn from_buf(buf: [f64; 4]) -> Self {
        Self::from_pd(unsafe { _mm256_loadu_pd(buf.as_ptr()) })
    }
}

// ============================================================================
// Floats
// ============================================================================

macro_rules! avx2_float_lane_ops {
    ($elem:ty, lanes = $lanes:expr, view = $view:ident, from = $from:ident,
     cast_to_i = $cast_to_i:expr,
     set1 = $set1:expr, setzero = $setzero:expr,
     load = $load:expr, loadu = $loadu:expr,
     store = $store:expr, storeu = $storeu:expr, stream = $stream:expr,
     add = $add:expr, sub = $sub:expr, mul = $mul:expr, div = $div:expr,
     min = $min:expr, max = $max:expr,
     cmp = $cmp:ident,
     fmadd = $fmadd:expr) => {
        impl LaneOps<$elem> for Avx2Vec<$elem> {
            type Mask = Avx2Mask<$elem>;

            const LANES: usize = $lanes;

            #[inline(always)]
            fn splat(v: $elem) -> Self {
                Self::$from(unsafe { $set1(v) })
            }
            #[inline(always)]
            fn zero() -> Self {
                Self::$from(unsafe { $setzero() })
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $elem) -> Self {
                Self::$from(unsafe { $load(ptr) })
            }
            #[inline(always)]
            unsafe fn load_unaligned(ptr: *const $elem) -> Self {
                Self::$from(unsafe { $loadu(ptr) })
            }
            #[inline(always)]
            unsafe fn load_streaming(ptr: *const $elem) -> Self {
                // Hint only; served by the ordinary aligned load.
                Self::$from(unsafe { $load(ptr) })
            }
            #[inline(always)]
            unsafe fn store_aligned(self, ptr: *mut $elem) {
                unsafe { $store(ptr, self.$view()) }
            }
            #[inline(always)]
            unsafe fn store_unaligned(self, ptr: *mut $elem) {
                unsafe { $storeu(ptr, self.$view()) }
            }
            #[inline(always)]
            unsafe fn store_streaming(self, ptr: *mut $elem) {
                unsafe { $stream(ptr, self.$view()) }
            }

            #[inline(always)]
            fn extract(self, lane: usize) -> $elem {
                debug_assert!(lane < $lanes);
                self.to_buf()[lane]
            }
            #[inline(always)]
            fn insert(self, lane: usize, v: $elem) -> Self {
                debug_assert!(lane < $lanes);
                let mut buf = self.to_buf();
                buf[lane] = v;
                Self::from_buf(buf)
            }

            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                Self::$from(unsafe { $add(self.$view(), rhs.$view()) })
            }
            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                Self::$from(unsafe { $sub(self.$view(), rhs.$view()) })
            }
            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                Self::$from(unsafe { $mul(self.$view(), rhs.$view()) })
            }
            #[inline(always)]
            fn div(self, rhs: Self) -> Self {
                Self::$from(unsafe { $div(self.$view(), rhs.$view()) })
            }
            #[inline(always)]
            fn min(self, rhs: Self) -> Self {
                // vminps returns the second operand on NaN, like the scalar
                // lane.
                Self::$from(unsafe { $min(self.$view(), rhs.$view()) })
            }
            #[inline(always)]
            fn max(self, rhs: Self) -> Self {
                Self::$from(unsafe { $max(self.$view(), rhs.$view()) })
            }

            #[inline(always)]
            fn cmp_eq(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(
                    ($cast_to_i)(unsafe { $cmp::<_CMP_EQ_OQ>(self.$view(), rhs.$view()) }),
                    PhantomData,
                )
            }
            #[inline(always)]
            fn cmp_ne(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(
                    ($cast_to_i)(unsafe { $cmp::<_CMP_NEQ_UQ>(self.$view(), rhs.$view()) }),
                    PhantomData,
                )
            }
            #[inline(always)]
            fn cmp_lt(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(
                    ($cast_to_i)(unsafe { $cmp::<_CMP_LT_OQ>(self.$view(), rhs.$view()) }),
                    PhantomData,
                )
            }
            #[inline(always)]
            fn cmp_le(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(
                    ($cast_to_i)(unsafe { $cmp::<_CMP_LE_OQ>(self.$view(), rhs.$view()) }),
                    PhantomData,
                )
            }
            #[inline(always)]
            fn cmp_gt(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(
                    ($cast_to_i)(unsafe { $cmp::<_CMP_GT_OQ>(self.$view(), rhs.$view()) }),
                    PhantomData,
                )
            }
            #[inline(always)]
            fn cmp_ge(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(
                    ($cast_to_i)(unsafe { $cmp::<_CMP_GE_OQ>(self.$view(), rhs.$view()) }),
                    PhantomData,
                )
            }

            #[inline(always)]
            fn blend(mask: Avx2Mask<$elem>, if_true: Self, if_false: Self) -> Self {
                Self::from_i(select_si256(mask.0, if_true.i(), if_false.i()))
            }

            #[inline(always)]
            fn fused_multiply_add(self, mul: Self, add: Self) -> Self {
                #[cfg(lanewise_fma)]
                return Self::$from(($fmadd)(self.$view(), mul.$view(), add.$view()));
                #[cfg(not(lanewise_fma))]
                return self.mul(mul).add(add);
            }
        }
    };
}

avx2_float_lane_ops!(
    f32, lanes = 8, view = ps, from = from_ps,
    cast_to_i = |m| unsafe { _mm256_castps_si256(m) },
    set1 = _mm256_set1_ps, setzero = _mm256_setzero_ps,
    load = _mm256_load_ps, loadu = _mm256_loadu_ps,
    store = _mm256_store_ps, storeu = _mm256_storeu_ps, stream = _mm256_stream_ps,
    add = _mm256_add_ps, sub = _mm256_sub_ps, mul = _mm256_mul_ps, div = _mm256_div_ps,
    min = _mm256_min_ps, max = _mm256_max_ps,
    cmp = _mm256_cmp_ps,
    fmadd = |a, b, c| unsafe { _mm256_fmadd_ps(a, b, c) }
);

avx2_float_lane_ops!(
    f64, lanes = 4, view = pd, from = from_pd,
    cast_to_i = |m| unsafe { _mm256_castpd_si256(m) },
    set1 = _mm256_set1_pd, setzero = _mm256_setzero_pd,
    load = _mm256_load_pd, loadu = _mm256_loadu_pd,
    store = _mm256_store_pd, storeu = _mm256_storeu_pd, stream = _mm256_stream_pd,
    add = _mm256_add_pd, sub = _mm256_sub_pd, mul = _mm256_mul_pd, div = _mm256_div_pd,
    min = _mm256_min_pd, max = _mm256_max_pd,
    cmp = _mm256_cmp_pd,
    fmadd = |a, b, c| unsafe { _mm256_fmadd_pd(a, b, c) }
);

impl FloatLaneOps<f32> for Avx2Vec<f32> {
    #[inline(always)]
    fn sqrt(self) -> Self {
        Self::from_ps(unsafe { _mm256_sqrt_ps(self.ps()) })
    }
    #[inline(always)]
    fn reciprocal(self) -> Self {
        Self::from_ps(unsafe { _mm256_rcp_ps(self.ps()) })
    }
    #[inline(always)]
    fn rsqrt(self) -> Self {
        Self::from_ps(unsafe { _mm256_rsqrt_ps(self.ps()) })
    }
    #[inline(always)]
    fn round(self) -> Self {
        Self::from_ps(unsafe {
            _mm256_round_ps::<{ _MM_FROUND_TO_NEAREST_INT | _MM_FROUND_NO_EXC }>(self.ps())
        })
    }
    #[inline(always)]
    fn floor(self) -> Self {
        Self::from_ps(unsafe { _mm256_floor_ps(self.ps()) })
    }
    #[inline(always)]
    fn ceil(self) -> Self {
        Self::from_ps(unsafe { _mm256_ceil_ps(self.ps()) })
    }
    #[inline(always)]
    fn trunc(self) -> Self {
        Self::from_ps(unsafe {
            _mm256_round_ps::<{ _MM_FROUND_TO_ZERO | _MM_FROUND_NO_EXC }>(self.ps())
        })
    }
    #[inline(always)]
    fn is_nan(self) -> Avx2Mask<f32> {
        Avx2Mask(
            unsafe {
                _mm256_castps_si256(_mm256_cmp_ps::<_CMP_UNORD_Q>(self.ps(), self.ps()))
            },
            PhantomData,
        )
    }
    #[inline(always)]
    fn is_finite(self) -> Avx2Mask<f32> {
        let magnitude = SignedLaneOps::abs(self);
        Avx2Mask(
            unsafe {
                _mm256_castps_si256(_mm256_cmp_ps::<_CMP_LT_OQ>(
                    magnitude.ps(),
                    _mm256_set1_ps(f32::INFINITY),
                ))
            },
            PhantomData,
        )
    }
    #[inline(always)]
    fn copy_sign(self, sign: Self) -> Self {
        let sign_bit = unsafe { _mm256_set1_ps(-0.0) };
        Self::from_ps(unsafe {
            _mm256_or_ps(
                _mm256_andnot_ps(sign_bit, self.ps()),
                _mm256_and_ps(sign_bit, sign.ps()),
            )
        })
    }
}

impl FloatLaneOps<f64> for Avx2Vec<f64> {
    #[inline(always)]
    fn sqrt(self) -> Self {
        Self::from_pd(unsafe { _mm256_sqrt_pd(self.pd()) })
    }
    #[inline(always)]
    fn reciprocal(self) -> Self {
        Self::splat(1.0).div(self)
    }
    #[inline(always)]
    fn rsqrt(self) -> Self {
        Self::splat(1.0).div(self.sqrt())
    }
    #[inline(always)]
    fn round(self) -> Self {
        Self::from_pd(unsafe {
            _mm256_round_pd::<{ _MM_FROUND_TO_NEAREST_INT | _MM_FROUND_NO_EXC }>(self.pd())
        })
    }
    #[inline(always)]
    fn floor(self) -> Self {
        Self::from_pd(unsafe { _mm256_floor_pd(self.pd()) })
    }
    #[inline(always)]
    fn ceil(self) -> Self {
        Self::from_pd(unsafe { _mm256_ceil_pd(self.pd()) })
    }
    #[inline(always)]
    fn trunc(self) -> Self {
        Self::from_pd(unsafe {
            _mm256_round_pd::<{ _MM_FROUND_TO_ZERO | _MM_FROUND_NO_EXC }>(self.pd())
        })
    }
    #[inline(always)]
    fn is_nan(self) -> Avx2Mask<f64> {
        Avx2Mask(
            unsafe {
                _mm256_castpd_si256(_mm256_cmp_pd::<_CMP_UNORD_Q>(self.pd(), self.pd()))
            },
            PhantomData,
        )
    }
    #[inline(always)]
    fn is_finite(self) -> Avx2Mask<f64> {
        let magnitude = SignedLaneOps::abs(self);
        Avx2Mask(
            unsafe {
                _mm256_castpd_si256(_mm256_cmp_pd::<_CMP_LT_OQ>(
                    magnitude.pd(),
                    _mm256_set1_pd(f64::INFINITY),
                ))
            },
            PhantomData,
        )
    }
    #[inline(always)]
    fn copy_sign(self, sign: Self) -> Self {
        let sign_bit = unsafe { _mm256_set1_pd(-0.0) };
        Self::from_pd(unsafe {
            _mm256_or_pd(
                _mm256_andnot_pd(sign_bit, self.pd()),
                _mm256_and_pd(sign_bit, sign.pd()),
            )
        })
    }
}

impl SignedLaneOps<f32> for Avx2Vec<f32> {
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_ps(unsafe { _mm256_xor_ps(self.ps(), _mm256_set1_ps(-0.0)) })
    }
    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_ps(unsafe { _mm256_andnot_ps(_mm256_set1_ps(-0.0), self.ps()) })
    }
    #[inline(always)]
    fn is_negative(self) -> Avx2Mask<f32> {
        Avx2Mask(unsafe { _mm256_srai_epi32::<31>(self.i()) }, PhantomData)
    }
}

impl SignedLaneOps<f64> for Avx2Vec<f64> {
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_pd(unsafe { _mm256_xor_pd(self.pd(), _mm256_set1_pd(-0.0)) })
    }
    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_pd(unsafe { _mm256_andnot_pd(_mm256_set1_pd(-0.0), self.pd()) })
    }
    #[inline(always)]
    fn is_negative(self) -> Avx2Mask<f64> {
        // Broadcast each qword's sign dword into both dwords of the lane;
        // the shuffle works within each 128-bit half, which is what we want.
        let sign = unsafe { _mm256_srai_epi32::<31>(self.i()) };
        Avx2Mask(unsafe { _mm256_shuffle_epi32::<0b11_11_01_01>(sign) }, PhantomData)
    }
}

// ============================================================================
// Integer elements
// ============================================================================

macro_rules! avx2_int_lane_ops {
    ($elem:ty, lanes = $lanes:expr,
     splat = $splat:expr,
     add = $add:expr, sub = $sub:expr, mul = $mul:expr,
     min = $min:expr, max = $max:expr,
     cmp_eq = $cmp_eq:expr, cmp_gt = $cmp_gt:expr,
     shl = $shl:expr, shr = $shr:expr,
     shlv = $shlv:expr, shrv = $shrv:expr) => {
        impl LaneOps<$elem> for Avx2Vec<$elem> {
            type Mask = Avx2Mask<$elem>;

            const LANES: usize = $lanes;

            #[inline(always)]
            fn splat(v: $elem) -> Self {
                Self::from_i(($splat)(v))
            }
            #[inline(always)]
            fn zero() -> Self {
                Self::from_i(unsafe { _mm256_setzero_si256() })
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $elem) -> Self {
                Self::from_i(unsafe { _mm256_load_si256(ptr as *const __m256i) })
            }
            #[inline(always)]
            unsafe fn load_unaligned(ptr: *const $elem) -> Self {
                Self::from_i(unsafe { _mm256_loadu_si256(ptr as *const __m256i) })
            }
            #[inline(always)]
            unsafe fn load_streaming(ptr: *const $elem) -> Self {
                Self::from_i(unsafe { _mm256_load_si256(ptr as *const __m256i) })
            }
            #[inline(always)]
            unsafe fn store_aligned(self, ptr: *mut $elem) {
                unsafe { _mm256_store_si256(ptr as *mut __m256i, self.i()) }
            }
            #[inline(always)]
            unsafe fn store_unaligned(self, ptr: *mut $elem) {
                unsafe { _mm256_storeu_si256(ptr as *mut __m256i, self.i()) }
            }
            #[inline(always)]
            unsafe fn store_streaming(self, ptr: *mut $elem) {
                unsafe { _mm256_stream_si256(ptr as *mut __m256i, self.i()) }
            }

            #[inline(always)]
            fn extract(self, lane: usize) -> $elem {
                debug_assert!(lane < $lanes);
                self.to_buf()[lane]
            }
            #[inline(always)]
            fn insert(self, lane: usize, v: $elem) -> Self {
                debug_assert!(lane < $lanes);
                let mut buf = self.to_buf();
                buf[lane] = v;
                Self::from_buf(buf)
            }

            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                Self::from_i(($add)(self.i(), rhs.i()))
            }
            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                Self::from_i(($sub)(self.i(), rhs.i()))
            }
            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                Self::from_i(($mul)(self.i(), rhs.i()))
            }
            #[inline(always)]
            fn div(self, rhs: Self) -> Self {
                use crate::element::LaneElement as _;
                self.zip_lanes(rhs, <$elem>::lane_div)
            }
            #[inline(always)]
            fn min(self, rhs: Self) -> Self {
                Self::from_i(($min)(self.i(), rhs.i()))
            }
            #[inline(always)]
            fn max(self, rhs: Self) -> Self {
                Self::from_i(($max)(self.i(), rhs.i()))
            }

            #[inline(always)]
            fn cmp_eq(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(($cmp_eq)(self.i(), rhs.i()), PhantomData)
            }
            #[inline(always)]
            fn cmp_ne(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(not_si256(($cmp_eq)(self.i(), rhs.i())), PhantomData)
            }
            #[inline(always)]
            fn cmp_lt(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(($cmp_gt)(rhs.i(), self.i()), PhantomData)
            }
            #[inline(always)]
            fn cmp_le(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(not_si256(($cmp_gt)(self.i(), rhs.i())), PhantomData)
            }
            #[inline(always)]
            fn cmp_gt(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(($cmp_gt)(self.i(), rhs.i()), PhantomData)
            }
            #[inline(always)]
            fn cmp_ge(self, rhs: Self) -> Avx2Mask<$elem> {
                Avx2Mask(not_si256(($cmp_gt)(rhs.i(), self.i())), PhantomData)
            }

            #[inline(always)]
            fn blend(mask: Avx2Mask<$elem>, if_true: Self, if_false: Self) -> Self {
                Self::from_i(select_si256(mask.0, if_true.i(), if_false.i()))
            }

            #[inline(always)]
            fn fused_multiply_add(self, mul: Self, add: Self) -> Self {
                self.mul(mul).add(add)
            }
        }

        impl IntLaneOps<$elem> for Avx2Vec<$elem> {
            #[inline(always)]
            fn and(self, rhs: Self) -> Self {
                Self::from_i(unsafe { _mm256_and_si256(self.i(), rhs.i()) })
            }
            #[inline(always)]
            fn or(self, rhs: Self) -> Self {
                Self::from_i(unsafe { _mm256_or_si256(self.i(), rhs.i()) })
            }
            #[inline(always)]
            fn xor(self, rhs: Self) -> Self {
                Self::from_i(unsafe { _mm256_xor_si256(self.i(), rhs.i()) })
            }
            #[inline(always)]
            fn not(self) -> Self {
                Self::from_i(not_si256(self.i()))
            }
            #[inline(always)]
            fn shl_imm(self, count: u32) -> Self {
                Self::from_i(($shl)(self.i(), count))
            }
            #[inline(always)]
            fn shr_imm(self, count: u32) -> Self {
                Self::from_i(($shr)(self.i(), count))
            }
            #[inline(always)]
            fn shl_lanes(self, counts: Self) -> Self {
                ($shlv)(self, counts)
            }
            #[inline(always)]
            fn shr_lanes(self, counts: Self) -> Self {
                ($shrv)(self, counts)
            }
            #[inline(always)]
            fn rem(self, rhs: Self) -> Self {
                use crate::element::IntegerElement as _;
                self.zip_lanes(rhs, <$elem>::lane_rem)
            }
        }
    };
}

avx2_int_lane_ops!(
    i32, lanes = 8,
    splat = |v: i32| unsafe { _mm256_set1_epi32(v) },
    add = |a, b| unsafe { _mm256_add_epi32(a, b) },
    sub = |a, b| unsafe { _mm256_sub_epi32(a, b) },
    mul = |a, b| unsafe { _mm256_mullo_epi32(a, b) },
    min = |a, b| unsafe { _mm256_min_epi32(a, b) },
    max = |a, b| unsafe { _mm256_max_epi32(a, b) },
    cmp_eq = |a, b| unsafe { _mm256_cmpeq_epi32(a, b) },
    cmp_gt = |a, b| unsafe { _mm256_cmpgt_epi32(a, b) },
    shl = |v, c: u32| unsafe { _mm256_sll_epi32(v, _mm_cvtsi32_si128(c as i32)) },
    shr = |v, c: u32| unsafe { _mm256_sra_epi32(v, _mm_cvtsi32_si128(c as i32)) },
    shlv = |v: Avx2Vec<i32>, c: Avx2Vec<i32>| {
        Avx2Vec::from_i(unsafe { _mm256_sllv_epi32(v.i(), c.i()) })
    },
    shrv = |v: Avx2Vec<i32>, c: Avx2Vec<i32>| {
        Avx2Vec::from_i(unsafe { _mm256_srav_epi32(v.i(), c.i()) })
    }
);

avx2_int_lane_ops!(
    u32, lanes = 8,
    splat = |v: u32| unsafe { _mm256_set1_epi32(v as i32) },
    add = |a, b| unsafe { _mm256_add_epi32(a, b) },
    sub = |a, b| unsafe { _mm256_sub_epi32(a, b) },
    mul = |a, b| unsafe { _mm256_mullo_epi32(a, b) },
    min = |a, b| unsafe { _mm256_min_epu32(a, b) },
    max = |a, b| unsafe { _mm256_max_epu32(a, b) },
    cmp_eq = |a, b| unsafe { _mm256_cmpeq_epi32(a, b) },
    cmp_gt = |a, b| unsafe { _mm256_cmpgt_epi32(flip_sign_epi32(a), flip_sign_epi32(b)) },
    shl = |v, c: u32| unsafe { _mm256_sll_epi32(v, _mm_cvtsi32_si128(c as i32)) },
    shr = |v, c: u32| unsafe { _mm256_srl_epi32(v, _mm_cvtsi32_si128(c as i32)) },
    shlv = |v: Avx2Vec<u32>, c: Avx2Vec<u32>| {
        Avx2Vec::from_i(unsafe { _mm256_sllv_epi32(v.i(), c.i()) })
    },
    shrv = |v: Avx2Vec<u32>, c: Avx2Vec<u32>| {
        Avx2Vec::from_i(unsafe { _mm256_srlv_epi32(v.i(), c.i()) })
    }
);

avx2_int_lane_ops!(
    i16, lanes = 16,
    splat = |v: i16| unsafe { _mm256_set1_epi16(v) },
    add = |a, b| unsafe { _mm256_add_epi16(a, b) },
    sub = |a, b| unsafe { _mm256_sub_epi16(a, b) },
    mul = |a, b| unsafe { _mm256_mullo_epi16(a, b) },
    min = |a, b| unsafe { _mm256_min_epi16(a, b) },
    max = |a, b| unsafe { _mm256_max_epi16(a, b) },
    cmp_eq = |a, b| unsafe { _mm256_cmpeq_epi16(a, b) },
    cmp_gt = |a, b| unsafe { _mm256_cmpgt_epi16(a, b) },
    shl = |v, c: u32| unsafe { _mm256_sll_epi16(v, _mm_cvtsi32_si128(c as i32)) },
    shr = |v, c: u32| unsafe { _mm256_sra_epi16(v, _mm_cvtsi32_si128(c as i32)) },
    shlv = word_shl_lanes,
    shrv = word_shr_lanes
);

avx2_int_lane_ops!(
    u16, lanes = 16,
    splat = |v: u16| unsafe { _mm256_set1_epi16(v as i16) },
    add = |a, b| unsafe { _mm256_add_epi16(a, b) },
    sub = |a, b| unsafe { _mm256_sub_epi16(a, b) },
    mul = |a, b| unsafe { _mm256_mullo_epi16(a, b) },
    min = |a, b| unsafe { _mm256_min_epu16(a, b) },
    max = |a, b| unsafe { _mm256_max_epu16(a, b) },
    cmp_eq = |a, b| unsafe { _mm256_cmpeq_epi16(a, b) },
    cmp_gt = |a, b| unsafe { _mm256_cmpgt_epi16(flip_sign_epi16(a), flip_sign_epi16(b)) },
    shl = |v, c: u32| unsafe { _mm256_sll_epi16(v, _mm_cvtsi32_si128(c as i32)) },
    shr = |v, c: u32| unsafe { _mm256_srl_epi16(v, _mm_cvtsi32_si128(c as i32)) },
    shlv = word_shl_lanes,
    shrv = word_shr_lanes
);

// AVX2 has variable shifts for 32-bit lanes only; 16-bit lanes go through
// the buffer.

#[inline(always)]
fn word_shl_lanes<T: crate::element::IntegerElement>(
    v: Avx2Vec<T>,
    counts: Avx2Vec<T>,
) -> Avx2Vec<T>
where
    Avx2Vec<T>: WordBuf<T>,
{
    v.zip_word_lanes(counts, |x, c| x.lane_shl(c.to_lane_index() as u32))
}

#[inline(always)]
fn word_shr_lanes<T: crate::element::IntegerElement>(
    v: Avx2Vec<T>,
    counts: Avx2Vec<T>,
) -> Avx2Vec<T>
where
    Avx2Vec<T>: WordBuf<T>,
{
    v.zip_word_lanes(counts, |x, c| x.lane_shr(c.to_lane_index() as u32))
}

trait WordBuf<T> {
    fn zip_word_lanes(self, rhs: Self, f: impl Fn(T, T) -> T) -> Self;
}

impl WordBuf<i16> for Avx2Vec<i16> {
    #[inline(always)]
    fn zip_word_lanes(self, rhs: Self, f: impl Fn(i16, i16) -> i16) -> Self {
        self.zip_lanes(rhs, f)
    }
}

impl WordBuf<u16> for Avx2Vec<u16> {
    #[inline(always)]
    fn zip_word_lanes(self, rhs: Self, f: impl Fn(u16, u16) -> u16) -> Self {
        self.zip_lanes(rhs, f)
    }
}

impl SignedLaneOps<i32> for Avx2Vec<i32> {
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_i(unsafe { _mm256_sub_epi32(_mm256_setzero_si256(), self.i()) })
    }
    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_i(unsafe { _mm256_abs_epi32(self.i()) })
    }
    #[inline(always)]
    fn is_negative(self) -> Avx2Mask<i32> {
        Avx2Mask(unsafe { _mm256_srai_epi32::<31>(self.i()) }, PhantomData)
    }
}

impl SignedLaneOps<i16> for Avx2Vec<i16> {
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_i(unsafe { _mm256_sub_epi16(_mm256_setzero_si256(), self.i()) })
    }
    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_i(unsafe { _mm256_abs_epi16(self.i()) })
    }
    #[inline(always)]
    fn is_negative(self) -> Avx2Mask<i16> {
        Avx2Mask(unsafe { _mm256_srai_epi16::<15>(self.i()) }, PhantomData)
    }
}

// ============================================================================
// Masks
// ============================================================================

macro_rules! avx2_mask {
    ($elem:ty, lanes = $lanes:expr, to_bits = $to_bits:expr) => {
        impl MaskOps for Avx2Mask<$elem> {
            const LANES: usize = $lanes;

            #[inline(always)]
            fn splat(v: bool) -> Self {
                Avx2Mask(
                    if v { all_ones() } else { unsafe { _mm256_setzero_si256() } },
                    PhantomData,
                )
            }
            #[inline(always)]
            fn to_bits(self) -> u64 {
                ($to_bits)(self.0)
            }
            #[inline(always)]
            fn and(self, rhs: Self) -> Self {
                Avx2Mask(unsafe { _mm256_and_si256(self.0, rhs.0) }, PhantomData)
            }
            #[inline(always)]
            fn or(self, rhs: Self) -> Self {
                Avx2Mask(unsafe { _mm256_or_si256(self.0, rhs.0) }, PhantomData)
            }
            #[inline(always)]
            fn xor(self, rhs: Self) -> Self {
                Avx2Mask(unsafe { _mm256_xor_si256(self.0, rhs.0) }, PhantomData)
            }
            #[inline(always)]
            fn not(self) -> Self {
                Avx2Mask(not_si256(self.0), PhantomData)
            }
        }
    };
}

#[inline(always)]
fn movemask_dwords(m: __m256i) -> u64 {
    unsafe { _mm256_movemask_ps(_mm256_castsi256_ps(m)) as u32 as u64 }
}

#[inline(always)]
fn movemask_qwords(m: __m256i) -> u64 {
    unsafe { _mm256_movemask_pd(_mm256_castsi256_pd(m)) as u32 as u64 }
}

#[inline(always)]
fn movemask_words(m: __m256i) -> u64 {
    // packs interleaves the 128-bit halves: bytes come out as lanes
    // 0..7, zero, 8..15, zero. Stitch the two byte groups back together.
    let bits = unsafe {
        _mm256_movemask_epi8(_mm256_packs_epi16(m, _mm256_setzero_si256())) as u32
    };
    ((bits & 0xFF) | ((bits >> 8) & 0xFF00)) as u64
}

avx2_mask!(f32, lanes = 8, to_bits = movemask_dwords);
avx2_mask!(i32, lanes = 8, to_bits = movemask_dwords);
avx2_mask!(u32, lanes = 8, to_bits = movemask_dwords);
avx2_mask!(f64, lanes = 4, to_bits = movemask_qwords);
avx2_mask!(i16, lanes = 16, to_bits = movemask_words);
avx2_mask!(u16, lanes = 16, to_bits = movemask_words);

// ============================================================================
// Casts
// ============================================================================

impl ConvertFrom<Avx2Vec<f32>> for Avx2Vec<i32> {
    /// Truncates toward zero (`vcvttps2dq`); out-of-range lanes become
    /// `i32::MIN`.
    #[inline(always)]
    fn convert_from(src: Avx2Vec<f32>) -> Self {
        Self::from_i(unsafe { _mm256_cvttps_epi32(src.ps()) })
    }
}

impl ConvertFrom<Avx2Vec<i32>> for Avx2Vec<f32> {
    #[inline(always)]
    fn convert_from(src: Avx2Vec<i32>) -> Self {
        Self::from_ps(unsafe { _mm256_cvtepi32_ps(src.i()) })
    }
}

impl ConvertFrom<Avx2Vec<f64>> for Avx2Vec<f32> {
    /// Converts all four `f64` lanes into the low four lanes; the high lanes
    /// are zero.
    #[inline(always)]
    fn convert_from(src: Avx2Vec<f64>) -> Self {
        Self::from_ps(unsafe { _mm256_zextps128_ps256(_mm256_cvtpd_ps(src.pd())) })
    }
}

impl ConvertFrom<Avx2Vec<f32>> for Avx2Vec<f64> {
    /// Converts the low four `f32` lanes.
    #[inline(always)]
    fn convert_from(src: Avx2Vec<f32>) -> Self {
        Self::from_pd(unsafe { _mm256_cvtps_pd(_mm256_castps256_ps128(src.ps())) })
    }
}

impl ConvertFrom<Avx2Vec<f64>> for Avx2Vec<i32> {
    /// Truncates toward zero into the low four lanes; the high lanes are
    /// zero.
    #[inline(always)]
    fn convert_from(src: Avx2Vec<f64>) -> Self {
        Self::from_i(unsafe { _mm256_zextsi128_si256(_mm256_cvttpd_epi32(src.pd())) })
    }
}

impl ConvertFrom<Avx2Vec<i32>> for Avx2Vec<f64> {
    /// Converts the low four lanes.
    #[inline(always)]
    fn convert_from(src: Avx2Vec<i32>) -> Self {
        Self::from_pd(unsafe { _mm256_cvtepi32_pd(_mm256_castsi256_si128(src.i())) })
    }
}

macro_rules! avx2_cast_bits {
    ($src:ty => $dst:ty) => {
        impl ConvertFrom<Avx2Vec<$src>> for Avx2Vec<$dst> {
            /// Same-width reinterpretation, modulo 2^n.
            #[inline(always)]
            fn convert_from(src: Avx2Vec<$src>) -> Self {
                Self::from_i(src.i())
            }
        }
    };
}

avx2_cast_bits!(i32 => u32);
avx2_cast_bits!(u32 => i32);
avx2_cast_bits!(i16 => u16);
avx2_cast_bits!(u16 => i16);

macro_rules! avx2_cast_lanewise {
    ($src:ty, $src_lanes:expr => $dst:ty, $dst_lanes:expr) => {
        impl ConvertFrom<Avx2Vec<$src>> for Avx2Vec<$dst> {
            #[inline(always)]
            fn convert_from(src: Avx2Vec<$src>) -> Self {
                let buf = src.to_buf();
                let mut out = [0 as $dst; $dst_lanes];
                let shared = if $src_lanes < $dst_lanes { $src_lanes } else { $dst_lanes };
                for lane in 0..shared {
                    out[lane] = buf[lane] as $dst;
                }
                Self::from_buf(out)
            }
        }
    };
}

avx2_cast_lanewise!(f32, 8 => u32, 8);
avx2_cast_lanewise!(u32, 8 => f32, 8);
