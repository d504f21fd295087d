//! 128-bit x86 backend (SSE2 baseline).
//!
//! The register is a union over the three 128-bit views; the element type of
//! the wrapper decides which view an operation reads. SSE2 is the floor;
//! where a later tier has a dedicated instruction (SSSE3 `pabsd`, SSE4.1
//! `pmulld`, `blendv`, `roundps`, unsigned min/max) a cfg-selected helper
//! uses it, with an SSE2 synthesis behind the same name otherwise — callers
//! never branch.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;
use core::marker::PhantomData;

use super::{Backend, ConvertFrom, FloatLaneOps, IntLaneOps, LaneOps, MaskOps, SignedLaneOps};
use crate::element::LaneElement;

/// The 128-bit x86 register family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sse;

impl Backend for Sse {
    const WIDTH_BYTES: usize = 16;
    const NAME: &'static str = "sse";

    type Repr<T: LaneElement> = SseVec<T>;
    type MaskRepr<T: LaneElement> = SseMask<T>;
}

#[derive(Copy, Clone)]
#[repr(C)]
union SseReg {
    ps: __m128,
    pd: __m128d,
    i: __m128i,
}

/// One 128-bit register of `T` lanes.
#[repr(transparent)]
pub struct SseVec<T>(SseReg, PhantomData<T>);

impl<T> Copy for SseVec<T> {}
impl<T> Clone for SseVec<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

/// Comparison result: each lane all-ones or all-zeros.
#[repr(transparent)]
pub struct SseMask<T>(__m128i, PhantomData<T>);

impl<T> Copy for SseMask<T> {}
impl<T> Clone for SseMask<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> SseVec<T> {
    #[inline(always)]
    fn from_ps(v: __m128) -> Self {
        SseVec(SseReg { ps: v }, PhantomData)
    }
    #[inline(always)]
    fn from_pd(v: __m128d) -> Self {
        SseVec(SseReg { pd: v }, PhantomData)
    }
    #[inline(always)]
    fn from_i(v: __m128i) -> Self {
        SseVec(SseReg { i: v }, PhantomData)
    }
    #[inline(always)]
    fn ps(self) -> __m128 {
        unsafe { self.0.ps }
    }
    #[inline(always)]
    fn pd(self) -> __m128d {
        unsafe { self.0.pd }
    }
    #[inline(always)]
    fn i(self) -> __m128i {
        unsafe { self.0.i }
    }
}

// ============================================================================
// Tier-selected helpers
// ============================================================================

#[inline(always)]
fn all_ones() -> __m128i {
    unsafe { _mm_set1_epi32(-1) }
}

#[inline(always)]
fn not_si128(v: __m128i) -> __m128i {
    unsafe { _mm_xor_si128(v, all_ones()) }
}

#[inline(always)]
fn select_si128(mask: __m128i, if_true: __m128i, if_false: __m128i) -> __m128i {
    #[cfg(lanewise_sse41)]
    return unsafe { _mm_blendv_epi8(if_false, if_true, mask) };
    #[cfg(not(lanewise_sse41))]
    return unsafe {
        _mm_or_si128(_mm_and_si128(mask, if_true), _mm_andnot_si128(mask, if_false))
    };
}

#[inline(always)]
fn mullo_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(lanewise_sse41)]
    return unsafe { _mm_mullo_epi32(a, b) };
    // Two pmuludq passes cover the four lanes.
    #[cfg(not(lanewise_sse41))]
    return unsafe {
        let even = _mm_mul_epu32(a, b);
        let odd = _mm_mul_epu32(_mm_srli_si128::<4>(a), _mm_srli_si128::<4>(b));
        _mm_unpacklo_epi32(
            _mm_shuffle_epi32::<0b00_00_10_00>(even),
            _mm_shuffle_epi32::<0b00_00_10_00>(odd),
        )
    };
}

/// Sign-bit flip maps unsigned ordering onto the signed compare unit.
#[inline(always)]
fn flip_sign_epi32(v: __m128i) -> __m128i {
    unsafe { _mm_xor_si128(v, _mm_set1_epi32(i32::MIN)) }
}

#[inline(always)]
fn flip_sign_epi16(v: __m128i) -> __m128i {
    unsafe { _mm_xor_si128(v, _mm_set1_epi16(i16::MIN)) }
}

#[inline(always)]
fn min_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(lanewise_sse41)]
    return unsafe { _mm_min_epi32(a, b) };
    #[cfg(not(lanewise_sse41))]
    return unsafe { select_si128(_mm_cmplt_epi32(a, b), a, b) };
}

#[inline(always)]
fn max_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(lanewise_sse41)]
    return unsafe { _mm_max_epi32(a, b) };
    #[cfg(not(lanewise_sse41))]
    return unsafe { select_si128(_mm_cmpgt_epi32(a, b), a, b) };
}

#[inline(always)]
fn min_epu32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(lanewise_sse41)]
    return unsafe { _mm_min_epu32(a, b) };
    #[cfg(not(lanewise_sse41))]
    return flip_sign_epi32(min_epi32(flip_sign_epi32(a), flip_sign_epi32(b)));
}

#[inline(always)]
fn max_epu32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(lanewise_sse41)]
    return unsafe { _mm_max_epu32(a, b) };
    #[cfg(not(lanewise_sse41))]
    return flip_sign_epi32(max_epi32(flip_sign_epi32(a), flip_sign_epi32(b)));
}

#[inline(always)]
fn min_epu16(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(lanewise_sse41)]
    return unsafe { _mm_min_epu16(a, b) };
    #[cfg(not(lanewise_sse41))]
    return flip_sign_epi16(unsafe { _mm_min_epi16(flip_sign_epi16(a), flip_sign_epi16(b)) });
}

#[inline(always)]
fn max_epu16(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(lanewise_sse41)]
    return unsafe { _mm_max_epu16(a, b) };
    #[cfg(not(lanewise_sse41))]
    return flip_sign_epi16(unsafe { _mm_max_epi16(flip_sign_epi16(a), flip_sign_epi16(b)) });
}

#[inline(always)]
fn abs_epi32(v: __m128i) -> __m128i {
    #[cfg(lanewise_ssse3)]
    return unsafe { _mm_abs_epi32(v) };
    #[cfg(not(lanewise_ssse3))]
    return unsafe {
        let sign = _mm_srai_epi32::<31>(v);
        _mm_sub_epi32(_mm_xor_si128(v, sign), sign)
    };
}

#[inline(always)]
fn abs_epi16(v: __m128i) -> __m128i {
    #[cfg(lanewise_ssse3)]
    return unsafe { _mm_abs_epi16(v) };
    #[cfg(not(lanewise_ssse3))]
    return unsafe {
        let sign = _mm_srai_epi16::<15>(v);
        _mm_sub_epi16(_mm_xor_si128(v, sign), sign)
    };
}

// ============================================================================
// Lane buffers for the operations SSE cannot express in-register
// ============================================================================

macro_rules! sse_int_buf {
    ($elem:ty, $lanes:expr) => {
        impl SseVec<$elem> {
            #[inline(always)]
            fn to_buf(self) -> [$elem; $lanes] {
                let mut buf = [0 as $elem; $lanes];
                unsafe { _mm_storeu_si128(buf.as_mut_ptr() as *mut __m128i, self.i()) };
                buf
            }
            #[inline(always)]
            fn from_buf(buf: [$elem; $lanes]) -> Self {
                Self::from_i(unsafe { _mm_loadu_si128(buf.as_ptr() as *const __m128i) })
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

sse_int_buf!(i32, 4);
sse_int_buf!(u32, 4);
sse_int_buf!(i16, 8);
sse_int_buf!(u16, 8);

impl SseVec<f32> {
    #[inline(always)]
    fn to_buf(self) -> [f32; 4] {
        let mut buf = [0.0f32; 4];
        unsafe { _mm_storeu_ps(buf.as_mut_ptr(), self.ps()) };
        buf
    }
    #[inline(always)]
    fn from_buf(buf: [f32; 4]) -> Self {
        Self::from_ps(unsafe { _mm_loadu_ps(buf.as_ptr()) })
    }
    #[allow(dead_code)] // SSE2 builds round through the buffer, SSE4.1 in-register
    #[inline(always)]
    fn map_lanes(self, f: impl Fn(f32) -> f32) -> Self {
        let a = self.to_buf();
        Self::from_buf([f(a[0]), f(a[1]), f(a[2]), f(a[3])])
    }
}

impl SseVec<f64> {
    #[inline(always)]
    fn to_buf(self) -> [f64; 2] {
        let mut buf = [0.0f64; 2];
        unsafe { _mm_storeu_pd(buf.as_mut_ptr(), self.pd()) };
        buf
    }
    #[inline(always)]
    fn from_buf(buf: [f64; 2]) -> Self {
        Self::from_pd(unsafe { _mm_loadu_pd(buf.as_ptr()) })
    }
    #[allow(dead_code)]
    #[inline(always)]
    fn map_lanes(self, f: impl Fn(f64) -> f64) -> Self {
        let a = self.to_buf();
        Self::from_buf([f(a[0]), f(a[1])])
    }
}

// ============================================================================
// f32
// ============================================================================

impl LaneOps<f32> for SseVec<f32> {
    type Mask = SseMask<f32>;

    const LANES: usize = 4;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        Self::from_ps(unsafe { _mm_set1_ps(v) })
    }
    #[inline(always)]
    fn zero() -> Self {
        Self::from_ps(unsafe { _mm_setzero_ps() })
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        Self::from_ps(unsafe { _mm_load_ps(ptr) })
    }
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        Self::from_ps(unsafe { _mm_loadu_ps(ptr) })
    }
    #[inline(always)]
    unsafe fn load_streaming(ptr: *const f32) -> Self {
        // Load hint only; no float non-temporal load exists at this width.
        Self::from_ps(unsafe { _mm_load_ps(ptr) })
    }
    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        unsafe { _mm_store_ps(ptr, self.ps()) }
    }
    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut f32) {
        unsafe { _mm_storeu_ps(ptr, self.ps()) }
    }
    #[inline(always)]
    unsafe fn store_streaming(self, ptr: *mut f32) {
        unsafe { _mm_stream_ps(ptr, self.ps()) }
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> f32 {
        debug_assert!(lane < 4);
        self.to_buf()[lane]
    }
    #[inline(always)]
    fn insert(self, lane: usize, v: f32) -> Self {
        debug_assert!(lane < 4);
        let mut buf = self.to_buf();
        buf[lane] = v;
        Self::from_buf(buf)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::from_ps(unsafe { _mm_add_ps(self.ps(), rhs.ps()) })
    }
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::from_ps(unsafe { _mm_sub_ps(self.ps(), rhs.ps()) })
    }
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self::from_ps(unsafe { _mm_mul_ps(self.ps(), rhs.ps()) })
    }
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        Self::from_ps(unsafe { _mm_div_ps(self.ps(), rhs.ps()) })
    }
    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        // minps returns the second operand on NaN, same as the scalar lane.
        Self::from_ps(unsafe { _mm_min_ps(self.ps(), rhs.ps()) })
    }
    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_ps(unsafe { _mm_max_ps(self.ps(), rhs.ps()) })
    }

    #[inline(always)]
    fn cmp_eq(self, rhs: Self) -> SseMask<f32> {
        SseMask(unsafe { _mm_castps_si128(_mm_cmpeq_ps(self.ps(), rhs.ps())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_ne(self, rhs: Self) -> SseMask<f32> {
        SseMask(unsafe { _mm_castps_si128(_mm_cmpneq_ps(self.ps(), rhs.ps())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> SseMask<f32> {
        SseMask(unsafe { _mm_castps_si128(_mm_cmplt_ps(self.ps(), rhs.ps())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_le(self, rhs: Self) -> SseMask<f32> {
        SseMask(unsafe { _mm_castps_si128(_mm_cmple_ps(self.ps(), rhs.ps())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_gt(self, rhs: Self) -> SseMask<f32> {
        SseMask(unsafe { _mm_castps_si128(_mm_cmpgt_ps(self.ps(), rhs.ps())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_ge(self, rhs: Self) -> SseMask<f32> {
        SseMask(unsafe { _mm_castps_si128(_mm_cmpge_ps(self.ps(), rhs.ps())) }, PhantomData)
    }

    #[inline(always)]
    fn blend(mask: SseMask<f32>, if_true: Self, if_false: Self) -> Self {
        Self::from_i(select_si128(mask.0, if_true.i(), if_false.i()))
    }

    #[inline(always)]
    fn fused_multiply_add(self, mul: Self, add: Self) -> Self {
        #[cfg(lanewise_fma)]
        return Self::from_ps(unsafe { _mm_fmadd_ps(self.ps(), mul.ps(), add.ps()) });
        #[cfg(not(lanewise_fma))]
        return self.mul(mul).add(add);
    }
}

impl FloatLaneOps<f32> for SseVec<f32> {
    #[inline(always)]
    fn sqrt(self) -> Self {
        Self::from_ps(unsafe { _mm_sqrt_ps(self.ps()) })
    }
    #[inline(always)]
    fn reciprocal(self) -> Self {
        // rcpps: ~12 bit approximation, as documented on the trait.
        Self::from_ps(unsafe { _mm_rcp_ps(self.ps()) })
    }
    #[inline(always)]
    fn rsqrt(self) -> Self {
        Self::from_ps(unsafe { _mm_rsqrt_ps(self.ps()) })
    }
    #[inline(always)]
    fn round(self) -> Self {
        #[cfg(lanewise_sse41)]
        return Self::from_ps(unsafe {
            _mm_round_ps::<{ _MM_FROUND_TO_NEAREST_INT | _MM_FROUND_NO_EXC }>(self.ps())
        });
        #[cfg(not(lanewise_sse41))]
        return self.map_lanes(libm::rintf);
    }
    #[inline(always)]
    fn floor(self) -> Self {
        #[cfg(lanewise_sse41)]
        return Self::from_ps(unsafe { _mm_floor_ps(self.ps()) });
        #[cfg(not(lanewise_sse41))]
        return self.map_lanes(libm::floorf);
    }
    #[inline(always)]
    fn ceil(self) -> Self {
        #[cfg(lanewise_sse41)]
        return Self::from_ps(unsafe { _mm_ceil_ps(self.ps()) });
        #[cfg(not(lanewise_sse41))]
        return self.map_lanes(libm::ceilf);
    }
    #[inline(always)]
    fn trunc(self) -> Self {
        #[cfg(lanewise_sse41)]
        return Self::from_ps(unsafe {
            _mm_round_ps::<{ _MM_FROUND_TO_ZERO | _MM_FROUND_NO_EXC }>(self.ps())
        });
        #[cfg(not(lanewise_sse41))]
        return self.map_lanes(libm::truncf);
    }
    #[inline(always)]
    fn is_nan(self) -> SseMask<f32> {
        SseMask(
            unsafe { _mm_castps_si128(_mm_cmpunord_ps(self.ps(), self.ps())) },
            PhantomData,
        )
    }
    #[inline(always)]
    fn is_finite(self) -> SseMask<f32> {
        let magnitude = SignedLaneOps::abs(self);
        SseMask(
            unsafe {
                _mm_castps_si128(_mm_cmplt_ps(magnitude.ps(), _mm_set1_ps(f32::INFINITY)))
            },
            PhantomData,
        )
    }
    #[inline(always)]
    fn copy_sign(self, sign: Self) -> Self {
        let sign_bit = unsafe { _mm_set1_ps(-0.0) };
        Self::from_ps(unsafe {
            _mm_or_ps(
                _mm_andnot_ps(sign_bit, self.ps()),
                _mm_and_ps(sign_bit, sign.ps()),
            )
        })
    }
}

impl SignedLaneOps<f32> for SseVec<f32> {
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_ps(unsafe { _mm_xor_ps(self.ps(), _mm_set1_ps(-0.0)) })
    }
    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_ps(unsafe { _mm_andnot_ps(_mm_set1_ps(-0.0), self.ps()) })
    }
    #[inline(always)]
    fn is_negative(self) -> SseMask<f32> {
        // Broadcast the sign bit; a bit test, not an ordering.
        SseMask(unsafe { _mm_srai_epi32::<31>(self.i()) }, PhantomData)
    }
}

// ============================================================================
// f64
// ============================================================================

impl LaneOps<f64> for SseVec<f64> {
    type Mask = SseMask<f64>;

    const LANES: usize = 2;

    #[inline(always)]
    fn splat(v: f64) -> Self {
        Self::from_pd(unsafe { _mm_set1_pd(v) })
    }
    #[inline(always)]
    fn zero() -> Self {
        Self::from_pd(unsafe { _mm_setzero_pd() })
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f64) -> Self {
        Self::from_pd(unsafe { _mm_load_pd(ptr) })
    }
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f64) -> Self {
        Self::from_pd(unsafe { _mm_loadu_pd(ptr) })
    }
    #[inline(always)]
    unsafe fn load_streaming(ptr: *const f64) -> Self {
        Self::from_pd(unsafe { _mm_load_pd(ptr) })
    }
    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f64) {
        unsafe { _mm_store_pd(ptr, self.pd()) }
    }
    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut f64) {
        unsafe { _mm_storeu_pd(ptr, self.pd()) }
    }
    #[inline(always)]
    unsafe fn store_streaming(self, ptr: *mut f64) {
        unsafe { _mm_stream_pd(ptr, self.pd()) }
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> f64 {
        debug_assert!(lane < 2);
        self.to_buf()[lane]
    }
    #[inline(always)]
    fn insert(self, lane: usize, v: f64) -> Self {
        debug_assert!(lane < 2);
        let mut buf = self.to_buf();
        buf[lane] = v;
        Self::from_buf(buf)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::from_pd(unsafe { _mm_add_pd(self.pd(), rhs.pd()) })
    }
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::from_pd(unsafe { _mm_sub_pd(self.pd(), rhs.pd()) })
    }
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self::from_pd(unsafe { _mm_mul_pd(self.pd(), rhs.pd()) })
    }
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        Self::from_pd(unsafe { _mm_div_pd(self.pd(), rhs.pd()) })
    }
    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_pd(unsafe { _mm_min_pd(self.pd(), rhs.pd()) })
    }
    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_pd(unsafe { _mm_max_pd(self.pd(), rhs.pd()) })
    }

    #[inline(always)]
    fn cmp_eq(self, rhs: Self) -> SseMask<f64> {
        SseMask(unsafe { _mm_castpd_si128(_mm_cmpeq_pd(self.pd(), rhs.pd())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_ne(self, rhs: Self) -> SseMask<f64> {
        SseMask(unsafe { _mm_castpd_si128(_mm_cmpneq_pd(self.pd(), rhs.pd())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> SseMask<f64> {
        SseMask(unsafe { _mm_castpd_si128(_mm_cmplt_pd(self.pd(), rhs.pd())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_le(self, rhs: Self) -> SseMask<f64> {
        SseMask(unsafe { _mm_castpd_si128(_mm_cmple_pd(self.pd(), rhs.pd())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_gt(self, rhs: Self) -> SseMask<f64> {
        SseMask(unsafe { _mm_castpd_si128(_mm_cmpgt_pd(self.pd(), rhs.pd())) }, PhantomData)
    }
    #[inline(always)]
    fn cmp_ge(self, rhs: Self) -> SseMask<f64> {
        SseMask(unsafe { _mm_castpd_si128(_mm_cmpge_pd(self.pd(), rhs.pd())) }, PhantomData)
    }

    #[inline(always)]
    fn blend(mask: SseMask<f64>, if_true: Self, if_false: Self) -> Self {
        Self::from_i(select_si128(mask.0, if_true.i(), if_false.i()))
    }

    #[inline(always)]
    fn fused_multiply_add(self, mul: Self, add: Self) -> Self {
        #[cfg(lanewise_fma)]
        return Self::from_pd(unsafe { _mm_fmadd_pd(self.pd(), mul.pd(), add.pd()) });
        #[cfg(not(lanewise_fma))]
        return self.mul(mul).add(add);
    }
}

impl FloatLaneOps<f64> for SseVec<f64> {
    #[inline(always)]
    fn sqrt(self) -> Self {
        Self::from_pd(unsafe { _mm_sqrt_pd(self.pd()) })
    }
    #[inline(always)]
    fn reciprocal(self) -> Self {
        // No rcppd; the exact division is the fallback.
        Self::splat(1.0).div(self)
    }
    #[inline(always)]
    fn rsqrt(self) -> Self {
        Self::splat(1.0).div(self.sqrt())
    }
    #[inline(always)]
    fn round(self) -> Self {
        #[cfg(lanewise_sse41)]
        return Self::from_pd(unsafe {
            _mm_round_pd::<{ _MM_FROUND_TO_NEAREST_INT | _MM_FROUND_NO_EXC }>(self.pd())
        });
        #[cfg(not(lanewise_sse41))]
        return self.map_lanes(libm::rint);
    }
    #[inline(always)]
    fn floor(self) -> Self {
        #[cfg(lanewise_sse41)]
        return Self::from_pd(unsafe { _mm_floor_pd(self.pd()) });
        #[cfg(not(lanewise_sse41))]
        return self.map_lanes(libm::floor);
    }
    #[inline(always)]
    fn ceil(self) -> Self {
        #[cfg(lanewise_sse41)]
        return Self::from_pd(unsafe { _mm_ceil_pd(self.pd()) });
        #[cfg(not(lanewise_sse41))]
        return self.map_lanes(libm::ceil);
    }
    #[inline(always)]
    fn trunc(self) -> Self {
        #[cfg(lanewise_sse41)]
        return Self::from_pd(unsafe {
            _mm_round_pd::<{ _MM_FROUND_TO_ZERO | _MM_FROUND_NO_EXC }>(self.pd())
        });
        #[cfg(not(lanewise_sse41))]
        return self.map_lanes(libm::trunc);
    }
    #[inline(always)]
    fn is_nan(self) -> SseMask<f64> {
        SseMask(
            unsafe { _mm_castpd_si128(_mm_cmpunord_pd(self.pd(), self.pd())) },
            PhantomData,
        )
    }
    #[inline(always)]
    fn is_finite(self) -> SseMask<f64> {
        let magnitude = SignedLaneOps::abs(self);
        SseMask(
            unsafe {
                _mm_castpd_si128(_mm_cmplt_pd(magnitude.pd(), _mm_set1_pd(f64::INFINITY)))
            },
            PhantomData,
        )
    }
    #[inline(always)]
    fn copy_sign(self, sign: Self) -> Self {
        let sign_bit = unsafe { _mm_set1_pd(-0.0) };
        Self::from_pd(unsafe {
            _mm_or_pd(
                _mm_andnot_pd(sign_bit, self.pd()),
                _mm_and_pd(sign_bit, sign.pd()),
            )
        })
    }
}

impl SignedLaneOps<f64> for SseVec<f64> {
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_pd(unsafe { _mm_xor_pd(self.pd(), _mm_set1_pd(-0.0)) })
    }
    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_pd(unsafe { _mm_andnot_pd(_mm_set1_pd(-0.0), self.pd()) })
    }
    #[inline(always)]
    fn is_negative(self) -> SseMask<f64> {
        // Broadcast each qword's sign dword into both halves of the lane.
        let sign = unsafe { _mm_srai_epi32::<31>(self.i()) };
        SseMask(unsafe { _mm_shuffle_epi32::<0b11_11_01_01>(sign) }, PhantomData)
    }
}

// ============================================================================
// Integer elements
// ============================================================================

macro_rules! sse_int_lane_ops {
    ($elem:ty, lanes = $lanes:expr,
     splat = $splat:expr,
     add = $add:expr, sub = $sub:expr, mul = $mul:expr,
     min = $min:expr, max = $max:expr,
     cmp_eq = $cmp_eq:expr, cmp_lt = $cmp_lt:expr, cmp_gt = $cmp_gt:expr,
     shl = $shl:expr, shr = $shr:expr) => {
        impl LaneOps<$elem> for SseVec<$elem> {
            type Mask = SseMask<$elem>;

            const LANES: usize = $lanes;

            #[inline(always)]
            fn splat(v: $elem) -> Self {
                Self::from_i(($splat)(v))
            }
            #[inline(always)]
            fn zero() -> Self {
                Self::from_i(unsafe { _mm_setzero_si128() })
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const $elem) -> Self {
                Self::from_i(unsafe { _mm_load_si128(ptr as *const __m128i) })
            }
            #[inline(always)]
            unsafe fn load_unaligned(ptr: *const $elem) -> Self {
                Self::from_i(unsafe { _mm_loadu_si128(ptr as *const __m128i) })
            }
            #[inline(always)]
            unsafe fn load_streaming(ptr: *const $elem) -> Self {
                // Hint only; served by the ordinary aligned load.
                Self::from_i(unsafe { _mm_load_si128(ptr as *const __m128i) })
            }
            #[inline(always)]
            unsafe fn store_aligned(self, ptr: *mut $elem) {
                unsafe { _mm_store_si128(ptr as *mut __m128i, self.i()) }
            }
            #[inline(always)]
            unsafe fn store_unaligned(self, ptr: *mut $elem) {
                unsafe { _mm_storeu_si128(ptr as *mut __m128i, self.i()) }
            }
            #[inline(always)]
            unsafe fn store_streaming(self, ptr: *mut $elem) {
                unsafe { _mm_stream_si128(ptr as *mut __m128i, self.i()) }
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
            fn cmp_eq(self, rhs: Self) -> SseMask<$elem> {
                SseMask(($cmp_eq)(self.i(), rhs.i()), PhantomData)
            }
            #[inline(always)]
            fn cmp_ne(self, rhs: Self) -> SseMask<$elem> {
                SseMask(not_si128(($cmp_eq)(self.i(), rhs.i())), PhantomData)
            }
            #[inline(always)]
            fn cmp_lt(self, rhs: Self) -> SseMask<$elem> {
                SseMask(($cmp_lt)(self.i(), rhs.i()), PhantomData)
            }
            #[inline(always)]
            fn cmp_le(self, rhs: Self) -> SseMask<$elem> {
                SseMask(not_si128(($cmp_gt)(self.i(), rhs.i())), PhantomData)
            }
            #[inline(always)]
            fn cmp_gt(self, rhs: Self) -> SseMask<$elem> {
                SseMask(($cmp_gt)(self.i(), rhs.i()), PhantomData)
            }
            #[inline(always)]
            fn cmp_ge(self, rhs: Self) -> SseMask<$elem> {
                SseMask(not_si128(($cmp_lt)(self.i(), rhs.i())), PhantomData)
            }

            #[inline(always)]
            fn blend(mask: SseMask<$elem>, if_true: Self, if_false: Self) -> Self {
                Self::from_i(select_si128(mask.0, if_true.i(), if_false.i()))
            }

            #[inline(always)]
            fn fused_multiply_add(self, mul: Self, add: Self) -> Self {
                self.mul(mul).add(add)
            }
        }

        impl IntLaneOps<$elem> for SseVec<$elem> {
            #[inline(always)]
            fn and(self, rhs: Self) -> Self {
                Self::from_i(unsafe { _mm_and_si128(self.i(), rhs.i()) })
            }
            #[inline(always)]
            fn or(self, rhs: Self) -> Self {
                Self::from_i(unsafe { _mm_or_si128(self.i(), rhs.i()) })
            }
            #[inline(always)]
            fn xor(self, rhs: Self) -> Self {
                Self::from_i(unsafe { _mm_xor_si128(self.i(), rhs.i()) })
            }
            #[inline(always)]
            fn not(self) -> Self {
                Self::from_i(not_si128(self.i()))
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
                use crate::element::{IntegerElement as _, LaneElement as _};
                self.zip_lanes(counts, |v, c| v.lane_shl(c.to_lane_index() as u32))
            }
            #[inline(always)]
            fn shr_lanes(self, counts: Self) -> Self {
                use crate::element::{IntegerElement as _, LaneElement as _};
                self.zip_lanes(counts, |v, c| v.lane_shr(c.to_lane_index() as u32))
            }
            #[inline(always)]
            fn rem(self, rhs: Self) -> Self {
                use crate::element::IntegerElement as _;
                self.zip_lanes(rhs, <$elem>::lane_rem)
            }
        }
    };
}

sse_int_lane_ops!(
    i32, lanes = 4,
    splat = |v: i32| unsafe { _mm_set1_epi32(v) },
    add = |a, b| unsafe { _mm_add_epi32(a, b) },
    sub = |a, b| unsafe { _mm_sub_epi32(a, b) },
    mul = mullo_epi32,
    min = min_epi32,
    max = max_epi32,
    cmp_eq = |a, b| unsafe { _mm_cmpeq_epi32(a, b) },
    cmp_lt = |a, b| unsafe { _mm_cmplt_epi32(a, b) },
    cmp_gt = |a, b| unsafe { _mm_cmpgt_epi32(a, b) },
    shl = |v, c: u32| unsafe { _mm_sll_epi32(v, _mm_cvtsi32_si128(c as i32)) },
    shr = |v, c: u32| unsafe { _mm_sra_epi32(v, _mm_cvtsi32_si128(c as i32)) }
);

sse_int_lane_ops!(
    u32, lanes = 4,
    splat = |v: u32| unsafe { _mm_set1_epi32(v as i32) },
    add = |a, b| unsafe { _mm_add_epi32(a, b) },
    sub = |a, b| unsafe { _mm_sub_epi32(a, b) },
    mul = mullo_epi32,
    min = min_epu32,
    max = max_epu32,
    cmp_eq = |a, b| unsafe { _mm_cmpeq_epi32(a, b) },
    cmp_lt = |a, b| unsafe { _mm_cmpgt_epi32(flip_sign_epi32(b), flip_sign_epi32(a)) },
    cmp_gt = |a, b| unsafe { _mm_cmpgt_epi32(flip_sign_epi32(a), flip_sign_epi32(b)) },
    shl = |v, c: u32| unsafe { _mm_sll_epi32(v, _mm_cvtsi32_si128(c as i32)) },
    shr = |v, c: u32| unsafe { _mm_srl_epi32(v, _mm_cvtsi32_si128(c as i32)) }
);

sse_int_lane_ops!(
    i16, lanes = 8,
    splat = |v: i16| unsafe { _mm_set1_epi16(v) },
    add = |a, b| unsafe { _mm_add_epi16(a, b) },
    sub = |a, b| unsafe { _mm_sub_epi16(a, b) },
    mul = |a, b| unsafe { _mm_mullo_epi16(a, b) },
    min = |a, b| unsafe { _mm_min_epi16(a, b) },
    max = |a, b| unsafe { _mm_max_epi16(a, b) },
    cmp_eq = |a, b| unsafe { _mm_cmpeq_epi16(a, b) },
    cmp_lt = |a, b| unsafe { _mm_cmplt_epi16(a, b) },
    cmp_gt = |a, b| unsafe { _mm_cmpgt_epi16(a, b) },
    shl = |v, c: u32| unsafe { _mm_sll_epi16(v, _mm_cvtsi32_si128(c as i32)) },
    shr = |v, c: u32| unsafe { _mm_sra_epi16(v, _mm_cvtsi32_si128(c as i32)) }
);

sse_int_lane_ops!(
    u16, lanes = 8,
    splat = |v: u16| unsafe { _mm_set1_epi16(v as i16) },
    add = |a, b| unsafe { _mm_add_epi16(a, b) },
    sub = |a, b| unsafe { _mm_sub_epi16(a, b) },
    mul = |a, b| unsafe { _mm_mullo_epi16(a, b) },
    min = min_epu16,
    max = max_epu16,
    cmp_eq = |a, b| unsafe { _mm_cmpeq_epi16(a, b) },
    cmp_lt = |a, b| unsafe { _mm_cmpgt_epi16(flip_sign_epi16(b), flip_sign_epi16(a)) },
    cmp_gt = |a, b| unsafe { _mm_cmpgt_epi16(flip_sign_epi16(a), flip_sign_epi16(b)) },
    shl = |v, c: u32| unsafe { _mm_sll_epi16(v, _mm_cvtsi32_si128(c as i32)) },
    shr = |v, c: u32| unsafe { _mm_srl_epi16(v, _mm_cvtsi32_si128(c as i32)) }
);

impl SignedLaneOps<i32> for SseVec<i32> {
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_i(unsafe { _mm_sub_epi32(_mm_setzero_si128(), self.i()) })
    }
    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_i(abs_epi32(self.i()))
    }
    #[inline(always)]
    fn is_negative(self) -> SseMask<i32> {
        SseMask(unsafe { _mm_srai_epi32::<31>(self.i()) }, PhantomData)
    }
}

impl SignedLaneOps<i16> for SseVec<i16> {
    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_i(unsafe { _mm_sub_epi16(_mm_setzero_si128(), self.i()) })
    }
    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_i(abs_epi16(self.i()))
    }
    #[inline(always)]
    fn is_negative(self) -> SseMask<i16> {
        SseMask(unsafe { _mm_srai_epi16::<15>(self.i()) }, PhantomData)
    }
}

// ============================================================================
// Masks
// ============================================================================

macro_rules! sse_mask {
    ($elem:ty, lanes = $lanes:expr, to_bits = $to_bits:expr) => {
        impl MaskOps for SseMask<$elem> {
            const LANES: usize = $lanes;

            #[inline(always)]
            fn splat(v: bool) -> Self {
                SseMask(
                    if v { all_ones() } else { unsafe { _mm_setzero_si128() } },
                    PhantomData,
                )
            }
            #[inline(always)]
            fn to_bits(self) -> u64 {
                ($to_bits)(self.0)
            }
            #[inline(always)]
            fn and(self, rhs: Self) -> Self {
                SseMask(unsafe { _mm_and_si128(self.0, rhs.0) }, PhantomData)
            }
            #[inline(always)]
            fn or(self, rhs: Self) -> Self {
                SseMask(unsafe { _mm_or_si128(self.0, rhs.0) }, PhantomData)
            }
            #[inline(always)]
            fn xor(self, rhs: Self) -> Self {
                SseMask(unsafe { _mm_xor_si128(self.0, rhs.0) }, PhantomData)
            }
            #[inline(always)]
            fn not(self) -> Self {
                SseMask(not_si128(self.0), PhantomData)
            }
        }
    };
}

#[inline(always)]
fn movemask_dwords(m: __m128i) -> u64 {
    unsafe { _mm_movemask_ps(_mm_castsi128_ps(m)) as u64 }
}

#[inline(always)]
fn movemask_qwords(m: __m128i) -> u64 {
    unsafe { _mm_movemask_pd(_mm_castsi128_pd(m)) as u64 }
}

#[inline(always)]
fn movemask_words(m: __m128i) -> u64 {
    // Pack the 16-bit lanes to bytes first; the lanes are saturated to
    // 0 or 0xFF because a mask lane is all-ones or all-zeros.
    unsafe { (_mm_movemask_epi8(_mm_packs_epi16(m, _mm_setzero_si128())) & 0xFF) as u64 }
}

sse_mask!(f32, lanes = 4, to_bits = movemask_dwords);
sse_mask!(i32, lanes = 4, to_bits = movemask_dwords);
sse_mask!(u32, lanes = 4, to_bits = movemask_dwords);
sse_mask!(f64, lanes = 2, to_bits = movemask_qwords);
sse_mask!(i16, lanes = 8, to_bits = movemask_words);
sse_mask!(u16, lanes = 8, to_bits = movemask_words);

// ============================================================================
// Casts
// ============================================================================

impl ConvertFrom<SseVec<f32>> for SseVec<i32> {
    /// Truncates toward zero (`cvttps2dq`); out-of-range lanes become
    /// `i32::MIN`.
    #[inline(always)]
    fn convert_from(src: SseVec<f32>) -> Self {
        Self::from_i(unsafe { _mm_cvttps_epi32(src.ps()) })
    }
}

impl ConvertFrom<SseVec<i32>> for SseVec<f32> {
    #[inline(always)]
    fn convert_from(src: SseVec<i32>) -> Self {
        Self::from_ps(unsafe { _mm_cvtepi32_ps(src.i()) })
    }
}

impl ConvertFrom<SseVec<f64>> for SseVec<f32> {
    /// Converts both `f64` lanes into the low two lanes; the high lanes are
    /// zero.
    #[inline(always)]
    fn convert_from(src: SseVec<f64>) -> Self {
        Self::from_ps(unsafe { _mm_cvtpd_ps(src.pd()) })
    }
}

impl ConvertFrom<SseVec<f32>> for SseVec<f64> {
    /// Converts the low two `f32` lanes.
    #[inline(always)]
    fn convert_from(src: SseVec<f32>) -> Self {
        Self::from_pd(unsafe { _mm_cvtps_pd(src.ps()) })
    }
}

impl ConvertFrom<SseVec<f64>> for SseVec<i32> {
    /// Truncates toward zero into the low two lanes; the high lanes are zero.
    #[inline(always)]
    fn convert_from(src: SseVec<f64>) -> Self {
        Self::from_i(unsafe { _mm_cvttpd_epi32(src.pd()) })
    }
}

impl ConvertFrom<SseVec<i32>> for SseVec<f64> {
    /// Converts the low two lanes.
    #[inline(always)]
    fn convert_from(src: SseVec<i32>) -> Self {
        Self::from_pd(unsafe { _mm_cvtepi32_pd(src.i()) })
    }
}

macro_rules! sse_cast_bits {
    ($src:ty => $dst:ty) => {
        impl ConvertFrom<SseVec<$src>> for SseVec<$dst> {
            /// Same-width reinterpretation, modulo 2^n.
            #[inline(always)]
            fn convert_from(src: SseVec<$src>) -> Self {
                Self::from_i(src.i())
            }
        }
    };
}

sse_cast_bits!(i32 => u32);
sse_cast_bits!(u32 => i32);
sse_cast_bits!(i16 => u16);
sse_cast_bits!(u16 => i16);

macro_rules! sse_cast_lanewise {
    ($src:ty, $src_lanes:expr => $dst:ty, $dst_lanes:expr) => {
        impl ConvertFrom<SseVec<$src>> for SseVec<$dst> {
            #[inline(always)]
            fn convert_from(src: SseVec<$src>) -> Self {
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

// No u32 conversion unit below AVX-512; these go through lane buffers.
sse_cast_lanewise!(f32, 4 => u32, 4);
sse_cast_lanewise!(u32, 4 => f32, 4);
