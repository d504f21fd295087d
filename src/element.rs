//! Lane element types and their scalar semantics.
//!
//! The element set is closed: `f32`, `f64`, `i32`, `u32`, `i16`, `u16`.
//! [`LaneElement`] carries the per-lane scalar behavior every backend must
//! reproduce (wrapping arithmetic for integers, IEEE for floats); the
//! category traits [`IntegerElement`], [`FloatElement`] and [`SignedElement`]
//! gate the operators that only exist for some elements, so e.g. a bitwise
//! operation on a float vector is rejected at compile time rather than at
//! runtime.

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A type usable as the lane element of a vector.
///
/// Sealed; the six implementations in this module are the complete set.
pub trait LaneElement:
    sealed::Sealed + Copy + PartialEq + PartialOrd + core::fmt::Debug + Send + Sync + 'static
{
    /// Element type of the index vector used with gather and scatter.
    /// Chosen so the index vector has the same lane count as `Self`.
    type Index: IntegerElement;

    /// The additive identity.
    const ZERO: Self;
    /// The multiplicative identity.
    const ONE: Self;
    /// Least representable value; identity of the `max` reduction.
    const LEAST: Self;
    /// Greatest representable value; identity of the `min` reduction.
    const GREATEST: Self;

    /// Converts a small integer literal into the element.
    fn from_int(v: i32) -> Self;
    /// Reinterprets the element as a lane index. Meaningful for
    /// [`Self::Index`] elements; defined for all so generic code stays total.
    fn to_lane_index(self) -> usize;
    /// Maps one 32-bit draw of the generator into a lane value. Floats land
    /// in `[0, 1)`; integers take the raw (truncated) bits.
    fn from_random_bits(bits: u32) -> Self;

    /// Lane addition: wrapping for integers, IEEE for floats.
    fn lane_add(self, rhs: Self) -> Self;
    /// Lane subtraction: wrapping for integers, IEEE for floats.
    fn lane_sub(self, rhs: Self) -> Self;
    /// Lane multiplication: wrapping for integers, IEEE for floats.
    fn lane_mul(self, rhs: Self) -> Self;
    /// Lane division. Integer division by zero is a caller-contract
    /// violation and panics, as the synthesized SIMD path does.
    fn lane_div(self, rhs: Self) -> Self;
    /// Lane minimum. For floats, returns `rhs` when `self` is NaN
    /// (the `minps` operand-order convention).
    fn lane_min(self, rhs: Self) -> Self;
    /// Lane maximum, with the same NaN convention as [`lane_min`](Self::lane_min).
    fn lane_max(self, rhs: Self) -> Self;
}

/// Integral lane elements: bitwise logic, shifts and remainder exist.
pub trait IntegerElement: LaneElement {
    fn lane_and(self, rhs: Self) -> Self;
    fn lane_or(self, rhs: Self) -> Self;
    fn lane_xor(self, rhs: Self) -> Self;
    fn lane_not(self) -> Self;
    /// Left shift; shift counts at or beyond the lane width produce zero,
    /// matching the SIMD shift instructions rather than the scalar operator.
    fn lane_shl(self, count: u32) -> Self;
    /// Right shift: logical for unsigned elements, arithmetic for signed.
    /// Counts at or beyond the lane width saturate the same way hardware does
    /// (zero, or all sign bits).
    fn lane_shr(self, count: u32) -> Self;
    /// Lane remainder. Division by zero panics, as with
    /// [`lane_div`](LaneElement::lane_div).
    fn lane_rem(self, rhs: Self) -> Self;
    /// Lane width in bits.
    const BITS: u32;
}

/// Floating-point lane elements.
pub trait FloatElement: SignedElement {
    /// A quiet NaN, for `set_qnan`.
    const QNAN: Self;

    fn lane_sqrt(self) -> Self;
    /// Rounds to nearest, ties to even.
    fn lane_round(self) -> Self;
    fn lane_floor(self) -> Self;
    fn lane_ceil(self) -> Self;
    fn lane_trunc(self) -> Self;
    /// `1 / self`. Backends may substitute the ISA's approximate reciprocal
    /// for `f32`; the scalar semantics are exact.
    fn lane_recip(self) -> Self;
    /// `1 / sqrt(self)`, with the same approximation note as
    /// [`lane_recip`](Self::lane_recip).
    fn lane_rsqrt(self) -> Self;
    fn lane_is_nan(self) -> bool;
    fn lane_is_finite(self) -> bool;
    /// `self` with the sign bit of `sign`.
    fn lane_copy_sign(self, sign: Self) -> Self;
}

/// Lane elements with a sign: negation, absolute value, sign test.
pub trait SignedElement: LaneElement {
    /// Wrapping negation for integers, IEEE negation for floats.
    fn lane_neg(self) -> Self;
    /// Wrapping absolute value for integers, sign-bit clear for floats.
    fn lane_abs(self) -> Self;
    /// True when the sign bit is set. For floats this includes `-0.0`
    /// and negative NaNs (a pure bit test, not an ordering).
    fn lane_is_negative(self) -> bool;
}

// ============================================================================
// Implicit conversions
// ============================================================================

/// Marks the value-preserving reinterpretations that convert implicitly
/// between vectors: same-width signed/unsigned pairs, modulo 2^n.
/// Every other element pair requires the explicit cast.
pub trait ImplicitFrom<Src: LaneElement>: LaneElement {
    fn implicit_from(src: Src) -> Self;
}

macro_rules! implicit_pair {
    ($a:ty, $b:ty) => {
        impl ImplicitFrom<$a> for $b {
            #[inline(always)]
            fn implicit_from(src: $a) -> $b {
                src as $b
            }
        }
        impl ImplicitFrom<$b> for $a {
            #[inline(always)]
            fn implicit_from(src: $b) -> $a {
                src as $a
            }
        }
    };
}

implicit_pair!(i32, u32);
implicit_pair!(i16, u16);

// ============================================================================
// Element implementations
// ============================================================================

macro_rules! int_element {
    ($ty:ty, $index:ty, $bits:expr) => {
        impl sealed::Sealed for $ty {}

        impl LaneElement for $ty {
            type Index = $index;

            const ZERO: $ty = 0;
            const ONE: $ty = 1;
            const LEAST: $ty = <$ty>::MIN;
            const GREATEST: $ty = <$ty>::MAX;

            #[inline(always)]
            fn from_int(v: i32) -> $ty {
                v as $ty
            }
            #[inline(always)]
            fn to_lane_index(self) -> usize {
                self as usize
            }
            #[inline(always)]
            fn from_random_bits(bits: u32) -> $ty {
                bits as $ty
            }

            #[inline(always)]
            fn lane_add(self, rhs: $ty) -> $ty {
                self.wrapping_add(rhs)
            }
            #[inline(always)]
            fn lane_sub(self, rhs: $ty) -> $ty {
                self.wrapping_sub(rhs)
            }
            #[inline(always)]
            fn lane_mul(self, rhs: $ty) -> $ty {
                self.wrapping_mul(rhs)
            }
            #[inline(always)]
            fn lane_div(self, rhs: $ty) -> $ty {
                self.wrapping_div(rhs)
            }
            #[inline(always)]
            fn lane_min(self, rhs: $ty) -> $ty {
                if rhs < self {
                    rhs
                } else {
                    self
                }
            }
            #[inline(always)]
            fn lane_max(self, rhs: $ty) -> $ty {
                if rhs > self {
                    rhs
                } else {
                    self
                }
            }
        }

        impl IntegerElement for $ty {
            const BITS: u32 = $bits;

            #[inline(always)]
            fn lane_and(self, rhs: $ty) -> $ty {
                self & rhs
            }
            #[inline(always)]
            fn lane_or(self, rhs: $ty) -> $ty {
                self | rhs
            }
            #[inline(always)]
            fn lane_xor(self, rhs: $ty) -> $ty {
                self ^ rhs
            }
            #[inline(always)]
            fn lane_not(self) -> $ty {
                !self
            }
            #[inline(always)]
            fn lane_shl(self, count: u32) -> $ty {
                if count >= $bits {
                    0
                } else {
                    self << count
                }
            }
            #[inline(always)]
            fn lane_shr(self, count: u32) -> $ty {
                if count >= $bits {
                    // psrl* drains to zero; psra* fills with the sign bit.
                    if <$ty>::MIN == 0 {
                        0
                    } else {
                        self >> ($bits - 1)
                    }
                } else {
                    self >> count
                }
            }
            #[inline(always)]
            fn lane_rem(self, rhs: $ty) -> $ty {
                self.wrapping_rem(rhs)
            }
        }
    };
}

int_element!(i32, i32, 32);
int_element!(u32, i32, 32);
int_element!(i16, u16, 16);
int_element!(u16, u16, 16);

macro_rules! signed_int_element {
    ($ty:ty) => {
        impl SignedElement for $ty {
            #[inline(always)]
            fn lane_neg(self) -> $ty {
                self.wrapping_neg()
            }
            #[inline(always)]
            fn lane_abs(self) -> $ty {
                self.wrapping_abs()
            }
            #[inline(always)]
            fn lane_is_negative(self) -> bool {
                self < 0
            }
        }
    };
}

signed_int_element!(i32);
signed_int_element!(i16);

macro_rules! float_element {
    ($ty:ty, $index:ty, $bits_ty:ty, $sign_mask:expr,
     sqrt = $sqrt:path, floor = $floor:path, ceil = $ceil:path,
     rint = $rint:path, trunc = $trunc:path) => {
        impl sealed::Sealed for $ty {}

        impl LaneElement for $ty {
            type Index = $index;

            const ZERO: $ty = 0.0;
            const ONE: $ty = 1.0;
            const LEAST: $ty = <$ty>::NEG_INFINITY;
            const GREATEST: $ty = <$ty>::INFINITY;

            #[inline(always)]
            fn from_int(v: i32) -> $ty {
                v as $ty
            }
            #[inline(always)]
            fn to_lane_index(self) -> usize {
                self as usize
            }
            #[inline(always)]
            fn from_random_bits(bits: u32) -> $ty {
                // Spread the draw over the high mantissa bits of a value in
                // [1, 2), then shift down to [0, 1).
                let one = <$ty>::ONE.to_bits();
                let mantissa_bits = <$ty>::MANTISSA_DIGITS - 1;
                let spread = (bits as $bits_ty) << (mantissa_bits.saturating_sub(32));
                let mantissa_mask = ((1 as $bits_ty) << mantissa_bits) - 1;
                <$ty>::from_bits(one | (spread & mantissa_mask)) - 1.0
            }

            #[inline(always)]
            fn lane_add(self, rhs: $ty) -> $ty {
                self + rhs
            }
            #[inline(always)]
            fn lane_sub(self, rhs: $ty) -> $ty {
                self - rhs
            }
            #[inline(always)]
            fn lane_mul(self, rhs: $ty) -> $ty {
                self * rhs
            }
            #[inline(always)]
            fn lane_div(self, rhs: $ty) -> $ty {
                self / rhs
            }
            #[inline(always)]
            fn lane_min(self, rhs: $ty) -> $ty {
                // minps semantics: the second operand wins on NaN.
                if rhs < self {
                    rhs
                } else if self < rhs {
                    self
                } else if self == rhs {
                    self
                } else {
                    rhs
                }
            }
            #[inline(always)]
            fn lane_max(self, rhs: $ty) -> $ty {
                if rhs > self {
                    rhs
                } else if self > rhs {
                    self
                } else if self == rhs {
                    self
                } else {
                    rhs
                }
            }
        }

        impl SignedElement for $ty {
            #[inline(always)]
            fn lane_neg(self) -> $ty {
                -self
            }
            #[inline(always)]
            fn lane_abs(self) -> $ty {
                <$ty>::from_bits(self.to_bits() & !$sign_mask)
            }
            #[inline(always)]
            fn lane_is_negative(self) -> bool {
                self.to_bits() & $sign_mask != 0
            }
        }

        impl FloatElement for $ty {
            const QNAN: $ty = <$ty>::NAN;

            #[inline(always)]
            fn lane_sqrt(self) -> $ty {
                $sqrt(self)
            }
            #[inline(always)]
            fn lane_round(self) -> $ty {
                $rint(self)
            }
            #[inline(always)]
            fn lane_floor(self) -> $ty {
                $floor(self)
            }
            #[inline(always)]
            fn lane_ceil(self) -> $ty {
                $ceil(self)
            }
            #[inline(always)]
            fn lane_trunc(self) -> $ty {
                $trunc(self)
            }
            #[inline(always)]
            fn lane_recip(self) -> $ty {
                1.0 / self
            }
            #[inline(always)]
            fn lane_rsqrt(self) -> $ty {
                1.0 / $sqrt(self)
            }
            #[inline(always)]
            fn lane_is_nan(self) -> bool {
                self != self
            }
            #[inline(always)]
            fn lane_is_finite(self) -> bool {
                self.is_finite()
            }
            #[inline(always)]
            fn lane_copy_sign(self, sign: $ty) -> $ty {
                <$ty>::from_bits(
                    (self.to_bits() & !$sign_mask) | (sign.to_bits() & $sign_mask),
                )
            }
        }
    };
}

float_element!(
    f32, i32, u32, 0x8000_0000u32,
    sqrt = libm::sqrtf, floor = libm::floorf, ceil = libm::ceilf,
    rint = libm::rintf, trunc = libm::truncf
);
float_element!(
    f64, i32, u64, 0x8000_0000_0000_0000u64,
    sqrt = libm::sqrt, floor = libm::floor, ceil = libm::ceil,
    rint = libm::rint, trunc = libm::trunc
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(i32::MAX.lane_add(1), i32::MIN);
        assert_eq!(0u16.lane_sub(1), u16::MAX);
        assert_eq!(i16::MIN.lane_abs(), i16::MIN);
    }

    #[test]
    fn shifts_saturate_like_hardware() {
        assert_eq!(1u32.lane_shl(32), 0);
        assert_eq!((-8i32).lane_shr(40), -1);
        assert_eq!(0x8000u16.lane_shr(3), 0x1000);
    }

    #[test]
    fn float_sign_ops_are_bit_exact() {
        assert!((-0.0f32).lane_is_negative());
        assert!(!0.0f32.lane_is_negative());
        assert_eq!(3.0f64.lane_copy_sign(-1.0), -3.0);
        assert_eq!((-2.5f32).lane_abs(), 2.5);
    }

    #[test]
    fn round_ties_to_even() {
        assert_eq!(0.5f32.lane_round(), 0.0);
        assert_eq!(1.5f32.lane_round(), 2.0);
        assert_eq!(2.5f64.lane_round(), 2.0);
        assert_eq!((-0.5f64).lane_round(), 0.0);
    }

    #[test]
    fn random_bits_map_floats_into_unit_interval() {
        for bits in [0u32, 1, 0x8000_0000, u32::MAX] {
            let f = f32::from_random_bits(bits);
            assert!((0.0..1.0).contains(&f), "{bits:#x} -> {f}");
            let d = f64::from_random_bits(bits);
            assert!((0.0..1.0).contains(&d), "{bits:#x} -> {d}");
        }
    }

    #[test]
    fn min_max_prefer_the_non_nan_operand_on_the_right() {
        assert_eq!(f32::NAN.lane_min(3.0), 3.0);
        assert_eq!(f32::NAN.lane_max(3.0), 3.0);
        assert!(3.0f32.lane_min(f32::NAN).is_nan());
    }
}
