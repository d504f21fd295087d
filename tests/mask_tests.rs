//! Mask construction, boolean algebra and lane iteration.

use lanewise::backend::scalar::Scalar;
use lanewise::{Mask, Vector};

fn even_mask() -> Mask<i32> {
    let v = Vector::<i32>::index_sequence();
    (v % Vector::splat(2)).cmp_eq(Vector::zero())
}

#[test]
fn comparisons_set_the_expected_lanes() {
    let v = Vector::<i32>::index_sequence();
    let m = v.cmp_lt(Vector::splat(2));
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(m.test(lane), lane < 2);
    }
    assert_eq!(m.count(), 2.min(Vector::<i32>::SIZE));
}

#[test]
fn splat_full_and_empty() {
    let full = Mask::<f32>::splat(true);
    assert!(full.is_full());
    assert!(!full.is_empty());
    assert!(!full.is_mix());
    assert_eq!(full.count(), Mask::<f32>::SIZE);

    let empty = Mask::<f32>::splat(false);
    assert!(empty.is_empty());
    assert!(!empty.is_full());
    assert!(!empty.is_mix());
    assert_eq!(empty.count(), 0);
}

#[test]
fn is_mix_requires_both_kinds_of_lane() {
    if Mask::<i32>::SIZE < 2 {
        return;
    }
    let m = even_mask();
    assert!(m.is_mix());
    assert!(!Mask::<i32>::splat(true).is_mix());
}

#[test]
fn to_bits_puts_lane_zero_in_bit_zero() {
    let v = Vector::<i32>::index_sequence();
    let m = v.cmp_eq(Vector::zero());
    assert_eq!(m.to_bits(), 1);

    let all = Mask::<i32>::splat(true);
    assert_eq!(all.to_bits(), u64::MAX >> (64 - Mask::<i32>::SIZE as u32));
}

#[test]
fn boolean_algebra_is_lane_wise() {
    let a = even_mask();
    let b = Vector::<i32>::index_sequence().cmp_lt(Vector::splat(2));
    assert_eq!((a & b).to_bits(), a.to_bits() & b.to_bits());
    assert_eq!((a | b).to_bits(), a.to_bits() | b.to_bits());
    assert_eq!((a ^ b).to_bits(), a.to_bits() ^ b.to_bits());

    let width_mask = u64::MAX >> (64 - Mask::<i32>::SIZE as u32);
    assert_eq!((!a).to_bits(), !a.to_bits() & width_mask);
}

#[test]
fn de_morgan_holds() {
    let a = even_mask();
    let b = Vector::<i32>::index_sequence().cmp_ge(Vector::splat(1));
    assert_eq!(!(a & b), !a | !b);
    assert_eq!(!(a | b), !a & !b);
}

#[test]
fn negating_a_comparison_matches_its_complement() {
    let v = Vector::<i32>::index_sequence();
    let limit = Vector::splat(2);
    assert_eq!(!v.cmp_lt(limit), v.cmp_ge(limit));
    assert_eq!(!v.cmp_eq(limit), v.cmp_ne(limit));
}

#[test]
fn set_lanes_iterates_ascending() {
    let m = even_mask();
    let lanes: Vec<usize> = m.set_lanes().collect();
    let expected: Vec<usize> = (0..Mask::<i32>::SIZE).filter(|l| l % 2 == 0).collect();
    assert_eq!(lanes, expected);
    assert_eq!(m.set_lanes().len(), expected.len());
}

#[test]
fn set_lanes_on_an_empty_mask_yields_nothing() {
    assert_eq!(Mask::<f64>::splat(false).set_lanes().next(), None);
}

#[test]
fn masks_compare_by_lane_content() {
    let v = Vector::<u32>::index_sequence();
    let a = v.cmp_lt(Vector::splat(3));
    let b = v.cmp_le(Vector::splat(2));
    assert_eq!(a, b);
    if Mask::<u32>::SIZE > 1 {
        assert_ne!(a, Mask::splat(false));
    }
}

#[test]
fn mask_debug_prints_one_digit_per_lane() {
    let s = format!("{:?}", Mask::<i32, Scalar>::splat(true));
    assert_eq!(s, "Mask[1]");
}

#[test]
fn float_comparison_with_nan_is_all_false() {
    let mut v = Vector::<f32>::splat(1.0);
    v.set_qnan();
    let other = Vector::<f32>::splat(1.0);
    assert!(v.cmp_eq(other).is_empty());
    assert!(v.cmp_lt(other).is_empty());
    assert!(v.cmp_ge(other).is_empty());
    // The negated forms are unordered and therefore true.
    assert!(v.cmp_ne(other).is_full());
}

#[test]
fn scalar_masks_behave_like_bools() {
    let m = Mask::<i32, Scalar>::splat(true);
    assert_eq!(m.count(), 1);
    assert!(m.test(0));
    assert!((m ^ m).is_empty());
}
