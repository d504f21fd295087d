//! Masked writes: the proxy form and the tag-dispatched free functions.

use lanewise::{
    conditional_assign, conditional_update, Assign, Mask, MinusAssign, PlusAssign,
    PostDecrement, PostIncrement, PreDecrement, PreIncrement, Vector, XorAssign,
};

fn low_half_mask() -> Mask<i32> {
    Vector::<i32>::index_sequence().cmp_lt(Vector::splat((Vector::<i32>::SIZE / 2) as i32))
}

#[test]
fn masked_assign_touches_selected_lanes_only() {
    let mask = low_half_mask();
    let mut v = Vector::<i32>::splat(1);
    v.masked(mask).assign(Vector::splat(9));
    for lane in 0..Vector::<i32>::SIZE {
        let expected = if mask.test(lane) { 9 } else { 1 };
        assert_eq!(v.extract(lane), expected);
    }
}

#[test]
fn masked_compound_arithmetic() {
    let mask = low_half_mask();
    let step = Vector::<i32>::splat(10);

    let mut v = Vector::<i32>::index_sequence();
    let mut proxy = v.masked(mask);
    proxy += step;
    for lane in 0..Vector::<i32>::SIZE {
        let expected = lane as i32 + if mask.test(lane) { 10 } else { 0 };
        assert_eq!(v.extract(lane), expected);
    }

    let mut w = Vector::<i32>::splat(20);
    let mut proxy = w.masked(mask);
    proxy -= step;
    let mut proxy = w.masked(mask);
    proxy *= Vector::splat(2);
    let mut proxy = w.masked(mask);
    proxy /= Vector::splat(4);
    for lane in 0..Vector::<i32>::SIZE {
        let expected = if mask.test(lane) { 5 } else { 20 };
        assert_eq!(w.extract(lane), expected);
    }
}

#[test]
fn masked_bitwise_and_shifts() {
    let mask = low_half_mask();
    let mut v = Vector::<i32>::splat(0b0110);
    let mut proxy = v.masked(mask);
    proxy ^= Vector::splat(0b0011);
    let mut proxy = v.masked(mask);
    proxy &= Vector::splat(0b0111);
    let mut proxy = v.masked(mask);
    proxy |= Vector::splat(0b1000);
    for lane in 0..Vector::<i32>::SIZE {
        let expected = if mask.test(lane) { 0b1101 } else { 0b0110 };
        assert_eq!(v.extract(lane), expected);
    }

    let mut w = Vector::<u32>::splat(4);
    let mut proxy = w.masked(Mask::splat(true));
    proxy <<= 1;
    assert_eq!(w.extract(0), 8);
    let mut proxy = w.masked(Mask::splat(false));
    proxy >>= 3;
    assert_eq!(w.extract(0), 8);
}

#[test]
fn masked_remainder() {
    let mask = low_half_mask();
    let mut v = Vector::<i32>::splat(7);
    let mut proxy = v.masked(mask);
    proxy %= Vector::splat(4);
    for lane in 0..Vector::<i32>::SIZE {
        let expected = if mask.test(lane) { 3 } else { 7 };
        assert_eq!(v.extract(lane), expected);
    }
}

#[test]
fn masked_per_lane_shifts() {
    let size = Vector::<u32>::SIZE;
    let idx = Vector::<u32>::index_sequence();
    let mask = idx.cmp_lt(Vector::splat((size / 2) as u32));
    let mut v = Vector::<u32>::splat(1);
    v.masked(mask).shl_lanes_assign(idx);
    for lane in 0..size {
        let expected = if lane < size / 2 { 1u32 << lane } else { 1 };
        assert_eq!(v.extract(lane), expected);
    }
}

#[test]
fn proxy_increment_conventions() {
    let mask = Mask::<i32>::splat(true);

    let mut v = Vector::<i32>::splat(5);
    let pre = v.masked(mask).pre_increment();
    assert_eq!(pre.extract(0), 6);
    assert_eq!(v.extract(0), 6);

    let post = v.masked(mask).post_increment();
    assert_eq!(post.extract(0), 6);
    assert_eq!(v.extract(0), 7);

    let pre_d = v.masked(mask).pre_decrement();
    assert_eq!(pre_d.extract(0), 6);
    let post_d = v.masked(mask).post_decrement();
    assert_eq!(post_d.extract(0), 6);
    assert_eq!(v.extract(0), 5);
}

#[test]
fn partial_mask_increment_skips_unselected_lanes() {
    let mask = low_half_mask();
    let mut v = Vector::<i32>::zero();
    v.masked(mask).pre_increment();
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(v.extract(lane), i32::from(mask.test(lane)));
    }
}

#[test]
fn partial_mask_pre_increment_returns_the_merged_vector() {
    let mask = low_half_mask();

    let mut v = Vector::<i32>::zero();
    let returned = v.masked(mask).pre_increment();
    assert_eq!(returned, v);
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(returned.extract(lane), i32::from(mask.test(lane)));
    }

    let mut w = Vector::<i32>::zero();
    let via_tag = conditional_update::<PreIncrement, _, _>(&mut w, mask);
    assert_eq!(returned, via_tag);
    assert_eq!(v, w);

    let mut d = Vector::<i32>::splat(4);
    let returned = d.masked(mask).pre_decrement();
    assert_eq!(returned, d);
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(returned.extract(lane), if mask.test(lane) { 3 } else { 4 });
    }
}

#[test]
fn conditional_assign_matches_the_proxy() {
    let mask = low_half_mask();
    let rhs = Vector::<i32>::splat(3);

    let mut a = Vector::<i32>::index_sequence();
    let mut b = a;
    conditional_assign::<PlusAssign, _, _>(&mut a, mask, rhs);
    let mut proxy = b.masked(mask);
    proxy += rhs;
    assert_eq!(a, b);

    let mut c = Vector::<i32>::index_sequence();
    conditional_assign::<Assign, _, _>(&mut c, mask, rhs);
    let mut d = Vector::<i32>::index_sequence();
    d.masked(mask).assign(rhs);
    assert_eq!(c, d);

    let mut e = Vector::<i32>::splat(10);
    conditional_assign::<MinusAssign, _, _>(&mut e, mask, rhs);
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(e.extract(lane), if mask.test(lane) { 7 } else { 10 });
    }

    let mut f = Vector::<i32>::splat(0b0101);
    conditional_assign::<XorAssign, _, _>(&mut f, mask, Vector::splat(0b0011));
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(f.extract(lane), if mask.test(lane) { 0b0110 } else { 0b0101 });
    }
}

#[test]
fn conditional_update_return_conventions() {
    let mask = Mask::<i32>::splat(true);

    let mut v = Vector::<i32>::splat(5);
    let r = conditional_update::<PreIncrement, _, _>(&mut v, mask);
    assert_eq!(r.extract(0), 6);
    assert_eq!(v.extract(0), 6);

    let r = conditional_update::<PostIncrement, _, _>(&mut v, mask);
    assert_eq!(r.extract(0), 6);
    assert_eq!(v.extract(0), 7);

    let r = conditional_update::<PreDecrement, _, _>(&mut v, mask);
    assert_eq!(r.extract(0), 6);
    let r = conditional_update::<PostDecrement, _, _>(&mut v, mask);
    assert_eq!(r.extract(0), 6);
    assert_eq!(v.extract(0), 5);
}

#[test]
fn empty_mask_writes_are_no_ops() {
    let empty = Mask::<i32>::splat(false);
    let mut v = Vector::<i32>::index_sequence();
    let before = v;

    v.masked(empty).assign(Vector::splat(99));
    assert_eq!(v, before);
    let mut proxy = v.masked(empty);
    proxy += Vector::splat(99);
    assert_eq!(v, before);
    conditional_update::<PreIncrement, _, _>(&mut v, empty);
    assert_eq!(v, before);
}

#[test]
fn float_masked_writes() {
    let v = Vector::<f64>::index_sequence();
    let mask = v.cmp_gt(Vector::splat(0.5));
    let mut w = v;
    let mut proxy = w.masked(mask);
    proxy *= Vector::splat(2.0);
    for lane in 0..Vector::<f64>::SIZE {
        let x = lane as f64;
        let expected = if x > 0.5 { x * 2.0 } else { x };
        assert_eq!(w.extract(lane), expected);
    }
}
