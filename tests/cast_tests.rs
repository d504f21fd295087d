//! Element conversions: the explicit cast table and the implicit same-width
//! `From` pairs.

use lanewise::Vector;

#[test]
fn float_to_int_truncates_toward_zero() {
    let f = Vector::<f32>::generate(|lane| if lane % 2 == 0 { 1.5 } else { -1.5 });
    let i = Vector::<i32>::convert_from(f);
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(i.extract(lane), if lane % 2 == 0 { 1 } else { -1 });
    }

    let g = Vector::<f32>::splat(2.999);
    assert_eq!(Vector::<i32>::convert_from(g).extract(0), 2);
    let h = Vector::<f32>::splat(-2.999);
    assert_eq!(Vector::<i32>::convert_from(h).extract(0), -2);
}

#[test]
fn int_to_float_is_exact_for_small_values() {
    let i = Vector::<i32>::generate(|lane| lane as i32 - 2);
    let f = Vector::<f32>::convert_from(i);
    for lane in 0..Vector::<f32>::SIZE {
        assert_eq!(f.extract(lane), lane as f32 - 2.0);
    }
}

#[test]
fn same_width_sign_conversion_is_modulo() {
    let i = Vector::<i32>::splat(-1);
    let u = Vector::<u32>::convert_from(i);
    assert_eq!(u.extract(0), u32::MAX);

    let back = Vector::<i32>::convert_from(u);
    assert_eq!(back.extract(0), -1);

    let w = Vector::<u16>::splat(0x8001);
    let s = Vector::<i16>::convert_from(w);
    assert_eq!(s.extract(0), -32767);
}

#[test]
fn implicit_from_pairs() {
    let i = Vector::<i32>::splat(-2);
    let u: Vector<u32> = i.into();
    assert_eq!(u.extract(0), u32::MAX - 1);

    let s = Vector::<i16>::from(Vector::<u16>::splat(u16::MAX));
    assert_eq!(s.extract(0), -1);
}

#[test]
fn narrowing_across_lane_counts_zero_fills() {
    // f64 vectors have at most as many lanes as f32 vectors; the converted
    // lanes land low and the remainder of the destination is zero.
    let src_size = Vector::<f64>::SIZE;
    let dst_size = Vector::<f32>::SIZE;
    let d = Vector::<f64>::generate(|lane| lane as f64 + 1.5);
    let f = Vector::<f32>::convert_from(d);
    for lane in 0..dst_size {
        let expected = if lane < src_size { lane as f32 + 1.5 } else { 0.0 };
        assert_eq!(f.extract(lane), expected);
    }

    let i = Vector::<i32>::convert_from(Vector::<f64>::splat(-3.75));
    for lane in 0..Vector::<i32>::SIZE {
        let expected = if lane < src_size { -3 } else { 0 };
        assert_eq!(i.extract(lane), expected);
    }
}

#[test]
fn widening_across_lane_counts_takes_the_low_lanes() {
    let i = Vector::<i32>::index_sequence();
    let d = Vector::<f64>::convert_from(i);
    for lane in 0..Vector::<f64>::SIZE {
        assert_eq!(d.extract(lane), lane as f64);
    }

    let f = Vector::<f32>::generate(|lane| lane as f32 * 0.5);
    let d = Vector::<f64>::convert_from(f);
    for lane in 0..Vector::<f64>::SIZE {
        assert_eq!(d.extract(lane), lane as f64 * 0.5);
    }
}

#[test]
fn float_int_round_trip_preserves_integral_values() {
    let i = Vector::<i32>::generate(|lane| (lane as i32 - 3) * 7);
    let f = Vector::<f32>::convert_from(i);
    let back = Vector::<i32>::convert_from(f);
    assert_eq!(back, i);
}

#[test]
fn bit_pattern_casts_between_same_width_ints() {
    // Sign conversion is a reinterpretation, so the bit pattern survives a
    // round trip.
    let a = Vector::<u32>::splat(0xdead_beef);
    let i = Vector::<i32>::convert_from(a);
    let b = Vector::<u32>::convert_from(i);
    assert_eq!(a, b);
}
