//! Behavioral tests for the vector surface, written against whatever backend
//! the build resolved to; lane counts come from `Vector::<T>::SIZE`
//! everywhere so the same assertions hold at every register width.

use lanewise::backend::scalar::Scalar;
use lanewise::backend::{Active, Backend, LaneOps, MaskOps};
use lanewise::{Aligned, Streaming, Unaligned, Vector};

fn lanes<T>(v: Vector<T>) -> Vec<T>
where
    T: lanewise::LaneElement,
    <Active as Backend>::Repr<T>: LaneOps<T, Mask = <Active as Backend>::MaskRepr<T>>,
    <Active as Backend>::MaskRepr<T>: MaskOps,
{
    (0..Vector::<T>::SIZE).map(|i| v.extract(i)).collect()
}

#[test]
fn splat_fills_every_lane() {
    let v = Vector::<f32>::splat(2.5);
    for lane in 0..Vector::<f32>::SIZE {
        assert_eq!(v.extract(lane), 2.5);
    }
    let w = Vector::<u16>::splat_int(7);
    for lane in 0..Vector::<u16>::SIZE {
        assert_eq!(w.extract(lane), 7);
    }
}

#[test]
fn index_sequence_counts_up() {
    let v = Vector::<i32>::index_sequence();
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(v.extract(lane), lane as i32);
    }
}

#[test]
fn insert_replaces_one_lane_only() {
    let v = Vector::<i32>::index_sequence().insert(0, 99);
    assert_eq!(v.extract(0), 99);
    for lane in 1..Vector::<i32>::SIZE {
        assert_eq!(v.extract(lane), lane as i32);
    }
}

// ----------------------------------------------------------------------
// Loads and stores
// ----------------------------------------------------------------------

#[repr(C, align(64))]
struct AlignedBuf<T>([T; 32]);

macro_rules! store_load_round_trip {
    ($($name:ident: $ty:ty => $gen:expr;)*) => {
        $(
            #[test]
            fn $name() {
                let src = Vector::<$ty>::generate($gen);
                let mut buf = AlignedBuf([<$ty>::default(); 32]);

                unsafe {
                    src.store(buf.0.as_mut_ptr(), Aligned);
                    assert_eq!(lanes(Vector::<$ty>::load(buf.0.as_ptr(), Aligned)), lanes(src));

                    src.store(buf.0.as_mut_ptr(), Unaligned);
                    assert_eq!(lanes(Vector::<$ty>::load(buf.0.as_ptr(), Unaligned)), lanes(src));

                    src.store(buf.0.as_mut_ptr(), Aligned | Streaming);
                    assert_eq!(
                        lanes(Vector::<$ty>::load(buf.0.as_ptr(), Aligned | Streaming)),
                        lanes(src)
                    );

                    src.store(buf.0.as_mut_ptr().add(1), Unaligned | Streaming);
                    assert_eq!(
                        lanes(Vector::<$ty>::load(buf.0.as_ptr().add(1), Unaligned)),
                        lanes(src)
                    );
                }
            }
        )*
    };
}

store_load_round_trip! {
    store_load_round_trips_f32: f32 => |lane| lane as f32 * 1.5 - 3.0;
    store_load_round_trips_f64: f64 => |lane| lane as f64 * -0.25 + 1.0;
    store_load_round_trips_i32: i32 => |lane| lane as i32 * 7 - 3;
    store_load_round_trips_u32: u32 => |lane| lane as u32 * 0x0101 + 5;
    store_load_round_trips_i16: i16 => |lane| lane as i16 * -9;
    store_load_round_trips_u16: u16 => |lane| lane as u16 * 3 + 1;
}

#[test]
fn slice_round_trip() {
    let src = Vector::<u32>::generate(|lane| (lane as u32) * 3 + 1);
    let mut out = vec![0u32; Vector::<u32>::SIZE];
    src.write_to_slice(&mut out);
    let back = Vector::<u32>::from_slice(&out);
    assert_eq!(lanes(back), lanes(src));
}

#[test]
#[should_panic]
fn from_slice_rejects_short_input() {
    let _ = Vector::<i32>::from_slice(&[]);
}

// ----------------------------------------------------------------------
// Arithmetic
// ----------------------------------------------------------------------

#[test]
fn lane_arithmetic_matches_scalar() {
    let a = Vector::<i32>::generate(|lane| lane as i32 - 2);
    let b = Vector::<i32>::generate(|lane| (lane as i32) * 3 + 1);
    assert_eq!(lanes(a + b), lanes(Vector::generate(|l| (l as i32 - 2) + ((l as i32) * 3 + 1))));
    assert_eq!(lanes(a - b), lanes(Vector::generate(|l| (l as i32 - 2) - ((l as i32) * 3 + 1))));
    assert_eq!(lanes(a * b), lanes(Vector::generate(|l| (l as i32 - 2) * ((l as i32) * 3 + 1))));
    assert_eq!(lanes(a / b), lanes(Vector::generate(|l| (l as i32 - 2) / ((l as i32) * 3 + 1))));
    assert_eq!(lanes(a % b), lanes(Vector::generate(|l| (l as i32 - 2) % ((l as i32) * 3 + 1))));
}

#[test]
fn integer_arithmetic_wraps_around() {
    let v = Vector::<i32>::splat(i32::MAX) + Vector::splat(1);
    assert_eq!(v.extract(0), i32::MIN);
    let w = Vector::<u16>::zero() - Vector::one();
    assert_eq!(w.extract(0), u16::MAX);
}

#[test]
fn min_max_pick_per_lane() {
    let a = Vector::<f64>::generate(|lane| lane as f64);
    let b = Vector::<f64>::generate(|lane| 3.0 - lane as f64);
    let lo = lanewise::min(a, b);
    let hi = lanewise::max(a, b);
    for lane in 0..Vector::<f64>::SIZE {
        assert_eq!(lo.extract(lane), (lane as f64).min(3.0 - lane as f64));
        assert_eq!(hi.extract(lane), (lane as f64).max(3.0 - lane as f64));
    }
}

#[test]
fn fused_multiply_add_matches_mul_add() {
    let a = Vector::<f32>::generate(|lane| lane as f32 + 0.5);
    let b = Vector::<f32>::splat(2.0);
    let c = Vector::<f32>::splat(-1.0);
    let r = a.fused_multiply_add(b, c);
    for lane in 0..Vector::<f32>::SIZE {
        let expected = (lane as f32 + 0.5) * 2.0 - 1.0;
        assert!((r.extract(lane) - expected).abs() < 1e-6);
    }
}

#[test]
fn increment_and_decrement() {
    let mut v = Vector::<i16>::index_sequence();
    v.increment();
    assert_eq!(v.extract(0), 1);
    v.decrement();
    v.decrement();
    assert_eq!(v.extract(0), -1);
}

#[test]
fn negation_and_abs() {
    let v = Vector::<i32>::generate(|lane| lane as i32 - 2);
    assert_eq!(lanes(-v), lanes(Vector::generate(|l| 2 - l as i32)));
    assert_eq!(lanes(lanewise::abs(v)), lanes(Vector::generate(|l| (l as i32 - 2).abs())));

    let f = Vector::<f32>::splat(-0.0);
    assert!(f.is_negative().is_full());
    assert!(Vector::<f32>::splat(0.0).is_negative().is_empty());
}

// ----------------------------------------------------------------------
// Shifts
// ----------------------------------------------------------------------

#[test]
fn uniform_shift_doubles_powers_of_two() {
    let v = Vector::<u32>::generate(|lane| 1u32 << (lane % 16));
    let shifted = v << 1;
    for lane in 0..Vector::<u32>::SIZE {
        assert_eq!(shifted.extract(lane), 2u32 << (lane % 16));
    }
    let back = shifted >> 1;
    assert_eq!(lanes(back), lanes(v));
}

#[test]
fn per_lane_shift_uses_each_count() {
    let v = Vector::<u32>::generate(|lane| lane as u32 + 1);
    let counts = Vector::<u32>::generate(|lane| lane as u32 % 8);
    let shifted = v << counts;
    for lane in 0..Vector::<u32>::SIZE {
        assert_eq!(shifted.extract(lane), (lane as u32 + 1) << (lane as u32 % 8));
    }
}

#[test]
fn arithmetic_shift_keeps_the_sign() {
    let v = Vector::<i32>::splat(-8);
    assert_eq!((v >> 1).extract(0), -4);
    let w = Vector::<i16>::splat(-2);
    assert_eq!((w >> 1).extract(0), -1);
}

#[test]
fn bitwise_operators() {
    let a = Vector::<u32>::splat(0b1100);
    let b = Vector::<u32>::splat(0b1010);
    assert_eq!((a & b).extract(0), 0b1000);
    assert_eq!((a | b).extract(0), 0b1110);
    assert_eq!((a ^ b).extract(0), 0b0110);
    assert_eq!((!Vector::<u32>::zero()).extract(0), u32::MAX);
}

// ----------------------------------------------------------------------
// Gather / scatter
// ----------------------------------------------------------------------

#[test]
fn gather_reads_indexed_elements() {
    let size = Vector::<f32>::SIZE;
    let data: Vec<f32> = (0..size).map(|i| (i as f32 + 1.0) * 10.0).collect();
    // Reverse permutation.
    let idx = lanewise::IndexVector::<f32>::generate(|lane| (size - 1 - lane) as i32);
    let v = Vector::<f32>::gather_checked(&data, idx);
    for lane in 0..size {
        assert_eq!(v.extract(lane), (size - lane) as f32 * 10.0);
    }
}

#[test]
fn scatter_writes_indexed_elements() {
    let size = Vector::<i32>::SIZE;
    let v = Vector::<i32>::generate(|lane| lane as i32 + 100);
    let idx = lanewise::IndexVector::<i32>::generate(|lane| (size - 1 - lane) as i32);
    let mut out = vec![0i32; size];
    v.scatter_checked(&mut out, idx);
    for (i, &x) in out.iter().enumerate() {
        assert_eq!(x, (size - 1 - i) as i32 + 100);
    }
}

#[test]
#[should_panic]
fn gather_checked_rejects_out_of_bounds() {
    let data = vec![1.0f32; Vector::<f32>::SIZE];
    let idx = lanewise::IndexVector::<f32>::splat(Vector::<f32>::SIZE as i32);
    let _ = Vector::<f32>::gather_checked(&data, idx);
}

#[test]
fn raw_gather_matches_checked() {
    let size = Vector::<u16>::SIZE;
    let data: Vec<u16> = (0..size as u16).map(|i| i * 7).collect();
    let idx = lanewise::IndexVector::<u16>::generate(|lane| ((lane + 1) % size) as u16);
    let checked = Vector::<u16>::gather_checked(&data, idx);
    let raw = unsafe { Vector::<u16>::gather(data.as_ptr(), idx) };
    assert_eq!(lanes(checked), lanes(raw));
}

// ----------------------------------------------------------------------
// Reductions
// ----------------------------------------------------------------------

#[test]
fn sum_adds_every_lane() {
    // 1 + 2 + ... + SIZE
    let v = Vector::<i32>::index_sequence() + Vector::one();
    let n = Vector::<i32>::SIZE as i32;
    assert_eq!(v.sum(), n * (n + 1) / 2);
}

#[test]
fn masked_sum_adds_selected_lanes_only() {
    let v = Vector::<i32>::index_sequence() + Vector::one();
    let mask = v.cmp_gt(Vector::splat(1));
    let expected: i32 = (1..=Vector::<i32>::SIZE as i32).filter(|&x| x > 1).sum();
    assert_eq!(v.sum_where(mask), expected);
    assert_eq!(v.sum_where(v.cmp_gt(Vector::splat(i32::MAX))), 0);
}

#[test]
fn product_and_extremes() {
    let v = Vector::<i32>::index_sequence() + Vector::one();
    let n = Vector::<i32>::SIZE as i32;
    assert_eq!(v.product(), (1..=n).product::<i32>());
    assert_eq!(v.min_element(), 1);
    assert_eq!(v.max_element(), n);
}

#[test]
fn masked_extremes_fall_back_to_identities() {
    let v = Vector::<i32>::index_sequence();
    let empty = v.cmp_lt(Vector::splat(i32::MIN));
    assert_eq!(v.min_where(empty), i32::MAX);
    assert_eq!(v.max_where(empty), i32::MIN);
    assert_eq!(v.product_where(empty), 1);
}

#[test]
fn partial_sum_is_an_inclusive_prefix() {
    let v = Vector::<i32>::index_sequence() + Vector::one();
    let p = v.partial_sum();
    let mut acc = 0;
    for lane in 0..Vector::<i32>::SIZE {
        acc += lane as i32 + 1;
        assert_eq!(p.extract(lane), acc);
    }
}

// ----------------------------------------------------------------------
// Per-lane protocol
// ----------------------------------------------------------------------

#[test]
fn call_visits_lanes_in_order() {
    let v = Vector::<i32>::index_sequence();
    let mut seen = Vec::new();
    v.call(|x| seen.push(x));
    assert_eq!(seen, (0..Vector::<i32>::SIZE as i32).collect::<Vec<_>>());
}

#[test]
fn call_with_values_sorted_deduplicates() {
    let pattern = [3i32, 1, 3, 2];
    let v = Vector::<i32>::generate(|lane| pattern[lane % 4]);
    let mut seen = Vec::new();
    v.call_with_values_sorted(|x| seen.push(x));

    let mut expected: Vec<i32> = lanes(v);
    expected.sort_unstable();
    expected.dedup();
    assert_eq!(seen, expected);
    // At four lanes and up the duplicated 3 must collapse.
    if Vector::<i32>::SIZE >= 4 {
        assert_eq!(&seen[..3], &[1, 2, 3]);
    }
}

#[test]
fn apply_where_leaves_unmasked_lanes() {
    let v = Vector::<i32>::index_sequence();
    let mask = v.cmp_ge(Vector::splat(1));
    let doubled = v.apply_where(mask, |x| x * 2);
    assert_eq!(doubled.extract(0), 0);
    for lane in 1..Vector::<i32>::SIZE {
        assert_eq!(doubled.extract(lane), 2 * lane as i32);
    }
}

#[test]
fn fill_draws_one_value_per_lane() {
    let mut v = Vector::<u32>::zero();
    let mut next = 0u32;
    v.fill(|| {
        next += 1;
        next
    });
    assert_eq!(lanes(v), (1..=Vector::<u32>::SIZE as u32).collect::<Vec<_>>());
}

#[test]
fn random_floats_stay_in_the_unit_interval() {
    for _ in 0..64 {
        let v = Vector::<f32>::random();
        for lane in 0..Vector::<f32>::SIZE {
            let x = v.extract(lane);
            assert!((0.0..1.0).contains(&x), "lane {lane} = {x}");
        }
        let d = Vector::<f64>::random();
        for lane in 0..Vector::<f64>::SIZE {
            let x = d.extract(lane);
            assert!((0.0..1.0).contains(&x));
        }
    }
}

// ----------------------------------------------------------------------
// Permutations
// ----------------------------------------------------------------------

#[test]
fn reversed_flips_lane_order() {
    let v = Vector::<i32>::index_sequence();
    let r = v.reversed();
    for lane in 0..Vector::<i32>::SIZE {
        assert_eq!(r.extract(lane), (Vector::<i32>::SIZE - 1 - lane) as i32);
    }
}

#[test]
fn rotated_wraps_around() {
    let size = Vector::<i32>::SIZE;
    let v = Vector::<i32>::index_sequence();
    let r = v.rotated(1);
    for lane in 0..size {
        assert_eq!(r.extract(lane), ((lane + 1) % size) as i32);
    }
    let l = v.rotated(-1);
    for lane in 0..size {
        assert_eq!(l.extract(lane), ((lane + size - 1) % size) as i32);
    }
}

#[test]
fn shifted_fills_with_zero_or_the_fill_vector() {
    let size = Vector::<i32>::SIZE;
    let v = Vector::<i32>::index_sequence() + Vector::one();
    let s = v.shifted(1);
    for lane in 0..size {
        let expected = if lane + 1 < size { lane as i32 + 2 } else { 0 };
        assert_eq!(s.extract(lane), expected);
    }
    let f = v.shifted_with(1, Vector::splat(-7));
    assert_eq!(f.extract(size - 1), -7);
}

#[test]
fn sorted_orders_lanes_ascending() {
    let v = Vector::<i32>::index_sequence().reversed();
    let s = v.sorted();
    assert_eq!(lanes(s), (0..Vector::<i32>::SIZE as i32).collect::<Vec<_>>());
}

#[test]
fn interleave_pairs_low_and_high_halves() {
    let size = Vector::<i32>::SIZE;
    let a = Vector::<i32>::index_sequence();
    let b = a + Vector::splat(100);
    let low = a.interleave_low(b);
    let high = a.interleave_high(b);
    for lane in 0..size {
        let src = lane / 2;
        let expected_low = if lane % 2 == 0 { src as i32 } else { src as i32 + 100 };
        assert_eq!(low.extract(lane), expected_low);
        let hsrc = size / 2 + lane / 2;
        let expected_high = if lane % 2 == 0 { hsrc as i32 } else { hsrc as i32 + 100 };
        assert_eq!(high.extract(lane), expected_high);
    }
}

#[test]
fn permuted_wraps_out_of_range_indexes() {
    let size = Vector::<i32>::SIZE;
    let v = Vector::<i32>::index_sequence() * Vector::splat(10);
    let idx = lanewise::IndexVector::<i32>::splat(size as i32); // wraps to 0
    let p = v.permuted(idx);
    for lane in 0..size {
        assert_eq!(p.extract(lane), 0);
    }
}

// ----------------------------------------------------------------------
// Float-only surface
// ----------------------------------------------------------------------

#[test]
fn sqrt_and_rounding() {
    let v = Vector::<f64>::generate(|lane| (lane as f64 + 1.0) * (lane as f64 + 1.0));
    let r = lanewise::sqrt(v);
    for lane in 0..Vector::<f64>::SIZE {
        assert!((r.extract(lane) - (lane as f64 + 1.0)).abs() < 1e-12);
    }

    let halves = Vector::<f32>::generate(|lane| lane as f32 + 0.5);
    let rounded = lanewise::round(halves);
    for lane in 0..Vector::<f32>::SIZE {
        // Ties to even: 0.5 -> 0, 1.5 -> 2, 2.5 -> 2, ...
        let expected = if lane % 2 == 0 { lane as f32 } else { lane as f32 + 1.0 };
        assert_eq!(rounded.extract(lane), expected);
    }

    let v = Vector::<f32>::splat(-1.25);
    assert_eq!(v.floor().extract(0), -2.0);
    assert_eq!(v.ceil().extract(0), -1.0);
    assert_eq!(v.trunc().extract(0), -1.0);
}

#[test]
fn reciprocal_is_close_enough() {
    let v = Vector::<f32>::generate(|lane| lane as f32 + 1.0);
    let r = lanewise::reciprocal(v);
    let q = lanewise::rsqrt(v);
    for lane in 0..Vector::<f32>::SIZE {
        let x = lane as f32 + 1.0;
        assert!((r.extract(lane) - 1.0 / x).abs() / (1.0 / x) < 1e-3);
        assert!((q.extract(lane) - 1.0 / x.sqrt()).abs() / (1.0 / x.sqrt()) < 1e-3);
    }
}

#[test]
fn nan_and_finiteness_masks() {
    let mut v = Vector::<f32>::splat(1.0);
    assert!(v.is_finite().is_full());
    assert!(v.is_nan().is_empty());

    v.set_qnan();
    assert!(v.is_nan().is_full());
    assert!(v.is_finite().is_empty());

    let inf = Vector::<f64>::splat(f64::INFINITY);
    assert!(inf.is_finite().is_empty());
    assert!(inf.is_nan().is_empty());
}

#[test]
fn copy_sign_transfers_the_sign_bit() {
    let v = Vector::<f32>::splat(3.0);
    let negative = lanewise::copy_sign(v, Vector::splat(-1.0));
    assert_eq!(negative.extract(0), -3.0);
    let positive = lanewise::copy_sign(Vector::<f32>::splat(-3.0), Vector::splat(2.0));
    assert_eq!(positive.extract(0), 3.0);
}

#[test]
fn set_zero_variants() {
    let mut v = Vector::<f32>::splat(5.0);
    let mask = Vector::<f32>::index_sequence().cmp_ge(Vector::splat(1.0));
    v.set_zero_where(mask);
    assert_eq!(v.extract(0), 5.0);
    for lane in 1..Vector::<f32>::SIZE {
        assert_eq!(v.extract(lane), 0.0);
    }

    let mut w = Vector::<f32>::splat(5.0);
    w.set_zero_where_inverted(mask);
    assert_eq!(w.extract(0), 0.0);

    w.set_zero();
    assert!(w.is_zero().is_full());
}

// ----------------------------------------------------------------------
// The scalar backend behaves identically at one lane
// ----------------------------------------------------------------------

#[test]
fn scalar_backend_is_single_lane() {
    assert_eq!(Vector::<f32, Scalar>::SIZE, 1);
    assert_eq!(Vector::<f64, Scalar>::SIZE, 1);

    let a = Vector::<i32, Scalar>::splat(6);
    let b = Vector::<i32, Scalar>::splat(4);
    assert_eq!((a + b).extract(0), 10);
    assert_eq!((a * b).extract(0), 24);
    assert_eq!((a % b).extract(0), 2);
    assert_eq!(a.cmp_gt(b).count(), 1);
    assert_eq!((a.min(b)).sum(), 4);

    let f = Vector::<f32, Scalar>::splat(2.0);
    assert_eq!(f.sqrt().extract(0), 2.0f32.sqrt());
}
