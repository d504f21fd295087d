//! The resolved-capability surface: tier constants, register widths and the
//! diagnostic log line.

use std::mem::size_of;

use lanewise::backend::{Active, Backend};
use lanewise::{Implementation, Vector, CURRENT, EXTRA, VEX_ENCODING};

#[test]
fn current_matches_the_resolved_cfg() {
    #[cfg(lanewise_avx2)]
    assert_eq!(CURRENT, Implementation::Avx2);
    #[cfg(all(lanewise_sse2, not(lanewise_avx2)))]
    assert!(CURRENT.implies(Implementation::Sse2));
    #[cfg(not(lanewise_sse2))]
    assert_eq!(CURRENT, Implementation::Scalar);
}

#[test]
fn current_implies_its_requirements() {
    assert!(CURRENT.implies(Implementation::Scalar));
    for dep in CURRENT.required() {
        assert!(CURRENT.implies(*dep), "missing {}", dep.name());
    }
}

#[test]
fn lane_counts_fill_the_register() {
    // One register of lanes per vector, whatever the width.
    #[cfg(lanewise_sse2)]
    {
        assert_eq!(Vector::<f32>::SIZE * size_of::<f32>(), Active::WIDTH_BYTES);
        assert_eq!(Vector::<f64>::SIZE * size_of::<f64>(), Active::WIDTH_BYTES);
        assert_eq!(Vector::<i32>::SIZE * size_of::<i32>(), Active::WIDTH_BYTES);
        assert_eq!(Vector::<u32>::SIZE * size_of::<u32>(), Active::WIDTH_BYTES);
        assert_eq!(Vector::<i16>::SIZE * size_of::<i16>(), Active::WIDTH_BYTES);
        assert_eq!(Vector::<u16>::SIZE * size_of::<u16>(), Active::WIDTH_BYTES);
    }
    #[cfg(not(lanewise_sse2))]
    {
        assert_eq!(Vector::<f32>::SIZE, 1);
        assert_eq!(Vector::<f64>::SIZE, 1);
        assert_eq!(Vector::<i16>::SIZE, 1);
    }
}

#[test]
fn lane_counts_are_consistent_across_same_width_elements() {
    assert_eq!(Vector::<i32>::SIZE, Vector::<u32>::SIZE);
    assert_eq!(Vector::<i32>::SIZE, Vector::<f32>::SIZE);
    assert_eq!(Vector::<i16>::SIZE, Vector::<u16>::SIZE);
    assert!(Vector::<f64>::SIZE <= Vector::<f32>::SIZE);
}

#[test]
fn register_width_matches_the_tier() {
    match CURRENT {
        Implementation::Scalar => assert_eq!(Active::WIDTH_BYTES, 8),
        Implementation::Avx2 => assert_eq!(Active::WIDTH_BYTES, 32),
        Implementation::Mic => unreachable!("never resolved as active"),
        // Plain AVX stays on 128-bit registers (VEX coding only), so every
        // tier from SSE2 through AVX uses the 16-byte backend.
        _ => assert_eq!(Active::WIDTH_BYTES, 16),
    }
}

#[test]
fn tier_names_round_trip_the_override_spelling() {
    assert_eq!(Implementation::Scalar.name(), "scalar");
    assert_eq!(Implementation::Sse41.name(), "sse4.1");
    assert_eq!(Implementation::Avx2.name(), "avx2");
}

#[test]
fn extras_are_a_subset_of_the_known_flags() {
    assert_eq!(EXTRA, EXTRA & lanewise::ExtraInstructions::all());
    // VEX is orthogonal; just force the constant to be computed.
    let _ = VEX_ENCODING;
}

#[test_log::test]
fn log_selected_emits_under_the_log_facade() {
    lanewise::log_selected();
}
