//! Build-time capability resolution.
//!
//! Maps the compiler's target-feature set (or an explicit `LANEWISE_IMPL`
//! override) to exactly one instruction-set tier, and emits one custom cfg per
//! implied tier plus one per auxiliary instruction-set extension. The library
//! sources select the active backend from these cfgs instead of raw
//! `target_feature` checks, so the resolution logic lives in one place.
//!
//! Override syntax: `LANEWISE_IMPL=<tier>[+<extra>...]`, e.g.
//! `LANEWISE_IMPL=sse4.2+popcnt`. Tier names: `scalar`, `sse`, `sse2`,
//! `sse3`, `ssse3`, `sse4.1`, `sse4.2`, `avx`, `avx2`, `mic`.

use std::collections::HashSet;
use std::env;

/// x86 tier ladder, least to most capable. Each entry names the
/// target-feature token and the cfg emitted when that rung is implied.
const TIER_LADDER: &[(&str, &str)] = &[
    ("sse2", "lanewise_sse2"),
    ("sse3", "lanewise_sse3"),
    ("ssse3", "lanewise_ssse3"),
    ("sse4.1", "lanewise_sse41"),
    ("sse4.2", "lanewise_sse42"),
    ("avx", "lanewise_avx"),
    ("avx2", "lanewise_avx2"),
];

/// Auxiliary instruction sets orthogonal to the tier ladder.
const EXTRAS: &[(&str, &str)] = &[
    ("fma", "lanewise_fma"),
    ("fma4", "lanewise_fma4"),
    ("xop", "lanewise_xop"),
    ("f16c", "lanewise_f16c"),
    ("popcnt", "lanewise_popcnt"),
    ("sse4a", "lanewise_sse4a"),
];

fn ladder_index(tier: &str) -> Option<usize> {
    TIER_LADDER.iter().position(|(name, _)| *name == tier)
}

fn main() {
    for (_, cfg) in TIER_LADDER.iter().chain(EXTRAS.iter()) {
        println!("cargo:rustc-check-cfg=cfg({cfg})");
    }
    println!("cargo:rustc-check-cfg=cfg(lanewise_vex)");
    println!("cargo:rerun-if-env-changed=LANEWISE_IMPL");
    println!("cargo:rerun-if-env-changed=LANEWISE_ALLOW_SCALAR_FALLBACK");

    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let features: HashSet<String> = env::var("CARGO_CFG_TARGET_FEATURE")
        .unwrap_or_default()
        .split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    let is_x86 = arch == "x86_64" || arch == "x86";

    // Highest rung of the ladder the compiler actually targets.
    let detected = if is_x86 {
        TIER_LADDER
            .iter()
            .rposition(|(feature, _)| features.contains(*feature))
    } else {
        None
    };

    let selected = match env::var("LANEWISE_IMPL") {
        Ok(requested) => resolve_override(&requested, detected, &features, is_x86),
        Err(_) => detected,
    };

    if let Some(top) = selected {
        // Selecting a tier implies every lower rung of the ladder.
        for (_, cfg) in &TIER_LADDER[..=top] {
            println!("cargo:rustc-cfg={cfg}");
        }
    }

    for (feature, cfg) in EXTRAS {
        if features.contains(*feature) {
            println!("cargo:rustc-cfg={cfg}");
        }
    }

    // With AVX enabled every vector instruction is emitted in the wider VEX
    // form, even when the logical tier is narrower. Recorded separately so
    // instruction selection can honor it.
    if features.contains("avx") {
        println!("cargo:rustc-cfg=lanewise_vex");
    }
}

/// Applies and validates an explicit tier override.
fn resolve_override(
    requested: &str,
    detected: Option<usize>,
    features: &HashSet<String>,
    is_x86: bool,
) -> Option<usize> {
    let mut parts = requested.split('+').map(str::trim);
    let tier = parts.next().unwrap_or_default().to_ascii_lowercase();

    for extra in parts {
        let extra = extra.to_ascii_lowercase();
        if !EXTRAS.iter().any(|(name, _)| *name == extra) {
            panic!("LANEWISE_IMPL: unknown extra-instruction flag `{extra}`");
        }
        if !features.contains(&extra) {
            panic!(
                "LANEWISE_IMPL requests `{extra}` but the target does not \
                 enable it; add it to the target features"
            );
        }
    }

    let requested = match tier.as_str() {
        "scalar" => return None,
        "mic" => panic!(
            "LANEWISE_IMPL=mic: no Rust toolchain targets the MIC \
             architecture; select an x86 tier or scalar"
        ),
        // Plain `sse` means "whatever SSE the target enables", with SSE2 as
        // the floor for any vector path.
        "sse" => {
            if !features.contains("sse2") {
                panic!("SSE requested but no SSE2 support. lanewise needs at least SSE2!");
            }
            return detected;
        }
        other => ladder_index(other)
            .unwrap_or_else(|| panic!("LANEWISE_IMPL: unknown implementation tier `{other}`")),
    };

    let usable = is_x86 && detected.map_or(false, |have| have >= requested);
    if usable {
        return Some(requested);
    }

    if env::var_os("LANEWISE_ALLOW_SCALAR_FALLBACK").is_some() {
        println!(
            "cargo:warning=lanewise: target cannot execute the requested \
             `{tier}` tier; falling back to the scalar backend \
             (LANEWISE_ALLOW_SCALAR_FALLBACK is set)"
        );
        return None;
    }
    panic!(
        "No suitable lanewise implementation: LANEWISE_IMPL=`{tier}` but the \
         target only enables {:?}. Set the matching target features, choose a \
         lower tier, or set LANEWISE_ALLOW_SCALAR_FALLBACK=1 to accept the \
         scalar backend.",
        detected.map(|i| TIER_LADDER[i].0)
    );
}
