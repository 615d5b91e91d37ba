use super::*;
use crate::sim::random::{RandomSource, SeededRandom};

#[test]
fn channels_stay_in_range_for_sampled_phases() {
    let mut rng = SeededRandom::from_seed(2024);
    for _ in 0..10_000 {
        let phase = rng.uniform(-1.0e4, 1.0e4);
        for osc in [SPEED_OSC, FLUENCY_OSC, SIZE_OSC] {
            let v = osc.sample(phase);
            assert!(
                v >= osc.range.min && v <= osc.range.max,
                "{v} escaped [{}, {}] at phase {phase}",
                osc.range.min,
                osc.range.max
            );
        }
    }
}

#[test]
fn channels_hit_expected_extremes() {
    let speed_mid = (SPEED_RANGE.min + SPEED_RANGE.max) * 0.5;
    let speed_amp = SPEED_RANGE.span() * 0.35;
    let top = SPEED_OSC.sample(std::f64::consts::FRAC_PI_2);
    assert!((top - (speed_mid + speed_amp)).abs() < 1e-9);

    // size starts at its crest because of the quarter-turn offset
    let size_top = SIZE_OSC.sample(0.0);
    let size_mid = (SIZE_RANGE.min + SIZE_RANGE.max) * 0.5;
    assert!((size_top - (size_mid + SIZE_RANGE.span() * 0.45)).abs() < 1e-9);
}

#[test]
fn channels_are_out_of_phase() {
    let a = sample_all(0.0);
    let b = sample_all(1.0);
    let d_speed = (b.speed_factor - a.speed_factor) / SPEED_RANGE.span();
    let d_size = (b.size_factor - a.size_factor) / SIZE_RANGE.span();
    let d_fluency = (b.noise_frequency_raw - a.noise_frequency_raw) / FLUENCY_RANGE.span();
    assert!(d_speed > 0.0);
    assert!(d_size < 0.0);
    assert!(d_fluency < 0.0);
    assert!((d_speed - d_fluency).abs() > 1e-3);
}

#[test]
fn oversized_amplitude_is_clamped() {
    let wild = Oscillator {
        amplitude_ratio: 3.0,
        ..SPEED_OSC
    };
    assert_eq!(wild.sample(std::f64::consts::FRAC_PI_2), SPEED_RANGE.max);
    assert_eq!(wild.sample(-std::f64::consts::FRAC_PI_2), SPEED_RANGE.min);
}
