use std::f64::consts::{FRAC_PI_2, FRAC_PI_3};

use crate::params::controller::{FLUENCY_RANGE, ParamRange, SIZE_RANGE, SPEED_RANGE};

/// Phase advance per automated tick.
pub const PHASE_STEP: f64 = 0.008;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wave {
    Sine,
    Cosine,
}

/// One automated channel: `mid + amp * wave(phase * harmonic + offset)`, clamped.
///
/// `mid` is the range center and `amp` is `amplitude_ratio` of the range span.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Oscillator {
    pub range: ParamRange,
    pub wave: Wave,
    pub amplitude_ratio: f64,
    pub harmonic: f64,
    pub phase_offset: f64,
}

impl Oscillator {
    pub fn sample(&self, phase: f64) -> f64 {
        let mid = (self.range.min + self.range.max) * 0.5;
        let amp = self.range.span() * self.amplitude_ratio;
        let arg = phase * self.harmonic + self.phase_offset;
        let w = match self.wave {
            Wave::Sine => arg.sin(),
            Wave::Cosine => arg.cos(),
        };
        self.range.clamp(mid + w * amp)
    }
}

pub const SPEED_OSC: Oscillator = Oscillator {
    range: SPEED_RANGE,
    wave: Wave::Sine,
    amplitude_ratio: 0.35,
    harmonic: 1.0,
    phase_offset: 0.0,
};

pub const FLUENCY_OSC: Oscillator = Oscillator {
    range: FLUENCY_RANGE,
    wave: Wave::Cosine,
    amplitude_ratio: 0.4,
    harmonic: 0.85,
    phase_offset: FRAC_PI_3,
};

pub const SIZE_OSC: Oscillator = Oscillator {
    range: SIZE_RANGE,
    wave: Wave::Sine,
    amplitude_ratio: 0.45,
    harmonic: 0.2,
    phase_offset: FRAC_PI_2,
};

/// Values produced by one automation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutomatedValues {
    pub speed_factor: f64,
    pub noise_frequency_raw: f64,
    pub size_factor: f64,
}

pub fn sample_all(phase: f64) -> AutomatedValues {
    AutomatedValues {
        speed_factor: SPEED_OSC.sample(phase),
        noise_frequency_raw: FLUENCY_OSC.sample(phase),
        size_factor: SIZE_OSC.sample(phase),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/automation.rs"]
mod tests;
