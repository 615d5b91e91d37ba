use std::f64::consts::TAU;

use crate::params::automation::{self, AutomatedValues, PHASE_STEP};
use crate::params::palette::{biome_count, clamp_biome_index};
use crate::sim::random::RandomSource;

/// Inclusive bounds of a live knob.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

/// Trail thickness multiplier ("Creature").
pub const SIZE_RANGE: ParamRange = ParamRange::new(1.0, 20.0);
/// Velocity cap multiplier ("Drive").
pub const SPEED_RANGE: ParamRange = ParamRange::new(0.1, 5.0);
/// Raw noise frequency, inverted before sampling ("Fluency").
pub const FLUENCY_RANGE: ParamRange = ParamRange::new(0.01, 100.0);
/// Live population override ("Swarm").
pub const POPULATION_RANGE: ParamRange = ParamRange::new(20.0, 1000.0);

pub const DEFAULT_SIZE_FACTOR: f64 = 3.0;
pub const DEFAULT_SPEED_FACTOR: f64 = 1.0;
pub const DEFAULT_FLUENCY: f64 = 30.0;

/// Snapshot of every live knob. Copied once per tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterState {
    pub size_factor: f64,
    pub speed_factor: f64,
    pub noise_frequency_raw: f64,
    /// `None` derives the population from canvas area.
    pub target_population: Option<u32>,
    pub palette_index: usize,
    pub auto_animate: bool,
    pub auto_phase: f64,
}

impl Default for ParameterState {
    fn default() -> Self {
        Self {
            size_factor: DEFAULT_SIZE_FACTOR,
            speed_factor: DEFAULT_SPEED_FACTOR,
            noise_frequency_raw: DEFAULT_FLUENCY,
            target_population: None,
            palette_index: 0,
            auto_animate: false,
            auto_phase: 0.0,
        }
    }
}

/// Partial update of the live options. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigPatch {
    pub size_factor: Option<f64>,
    pub speed_factor: Option<f64>,
    pub noise_frequency_raw: Option<f64>,
    pub target_population: Option<f64>,
    pub palette_index: Option<i64>,
    pub auto_animate: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutomationMode {
    Manual,
    Automated,
}

/// What a patch changed beyond plain knob values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchEffects {
    pub palette_changed: bool,
    pub automation_changed: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ParameterController {
    state: ParameterState,
}

impl ParameterController {
    pub fn new(state: ParameterState) -> Self {
        let mut state = state;
        state.size_factor = SIZE_RANGE.clamp(finite_or(state.size_factor, DEFAULT_SIZE_FACTOR));
        state.speed_factor =
            SPEED_RANGE.clamp(finite_or(state.speed_factor, DEFAULT_SPEED_FACTOR));
        state.noise_frequency_raw =
            FLUENCY_RANGE.clamp(finite_or(state.noise_frequency_raw, DEFAULT_FLUENCY));
        state.target_population = state
            .target_population
            .map(|n| POPULATION_RANGE.clamp(f64::from(n)) as u32);
        state.palette_index = clamp_biome_index(state.palette_index as i64);
        Self { state }
    }

    pub fn snapshot(&self) -> ParameterState {
        self.state
    }

    pub fn mode(&self) -> AutomationMode {
        if self.state.auto_animate {
            AutomationMode::Automated
        } else {
            AutomationMode::Manual
        }
    }

    pub fn apply_patch(
        &mut self,
        patch: &ConfigPatch,
        rng: &mut dyn RandomSource,
    ) -> PatchEffects {
        let s = &mut self.state;
        if let Some(v) = clamp_knob("size_factor", patch.size_factor, SIZE_RANGE) {
            s.size_factor = v;
        }
        if let Some(v) = clamp_knob("speed_factor", patch.speed_factor, SPEED_RANGE) {
            s.speed_factor = v;
        }
        if let Some(v) = clamp_knob(
            "noise_frequency_raw",
            patch.noise_frequency_raw,
            FLUENCY_RANGE,
        ) {
            s.noise_frequency_raw = v;
        }
        if let Some(v) = clamp_knob(
            "target_population",
            patch.target_population,
            POPULATION_RANGE,
        ) {
            s.target_population = Some(v.floor() as u32);
        }

        let mut effects = PatchEffects::default();
        if let Some(index) = patch.palette_index {
            effects.palette_changed = self.set_palette(index);
        }
        if let Some(enabled) = patch.auto_animate {
            effects.automation_changed = self.set_automation(enabled, rng);
        }
        effects
    }

    /// Returns `true` when the clamped index differs from the active one.
    pub fn set_palette(&mut self, index: i64) -> bool {
        let clamped = clamp_biome_index(index);
        if clamped as i64 != index {
            tracing::warn!(
                requested = index,
                clamped,
                biomes = biome_count(),
                "palette index out of range"
            );
        }
        if clamped == self.state.palette_index {
            return false;
        }
        self.state.palette_index = clamped;
        true
    }

    pub fn clear_population_override(&mut self) {
        self.state.target_population = None;
    }

    /// Switch modes. Entering automation picks a random phase in `[0, 2π)`; leaving it
    /// keeps the last automated values.
    pub fn set_automation(&mut self, enabled: bool, rng: &mut dyn RandomSource) -> bool {
        if enabled == self.state.auto_animate {
            return false;
        }
        self.state.auto_animate = enabled;
        if enabled {
            self.state.auto_phase = rng.uniform(0.0, TAU);
        }
        tracing::debug!(enabled, phase = self.state.auto_phase, "automation toggled");
        true
    }

    pub fn toggle_automation(&mut self, rng: &mut dyn RandomSource) -> AutomationMode {
        let enable = !self.state.auto_animate;
        self.set_automation(enable, rng);
        self.mode()
    }

    /// Advance the oscillator and override speed, fluency and size. No-op in manual mode.
    pub fn automation_step(&mut self) -> Option<AutomatedValues> {
        if !self.state.auto_animate {
            return None;
        }
        self.state.auto_phase += PHASE_STEP;
        let values = automation::sample_all(self.state.auto_phase);
        self.state.speed_factor = values.speed_factor;
        self.state.noise_frequency_raw = values.noise_frequency_raw;
        self.state.size_factor = values.size_factor;
        Some(values)
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

fn clamp_knob(name: &'static str, value: Option<f64>, range: ParamRange) -> Option<f64> {
    let v = value?;
    if !v.is_finite() {
        tracing::warn!(knob = name, value = v, "ignoring non-finite value");
        return None;
    }
    let clamped = range.clamp(v);
    if clamped != v {
        tracing::warn!(
            knob = name,
            value = v,
            clamped,
            min = range.min,
            max = range.max,
            "knob out of range"
        );
    }
    Some(clamped)
}

#[cfg(test)]
#[path = "../../tests/unit/params/controller.rs"]
mod tests;
