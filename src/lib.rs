//! flowtrail is a noise-driven flow-field particle simulation with a CPU trail renderer.
//!
//! # Frame overview
//!
//! Every call to [`Simulation::tick`] runs the same fixed sequence:
//!
//! 1. **Automate**: when "breathe" mode is on, the oscillator overrides speed, fluency
//!    and trail size.
//! 2. **Sync**: the [`Swarm`] grows or truncates to the live target population.
//! 3. **Field**: the [`FlowFieldGenerator`] resamples coherent noise into a grid of
//!    fixed-magnitude steering vectors and advances its time slice.
//! 4. **Advect + draw**: each particle follows the field, is pulled toward the canvas
//!    center, integrates, wraps at the edges and emits one [`TrailSegment`].
//!
//! Trails appear because the [`TrailSurface`] is never cleared between frames, only on
//! start, resize, palette change and reset.
//!
//! The design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-seed**: noise and uniform draws sit behind [`NoiseSource`] and
//!   [`RandomSource`], so a seed (or a stub) fixes every trajectory.
//! - **Never fatal inside a tick**: bad knobs are clamped, empty palettes fall back to a
//!   neutral color and stale grid lookups are clamped. Only surface and I/O boundaries
//!   return [`FlowError`].
#![forbid(unsafe_code)]

mod field;
mod foundation;
mod params;
mod render;
mod session;
mod sim;

pub use field::flow::{
    CELL_SIZE, FIELD_MAGNITUDE, FlowField, FlowFieldGenerator, MIN_FLUENCY, Z_INCREMENT, grid_dims,
    sampling_step,
};
pub use field::noise::{NoiseSource, PerlinNoise};
pub use foundation::core::{Canvas, Point, Rgba8, Vec2, limit, set_mag};
pub use foundation::error::{FlowError, FlowResult};
pub use params::automation::{
    AutomatedValues, FLUENCY_OSC, Oscillator, PHASE_STEP, SIZE_OSC, SPEED_OSC, Wave, sample_all,
};
pub use params::controller::{
    AutomationMode, ConfigPatch, DEFAULT_FLUENCY, DEFAULT_SIZE_FACTOR, DEFAULT_SPEED_FACTOR,
    FLUENCY_RANGE, POPULATION_RANGE, ParamRange, ParameterController, ParameterState, PatchEffects,
    SIZE_RANGE, SPEED_RANGE,
};
pub use params::palette::{BIOMES, Palette, biome_count, clamp_biome_index, parse_color};
pub use render::composite::{PremulRgba8, over, over_in_place};
pub use render::cpu::CpuTrailSurface;
pub use render::surface::{FrameRGBA, RecordingSurface, TrailSegment, TrailSurface};
pub use session::config::{ScheduledEvent, SessionAction, SessionConfig};
pub use session::run::{DEFAULT_SEED, SessionOutcome, run_session, save_png};
pub use sim::particle::{
    ALPHA_RANGE, BASE_SPEED_RANGE, BASE_WEIGHT_RANGE, COHESION_MIN_DIST_SQ, COHESION_PULL,
    FALLBACK_COLOR, Particle,
};
pub use sim::random::{RandomSource, SeededRandom};
pub use sim::simulation::{Simulation, TickStats, TickThreading};
pub use sim::swarm::{AREA_PER_PARTICLE, AREA_POPULATION_MAX, AREA_POPULATION_MIN, Swarm};
