use rayon::prelude::*;

use crate::field::flow::{FlowField, FlowFieldGenerator, sampling_step};
use crate::field::noise::{NoiseSource, PerlinNoise};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{FlowError, FlowResult};
use crate::params::controller::{AutomationMode, ConfigPatch, ParameterController, ParameterState};
use crate::params::palette::Palette;
use crate::render::surface::{TrailSegment, TrailSurface};
use crate::sim::particle::Particle;
use crate::sim::random::{RandomSource, SeededRandom};
use crate::sim::swarm::Swarm;

/// How the per-particle pass is scheduled.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TickThreading {
    pub parallel: bool,
    pub threads: Option<usize>,
}

/// Counters from one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub frame: u64,
    pub particles: usize,
    pub wrapped: usize,
    pub cols: usize,
    pub rows: usize,
    pub automated: bool,
    pub cleared: bool,
}

/// Per-frame driver owning the parameters, the field and the swarm.
///
/// Each [`tick`](Simulation::tick) runs, in order: the automation step, the population
/// sync, field regeneration, then follow/cohere/integrate/wrap/draw for every particle.
/// Entry points that clear the drawing surface (resize, palette change, reset) queue the
/// clear for the next tick.
pub struct Simulation<N = PerlinNoise, R = SeededRandom> {
    canvas: Canvas,
    controller: ParameterController,
    palette: Palette,
    generator: FlowFieldGenerator,
    swarm: Swarm,
    noise: N,
    rng: R,
    pending_clear: Option<Rgba8>,
    threading: TickThreading,
    pool: Option<rayon::ThreadPool>,
    frame: u64,
}

impl Simulation {
    /// Perlin noise and uniform draws both derived from `seed`.
    pub fn new(canvas: Canvas, state: ParameterState, seed: u64) -> Self {
        Self::with_sources(
            canvas,
            state,
            PerlinNoise::new(noise_seed(seed)),
            SeededRandom::from_seed(seed),
        )
    }
}

impl<N: NoiseSource, R: RandomSource> Simulation<N, R> {
    pub fn with_sources(canvas: Canvas, state: ParameterState, noise: N, mut rng: R) -> Self {
        let canvas = Canvas::new(canvas.width, canvas.height);
        let mut controller = ParameterController::new(ParameterState {
            auto_animate: false,
            ..state
        });
        let params = controller.snapshot();
        let palette = palette_for(params.palette_index);

        let mut swarm = Swarm::new();
        let target = Swarm::target_count(canvas, params.target_population.map(f64::from));
        swarm.sync_particle_count(target, canvas, &palette, &mut rng);

        if state.auto_animate {
            controller.set_automation(true, &mut rng);
        }

        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            particles = swarm.len(),
            biome = palette.name(),
            "simulation created"
        );

        Self {
            canvas,
            controller,
            generator: FlowFieldGenerator::new(canvas),
            pending_clear: Some(palette.background()),
            palette,
            swarm,
            noise,
            rng,
            threading: TickThreading::default(),
            pool: None,
            frame: 0,
        }
    }

    pub fn with_threading(mut self, threading: TickThreading) -> FlowResult<Self> {
        self.pool = if threading.parallel {
            Some(build_thread_pool(threading.threads)?)
        } else {
            None
        };
        self.threading = threading;
        Ok(self)
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn params(&self) -> ParameterState {
        self.controller.snapshot()
    }

    pub fn mode(&self) -> AutomationMode {
        self.controller.mode()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn background(&self) -> Rgba8 {
        self.palette.background()
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn field(&self) -> &FlowField {
        self.generator.field()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn threading(&self) -> &TickThreading {
        &self.threading
    }

    pub fn pending_clear(&self) -> Option<Rgba8> {
        self.pending_clear
    }

    /// Run one frame against `surface`. Nothing changes until the surface accepts the
    /// frame; a size differing from the current canvas is then handled as a resize.
    #[tracing::instrument(skip(self, surface), fields(frame = self.frame))]
    pub fn tick(
        &mut self,
        width: u32,
        height: u32,
        surface: &mut dyn TrailSurface,
    ) -> FlowResult<TickStats> {
        let target = Canvas::new(width, height);
        let resizing = target != self.canvas;
        let clear = if resizing {
            Some(self.palette.background())
        } else {
            self.pending_clear
        };
        surface.begin_frame(target.width, target.height, clear)?;

        if resizing {
            self.resize(width, height);
        }
        self.pending_clear = None;

        let automated = self.controller.automation_step().is_some();
        let params = self.controller.snapshot();

        self.sync_particle_count();

        let canvas = self.canvas;
        self.generator.regenerate(
            &self.noise,
            canvas,
            sampling_step(params.noise_frequency_raw),
        );
        let field = self.generator.field();

        let particles = self.swarm.particles_mut();
        let wrapped = match &self.pool {
            Some(pool) => {
                let (segments, wrapped) = advance_parallel(pool, particles, field, canvas, &params);
                for seg in &segments {
                    surface.stroke_segment(seg);
                }
                wrapped
            }
            None => advance_serial(particles, field, canvas, &params, surface),
        };

        surface.end_frame()?;

        let stats = TickStats {
            frame: self.frame,
            particles: self.swarm.len(),
            wrapped,
            cols: field.cols(),
            rows: field.rows(),
            automated,
            cleared: clear.is_some(),
        };
        self.frame += 1;
        tracing::trace!(?stats, "tick");
        Ok(stats)
    }

    /// Match the population to the live target. Idempotent at target.
    pub fn sync_particle_count(&mut self) -> isize {
        let params = self.controller.snapshot();
        let target = Swarm::target_count(self.canvas, params.target_population.map(f64::from));
        self.swarm
            .sync_particle_count(target, self.canvas, &self.palette, &mut self.rng)
    }

    /// Resize barrier: new grid, re-synced population, every particle respawned inside
    /// the new bounds, surface cleared on the next tick.
    pub fn resize(&mut self, width: u32, height: u32) {
        let canvas = Canvas::new(width, height);
        tracing::debug!(
            from_width = self.canvas.width,
            from_height = self.canvas.height,
            width = canvas.width,
            height = canvas.height,
            "resize"
        );
        self.canvas = canvas;
        self.generator.reset_grid(canvas);
        self.sync_particle_count();
        self.swarm.respawn_all(canvas, &mut self.rng);
        self.pending_clear = Some(self.palette.background());
    }

    /// Switch biome. Index is clamped. Returns `true` if the palette changed, in which
    /// case every particle draws a new color and the surface is cleared.
    pub fn set_palette(&mut self, index: i64) -> bool {
        if !self.controller.set_palette(index) {
            return false;
        }
        self.on_palette_changed();
        true
    }

    /// Clear the surface and scatter every particle again.
    pub fn reset(&mut self) {
        tracing::debug!(particles = self.swarm.len(), "reset");
        self.pending_clear = Some(self.palette.background());
        self.sync_particle_count();
        self.swarm.respawn_all(self.canvas, &mut self.rng);
    }

    pub fn toggle_automation(&mut self) -> AutomationMode {
        self.controller.toggle_automation(&mut self.rng)
    }

    /// Apply a partial live update. Knobs are clamped; palette and automation changes
    /// take effect immediately, population changes on the next tick.
    pub fn apply_config(&mut self, patch: &ConfigPatch) {
        let effects = self.controller.apply_patch(patch, &mut self.rng);
        if effects.palette_changed {
            self.on_palette_changed();
        }
    }

    fn on_palette_changed(&mut self) {
        let index = self.controller.snapshot().palette_index;
        self.palette = palette_for(index);
        let refreshed = self.swarm.apply_palette_change(&self.palette, &mut self.rng);
        self.pending_clear = Some(self.palette.background());
        tracing::debug!(biome = self.palette.name(), refreshed, "palette changed");
    }
}

/// Fold a 64-bit seed into the 32 bits Perlin permutation tables take.
pub(crate) fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

fn palette_for(index: usize) -> Palette {
    Palette::biome(index).unwrap_or_else(|| Palette::new("empty", Vec::new()))
}

fn advance_serial(
    particles: &mut [Particle],
    field: &FlowField,
    canvas: Canvas,
    params: &ParameterState,
    surface: &mut dyn TrailSurface,
) -> usize {
    let mut wrapped = 0;
    for p in particles {
        if p.advance(field, canvas, params.speed_factor) {
            wrapped += 1;
        }
        p.emit_trail_segment(surface, params.size_factor);
    }
    wrapped
}

/// Advance every particle on `pool`. The field is only read; each particle is only
/// touched by its own task. Segments come back in particle order.
fn advance_parallel(
    pool: &rayon::ThreadPool,
    particles: &mut [Particle],
    field: &FlowField,
    canvas: Canvas,
    params: &ParameterState,
) -> (Vec<TrailSegment>, usize) {
    let speed = params.speed_factor;
    let size = params.size_factor;
    let results: Vec<(TrailSegment, bool)> = pool.install(|| {
        particles
            .par_iter_mut()
            .map(|p| {
                let wrapped = p.advance(field, canvas, speed);
                (p.take_trail_segment(size), wrapped)
            })
            .collect()
    });
    let wrapped = results.iter().filter(|(_, w)| *w).count();
    (results.into_iter().map(|(s, _)| s).collect(), wrapped)
}

fn build_thread_pool(threads: Option<usize>) -> FlowResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FlowError::validation(
            "tick threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FlowError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/sim/simulation.rs"]
mod tests;
