use crate::foundation::core::Canvas;
use crate::params::palette::Palette;
use crate::sim::particle::Particle;
use crate::sim::random::RandomSource;

/// Canvas pixels per particle when no population override is set.
pub const AREA_PER_PARTICLE: u64 = 9000;
pub const AREA_POPULATION_MIN: usize = 300;
pub const AREA_POPULATION_MAX: usize = 1200;

/// The live particle population, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Swarm {
    particles: Vec<Particle>,
}

impl Swarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Population for `canvas`: the floored override when present, otherwise area-derived
    /// and clamped to `[300, 1200]`.
    pub fn target_count(canvas: Canvas, live_override: Option<f64>) -> usize {
        match live_override {
            Some(v) if v.is_finite() => v.max(0.0).floor() as usize,
            _ => ((canvas.area() / AREA_PER_PARTICLE) as usize)
                .clamp(AREA_POPULATION_MIN, AREA_POPULATION_MAX),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Grow by appending fresh particles or shrink by truncating the tail.
    ///
    /// Returns the signed change in population; zero when already at `target`.
    pub fn sync_particle_count(
        &mut self,
        target: usize,
        canvas: Canvas,
        palette: &Palette,
        rng: &mut dyn RandomSource,
    ) -> isize {
        let current = self.particles.len();
        if current < target {
            self.particles.reserve(target - current);
            for _ in current..target {
                self.particles.push(Particle::spawn(canvas, palette, rng));
            }
        } else if current > target {
            self.particles.truncate(target);
        } else {
            return 0;
        }
        tracing::debug!(from = current, to = target, "population synced");
        target as isize - current as isize
    }

    /// Re-randomize every position, keeping colors and scales.
    pub fn respawn_all(&mut self, canvas: Canvas, rng: &mut dyn RandomSource) -> usize {
        for p in &mut self.particles {
            p.reset_position(canvas, rng);
        }
        self.particles.len()
    }

    /// Redraw every particle's color from `palette`, keeping positions.
    pub fn apply_palette_change(&mut self, palette: &Palette, rng: &mut dyn RandomSource) -> usize {
        for p in &mut self.particles {
            p.refresh_color(palette, rng);
        }
        self.particles.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/swarm.rs"]
mod tests;
