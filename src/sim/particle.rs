use crate::field::flow::FlowField;
use crate::foundation::core::{Canvas, Point, Rgba8, Vec2, limit, set_mag};
use crate::params::palette::Palette;
use crate::render::surface::{TrailSegment, TrailSurface};
use crate::sim::random::RandomSource;

pub const BASE_SPEED_RANGE: (f64, f64) = (1.2, 2.4);
pub const BASE_WEIGHT_RANGE: (f64, f64) = (0.6, 1.8);
pub const ALPHA_RANGE: (f64, f64) = (85.0, 150.0);
/// Pull toward the canvas center, before the speed factor is applied.
pub const COHESION_PULL: f64 = 0.01;
/// Squared distance under which cohesion is skipped.
pub const COHESION_MIN_DIST_SQ: f64 = 1.0;
/// Stroke color used when the active palette has no swatches.
pub const FALLBACK_COLOR: Rgba8 = Rgba8::WHITE;

/// A single trail-drawing agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pos: Point,
    prev: Point,
    vel: Vec2,
    acc: Vec2,
    base_speed: f64,
    base_weight: f64,
    color: Rgba8,
}

impl Particle {
    /// Draw order: base speed, base weight, then color.
    pub fn new(pos: Point, palette: &Palette, rng: &mut dyn RandomSource) -> Self {
        let base_speed = rng.uniform(BASE_SPEED_RANGE.0, BASE_SPEED_RANGE.1);
        let base_weight = rng.uniform(BASE_WEIGHT_RANGE.0, BASE_WEIGHT_RANGE.1);
        let mut p = Self {
            pos,
            prev: pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            base_speed,
            base_weight,
            color: FALLBACK_COLOR,
        };
        p.refresh_color(palette, rng);
        p
    }

    /// Spawn at a uniformly random point inside `canvas`.
    pub fn spawn(canvas: Canvas, palette: &Palette, rng: &mut dyn RandomSource) -> Self {
        let pos = random_point(canvas, rng);
        Self::new(pos, palette, rng)
    }

    pub fn position(&self) -> Point {
        self.pos
    }

    pub fn previous_position(&self) -> Point {
        self.prev
    }

    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acc
    }

    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    pub fn base_weight(&self) -> f64 {
        self.base_weight
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn set_position(&mut self, pos: Point) {
        self.pos = pos;
    }

    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.acc += force;
    }

    /// Accumulate the field vector under the current position.
    pub fn follow(&mut self, field: &FlowField) {
        self.apply_force(field.lookup(self.pos));
    }

    pub fn apply_cohesion(&mut self, center: Point, pull: f64, speed_factor: f64) {
        let to_center = center - self.pos;
        if to_center.hypot2() > COHESION_MIN_DIST_SQ {
            self.apply_force(set_mag(to_center, pull * speed_factor));
        }
    }

    pub fn max_speed(&self, speed_factor: f64) -> f64 {
        self.base_speed * speed_factor
    }

    /// Symplectic Euler step with a velocity cap. Clears acceleration.
    pub fn integrate(&mut self, max_speed: f64) {
        self.vel = limit(self.vel + self.acc, max_speed);
        self.pos += self.vel;
        self.acc = Vec2::ZERO;
    }

    /// Teleport across any crossed edge. Returns `true` if any axis wrapped.
    ///
    /// `prev` follows the teleport so the next trail segment does not span the canvas.
    pub fn wrap_edges(&mut self, canvas: Canvas) -> bool {
        let (w, h) = (canvas.width_f64(), canvas.height_f64());
        let mut wrapped = false;
        if self.pos.x > w {
            self.pos.x = 0.0;
            wrapped = true;
        }
        if self.pos.x < 0.0 {
            self.pos.x = w;
            wrapped = true;
        }
        if self.pos.y > h {
            self.pos.y = 0.0;
            wrapped = true;
        }
        if self.pos.y < 0.0 {
            self.pos.y = h;
            wrapped = true;
        }
        if wrapped {
            self.prev = self.pos;
        }
        wrapped
    }

    /// Follow, cohere, integrate and wrap. Returns whether the particle wrapped.
    pub fn advance(&mut self, field: &FlowField, canvas: Canvas, speed_factor: f64) -> bool {
        self.follow(field);
        self.apply_cohesion(canvas.center(), COHESION_PULL, speed_factor);
        self.integrate(self.max_speed(speed_factor));
        self.wrap_edges(canvas)
    }

    pub fn stroke_weight(&self, size_factor: f64) -> f64 {
        self.base_weight * size_factor
    }

    /// The segment from the previous to the current position. Moves `prev` forward.
    pub fn take_trail_segment(&mut self, size_factor: f64) -> TrailSegment {
        let seg = TrailSegment {
            from: self.prev,
            to: self.pos,
            width: self.stroke_weight(size_factor),
            color: self.color,
        };
        self.prev = self.pos;
        seg
    }

    pub fn emit_trail_segment(&mut self, surface: &mut dyn TrailSurface, size_factor: f64) {
        let seg = self.take_trail_segment(size_factor);
        surface.stroke_segment(&seg);
    }

    /// Pick a random swatch and a random alpha. Empty palettes fall back to opaque white.
    pub fn refresh_color(&mut self, palette: &Palette, rng: &mut dyn RandomSource) {
        let swatches = palette.swatches();
        if swatches.is_empty() {
            self.color = FALLBACK_COLOR;
            return;
        }
        let swatch = swatches[rng.index(swatches.len())];
        let alpha = rng.uniform(ALPHA_RANGE.0, ALPHA_RANGE.1);
        self.color = swatch.with_alpha(alpha.clamp(0.0, 255.0) as u8);
    }

    pub fn reset_position(&mut self, canvas: Canvas, rng: &mut dyn RandomSource) {
        self.pos = random_point(canvas, rng);
        self.prev = self.pos;
    }
}

fn random_point(canvas: Canvas, rng: &mut dyn RandomSource) -> Point {
    let x = rng.uniform(0.0, canvas.width_f64());
    let y = rng.uniform(0.0, canvas.height_f64());
    Point::new(x, y)
}

#[cfg(test)]
#[path = "../../tests/unit/sim/particle.rs"]
mod tests;
