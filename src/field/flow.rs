use std::f64::consts::TAU;

use crate::field::noise::NoiseSource;
use crate::foundation::core::{Canvas, Point, Vec2};

/// Pixel spacing between flow-field samples.
pub const CELL_SIZE: f64 = 28.0;
/// Length of every field vector. This is a per-frame steering force, not a velocity.
pub const FIELD_MAGNITUDE: f64 = 0.9;
/// Time-slice advance per regeneration.
pub const Z_INCREMENT: f64 = 0.002;
/// Lower bound applied to the raw "fluency" value before it is inverted.
pub const MIN_FLUENCY: f64 = 0.0001;

/// Grid dimensions `(cols, rows)` covering `canvas` at `cell_size` spacing.
pub fn grid_dims(canvas: Canvas, cell_size: f64) -> (usize, usize) {
    let cell = cell_size.max(1.0);
    let cols = (canvas.width_f64() / cell).floor() as usize + 1;
    let rows = (canvas.height_f64() / cell).floor() as usize + 1;
    (cols, rows)
}

/// Noise-space distance between neighbouring cells for a raw fluency value.
///
/// Larger fluency means a smaller step and therefore smoother, larger-scale flow.
pub fn sampling_step(fluency_raw: f64) -> f64 {
    let safe = if fluency_raw.is_finite() {
        fluency_raw.max(MIN_FLUENCY)
    } else {
        MIN_FLUENCY
    };
    1.0 / safe
}

/// Row-major grid of steering vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    cols: usize,
    rows: usize,
    cell_size: f64,
    vectors: Vec<Vec2>,
}

impl FlowField {
    pub fn new(canvas: Canvas, cell_size: f64) -> Self {
        let (cols, rows) = grid_dims(canvas, cell_size);
        Self {
            cols,
            rows,
            cell_size: cell_size.max(1.0),
            vectors: vec![Vec2::ZERO; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn vectors(&self) -> &[Vec2] {
        &self.vectors
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Vec2> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.vectors.get(col + row * self.cols).copied()
    }

    /// Cell index under `pos`, clamped into the grid.
    ///
    /// Positions outside the canvas (before edge wrapping, or just after a resize) map
    /// to the nearest border cell.
    pub fn cell_at(&self, pos: Point) -> (usize, usize) {
        fn axis(v: f64, cell: f64, len: usize) -> usize {
            let i = (v / cell).floor();
            if i.is_nan() || i < 0.0 {
                0
            } else {
                (i as usize).min(len.saturating_sub(1))
            }
        }
        (
            axis(pos.x, self.cell_size, self.cols),
            axis(pos.y, self.cell_size, self.rows),
        )
    }

    pub fn lookup(&self, pos: Point) -> Vec2 {
        let (col, row) = self.cell_at(pos);
        self.vectors[col + row * self.cols]
    }

    fn matches(&self, canvas: Canvas) -> bool {
        grid_dims(canvas, self.cell_size) == (self.cols, self.rows)
    }
}

/// Regenerates a [`FlowField`] from a noise source every frame.
#[derive(Clone, Debug)]
pub struct FlowFieldGenerator {
    field: FlowField,
    magnitude: f64,
    z_increment: f64,
    z_offset: f64,
}

impl FlowFieldGenerator {
    pub fn new(canvas: Canvas) -> Self {
        Self::with_cell_size(canvas, CELL_SIZE)
    }

    pub fn with_cell_size(canvas: Canvas, cell_size: f64) -> Self {
        Self {
            field: FlowField::new(canvas, cell_size),
            magnitude: FIELD_MAGNITUDE,
            z_increment: Z_INCREMENT,
            z_offset: 0.0,
        }
    }

    pub fn field(&self) -> &FlowField {
        &self.field
    }

    pub fn z_offset(&self) -> f64 {
        self.z_offset
    }

    /// Discard the current field and allocate one sized for `canvas`.
    pub fn reset_grid(&mut self, canvas: Canvas) {
        self.field = FlowField::new(canvas, self.field.cell_size);
    }

    /// Resample every cell at the current time slice, then advance the time slice.
    ///
    /// Angle is `noise * 4π`, so the noise range sweeps two full turns.
    pub fn regenerate<N: NoiseSource + ?Sized>(
        &mut self,
        noise: &N,
        canvas: Canvas,
        step: f64,
    ) -> &FlowField {
        if !self.field.matches(canvas) {
            tracing::debug!(
                width = canvas.width,
                height = canvas.height,
                "flow field size mismatch, reallocating grid"
            );
            self.reset_grid(canvas);
        }

        let cols = self.field.cols;
        for (i, cell) in self.field.vectors.iter_mut().enumerate() {
            let x = (i % cols) as f64 * step;
            let y = (i / cols) as f64 * step;
            let angle = noise.sample(x, y, self.z_offset) * TAU * 2.0;
            *cell = Vec2::from_angle(angle) * self.magnitude;
        }
        self.z_offset += self.z_increment;
        &self.field
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/flow.rs"]
mod tests;
