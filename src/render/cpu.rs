use crate::foundation::core::Rgba8;
use crate::foundation::error::{FlowError, FlowResult};
use crate::render::composite::{fill, over_in_place};
use crate::render::surface::{FrameRGBA, TrailSegment, TrailSurface};

/// Raster [`TrailSurface`] backed by `vello_cpu`.
///
/// Segments of one frame are rasterized into a transparent scratch pixmap and then
/// composited over a persistent premultiplied buffer, so earlier frames stay visible.
pub struct CpuTrailSurface {
    width: u16,
    height: u16,
    accum: Vec<u8>,
    scratch: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    pending: usize,
}

impl CpuTrailSurface {
    pub fn new(width: u32, height: u32, background: Rgba8) -> FlowResult<Self> {
        let (w, h) = surface_dims(width, height)?;
        let mut accum = vec![0u8; usize::from(w) * usize::from(h) * 4];
        fill(&mut accum, background.to_premul());
        Ok(Self {
            width: w,
            height: h,
            accum,
            scratch: vello_cpu::Pixmap::new(w, h),
            ctx: None,
            pending: 0,
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Copy of the accumulated pixels.
    pub fn readback(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.accum.clone(),
            premultiplied: true,
        }
    }

    fn reallocate(&mut self, w: u16, h: u16) {
        tracing::debug!(width = w, height = h, "reallocating trail surface");
        self.width = w;
        self.height = h;
        self.accum = vec![0u8; usize::from(w) * usize::from(h) * 4];
        self.scratch = vello_cpu::Pixmap::new(w, h);
        self.ctx = None;
    }
}

impl TrailSurface for CpuTrailSurface {
    fn begin_frame(&mut self, width: u32, height: u32, clear: Option<Rgba8>) -> FlowResult<()> {
        let (w, h) = surface_dims(width, height)?;
        let resized = w != self.width || h != self.height;
        if resized {
            self.reallocate(w, h);
        }
        match clear {
            Some(c) => fill(&mut self.accum, c.to_premul()),
            None if resized => fill(&mut self.accum, Rgba8::BLACK.to_premul()),
            None => {}
        }

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx = Some(ctx);
        self.pending = 0;
        Ok(())
    }

    fn stroke_segment(&mut self, segment: &TrailSegment) {
        let Some(ctx) = self.ctx.as_mut() else {
            tracing::warn!("stroke_segment called outside a frame; dropping segment");
            return;
        };
        if segment.width.is_nan()
            || segment.width <= 0.0
            || !segment.from.is_finite()
            || !segment.to.is_finite()
        {
            return;
        }

        let c = segment.color;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(segment.width).with_caps(vello_cpu::kurbo::Cap::Round),
        );
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(vello_cpu::kurbo::Point::new(segment.from.x, segment.from.y));
        path.line_to(vello_cpu::kurbo::Point::new(segment.to.x, segment.to.y));
        ctx.stroke_path(&path);
        self.pending += 1;
    }

    fn end_frame(&mut self) -> FlowResult<()> {
        let Some(ctx) = self.ctx.as_mut() else {
            return Err(FlowError::render("end_frame called without begin_frame"));
        };
        if self.pending == 0 {
            return Ok(());
        }

        ctx.flush();
        fill(self.scratch.data_as_u8_slice_mut(), [0, 0, 0, 0]);
        ctx.render_to_pixmap(&mut self.scratch);
        over_in_place(&mut self.accum, self.scratch.data_as_u8_slice())?;
        self.pending = 0;
        Ok(())
    }
}

fn surface_dims(width: u32, height: u32) -> FlowResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(FlowError::validation(format!(
            "surface must be non-empty, got {width}x{height}"
        )));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| FlowError::validation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FlowError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
