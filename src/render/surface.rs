use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::FlowResult;

/// One frame's worth of trail for one particle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrailSegment {
    pub from: Point,
    pub to: Point,
    pub width: f64,
    pub color: Rgba8,
}

impl TrailSegment {
    pub fn length(&self) -> f64 {
        (self.to - self.from).hypot()
    }
}

/// A drawing target that keeps previous frames' pixels.
///
/// A frame is bracketed by [`begin_frame`](TrailSurface::begin_frame) and
/// [`end_frame`](TrailSurface::end_frame). Draw order between segments of one frame
/// carries no meaning.
pub trait TrailSurface {
    /// Prepare a frame of the given size. `clear` fills the whole surface first; a size
    /// change always discards the previous contents.
    fn begin_frame(&mut self, width: u32, height: u32, clear: Option<Rgba8>) -> FlowResult<()>;

    fn stroke_segment(&mut self, segment: &TrailSegment);

    fn end_frame(&mut self) -> FlowResult<()>;
}

/// Premultiplied RGBA8 pixels read back from a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Surface that only records what it is asked to draw.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub size: Option<(u32, u32)>,
    pub clears: Vec<Rgba8>,
    pub frames: u64,
    pub segments: Vec<TrailSegment>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_segments(&mut self) -> Vec<TrailSegment> {
        std::mem::take(&mut self.segments)
    }
}

impl TrailSurface for RecordingSurface {
    fn begin_frame(&mut self, width: u32, height: u32, clear: Option<Rgba8>) -> FlowResult<()> {
        self.size = Some((width, height));
        if let Some(c) = clear {
            self.clears.push(c);
        }
        Ok(())
    }

    fn stroke_segment(&mut self, segment: &TrailSegment) {
        self.segments.push(*segment);
    }

    fn end_frame(&mut self) -> FlowResult<()> {
        self.frames += 1;
        Ok(())
    }
}
