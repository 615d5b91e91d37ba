use super::*;
use crate::foundation::core::Point;

fn seg(from: (f64, f64), to: (f64, f64), width: f64, color: Rgba8) -> TrailSegment {
    TrailSegment {
        from: Point::new(from.0, from.1),
        to: Point::new(to.0, to.1),
        width,
        color,
    }
}

#[test]
fn new_fills_background() {
    let bg = Rgba8::opaque(0x74, 0x8c, 0xab);
    let s = CpuTrailSurface::new(8, 4, bg).unwrap();
    let frame = s.readback();
    assert_eq!((frame.width, frame.height), (8, 4));
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(7, 3), Some([0x74, 0x8c, 0xab, 255]));
    assert_eq!(frame.pixel(8, 0), None);
}

#[test]
fn rejects_empty_and_oversized_surfaces() {
    assert!(CpuTrailSurface::new(0, 10, Rgba8::BLACK).is_err());
    assert!(CpuTrailSurface::new(70_000, 10, Rgba8::BLACK).is_err());
}

#[test]
fn strokes_accumulate_across_frames() {
    let mut s = CpuTrailSurface::new(32, 32, Rgba8::BLACK).unwrap();
    let white = Rgba8::WHITE;

    s.begin_frame(32, 32, None).unwrap();
    s.stroke_segment(&seg((2.0, 8.0), (30.0, 8.0), 3.0, white));
    s.end_frame().unwrap();

    s.begin_frame(32, 32, None).unwrap();
    s.stroke_segment(&seg((2.0, 24.0), (30.0, 24.0), 3.0, white));
    s.end_frame().unwrap();

    let frame = s.readback();
    let first = frame.pixel(16, 8).unwrap();
    let second = frame.pixel(16, 24).unwrap();
    assert!(first[0] > 200, "first trail faded: {first:?}");
    assert!(second[0] > 200, "second trail missing: {second:?}");
    assert_eq!(frame.pixel(16, 16), Some([0, 0, 0, 255]));
}

#[test]
fn clear_wipes_previous_trails() {
    let mut s = CpuTrailSurface::new(16, 16, Rgba8::BLACK).unwrap();
    s.begin_frame(16, 16, None).unwrap();
    s.stroke_segment(&seg((0.0, 8.0), (16.0, 8.0), 4.0, Rgba8::WHITE));
    s.end_frame().unwrap();

    let bg = Rgba8::opaque(10, 20, 30);
    s.begin_frame(16, 16, Some(bg)).unwrap();
    s.end_frame().unwrap();
    assert_eq!(s.readback().pixel(8, 8), Some([10, 20, 30, 255]));
}

#[test]
fn translucent_stroke_blends_with_background() {
    let mut s = CpuTrailSurface::new(16, 16, Rgba8::BLACK).unwrap();
    s.begin_frame(16, 16, None).unwrap();
    s.stroke_segment(&seg(
        (0.0, 8.0),
        (16.0, 8.0),
        6.0,
        Rgba8::new(255, 255, 255, 128),
    ));
    s.end_frame().unwrap();
    let px = s.readback().pixel(8, 8).unwrap();
    assert_eq!(px[3], 255);
    assert!(px[0] > 100 && px[0] < 160, "unexpected blend {px:?}");
}

#[test]
fn resize_reallocates() {
    let mut s = CpuTrailSurface::new(16, 16, Rgba8::BLACK).unwrap();
    s.begin_frame(8, 4, Some(Rgba8::WHITE)).unwrap();
    s.end_frame().unwrap();
    let frame = s.readback();
    assert_eq!((frame.width, frame.height), (8, 4));
    assert_eq!(frame.data.len(), 8 * 4 * 4);
}

#[test]
fn degenerate_segments_are_skipped() {
    let mut s = CpuTrailSurface::new(8, 8, Rgba8::BLACK).unwrap();
    s.begin_frame(8, 8, None).unwrap();
    s.stroke_segment(&seg((0.0, 0.0), (8.0, 8.0), 0.0, Rgba8::WHITE));
    s.stroke_segment(&seg((f64::NAN, 0.0), (8.0, 8.0), 2.0, Rgba8::WHITE));
    s.end_frame().unwrap();
    assert!(
        s.readback()
            .data
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255])
    );
}

#[test]
fn end_without_begin_is_an_error() {
    let mut s = CpuTrailSurface::new(8, 8, Rgba8::BLACK).unwrap();
    assert!(s.end_frame().is_err());
}
