use super::*;

#[test]
fn canvas_never_collapses_to_zero() {
    let c = Canvas::new(0, 0);
    assert_eq!((c.width, c.height), (1, 1));
    assert_eq!(Canvas::new(800, 600).center(), Point::new(400.0, 300.0));
}

#[test]
fn premul_matches_straight_for_opaque() {
    let c = Rgba8::opaque(12, 200, 99);
    assert_eq!(c.to_premul(), [12, 200, 99, 255]);
    assert_eq!(Rgba8::new(255, 255, 255, 0).to_premul(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::new(255, 0, 0, 128).to_premul(), [128, 0, 0, 128]);
}

#[test]
fn set_mag_rescales_and_keeps_zero() {
    let v = set_mag(Vec2::new(3.0, 4.0), 0.9);
    assert!((v.hypot() - 0.9).abs() < 1e-12);
    assert!((v.x / v.y - 0.75).abs() < 1e-12);
    assert_eq!(set_mag(Vec2::ZERO, 5.0), Vec2::ZERO);
}

#[test]
fn limit_only_shrinks() {
    let short = Vec2::new(0.5, 0.0);
    assert_eq!(limit(short, 2.0), short);
    let long = limit(Vec2::new(30.0, 40.0), 2.0);
    assert!((long.hypot() - 2.0).abs() < 1e-12);
}
