use super::*;
use crate::field::flow::FIELD_MAGNITUDE;
use crate::render::cpu::CpuTrailSurface;
use crate::render::surface::RecordingSurface;

struct ConstNoise(f64);

impl NoiseSource for ConstNoise {
    fn sample(&self, _x: f64, _y: f64, _z: f64) -> f64 {
        self.0
    }
}

fn state_with_population(n: u32) -> ParameterState {
    ParameterState {
        target_population: Some(n),
        ..ParameterState::default()
    }
}

fn sim(n: u32) -> Simulation {
    Simulation::new(Canvas::new(800, 600), state_with_population(n), 17)
}

#[test]
fn first_tick_clears_to_background_then_draws_one_segment_per_particle() {
    let mut s = sim(60);
    let mut surface = RecordingSurface::new();
    let stats = s.tick(800, 600, &mut surface).unwrap();
    assert!(stats.cleared);
    assert_eq!(surface.clears, vec![s.background()]);
    assert_eq!(surface.segments.len(), 60);
    assert_eq!((stats.cols, stats.rows), (29, 22));

    let stats = s.tick(800, 600, &mut surface).unwrap();
    assert!(!stats.cleared);
    assert_eq!(surface.clears.len(), 1);
    assert_eq!(surface.segments.len(), 120);
    assert_eq!(s.frame(), 2);
}

#[test]
fn default_population_follows_canvas_area() {
    let mut s = Simulation::new(Canvas::new(800, 600), ParameterState::default(), 1);
    assert_eq!(s.swarm().len(), 300);
    let mut surface = RecordingSurface::new();
    s.tick(800, 600, &mut surface).unwrap();
    assert_eq!(surface.segments.len(), 300);
}

#[test]
fn shrinking_population_keeps_first_particles() {
    let mut s = sim(300);
    let mut surface = RecordingSurface::new();
    s.tick(800, 600, &mut surface).unwrap();
    let head: Vec<_> = s.swarm().particles()[..50]
        .iter()
        .map(|p| p.color())
        .collect();

    s.apply_config(&ConfigPatch {
        target_population: Some(50.0),
        ..ConfigPatch::default()
    });
    assert_eq!(s.sync_particle_count(), -250);
    assert_eq!(s.swarm().len(), 50);
    assert_eq!(s.sync_particle_count(), 0);
    let kept: Vec<_> = s.swarm().particles().iter().map(|p| p.color()).collect();
    assert_eq!(kept, head);
}

#[test]
fn resize_rebuilds_grid_and_respawns_inside_bounds() {
    let mut s = sim(200);
    let mut surface = RecordingSurface::new();
    for _ in 0..5 {
        s.tick(800, 600, &mut surface).unwrap();
    }

    s.resize(400, 300);
    assert_eq!((s.field().cols(), s.field().rows()), (15, 11));
    assert_eq!(s.pending_clear(), Some(s.background()));
    for p in s.swarm().particles() {
        let pos = p.position();
        assert!(pos.x >= 0.0 && pos.x <= 400.0);
        assert!(pos.y >= 0.0 && pos.y <= 300.0);
        assert_eq!(p.previous_position(), pos);
    }
}

#[test]
fn tick_with_new_size_runs_resize_barrier_first() {
    let mut s = sim(80);
    let mut surface = RecordingSurface::new();
    s.tick(800, 600, &mut surface).unwrap();
    surface.take_segments();

    let stats = s.tick(400, 300, &mut surface).unwrap();
    assert!(stats.cleared);
    assert_eq!((stats.cols, stats.rows), (15, 11));
    assert_eq!(surface.size, Some((400, 300)));
    for seg in &surface.segments {
        // one step from an in-bounds spawn can overshoot by at most the speed cap
        assert!(seg.from.x <= 400.0 && seg.from.y <= 300.0);
        assert!(seg.length() <= 2.4 + 1e-9);
    }
}

#[test]
fn palette_switch_recolors_everyone_and_queues_clear() {
    let mut s = sim(90);
    let mut surface = RecordingSurface::new();
    s.tick(800, 600, &mut surface).unwrap();
    let positions: Vec<_> = s.swarm().particles().iter().map(|p| p.position()).collect();

    assert!(s.set_palette(6));
    assert_eq!(s.palette().name(), "Ocean");
    assert_eq!(s.pending_clear(), Some(s.palette().background()));
    let ocean = s.palette().clone();
    for (p, pos) in s.swarm().particles().iter().zip(&positions) {
        assert_eq!(p.position(), *pos);
        assert!(
            ocean
                .swatches()
                .iter()
                .any(|c| c.with_alpha(p.color().a) == p.color())
        );
    }
    assert!(!s.set_palette(6));
}

#[test]
fn palette_index_is_clamped() {
    let mut s = sim(10);
    assert!(s.set_palette(42));
    assert_eq!(s.params().palette_index, 8);
    assert_eq!(s.palette().name(), "Canyon");
}

#[test]
fn reset_scatters_and_clears() {
    let mut s = sim(30);
    let mut surface = RecordingSurface::new();
    s.tick(800, 600, &mut surface).unwrap();
    let before: Vec<_> = s.swarm().particles().iter().map(|p| p.position()).collect();
    s.reset();
    assert_eq!(s.pending_clear(), Some(s.background()));
    let after: Vec<_> = s.swarm().particles().iter().map(|p| p.position()).collect();
    assert_ne!(before, after);
    assert_eq!(after.len(), 30);
}

#[test]
fn automation_drives_knobs_each_tick() {
    let mut s = sim(20);
    let mut surface = RecordingSurface::new();
    assert_eq!(s.toggle_automation(), AutomationMode::Automated);
    let phase0 = s.params().auto_phase;
    let stats = s.tick(800, 600, &mut surface).unwrap();
    assert!(stats.automated);
    let p = s.params();
    assert!((p.auto_phase - phase0 - crate::params::automation::PHASE_STEP).abs() < 1e-12);
    assert_eq!(
        p.speed_factor,
        crate::params::automation::SPEED_OSC.sample(p.auto_phase)
    );

    assert_eq!(s.toggle_automation(), AutomationMode::Manual);
    let frozen = s.params();
    let stats = s.tick(800, 600, &mut surface).unwrap();
    assert!(!stats.automated);
    assert_eq!(s.params().speed_factor, frozen.speed_factor);
}

#[test]
fn automated_initial_state_gets_random_phase() {
    let s = Simulation::new(
        Canvas::new(200, 200),
        ParameterState {
            auto_animate: true,
            ..ParameterState::default()
        },
        3,
    );
    assert_eq!(s.mode(), AutomationMode::Automated);
    assert_ne!(s.params().auto_phase, 0.0);
}

#[test]
fn constant_field_gives_exact_trajectory() {
    // noise 0 -> every cell points along +x with the force magnitude
    let state = ParameterState {
        target_population: Some(20),
        speed_factor: 1.0,
        ..ParameterState::default()
    };
    let mut s = Simulation::with_sources(
        Canvas::new(800, 600),
        state,
        ConstNoise(0.0),
        SeededRandom::from_seed(9),
    );
    let start: Vec<_> = s.swarm().particles().to_vec();

    let mut surface = RecordingSurface::new();
    s.tick(800, 600, &mut surface).unwrap();

    for (before, after) in start.iter().zip(s.swarm().particles()) {
        let mut expected = before.clone();
        expected.apply_force(crate::foundation::core::Vec2::new(FIELD_MAGNITUDE, 0.0));
        expected.apply_cohesion(
            Canvas::new(800, 600).center(),
            crate::sim::particle::COHESION_PULL,
            1.0,
        );
        expected.integrate(expected.max_speed(1.0));
        expected.wrap_edges(Canvas::new(800, 600));
        assert_eq!(after.position(), expected.position());
        assert_eq!(after.velocity(), expected.velocity());
    }
}

#[test]
fn parallel_pass_matches_serial() {
    let run = |parallel: bool| {
        let mut s = sim(250)
            .with_threading(TickThreading {
                parallel,
                threads: Some(3),
            })
            .unwrap();
        let mut surface = RecordingSurface::new();
        for _ in 0..10 {
            s.tick(800, 600, &mut surface).unwrap();
        }
        surface.segments
    };
    assert_eq!(run(false), run(true));
}

#[test]
fn zero_threads_is_rejected() {
    let err = sim(5)
        .with_threading(TickThreading {
            parallel: true,
            threads: Some(0),
        })
        .err()
        .unwrap();
    assert!(err.to_string().contains("threads"));
}

#[test]
fn rejected_frame_leaves_state_untouched() {
    let mut s = Simulation::new(Canvas::new(200, 150), state_with_population(30), 4);
    let mut surface = CpuTrailSurface::new(200, 150, s.background()).unwrap();
    s.tick(200, 150, &mut surface).unwrap();
    s.toggle_automation();

    let params = s.params();
    let field = s.field().clone();
    let z = s.generator.z_offset();
    let particles = s.swarm().particles().to_vec();

    for _ in 0..2 {
        assert!(s.tick(70_000, 150, &mut surface).is_err());
    }
    assert_eq!(s.params(), params);
    assert_eq!(s.field(), &field);
    assert_eq!(s.generator.z_offset(), z);
    assert_eq!(s.swarm().particles(), &particles[..]);
    assert_eq!(s.canvas(), Canvas::new(200, 150));
    assert_eq!(s.frame(), 1);

    // the surface still works at the old size and the queued state carries on
    let stats = s.tick(200, 150, &mut surface).unwrap();
    assert!(stats.automated);
    assert_eq!(s.frame(), 2);
}

#[test]
fn high_seed_bits_reach_the_noise() {
    assert_ne!(noise_seed(1), noise_seed(1 + (1 << 32)));

    let canvas = Canvas::new(280, 280);
    let field_for = |seed: u64| {
        let mut s = Simulation::new(canvas, state_with_population(20), seed);
        s.tick(280, 280, &mut RecordingSurface::new()).unwrap();
        s.field().clone()
    };
    assert_ne!(field_for(1), field_for(1 + (1 << 32)));
}
