use std::path::Path;

use crate::foundation::error::{FlowError, FlowResult};
use crate::params::controller::ParameterState;
use crate::render::cpu::CpuTrailSurface;
use crate::render::surface::FrameRGBA;
use crate::session::config::{SessionAction, SessionConfig};
use crate::sim::simulation::{Simulation, TickStats};

pub const DEFAULT_SEED: u64 = 0x5eed_f10e;

/// Result of a headless run.
#[derive(Clone, Debug)]
pub struct SessionOutcome {
    pub frame: FrameRGBA,
    pub frames_run: u64,
    pub last_stats: TickStats,
    pub total_wrapped: u64,
}

/// Drive a [`Simulation`] for `cfg.frames` ticks on a CPU surface, firing scheduled
/// entry points before the tick of their frame.
pub fn run_session(cfg: &SessionConfig) -> FlowResult<SessionOutcome> {
    cfg.validate()?;
    let seed = cfg.seed.unwrap_or(DEFAULT_SEED);

    let mut sim = Simulation::new(cfg.canvas, ParameterState::default(), seed)
        .with_threading(cfg.threading.clone())?;
    sim.apply_config(&cfg.params);

    let mut surface =
        CpuTrailSurface::new(cfg.canvas.width, cfg.canvas.height, sim.background())?;
    let (mut width, mut height) = (cfg.canvas.width, cfg.canvas.height);

    let mut events = cfg.schedule.iter().peekable();
    let mut last_stats = TickStats::default();
    let mut total_wrapped = 0u64;

    tracing::info!(
        width,
        height,
        frames = cfg.frames,
        seed,
        particles = sim.swarm().len(),
        "session start"
    );

    for f in 0..cfg.frames {
        while let Some(ev) = events.next_if(|ev| ev.frame <= f) {
            tracing::debug!(frame = f, action = ?ev.action, "scheduled event");
            match &ev.action {
                SessionAction::Patch(patch) => sim.apply_config(patch),
                SessionAction::Resize {
                    width: w,
                    height: h,
                } => {
                    width = *w;
                    height = *h;
                    sim.resize(width, height);
                }
                SessionAction::SetPalette { index } => {
                    sim.set_palette(*index);
                }
                SessionAction::ToggleAutomation => {
                    sim.toggle_automation();
                }
                SessionAction::Reset => sim.reset(),
            }
        }

        last_stats = sim.tick(width, height, &mut surface)?;
        total_wrapped += last_stats.wrapped as u64;
    }

    tracing::info!(
        frames = cfg.frames,
        particles = last_stats.particles,
        wrapped = total_wrapped,
        "session done"
    );

    Ok(SessionOutcome {
        frame: surface.readback(),
        frames_run: cfg.frames,
        last_stats,
        total_wrapped,
    })
}

/// Write `frame` as a straight-alpha PNG, creating parent directories.
pub fn save_png(frame: &FrameRGBA, path: &Path) -> FlowResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            FlowError::render(format!(
                "failed to create output dir '{}': {e}",
                parent.display()
            ))
        })?;
    }

    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| FlowError::render(format!("failed to write png '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/session/run.rs"]
mod tests;
