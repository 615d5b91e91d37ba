use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{FlowError, FlowResult};
use crate::params::controller::ConfigPatch;
use crate::sim::simulation::TickThreading;

/// A headless run: canvas, frame count, seed, initial knobs and scripted live changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub canvas: Canvas,
    pub frames: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub threading: TickThreading,
    #[serde(default)]
    pub params: ConfigPatch,
    #[serde(default)]
    pub schedule: Vec<ScheduledEvent>,
}

/// An entry point invoked right before the tick of `frame`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduledEvent {
    pub frame: u64,
    pub action: SessionAction,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum SessionAction {
    Patch(ConfigPatch),
    Resize { width: u32, height: u32 },
    SetPalette { index: i64 },
    ToggleAutomation,
    Reset,
}

impl SessionConfig {
    pub fn new(canvas: Canvas, frames: u64) -> Self {
        Self {
            canvas,
            frames,
            seed: None,
            threading: TickThreading::default(),
            params: ConfigPatch::default(),
            schedule: Vec::new(),
        }
    }

    pub fn from_json_str(s: &str) -> FlowResult<Self> {
        let mut cfg: Self =
            serde_json::from_str(s).map_err(|e| FlowError::serde(format!("{e}")))?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> FlowResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            FlowError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    pub fn to_json_pretty(&self) -> FlowResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FlowError::serde(format!("{e}")))
    }

    /// Stable-sort the schedule by frame so same-frame events keep file order.
    pub fn normalize(&mut self) {
        self.schedule.sort_by_key(|ev| ev.frame);
    }

    pub fn validate(&self) -> FlowResult<()> {
        check_dims("canvas", self.canvas.width, self.canvas.height)?;
        if self.frames == 0 {
            return Err(FlowError::validation("frames must be >= 1"));
        }
        if let Some(n) = self.threading.threads
            && n == 0
        {
            return Err(FlowError::validation("threading.threads must be >= 1"));
        }
        for ev in &self.schedule {
            if ev.frame >= self.frames {
                tracing::warn!(
                    frame = ev.frame,
                    frames = self.frames,
                    "scheduled event falls after the last frame and will not run"
                );
            }
            if let SessionAction::Resize { width, height } = ev.action {
                check_dims("resize", width, height)?;
            }
        }
        Ok(())
    }
}

fn check_dims(what: &str, width: u32, height: u32) -> FlowResult<()> {
    if width == 0 || height == 0 {
        return Err(FlowError::validation(format!(
            "{what} dimensions must be non-zero, got {width}x{height}"
        )));
    }
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(FlowError::validation(format!(
            "{what} dimensions exceed {}, got {width}x{height}",
            u16::MAX
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
