//! Fixed timestep driver
//!
//! Accumulates real frame time and runs the simulation in constant `SIM_DT`
//! steps. Leftover time is returned as an interpolation factor for the
//! renderer.

use crate::clamp01;
use crate::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone)]
pub struct FixedStepDriver {
    dt: f32,
    accumulator: f32,
    paused: bool,
    max_frame_time: f32,
    max_substeps: u32,
}

impl Default for FixedStepDriver {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

impl FixedStepDriver {
    /// A non-positive or non-finite `dt` falls back to `SIM_DT`
    pub fn new(dt: f32) -> Self {
        let dt = if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            log::warn!("invalid timestep {dt}, using {SIM_DT}");
            SIM_DT
        };
        Self {
            dt,
            accumulator: 0.0,
            paused: false,
            max_frame_time: MAX_FRAME_TIME,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Feed one real frame. Runs `step` once per whole timestep and returns
    /// the leftover fraction of a step (0..1).
    pub fn advance(&mut self, frame_time: f32, mut step: impl FnMut(f32)) -> f32 {
        if self.paused || !frame_time.is_finite() || frame_time <= 0.0 {
            return self.alpha();
        }
        // A stall must not turn into a catch-up burst
        self.accumulator += frame_time.min(self.max_frame_time);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            step(self.dt);
            self.accumulator -= self.dt;
            substeps += 1;
        }
        if substeps == self.max_substeps && self.accumulator >= self.dt {
            log::debug!("dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator %= self.dt;
        }
        self.alpha()
    }

    pub fn alpha(&self) -> f32 {
        clamp01(self.accumulator / self.dt)
    }

    /// Stop stepping (e.g. window hidden)
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume without replaying the time spent paused
    pub fn resume(&mut self) {
        self.paused = false;
        self.accumulator = 0.0;
    }
}
