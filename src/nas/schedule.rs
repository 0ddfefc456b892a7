//! Linear temperature annealing for mixture layers

use crate::error::{NasError, Result};
use crate::nn::{ParamRegistry, Temperature};
use crate::train::{CallbackAction, CallbackContext, TrainerCallback};
use serde::{Deserialize, Serialize};

/// Linear ramp from `start_temp` at `start_epoch` to `end_temp` at `final_epoch`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSchedule {
    pub start_epoch: usize,
    pub final_epoch: usize,
    pub start_temp: f32,
    pub end_temp: f32,
}

impl Default for TemperatureSchedule {
    fn default() -> Self {
        Self { start_epoch: 0, final_epoch: 10, start_temp: 5.0, end_temp: 0.1 }
    }
}

impl TemperatureSchedule {
    /// Check that the schedule anneals downward over a non-empty epoch range
    pub fn validate(&self) -> Result<()> {
        if !(self.start_temp.is_finite() && self.end_temp.is_finite()) {
            return Err(NasError::InvalidSchedule(format!(
                "temperatures must be finite (start_temp {}, end_temp {})",
                self.start_temp, self.end_temp
            )));
        }
        if self.start_temp <= self.end_temp {
            return Err(NasError::InvalidSchedule(format!(
                "start_temp ({}) must be greater than end_temp ({})",
                self.start_temp, self.end_temp
            )));
        }
        if self.end_temp <= 0.0 {
            return Err(NasError::InvalidSchedule(format!(
                "end_temp ({}) must be > 0",
                self.end_temp
            )));
        }
        if self.final_epoch <= self.start_epoch {
            return Err(NasError::InvalidSchedule(format!(
                "final_epoch ({}) must be greater than start_epoch ({})",
                self.final_epoch, self.start_epoch
            )));
        }
        Ok(())
    }

    /// Temperature for `epoch`
    ///
    /// `max(start + delta * max(epoch - start_epoch, 0), end)` with
    /// `delta = (end - start) / (final_epoch - start_epoch)`.
    pub fn temperature_at(&self, epoch: usize) -> f32 {
        let start = f64::from(self.start_temp);
        let end = f64::from(self.end_temp);
        let span = self.final_epoch.saturating_sub(self.start_epoch).max(1) as f64;
        let delta = (end - start) / span;
        let elapsed = epoch.saturating_sub(self.start_epoch) as f64;
        (start + delta * elapsed).max(end) as f32
    }
}

/// Writes the scheduled temperature into every mixture layer at epoch start
pub struct TemperatureScheduler {
    schedule: TemperatureSchedule,
    temperatures: Vec<Temperature>,
    current: Option<f32>,
}

impl TemperatureScheduler {
    /// Collect the temperature slot of every mixture in `registry`
    pub fn new(registry: &ParamRegistry, schedule: TemperatureSchedule) -> Result<Self> {
        schedule.validate()?;
        let temperatures: Vec<Temperature> =
            registry.mixtures().iter().map(|m| m.temperature.clone()).collect();
        log::info!("Temperature Variables Found: {}", temperatures.len());
        Ok(Self { schedule, temperatures, current: None })
    }

    pub fn schedule(&self) -> &TemperatureSchedule {
        &self.schedule
    }

    /// Number of temperature slots driven by this scheduler
    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    /// Last temperature broadcast, if any
    pub fn current(&self) -> Option<f32> {
        self.current
    }

    /// Compute the temperature for `epoch` and write it to every slot
    pub fn apply(&mut self, epoch: usize) -> f32 {
        log::info!("Epoch {epoch}");
        let temperature = self.schedule.temperature_at(epoch);
        log::info!("Temperature {temperature}");

        for slot in &self.temperatures {
            slot.set(temperature);
        }
        self.current = Some(temperature);
        temperature
    }
}

impl TrainerCallback for TemperatureScheduler {
    fn on_epoch_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.apply(ctx.epoch);
        CallbackAction::Continue
    }

    fn name(&self) -> &'static str {
        "TemperatureScheduler"
    }
}
