use std::time::{Duration, Instant};

use tracing::info;

use crate::config::{SamplerSettings, Variant};
use crate::reading::TemperatureUnit;
use crate::sampler::{Clock, Sampler, TemperatureSource, UniformSource};

// Main application state
pub struct App {
    pub sampler: Sampler,
    pub unit: TemperatureUnit,
    pub variant: Variant,
    pub tick_rate: Duration,
    last_tick: Option<Instant>,
}

impl App {
    pub fn new(settings: &SamplerSettings, unit: TemperatureUnit, clock: Box<dyn Clock>) -> App {
        let source = UniformSource::new(settings.low, settings.high, settings.seed);
        App::with_source(settings, unit, Box::new(source), clock)
    }

    pub fn with_source(
        settings: &SamplerSettings,
        unit: TemperatureUnit,
        source: Box<dyn TemperatureSource>,
        clock: Box<dyn Clock>,
    ) -> App {
        App {
            sampler: Sampler::new(settings.capacity, source, clock),
            unit,
            variant: settings.variant,
            tick_rate: settings.interval,
            last_tick: None,
        }
    }

    /// True before the first reading and whenever the interval has elapsed.
    pub fn tick_due(&self, now: Instant) -> bool {
        match self.last_tick {
            None => true,
            Some(last) => now.duration_since(last) >= self.tick_rate,
        }
    }

    /// How long input polling may block before the next tick.
    pub fn time_until_tick(&self, now: Instant) -> Duration {
        match self.last_tick {
            None => Duration::ZERO,
            Some(last) => self.tick_rate.saturating_sub(now.duration_since(last)),
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.sampler.tick();
        self.last_tick = Some(now);
    }

    pub fn toggle_unit(&mut self) {
        self.unit = self.unit.toggled();
        info!(unit = self.unit.symbol(), "display unit changed");
    }
}
