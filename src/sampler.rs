use std::{collections::VecDeque, sync::Arc};

use chrono::{Local, NaiveDateTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::reading::{Reading, TemperatureUnit};

// ----------------------
// Collaborators
// ----------------------

pub trait TemperatureSource {
    fn next_celsius(&mut self) -> f64;
}

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Uniform draw from an inclusive Celsius range.
pub struct UniformSource {
    rng: StdRng,
    low: f64,
    high: f64,
}

impl UniformSource {
    pub fn new(low: f64, high: f64, seed: Option<u64>) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, low, high }
    }
}

impl TemperatureSource for UniformSource {
    fn next_celsius(&mut self) -> f64 {
        self.rng.gen_range(self.low..=self.high)
    }
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

// ----------------------
// Snapshot
// ----------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub temperature: f64,
    pub timestamp: String,
}

/// Immutable view of the history, rebuilt once per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub readings: Vec<Reading>,
    /// Celsius rows, oldest first.
    pub table: Vec<TableRow>,
    pub latest: Option<Reading>,
}

impl Snapshot {
    fn from_history(history: &VecDeque<Reading>) -> Self {
        let readings: Vec<Reading> = history.iter().cloned().collect();
        let table = readings
            .iter()
            .map(|r| TableRow {
                temperature: r.celsius(),
                timestamp: r.timestamp().to_string(),
            })
            .collect();
        let latest = readings.last().cloned();
        Self { readings, table, latest }
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reading values in the requested unit, chronological.
    pub fn values_in(&self, unit: TemperatureUnit) -> Vec<f64> {
        self.readings.iter().map(|r| r.value_in(unit)).collect()
    }

    pub fn table_in(&self, unit: TemperatureUnit) -> Vec<TableRow> {
        self.table
            .iter()
            .map(|row| TableRow {
                temperature: unit.from_celsius(row.temperature),
                timestamp: row.timestamp.clone(),
            })
            .collect()
    }
}

// ----------------------
// Sampler
// ----------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Empty,
    Populated,
}

pub struct Sampler {
    history: VecDeque<Reading>,
    capacity: usize,
    source: Box<dyn TemperatureSource>,
    clock: Box<dyn Clock>,
    snapshot: Arc<Snapshot>,
}

impl Sampler {
    /// `capacity` is clamped to at least one reading.
    pub fn new(capacity: usize, source: Box<dyn TemperatureSource>, clock: Box<dyn Clock>) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            source,
            clock,
            snapshot: Arc::new(Snapshot::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn state(&self) -> SamplerState {
        if self.history.is_empty() {
            SamplerState::Empty
        } else {
            SamplerState::Populated
        }
    }

    pub fn tick(&mut self) -> &Reading {
        let reading = Reading::new(self.source.next_celsius(), self.clock.now());

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(reading);
        self.snapshot = Arc::new(Snapshot::from_history(&self.history));

        let latest = &self.history[self.history.len() - 1];
        debug!(
            value = latest.celsius(),
            timestamp = latest.timestamp(),
            len = self.history.len(),
            "sampled reading"
        );
        latest
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::cell::Cell;

    /// Replays fixed values, cycling when exhausted.
    pub struct ScriptedSource {
        values: Vec<f64>,
        next: usize,
    }

    impl ScriptedSource {
        pub fn new(values: &[f64]) -> Self {
            Self { values: values.to_vec(), next: 0 }
        }
    }

    impl TemperatureSource for ScriptedSource {
        fn next_celsius(&mut self) -> f64 {
            let v = self.values[self.next % self.values.len()];
            self.next += 1;
            v
        }
    }

    /// Advances one second on every read.
    pub struct StepClock {
        current: Cell<NaiveDateTime>,
    }

    impl StepClock {
        pub fn new() -> Self {
            let start = NaiveDate::from_ymd_opt(2024, 7, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap();
            Self { current: Cell::new(start) }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> NaiveDateTime {
            let now = self.current.get();
            self.current.set(now + Duration::seconds(1));
            now
        }
    }

    pub fn scripted_sampler(capacity: usize, values: &[f64]) -> Sampler {
        Sampler::new(
            capacity,
            Box::new(ScriptedSource::new(values)),
            Box::new(StepClock::new()),
        )
    }
}
