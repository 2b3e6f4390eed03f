//! Live machine readings for dashboard widgets.
//!
//! Widgets ask a [`TelemetrySource`] for the next frame on a fixed interval.
//! [`RandomWalk`] produces cosmetic jitter inside each reading's bounds;
//! [`Replay`] cycles through recorded frames and stands in for a real feed.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Allowed range of a reading and the largest change per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub max_step: f64,
}

impl FieldBounds {
    pub const fn new(min: f64, max: f64, max_step: f64) -> Self {
        Self { min, max, max_step }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub name: String,
    pub unit: String,
    pub value: f64,
    pub bounds: FieldBounds,
}

impl Reading {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, value: f64, bounds: FieldBounds) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            value: bounds.clamp(value),
            bounds,
        }
    }

    /// Value rounded to one decimal place, as shown on the dashboard.
    pub fn display_value(&self) -> String {
        format!("{:.1} {}", self.value, self.unit)
    }
}

/// One snapshot of a dialysis machine's panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineTelemetry {
    pub machine_id: String,
    pub recorded_at: DateTime<Utc>,
    pub readings: Vec<Reading>,
}

impl MachineTelemetry {
    /// Typical mid-treatment values of a hemodialysis machine.
    pub fn hemodialysis_baseline(machine_id: impl Into<String>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            machine_id: machine_id.into(),
            recorded_at,
            readings: vec![
                Reading::new("Blood flow", "mL/min", 350.0, FieldBounds::new(200.0, 450.0, 15.0)),
                Reading::new("Dialysate flow", "mL/min", 500.0, FieldBounds::new(300.0, 800.0, 20.0)),
                Reading::new("Venous pressure", "mmHg", 140.0, FieldBounds::new(50.0, 250.0, 8.0)),
                Reading::new("Arterial pressure", "mmHg", -150.0, FieldBounds::new(-250.0, -50.0, 8.0)),
                Reading::new("Temperature", "°C", 36.5, FieldBounds::new(35.5, 37.5, 0.1)),
                Reading::new("Conductivity", "mS/cm", 14.0, FieldBounds::new(13.5, 14.5, 0.05)),
            ],
        }
    }

    pub fn reading(&self, name: &str) -> Option<&Reading> {
        self.readings.iter().find(|reading| reading.name == name)
    }
}

pub trait TelemetrySource {
    fn next_frame(&mut self, previous: &MachineTelemetry, at: DateTime<Utc>) -> MachineTelemetry;
}

/// Bounded random walk: every reading moves by at most `max_step` and is clamped.
#[derive(Debug, Clone)]
pub struct RandomWalk<R> {
    rng: R,
}

impl<R: Rng> RandomWalk<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomWalk<StdRng> {
    /// Reproducible walk, used by tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> TelemetrySource for RandomWalk<R> {
    fn next_frame(&mut self, previous: &MachineTelemetry, at: DateTime<Utc>) -> MachineTelemetry {
        let readings = previous
            .readings
            .iter()
            .map(|reading| {
                let step = reading.bounds.max_step;
                let delta = if step > 0.0 {
                    self.rng.gen_range(-step..=step)
                } else {
                    0.0
                };
                Reading {
                    value: reading.bounds.clamp(reading.value + delta),
                    ..reading.clone()
                }
            })
            .collect();

        MachineTelemetry {
            machine_id: previous.machine_id.clone(),
            recorded_at: at,
            readings,
        }
    }
}

/// Cycles through recorded frames, restamping each with the request time.
#[derive(Debug, Clone)]
pub struct Replay {
    frames: Vec<MachineTelemetry>,
    cursor: usize,
}

impl Replay {
    pub fn new(frames: Vec<MachineTelemetry>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl TelemetrySource for Replay {
    fn next_frame(&mut self, previous: &MachineTelemetry, at: DateTime<Utc>) -> MachineTelemetry {
        let Some(frame) = self.frames.get(self.cursor) else {
            return MachineTelemetry {
                recorded_at: at,
                ..previous.clone()
            };
        };
        self.cursor = (self.cursor + 1) % self.frames.len();
        MachineTelemetry {
            recorded_at: at,
            ..frame.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
    }

    #[test]
    fn random_walk_stays_within_bounds_and_steps() {
        let mut source = RandomWalk::seeded(7);
        let mut frame = MachineTelemetry::hemodialysis_baseline("HD-M-001", start());

        for tick in 1..=500 {
            let next = source.next_frame(&frame, start() + Duration::seconds(3 * tick));
            for (before, after) in frame.readings.iter().zip(&next.readings) {
                assert!(after.value >= after.bounds.min && after.value <= after.bounds.max);
                assert!((after.value - before.value).abs() <= after.bounds.max_step + 1e-9);
            }
            frame = next;
        }

        assert_eq!(frame.machine_id, "HD-M-001");
        assert_eq!(frame.recorded_at, start() + Duration::seconds(1500));
    }

    #[test]
    fn seeded_walks_are_reproducible() {
        let frame = MachineTelemetry::hemodialysis_baseline("HD-M-002", start());
        let a = RandomWalk::seeded(42).next_frame(&frame, start());
        let b = RandomWalk::seeded(42).next_frame(&frame, start());
        assert_eq!(a, b);
    }

    #[test]
    fn readings_are_clamped_on_construction() {
        let reading = Reading::new("Temperature", "°C", 40.0, FieldBounds::new(35.5, 37.5, 0.1));
        assert_eq!(reading.value, 37.5);
        assert_eq!(reading.display_value(), "37.5 °C");
    }

    #[test]
    fn replay_cycles_frames() {
        let base = MachineTelemetry::hemodialysis_baseline("HD-M-003", start());
        let mut hot = base.clone();
        hot.readings[4].value = 37.4;

        let mut source = Replay::new(vec![base.clone(), hot.clone()]);
        let later = start() + Duration::seconds(3);

        assert_eq!(source.next_frame(&base, later).readings, base.readings);
        assert_eq!(source.next_frame(&base, later).readings, hot.readings);
        assert_eq!(source.next_frame(&base, later).recorded_at, later);
        assert_eq!(
            source.next_frame(&base, later).reading("Temperature").map(|r| r.value),
            Some(37.4)
        );
    }

    #[test]
    fn empty_replay_repeats_previous_frame() {
        let base = MachineTelemetry::hemodialysis_baseline("HD-M-004", start());
        let mut source = Replay::new(Vec::new());
        let next = source.next_frame(&base, start() + Duration::seconds(3));
        assert_eq!(next.readings, base.readings);
    }
}
