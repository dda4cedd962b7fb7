//! Simulated sensor events
//!
//! Produces device readings to feed the ledger when no real hardware is
//! attached.

use crate::core::Record;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Pressure,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Pressure,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temp",
            SensorKind::Humidity => "hum",
            SensorKind::Pressure => "pres",
        }
    }

    fn range(&self) -> (f64, f64) {
        match self {
            SensorKind::Temperature => (15.0, 35.0),
            SensorKind::Humidity => (20.0, 90.0),
            SensorKind::Pressure => (980.0, 1040.0),
        }
    }
}

pub struct SensorEventGenerator {
    rng: StdRng,
    device_id: u32,
}

impl SensorEventGenerator {
    pub fn new(device_id: u32) -> SensorEventGenerator {
        SensorEventGenerator {
            rng: StdRng::from_entropy(),
            device_id,
        }
    }

    /// Reproducible stream for tests and demos.
    pub fn with_seed(device_id: u32, seed: u64) -> SensorEventGenerator {
        SensorEventGenerator {
            rng: StdRng::seed_from_u64(seed),
            device_id,
        }
    }

    /// Next reading as `{device, sensor, valor}`, rounded to one decimal.
    pub fn next_event(&mut self) -> Record {
        let kind = SensorKind::ALL[self.rng.gen_range(0..SensorKind::ALL.len())];
        let (low, high) = kind.range();
        let value = (self.rng.gen_range(low..high) * 10.0).round() / 10.0;

        Record::new()
            .with("device", i64::from(self.device_id))
            .with("sensor", kind.name())
            .with("valor", value)
    }
}

impl Iterator for SensorEventGenerator {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        Some(self.next_event())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scalar;

    #[test]
    fn test_events_are_within_range() {
        let generator = SensorEventGenerator::new(789);
        for event in generator.take(50) {
            assert_eq!(event.get("device"), Some(&Scalar::Int(789)));
            let Some(Scalar::Text(sensor)) = event.get("sensor") else {
                panic!("sensor field missing");
            };
            let kind = SensorKind::ALL
                .iter()
                .find(|kind| kind.name() == sensor)
                .unwrap();
            let Some(Scalar::Float(value)) = event.get("valor") else {
                panic!("valor field missing");
            };
            let (low, high) = kind.range();
            assert!(*value >= low && *value <= high);
        }
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let first: Vec<Record> = SensorEventGenerator::with_seed(1, 42).take(5).collect();
        let second: Vec<Record> = SensorEventGenerator::with_seed(1, 42).take(5).collect();
        assert_eq!(first, second);
    }
}
