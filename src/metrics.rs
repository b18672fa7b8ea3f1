//! Health metric readings and mock series generation.
//!
//! Readings are caller-supplied scalars stamped at ingestion time. For a
//! visitor who has not recorded anything yet, the tracking view is seeded
//! with a week of plausible values so the charts are never empty.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single timestamped metric reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReading {
    pub value: Value,
    pub timestamp: DateTime<Utc>,
}

impl HealthReading {
    pub fn now(value: Value) -> Self {
        Self {
            value,
            timestamp: Utc::now(),
        }
    }
}

/// Days of history in a synthesized series.
pub const MOCK_DAYS: i64 = 7;

/// Generate seven days of plausible readings for temperature, pulse and
/// stress. The data is synthesized fresh on every call and never stored.
pub fn mock_health_series() -> BTreeMap<String, Vec<HealthReading>> {
    let mut rng = rand::thread_rng();
    let today = Utc::now();

    let mut temperature = Vec::new();
    let mut pulse = Vec::new();
    let mut stress = Vec::new();

    for i in 0..MOCK_DAYS {
        let day = today - Duration::days(MOCK_DAYS - 1 - i);
        let temp = (rng.gen_range(36.5..=37.2f64) * 10.0).round() / 10.0;
        temperature.push(HealthReading {
            value: Value::from(temp),
            timestamp: day,
        });
        pulse.push(HealthReading {
            value: Value::from(rng.gen_range(65..=85i64)),
            timestamp: day,
        });
        stress.push(HealthReading {
            value: Value::from(rng.gen_range(1..=10i64)),
            timestamp: day,
        });
    }

    let mut series = BTreeMap::new();
    series.insert("temperature".to_string(), temperature);
    series.insert("pulse".to_string(), pulse);
    series.insert("stress".to_string(), stress);
    series
}
