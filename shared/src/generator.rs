//! Random draws behind the store's background activity.
//!
//! Every source of randomness the store consumes goes through
//! [`TickSource`], so tests can replay a fixed script instead of an RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{AlertKind, AlertSeverity, SensorReading, WaterStatus};
use crate::DEFAULT_ALERT_PROBABILITY;

/// Draws for one stats tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickDraw {
    /// Added to `total_cases`; expected in `0..=2`.
    pub case_increment: u32,
    /// Added to `risk_score` before clamping.
    pub risk_delta: f64,
    /// Present when this tick synthesises an alert.
    pub alert: Option<(AlertKind, AlertSeverity)>,
}

impl TickDraw {
    pub const QUIET: Self = Self {
        case_increment: 0,
        risk_delta: 0.0,
        alert: None,
    };
}

pub trait TickSource: Send {
    fn next_tick(&mut self) -> TickDraw;

    /// Drift applied to model accuracy on each prediction tick.
    fn accuracy_drift(&mut self) -> f64;

    /// Accuracy gained by a completed retrain.
    fn retrain_gain(&mut self) -> f64;

    fn sensor_reading(&mut self) -> SensorReading;
}

pub struct RandomTickSource {
    rng: StdRng,
    alert_probability: f64,
}

impl RandomTickSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            alert_probability: DEFAULT_ALERT_PROBABILITY,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            alert_probability: DEFAULT_ALERT_PROBABILITY,
        }
    }

    #[must_use]
    pub fn with_alert_probability(mut self, probability: f64) -> Self {
        self.alert_probability = probability.clamp(0.0, 1.0);
        self
    }

    fn round1(value: f64) -> f64 {
        (value * 10.0).round() / 10.0
    }

    // Two independent draws: the first picks the top bucket at 30%, the
    // second splits the remainder 60/40.
    fn tiered<T>(&mut self, top: T, middle: T, bottom: T) -> T {
        if self.rng.gen::<f64>() < 0.3 {
            top
        } else if self.rng.gen::<f64>() < 0.6 {
            middle
        } else {
            bottom
        }
    }
}

impl Default for RandomTickSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl TickSource for RandomTickSource {
    fn next_tick(&mut self) -> TickDraw {
        let case_increment = self.rng.gen_range(0..=2);
        let risk_delta = (self.rng.gen::<f64>() - 0.5) * 0.5;
        let alert = if self.rng.gen::<f64>() < self.alert_probability {
            let kind = self.tiered(AlertKind::Critical, AlertKind::Warning, AlertKind::Info);
            let severity =
                self.tiered(AlertSeverity::High, AlertSeverity::Medium, AlertSeverity::Low);
            Some((kind, severity))
        } else {
            None
        };

        TickDraw {
            case_increment,
            risk_delta,
            alert,
        }
    }

    fn accuracy_drift(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * 2.0
    }

    fn retrain_gain(&mut self) -> f64 {
        self.rng.gen::<f64>() * 5.0
    }

    fn sensor_reading(&mut self) -> SensorReading {
        let status = if self.rng.gen::<f64>() > 0.7 {
            WaterStatus::Monitoring
        } else if self.rng.gen::<f64>() > 0.9 {
            WaterStatus::Contaminated
        } else {
            WaterStatus::Safe
        };

        SensorReading {
            ph_level: Self::round1(self.rng.gen_range(6.5..=8.5)),
            temperature_c: Self::round1(self.rng.gen_range(24.0..=32.0)),
            turbidity_ntu: Self::round1(self.rng.gen_range(0.0..=5.0)),
            tds_ppm: self.rng.gen_range(200.0_f64..=700.0).round(),
            status,
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use std::collections::VecDeque;

    use super::*;

    /// Replays queued draws, then falls back to quiet defaults.
    #[derive(Debug, Default)]
    pub struct ScriptedTickSource {
        pub ticks: VecDeque<TickDraw>,
        pub drifts: VecDeque<f64>,
        pub gains: VecDeque<f64>,
        pub readings: VecDeque<SensorReading>,
    }

    impl ScriptedTickSource {
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn with_ticks(mut self, ticks: impl IntoIterator<Item = TickDraw>) -> Self {
            self.ticks.extend(ticks);
            self
        }

        #[must_use]
        pub fn with_drifts(mut self, drifts: impl IntoIterator<Item = f64>) -> Self {
            self.drifts.extend(drifts);
            self
        }

        #[must_use]
        pub fn with_gains(mut self, gains: impl IntoIterator<Item = f64>) -> Self {
            self.gains.extend(gains);
            self
        }

        #[must_use]
        pub fn with_readings(mut self, readings: impl IntoIterator<Item = SensorReading>) -> Self {
            self.readings.extend(readings);
            self
        }
    }

    impl TickSource for ScriptedTickSource {
        fn next_tick(&mut self) -> TickDraw {
            self.ticks.pop_front().unwrap_or(TickDraw::QUIET)
        }

        fn accuracy_drift(&mut self) -> f64 {
            self.drifts.pop_front().unwrap_or(0.0)
        }

        fn retrain_gain(&mut self) -> f64 {
            self.gains.pop_front().unwrap_or(0.0)
        }

        fn sensor_reading(&mut self) -> SensorReading {
            self.readings.pop_front().unwrap_or(SensorReading {
                ph_level: 7.0,
                temperature_c: 27.0,
                turbidity_ntu: 1.0,
                tds_ppm: 300.0,
                status: WaterStatus::Safe,
            })
        }
    }
}
