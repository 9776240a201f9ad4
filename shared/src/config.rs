use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::capabilities::DispatchOperation;
use crate::{DEFAULT_ALERT_PROBABILITY, MAX_ALERTS};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Timing and probability knobs shared by the core and its shells.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub stats_tick_ms: u64,
    pub prediction_tick_ms: u64,
    pub alert_probability: f64,
    pub max_alerts: usize,
    pub deploy_team_delay_ms: u64,
    pub send_alert_delay_ms: u64,
    pub retrain_delay_ms: u64,
    pub sensor_sync_delay_ms: u64,
    pub emergency_delay_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stats_tick_ms: 30_000,
            prediction_tick_ms: 60_000,
            alert_probability: DEFAULT_ALERT_PROBABILITY,
            max_alerts: MAX_ALERTS,
            deploy_team_delay_ms: 2_000,
            send_alert_delay_ms: 1_500,
            retrain_delay_ms: 5_000,
            sensor_sync_delay_ms: 2_000,
            emergency_delay_ms: 1_000,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stats_tick_ms == 0 {
            return Err(ConfigError::Validation("stats_tick_ms must be > 0".into()));
        }
        if self.prediction_tick_ms == 0 {
            return Err(ConfigError::Validation(
                "prediction_tick_ms must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alert_probability) {
            return Err(ConfigError::Validation(
                "alert_probability must be within [0, 1]".into(),
            ));
        }
        if self.max_alerts == 0 {
            return Err(ConfigError::Validation("max_alerts must be > 0".into()));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Validation(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn stats_tick(&self) -> Duration {
        Duration::from_millis(self.stats_tick_ms)
    }

    pub fn prediction_tick(&self) -> Duration {
        Duration::from_millis(self.prediction_tick_ms)
    }

    pub fn dispatch_delay(&self, operation: &DispatchOperation) -> Duration {
        let ms = match operation {
            DispatchOperation::DeployTeam { .. } => self.deploy_team_delay_ms,
            DispatchOperation::SendAlert { .. } => self.send_alert_delay_ms,
            DispatchOperation::RetrainModel => self.retrain_delay_ms,
            DispatchOperation::SyncSensors => self.sensor_sync_delay_ms,
            DispatchOperation::ActivateEmergency => self.emergency_delay_ms,
        };
        Duration::from_millis(ms)
    }
}
