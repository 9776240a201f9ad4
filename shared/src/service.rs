//! Shell-side fulfilment of [`DispatchOperation`] effects.
//!
//! Nothing here is called from `update`; a shell receives an
//! `Effect::Dispatch` request, hands the operation to a [`DispatchService`]
//! and resolves the request with the returned [`DispatchResult`].

use async_trait::async_trait;
use tracing::{debug, info};

use crate::capabilities::{DispatchError, DispatchOperation, DispatchReceipt, DispatchResult};
use crate::config::DashboardConfig;

#[async_trait]
pub trait DispatchService: Send + Sync {
    async fn dispatch(&self, operation: &DispatchOperation) -> DispatchResult;
}

/// Stand-in for the field teams and messaging gateway: waits the configured
/// delay, then always succeeds.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDispatch {
    config: DashboardConfig,
}

impl SimulatedDispatch {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }
}

pub fn receipt_message(operation: &DispatchOperation) -> String {
    match operation {
        DispatchOperation::DeployTeam { village } if village.trim().is_empty() => {
            "Emergency response team has been notified and deployed!".into()
        }
        DispatchOperation::DeployTeam { village } => {
            format!("Emergency response team deployed to {village}!")
        }
        DispatchOperation::SendAlert { village, .. } if village.trim().is_empty() => {
            "Alert sent to all field workers and community members!".into()
        }
        DispatchOperation::SendAlert { village, .. } => {
            format!("Emergency alert sent to all recipients in {village}!")
        }
        DispatchOperation::RetrainModel => "Prediction model retrained".into(),
        DispatchOperation::SyncSensors => "IoT sensor data synced".into(),
        DispatchOperation::ActivateEmergency => {
            "EMERGENCY ALERT ACTIVATED: All emergency protocols initiated!".into()
        }
    }
}

#[async_trait]
impl DispatchService for SimulatedDispatch {
    async fn dispatch(&self, operation: &DispatchOperation) -> DispatchResult {
        let delay = self.config.dispatch_delay(operation);
        debug!(action = ?operation.action(), ?delay, "simulating dispatch");
        tokio::time::sleep(delay).await;

        info!(action = ?operation.action(), "simulated dispatch finished");
        Ok(DispatchReceipt {
            message: receipt_message(operation),
        })
    }
}

/// Fails every operation; lets shells exercise the error path.
#[derive(Debug, Clone)]
pub struct UnavailableDispatch {
    pub reason: String,
}

#[async_trait]
impl DispatchService for UnavailableDispatch {
    async fn dispatch(&self, _operation: &DispatchOperation) -> DispatchResult {
        Err(DispatchError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn deploy_waits_two_seconds() {
        let service = SimulatedDispatch::default();
        let started = Instant::now();

        let result = service
            .dispatch(&DispatchOperation::DeployTeam {
                village: "Rajpur".into(),
            })
            .await;

        assert_eq!(started.elapsed(), Duration::from_millis(2_000));
        assert_eq!(
            result.unwrap().message,
            "Emergency response team deployed to Rajpur!"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn retrain_is_the_slowest_operation() {
        let service = SimulatedDispatch::default();
        let started = Instant::now();
        service.dispatch(&DispatchOperation::RetrainModel).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn delays_follow_config() {
        let config = DashboardConfig {
            send_alert_delay_ms: 10,
            ..DashboardConfig::default()
        };
        let service = SimulatedDispatch::new(config);
        let started = Instant::now();
        service
            .dispatch(&DispatchOperation::SendAlert {
                village: String::new(),
                message: "Boil water before use".into(),
            })
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(10));
    }

    #[tokio::test]
    async fn unavailable_service_fails() {
        let service = UnavailableDispatch {
            reason: "gateway offline".into(),
        };
        let result = service.dispatch(&DispatchOperation::SyncSensors).await;
        assert!(matches!(result, Err(DispatchError::Unavailable { .. })));
    }

    #[test]
    fn quick_action_messages_without_village() {
        assert_eq!(
            receipt_message(&DispatchOperation::DeployTeam {
                village: " ".into()
            }),
            "Emergency response team has been notified and deployed!"
        );
    }
}
