//! Field operations the dashboard asks the outside world to perform.
//!
//! The core only describes the request; the shell fulfils it (see
//! [`crate::service`]) and resolves it with a [`DispatchResult`].

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DispatchOperation {
    DeployTeam { village: String },
    SendAlert { village: String, message: String },
    RetrainModel,
    SyncSensors,
    ActivateEmergency,
}

impl DispatchOperation {
    #[must_use]
    pub fn action(&self) -> PendingAction {
        match self {
            Self::DeployTeam { .. } => PendingAction::DeployTeam,
            Self::SendAlert { .. } => PendingAction::SendAlert,
            Self::RetrainModel => PendingAction::RetrainModel,
            Self::SyncSensors => PendingAction::SyncSensors,
            Self::ActivateEmergency => PendingAction::ActivateEmergency,
        }
    }
}

/// Buttons that stay disabled while their operation is in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PendingAction {
    DeployTeam,
    SendAlert,
    RetrainModel,
    SyncSensors,
    ActivateEmergency,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatch service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("request rejected: {reason}")]
    Rejected { reason: String },
}

pub type DispatchResult = Result<DispatchReceipt, DispatchError>;

impl Operation for DispatchOperation {
    type Output = DispatchResult;
}

#[derive(Capability)]
pub struct Dispatch<Ev> {
    context: CapabilityContext<DispatchOperation, Ev>,
}

impl<Ev> Dispatch<Ev> {
    pub fn new(context: CapabilityContext<DispatchOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Dispatch<Ev>
where
    Ev: Send + 'static,
{
    pub fn request<F>(&self, operation: DispatchOperation, make_event: F)
    where
        F: FnOnce(DispatchResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(make_event(result));
        });
    }
}
