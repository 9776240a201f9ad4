use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::{DispatchOperation, DispatchResult};
use crate::directory::{NotificationFilter, VillageFilter};
use crate::model::{AlertId, CaseId, CaseStatus, NewCase, NewWaterSource, UserId, VillageId, WaterStatus};
use crate::query::{CaseFilter, SortKey};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("New password and confirm password do not match!")]
    PasswordMismatch,
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    #[error("unknown emergency type: {0}")]
    UnknownEmergencyType(String),
    #[error("value too long ({len} > {max})")]
    TooLong { len: usize, max: usize },
}

// --- Secret wrapper: redacts Debug ---

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PasswordChange {
    pub current: Secret,
    pub new_password: Secret,
    pub confirm_password: Secret,
}

impl PasswordChange {
    /// Only confirmation is checked; there is no account behind it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.new_password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Dashboard,
    Reports,
    Water,
    Predictions,
    Alerts,
    Analytics,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmergencySeverity {
    #[default]
    Critical,
    High,
    Medium,
}

pub const EMERGENCY_TYPES: [&str; 6] = [
    "Disease Outbreak",
    "Water Contamination",
    "Food Poisoning",
    "Natural Disaster",
    "Medical Emergency",
    "Other",
];

pub const MAX_EMERGENCY_DESCRIPTION: usize = 2048;

/// Form state of the emergency alert wizard.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EmergencyDraft {
    pub location: String,
    pub village: String,
    pub emergency_type: String,
    pub description: String,
    pub severity: EmergencySeverity,
    pub affected_population: String,
}

impl EmergencyDraft {
    pub fn validate_target(&self) -> Result<(), ValidationError> {
        if self.village.trim().is_empty() {
            return Err(ValidationError::Empty { field: "village" });
        }
        if !self.emergency_type.is_empty() && !EMERGENCY_TYPES.contains(&self.emergency_type.as_str()) {
            return Err(ValidationError::UnknownEmergencyType(self.emergency_type.clone()));
        }
        if self.description.len() > MAX_EMERGENCY_DESCRIPTION {
            return Err(ValidationError::TooLong {
                len: self.description.len(),
                max: MAX_EMERGENCY_DESCRIPTION,
            });
        }
        Ok(())
    }

    pub fn alert_message(&self) -> String {
        match (self.emergency_type.is_empty(), self.description.is_empty()) {
            (true, _) => self.description.clone(),
            (false, true) => self.emergency_type.clone(),
            (false, false) => format!("{}: {}", self.emergency_type, self.description),
        }
    }
}

// --- Event enum: large variants boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Session & welcome
    SignedIn {
        user_id: UserId,
    },
    SignedOut,
    WelcomeFlagLoaded {
        user_id: UserId,
        result: Result<Option<Vec<u8>>, String>,
    },
    WelcomeFlagStored {
        result: Result<(), String>,
    },
    WelcomeDismissed,

    // Navigation
    TabSelected(Tab),
    NotificationsOpened,
    NotificationsClosed,
    NotificationFilterChanged(NotificationFilter),

    // Villages
    VillageFilterChanged(VillageFilter),
    VillageSelected {
        village_id: Option<VillageId>,
    },

    // Cases
    CaseFilterChanged(CaseFilter),
    CaseSortToggled(SortKey),
    NextPage,
    PrevPage,
    CaseReported(Box<NewCase>),
    CaseStatusChanged {
        case_id: CaseId,
        status: CaseStatus,
    },

    // Alerts
    AlertRead {
        alert_id: AlertId,
    },
    AllAlertsRead,

    // Water
    WaterSourceAdded(Box<NewWaterSource>),
    WaterFilterChanged(Option<WaterStatus>),

    // Timers, fired by the shell's tickers
    StatsTick,
    PredictionTick,

    // Exports
    ExportCasesRequested,
    ExportRosterRequested,
    ExportDelivered,

    // Field operations
    DeployTeamRequested {
        village: String,
    },
    SendAlertRequested {
        village: String,
        message: String,
    },
    RetrainRequested,
    SensorSyncRequested,
    EmergencyActivationRequested,
    DispatchCompleted {
        operation: Box<DispatchOperation>,
        result: Box<DispatchResult>,
    },

    // Emergency wizard
    EmergencyWizardOpened,
    EmergencyWizardClosed,
    EmergencyStepNext,
    EmergencyStepBack,
    EmergencyDraftChanged(Box<EmergencyDraft>),
    EmergencyDeployRequested,
    EmergencySendRequested,

    // Profile
    ProfileSaved,
    PasswordChangeSubmitted(Box<PasswordChange>),

    // Dismissals
    ToastDismissed,
    ErrorDismissed,
}
