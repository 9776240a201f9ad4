#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod directory;
pub mod event;
pub mod export;
pub mod generator;
pub mod model;
pub mod query;
pub mod service;
pub mod store;
pub mod ticker;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use app::{App, Model, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;

pub const PAGE_SIZE: usize = 10;
pub const MAX_ALERTS: usize = 10;
pub const DEFAULT_ALERT_PROBABILITY: f64 = 0.1;
pub const MIN_RISK_SCORE: f64 = 1.0;
pub const MAX_RISK_SCORE: f64 = 10.0;
pub const MIN_ACCURACY_PCT: f64 = 80.0;
pub const MAX_ACCURACY_PCT: f64 = 95.0;
pub const EMERGENCY_WIZARD_STEPS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Dispatch,
    Storage,
    Export,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Dispatch => "DISPATCH_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Export => "EXPORT_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Dispatch | Self::Storage)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: BTreeMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
            context: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Dispatch => {
                format!("{} Please try again.", self.message)
            }
            ErrorKind::Storage => "Your preferences could not be saved.".into(),
            ErrorKind::Export => "The export could not be generated.".into(),
            ErrorKind::Internal => "Something went wrong.".into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " ({internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<export::ExportError> for AppError {
    fn from(e: export::ExportError) -> Self {
        AppError::new(ErrorKind::Export, "Export failed").with_internal(e.to_string())
    }
}

impl From<capabilities::DispatchError> for AppError {
    fn from(e: capabilities::DispatchError) -> Self {
        AppError::new(ErrorKind::Dispatch, e.to_string())
    }
}

impl From<capabilities::KvError> for AppError {
    fn from(e: capabilities::KvError) -> Self {
        AppError::new(ErrorKind::Storage, "Storage unavailable").with_internal(e.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: get_current_time_ms(),
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

#[must_use]
pub fn get_current_time_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

#[must_use]
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
