use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(CaseId);
typed_id!(AlertId);
typed_id!(WaterSourceId);
typed_id!(VillageId);
typed_id!(UserId);

/// Keeps the last `digits` decimal digits of a millisecond timestamp,
/// zero padded.
pub(crate) fn timestamp_suffix(now_ms: u64, digits: u32) -> String {
    let modulus = 10u64.pow(digits);
    format!("{:0width$}", now_ms % modulus, width = digits as usize)
}

// --- Cases ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Fixed sort rank; higher is more urgent.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.label() == s)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    UnderTreatment,
    Resolved,
    Critical,
    Pending,
}

impl CaseStatus {
    pub const ALL: [Self; 4] = [
        Self::UnderTreatment,
        Self::Resolved,
        Self::Critical,
        Self::Pending,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UnderTreatment => "Under Treatment",
            Self::Resolved => "Resolved",
            Self::Critical => "Critical",
            Self::Pending => "Pending",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.label() == s)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    pub name: String,
    pub gender: String,
    pub age: u8,
    pub avatar: char,
}

impl Patient {
    /// Avatar letter defaults to the first character of the name.
    pub fn new(name: impl Into<String>, gender: impl Into<String>, age: u8) -> Self {
        let name = name.into();
        let avatar = name
            .chars()
            .next()
            .map_or('?', |c| c.to_ascii_uppercase());
        Self {
            name,
            gender: gender.into(),
            age,
            avatar,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CaseLocation {
    pub district: String,
    pub village: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Reporter {
    pub name: String,
    pub role: String,
}

/// Reported timestamps carry minute precision.
pub const REPORTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewCase {
    pub patient: Patient,
    pub location: CaseLocation,
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub reporter: Reporter,
    pub status: CaseStatus,
    pub reported_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CaseRecord {
    pub id: CaseId,
    pub patient: Patient,
    pub location: CaseLocation,
    pub symptoms: Vec<String>,
    pub severity: Severity,
    pub reporter: Reporter,
    pub status: CaseStatus,
    pub reported_at: NaiveDateTime,
}

impl CaseRecord {
    pub fn from_new(id: CaseId, new: NewCase) -> Self {
        Self {
            id,
            patient: new.patient,
            location: new.location,
            symptoms: new.symptoms,
            severity: new.severity,
            reporter: new.reporter,
            status: new.status,
            reported_at: new.reported_at,
        }
    }

    pub fn reported_at_label(&self) -> String {
        self.reported_at.format(REPORTED_AT_FORMAT).to_string()
    }
}

// --- Water sources ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaterStatus {
    Safe,
    Contaminated,
    Monitoring,
}

impl WaterStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Contaminated => "Contaminated",
            Self::Monitoring => "Monitoring",
        }
    }

    #[must_use]
    pub const fn color(self) -> StatusColor {
        match self {
            Self::Safe => StatusColor::Green,
            Self::Contaminated => StatusColor::Red,
            Self::Monitoring => StatusColor::Orange,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Green,
    Red,
    Orange,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NewWaterSource {
    pub location: String,
    pub kind: String,
    pub ph_level: f64,
    pub status: WaterStatus,
    pub temperature_c: Option<f64>,
    pub turbidity_ntu: Option<f64>,
    pub tds_ppm: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WaterSource {
    pub id: WaterSourceId,
    pub location: String,
    pub kind: String,
    pub ph_level: f64,
    pub status: WaterStatus,
    pub last_updated: String,
    pub temperature_c: Option<f64>,
    pub turbidity_ntu: Option<f64>,
    pub tds_ppm: Option<f64>,
}

impl WaterSource {
    pub fn from_new(id: WaterSourceId, new: NewWaterSource) -> Self {
        Self {
            id,
            location: new.location,
            kind: new.kind,
            ph_level: new.ph_level,
            status: new.status,
            last_updated: "Just now".into(),
            temperature_c: new.temperature_c,
            turbidity_ntu: new.turbidity_ntu,
            tds_ppm: new.tds_ppm,
        }
    }

    /// Colour tag always follows status, so the two cannot drift apart.
    pub fn status_color(&self) -> StatusColor {
        self.status.color()
    }
}

/// One fresh reading pushed by a sensor sync.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    pub ph_level: f64,
    pub temperature_c: f64,
    pub turbidity_ntu: f64,
    pub tds_ppm: f64,
    pub status: WaterStatus,
}

// --- Alerts ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Critical,
    Warning,
    Info,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    High,
    Medium,
    Low,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
    pub time: String,
    pub severity: AlertSeverity,
    pub location: Option<String>,
    pub is_read: bool,
}

// --- Aggregates ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub total_cases: u32,
    pub water_sources_monitored: u32,
    pub active_workers: u32,
    pub risk_score: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_cases: 247,
            water_sources_monitored: 1234,
            active_workers: 456,
            risk_score: 7.2,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ModelStatus {
    pub accuracy_pct: f64,
    pub last_trained_ms: Option<u64>,
}

impl Default for ModelStatus {
    fn default() -> Self {
        Self {
            accuracy_pct: 87.3,
            last_trained_ms: None,
        }
    }
}

// --- Villages & field team ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Village {
    pub id: VillageId,
    pub name: String,
    pub district: String,
    pub population: u32,
    pub asha_workers: u32,
    pub active_cases: u32,
    pub water_sources: u32,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldWorker {
    pub name: String,
    pub role: String,
    pub location: String,
    pub status: String,
}
