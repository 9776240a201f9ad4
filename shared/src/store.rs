use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::generator::TickSource;
use crate::model::{
    timestamp_suffix, Alert, AlertId, AlertKind, AlertSeverity, CaseId, CaseLocation, CaseRecord,
    CaseStatus, ModelStatus, NewCase, NewWaterSource, Patient, Reporter, Severity, Stats,
    WaterSource, WaterSourceId, WaterStatus,
};
use crate::{MAX_ACCURACY_PCT, MAX_ALERTS, MAX_RISK_SCORE, MIN_ACCURACY_PCT, MIN_RISK_SCORE};

/// What a stats tick changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub cases_added: u32,
    pub risk_score: f64,
    pub new_alert: Option<AlertId>,
}

/// Session-scoped owner of every mock record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MockDataStore {
    cases: Vec<CaseRecord>,
    water_sources: Vec<WaterSource>,
    alerts: Vec<Alert>,
    stats: Stats,
    model_status: ModelStatus,
    max_alerts: usize,
}

impl Default for MockDataStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl MockDataStore {
    /// A store with no records and default aggregates.
    pub fn empty() -> Self {
        Self {
            cases: Vec::new(),
            water_sources: Vec::new(),
            alerts: Vec::new(),
            stats: Stats::default(),
            model_status: ModelStatus::default(),
            max_alerts: MAX_ALERTS,
        }
    }

    /// A store holding the dashboard's initial records.
    pub fn seeded() -> Self {
        Self {
            cases: seed_cases(),
            water_sources: seed_water_sources(),
            alerts: seed_alerts(),
            ..Self::empty()
        }
    }

    #[must_use]
    pub fn with_max_alerts(mut self, max_alerts: usize) -> Self {
        self.max_alerts = max_alerts.max(1);
        self.alerts.truncate(self.max_alerts);
        self
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn water_sources(&self) -> &[WaterSource] {
        &self.water_sources
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn model_status(&self) -> &ModelStatus {
        &self.model_status
    }

    pub fn unread_alert_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_read).count()
    }

    pub fn find_case(&self, id: &CaseId) -> Option<&CaseRecord> {
        self.cases.iter().find(|c| &c.id == id)
    }

    /// Ids are not checked for uniqueness; cases added a multiple of ten
    /// seconds apart get the same id.
    pub fn add_case(&mut self, new_case: NewCase, now_ms: u64) -> CaseId {
        let id = CaseId::new(format!("HC-2024-{}", timestamp_suffix(now_ms, 4)));
        self.cases
            .insert(0, CaseRecord::from_new(id.clone(), new_case));
        self.stats.total_cases = self.stats.total_cases.saturating_add(1);

        info!(case_id = %id, total_cases = self.stats.total_cases, "case added");
        id
    }

    /// Returns whether a case matched. Unknown ids are ignored.
    pub fn update_case_status(&mut self, id: &CaseId, status: CaseStatus) -> bool {
        match self.cases.iter_mut().find(|c| &c.id == id) {
            Some(case) => {
                debug!(case_id = %id, from = %case.status, to = %status, "case status updated");
                case.status = status;
                true
            }
            None => {
                debug!(case_id = %id, "status update for unknown case ignored");
                false
            }
        }
    }

    /// Returns true only when an unread alert flipped to read.
    pub fn mark_alert_as_read(&mut self, id: &AlertId) -> bool {
        match self.alerts.iter_mut().find(|a| &a.id == id) {
            Some(alert) if !alert.is_read => {
                alert.is_read = true;
                true
            }
            _ => false,
        }
    }

    pub fn mark_all_alerts_read(&mut self) -> usize {
        let mut changed = 0;
        for alert in self.alerts.iter_mut().filter(|a| !a.is_read) {
            alert.is_read = true;
            changed += 1;
        }
        changed
    }

    pub fn add_water_source(&mut self, new_source: NewWaterSource, now_ms: u64) -> WaterSourceId {
        let id = WaterSourceId::new(format!("WS-{}", timestamp_suffix(now_ms, 3)));
        self.water_sources
            .insert(0, WaterSource::from_new(id.clone(), new_source));

        info!(source_id = %id, "water source added");
        id
    }

    pub fn tick(&mut self, source: &mut dyn TickSource, now_ms: u64) -> TickOutcome {
        let draw = source.next_tick();

        self.stats.total_cases = self.stats.total_cases.saturating_add(draw.case_increment);
        self.stats.risk_score =
            clamp_finite(self.stats.risk_score + draw.risk_delta, MIN_RISK_SCORE, MAX_RISK_SCORE);

        let new_alert = draw.alert.map(|(kind, severity)| {
            let alert = synthesized_alert(now_ms, kind, severity);
            let id = alert.id.clone();
            self.alerts.insert(0, alert);
            self.alerts.truncate(self.max_alerts);
            id
        });

        debug!(
            cases_added = draw.case_increment,
            risk_score = self.stats.risk_score,
            new_alert = new_alert.is_some(),
            "stats tick"
        );

        TickOutcome {
            cases_added: draw.case_increment,
            risk_score: self.stats.risk_score,
            new_alert,
        }
    }

    pub fn prediction_tick(&mut self, source: &mut dyn TickSource) -> f64 {
        let drift = source.accuracy_drift();
        self.model_status.accuracy_pct = clamp_finite(
            self.model_status.accuracy_pct + drift,
            MIN_ACCURACY_PCT,
            MAX_ACCURACY_PCT,
        );
        self.model_status.accuracy_pct
    }

    /// Accuracy only climbs on retrain, capped at the upper bound.
    pub fn apply_retrain(&mut self, gain: f64, now_ms: u64) -> f64 {
        let gain = if gain.is_finite() { gain.max(0.0) } else { 0.0 };
        self.model_status.accuracy_pct = (self.model_status.accuracy_pct + gain).min(MAX_ACCURACY_PCT);
        self.model_status.last_trained_ms = Some(now_ms);

        info!(accuracy = self.model_status.accuracy_pct, "prediction model retrained");
        self.model_status.accuracy_pct
    }

    pub fn apply_sensor_sync(&mut self, source: &mut dyn TickSource) -> usize {
        for water in &mut self.water_sources {
            let reading = source.sensor_reading();
            water.ph_level = reading.ph_level;
            water.temperature_c = Some(reading.temperature_c);
            water.turbidity_ntu = Some(reading.turbidity_ntu);
            water.tds_ppm = Some(reading.tds_ppm);
            water.status = reading.status;
            water.last_updated = "Just now".into();
        }

        info!(sources = self.water_sources.len(), "sensor readings synced");
        self.water_sources.len()
    }
}

fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

fn synthesized_alert(now_ms: u64, kind: AlertKind, severity: AlertSeverity) -> Alert {
    Alert {
        id: AlertId::new(format!("alert-{now_ms}")),
        kind,
        title: "New Alert".into(),
        description: "System generated alert".into(),
        time: "Just now".into(),
        severity,
        location: None,
        is_read: false,
    }
}

fn reported(date: (i32, u32, u32), hour: u32, minute: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

fn seed_cases() -> Vec<CaseRecord> {
    vec![
        CaseRecord {
            id: CaseId::new("HC-2024-0847"),
            patient: Patient::new("Ramesh Kumar", "Male", 34),
            location: CaseLocation {
                district: "Dibrugarh".into(),
                village: "Lahowal Village".into(),
            },
            symptoms: vec!["Diarrhea".into(), "Fever".into()],
            severity: Severity::Critical,
            reporter: Reporter {
                name: "Meera Devi".into(),
                role: "ASHA Worker".into(),
            },
            status: CaseStatus::UnderTreatment,
            reported_at: reported((2024, 1, 15), 14, 30),
        },
        CaseRecord {
            id: CaseId::new("HC-2024-0846"),
            patient: Patient::new("Sunita Sharma", "Female", 28),
            location: CaseLocation {
                district: "Tezpur".into(),
                village: "Balipara".into(),
            },
            symptoms: vec!["Vomiting".into(), "Nausea".into()],
            severity: Severity::High,
            reporter: Reporter {
                name: "Anjali Bora".into(),
                role: "Volunteer".into(),
            },
            status: CaseStatus::Resolved,
            reported_at: reported((2024, 1, 15), 12, 15),
        },
        CaseRecord {
            id: CaseId::new("HC-2024-0845"),
            patient: Patient::new("Amit Das", "Male", 45),
            location: CaseLocation {
                district: "Guwahati".into(),
                village: "Beltola".into(),
            },
            symptoms: vec!["Headache".into(), "Fatigue".into()],
            severity: Severity::Medium,
            reporter: Reporter {
                name: "Dr. Sharma".into(),
                role: "Medical Officer".into(),
            },
            status: CaseStatus::UnderTreatment,
            reported_at: reported((2024, 1, 15), 10, 45),
        },
    ]
}

fn seed_water_sources() -> Vec<WaterSource> {
    let source = |id: &str,
                  location: &str,
                  kind: &str,
                  ph: f64,
                  status: WaterStatus,
                  updated: &str,
                  (temp, turbidity, tds): (f64, f64, f64)| WaterSource {
        id: WaterSourceId::new(id),
        location: location.into(),
        kind: kind.into(),
        ph_level: ph,
        status,
        last_updated: updated.into(),
        temperature_c: Some(temp),
        turbidity_ntu: Some(turbidity),
        tds_ppm: Some(tds),
    };

    vec![
        source(
            "WS-001",
            "Dibrugarh, Lahowal",
            "Tube Well",
            8.9,
            WaterStatus::Contaminated,
            "2 min ago",
            (28.5, 12.3, 650.0),
        ),
        source(
            "WS-002",
            "Tezpur, Balipara",
            "Hand Pump",
            7.2,
            WaterStatus::Safe,
            "5 min ago",
            (26.8, 2.1, 320.0),
        ),
        source(
            "WS-003",
            "Guwahati, Beltola",
            "River Source",
            6.8,
            WaterStatus::Monitoring,
            "8 min ago",
            (29.2, 8.7, 480.0),
        ),
    ]
}

fn seed_alerts() -> Vec<Alert> {
    vec![
        Alert {
            id: AlertId::new("alert-001"),
            kind: AlertKind::Critical,
            title: "Cholera Cluster".into(),
            description: "Dibrugarh - 15 cases".into(),
            time: "2 min ago".into(),
            severity: AlertSeverity::High,
            location: Some("Dibrugarh".into()),
            is_read: false,
        },
        Alert {
            id: AlertId::new("alert-002"),
            kind: AlertKind::Warning,
            title: "Water Contamination".into(),
            description: "Tezpur - pH 8.9 detected".into(),
            time: "5 min ago".into(),
            severity: AlertSeverity::Medium,
            location: Some("Tezpur".into()),
            is_read: false,
        },
        Alert {
            id: AlertId::new("alert-003"),
            kind: AlertKind::Info,
            title: "Sensor Offline".into(),
            description: "Bongaigaon - Well #247".into(),
            time: "12 min ago".into(),
            severity: AlertSeverity::Low,
            location: Some("Bongaigaon".into()),
            is_read: true,
        },
    ]
}
