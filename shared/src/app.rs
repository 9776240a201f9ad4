use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{
    encode_value, flag_is_set, Capabilities, DispatchOperation, DispatchResult, KvKey,
    PendingAction,
};
use crate::config::DashboardConfig;
use crate::directory::{
    field_team, filter_water_sources, notification_feed, villages, Notification, DISTRICTS,
    NotificationFilter, VillageFilter,
};
use crate::event::{EmergencyDraft, Event, Tab};
use crate::export::{cases_csv, roster_csv, ExportedFile};
use crate::generator::{RandomTickSource, TickSource};
use crate::model::{
    Alert, CaseRecord, FieldWorker, ModelStatus, Stats, StatusColor, UserId, Village, VillageId,
    WaterSource, WaterStatus,
};
use crate::query::{filter_and_sort, CaseFilter, CaseQuery, Page, SortState};
use crate::store::MockDataStore;
use crate::{
    get_current_time_ms, today, AppError, ErrorKind, ToastKind, ToastMessage,
    EMERGENCY_WIZARD_STEPS,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EmergencyWizard {
    pub open: bool,
    pub step: u8,
    pub draft: EmergencyDraft,
}

impl Default for EmergencyWizard {
    fn default() -> Self {
        Self {
            open: false,
            step: 1,
            draft: EmergencyDraft::default(),
        }
    }
}

impl EmergencyWizard {
    pub fn next(&mut self) {
        if self.step < EMERGENCY_WIZARD_STEPS {
            self.step += 1;
        }
    }

    pub fn back(&mut self) {
        if self.step > 1 {
            self.step -= 1;
        }
    }
}

pub struct Model {
    pub config: DashboardConfig,
    pub store: MockDataStore,
    pub generator: Box<dyn TickSource>,
    pub query: CaseQuery,

    pub user_id: Option<UserId>,
    pub show_welcome: bool,
    pub welcome_read_pending: bool,

    pub active_tab: Tab,
    pub notifications_open: bool,
    pub notification_filter: NotificationFilter,
    pub water_filter: Option<WaterStatus>,

    pub villages: Vec<Village>,
    pub village_filter: VillageFilter,
    pub selected_village: Option<VillageId>,
    pub team: Vec<FieldWorker>,

    pub pending: BTreeSet<PendingAction>,
    pub wizard: EmergencyWizard,
    pub export: Option<ExportedFile>,

    pub active_toast: Option<ToastMessage>,
    pub active_error: Option<AppError>,
}

impl Default for Model {
    fn default() -> Self {
        Self::with_config(DashboardConfig::default())
    }
}

impl Model {
    pub fn with_config(config: DashboardConfig) -> Self {
        let generator =
            RandomTickSource::from_entropy().with_alert_probability(config.alert_probability);
        let store = MockDataStore::seeded().with_max_alerts(config.max_alerts);
        Self {
            config,
            store,
            generator: Box::new(generator),
            query: CaseQuery::default(),
            user_id: None,
            show_welcome: false,
            welcome_read_pending: false,
            active_tab: Tab::default(),
            notifications_open: false,
            notification_filter: NotificationFilter::default(),
            water_filter: None,
            villages: villages(),
            village_filter: VillageFilter::default(),
            selected_village: None,
            team: field_team(),
            pending: BTreeSet::new(),
            wizard: EmergencyWizard::default(),
            export: None,
            active_toast: None,
            active_error: None,
        }
    }

    #[must_use]
    pub fn with_tick_source(mut self, source: impl TickSource + 'static) -> Self {
        self.generator = Box::new(source);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: MockDataStore) -> Self {
        self.store = store;
        self
    }

    pub fn set_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn is_pending(&self, action: PendingAction) -> bool {
        self.pending.contains(&action)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_retryable: e.kind.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseRow {
    pub id: String,
    pub patient_name: String,
    pub avatar: char,
    pub gender: String,
    pub age: u8,
    pub district: String,
    pub village: String,
    pub symptoms: Vec<String>,
    pub severity: String,
    pub status: String,
    pub reporter: String,
    pub reported_at: String,
}

impl From<&CaseRecord> for CaseRow {
    fn from(case: &CaseRecord) -> Self {
        Self {
            id: case.id.to_string(),
            patient_name: case.patient.name.clone(),
            avatar: case.patient.avatar,
            gender: case.patient.gender.clone(),
            age: case.patient.age,
            district: case.location.district.clone(),
            village: case.location.village.clone(),
            symptoms: case.symptoms.clone(),
            severity: case.severity.label().to_string(),
            status: case.status.label().to_string(),
            reporter: format!("{} ({})", case.reporter.name, case.reporter.role),
            reported_at: case.reported_at_label(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WaterSourceView {
    pub id: String,
    pub location: String,
    pub kind: String,
    pub ph_level: f64,
    pub status: String,
    pub color: StatusColor,
    pub last_updated: String,
    pub temperature_c: Option<f64>,
    pub turbidity_ntu: Option<f64>,
    pub tds_ppm: Option<f64>,
}

impl From<&WaterSource> for WaterSourceView {
    fn from(w: &WaterSource) -> Self {
        Self {
            id: w.id.to_string(),
            location: w.location.clone(),
            kind: w.kind.clone(),
            ph_level: w.ph_level,
            status: w.status.label().to_string(),
            color: w.status_color(),
            last_updated: w.last_updated.clone(),
            temperature_c: w.temperature_c,
            turbidity_ntu: w.turbidity_ntu,
            tds_ppm: w.tds_ppm,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingFlags {
    pub deploying_team: bool,
    pub sending_alert: bool,
    pub retraining: bool,
    pub syncing_sensors: bool,
    pub activating_emergency: bool,
}

impl PendingFlags {
    fn from_set(pending: &BTreeSet<PendingAction>) -> Self {
        Self {
            deploying_team: pending.contains(&PendingAction::DeployTeam),
            sending_alert: pending.contains(&PendingAction::SendAlert),
            retraining: pending.contains(&PendingAction::RetrainModel),
            syncing_sensors: pending.contains(&PendingAction::SyncSensors),
            activating_emergency: pending.contains(&PendingAction::ActivateEmergency),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WizardView {
    pub step: u8,
    pub total_steps: u8,
    pub can_go_back: bool,
    pub can_go_next: bool,
    pub draft: EmergencyDraft,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub active_tab: Tab,
    pub user_id: Option<String>,
    pub show_welcome: bool,

    pub stats: Stats,
    pub model_status: ModelStatus,

    pub cases: Page<CaseRow>,
    pub case_filter: CaseFilter,
    pub case_sort: SortState,

    pub water_sources: Vec<WaterSourceView>,
    pub water_filter: Option<WaterStatus>,

    pub alerts: Vec<Alert>,
    pub unread_alert_count: usize,
    pub notifications_open: bool,
    pub notification_filter: NotificationFilter,
    pub notifications: Vec<Notification>,

    pub districts: Vec<String>,
    pub villages: Vec<Village>,
    pub village_filter: VillageFilter,
    pub selected_village: Option<Village>,
    pub team: Vec<FieldWorker>,

    pub pending: PendingFlags,
    pub wizard: Option<WizardView>,
    pub export: Option<ExportedFile>,

    pub toast: Option<ToastView>,
    pub error: Option<UserFacingError>,
}

#[derive(Default)]
pub struct App;

impl App {
    fn load_welcome_flag(user_id: UserId, model: &mut Model, caps: &Capabilities) {
        let key = match KvKey::welcome(&user_id) {
            Ok(key) => key,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "welcome flag key rejected");
                model.show_welcome = false;
                model.welcome_read_pending = false;
                return;
            }
        };

        model.welcome_read_pending = true;
        caps.kv.get(key.raw(), move |result| Event::WelcomeFlagLoaded {
            user_id,
            result: result.map_err(|e| e.to_string()),
        });
    }

    fn store_welcome_flag(user_id: &UserId, caps: &Capabilities) {
        let bytes = KvKey::welcome(user_id).and_then(|key| Ok((key, encode_value(&true)?)));
        match bytes {
            Ok((key, value)) => caps.kv.set(key.raw(), value, |result| {
                Event::WelcomeFlagStored {
                    result: result.map(|_| ()).map_err(|e| e.to_string()),
                }
            }),
            Err(e) => warn!(user_id = %user_id, error = %e, "welcome flag not written"),
        }
    }

    /// Emits the dispatch effect unless the same action is already in flight.
    fn dispatch(operation: DispatchOperation, model: &mut Model, caps: &Capabilities) {
        let action = operation.action();
        if !model.pending.insert(action) {
            debug!(?action, "dispatch already pending, ignoring");
            return;
        }

        info!(?action, "dispatch requested");
        let echoed = operation.clone();
        caps.dispatch.request(operation, move |result| Event::DispatchCompleted {
            operation: Box::new(echoed),
            result: Box::new(result),
        });
    }

    fn complete_dispatch(
        operation: &DispatchOperation,
        result: DispatchResult,
        model: &mut Model,
        now_ms: u64,
    ) {
        let action = operation.action();
        model.pending.remove(&action);

        match result {
            Ok(receipt) => {
                match operation {
                    DispatchOperation::RetrainModel => {
                        let gain = model.generator.retrain_gain();
                        model.store.apply_retrain(gain, now_ms);
                    }
                    DispatchOperation::SyncSensors => {
                        model.store.apply_sensor_sync(model.generator.as_mut());
                    }
                    DispatchOperation::SendAlert { .. } if model.wizard.open => {
                        model.wizard = EmergencyWizard::default();
                    }
                    _ => {}
                }
                info!(?action, "dispatch completed");
                model.set_toast(receipt.message, ToastKind::Success);
            }
            Err(e) => {
                warn!(?action, error = %e, "dispatch failed");
                model.set_error(AppError::from(e).with_context("action", format!("{action:?}")));
            }
        }
    }

    fn emergency_target(model: &mut Model) -> Option<EmergencyDraft> {
        match model.wizard.draft.validate_target() {
            Ok(()) => Some(model.wizard.draft.clone()),
            Err(e) => {
                model.set_error(AppError::new(ErrorKind::Validation, e.to_string()));
                None
            }
        }
    }

    fn build_case_page(model: &Model) -> Page<CaseRow> {
        let page = model.query.run(model.store.cases());
        Page {
            items: page.items.iter().map(CaseRow::from).collect(),
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let now_ms = get_current_time_ms();

        match event {
            Event::SignedIn { user_id } => {
                if model.user_id.as_ref() == Some(&user_id) {
                    debug!(user_id = %user_id, "already signed in");
                    return;
                }
                info!(user_id = %user_id, "signed in");
                model.user_id = Some(user_id.clone());
                model.show_welcome = false;
                Self::load_welcome_flag(user_id, model, caps);
            }

            Event::SignedOut => {
                model.user_id = None;
                model.show_welcome = false;
                model.welcome_read_pending = false;
            }

            Event::WelcomeFlagLoaded { user_id, result } => {
                if model.user_id.as_ref() != Some(&user_id) || !model.welcome_read_pending {
                    debug!(user_id = %user_id, "stale welcome flag response");
                    return;
                }
                model.welcome_read_pending = false;
                match result {
                    Ok(stored) if flag_is_set(stored.as_deref()) => model.show_welcome = false,
                    Ok(_) => {
                        model.show_welcome = true;
                        Self::store_welcome_flag(&user_id, caps);
                    }
                    Err(e) => {
                        warn!(user_id = %user_id, error = %e, "welcome flag read failed");
                        model.show_welcome = false;
                    }
                }
            }

            Event::WelcomeFlagStored { result } => {
                if let Err(e) = result {
                    warn!(error = %e, "welcome flag write failed");
                }
                return;
            }

            Event::WelcomeDismissed => model.show_welcome = false,

            Event::TabSelected(tab) => {
                model.active_tab = tab;
                model.selected_village = None;
            }

            Event::NotificationsOpened => model.notifications_open = true,
            Event::NotificationsClosed => model.notifications_open = false,
            Event::NotificationFilterChanged(filter) => model.notification_filter = filter,

            Event::VillageFilterChanged(filter) => model.village_filter = filter,

            Event::VillageSelected { village_id } => match village_id {
                Some(id) if !model.villages.iter().any(|v| v.id == id) => {
                    debug!(village_id = %id, "unknown village selected");
                }
                other => model.selected_village = other,
            },

            Event::CaseFilterChanged(filter) => model.query.set_filter(filter),
            Event::CaseSortToggled(key) => model.query.toggle_sort(key),
            Event::NextPage => model.query.next_page(model.store.cases()),
            Event::PrevPage => model.query.prev_page(),

            Event::CaseReported(new_case) => {
                let id = model.store.add_case(*new_case, now_ms);
                model.set_toast(format!("Case {id} reported"), ToastKind::Success);
            }

            Event::CaseStatusChanged { case_id, status } => {
                if model.store.update_case_status(&case_id, status) {
                    model.query.clamp_page(model.store.cases());
                } else {
                    debug!(case_id = %case_id, "status change for unknown case");
                }
            }

            Event::AlertRead { alert_id } => {
                model.store.mark_alert_as_read(&alert_id);
            }

            Event::AllAlertsRead => {
                model.store.mark_all_alerts_read();
            }

            Event::WaterSourceAdded(source) => {
                let id = model.store.add_water_source(*source, now_ms);
                model.set_toast(format!("Water source {id} added"), ToastKind::Success);
            }

            Event::WaterFilterChanged(status) => model.water_filter = status,

            Event::StatsTick => {
                model.store.tick(model.generator.as_mut(), now_ms);
            }

            Event::PredictionTick => {
                model.store.prediction_tick(model.generator.as_mut());
            }

            Event::ExportCasesRequested => {
                let rows = filter_and_sort(model.store.cases(), &model.query.filter, &model.query.sort);
                match cases_csv(rows, today()) {
                    Ok(file) => {
                        info!(file = %file.file_name, "case export ready");
                        model.export = Some(file);
                    }
                    Err(e) => model.set_error(e.into()),
                }
            }

            Event::ExportRosterRequested => match roster_csv(&model.team, today()) {
                Ok(file) => {
                    info!(file = %file.file_name, "roster export ready");
                    model.export = Some(file);
                }
                Err(e) => model.set_error(e.into()),
            },

            Event::ExportDelivered => model.export = None,

            Event::DeployTeamRequested { village } => {
                Self::dispatch(DispatchOperation::DeployTeam { village }, model, caps);
            }

            Event::SendAlertRequested { village, message } => {
                Self::dispatch(DispatchOperation::SendAlert { village, message }, model, caps);
            }

            Event::RetrainRequested => Self::dispatch(DispatchOperation::RetrainModel, model, caps),
            Event::SensorSyncRequested => Self::dispatch(DispatchOperation::SyncSensors, model, caps),
            Event::EmergencyActivationRequested => {
                Self::dispatch(DispatchOperation::ActivateEmergency, model, caps);
            }

            Event::DispatchCompleted { operation, result } => {
                Self::complete_dispatch(&operation, *result, model, now_ms);
            }

            Event::EmergencyWizardOpened => model.wizard.open = true,
            Event::EmergencyWizardClosed => model.wizard.open = false,
            Event::EmergencyStepNext => model.wizard.next(),
            Event::EmergencyStepBack => model.wizard.back(),
            Event::EmergencyDraftChanged(draft) => model.wizard.draft = *draft,

            Event::EmergencyDeployRequested => {
                if let Some(draft) = Self::emergency_target(model) {
                    let operation = DispatchOperation::DeployTeam {
                        village: draft.village,
                    };
                    Self::dispatch(operation, model, caps);
                }
            }

            Event::EmergencySendRequested => {
                if let Some(draft) = Self::emergency_target(model) {
                    let message = draft.alert_message();
                    let operation = DispatchOperation::SendAlert {
                        village: draft.village,
                        message,
                    };
                    Self::dispatch(operation, model, caps);
                }
            }

            Event::ProfileSaved => {
                model.set_toast("Profile updated successfully!", ToastKind::Success);
            }

            Event::PasswordChangeSubmitted(change) => match change.validate() {
                Ok(()) => model.set_toast("Settings updated successfully!", ToastKind::Success),
                Err(e) => model.set_error(AppError::new(ErrorKind::Validation, e.to_string())),
            },

            Event::ToastDismissed => model.active_toast = None,
            Event::ErrorDismissed => model.active_error = None,
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let water_sources = filter_water_sources(model.store.water_sources(), model.water_filter)
            .into_iter()
            .map(WaterSourceView::from)
            .collect();

        let villages = model
            .village_filter
            .apply(&model.villages)
            .into_iter()
            .cloned()
            .collect();

        let selected_village = model
            .selected_village
            .as_ref()
            .and_then(|id| model.villages.iter().find(|v| &v.id == id))
            .cloned();

        let wizard = model.wizard.open.then(|| WizardView {
            step: model.wizard.step,
            total_steps: EMERGENCY_WIZARD_STEPS,
            can_go_back: model.wizard.step > 1,
            can_go_next: model.wizard.step < EMERGENCY_WIZARD_STEPS,
            draft: model.wizard.draft.clone(),
        });

        ViewModel {
            active_tab: model.active_tab,
            user_id: model.user_id.as_ref().map(ToString::to_string),
            show_welcome: model.show_welcome,
            stats: *model.store.stats(),
            model_status: *model.store.model_status(),
            cases: Self::build_case_page(model),
            case_filter: model.query.filter.clone(),
            case_sort: model.query.sort,
            water_sources,
            water_filter: model.water_filter,
            alerts: model.store.alerts().to_vec(),
            unread_alert_count: model.store.unread_alert_count(),
            notifications_open: model.notifications_open,
            notification_filter: model.notification_filter,
            notifications: notification_feed(model.store.alerts(), model.notification_filter),
            districts: DISTRICTS.iter().map(ToString::to_string).collect(),
            villages,
            village_filter: model.village_filter.clone(),
            selected_village,
            team: model.team.clone(),
            pending: PendingFlags::from_set(&model.pending),
            wizard,
            export: model.export.clone(),
            toast: model.active_toast.as_ref().map(ToastView::from),
            error: model.active_error.as_ref().map(UserFacingError::from),
        }
    }
}
