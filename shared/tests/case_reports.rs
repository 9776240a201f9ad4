use chrono::NaiveDate;
use crux_core::testing::AppTester;
use healthguard_shared::model::{
    CaseLocation, CaseStatus, NewCase, Patient, Reporter, Severity,
};
use healthguard_shared::query::{CaseFilter, SortKey, ALL_DISTRICTS, ALL_SEVERITY, ALL_STATUS};
use healthguard_shared::store::MockDataStore;
use healthguard_shared::{App, Effect, Event, Model, PAGE_SIZE};

const SEVERITIES: [Severity; 4] = [
    Severity::Low,
    Severity::Critical,
    Severity::Medium,
    Severity::High,
];

fn new_case(n: u32) -> NewCase {
    let reported_at = NaiveDate::from_ymd_opt(2024, 2, 1)
        .and_then(|d| d.and_hms_opt(8, n % 60, 0))
        .unwrap();
    NewCase {
        patient: Patient::new(format!("Patient {n:02}"), "Female", 30),
        location: CaseLocation {
            district: if n % 2 == 0 { "Jorhat" } else { "Silchar" }.into(),
            village: "Teok".into(),
        },
        symptoms: vec!["Fever".into()],
        severity: SEVERITIES[(n % 4) as usize],
        reporter: Reporter {
            name: "Priya Gogoi".into(),
            role: "ASHA Worker".into(),
        },
        status: CaseStatus::Pending,
        reported_at,
    }
}

fn model_with_cases(count: u32) -> (AppTester<App, Effect>, Model) {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default().with_store(MockDataStore::empty());
    for n in 0..count {
        app.update(Event::CaseReported(Box::new(new_case(n))), &mut model);
    }
    (app, model)
}

#[test]
fn twenty_three_cases_span_three_pages() {
    let (app, mut model) = model_with_cases(23);

    let view = app.view(&model);
    assert_eq!(view.stats.total_cases, 247 + 23);
    assert_eq!(view.cases.total_items, 23);
    assert_eq!(view.cases.total_pages, 3);
    assert_eq!(view.cases.items.len(), PAGE_SIZE);
    assert!(!view.cases.has_prev());
    assert_eq!(view.cases.items[0].patient_name, "Patient 22");

    app.update(Event::NextPage, &mut model);
    assert_eq!(app.view(&model).cases.items.len(), 10);

    app.update(Event::NextPage, &mut model);
    app.update(Event::NextPage, &mut model);
    let last = app.view(&model).cases;
    assert_eq!(last.page, 3);
    assert_eq!(last.items.len(), 3);
    assert!(!last.has_next());

    app.update(Event::PrevPage, &mut model);
    assert_eq!(app.view(&model).cases.page, 2);
}

#[test]
fn changing_filter_returns_to_first_page() {
    let (app, mut model) = model_with_cases(23);
    app.update(Event::NextPage, &mut model);
    app.update(Event::NextPage, &mut model);

    app.update(
        Event::CaseFilterChanged(CaseFilter::from_labels(
            "",
            ALL_SEVERITY,
            ALL_STATUS,
            "Jorhat",
        )),
        &mut model,
    );

    let view = app.view(&model);
    assert_eq!(view.cases.page, 1);
    assert_eq!(view.cases.total_items, 12);
    assert!(view.cases.items.iter().all(|c| c.district == "Jorhat"));
}

#[test]
fn severity_column_toggles_direction() {
    let (app, mut model) = model_with_cases(4);

    // Default is newest first, so the first click on a new key sorts ascending.
    app.update(Event::CaseSortToggled(SortKey::Severity), &mut model);
    let asc: Vec<String> = app
        .view(&model)
        .cases
        .items
        .into_iter()
        .map(|c| c.severity)
        .collect();
    assert_eq!(asc, ["Low", "Medium", "High", "Critical"]);

    app.update(Event::CaseSortToggled(SortKey::Severity), &mut model);
    let desc: Vec<String> = app
        .view(&model)
        .cases
        .items
        .into_iter()
        .map(|c| c.severity)
        .collect();
    assert_eq!(desc, ["Critical", "High", "Medium", "Low"]);
}

#[test]
fn search_matches_name_id_or_district() {
    let (app, mut model) = model_with_cases(6);

    app.update(
        Event::CaseFilterChanged(CaseFilter::from_labels(
            "silchar",
            ALL_SEVERITY,
            ALL_STATUS,
            ALL_DISTRICTS,
        )),
        &mut model,
    );
    assert_eq!(app.view(&model).cases.total_items, 3);

    app.update(
        Event::CaseFilterChanged(CaseFilter::from_labels(
            "patient 04",
            ALL_SEVERITY,
            ALL_STATUS,
            ALL_DISTRICTS,
        )),
        &mut model,
    );
    assert_eq!(app.view(&model).cases.total_items, 1);
}

#[test]
fn status_change_on_unknown_case_is_silent() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let before = app.view(&model).cases;

    app.update(
        Event::CaseStatusChanged {
            case_id: healthguard_shared::model::CaseId::new("HC-2024-9999"),
            status: CaseStatus::Resolved,
        },
        &mut model,
    );

    let view = app.view(&model);
    assert_eq!(view.cases, before);
    assert!(view.error.is_none());
}

#[test]
fn status_change_updates_the_row() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::CaseStatusChanged {
            case_id: healthguard_shared::model::CaseId::new("HC-2024-0845"),
            status: CaseStatus::Resolved,
        },
        &mut model,
    );

    let row = app
        .view(&model)
        .cases
        .items
        .into_iter()
        .find(|c| c.id == "HC-2024-0845")
        .unwrap();
    assert_eq!(row.status, "Resolved");
}

#[test]
fn resolving_cases_under_status_filter_pulls_page_back() {
    let (app, mut model) = model_with_cases(23);
    app.update(
        Event::CaseFilterChanged(CaseFilter::from_labels(
            "",
            ALL_SEVERITY,
            "Pending",
            ALL_DISTRICTS,
        )),
        &mut model,
    );
    app.update(Event::NextPage, &mut model);
    app.update(Event::NextPage, &mut model);
    assert_eq!(app.view(&model).cases.page, 3);

    let resolved: Vec<_> = model
        .store
        .cases()
        .iter()
        .take(15)
        .map(|c| c.id.clone())
        .collect();
    for case_id in resolved {
        app.update(
            Event::CaseStatusChanged {
                case_id,
                status: CaseStatus::Resolved,
            },
            &mut model,
        );
    }

    let view = app.view(&model).cases;
    assert_eq!(view.total_items, 8);
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.page, 1);
    assert_eq!(view.items.len(), 8);
    assert!(!view.has_prev());
    assert!(!view.has_next());
}
