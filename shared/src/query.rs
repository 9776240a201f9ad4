//! Case list derivation: search, filter, sort and page slicing.
//!
//! Everything here is a pure projection over a borrowed slice. The store's
//! list is never reordered or mutated.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::model::{CaseRecord, CaseStatus, Severity};
use crate::PAGE_SIZE;

pub const ALL_SEVERITY: &str = "All Severity";
pub const ALL_STATUS: &str = "All Status";
pub const ALL_DISTRICTS: &str = "All Districts";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub search: String,
    /// `None` is the "All Severity" sentinel.
    pub severity: Option<Severity>,
    pub status: Option<CaseStatus>,
    pub district: Option<String>,
}

impl CaseFilter {
    /// Builds a filter from the dropdown labels the dashboard shows,
    /// mapping each "All …" sentinel (or an unknown label) to no condition.
    pub fn from_labels(search: &str, severity: &str, status: &str, district: &str) -> Self {
        Self {
            search: search.to_string(),
            severity: Severity::from_label(severity),
            status: CaseStatus::from_label(status),
            district: (district != ALL_DISTRICTS && !district.is_empty())
                .then(|| district.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.severity.is_none()
            && self.status.is_none()
            && self.district.is_none()
    }

    pub fn matches(&self, case: &CaseRecord) -> bool {
        self.matches_search(case)
            && self.severity.map_or(true, |s| case.severity == s)
            && self.status.map_or(true, |s| case.status == s)
            && self
                .district
                .as_deref()
                .map_or(true, |d| case.location.district == d)
    }

    fn matches_search(&self, case: &CaseRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        case.patient.name.to_lowercase().contains(&needle)
            || case.id.as_str().to_lowercase().contains(&needle)
            || case.location.district.to_lowercase().contains(&needle)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    ReportedAt,
    Severity,
    Status,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortState {
    /// A column click: selects `key` and flips the direction, whether or
    /// not the key changed.
    pub fn toggle(&mut self, key: SortKey) {
        self.key = key;
        self.order = self.order.flipped();
    }

    pub fn compare(&self, a: &CaseRecord, b: &CaseRecord) -> Ordering {
        let ordering = match self.key {
            SortKey::ReportedAt => a.reported_at.cmp(&b.reported_at),
            SortKey::Severity => a.severity.rank().cmp(&b.severity.rank()),
            SortKey::Status => a.status.label().cmp(b.status.label()),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Filters then sorts; ties keep the input order.
pub fn filter_and_sort<'a>(
    cases: &'a [CaseRecord],
    filter: &CaseFilter,
    sort: &SortState,
) -> Vec<&'a CaseRecord> {
    let mut matched: Vec<&CaseRecord> = cases.iter().filter(|c| filter.matches(c)).collect();
    matched.sort_by(|a, b| sort.compare(a, b));
    matched
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Slices page `page` (1-based). Pages past the end come back empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages: total_pages(items.len(), page_size),
        total_items: items.len(),
    }
}

/// Filter, sort and page state behind the case reports table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CaseQuery {
    pub filter: CaseFilter,
    pub sort: SortState,
    pub page: usize,
}

impl Default for CaseQuery {
    fn default() -> Self {
        Self {
            filter: CaseFilter::default(),
            sort: SortState::default(),
            page: 1,
        }
    }
}

impl CaseQuery {
    /// Changing criteria returns to the first page.
    pub fn set_filter(&mut self, filter: CaseFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
    }

    fn last_page(&self, cases: &[CaseRecord]) -> usize {
        let matched = cases.iter().filter(|c| self.filter.matches(c)).count();
        total_pages(matched, PAGE_SIZE).max(1)
    }

    pub fn next_page(&mut self, cases: &[CaseRecord]) {
        if self.page < self.last_page(cases) {
            self.page += 1;
        }
    }

    /// Pulls the page back inside the result set after the cases changed
    /// under an active filter.
    pub fn clamp_page(&mut self, cases: &[CaseRecord]) {
        self.page = self.page.clamp(1, self.last_page(cases));
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn run(&self, cases: &[CaseRecord]) -> Page<CaseRecord> {
        let ordered: Vec<CaseRecord> = filter_and_sort(cases, &self.filter, &self.sort)
            .into_iter()
            .cloned()
            .collect();
        let last = total_pages(ordered.len(), PAGE_SIZE).max(1);
        paginate(&ordered, self.page.clamp(1, last), PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CaseId, CaseLocation, Patient, Reporter};
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn case(n: usize, name: &str, district: &str, severity: Severity, status: CaseStatus) -> CaseRecord {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap();
        CaseRecord {
            id: CaseId::new(format!("HC-2024-{n:04}")),
            patient: Patient::new(name, "Female", 30),
            location: CaseLocation {
                district: district.into(),
                village: "Village".into(),
            },
            symptoms: vec![],
            severity,
            reporter: Reporter {
                name: "Meera Devi".into(),
                role: "ASHA Worker".into(),
            },
            status,
            reported_at: base + Duration::minutes(n as i64),
        }
    }

    fn many(n: usize) -> Vec<CaseRecord> {
        (0..n)
            .map(|i| case(i, "Patient", "Dibrugarh", Severity::Low, CaseStatus::Pending))
            .collect()
    }

    #[test]
    fn severity_desc_orders_by_rank() {
        let cases = vec![
            case(1, "a", "X", Severity::Low, CaseStatus::Pending),
            case(2, "b", "X", Severity::Critical, CaseStatus::Pending),
            case(3, "c", "X", Severity::Medium, CaseStatus::Pending),
            case(4, "d", "X", Severity::High, CaseStatus::Pending),
        ];
        let sort = SortState {
            key: SortKey::Severity,
            order: SortOrder::Desc,
        };

        let ordered: Vec<Severity> = filter_and_sort(&cases, &CaseFilter::default(), &sort)
            .iter()
            .map(|c| c.severity)
            .collect();

        assert_eq!(
            ordered,
            vec![Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
        );
    }

    #[test]
    fn status_sorts_lexicographically_by_label() {
        let cases = vec![
            case(1, "a", "X", Severity::Low, CaseStatus::UnderTreatment),
            case(2, "b", "X", Severity::Low, CaseStatus::Critical),
            case(3, "c", "X", Severity::Low, CaseStatus::Resolved),
            case(4, "d", "X", Severity::Low, CaseStatus::Pending),
        ];
        let sort = SortState {
            key: SortKey::Status,
            order: SortOrder::Asc,
        };

        let ordered: Vec<CaseStatus> = filter_and_sort(&cases, &CaseFilter::default(), &sort)
            .iter()
            .map(|c| c.status)
            .collect();

        assert_eq!(
            ordered,
            vec![
                CaseStatus::Critical,
                CaseStatus::Pending,
                CaseStatus::Resolved,
                CaseStatus::UnderTreatment
            ]
        );
    }

    #[test]
    fn ties_keep_insertion_order_in_both_directions() {
        let cases = vec![
            case(1, "first", "X", Severity::High, CaseStatus::Pending),
            case(2, "second", "X", Severity::High, CaseStatus::Pending),
            case(3, "third", "X", Severity::High, CaseStatus::Pending),
        ];
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let sort = SortState {
                key: SortKey::Severity,
                order,
            };
            let names: Vec<&str> = filter_and_sort(&cases, &CaseFilter::default(), &sort)
                .iter()
                .map(|c| c.patient.name.as_str())
                .collect();
            assert_eq!(names, vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn default_sort_is_newest_first() {
        let cases = many(3);
        let ordered = filter_and_sort(&cases, &CaseFilter::default(), &SortState::default());
        assert_eq!(ordered[0].id.as_str(), "HC-2024-0002");
        assert_eq!(ordered[2].id.as_str(), "HC-2024-0000");
    }

    #[test]
    fn toggle_flips_direction_even_on_key_change() {
        let mut sort = SortState::default();
        sort.toggle(SortKey::ReportedAt);
        assert_eq!(sort.order, SortOrder::Asc);

        sort.toggle(SortKey::Severity);
        assert_eq!(sort.key, SortKey::Severity);
        assert_eq!(sort.order, SortOrder::Desc);
    }

    #[test]
    fn search_matches_name_id_or_district_case_insensitively() {
        let cases = vec![
            case(1, "Ramesh Kumar", "Dibrugarh", Severity::Low, CaseStatus::Pending),
            case(2, "Sunita", "Tezpur", Severity::Low, CaseStatus::Pending),
            case(847, "Amit", "Guwahati", Severity::Low, CaseStatus::Pending),
        ];
        let by = |search: &str| CaseFilter {
            search: search.into(),
            ..CaseFilter::default()
        };
        let sort = SortState::default();

        assert_eq!(filter_and_sort(&cases, &by("RAMESH"), &sort).len(), 1);
        assert_eq!(filter_and_sort(&cases, &by("tez"), &sort).len(), 1);
        assert_eq!(filter_and_sort(&cases, &by("hc-2024-0847"), &sort).len(), 1);
        assert_eq!(filter_and_sort(&cases, &by("hc-2024"), &sort).len(), 3);
        assert!(filter_and_sort(&cases, &by("nobody"), &sort).is_empty());
    }

    #[test]
    fn labels_map_sentinels_to_no_condition() {
        let filter = CaseFilter::from_labels("", ALL_SEVERITY, ALL_STATUS, ALL_DISTRICTS);
        assert!(filter.is_empty());

        let filter = CaseFilter::from_labels("x", "High", "Under Treatment", "Tezpur");
        assert_eq!(filter.severity, Some(Severity::High));
        assert_eq!(filter.status, Some(CaseStatus::UnderTreatment));
        assert_eq!(filter.district.as_deref(), Some("Tezpur"));
    }

    #[test]
    fn twenty_three_records_make_three_pages() {
        let cases = many(23);
        let sizes: Vec<usize> = (1..=3).map(|p| paginate(&cases, p, PAGE_SIZE).items.len()).collect();
        assert_eq!(sizes, vec![10, 10, 3]);

        let last = paginate(&cases, 3, PAGE_SIZE);
        assert_eq!(last.total_pages, 3);
        assert!(last.has_prev());
        assert!(!last.has_next());
        assert!(paginate(&cases, 4, PAGE_SIZE).items.is_empty());
    }

    #[test]
    fn empty_list_has_no_pages() {
        let page = paginate::<CaseRecord>(&[], 1, PAGE_SIZE);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn query_navigation_stops_at_boundaries() {
        let cases = many(23);
        let mut query = CaseQuery::default();

        query.prev_page();
        assert_eq!(query.page, 1);
        for _ in 0..5 {
            query.next_page(&cases);
        }
        assert_eq!(query.page, 3);

        query.set_filter(CaseFilter {
            district: Some("Dibrugarh".into()),
            ..CaseFilter::default()
        });
        assert_eq!(query.page, 1);
    }

    #[test]
    fn run_does_not_touch_the_source() {
        let cases = vec![
            case(1, "a", "X", Severity::Low, CaseStatus::Pending),
            case(2, "b", "X", Severity::Critical, CaseStatus::Pending),
        ];
        let before = cases.clone();
        let mut query = CaseQuery::default();
        query.toggle_sort(SortKey::Severity);

        let first = query.run(&cases);
        let second = query.run(&cases);

        assert_eq!(cases, before);
        assert_eq!(first, second);
    }

    fn arb_case() -> impl Strategy<Value = CaseRecord> {
        (
            0usize..500,
            prop::sample::select(vec!["Ramesh", "Sunita", "Amit", "Priya"]),
            prop::sample::select(vec!["Dibrugarh", "Tezpur", "Guwahati"]),
            prop::sample::select(Severity::ALL.to_vec()),
            prop::sample::select(CaseStatus::ALL.to_vec()),
        )
            .prop_map(|(n, name, district, severity, status)| {
                case(n, name, district, severity, status)
            })
    }

    fn arb_filter() -> impl Strategy<Value = CaseFilter> {
        (
            prop::sample::select(vec!["", "a", "SUN", "hc-2024-00", "tez"]),
            prop::option::of(prop::sample::select(Severity::ALL.to_vec())),
            prop::option::of(prop::sample::select(CaseStatus::ALL.to_vec())),
            prop::option::of(prop::sample::select(vec!["Dibrugarh", "Tezpur"])),
        )
            .prop_map(|(search, severity, status, district)| CaseFilter {
                search: search.into(),
                severity,
                status,
                district: district.map(str::to_string),
            })
    }

    proptest! {
        #[test]
        fn filtering_is_sound_and_idempotent(
            cases in prop::collection::vec(arb_case(), 0..60),
            filter in arb_filter(),
        ) {
            let sort = SortState::default();
            let once: Vec<CaseRecord> =
                filter_and_sort(&cases, &filter, &sort).into_iter().cloned().collect();

            prop_assert!(once.len() <= cases.len());
            for c in &once {
                prop_assert!(filter.matches(c));
            }

            let twice: Vec<CaseRecord> =
                filter_and_sort(&once, &filter, &sort).into_iter().cloned().collect();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn pages_partition_the_list(len in 0usize..95, size in 1usize..15) {
            let cases = many(len);
            let pages = total_pages(len, size);
            let mut seen = 0;
            for p in 1..=pages {
                let page = paginate(&cases, p, size);
                prop_assert!(!page.items.is_empty());
                prop_assert!(page.items.len() <= size);
                seen += page.items.len();
            }
            prop_assert_eq!(seen, len);
        }
    }
}
