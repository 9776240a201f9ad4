//! Reference lists the dashboard browses: villages, the field team roster,
//! the notification feed and the water source status filter.

use serde::{Deserialize, Serialize};

use crate::model::{Alert, AlertId, AlertKind, FieldWorker, Village, VillageId, WaterSource, WaterStatus};
use crate::query::ALL_DISTRICTS;

pub const DISTRICTS: [&str; 5] = ["Dibrugarh", "Tezpur", "Guwahati", "Jorhat", "Silchar"];

pub fn villages() -> Vec<Village> {
    let village = |id: &str,
                   name: &str,
                   district: &str,
                   population: u32,
                   asha_workers: u32,
                   active_cases: u32,
                   water_sources: u32,
                   (lat, lng): (f64, f64)| Village {
        id: VillageId::new(id),
        name: name.into(),
        district: district.into(),
        population,
        asha_workers,
        active_cases,
        water_sources,
        lat,
        lng,
    };

    vec![
        village("v1", "Rajpur", "Dibrugarh", 2500, 3, 12, 5, (27.4728, 95.0173)),
        village("v2", "Lahowal", "Dibrugarh", 1800, 2, 8, 3, (27.4528, 95.0373)),
        village("v3", "Balipara", "Tezpur", 3200, 4, 15, 7, (26.7271, 92.7789)),
        village("v4", "Beltola", "Guwahati", 4500, 6, 23, 9, (26.1445, 91.7362)),
        village("v5", "Teok", "Jorhat", 2100, 3, 7, 4, (26.7509, 94.1086)),
    ]
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VillageFilter {
    pub district: Option<String>,
    pub search: String,
}

impl VillageFilter {
    pub fn from_labels(district: &str, search: &str) -> Self {
        Self {
            district: (district != ALL_DISTRICTS && !district.is_empty())
                .then(|| district.to_string()),
            search: search.to_string(),
        }
    }

    pub fn matches(&self, village: &Village) -> bool {
        let in_district = self
            .district
            .as_deref()
            .map_or(true, |d| village.district == d);
        let needle = self.search.trim().to_lowercase();
        in_district && (needle.is_empty() || village.name.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, villages: &'a [Village]) -> Vec<&'a Village> {
        villages.iter().filter(|v| self.matches(v)).collect()
    }
}

pub fn field_team() -> Vec<FieldWorker> {
    let worker = |name: &str, role: &str, location: &str, status: &str| FieldWorker {
        name: name.into(),
        role: role.into(),
        location: location.into(),
        status: status.into(),
    };

    vec![
        worker("Meera Devi", "ASHA Worker", "Dibrugarh", "Active"),
        worker("Anjali Bora", "Volunteer", "Tezpur", "Field Work"),
        worker("Raman Kalita", "Community Leader", "Guwahati", "Campaign"),
    ]
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotificationFilter {
    #[default]
    All,
    Unread,
    Critical,
}

/// One row of the notification panel.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub time: String,
    pub is_read: bool,
    pub location: Option<String>,
    /// System notices are not backed by an alert and cannot be marked read.
    pub alert_id: Option<AlertId>,
}

impl From<&Alert> for Notification {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.to_string(),
            kind: alert.kind,
            title: alert.title.clone(),
            message: alert.description.clone(),
            time: alert.time.clone(),
            is_read: alert.is_read,
            location: alert.location.clone(),
            alert_id: Some(alert.id.clone()),
        }
    }
}

fn system_notices() -> [Notification; 2] {
    [
        Notification {
            id: "sys1".into(),
            kind: AlertKind::Info,
            title: "System Update".into(),
            message: "HealthGuard NE system updated to version 2.1.0".into(),
            time: "1 hour ago".into(),
            is_read: false,
            location: None,
            alert_id: None,
        },
        Notification {
            id: "team1".into(),
            kind: AlertKind::Info,
            title: "Team Assignment".into(),
            message: "New ASHA worker assigned to Rajpur village".into(),
            time: "2 hours ago".into(),
            is_read: true,
            location: Some("Rajpur".into()),
            alert_id: None,
        },
    ]
}

/// Alerts first, then the fixed system notices.
pub fn notification_feed(alerts: &[Alert], filter: NotificationFilter) -> Vec<Notification> {
    alerts
        .iter()
        .map(Notification::from)
        .chain(system_notices())
        .filter(|n| match filter {
            NotificationFilter::All => true,
            NotificationFilter::Unread => !n.is_read,
            NotificationFilter::Critical => n.kind == AlertKind::Critical,
        })
        .collect()
}

/// `None` shows every source.
pub fn filter_water_sources(
    sources: &[WaterSource],
    status: Option<WaterStatus>,
) -> Vec<&WaterSource> {
    sources
        .iter()
        .filter(|s| status.map_or(true, |wanted| s.status == wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockDataStore;

    #[test]
    fn district_filter_and_search_combine() {
        let all = villages();

        let dibrugarh = VillageFilter::from_labels("Dibrugarh", "");
        let names: Vec<&str> = dibrugarh.apply(&all).iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Rajpur", "Lahowal"]);

        let searched = VillageFilter::from_labels("Dibrugarh", "  LAHO ");
        assert_eq!(searched.apply(&all).len(), 1);

        let everywhere = VillageFilter::from_labels(ALL_DISTRICTS, "");
        assert_eq!(everywhere.apply(&all).len(), 5);

        let silchar = VillageFilter::from_labels("Silchar", "");
        assert!(silchar.apply(&all).is_empty());
    }

    #[test]
    fn notification_filters() {
        let store = MockDataStore::seeded();

        let all = notification_feed(store.alerts(), NotificationFilter::All);
        assert_eq!(all.len(), 5);
        assert_eq!(all[3].id, "sys1");

        let unread = notification_feed(store.alerts(), NotificationFilter::Unread);
        let ids: Vec<&str> = unread.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["alert-001", "alert-002", "sys1"]);

        let critical = notification_feed(store.alerts(), NotificationFilter::Critical);
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].alert_id, Some(AlertId::new("alert-001")));
    }

    #[test]
    fn water_filter_by_status() {
        let store = MockDataStore::seeded();
        assert_eq!(filter_water_sources(store.water_sources(), None).len(), 3);

        let safe = filter_water_sources(store.water_sources(), Some(WaterStatus::Safe));
        assert_eq!(safe.len(), 1);
        assert_eq!(safe[0].id.as_str(), "WS-002");
    }
}
