// ABOUTME: Outstanding todo and upcoming calendar alerts across private and shared claims
// ABOUTME: Merges overlapping result sets by id and derives per-claim and per-assignee counts

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::entities::{calendar_event, claim, todo};
use crate::error::Result;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertScope {
    Private,
    Shared,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAlertCounts {
    pub todo_alerts: usize,
    pub calendar_alerts: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsSummary {
    pub todo_alerts: usize,
    pub calendar_alerts: usize,
    pub total: usize,
    pub todos: Vec<todo::Model>,
    pub events: Vec<calendar_event::Model>,
    /// Keyed by case number; only filled for the shared scope.
    pub per_claim_alerts: BTreeMap<String, ClaimAlertCounts>,
}

/// Private and shared alerts merged for a claim host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedAlerts {
    pub private_total: usize,
    pub shared_total: usize,
    pub todos: Vec<todo::Model>,
    pub events: Vec<calendar_event::Model>,
    pub my_tasks: usize,
    pub others_tasks: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub my_tasks: usize,
    pub others_tasks: usize,
    pub overdue: usize,
}

/// Rows written before `responsible_user_id` existed belong to their creator.
pub fn is_assigned_to(responsible_user_id: Option<Uuid>, creator_id: Uuid, user_id: Uuid) -> bool {
    match responsible_user_id {
        Some(responsible) => responsible == user_id,
        None => creator_id == user_id,
    }
}

pub trait Alert {
    fn alert_id(&self) -> Uuid;
}

impl Alert for todo::Model {
    fn alert_id(&self) -> Uuid {
        self.id
    }
}

impl Alert for calendar_event::Model {
    fn alert_id(&self) -> Uuid {
        self.id
    }
}

/// Concatenates `first` and `second`, dropping later items whose id was already seen.
pub fn merge_by_id<T: Alert>(first: Vec<T>, second: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|item| seen.insert(item.alert_id()))
        .collect()
}

/// Alarm time when set, otherwise midnight UTC of the due date; undated todos sort last.
fn todo_sort_key(todo: &todo::Model) -> i64 {
    todo.alarm_time
        .or_else(|| {
            todo.due_date
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc().timestamp())
        })
        .unwrap_or(i64::MAX)
}

pub fn sort_todos(todos: &mut [todo::Model]) {
    todos.sort_by_key(todo_sort_key);
}

pub fn sort_events(events: &mut [calendar_event::Model]) {
    events.sort_by_key(|event| event.start_time);
}

pub fn count_tasks(todos: &[todo::Model], user_id: Uuid, today: NaiveDate) -> TaskCounts {
    let mut counts = TaskCounts::default();
    for todo in todos {
        if is_assigned_to(todo.responsible_user_id, todo.user_id, user_id) {
            counts.my_tasks += 1;
        } else {
            counts.others_tasks += 1;
        }
        if !todo.completed && todo.due_date.is_some_and(|due| due < today) {
            counts.overdue += 1;
        }
    }
    counts
}

pub fn per_claim_breakdown(
    claims: &[claim::Model],
    todos: &[todo::Model],
    events: &[calendar_event::Model],
) -> BTreeMap<String, ClaimAlertCounts> {
    let case_by_claim: HashMap<Uuid, &str> = claims
        .iter()
        .map(|claim| (claim.id, claim.case_number.as_str()))
        .collect();

    let mut breakdown: BTreeMap<String, ClaimAlertCounts> = BTreeMap::new();
    for case_number in todos.iter().filter_map(|todo| todo.case_number.as_deref()) {
        let counts = breakdown.entry(case_number.to_string()).or_default();
        counts.todo_alerts += 1;
        counts.total += 1;
    }
    for case_number in events
        .iter()
        .filter_map(|event| event.claim_id)
        .filter_map(|claim_id| case_by_claim.get(&claim_id))
    {
        let counts = breakdown.entry(case_number.to_string()).or_default();
        counts.calendar_alerts += 1;
        counts.total += 1;
    }
    breakdown
}

/// Outstanding todos (due by today or alarmed already) and upcoming events for one scope.
#[tracing::instrument(skip(storage))]
pub async fn alerts_for_scope(
    storage: &Storage,
    user_id: Uuid,
    scope: AlertScope,
    now: DateTime<Utc>,
) -> Result<AlertsSummary> {
    let claims = match scope {
        AlertScope::Private => storage.get_claims_for_user(user_id).await?,
        AlertScope::Shared => {
            let claim_ids = storage.get_shared_claim_ids(user_id).await?;
            if claim_ids.is_empty() {
                return Ok(AlertsSummary::default());
            }
            storage.get_claims_by_ids(&claim_ids).await?
        }
    };

    // Todos key on case number, events on claim id
    let case_numbers: Vec<String> = claims.iter().map(|c| c.case_number.clone()).collect();
    let claim_ids: Vec<Uuid> = claims.iter().map(|c| c.id).collect();
    let today = now.date_naive();
    let timestamp = now.timestamp();

    let (due, alarmed, mut events) = tokio::try_join!(
        storage.get_todos_due_by(&case_numbers, today),
        storage.get_todos_alarmed(&case_numbers, timestamp),
        storage.get_upcoming_events(&claim_ids, user_id, timestamp),
    )?;

    let mut todos = merge_by_id(due, alarmed);
    sort_todos(&mut todos);
    sort_events(&mut events);

    let per_claim_alerts = match scope {
        AlertScope::Shared => per_claim_breakdown(&claims, &todos, &events),
        AlertScope::Private => BTreeMap::new(),
    };

    tracing::debug!(
        todos = todos.len(),
        events = events.len(),
        "collected alerts"
    );

    Ok(AlertsSummary {
        todo_alerts: todos.len(),
        calendar_alerts: events.len(),
        total: todos.len() + events.len(),
        todos,
        events,
        per_claim_alerts,
    })
}

/// Both scopes fetched together; counts are recomputed on the merged lists
/// so an item visible in both scopes is only counted once.
#[tracing::instrument(skip(storage))]
pub async fn combined_alerts(storage: &Storage, user_id: Uuid, now: DateTime<Utc>) -> Result<CombinedAlerts> {
    let (private, shared) = tokio::try_join!(
        alerts_for_scope(storage, user_id, AlertScope::Private, now),
        alerts_for_scope(storage, user_id, AlertScope::Shared, now),
    )?;

    let mut todos = merge_by_id(private.todos, shared.todos);
    let mut events = merge_by_id(private.events, shared.events);
    sort_todos(&mut todos);
    sort_events(&mut events);

    let counts = count_tasks(&todos, user_id, now.date_naive());

    Ok(CombinedAlerts {
        private_total: private.total,
        shared_total: shared.total,
        todos,
        events,
        my_tasks: counts.my_tasks,
        others_tasks: counts.others_tasks,
        overdue: counts.overdue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo_row(id: Uuid, creator: Uuid, responsible: Option<Uuid>, due: Option<NaiveDate>) -> todo::Model {
        todo::Model {
            id,
            user_id: creator,
            title: "File witness statement".to_string(),
            due_date: due,
            alarm_enabled: false,
            alarm_time: None,
            completed: false,
            responsible_user_id: responsible,
            case_number: Some("CL-1".to_string()),
            evidence_id: None,
            created_at: 0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_assignment_falls_back_to_creator() {
        let u = Uuid::new_v4();
        let v = Uuid::new_v4();
        assert!(is_assigned_to(None, u, u));
        assert!(!is_assigned_to(Some(v), u, u));
        assert!(is_assigned_to(Some(v), u, v));
    }

    #[test]
    fn test_merge_keeps_first_seen() {
        let user = Uuid::new_v4();
        let shared_id = Uuid::new_v4();
        let mut private_copy = todo_row(shared_id, user, None, None);
        private_copy.title = "private".to_string();
        let mut shared_copy = todo_row(shared_id, user, None, None);
        shared_copy.title = "shared".to_string();
        let other = todo_row(Uuid::new_v4(), user, None, None);

        let merged = merge_by_id(vec![private_copy], vec![shared_copy, other]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "private");
    }

    #[test]
    fn test_sort_prefers_alarm_time() {
        let user = Uuid::new_v4();
        let mut alarmed = todo_row(Uuid::new_v4(), user, None, Some(date(2026, 10, 20)));
        alarmed.alarm_time = Some(date(2026, 10, 1).and_hms_opt(9, 0, 0).unwrap().and_utc().timestamp());
        let due_early = todo_row(Uuid::new_v4(), user, None, Some(date(2026, 10, 5)));
        let undated = todo_row(Uuid::new_v4(), user, None, None);

        let mut todos = vec![undated.clone(), due_early.clone(), alarmed.clone()];
        sort_todos(&mut todos);
        assert_eq!(todos[0].id, alarmed.id);
        assert_eq!(todos[1].id, due_early.id);
        assert_eq!(todos[2].id, undated.id);
    }

    #[test]
    fn test_count_tasks() {
        let me = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let today = date(2026, 10, 16);
        let todos = vec![
            todo_row(Uuid::new_v4(), me, None, Some(date(2026, 10, 10))),
            todo_row(Uuid::new_v4(), me, Some(colleague), Some(today)),
            todo_row(Uuid::new_v4(), colleague, Some(me), None),
        ];

        let counts = count_tasks(&todos, me, today);
        assert_eq!(
            counts,
            TaskCounts {
                my_tasks: 2,
                others_tasks: 1,
                overdue: 1
            }
        );
    }

    #[test]
    fn test_empty_summary_shape() {
        let value = serde_json::to_value(AlertsSummary::default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "todoAlerts": 0,
                "calendarAlerts": 0,
                "total": 0,
                "todos": [],
                "events": [],
                "perClaimAlerts": {}
            })
        );
    }
}
