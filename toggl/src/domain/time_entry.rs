use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};

use super::{Client, Project};

/// A time entry as returned by `/me/time_entries`.
///
/// `stop` is `None` while the entry is running; Toggl then reports a negative
/// `duration`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeEntry {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub workspace_id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub stop: Option<OffsetDateTime>,
    #[serde(default)]
    pub duration: i64,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.stop.is_none()
    }

    /// Time spent on the entry, measured up to `now` while it is running.
    pub fn elapsed(&self, now: OffsetDateTime) -> Duration {
        (self.stop.unwrap_or(now) - self.start).abs()
    }
}

/// A time entry together with the project and client it is booked on.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedTimeEntry {
    pub entry: TimeEntry,
    pub project: Option<Project>,
    pub client: Option<Client>,
}

impl DetailedTimeEntry {
    /// `" (Client - Project)"`, or an empty string for entries without a project.
    pub fn project_suffix(&self) -> String {
        match &self.project {
            Some(project) => format!(
                " ({} - {})",
                self.client
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or("No client"),
                project.name
            ),
            None => String::new(),
        }
    }
}

/// Keep the entries of `workspace_id` that started within `since..=until`,
/// newest first, at most `limit` of them, and attach their project and client.
pub fn enrich_entries(
    entries: Vec<TimeEntry>,
    workspace_id: i64,
    since: OffsetDateTime,
    until: OffsetDateTime,
    limit: usize,
    projects: &[Project],
    clients: &[Client],
) -> Vec<DetailedTimeEntry> {
    let project_map: HashMap<i64, &Project> = projects.iter().map(|p| (p.id, p)).collect();
    let client_map: HashMap<i64, &Client> = clients.iter().map(|c| (c.id, c)).collect();

    let mut entries: Vec<TimeEntry> = entries
        .into_iter()
        .filter(|e| e.workspace_id == workspace_id && e.start >= since && e.start <= until)
        .collect();
    entries.sort_by(|a, b| b.start.cmp(&a.start));
    entries.truncate(limit);

    entries
        .into_iter()
        .map(|entry| {
            let project = entry
                .project_id
                .and_then(|id| project_map.get(&id))
                .map(|p| (*p).clone());
            let client = project
                .as_ref()
                .and_then(|p| p.client_id)
                .and_then(|id| client_map.get(&id))
                .map(|c| (*c).clone());
            DetailedTimeEntry {
                entry,
                project,
                client,
            }
        })
        .collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
