use anyhow::{Context, Result};
use time::OffsetDateTime;
use toggl::{DetailedTimeEntry, TimeEntry, TimeEntryUpdate};

use super::auth::{connect, select_workspace};
use crate::prompt::time_entry::{format_timestamp, parse_timestamp};
use crate::prompt::{self, Choice, SearchConfig, TimeRangeConfig, TimeRangeResult};
use crate::time_utils::{format_compact, from_local_primitive, to_local_primitive};

const RECENT_LIMIT: usize = 10;

/// `YYYY-MM-DD HH:mm - HH:mm (XhYm) description (Client - Project)`.
fn entry_label(entry: &DetailedTimeEntry, now: OffsetDateTime) -> String {
    let e = &entry.entry;
    let start = format_timestamp(to_local_primitive(e.start));
    let stop = format_timestamp(to_local_primitive(e.stop.unwrap_or(now)));
    // Timestamps read "HH:mm YYYY-MM-DD"; the label leads with the date.
    let (start_clock, start_day) = start.split_once(' ').unwrap_or((start.as_str(), ""));
    let stop_clock = stop.split_once(' ').map(|(clock, _)| clock).unwrap_or(stop.as_str());
    format!(
        "{start_day} {start_clock} - {stop_clock} ({}) {}{}",
        format_compact(e.elapsed(now)),
        e.description,
        entry.project_suffix()
    )
}

fn editor_config(entry: &TimeEntry) -> TimeRangeConfig {
    TimeRangeConfig::new(
        "Edit time entry",
        format_timestamp(to_local_primitive(entry.start)),
    )
    .end_time(entry.stop.map(|stop| format_timestamp(to_local_primitive(stop))))
    .description(entry.description.clone())
    .required(true)
}

/// Translate the editor's local wall-clock result into an API update.
fn to_update(entry: &TimeEntry, result: TimeRangeResult) -> Result<TimeEntryUpdate> {
    let parse = |s: &str| {
        parse_timestamp(s)
            .map(from_local_primitive)
            .with_context(|| format!("Invalid timestamp '{s}'"))
    };
    let start = parse(&result.start_time)?;
    let stop = result.end_time.as_deref().map(parse).transpose()?;
    let duration = (stop.is_none() && !entry.is_running()).then_some(-1);

    Ok(TimeEntryUpdate {
        description: Some(result.description),
        start: Some(start),
        stop,
        duration,
    })
}

pub async fn edit() -> Result<()> {
    let client = connect()?;
    let workspace = select_workspace(&client).await?;

    let now = OffsetDateTime::now_utc();
    let entries = client
        .recent_entries_with_details(workspace.id, RECENT_LIMIT, now)
        .await?;
    if entries.is_empty() {
        println!("No recent time entries found.");
        return Ok(());
    }

    let choices = entries
        .into_iter()
        .map(|e| Choice::new(entry_label(&e, now), e.entry))
        .collect();
    let selected = prompt::search(SearchConfig::new("Select time entry to edit:", choices))?;

    let result = prompt::edit_time_range(editor_config(&selected))?;
    let update = to_update(&selected, result)?;
    let updated = client
        .update_time_entry(selected.workspace_id, selected.id, &update)
        .await?;
    println!("Updated time entry: \"{}\"", updated.description);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    fn entry(stop: Option<OffsetDateTime>) -> TimeEntry {
        let start = from_local_primitive(datetime!(2024-03-01 09:15));
        TimeEntry {
            id: 1,
            description: "Review".to_string(),
            workspace_id: 1,
            project_id: None,
            start,
            stop,
            duration: stop.map(|s| (s - start).whole_seconds()).unwrap_or(-1),
        }
    }

    #[test]
    fn label_leads_with_local_date() {
        let stop = from_local_primitive(datetime!(2024-03-01 11:20));
        let detailed = DetailedTimeEntry {
            entry: entry(Some(stop)),
            project: None,
            client: None,
        };
        assert_eq!(
            entry_label(&detailed, stop + Duration::hours(1)),
            "2024-03-01 09:15 - 11:20 (2h5m) Review"
        );
    }

    #[test]
    fn editor_is_seeded_with_local_timestamps() {
        let config = editor_config(&entry(None));
        assert_eq!(config.start_time, "09:15 2024-03-01");
        assert_eq!(config.end_time, None);
        assert_eq!(config.description, "Review");
        assert!(config.required);
    }

    #[test]
    fn result_is_converted_back_to_the_local_offset() {
        let original = entry(Some(from_local_primitive(datetime!(2024-03-01 10:00))));
        let update = to_update(
            &original,
            TimeRangeResult {
                start_time: "09:30 2024-03-01".to_string(),
                end_time: Some("10:45 2024-03-01".to_string()),
                description: "Code review".to_string(),
            },
        )
        .unwrap();

        assert_eq!(update.start, Some(from_local_primitive(datetime!(2024-03-01 09:30))));
        assert_eq!(update.stop, Some(from_local_primitive(datetime!(2024-03-01 10:45))));
        assert_eq!(update.description.as_deref(), Some("Code review"));
        assert_eq!(update.duration, None);
    }

    #[test]
    fn removing_the_end_time_restarts_the_entry() {
        let original = entry(Some(from_local_primitive(datetime!(2024-03-01 10:00))));
        let update = to_update(
            &original,
            TimeRangeResult {
                start_time: "09:15 2024-03-01".to_string(),
                end_time: None,
                description: "Review".to_string(),
            },
        )
        .unwrap();
        assert_eq!(update.stop, None);
        assert_eq!(update.duration, Some(-1));
    }
}
