use anyhow::Result;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use toggl::DetailedTimeEntry;

use super::auth::{connect, select_workspace};
use super::project_info;
use crate::time_utils::{format_clock, format_day, format_hours_minutes};

const RECENT_LIMIT: usize = 10;

/// `⚫|🟢 HHhMMm [HH:MM-HH:MM] description (Client - Project)`.
fn entry_line(entry: &DetailedTimeEntry, now: OffsetDateTime) -> String {
    let e = &entry.entry;
    let icon = if e.is_running() { "🟢" } else { "⚫" };
    format!(
        "{icon} {} [{}-{}] {}{}",
        format_hours_minutes(e.elapsed(now)),
        format_clock(e.start),
        format_clock(e.stop.unwrap_or(now)),
        e.description,
        entry.project_suffix()
    )
}

/// Entries keyed by their local start day, newest day first.
fn group_by_day(entries: &[DetailedTimeEntry]) -> Vec<(String, Vec<&DetailedTimeEntry>)> {
    let mut days: BTreeMap<String, Vec<&DetailedTimeEntry>> = BTreeMap::new();
    for entry in entries {
        days.entry(format_day(entry.entry.start))
            .or_default()
            .push(entry);
    }
    days.into_iter().rev().collect()
}

pub async fn list() -> Result<()> {
    let client = connect()?;
    let current = client.current_time_entry().await?;

    let workspace_id = match &current {
        Some(entry) => entry.workspace_id,
        None => select_workspace(&client).await?.id,
    };

    let now = OffsetDateTime::now_utc();
    let entries = client
        .recent_entries_with_details(workspace_id, RECENT_LIMIT, now)
        .await?;

    if let Some(current) = current {
        let info = project_info(&client, &current).await;
        println!("\nCurrently running:");
        println!(
            "🟢 {} [{}-{}] {}{info}",
            format_hours_minutes(current.elapsed(now)),
            format_clock(current.start),
            format_clock(now),
            current.description
        );
    }

    println!("\nRecent entries:");
    for (day, day_entries) in group_by_day(&entries) {
        println!("\n{day}:");
        println!("----------------");
        for entry in day_entries {
            println!("{}", entry_line(entry, now));
        }
    }
    Ok(())
}
