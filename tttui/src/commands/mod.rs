mod auth;
mod edit;
mod list;
mod start;
mod stop;

pub use auth::{config_path, logout};
pub use edit::edit;
pub use list::list;
pub use start::start;
pub use stop::stop;

use toggl::{TimeEntry, TogglClient};

/// Split `items` into the one whose id is `last` (if present) and the rest,
/// keeping the order of the rest.
pub(crate) fn last_used_first<T>(
    mut items: Vec<T>,
    last: Option<i64>,
    id: impl Fn(&T) -> i64,
) -> (Option<T>, Vec<T>) {
    let position = last.and_then(|last| items.iter().position(|item| id(item) == last));
    let last = position.map(|i| items.remove(i));
    (last, items)
}

/// `" (Client - Project)"` for an entry booked on a project, else empty.
pub(crate) async fn project_info(client: &TogglClient, entry: &TimeEntry) -> String {
    let Some(project_id) = entry.project_id else {
        return String::new();
    };
    match client.project_details(entry.workspace_id, project_id).await {
        Ok((project, project_client)) => format!(
            " ({} - {})",
            project_client
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("No client"),
            project.name
        ),
        Err(e) => {
            tracing::warn!(project_id, error = %e, "could not look up project");
            String::new()
        }
    }
}

/// `Stopped time entry "…" (duration: N minutes)`.
pub(crate) fn stopped_message(entry: &TimeEntry) -> String {
    format!(
        "Stopped time entry \"{}\" (duration: {} minutes)",
        entry.description,
        entry.duration.abs() / 60
    )
}
