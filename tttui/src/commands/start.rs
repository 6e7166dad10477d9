use anyhow::{Context, Result};
use std::collections::HashSet;
use toggl::{Client, Project, TimeEntry, TimeEntryUpdate, TogglClient, Workspace};

use super::auth::{connect, select_workspace};
use super::{last_used_first, project_info, stopped_message};
use crate::config::{env_id, TttuiConfig};
use crate::prompt::{self, Choice, CreatePolicy, InputConfig, SearchConfig};

const PROJECT_ENV: &str = "TOGGL_PROJECT";
const CLIENT_ENV: &str = "TOGGL_CLIENT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunningAction {
    New,
    ChangeDescription,
    Stop,
}

/// An existing item or the name typed for a new one.
enum Pick<T> {
    Existing(T),
    Create(String),
}

pub async fn start() -> Result<()> {
    let client = connect()?;

    if let Some(current) = client.current_time_entry().await? {
        if handle_running_entry(&client, current).await? {
            return Ok(());
        }
    }

    let workspace = select_workspace(&client).await?;

    if let Some(project_id) = env_id(PROJECT_ENV) {
        match client.project_details(workspace.id, project_id).await {
            Ok((project, project_client)) => {
                let project_client = project_client.unwrap_or_else(Client::none);
                println!(
                    "Using project {} ({}) client: {}",
                    project.name, project.id, project_client.name
                );
                return start_entry(&client, &workspace, &project_client, &project).await;
            }
            Err(e) => {
                eprintln!("Could not use project {project_id}: {e}");
                println!("Falling back to normal selection...\n");
            }
        }
    }

    let selected_client = match env_id(CLIENT_ENV) {
        Some(0) => {
            println!("Using no client");
            Client::none()
        }
        Some(client_id) => match client.client_details(workspace.id, client_id).await {
            Ok(found) => {
                println!("Using client {} ({})", found.name, found.id);
                found
            }
            Err(e) => {
                eprintln!("Could not use client {client_id}: {e}");
                println!("Falling back to normal selection...\n");
                select_client(&client, workspace.id).await?
            }
        },
        None => select_client(&client, workspace.id).await?,
    };

    let project = select_project(&client, workspace.id, selected_client.id).await?;
    start_entry(&client, &workspace, &selected_client, &project).await
}

/// Offer to replace, rename or stop the running entry. Returns true when the
/// command is finished.
async fn handle_running_entry(client: &TogglClient, current: TimeEntry) -> Result<bool> {
    let info = project_info(client, &current).await;
    let action = prompt::search(SearchConfig::select(
        format!(
            "Found running time entry \"{}\"{info}. What would you like to do?",
            current.description
        ),
        vec![
            Choice::new("New time entry (stop current)", RunningAction::New),
            Choice::new("Change description", RunningAction::ChangeDescription),
            Choice::new("Stop it", RunningAction::Stop),
        ],
    ))?;

    match action {
        RunningAction::New => Ok(false),
        RunningAction::Stop => {
            let stopped = client
                .stop_time_entry(current.workspace_id, current.id)
                .await?;
            println!("{}", stopped_message(&stopped));
            Ok(true)
        }
        RunningAction::ChangeDescription => {
            let description = prompt::input(
                InputConfig::new("Edit description:").initial_value(current.description.clone()),
            )?;
            if description != current.description {
                let update = TimeEntryUpdate {
                    description: Some(description),
                    ..TimeEntryUpdate::default()
                };
                let updated = client
                    .update_time_entry(current.workspace_id, current.id, &update)
                    .await?;
                println!(
                    "Updated time entry description to: \"{}\"",
                    updated.description
                );
            }
            Ok(true)
        }
    }
}

fn prompt_name(message: &str, missing: &'static str) -> Result<String> {
    let name = prompt::input(InputConfig::new(message).validate(move |value| {
        if value.trim().is_empty() {
            Err(missing.to_string())
        } else {
            Ok(())
        }
    }))?;
    Ok(name.trim().to_string())
}

fn client_choices(clients: Vec<Client>, last: Option<i64>) -> Vec<Choice<Pick<Client>>> {
    let (last, rest) = last_used_first(clients, last, |c| c.id);
    let mut choices = Vec::with_capacity(rest.len() + 2);
    if let Some(client) = last {
        choices.push(Choice::new(
            format!("{} ({}) (last used)", client.name, client.id),
            Pick::Existing(client),
        ));
    }
    choices.push(Choice::new("No client", Pick::Existing(Client::none())));
    choices.extend(
        rest.into_iter()
            .map(|c| Choice::new(format!("{} ({})", c.name, c.id), Pick::Existing(c))),
    );
    choices
}

async fn select_client(client: &TogglClient, workspace_id: i64) -> Result<Client> {
    let clients = client
        .clients(workspace_id)
        .await
        .context("Failed to fetch clients")?;
    let message = if clients.is_empty() {
        "No clients found. Select \"No client\" or create new:"
    } else {
        "Select client (type to search, Enter to create new):"
    };
    let last = TttuiConfig::load()?.last_client_id;

    let picked = prompt::search(
        SearchConfig::new(message, client_choices(clients, last)).create(
            CreatePolicy::WhenNoMatch,
            |term| {
                Choice::new(
                    format!("Create new client \"{term}\""),
                    Pick::Create(term.to_string()),
                )
            },
        ),
    )?;

    let selected = match picked {
        Pick::Existing(selected) => selected,
        Pick::Create(name) => {
            let name = if name.trim().is_empty() {
                prompt_name("Enter new client name:", "Client name is required")?
            } else {
                name
            };
            client.create_client(workspace_id, &name).await?
        }
    };

    if !selected.is_none() {
        TttuiConfig::update(|config| config.last_client_id = Some(selected.id))?;
    }
    Ok(selected)
}

fn project_choices(projects: Vec<Project>, last: Option<i64>) -> Vec<Choice<Pick<Project>>> {
    let (last, rest) = last_used_first(projects, last, |p| p.id);
    last.map(|p| {
        Choice::new(
            format!("{} ({}) (last used)", p.name, p.id),
            Pick::Existing(p),
        )
    })
    .into_iter()
    .chain(
        rest.into_iter()
            .map(|p| Choice::new(format!("{} ({})", p.name, p.id), Pick::Existing(p))),
    )
    .collect()
}

async fn select_project(client: &TogglClient, workspace_id: i64, client_id: i64) -> Result<Project> {
    let projects = if client_id == 0 {
        client.projects(workspace_id).await
    } else {
        client.projects_by_client(workspace_id, client_id).await
    }
    .context("Failed to fetch projects")?;
    let last = TttuiConfig::load()?.last_project_id;

    let picked = prompt::search(
        SearchConfig::new(
            "Select project (type to search, Enter to create new):",
            project_choices(projects, last),
        )
        .create(CreatePolicy::WhenNoMatch, |term| {
            Choice::new(
                format!("Create new project \"{term}\""),
                Pick::Create(term.to_string()),
            )
        }),
    )?;

    let project = match picked {
        Pick::Existing(project) => project,
        Pick::Create(name) => {
            let name = if name.trim().is_empty() {
                prompt_name("Enter new project name:", "Project name is required")?
            } else {
                name
            };
            client.create_project(workspace_id, &name, client_id).await?
        }
    };

    TttuiConfig::update(|config| config.last_project_id = Some(project.id))?;
    Ok(project)
}

/// Non-empty descriptions in first-seen order, without duplicates.
fn unique_descriptions(entries: &[TimeEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|e| e.description.as_str())
        .filter(|d| !d.is_empty() && seen.insert(*d))
        .map(str::to_string)
        .collect()
}

fn default_description(selected_client: &Client, project: &Project) -> String {
    format!("{} - {}", selected_client.name, project.name)
}

async fn task_description(
    client: &TogglClient,
    selected_client: &Client,
    project: &Project,
) -> Result<String> {
    let entries = client.recent_time_entries(Some(project.id)).await?;
    let descriptions = unique_descriptions(&entries);
    let message = if descriptions.is_empty() {
        "Enter task description:"
    } else {
        "Select or enter task description:"
    };

    let choices = descriptions
        .into_iter()
        .map(|d| Choice::new(d.clone(), d))
        .collect();
    let description = prompt::search(SearchConfig::new(message, choices).create(
        CreatePolicy::WhenTyped,
        |term| Choice::new(format!("Create \"{term}\""), term.to_string()),
    ))?;

    if description.trim().is_empty() {
        Ok(default_description(selected_client, project))
    } else {
        Ok(description)
    }
}

async fn start_entry(
    client: &TogglClient,
    workspace: &Workspace,
    selected_client: &Client,
    project: &Project,
) -> Result<()> {
    let description = task_description(client, selected_client, project).await?;
    let entry = client
        .start_time_entry(workspace.id, Some(project.id), &description)
        .await?;
    println!("Started time entry for {}", entry.description);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn client(id: i64, name: &str) -> Client {
        Client {
            id,
            wid: 1,
            name: name.to_string(),
            archived: false,
        }
    }

    fn entry(description: &str) -> TimeEntry {
        TimeEntry {
            id: 1,
            description: description.to_string(),
            workspace_id: 1,
            project_id: Some(5),
            start: datetime!(2024-03-01 09:00 UTC),
            stop: None,
            duration: -1,
        }
    }

    fn names<T>(choices: &[Choice<T>]) -> Vec<&str> {
        choices.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn client_choices_put_last_used_before_no_client() {
        let choices = client_choices(vec![client(1, "Acme"), client(2, "Globex")], Some(2));
        assert_eq!(
            names(&choices),
            vec!["Globex (2) (last used)", "No client", "Acme (1)"]
        );
    }

    #[test]
    fn project_choices_without_history_keep_order() {
        let projects = vec![
            Project {
                id: 10,
                name: "Website".to_string(),
                client_id: None,
                active: true,
            },
            Project {
                id: 11,
                name: "Backend".to_string(),
                client_id: None,
                active: true,
            },
        ];
        let choices = project_choices(projects, None);
        assert_eq!(names(&choices), vec!["Website (10)", "Backend (11)"]);
    }

    #[test]
    fn descriptions_are_unique_and_non_empty() {
        let entries = vec![entry("Review"), entry(""), entry("Standup"), entry("Review")];
        assert_eq!(unique_descriptions(&entries), vec!["Review", "Standup"]);
    }

    #[test]
    fn default_description_names_client_and_project() {
        let project = Project {
            id: 10,
            name: "Website".to_string(),
            client_id: None,
            active: true,
        };
        assert_eq!(
            default_description(&Client::none(), &project),
            "No client - Website"
        );
    }
}
