use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::domain::{enrich_entries, Client, DetailedTimeEntry, Project, TimeEntry, Workspace};

const CREATED_WITH: &str = "tttui";

#[derive(Error, Debug)]
pub enum TogglError {
    #[error("Unauthorized, check your API token")]
    Unauthorized,
    #[error("HTTP error! status: {status}, body: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Fields of a time entry that `update_time_entry` may change.
#[derive(Debug, Default, Serialize)]
pub struct TimeEntryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub start: Option<OffsetDateTime>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub stop: Option<OffsetDateTime>,
    /// `-1` turns a stopped entry back into a running one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct TogglClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TogglClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(&self.token, Some("api_token"))
    }

    async fn send(&self, req: RequestBuilder, call_name: &str) -> Result<reqwest::Response, TogglError> {
        tracing::debug!("calling {}", call_name);
        let resp = self.authorized(req).send().await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!("{} rejected the API token", call_name);
            return Err(TogglError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, "{} failed", call_name);
            return Err(TogglError::Status { status, body });
        }

        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TogglError> {
        let resp = self
            .send(self.client.get(self.url(path)), &format!("GET {path}"))
            .await?;
        Ok(resp.json::<T>().await?)
    }

    pub async fn workspaces(&self) -> Result<Vec<Workspace>, TogglError> {
        self.get_json("/workspaces").await
    }

    pub async fn clients(&self, workspace_id: i64) -> Result<Vec<Client>, TogglError> {
        // Toggl answers `null` instead of `[]` for workspaces without clients.
        let clients: Option<Vec<Client>> = self
            .get_json(&format!("/workspaces/{workspace_id}/clients"))
            .await?;
        Ok(clients.unwrap_or_default())
    }

    pub async fn create_client(&self, workspace_id: i64, name: &str) -> Result<Client, TogglError> {
        let path = format!("/workspaces/{workspace_id}/clients");
        let resp = self
            .send(
                self.client.post(self.url(&path)).json(&json!({ "name": name })),
                &format!("POST {path}"),
            )
            .await?;
        let client: Client = resp.json().await?;
        tracing::info!(client_id = client.id, "created client");
        Ok(client)
    }

    pub async fn projects(&self, workspace_id: i64) -> Result<Vec<Project>, TogglError> {
        let projects: Option<Vec<Project>> = self
            .get_json(&format!("/workspaces/{workspace_id}/projects"))
            .await?;
        Ok(projects.unwrap_or_default())
    }

    pub async fn projects_by_client(
        &self,
        workspace_id: i64,
        client_id: i64,
    ) -> Result<Vec<Project>, TogglError> {
        let projects = self.projects(workspace_id).await?;
        Ok(projects
            .into_iter()
            .filter(|p| p.client_id == Some(client_id))
            .collect())
    }

    pub async fn create_project(
        &self,
        workspace_id: i64,
        name: &str,
        client_id: i64,
    ) -> Result<Project, TogglError> {
        let path = format!("/workspaces/{workspace_id}/projects");
        let client_id = (client_id != 0).then_some(client_id);
        let resp = self
            .send(
                self.client.post(self.url(&path)).json(&json!({
                    "name": name,
                    "client_id": client_id,
                    "active": true,
                    "is_private": false,
                })),
                &format!("POST {path}"),
            )
            .await?;
        let project: Project = resp.json().await?;
        tracing::info!(project_id = project.id, "created project");
        Ok(project)
    }

    /// Look up a project and, when it has one, its client.
    pub async fn project_details(
        &self,
        workspace_id: i64,
        project_id: i64,
    ) -> Result<(Project, Option<Client>), TogglError> {
        let project = self
            .projects(workspace_id)
            .await?
            .into_iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| TogglError::NotFound(format!("Project with ID {project_id} not found")))?;

        let client = match project.client_id {
            Some(client_id) => self
                .clients(workspace_id)
                .await?
                .into_iter()
                .find(|c| c.id == client_id),
            None => None,
        };

        Ok((project, client))
    }

    pub async fn client_details(&self, workspace_id: i64, client_id: i64) -> Result<Client, TogglError> {
        self.clients(workspace_id)
            .await?
            .into_iter()
            .find(|c| c.id == client_id)
            .ok_or_else(|| TogglError::NotFound(format!("Client with ID {client_id} not found")))
    }

    /// The running time entry, if any.
    pub async fn current_time_entry(&self) -> Result<Option<TimeEntry>, TogglError> {
        match self.get_json::<Option<TimeEntry>>("/me/time_entries/current").await {
            Ok(entry) => Ok(entry),
            Err(TogglError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn start_time_entry(
        &self,
        workspace_id: i64,
        project_id: Option<i64>,
        description: &str,
    ) -> Result<TimeEntry, TogglError> {
        let path = format!("/workspaces/{workspace_id}/time_entries");
        let start = OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339)?;
        let resp = self
            .send(
                self.client.post(self.url(&path)).json(&json!({
                    "created_with": CREATED_WITH,
                    "description": description,
                    "project_id": project_id,
                    "start": start,
                    "duration": -1,
                    "wid": workspace_id,
                })),
                &format!("POST {path}"),
            )
            .await?;
        let entry: TimeEntry = resp.json().await?;
        tracing::info!(entry_id = entry.id, "started time entry");
        Ok(entry)
    }

    pub async fn stop_time_entry(&self, workspace_id: i64, entry_id: i64) -> Result<TimeEntry, TogglError> {
        let path = format!("/workspaces/{workspace_id}/time_entries/{entry_id}/stop");
        let resp = self
            .send(self.client.patch(self.url(&path)), &format!("PATCH {path}"))
            .await?;
        let entry: TimeEntry = resp.json().await?;
        tracing::info!(entry_id = entry.id, "stopped time entry");
        Ok(entry)
    }

    pub async fn update_time_entry(
        &self,
        workspace_id: i64,
        entry_id: i64,
        update: &TimeEntryUpdate,
    ) -> Result<TimeEntry, TogglError> {
        let path = format!("/workspaces/{workspace_id}/time_entries/{entry_id}");
        let resp = self
            .send(
                self.client.put(self.url(&path)).json(update),
                &format!("PUT {path}"),
            )
            .await?;
        let entry: TimeEntry = resp.json().await?;
        tracing::info!(entry_id = entry.id, "updated time entry");
        Ok(entry)
    }

    /// Recent entries of the current user, optionally only those on `project_id`.
    pub async fn recent_time_entries(&self, project_id: Option<i64>) -> Result<Vec<TimeEntry>, TogglError> {
        let entries: Vec<TimeEntry> = self.get_json("/me/time_entries").await?;
        Ok(match project_id {
            Some(project_id) => entries
                .into_iter()
                .filter(|e| e.project_id == Some(project_id))
                .collect(),
            None => entries,
        })
    }

    /// The newest `limit` entries of the last month in `workspace_id`, with
    /// their project and client attached.
    pub async fn recent_entries_with_details(
        &self,
        workspace_id: i64,
        limit: usize,
        now: OffsetDateTime,
    ) -> Result<Vec<DetailedTimeEntry>, TogglError> {
        let entries = self.recent_time_entries(None).await?;
        let projects = self.projects(workspace_id).await?;
        let clients = self.clients(workspace_id).await?;

        Ok(enrich_entries(
            entries,
            workspace_id,
            now - Duration::days(31),
            now,
            limit,
            &projects,
            &clients,
        ))
    }
}
