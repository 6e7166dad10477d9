use anyhow::{bail, Context, Result};
use toggl::{TogglClient, Workspace};

use crate::config::TttuiConfig;
use crate::prompt::{self, Choice, InputConfig, SearchConfig};

const TOKEN_ENV: &str = "TOGGL_API_TOKEN";

fn mask(value: &str, _is_final: bool) -> String {
    "*".repeat(value.chars().count())
}

/// The API token from the environment or the config file, asking for one
/// (and storing it) when neither has it.
fn ensure_api_token(config: &TttuiConfig) -> Result<String> {
    if let Some(token) = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
        return Ok(token);
    }
    if let Some(token) = config.api_token.clone().filter(|t| !t.is_empty()) {
        return Ok(token);
    }

    println!("Welcome to tttui!");
    println!("Please enter your Toggl API token to get started.");
    println!("You can find your API token at: https://track.toggl.com/profile");

    let token = prompt::input(
        InputConfig::new("Enter your Toggl API token:")
            .validate(|value| {
                if value.trim().is_empty() {
                    Err("API token is required".to_string())
                } else {
                    Ok(())
                }
            })
            .transformer(mask),
    )?;
    let token = token.trim().to_string();

    TttuiConfig::update(|config| config.api_token = Some(token.clone()))
        .context("Failed to store API token")?;
    tracing::info!("stored new API token");
    Ok(token)
}

pub(crate) fn connect() -> Result<TogglClient> {
    let config = TttuiConfig::load()?;
    let token = ensure_api_token(&config)?;
    Ok(TogglClient::new(&config.api_url, &token))
}

/// The only workspace, or the one the user picks (last used listed first).
pub(crate) async fn select_workspace(client: &TogglClient) -> Result<Workspace> {
    let workspaces = client
        .workspaces()
        .await
        .context("Failed to fetch workspaces")?;
    if workspaces.is_empty() {
        bail!("No workspaces found");
    }

    let workspace = if workspaces.len() == 1 {
        workspaces.into_iter().next().context("No workspaces found")?
    } else {
        let last = TttuiConfig::load()?.last_workspace_id;
        let (last, rest) = super::last_used_first(workspaces, last, |w| w.id);
        let choices = last
            .into_iter()
            .chain(rest)
            .map(|w| Choice::new(w.display_name().to_string(), w))
            .collect();
        prompt::search(SearchConfig::new("Select workspace:", choices))?
    };

    TttuiConfig::update(|config| config.last_workspace_id = Some(workspace.id))?;
    Ok(workspace)
}

pub fn logout() -> Result<()> {
    let path = TttuiConfig::config_path()?;
    if !path.exists() {
        println!("No stored API token.");
        return Ok(());
    }
    TttuiConfig::update(|config| config.api_token = None)?;
    println!("Removed stored API token from {}", path.display());
    Ok(())
}

pub fn config_path() -> Result<()> {
    let path = TttuiConfig::ensure_exists()?;
    println!("{}", path.display());
    Ok(())
}
