use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Workspace {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl Workspace {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed workspace"
        } else {
            &self.name
        }
    }
}

/// A Toggl client (the customer a project is billed to, not an API client).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Client {
    pub id: i64,
    #[serde(default)]
    pub wid: i64,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

impl Client {
    /// Sentinel for "no client"; id 0 never exists on the server.
    pub fn none() -> Self {
        Self {
            id: 0,
            wid: 0,
            name: "No client".to_string(),
            archived: false,
        }
    }

    pub fn is_none(&self) -> bool {
        self.id == 0
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub active: bool,
}
