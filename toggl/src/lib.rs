mod client;
pub mod domain;

pub use client::*;
pub use domain::*;

/// Base URL of the Toggl Track v9 REST API.
pub const DEFAULT_API_URL: &str = "https://api.track.toggl.com/api/v9";
