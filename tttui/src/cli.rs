use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tttui")]
#[command(about = "Terminal UI for Toggl Track", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Start a new time entry (the default)
    Start,
    /// Stop the running time entry
    Stop,
    /// List recent time entries grouped by day
    List,
    /// Edit the times and description of a recent entry
    Edit,
    /// Print config path and create default file if missing
    ConfigPath,
    /// Remove the stored API token
    Logout,
}

impl Cli {
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_starts_an_entry() {
        let cli = Cli::parse_from(["tttui"]);
        assert_eq!(cli.command(), &Commands::Start);
    }

    #[test]
    fn parses_kebab_case_subcommands() {
        let cli = Cli::parse_from(["tttui", "config-path"]);
        assert_eq!(cli.command(), &Commands::ConfigPath);
        let cli = Cli::parse_from(["tttui", "edit"]);
        assert_eq!(cli.command(), &Commands::Edit);
    }
}
