//! Interactive prompts driven by a keystroke stream.
//!
//! Every prompt is a state record with three phases: `Idle` (awaiting
//! input), `Loading` (validating a submission) and `Done` (resolved). The
//! runner owns the loop: draw, await one keystroke, apply it, draw again.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use thiserror::Error;

mod input;
mod key;
mod search;
mod terminal;
pub mod time_entry;

#[cfg(test)]
pub(crate) mod scripted;

pub use input::{InputConfig, InputPrompt, LineState, ValidationFailureMode};
pub use key::{Key, Keystroke};
pub use search::{Choice, CreateChoice, CreatePolicy, SearchConfig, SearchPrompt};
pub use terminal::TerminalHost;
pub use time_entry::{TimeRangeConfig, TimeRangeEdit, TimeRangeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Done,
}

#[derive(Error, Debug)]
pub enum PromptError {
    /// The user pressed Ctrl+C; no partial result exists.
    #[error("User force closed the prompt")]
    Interrupted,
    #[error("Invalid timestamp '{0}', expected HH:mm YYYY-MM-DD")]
    InvalidTimestamp(String),
    #[error("Prompt finished without a result")]
    Unresolved,
    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a prompt needs from the terminal it runs in.
pub trait PromptHost {
    /// Block until the next keystroke arrives.
    fn next_key(&mut self) -> Result<Keystroke, PromptError>;
    fn draw(&mut self, lines: &[Line<'static>]) -> Result<(), PromptError>;
    /// Drop any keystrokes that queued up while a submission was validated.
    fn discard_pending(&mut self) -> Result<(), PromptError>;
    /// Leave the final frame on screen and hand the terminal back.
    fn finish(&mut self, lines: &[Line<'static>]) -> Result<(), PromptError>;
}

pub trait Prompt: Sized {
    type Output;

    fn status(&self) -> Status;
    /// Apply one keystroke. Keystrokes outside `Idle` are ignored.
    fn on_key(self, key: Keystroke) -> Self;
    /// Validate a pending submission: `Loading` becomes `Done` or `Idle`.
    fn resolve(self) -> Self;
    fn render(&self) -> Vec<Line<'static>>;
    /// Rows the prompt occupies while it is being edited.
    fn height(&self) -> u16;
    fn into_output(self) -> Option<Self::Output>;
}

/// Drive `prompt` with keystrokes from `host` until it resolves.
pub fn run<P: Prompt, H: PromptHost>(mut prompt: P, host: &mut H) -> Result<P::Output, PromptError> {
    loop {
        match prompt.status() {
            Status::Done => {
                host.finish(&prompt.render())?;
                return prompt.into_output().ok_or(PromptError::Unresolved);
            }
            Status::Loading => {
                host.draw(&prompt.render())?;
                prompt = prompt.resolve();
                host.discard_pending()?;
                if prompt.status() == Status::Idle {
                    tracing::debug!("prompt submission rejected");
                }
            }
            Status::Idle => {
                host.draw(&prompt.render())?;
                let key = host.next_key()?;
                prompt = prompt.on_key(key);
            }
        }
    }
}

/// Run `prompt` on the real terminal.
pub fn run_in_terminal<P: Prompt>(prompt: P) -> Result<P::Output, PromptError> {
    let mut host = TerminalHost::new(prompt.height())?;
    let output = run(prompt, &mut host);
    tracing::debug!(resolved = output.is_ok(), "prompt finished");
    output
}

pub fn input(config: InputConfig) -> Result<String, PromptError> {
    run_in_terminal(InputPrompt::new(config))
}

pub fn search<T>(config: SearchConfig<T>) -> Result<T, PromptError> {
    run_in_terminal(SearchPrompt::new(config))
}

pub fn edit_time_range(config: TimeRangeConfig) -> Result<TimeRangeResult, PromptError> {
    run_in_terminal(TimeRangeEdit::new(config)?)
}

pub(crate) fn prefix(status: Status) -> Span<'static> {
    match status {
        Status::Idle => Span::styled("?", Style::default().fg(Color::Cyan)),
        Status::Loading => Span::styled("…", Style::default().fg(Color::Yellow)),
        Status::Done => Span::styled("✔", Style::default().fg(Color::Green)),
    }
}

pub(crate) fn message_line(status: Status, message: &str) -> Vec<Span<'static>> {
    vec![
        prefix(status),
        Span::raw(" "),
        Span::styled(
            message.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]
}

pub(crate) fn answer_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub(crate) fn active_style() -> Style {
    Style::default().fg(Color::Green)
}

pub(crate) fn error_line(error: &Option<String>) -> Option<Line<'static>> {
    error.as_ref().map(|e| {
        Line::from(Span::styled(
            format!("> {e}"),
            Style::default().fg(Color::Red),
        ))
    })
}

/// Plain text of a rendered frame, as the user would read it.
#[cfg(test)]
pub(crate) fn plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
