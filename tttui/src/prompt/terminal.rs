use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEventKind},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    text::Line,
    widgets::{Paragraph, Wrap},
    Terminal, TerminalOptions, Viewport,
};
use std::io::{self, Stdout};
use std::time::Duration;

use super::{Keystroke, PromptError, PromptHost};

/// Runs a prompt inline below the shell cursor, in raw mode.
///
/// Raw mode and cursor visibility are restored on drop, so an interrupt that
/// unwinds through the caller leaves the terminal usable.
pub struct TerminalHost {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    finished: bool,
}

/// Row the shell resumes on: below the `used` rows of the viewport, or below
/// the whole viewport when the prompt never finished.
fn resume_row(area: Rect, used: Option<u16>) -> u16 {
    let used = used.map_or(area.height, |used| used.min(area.height));
    area.y.saturating_add(used)
}

impl TerminalHost {
    pub fn new(height: u16) -> Result<Self, PromptError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, Hide)?;
        let terminal = Terminal::with_options(
            CrosstermBackend::new(stdout),
            TerminalOptions {
                viewport: Viewport::Inline(height),
            },
        )?;
        Ok(Self {
            terminal,
            finished: false,
        })
    }
}

impl PromptHost for TerminalHost {
    fn next_key(&mut self) -> Result<Keystroke, PromptError> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if Keystroke::is_interrupt(&key) {
                    return Err(PromptError::Interrupted);
                }
                return Ok(Keystroke::from(key));
            }
        }
    }

    fn draw(&mut self, lines: &[Line<'static>]) -> Result<(), PromptError> {
        let paragraph = Paragraph::new(lines.to_vec()).wrap(Wrap { trim: false });
        self.terminal
            .draw(|frame| frame.render_widget(paragraph, frame.area()))?;
        Ok(())
    }

    fn discard_pending(&mut self) -> Result<(), PromptError> {
        while event::poll(Duration::ZERO)? {
            let _ = event::read()?;
        }
        Ok(())
    }

    fn finish(&mut self, lines: &[Line<'static>]) -> Result<(), PromptError> {
        self.draw(lines)?;
        let area = self.terminal.get_frame().area();
        let used = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        execute!(
            self.terminal.backend_mut(),
            MoveTo(0, resume_row(area, Some(used))),
            Clear(ClearType::FromCursorDown)
        )?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for TerminalHost {
    fn drop(&mut self) {
        if !self.finished {
            // Cursor ends on a fresh line below the last frame.
            let row = resume_row(self.terminal.get_frame().area(), None);
            let _ = execute!(
                self.terminal.backend_mut(),
                MoveTo(0, row.saturating_sub(1)),
                Print("\r\n")
            );
        }
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), Show);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_prompt_resumes_below_its_summary() {
        let area = Rect::new(0, 10, 80, 8);
        assert_eq!(resume_row(area, Some(1)), 11);
        assert_eq!(resume_row(area, Some(20)), 18);
    }

    #[test]
    fn interrupted_prompt_resumes_below_the_viewport() {
        assert_eq!(resume_row(Rect::new(0, 10, 80, 8), None), 18);
        assert_eq!(resume_row(Rect::new(0, 0, 80, 0), None), 0);
    }
}
