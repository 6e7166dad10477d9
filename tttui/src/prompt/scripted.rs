//! A host that replays keystrokes instead of reading a terminal.

use ratatui::text::Line;
use std::collections::VecDeque;

use super::{plain_text, Keystroke, PromptError, PromptHost};

/// Replays a fixed list of keystrokes and records every frame.
///
/// Running out of keystrokes behaves like the user pressing Ctrl+C.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    keys: VecDeque<Keystroke>,
    pub frames: Vec<String>,
    pub finished: Option<String>,
    pub discarded: usize,
}

impl ScriptedHost {
    pub fn new(keys: impl IntoIterator<Item = Keystroke>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Keys made of the characters of `text`.
    pub fn typing(text: &str) -> Vec<Keystroke> {
        text.chars().map(Keystroke::char).collect()
    }

    pub fn last_frame(&self) -> &str {
        self.frames.last().map(String::as_str).unwrap_or("")
    }
}

impl PromptHost for ScriptedHost {
    fn next_key(&mut self) -> Result<Keystroke, PromptError> {
        self.keys.pop_front().ok_or(PromptError::Interrupted)
    }

    fn draw(&mut self, lines: &[Line<'static>]) -> Result<(), PromptError> {
        self.frames.push(plain_text(lines));
        Ok(())
    }

    fn discard_pending(&mut self) -> Result<(), PromptError> {
        self.discarded += 1;
        Ok(())
    }

    fn finish(&mut self, lines: &[Line<'static>]) -> Result<(), PromptError> {
        self.finished = Some(plain_text(lines));
        Ok(())
    }
}
