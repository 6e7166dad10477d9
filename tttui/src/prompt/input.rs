use ratatui::text::{Line, Span};

use super::{answer_style, error_line, message_line, Key, Keystroke, Prompt, Status};

pub type Validator = Box<dyn Fn(&str) -> Result<(), String>>;
pub type Transformer = Box<dyn Fn(&str, bool) -> String>;

/// What happens to the typed value when validation rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationFailureMode {
    #[default]
    Keep,
    Clear,
}

pub struct InputConfig {
    pub message: String,
    pub initial_value: Option<String>,
    pub required: bool,
    pub validate: Option<Validator>,
    /// Display override, called with `(value, is_final)`.
    pub transformer: Option<Transformer>,
    pub failure_mode: ValidationFailureMode,
}

impl InputConfig {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            initial_value: None,
            required: false,
            validate: None,
            transformer: None,
            failure_mode: ValidationFailureMode::default(),
        }
    }

    pub fn initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn validate(mut self, validate: impl Fn(&str) -> Result<(), String> + 'static) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    pub fn transformer(mut self, transformer: impl Fn(&str, bool) -> String + 'static) -> Self {
        self.transformer = Some(Box::new(transformer));
        self
    }

    pub fn failure_mode(mut self, mode: ValidationFailureMode) -> Self {
        self.failure_mode = mode;
        self
    }
}

/// A single line of text with mid-string cursor support.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineState {
    pub value: String,
    pub cursor: usize,
}

impl LineState {
    pub fn from_str(s: &str) -> Self {
        Self {
            value: s.to_string(),
            cursor: s.len(),
        }
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let new_cursor = self.prev_boundary(self.cursor);
        self.value.drain(new_cursor..self.cursor);
        self.cursor = new_cursor;
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            let end = self.next_boundary(self.cursor);
            self.value.drain(self.cursor..end);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.prev_boundary(self.cursor);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.next_boundary(self.cursor);
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Returns the string split at the cursor: (before, after).
    pub fn split_at_cursor(&self) -> (&str, &str) {
        (&self.value[..self.cursor], &self.value[self.cursor..])
    }

    fn prev_boundary(&self, pos: usize) -> usize {
        let mut p = pos - 1;
        while !self.value.is_char_boundary(p) {
            p -= 1;
        }
        p
    }

    fn next_boundary(&self, pos: usize) -> usize {
        let mut p = pos + 1;
        while p < self.value.len() && !self.value.is_char_boundary(p) {
            p += 1;
        }
        p
    }
}

/// Free-text prompt, optionally pre-seeded with a value.
pub struct InputPrompt {
    config: InputConfig,
    line: LineState,
    status: Status,
    error: Option<String>,
}

impl InputPrompt {
    pub fn new(config: InputConfig) -> Self {
        let line = LineState::from_str(config.initial_value.as_deref().unwrap_or_default());
        Self {
            config,
            line,
            status: Status::Idle,
            error: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.line.value
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn check(&self, answer: &str) -> Result<(), String> {
        if self.config.required && answer.is_empty() {
            return Err("You must provide a value".to_string());
        }
        match &self.config.validate {
            Some(validate) => validate(answer).map_err(|e| {
                if e.is_empty() {
                    "You must provide a valid value".to_string()
                } else {
                    e
                }
            }),
            None => Ok(()),
        }
    }

    fn display_value(&self) -> String {
        let is_final = self.status == Status::Done;
        match &self.config.transformer {
            Some(transform) => transform(&self.line.value, is_final),
            None => self.line.value.clone(),
        }
    }
}

impl Prompt for InputPrompt {
    type Output = String;

    fn status(&self) -> Status {
        self.status
    }

    fn on_key(mut self, key: Keystroke) -> Self {
        if self.status != Status::Idle {
            return self;
        }

        match key.key {
            Key::Enter => self.status = Status::Loading,
            Key::Backspace => self.line.backspace(),
            Key::Delete => self.line.delete(),
            Key::Left => self.line.move_left(),
            Key::Right => self.line.move_right(),
            Key::Home => self.line.home(),
            Key::End => self.line.end(),
            Key::Char(c) => {
                self.line.insert(c);
                self.error = None;
            }
            _ => {}
        }
        self
    }

    fn resolve(mut self) -> Self {
        if self.status != Status::Loading {
            return self;
        }

        match self.check(&self.line.value) {
            Ok(()) => {
                self.error = None;
                self.status = Status::Done;
            }
            Err(e) => {
                if self.config.failure_mode == ValidationFailureMode::Clear {
                    self.line.clear();
                }
                tracing::debug!(error = %e, "input rejected");
                self.error = Some(e);
                self.status = Status::Idle;
            }
        }
        self
    }

    fn render(&self) -> Vec<Line<'static>> {
        let mut spans = message_line(self.status, &self.config.message);
        spans.push(Span::raw(" "));

        if self.status == Status::Done {
            spans.push(Span::styled(self.display_value(), answer_style()));
        } else if self.config.transformer.is_some() {
            spans.push(Span::raw(format!("{}█", self.display_value())));
        } else {
            let (before, after) = self.line.split_at_cursor();
            spans.push(Span::raw(format!("{before}█{after}")));
        }

        let mut lines = vec![Line::from(spans)];
        lines.extend(error_line(&self.error));
        lines
    }

    fn height(&self) -> u16 {
        2
    }

    fn into_output(self) -> Option<String> {
        (self.status == Status::Done).then_some(self.line.value)
    }
}
