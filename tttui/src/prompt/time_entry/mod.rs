//! Structured editor for a time range plus description.
//!
//! The start time, the optional end time and the description are edited in
//! place. Time fields are split into hour, minute, year, month and day, each
//! of which takes typed digits or relative ↑/↓ adjustments. A missing end
//! time means the entry is still running.

use ratatui::text::Line;
use time::PrimitiveDateTime;

use super::{Key, Keystroke, Prompt, PromptError, Status};
use crate::time_utils::now_local;

mod date;
mod digits;
mod navigation;
mod render;

pub use date::{format_timestamp, parse_timestamp, DateComponent, TIME_FORMAT};
pub use digits::{DigitBuffer, DigitOutcome};
pub use navigation::{EditField, Focus};

const END_BEFORE_START: &str = "End time must be after start time";
const DESCRIPTION_REQUIRED: &str = "Description is required";

/// Caller-supplied starting point; timestamps use `HH:mm YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeConfig {
    pub message: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub description: String,
    pub required: bool,
}

impl TimeRangeConfig {
    pub fn new(message: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start_time: start_time.into(),
            end_time: None,
            description: String::new(),
            required: true,
        }
    }

    pub fn end_time(mut self, end_time: Option<String>) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeResult {
    pub start_time: String,
    pub end_time: Option<String>,
    pub description: String,
}

/// Live state of one editing session. Every keystroke consumes the record
/// and yields the next one.
#[derive(Debug, Clone)]
pub struct TimeRangeEdit {
    message: String,
    required: bool,
    start_time: PrimitiveDateTime,
    end_time: Option<PrimitiveDateTime>,
    description: String,
    focus: Focus,
    digits: DigitBuffer,
    status: Status,
    error: Option<String>,
    clock: fn() -> PrimitiveDateTime,
}

impl TimeRangeEdit {
    pub fn new(config: TimeRangeConfig) -> Result<Self, PromptError> {
        let parse = |s: &str| parse_timestamp(s).ok_or_else(|| PromptError::InvalidTimestamp(s.to_string()));
        let start_time = parse(&config.start_time)?;
        let end_time = config.end_time.as_deref().map(parse).transpose()?;

        let mut edit = Self {
            message: config.message,
            required: config.required,
            start_time,
            end_time,
            description: config.description,
            focus: Focus::initial(),
            digits: DigitBuffer::default(),
            status: Status::Idle,
            error: None,
            clock: now_local,
        };
        edit.refresh_error();
        Ok(edit)
    }

    /// Replace the source of "now", used for running entries.
    pub fn with_clock(mut self, clock: fn() -> PrimitiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn start_time(&self) -> PrimitiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> Option<PrimitiveDateTime> {
        self.end_time
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn active_field(&self) -> EditField {
        self.focus.field
    }

    pub fn active_component(&self) -> Option<DateComponent> {
        self.focus.component
    }

    pub fn digit_buffer(&self) -> &str {
        self.digits.as_str()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn ordering_error(&self) -> Option<String> {
        match self.end_time {
            Some(end) if end < self.start_time => Some(END_BEFORE_START.to_string()),
            _ => None,
        }
    }

    fn refresh_error(&mut self) {
        self.error = self.ordering_error();
    }

    fn on_description_key(mut self, key: Keystroke) -> Self {
        let has_end = self.end_time.is_some();
        match key.key {
            Key::Enter => self.status = Status::Loading,
            Key::Tab | Key::Right => self.focus = self.focus.forward(has_end),
            Key::BackTab | Key::Left => self.focus = self.focus.backward(has_end),
            Key::Backspace => {
                self.description.pop();
                self.refresh_error();
            }
            Key::Char(c) => {
                self.description.push(c);
                self.refresh_error();
            }
            _ => {}
        }
        self
    }

    fn on_time_key(mut self, key: Keystroke) -> Self {
        let has_end = self.end_time.is_some();
        match key.key {
            Key::Enter | Key::Tab => {
                self.digits.clear();
                self.focus = self.focus.forward(has_end);
            }
            Key::BackTab => {
                self.digits.clear();
                self.focus = self.focus.backward(has_end);
            }
            Key::Left => {
                self.digits.clear();
                self.focus = self.focus.left(has_end);
            }
            Key::Right => {
                self.digits.clear();
                self.focus = self.focus.right(has_end);
            }
            Key::Up | Key::Down => {
                self.digits.clear();
                let direction = if key.key == Key::Up { 1 } else { -1 };
                let step = if key.shift { 10 } else { 1 };
                self.update_active(|dt, component| Some(date::adjust(dt, component, direction * step)));
            }
            Key::Backspace => {
                let removed = self.digits.pop();
                if !removed && self.focus.field == EditField::EndTime && self.end_time.is_none() {
                    self.focus = Focus::new(EditField::StartTime, DateComponent::LAST);
                }
            }
            Key::Delete => {
                if self.focus.field == EditField::EndTime && self.end_time.is_some() {
                    self.digits.clear();
                    self.end_time = None;
                    self.refresh_error();
                }
            }
            Key::Char(c) if c.is_ascii_digit() => {
                let Some(component) = self.focus.component else {
                    return self;
                };
                if let DigitOutcome::Complete(value) = self.digits.push(c, component) {
                    self.update_active(|dt, component| date::set_component(dt, component, value));
                }
            }
            _ => {}
        }
        self
    }

    /// Apply `change` to the focused component of the focused timestamp.
    ///
    /// A running entry's end time starts out from the current clock. A change
    /// returning `None` is dropped without touching the state.
    fn update_active(
        &mut self,
        change: impl FnOnce(PrimitiveDateTime, DateComponent) -> Option<PrimitiveDateTime>,
    ) {
        let Some(component) = self.focus.component else {
            return;
        };
        let current = match self.focus.field {
            EditField::StartTime => self.start_time,
            EditField::EndTime => self.end_time.unwrap_or_else(self.clock),
            EditField::Description => return,
        };
        let Some(updated) = change(current, component) else {
            tracing::debug!(?component, "discarding out-of-range value");
            return;
        };

        match self.focus.field {
            EditField::StartTime => self.start_time = updated,
            EditField::EndTime => self.end_time = Some(updated),
            EditField::Description => {}
        }
        self.refresh_error();
    }
}

impl Prompt for TimeRangeEdit {
    type Output = TimeRangeResult;

    fn status(&self) -> Status {
        self.status
    }

    fn on_key(self, key: Keystroke) -> Self {
        if self.status != Status::Idle {
            return self;
        }
        if self.focus.field.is_time() {
            self.on_time_key(key)
        } else {
            self.on_description_key(key)
        }
    }

    fn resolve(mut self) -> Self {
        if self.status != Status::Loading {
            return self;
        }

        let rejection = if self.required && self.description.is_empty() {
            Some(DESCRIPTION_REQUIRED.to_string())
        } else {
            self.ordering_error()
        };
        match rejection {
            Some(error) => {
                tracing::debug!(%error, "time entry rejected");
                self.error = Some(error);
                self.status = Status::Idle;
            }
            None => {
                self.error = None;
                self.status = Status::Done;
            }
        }
        self
    }

    fn render(&self) -> Vec<Line<'static>> {
        render::render(self, (self.clock)())
    }

    fn height(&self) -> u16 {
        8
    }

    fn into_output(self) -> Option<TimeRangeResult> {
        (self.status == Status::Done).then(|| TimeRangeResult {
            start_time: format_timestamp(self.start_time),
            end_time: self.end_time.map(format_timestamp),
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::run;
    use crate::prompt::scripted::ScriptedHost;
    use time::macros::datetime;

    fn fixed_now() -> PrimitiveDateTime {
        datetime!(2024-03-01 16:00)
    }

    fn editor(start: &str, end: Option<&str>, description: &str) -> TimeRangeEdit {
        TimeRangeEdit::new(
            TimeRangeConfig::new("Edit time entry", start)
                .end_time(end.map(str::to_string))
                .description(description),
        )
        .unwrap()
        .with_clock(fixed_now)
    }

    fn press(edit: TimeRangeEdit, keys: &[Keystroke]) -> TimeRangeEdit {
        keys.iter().fold(edit, |edit, key| edit.on_key(*key))
    }

    fn key(k: Key) -> Keystroke {
        Keystroke::new(k)
    }

    #[test]
    fn rejects_malformed_initial_timestamp() {
        let result = TimeRangeEdit::new(TimeRangeConfig::new("Edit", "yesterday"));
        assert!(matches!(result, Err(PromptError::InvalidTimestamp(s)) if s == "yesterday"));
    }

    #[test]
    fn six_tabs_return_to_start_time() {
        let edit = editor("10:00 2024-01-01", Some("11:00 2024-01-01"), "x");
        let edit = press(edit, &[key(Key::Tab); 6]);
        assert_eq!(edit.active_field(), EditField::StartTime);
        assert_eq!(edit.active_component(), Some(DateComponent::Hour));
    }

    #[test]
    fn running_entry_never_focuses_end_time() {
        let mut edit = editor("10:00 2024-01-01", None, "x");
        for _ in 0..5 {
            edit = edit.on_key(key(Key::Tab));
            assert_ne!(edit.active_field(), EditField::EndTime);
        }
        let edit = press(edit, &[key(Key::Right); 12]);
        assert_ne!(edit.active_field(), EditField::EndTime);
    }

    #[test]
    fn two_digits_set_minute_and_clear_buffer() {
        let edit = editor("10:00 2024-01-01", None, "x");
        let edit = press(edit, &[key(Key::Right), Keystroke::char('1')]);
        assert_eq!(edit.digit_buffer(), "1");
        assert_eq!(edit.start_time(), datetime!(2024-01-01 10:00));

        let edit = edit.on_key(Keystroke::char('4'));
        assert_eq!(edit.digit_buffer(), "");
        assert_eq!(edit.start_time(), datetime!(2024-01-01 10:14));
    }

    #[test]
    fn month_digits_are_one_based() {
        let edit = editor("10:00 2024-01-31", None, "x");
        let edit = press(edit, &[key(Key::Right); 3]);
        assert_eq!(edit.active_component(), Some(DateComponent::Month));
        let edit = press(edit, &ScriptedHost::typing("02"));
        assert_eq!(edit.start_time(), datetime!(2024-02-29 10:00));
    }

    #[test]
    fn out_of_range_digits_are_discarded_silently() {
        let edit = editor("10:00 2024-01-15", None, "x");
        let edit = press(edit, &[key(Key::Right); 3]);
        assert_eq!(edit.active_component(), Some(DateComponent::Month));

        let edit = press(edit, &ScriptedHost::typing("13"));
        assert_eq!(edit.start_time(), datetime!(2024-01-15 10:00));
        assert_eq!(edit.digit_buffer(), "");
        assert_eq!(edit.error(), None);
    }

    #[test]
    fn non_digit_keys_keep_pending_digits() {
        let edit = editor("10:00 2024-01-01", None, "x");
        let edit = press(edit, &[Keystroke::char('2'), Keystroke::char('a')]);
        assert_eq!(edit.digit_buffer(), "2");
        let edit = edit.on_key(key(Key::Right));
        assert_eq!(edit.digit_buffer(), "");
    }

    #[test]
    fn shift_multiplies_adjustment_by_ten() {
        let edit = editor("10:00 2024-01-01", None, "x");
        let shifted = edit.clone().on_key(Keystroke::shifted(Key::Up));
        assert_eq!(shifted.start_time(), datetime!(2024-01-01 20:00));

        let plain = edit.on_key(key(Key::Up));
        assert_eq!(plain.start_time(), datetime!(2024-01-01 11:00));
    }

    #[test]
    fn end_before_start_is_advisory_until_fixed() {
        let edit = editor("10:00 2024-01-01", Some("11:00 2024-01-01"), "x");
        let edit = press(edit, &[key(Key::Tab), key(Key::Down), key(Key::Down)]);
        assert_eq!(edit.end_time(), Some(datetime!(2024-01-01 09:00)));
        assert_eq!(edit.error(), Some(END_BEFORE_START));

        let edit = edit.on_key(key(Key::Up));
        assert_eq!(edit.error(), None);
    }

    #[test]
    fn year_adjustment_keeps_a_readable_timestamp() {
        let edit = editor("10:00 0005-01-01", None, "x");
        let edit = press(edit, &[key(Key::Right); 2]);
        assert_eq!(edit.active_component(), Some(DateComponent::Year));

        let edit = press(edit, &[Keystroke::shifted(Key::Down); 3]);
        assert_eq!(edit.start_time(), datetime!(0005-01-01 10:00));

        let edit = press(edit, &[key(Key::Tab), key(Key::Enter)]).resolve();
        let result = edit.into_output().unwrap();
        assert_eq!(result.start_time, "10:00 0005-01-01");
    }

    #[test]
    fn typed_end_hour_is_checked_against_start() {
        let edit = editor("10:00 2024-01-01", Some("11:00 2024-01-01"), "x");
        let edit = press(edit, &[key(Key::Tab), Keystroke::char('0')]);
        assert_eq!(edit.error(), None);

        let edit = edit.on_key(Keystroke::char('8'));
        assert_eq!(edit.end_time(), Some(datetime!(2024-01-01 08:00)));
        assert_eq!(edit.error(), Some(END_BEFORE_START));

        let edit = press(edit, &ScriptedHost::typing("12"));
        assert_eq!(edit.end_time(), Some(datetime!(2024-01-01 12:00)));
        assert_eq!(edit.error(), None);
    }

    #[test]
    fn submit_with_end_before_start_returns_to_idle() {
        let edit = editor("10:00 2024-01-01", Some("09:00 2024-01-01"), "x");
        let edit = press(edit, &[key(Key::BackTab), key(Key::Enter)]);
        assert_eq!(edit.status(), Status::Loading);

        let edit = edit.resolve();
        assert_eq!(edit.status(), Status::Idle);
        assert_eq!(edit.error(), Some(END_BEFORE_START));
        assert!(edit.into_output().is_none());
    }

    #[test]
    fn enter_outside_description_does_not_submit() {
        let edit = editor("10:00 2024-01-01", Some("11:00 2024-01-01"), "x");
        let edit = edit.on_key(key(Key::Enter));
        assert_eq!(edit.status(), Status::Idle);
        assert_eq!(edit.active_field(), EditField::EndTime);
    }

    #[test]
    fn required_description_blocks_submission() {
        let edit = editor("10:00 2024-01-01", None, "");
        let edit = press(edit, &[key(Key::Tab), key(Key::Enter)]).resolve();
        assert_eq!(edit.status(), Status::Idle);
        assert_eq!(edit.error(), Some(DESCRIPTION_REQUIRED));

        let edit = edit.on_key(Keystroke::char('a'));
        assert_eq!(edit.error(), None);
    }

    #[test]
    fn backspace_on_empty_description_keeps_focus() {
        let edit = editor("10:00 2024-01-01", None, "ab");
        let edit = press(edit, &[key(Key::Tab), key(Key::Backspace), key(Key::Backspace)]);
        assert_eq!(edit.description(), "");
        let edit = edit.on_key(key(Key::Backspace));
        assert_eq!(edit.active_field(), EditField::Description);
    }

    #[test]
    fn backspace_on_removed_end_time_returns_to_start_day() {
        let edit = editor("10:00 2024-01-01", Some("11:00 2024-01-01"), "x");
        let edit = press(edit, &[key(Key::Tab), key(Key::Delete)]);
        assert_eq!(edit.end_time(), None);
        assert_eq!(edit.active_field(), EditField::EndTime);

        let edit = edit.on_key(key(Key::Backspace));
        assert_eq!(edit.active_field(), EditField::StartTime);
        assert_eq!(edit.active_component(), Some(DateComponent::Day));
    }

    #[test]
    fn backspace_removes_pending_digit_before_moving_focus() {
        let edit = editor("10:00 2024-01-01", Some("11:00 2024-01-01"), "x");
        let edit = press(
            edit,
            &[key(Key::Tab), key(Key::Delete), Keystroke::char('1'), key(Key::Backspace)],
        );
        assert_eq!(edit.digit_buffer(), "");
        assert_eq!(edit.active_field(), EditField::EndTime);
    }

    #[test]
    fn adjusting_removed_end_time_starts_from_now() {
        let edit = editor("10:00 2024-03-01", Some("11:00 2024-03-01"), "x");
        let edit = press(edit, &[key(Key::Tab), key(Key::Delete), key(Key::Up)]);
        assert_eq!(edit.end_time(), Some(datetime!(2024-03-01 17:00)));
    }

    #[test]
    fn keystrokes_while_loading_are_dropped() {
        let edit = editor("10:00 2024-01-01", None, "x");
        let edit = press(edit, &[key(Key::Tab), key(Key::Enter), Keystroke::char('y')]);
        assert_eq!(edit.status(), Status::Loading);
        assert_eq!(edit.description(), "x");
    }

    #[test]
    fn round_trip_resolves_with_unchanged_start() {
        let edit = TimeRangeEdit::new(
            TimeRangeConfig::new("Edit time entry", "14:30 2024-03-01").description("x"),
        )
        .unwrap()
        .with_clock(fixed_now);
        let mut host = ScriptedHost::new([key(Key::Tab), Keystroke::char('!'), key(Key::Enter)]);

        let result = run(edit, &mut host).unwrap();
        assert_eq!(
            result,
            TimeRangeResult {
                start_time: "14:30 2024-03-01".to_string(),
                end_time: None,
                description: "x!".to_string(),
            }
        );
        assert_eq!(
            host.finished.as_deref(),
            Some("✔ Edit time entry 14:30 2024-03-01 - Running (01h30m) x!")
        );
    }

    #[test]
    fn invalid_submission_never_resolves() {
        let edit = editor("10:00 2024-01-01", Some("09:00 2024-01-01"), "x");
        let mut host = ScriptedHost::new([key(Key::BackTab), key(Key::Enter)]);

        let result = run(edit, &mut host);
        assert!(matches!(result, Err(PromptError::Interrupted)));
        assert!(host.finished.is_none());
        assert!(host.last_frame().ends_with("> End time must be after start time"));
    }
}
