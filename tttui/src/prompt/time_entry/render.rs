use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use time::PrimitiveDateTime;

use super::date::{format_elapsed, format_timestamp, DateComponent};
use super::navigation::EditField;
use super::TimeRangeEdit;
use crate::prompt::{active_style, answer_style, error_line, message_line, Status};

const HINT: &str = "(Tab/←→ to move, ↑↓ to change, ⇧+↑↓ for x10, type to edit)";
const RUNNING: &str = "Running";

fn hint_style() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn focused_style() -> Style {
    active_style().add_modifier(Modifier::REVERSED)
}

pub(super) fn render(edit: &TimeRangeEdit, now: PrimitiveDateTime) -> Vec<Line<'static>> {
    let duration = format_elapsed(edit.start_time, edit.end_time.unwrap_or(now));

    if edit.status == Status::Done {
        let end = edit
            .end_time
            .map(format_timestamp)
            .unwrap_or_else(|| RUNNING.to_string());
        let mut spans = message_line(edit.status, &edit.message);
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!(
                "{} - {end} ({duration}) {}",
                format_timestamp(edit.start_time),
                edit.description
            ),
            answer_style(),
        ));
        return vec![Line::from(spans)];
    }

    let mut header = message_line(edit.status, &edit.message);
    header.push(Span::raw(" "));
    header.push(Span::styled(HINT, hint_style()));

    let mut start = vec![Span::raw("   Start: ")];
    start.extend(timestamp_spans(edit, EditField::StartTime, edit.start_time));

    let mut end = vec![Span::raw("     End: ")];
    match edit.end_time {
        Some(dt) => end.extend(timestamp_spans(edit, EditField::EndTime, dt)),
        None if edit.focus.field == EditField::EndTime => {
            end.push(Span::styled(pending_or(edit, RUNNING), focused_style()))
        }
        None => end.push(Span::raw(RUNNING)),
    }

    let description = if edit.focus.field == EditField::Description {
        Span::styled(format!("{}█", edit.description), active_style())
    } else {
        Span::raw(edit.description.clone())
    };

    let mut lines = vec![
        Line::from(header),
        Line::from(start),
        Line::from(end),
        Line::from(format!("   Duration: {duration}")),
        Line::from(vec![Span::raw("   Description: "), description]),
    ];
    lines.extend(error_line(&edit.error));
    lines
}

/// One span per component, the focused one highlighted and showing any
/// digits typed so far.
fn timestamp_spans(
    edit: &TimeRangeEdit,
    field: EditField,
    dt: PrimitiveDateTime,
) -> Vec<Span<'static>> {
    let focused = (edit.focus.field == field)
        .then_some(edit.focus.component)
        .flatten();

    let mut spans = Vec::with_capacity(DateComponent::ORDER.len() * 2);
    for component in DateComponent::ORDER {
        let text = component.format(dt);
        if focused == Some(component) {
            spans.push(Span::styled(pending_or(edit, &text), focused_style()));
        } else {
            spans.push(Span::raw(text));
        }
        if !component.separator().is_empty() {
            spans.push(Span::raw(component.separator()));
        }
    }
    spans
}

/// Pending digits padded to `fallback`'s width, or `fallback` itself.
fn pending_or(edit: &TimeRangeEdit, fallback: &str) -> String {
    let pending = edit.digits.as_str();
    if pending.is_empty() {
        return fallback.to_string();
    }
    let width = edit
        .focus
        .component
        .map(DateComponent::capacity)
        .unwrap_or(pending.len());
    format!("{pending:_<width$}")
}
