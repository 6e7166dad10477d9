use super::date::DateComponent;

/// Top-level field of the range editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    StartTime,
    EndTime,
    Description,
}

const CYCLE_WITH_END: [EditField; 3] = [
    EditField::StartTime,
    EditField::EndTime,
    EditField::Description,
];
const CYCLE_RUNNING: [EditField; 2] = [EditField::StartTime, EditField::Description];

impl EditField {
    pub fn is_time(self) -> bool {
        matches!(self, EditField::StartTime | EditField::EndTime)
    }

    fn cycle(has_end: bool) -> &'static [EditField] {
        if has_end {
            &CYCLE_WITH_END
        } else {
            &CYCLE_RUNNING
        }
    }

    pub fn next(self, has_end: bool) -> EditField {
        let cycle = Self::cycle(has_end);
        match cycle.iter().position(|f| *f == self) {
            Some(i) => cycle[(i + 1) % cycle.len()],
            // EndTime after its value was removed
            None => EditField::Description,
        }
    }

    pub fn prev(self, has_end: bool) -> EditField {
        let cycle = Self::cycle(has_end);
        match cycle.iter().position(|f| *f == self) {
            Some(i) => cycle[(i + cycle.len() - 1) % cycle.len()],
            None => EditField::StartTime,
        }
    }
}

/// The field and, inside time fields, the date component holding the focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub field: EditField,
    pub component: Option<DateComponent>,
}

impl Focus {
    pub fn new(field: EditField, component: DateComponent) -> Self {
        let component = field.is_time().then_some(component);
        Self { field, component }
    }

    /// Where editing starts: the hour of the start time.
    pub fn initial() -> Self {
        Self::new(EditField::StartTime, DateComponent::FIRST)
    }

    /// Next field, entered at its first component.
    pub fn forward(self, has_end: bool) -> Self {
        Self::new(self.field.next(has_end), DateComponent::FIRST)
    }

    /// Previous field, entered at its last component.
    pub fn backward(self, has_end: bool) -> Self {
        Self::new(self.field.prev(has_end), DateComponent::LAST)
    }

    pub fn right(self, has_end: bool) -> Self {
        match self.component.and_then(DateComponent::next) {
            Some(component) => Self {
                component: Some(component),
                ..self
            },
            None => self.forward(has_end),
        }
    }

    pub fn left(self, has_end: bool) -> Self {
        match self.component.and_then(DateComponent::prev) {
            Some(component) => Self {
                component: Some(component),
                ..self
            },
            None => self.backward(has_end),
        }
    }
}
