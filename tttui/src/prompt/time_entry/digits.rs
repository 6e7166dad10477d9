use super::date::DateComponent;

/// Digits typed so far for the focused date component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigitBuffer {
    digits: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitOutcome {
    /// More digits are needed before anything is applied.
    Pending,
    /// The buffer reached the component's capacity and was consumed.
    Complete(u32),
}

impl DigitBuffer {
    /// Append `digit`; once `component`'s capacity is reached the buffer is
    /// parsed and emptied in one step.
    pub fn push(&mut self, digit: char, component: DateComponent) -> DigitOutcome {
        if !digit.is_ascii_digit() {
            return DigitOutcome::Pending;
        }
        self.digits.push(digit);
        if self.digits.len() < component.capacity() {
            return DigitOutcome::Pending;
        }

        let value = self.digits.parse::<u32>();
        self.digits.clear();
        match value {
            Ok(value) => DigitOutcome::Complete(value),
            Err(_) => DigitOutcome::Pending,
        }
    }

    /// Remove the last typed digit. Returns false when there was none.
    pub fn pop(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_digit_components_complete_on_second_digit() {
        let mut buffer = DigitBuffer::default();
        assert_eq!(buffer.push('1', DateComponent::Minute), DigitOutcome::Pending);
        assert_eq!(buffer.as_str(), "1");
        assert_eq!(
            buffer.push('4', DateComponent::Minute),
            DigitOutcome::Complete(14)
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn year_needs_four_digits() {
        let mut buffer = DigitBuffer::default();
        for d in ['2', '0', '2'] {
            assert_eq!(buffer.push(d, DateComponent::Year), DigitOutcome::Pending);
        }
        assert_eq!(
            buffer.push('5', DateComponent::Year),
            DigitOutcome::Complete(2025)
        );
    }

    #[test]
    fn pop_reports_whether_a_digit_was_removed() {
        let mut buffer = DigitBuffer::default();
        assert!(!buffer.pop());
        buffer.push('0', DateComponent::Day);
        assert!(buffer.pop());
        assert!(buffer.is_empty());
    }

    #[test]
    fn non_digits_are_ignored() {
        let mut buffer = DigitBuffer::default();
        assert_eq!(buffer.push('x', DateComponent::Hour), DigitOutcome::Pending);
        assert!(buffer.is_empty());
    }
}
