use time::macros::format_description;
use time::{format_description::BorrowedFormatItem, Date, Duration, Month, PrimitiveDateTime};

/// Years a four-digit timestamp can express.
const YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Textual form of a timestamp at the prompt boundary.
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute] [year]-[month]-[day]");

/// A sub-unit of a timestamp that can hold the editing focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateComponent {
    Hour,
    Minute,
    Year,
    Month,
    Day,
}

impl DateComponent {
    /// Left-to-right order in which the components are rendered and visited.
    pub const ORDER: [DateComponent; 5] = [
        DateComponent::Hour,
        DateComponent::Minute,
        DateComponent::Year,
        DateComponent::Month,
        DateComponent::Day,
    ];

    pub const FIRST: DateComponent = DateComponent::Hour;
    pub const LAST: DateComponent = DateComponent::Day;

    fn index(self) -> usize {
        match self {
            DateComponent::Hour => 0,
            DateComponent::Minute => 1,
            DateComponent::Year => 2,
            DateComponent::Month => 3,
            DateComponent::Day => 4,
        }
    }

    /// The component to the right, `None` past `Day`.
    pub fn next(self) -> Option<Self> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    /// The component to the left, `None` before `Hour`.
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ORDER[i])
    }

    /// Number of digits typed before the value is applied.
    pub fn capacity(self) -> usize {
        match self {
            DateComponent::Year => 4,
            _ => 2,
        }
    }

    pub fn format(self, dt: PrimitiveDateTime) -> String {
        match self {
            DateComponent::Hour => format!("{:02}", dt.hour()),
            DateComponent::Minute => format!("{:02}", dt.minute()),
            DateComponent::Year => format!("{:04}", dt.year()),
            DateComponent::Month => format!("{:02}", u8::from(dt.month())),
            DateComponent::Day => format!("{:02}", dt.day()),
        }
    }

    /// Separator rendered after this component.
    pub fn separator(self) -> &'static str {
        match self {
            DateComponent::Hour => ":",
            DateComponent::Minute => " ",
            DateComponent::Year | DateComponent::Month => "-",
            DateComponent::Day => "",
        }
    }
}

pub fn parse_timestamp(s: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(s.trim(), TIME_FORMAT).ok()
}

pub fn format_timestamp(dt: PrimitiveDateTime) -> String {
    DateComponent::ORDER
        .iter()
        .map(|c| format!("{}{}", c.format(dt), c.separator()))
        .collect()
}

/// Move `dt` by `amount` units of `component`.
///
/// Months and years keep the day where possible and clamp it to the end of
/// the target month otherwise. Results that leave the four-digit year range
/// leave `dt` unchanged.
pub fn adjust(dt: PrimitiveDateTime, component: DateComponent, amount: i64) -> PrimitiveDateTime {
    let adjusted = match component {
        DateComponent::Minute => dt.checked_add(Duration::minutes(amount)),
        DateComponent::Hour => dt.checked_add(Duration::hours(amount)),
        DateComponent::Day => dt.checked_add(Duration::days(amount)),
        DateComponent::Month => add_months(dt, amount),
        DateComponent::Year => amount.checked_mul(12).and_then(|m| add_months(dt, m)),
    };
    adjusted
        .filter(|adjusted| YEARS.contains(&adjusted.year()))
        .unwrap_or(dt)
}

/// Set `component` of `dt` to a value typed by the user.
///
/// Months are 1-based here. Returns `None` when the value is out of range
/// for the component, e.g. hour 24, month 13 or day 31 in April.
pub fn set_component(
    dt: PrimitiveDateTime,
    component: DateComponent,
    value: u32,
) -> Option<PrimitiveDateTime> {
    match component {
        DateComponent::Hour => dt.replace_hour(u8::try_from(value).ok()?).ok(),
        DateComponent::Minute => dt.replace_minute(u8::try_from(value).ok()?).ok(),
        DateComponent::Day => dt.replace_day(u8::try_from(value).ok()?).ok(),
        DateComponent::Month => {
            let month = Month::try_from(u8::try_from(value).ok()?).ok()?;
            with_date(dt, dt.year(), month)
        }
        DateComponent::Year => with_date(dt, i32::try_from(value).ok()?, dt.month()),
    }
}

fn add_months(dt: PrimitiveDateTime, amount: i64) -> Option<PrimitiveDateTime> {
    let current = i64::from(dt.year()) * 12 + i64::from(u8::from(dt.month())) - 1;
    let target = current.checked_add(amount)?;
    let year = i32::try_from(target.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(target.rem_euclid(12) + 1).ok()?).ok()?;
    with_date(dt, year, month)
}

/// `dt` moved to `year`/`month`, keeping the day clamped to the month length.
fn with_date(dt: PrimitiveDateTime, year: i32, month: Month) -> Option<PrimitiveDateTime> {
    let date = (1..=dt.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())?;
    Some(PrimitiveDateTime::new(date, dt.time()))
}

/// `|end - start|` as `HHhMMm`.
pub fn format_elapsed(start: PrimitiveDateTime, end: PrimitiveDateTime) -> String {
    let elapsed = (end - start).abs();
    let hours = elapsed.whole_hours();
    let minutes = elapsed.whole_minutes() % 60;
    format!("{hours:02}h{minutes:02}m")
}
