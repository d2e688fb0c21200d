//! Sample-date generation for the statistics graph.
//!
//! The graph samples one value per month. A [`DateRange`] holds the two bounds
//! the user picked (in either order) and expands them into an ascending,
//! day-unique list of [`SampleDate`]s.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, Duration, Month};

/// Days added to the first of a month to land safely inside the next one.
const MONTH_JUMP_DAYS: i64 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    FirstOfMonth,
    LastOfMonth,
}

impl Granularity {
    pub fn anchor(self, date: Date) -> Date {
        match self {
            Self::FirstOfMonth => first_of_month(date),
            Self::LastOfMonth => last_of_month(date),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstOfMonth => "first_of_month",
            Self::LastOfMonth => "last_of_month",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "first_of_month" => Some(Self::FirstOfMonth),
            "last_of_month" => Some(Self::LastOfMonth),
            _ => None,
        }
    }
}

/// One x-axis position of the graph. Two sample dates are equal when they fall
/// on the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleDate(Date);

impl SampleDate {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn date(self) -> Date {
        self.0
    }

    /// `DD.MM.YYYY`, used for chart labels and export rows.
    pub fn label(self) -> String {
        self.0
            .format(&format_description!("[day].[month].[year]"))
            .unwrap_or_else(|_| self.0.to_string())
    }
}

impl fmt::Display for SampleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<Date> for SampleDate {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    from: Option<Date>,
    to: Option<Date>,
    granularity: Granularity,
    include_today: bool,
}

impl DateRange {
    pub fn new(granularity: Granularity, include_today: bool) -> Self {
        Self {
            from: None,
            to: None,
            granularity,
            include_today,
        }
    }

    /// Page-load default: from `months_back` months ago up to the current month.
    pub fn default_for(
        today: Date,
        months_back: u32,
        granularity: Granularity,
        include_today: bool,
    ) -> Self {
        let mut range = Self::new(granularity, include_today);
        range.set_from(Some(months_before(today, months_back)));
        range.set_to(Some(today));
        range
    }

    pub fn from(&self) -> Option<Date> {
        self.from
    }

    pub fn to(&self) -> Option<Date> {
        self.to
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn include_today(&self) -> bool {
        self.include_today
    }

    pub fn set_from(&mut self, date: Option<Date>) {
        self.from = date.map(|d| self.granularity.anchor(d));
    }

    pub fn set_to(&mut self, date: Option<Date>) {
        self.to = date.map(|d| self.granularity.anchor(d));
    }

    /// Switching granularity re-anchors the bounds that were already chosen.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        self.from = self.from.map(|d| granularity.anchor(d));
        self.to = self.to.map(|d| granularity.anchor(d));
    }

    pub fn set_include_today(&mut self, include_today: bool) {
        self.include_today = include_today;
    }

    /// Expands the range into ascending, day-unique sample dates.
    ///
    /// The walk stops at the first anchored date at or past the upper bound and
    /// keeps that overshoot date, so the sequence always reaches the bound.
    /// A missing bound yields an empty sequence.
    pub fn expand(&self, today: Date) -> Vec<SampleDate> {
        let (Some(from), Some(to)) = (self.from, self.to) else {
            return Vec::new();
        };
        let (lower, upper) = if from <= to { (from, to) } else { (to, from) };

        let mut samples = Vec::new();
        let mut cursor = self.granularity.anchor(lower);
        while cursor < upper {
            samples.push(SampleDate(cursor));
            match next_month(cursor, self.granularity) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        samples.push(SampleDate(cursor));

        if self.include_today {
            samples.push(SampleDate(today));
        }

        samples.sort();
        samples.dedup();
        samples
    }
}

/// Parses the value of an `<input type="date">` (`YYYY-MM-DD`). Anything else,
/// including the empty string of a cleared input, is `None`.
pub fn parse_input_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), &format_description!("[year]-[month]-[day]")).ok()
}

/// Inverse of [`parse_input_date`].
pub fn format_input_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

fn first_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

fn last_of_month(date: Date) -> Date {
    let last = date.month().length(date.year());
    date.replace_day(last).unwrap_or(date)
}

fn next_month(date: Date, granularity: Granularity) -> Option<Date> {
    first_of_month(date)
        .checked_add(Duration::days(MONTH_JUMP_DAYS))
        .map(|jumped| granularity.anchor(jumped))
}

fn months_before(date: Date, months: u32) -> Date {
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - months as i32;
    let year = index.div_euclid(12);
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);
    Date::from_calendar_date(year, month, 1).unwrap_or(date)
}
