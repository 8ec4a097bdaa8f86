//! Monday-aligned week windows
//!
//! A [`DayWindow`] is the 7 consecutive days displayed by the planner, computed from "now" and a [`WeekOffset`]
//! (0 is the week that contains today, -1 the previous one, etc.).

use std::fmt::{Display, Formatter};

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, TimeDelta};

use crate::locale::{month_name, DAY_NAMES};

/// How many weeks away from the current week the displayed window is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekOffset(i64);

impl WeekOffset {
    pub fn new(weeks: i64) -> Self {
        Self(weeks)
    }

    pub fn weeks(&self) -> i64 {
        self.0
    }

    /// The week before this one
    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// The week after this one
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The week that contains today
    pub fn current() -> Self {
        Self(0)
    }

    pub fn is_current(&self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for WeekOffset {
    fn from(weeks: i64) -> Self {
        Self(weeks)
    }
}

impl Display for WeekOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}", self.0)
    }
}


/// One day of a [`DayWindow`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DaySlot {
    date: NaiveDate,
    weekday_label: &'static str,
    is_today: bool,
}

impl DaySlot {
    pub fn date(&self) -> NaiveDate          { self.date }
    pub fn weekday_label(&self) -> &'static str { self.weekday_label }
    pub fn is_today(&self) -> bool           { self.is_today }

    /// The `YYYY-MM-DD` key of this day
    pub fn iso_date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The label of this day, e.g. "5 мая"
    pub fn short_label(&self) -> String {
        format!("{} {}", self.date.day(), month_name(self.date.month()))
    }
}


/// Seven consecutive days, Monday to Sunday
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DayWindow {
    slots: [DaySlot; 7],
}

impl DayWindow {
    /// The window for `offset` weeks away from the current week, using the local clock
    pub fn current(offset: WeekOffset) -> Self {
        compute_window(Local::now().naive_local(), offset.weeks())
    }

    pub fn slots(&self) -> &[DaySlot; 7] {
        &self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DaySlot> {
        self.slots.iter()
    }

    /// The Monday this window starts on. Weekly tasks are anchored to this date
    pub fn week_start(&self) -> NaiveDate {
        self.slots[0].date
    }

    /// The Sunday this window ends on
    pub fn week_end(&self) -> NaiveDate {
        self.slots[6].date
    }

    /// The ISO 8601 week number
    pub fn iso_week(&self) -> u32 {
        self.week_start().iso_week().week()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.week_start() <= date && date <= self.week_end()
    }

    pub fn slot_for(&self, date: NaiveDate) -> Option<&DaySlot> {
        self.slots.iter().find(|slot| slot.date == date)
    }

    /// The slot flagged as today, if today is in this window
    pub fn today(&self) -> Option<&DaySlot> {
        self.slots.iter().find(|slot| slot.is_today)
    }
}

impl<'a> IntoIterator for &'a DayWindow {
    type Item = &'a DaySlot;
    type IntoIter = std::slice::Iter<'a, DaySlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}


/// Compute the window `offset_weeks` weeks away from the week that contains `reference_now`.
///
/// Weeks start on Monday (a Sunday belongs to the week that started 6 days before).
/// `is_today` flags compare calendar dates only, the time of day of `reference_now` is ignored.
///
/// This never fails: in case the requested week cannot be represented, the first (or last) complete week that
/// can be represented is returned instead.
pub fn compute_window(reference_now: NaiveDateTime, offset_weeks: i64) -> DayWindow {
    let today = reference_now.date();
    let monday = shifted_monday(today, offset_weeks);

    let slots = std::array::from_fn(|index| {
        // Cannot overflow, `shifted_monday` only returns Mondays of complete weeks
        let date = monday + Days::new(index as u64);
        DaySlot {
            date,
            weekday_label: DAY_NAMES[index],
            is_today: date == today,
        }
    });
    DayWindow { slots }
}

/// Format the range of a window, e.g. "5—11 мая 2025" or "28 апреля 2025 — 4 мая 2025"
pub fn format_range(window: &DayWindow) -> String {
    let first = window.week_start();
    let last = window.week_end();

    if first.year() == last.year() && first.month() == last.month() {
        format!("{}—{}", first.day(), format_date_with_year(last))
    } else {
        format!("{} — {}", format_date_with_year(first), format_date_with_year(last))
    }
}

fn format_date_with_year(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_name(date.month()), date.year())
}

fn monday_of(date: NaiveDate) -> Option<NaiveDate> {
    let days_since_monday = date.weekday().num_days_from_monday();
    date.checked_sub_days(Days::new(u64::from(days_since_monday)))
}

fn shifted_monday(today: NaiveDate, offset_weeks: i64) -> NaiveDate {
    let this_monday = match monday_of(today) {
        None => return first_complete_week(),
        Some(m) => m,
    };

    let shifted = offset_weeks.checked_mul(7)
        .and_then(TimeDelta::try_days)
        .and_then(|delta| this_monday.checked_add_signed(delta))
        .filter(|monday| monday.checked_add_days(Days::new(6)).is_some());

    match shifted {
        Some(monday) => monday,
        None => {
            log::debug!("Week offset {} is out of the supported date range, saturating", offset_weeks);
            if offset_weeks < 0 {
                first_complete_week()
            } else {
                last_complete_week()
            }
        },
    }
}

/// The earliest Monday chrono can represent
fn first_complete_week() -> NaiveDate {
    let to_monday = (7 - NaiveDate::MIN.weekday().num_days_from_monday()) % 7;
    NaiveDate::MIN.checked_add_days(Days::new(u64::from(to_monday)))
        .unwrap_or(NaiveDate::MIN)
}

/// The latest Monday whose whole week chrono can represent
fn last_complete_week() -> NaiveDate {
    NaiveDate::MAX.checked_sub_days(Days::new(6))
        .and_then(monday_of)
        .unwrap_or(NaiveDate::MAX)
}
