//! Daily and weekly tasks
//!
//! Both kinds of tasks are handled by the same code. Everything that differs between them (API path, name of the
//! anchor date field, where they are displayed) is described by [`Scope`].

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInput, Result};
use crate::week::DayWindow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// A task that is due on a given day
    Daily,
    /// A task that spans a whole week
    Weekly,
}

/// Where a task is displayed in a window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// In the card of this day
    Day(NaiveDate),
    /// In the week-level list
    Week,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Daily, Scope::Weekly];

    /// The path segment of the API endpoints for this scope
    pub fn path_segment(&self) -> &'static str {
        match self {
            Scope::Daily => "daily",
            Scope::Weekly => "weekly",
        }
    }

    /// The name of the JSON field that holds the anchor date
    pub fn anchor_field(&self) -> &'static str {
        match self {
            Scope::Daily => "date",
            Scope::Weekly => "week_start",
        }
    }

    /// Tells where a task anchored at `anchor` goes in `window`, or `None` if it is outside this window
    pub fn placement(&self, anchor: NaiveDate, window: &DayWindow) -> Option<Placement> {
        match self {
            Scope::Daily => window.slot_for(anchor).map(|slot| Placement::Day(slot.date())),
            Scope::Weekly => {
                if anchor == window.week_start() {
                    Some(Placement::Week)
                } else {
                    None
                }
            },
        }
    }

    /// Makes sure a task of this scope can be anchored at this date
    pub fn validate_anchor(&self, anchor: NaiveDate) -> Result<()> {
        match self {
            Scope::Daily => Ok(()),
            Scope::Weekly => {
                if anchor.weekday() == Weekday::Mon {
                    Ok(())
                } else {
                    Err(InvalidInput::NotAMonday(anchor).into())
                }
            },
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Scope::Daily),
            "weekly" => Ok(Scope::Weekly),
            other => Err(InvalidInput::UnknownScope(other.to_string()).into()),
        }
    }
}
