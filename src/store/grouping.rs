//! Projection of a task set onto a week window
//!
//! Counts are always computed from the tasks being grouped, they are never stored anywhere else.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::scope::Placement;
use crate::task::Task;
use crate::week::{format_range, DaySlot, DayWindow};

/// Completion counts of a day
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DayStats {
    pub completed: usize,
    pub total: usize,
}

/// Completion counts of a week
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeekStats {
    pub completed_daily: usize,
    pub total_daily: usize,
    pub completed_weekly: usize,
    pub total_weekly: usize,
}

impl WeekStats {
    /// Every completed task (daily or weekly) earns one point
    pub fn points(&self) -> usize {
        self.completed_daily + self.completed_weekly
    }
}

/// The tasks of one day of the window
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayGroup {
    pub slot: DaySlot,
    pub tasks: Vec<Task>,
    pub stats: DayStats,
}

/// Everything the presentation layer needs to display a week
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowGrouping {
    pub window: DayWindow,
    /// e.g. "5—11 мая 2025"
    pub range_label: String,
    /// Monday to Sunday
    pub days: Vec<DayGroup>,
    pub weekly: Vec<Task>,
    pub week_stats: WeekStats,
}

impl WindowGrouping {
    /// Partition `tasks` into the days of `window` and the weekly list.
    ///
    /// Tasks that do not belong to this window are left out. Tasks are sorted by id inside each group.
    pub fn build<'a, I>(window: &DayWindow, tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut per_day: Vec<Vec<Task>> = vec![Vec::new(); 7];
        let mut weekly = Vec::new();

        for task in tasks {
            match task.scope().placement(task.anchor_date(), window) {
                Some(Placement::Day(date)) => {
                    let index = (date - window.week_start()).num_days() as usize;
                    per_day[index].push(task.clone());
                },
                Some(Placement::Week) => weekly.push(task.clone()),
                None => log::trace!("Task {} ({}) is not in the week of {}", task.key(), task.anchor_date(), window.week_start()),
            }
        }

        weekly.sort_by(|l, r| l.id().cmp(r.id()));
        let days: Vec<DayGroup> = window.iter()
            .zip(per_day.into_iter())
            .map(|(slot, mut tasks)| {
                tasks.sort_by(|l, r| l.id().cmp(r.id()));
                let stats = DayStats {
                    completed: tasks.iter().filter(|t| t.is_done()).count(),
                    total: tasks.len(),
                };
                DayGroup { slot: *slot, tasks, stats }
            })
            .collect();

        let week_stats = WeekStats {
            completed_daily: days.iter().map(|d| d.stats.completed).sum(),
            total_daily: days.iter().map(|d| d.stats.total).sum(),
            completed_weekly: weekly.iter().filter(|t| t.is_done()).count(),
            total_weekly: weekly.len(),
        };

        Self {
            window: *window,
            range_label: format_range(window),
            days,
            weekly,
            week_stats,
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayGroup> {
        self.days.iter().find(|group| group.slot.date() == date)
    }

    /// The daily tasks, by `YYYY-MM-DD` key
    pub fn by_date_key(&self) -> BTreeMap<String, &[Task]> {
        self.days.iter()
            .map(|group| (group.slot.iso_date_key(), group.tasks.as_slice()))
            .collect()
    }

    /// How many tasks (daily and weekly) are displayed
    pub fn task_count(&self) -> usize {
        self.days.iter().map(|d| d.tasks.len()).sum::<usize>() + self.weekly.len()
    }
}
