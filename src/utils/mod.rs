//! Some utility functions

use std::io::Write;

use crate::store::WindowGrouping;
use crate::task::Task;
use crate::traits::{NotificationKind, Presenter};

/// Write one task as a single line (e.g. `[✓] Run	daily/3`)
pub fn print_task<W: Write>(out: &mut W, task: &Task) -> std::io::Result<()> {
    let completion = if task.is_done() { "✓" } else { " " };
    write!(out, "    [{}] {}\t{}", completion, task.title(), task.key())?;
    if let Some(description) = task.description() {
        write!(out, "\t({})", description)?;
    }
    writeln!(out)
}

/// A debug utility that pretty-prints a week
pub fn print_grouping<W: Write>(out: &mut W, grouping: &WindowGrouping) -> std::io::Result<()> {
    writeln!(out, "{} (week {})", grouping.range_label, grouping.window.iso_week())?;
    for day in &grouping.days {
        let today = if day.slot.is_today() { " *" } else { "" };
        writeln!(out, "  {} {}{}  {}/{}",
            day.slot.weekday_label(), day.slot.short_label(), today,
            day.stats.completed, day.stats.total)?;
        for task in &day.tasks {
            print_task(out, task)?;
        }
    }
    let stats = &grouping.week_stats;
    writeln!(out, "  daily: {}/{}, weekly: {}/{}, points: {}",
        stats.completed_daily, stats.total_daily,
        stats.completed_weekly, stats.total_weekly,
        stats.points())
}


/// A [`Presenter`] that writes everything as plain text
pub struct TextPresenter<W: Write> {
    out: W,
}

impl TextPresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn render(&mut self, grouping: &WindowGrouping) {
        if let Err(err) = print_grouping(&mut self.out, grouping) {
            log::warn!("Unable to display the week: {}", err);
        }
    }

    fn render_weekly_list(&mut self, tasks: &[Task]) {
        let result = writeln!(self.out, "  This week:")
            .and_then(|_| tasks.iter().try_for_each(|task| print_task(&mut self.out, task)));
        if let Err(err) = result {
            log::warn!("Unable to display the weekly tasks: {}", err);
        }
    }

    fn notify(&mut self, message: &str, kind: NotificationKind) {
        let prefix = match kind {
            NotificationKind::Success => "OK",
            NotificationKind::Error => "!!",
        };
        if let Err(err) = writeln!(self.out, "{} {}", prefix, message) {
            log::warn!("Unable to display a notification: {}", err);
        }
    }
}
