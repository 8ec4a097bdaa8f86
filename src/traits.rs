//! The seams of this crate: where tasks come from, and where they are displayed

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::scope::Scope;
use crate::task::{NewTask, Task, TaskKey};
use crate::store::WindowGrouping;

/// A remote source of tasks (usually the HTTP [`Client`](crate::client::Client)).
///
/// Implementors must report non-2xx answers as errors, never as empty successes.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Returns the tasks of this scope for the week that starts on `week_start` (a Monday)
    async fn list_week(&self, scope: Scope, week_start: NaiveDate) -> Result<Vec<Task>>;

    /// Returns the current server version of a task
    async fn get_task(&self, key: &TaskKey) -> Result<Task>;

    /// Creates a task, and returns the refreshed list of the tasks of the same scope that share its anchor date
    async fn create_task(&self, new_task: &NewTask) -> Result<Vec<Task>>;

    /// Replaces a task with this version, and returns what the server stored
    async fn update_task(&self, task: &Task) -> Result<Task>;

    async fn delete_task(&self, key: &TaskKey) -> Result<()>;
}

/// The kind of a notification shown to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
}

/// The presentation layer (day cards, task rows, notifications...)
///
/// It only receives projections of the task set, and is never read back.
pub trait Presenter {
    /// Display a whole week: day cards with their tasks and counts
    fn render(&mut self, grouping: &WindowGrouping);

    /// Display the week-level task list
    fn render_weekly_list(&mut self, tasks: &[Task]);

    /// Show a transient message to the user
    fn notify(&mut self, message: &str, kind: NotificationKind);
}
