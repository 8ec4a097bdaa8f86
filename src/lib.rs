//! This crate provides the core of a week planner, for daily and weekly tasks stored on a JSON task server.
//!
//! The [`week`] module computes the Monday-aligned 7-day window that is displayed for a given week offset.
//!
//! Tasks are fetched through a [`TaskApi`](traits::TaskApi), either the HTTP [`Client`](client::Client) or the
//! in-memory [`MockTaskApi`](mock_api::MockTaskApi). A [`TaskStore`](store::TaskStore) keeps the tasks of the
//! displayed week, and only changes them once the server has confirmed a change. \
//! A [`PlannerSession`](session::PlannerSession) ties everything together: it handles week navigation, runs user
//! operations, and hands the result to a [`Presenter`](traits::Presenter).

pub mod traits;

pub mod error;
pub use error::{Error, InvalidInput, Result};
pub mod config;
pub mod locale;

pub mod week;
pub use week::{compute_window, format_range, DaySlot, DayWindow, WeekOffset};
pub mod scope;
pub use scope::Scope;
mod task;
pub use task::{NewTask, Task, TaskId, TaskKey, TaskPatch, WireTask, CreateTaskBody};

pub mod store;
pub use store::TaskStore;
pub mod session;
pub use session::PlannerSession;

pub mod client;
pub mod mock_api;
pub mod mock_behaviour;

pub mod utils;
