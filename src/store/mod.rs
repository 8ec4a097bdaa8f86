//! The in-memory working set of tasks
//!
//! A [`TaskStore`] holds every known task (daily and weekly), and the week window they are displayed in.
//! The task set is only ever changed after the remote [`TaskApi`] has confirmed a change, so that a failed request
//! never leaves it half-updated.
//!
//! Loads are split into three steps (see [`TaskStore::begin_load`]), so that a slow response for a week the user has
//! navigated away from can be told apart from the latest one, and be discarded.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::task::{NewTask, Task, TaskKey, TaskPatch};
use crate::traits::TaskApi;
use crate::week::DayWindow;

mod grouping;
pub use grouping::{DayGroup, DayStats, WeekStats, WindowGrouping};


/// A request for the tasks of a window, tagged with the order in which it was issued
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    window: DayWindow,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 { self.generation }
    pub fn window(&self) -> &DayWindow { &self.window }

    /// Fetch the daily and weekly tasks of this window.
    ///
    /// This only borrows the API, so that several tickets can be in flight at the same time.
    pub async fn fetch<A: TaskApi + ?Sized>(self, api: &A) -> Result<LoadedWeek> {
        let week_start = self.window.week_start();
        let (mut tasks, weekly) = tokio::try_join!(
            api.list_week(Scope::Daily, week_start),
            api.list_week(Scope::Weekly, week_start),
        )?;
        tasks.extend(weekly);
        log::debug!("Fetched {} tasks for the week of {} (load #{})", tasks.len(), week_start, self.generation);
        Ok(LoadedWeek { ticket: self, tasks })
    }
}

/// The response to a [`LoadTicket`], waiting to be applied with [`TaskStore::apply_load`]
#[derive(Clone, Debug)]
pub struct LoadedWeek {
    ticket: LoadTicket,
    tasks: Vec<Task>,
}

impl LoadedWeek {
    pub fn ticket(&self) -> &LoadTicket { &self.ticket }
    pub fn tasks(&self) -> &[Task] { &self.tasks }
}


/// The week-scoped set of tasks, kept consistent with a remote [`TaskApi`]
#[derive(Debug)]
pub struct TaskStore<A: TaskApi> {
    api: A,
    tasks: HashMap<TaskKey, Task>,
    /// The window currently displayed
    window: DayWindow,
    /// The task the user asked to delete, waiting for a confirmation
    pending_delete: Option<TaskKey>,
    /// The latest load that has been requested
    latest_load: LoadTicket,
}

impl<A: TaskApi> TaskStore<A> {
    /// Create an empty store that displays `window`
    pub fn new(api: A, window: DayWindow) -> Self {
        Self {
            api,
            tasks: HashMap::new(),
            window,
            pending_delete: None,
            latest_load: LoadTicket { generation: 0, window },
        }
    }

    pub fn api(&self) -> &A { &self.api }
    pub fn window(&self) -> &DayWindow { &self.window }
    pub fn pending_delete(&self) -> Option<&TaskKey> { self.pending_delete.as_ref() }

    pub fn get(&self, key: &TaskKey) -> Option<&Task> {
        self.tasks.get(key)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }


    /// Partition the current task set into the days of `window` and its weekly list.
    ///
    /// This does not involve any network call.
    pub fn filter_for_window(&self, window: &DayWindow) -> WindowGrouping {
        WindowGrouping::build(window, self.tasks.values())
    }

    /// The grouping of the displayed window
    pub fn grouping(&self) -> WindowGrouping {
        self.filter_for_window(&self.window)
    }


    /// Fetch the tasks of `window` and replace the whole task set with them.
    ///
    /// On success, `window` becomes the displayed window. On failure, nothing is changed.
    pub async fn load_for_window(&mut self, window: &DayWindow) -> Result<()> {
        let ticket = self.begin_load(window);
        let loaded = ticket.fetch(&self.api).await?;
        self.apply_load(loaded)
    }

    /// Start loading `window`. Any ticket issued before this one becomes stale
    pub fn begin_load(&mut self, window: &DayWindow) -> LoadTicket {
        let ticket = LoadTicket {
            generation: self.latest_load.generation + 1,
            window: *window,
        };
        log::debug!("Requesting the tasks of the week of {} (load #{})", window.week_start(), ticket.generation);
        self.latest_load = ticket.clone();
        ticket
    }

    /// Replace the task set with a fetched week, unless a more recent load has been requested since.
    ///
    /// Stale responses are rejected with [`Error::StaleResponse`], and leave everything unchanged
    pub fn apply_load(&mut self, loaded: LoadedWeek) -> Result<()> {
        if loaded.ticket.generation != self.latest_load.generation {
            log::debug!("Ignoring load #{} (latest is #{})", loaded.ticket.generation, self.latest_load.generation);
            return Err(Error::StaleResponse {
                requested: loaded.ticket.window.week_start(),
                current: self.latest_load.window.week_start(),
            });
        }

        self.tasks = loaded.tasks.into_iter()
            .map(|task| (task.key(), task))
            .collect();
        self.window = loaded.ticket.window;
        log::info!("Loaded {} tasks for the week of {}", self.tasks.len(), self.window.week_start());
        Ok(())
    }


    /// Create a task on the server.
    ///
    /// The server answers with every task of the same scope and anchor date; these replace their local
    /// counterparts. Returns the tasks that were not known before.
    pub async fn create(&mut self, new_task: NewTask) -> Result<Vec<Task>> {
        new_task.validate()?;

        let refreshed = self.api.create_task(&new_task).await?;

        let known: HashSet<TaskKey> = self.tasks.keys().cloned().collect();
        self.tasks.retain(|_, task| {
            task.scope() != new_task.scope || task.anchor_date() != new_task.anchor_date
        });
        let mut created = Vec::new();
        for task in refreshed {
            if known.contains(&task.key()) == false {
                created.push(task.clone());
            }
            self.tasks.insert(task.key(), task);
        }

        log::info!("Created {} {} task(s) on {}", created.len(), new_task.scope, new_task.anchor_date);
        Ok(created)
    }

    /// Apply a patch to a task and send it to the server.
    ///
    /// The server is the source of truth: this always makes a request, even if the task is unknown locally (in
    /// which case its current version is fetched first).
    pub async fn update(&mut self, key: &TaskKey, patch: &TaskPatch) -> Result<Task> {
        patch.validate(key.scope)?;

        let base = match self.tasks.get(key) {
            Some(task) => task.clone(),
            None => {
                log::debug!("Task {} is not known locally, fetching it", key);
                self.api.get_task(key).await?
            },
        };
        let patched = patch.apply_to(&base)?;

        let stored = self.api.update_task(&patched).await?;
        self.replace(key, stored.clone());
        Ok(stored)
    }

    /// Flip the completion status of a task.
    ///
    /// The current status is always fetched from the server first, so that a stale local copy cannot undo a change
    /// made from somewhere else.
    pub async fn toggle_done(&mut self, key: &TaskKey) -> Result<Task> {
        let current = self.api.get_task(key).await?;
        let stored = self.api.update_task(&current.toggled()).await?;
        log::debug!("Task {} is now {}", key, if stored.is_done() { "done" } else { "not done" });
        self.replace(key, stored.clone());
        Ok(stored)
    }

    fn replace(&mut self, key: &TaskKey, task: Task) {
        if task.key() != *key {
            log::warn!("Server answered with task {} for task {}", task.key(), key);
        }
        self.tasks.remove(key);
        self.tasks.insert(task.key(), task);
    }


    /// Mark a task for deletion. Nothing is deleted until [`Self::confirm_delete`] is called
    pub fn request_delete(&mut self, key: TaskKey) {
        log::debug!("Task {} is waiting for a deletion confirmation", key);
        self.pending_delete = Some(key);
    }

    /// Forget about the pending deletion, if any
    pub fn cancel_delete(&mut self) -> Option<TaskKey> {
        self.pending_delete.take()
    }

    /// Delete the task that was marked with [`Self::request_delete`].
    ///
    /// Returns the key of the deleted task, or `None` if no deletion was pending.
    /// In case of failure, the deletion stays pending, so that it can be confirmed again.
    pub async fn confirm_delete(&mut self) -> Result<Option<TaskKey>> {
        let key = match &self.pending_delete {
            None => return Ok(None),
            Some(key) => key.clone(),
        };

        self.api.delete_task(&key).await?;

        self.tasks.remove(&key);
        self.pending_delete = None;
        log::info!("Deleted task {}", key);
        Ok(Some(key))
    }
}
