//! An in-memory task API
//!
//! [`MockTaskApi`] behaves like the task server: it hands out ids, answers creations with the refreshed list of the
//! tasks that share the new task's date (or week), and rejects unknown ids with a 404.
//! It also records every call it receives, can be told to fail (see [`MockBehaviour`]), and can delay the listings
//! of some weeks to reproduce responses that arrive out of order.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::error::{Error, Result};
use crate::mock_behaviour::MockBehaviour;
use crate::scope::Scope;
use crate::task::{NewTask, Task, TaskId, TaskKey};
use crate::traits::TaskApi;

/// A call received by a [`MockTaskApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    ListWeek(Scope, NaiveDate),
    GetTask(TaskKey),
    CreateTask(Scope, NaiveDate),
    UpdateTask(TaskKey),
    DeleteTask(TaskKey),
}

#[derive(Debug, Default)]
struct MockState {
    tasks: HashMap<TaskKey, Task>,
    last_id: u64,
    calls: Vec<ApiCall>,
    behaviour: MockBehaviour,
    latencies: HashMap<NaiveDate, Duration>,
}

#[derive(Debug, Default)]
pub struct MockTaskApi {
    state: Mutex<MockState>,
}

impl MockTaskApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test must not hide the state from the other assertions
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a task, as if it had been created by someone else. This is not recorded as a call
    pub fn seed<S: ToString>(&self, title: S, scope: Scope, anchor_date: NaiveDate, is_done: bool) -> Task {
        let mut state = self.state();
        let task = Task::new_with_parameters(next_id(&mut state), title.to_string(), None, is_done, scope, anchor_date);
        state.tasks.insert(task.key(), task.clone());
        task
    }

    /// Change a task directly on the "server" (e.g. from another browser tab). This is not recorded as a call
    pub fn overwrite(&self, task: Task) {
        self.state().tasks.insert(task.key(), task);
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        self.state().behaviour = behaviour;
    }

    /// Delay the listings of the week that starts on `week_start`
    pub fn set_latency(&self, week_start: NaiveDate, latency: Duration) {
        self.state().latencies.insert(week_start, latency);
    }

    /// The calls received so far, oldest first
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// The version of a task that the "server" currently stores
    pub fn stored_task(&self, key: &TaskKey) -> Option<Task> {
        self.state().tasks.get(key).cloned()
    }

    /// Every task the "server" currently stores, sorted by key
    pub fn stored_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.state().tasks.values().cloned().collect();
        tasks.sort_by(|l, r| l.key().cmp(&r.key()));
        tasks
    }

    pub fn stored_task_count(&self) -> usize {
        self.state().tasks.len()
    }
}

fn next_id(state: &mut MockState) -> TaskId {
    state.last_id += 1;
    TaskId::from(state.last_id)
}

fn not_found(key: &TaskKey) -> Error {
    Error::Server { status: 404, message: format!("Task {} not found", key) }
}

fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|l, r| l.id().cmp(r.id()));
    tasks
}

#[async_trait]
impl TaskApi for MockTaskApi {
    async fn list_week(&self, scope: Scope, week_start: NaiveDate) -> Result<Vec<Task>> {
        let latency = {
            let mut state = self.state();
            state.calls.push(ApiCall::ListWeek(scope, week_start));
            state.behaviour.can_list_week()?;
            state.latencies.get(&week_start).copied()
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        let state = self.state();
        let tasks = state.tasks.values()
            .filter(|task| task.scope() == scope)
            .filter(|task| match scope {
                Scope::Daily => week_start <= task.anchor_date() && task.anchor_date() <= week_end,
                Scope::Weekly => task.anchor_date() == week_start,
            })
            .cloned()
            .collect();
        Ok(sorted(tasks))
    }

    async fn get_task(&self, key: &TaskKey) -> Result<Task> {
        let mut state = self.state();
        state.calls.push(ApiCall::GetTask(key.clone()));
        state.behaviour.can_get_task()?;
        state.tasks.get(key).cloned().ok_or_else(|| not_found(key))
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Vec<Task>> {
        let mut state = self.state();
        state.calls.push(ApiCall::CreateTask(new_task.scope, new_task.anchor_date));
        state.behaviour.can_create_task()?;
        if new_task.title.trim().is_empty() {
            return Err(Error::Server { status: 400, message: "title is required".to_string() });
        }

        let body = new_task.to_wire();
        let task = Task::new_with_parameters(next_id(&mut state), body.title, Some(body.description), body.is_done,
                                             new_task.scope, body.date);
        state.tasks.insert(task.key(), task);

        let refreshed = state.tasks.values()
            .filter(|task| task.scope() == new_task.scope && task.anchor_date() == new_task.anchor_date)
            .cloned()
            .collect();
        Ok(sorted(refreshed))
    }

    async fn update_task(&self, task: &Task) -> Result<Task> {
        let key = task.key();
        let mut state = self.state();
        state.calls.push(ApiCall::UpdateTask(key.clone()));
        state.behaviour.can_update_task()?;
        match state.tasks.get_mut(&key) {
            None => Err(not_found(&key)),
            Some(stored) => {
                *stored = task.clone();
                Ok(stored.clone())
            },
        }
    }

    async fn delete_task(&self, key: &TaskKey) -> Result<()> {
        let mut state = self.state();
        state.calls.push(ApiCall::DeleteTask(key.clone()));
        state.behaviour.can_delete_task()?;
        match state.tasks.remove(key) {
            None => Err(not_found(key)),
            Some(_) => Ok(()),
        }
    }
}
