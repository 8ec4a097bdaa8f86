//! The state of a planner page: the displayed week, the tasks, and where they are displayed
//!
//! A [`PlannerSession`] is the boundary of every user operation. Errors never go past it: they are logged, turned
//! into a notification for the user, and reported as a `false` (or `None`) return value.

use chrono::{Local, NaiveDateTime};

use crate::error::{Error, Result};
use crate::locale;
use crate::store::{LoadTicket, LoadedWeek, TaskStore};
use crate::task::{NewTask, Task, TaskKey, TaskPatch};
use crate::traits::{NotificationKind, Presenter, TaskApi};
use crate::week::{compute_window, DayWindow, WeekOffset};

/// Where "today" comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clock {
    /// The local time of this machine
    System,
    /// A frozen point in time (useful for tests and demos)
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local(),
            Clock::Fixed(now) => *now,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}


pub struct PlannerSession<A: TaskApi, P: Presenter> {
    store: TaskStore<A>,
    presenter: P,
    clock: Clock,
    /// The offset of the displayed week
    offset: WeekOffset,
    /// The navigation that is being loaded, with its load generation
    in_flight: Option<(u64, WeekOffset)>,
}

impl<A: TaskApi, P: Presenter> PlannerSession<A, P> {
    /// Create a session that displays the current week. Nothing is loaded until [`Self::refresh`] is called
    pub fn new(api: A, presenter: P) -> Self {
        Self::with_clock(api, presenter, Clock::System)
    }

    pub fn with_clock(api: A, presenter: P, clock: Clock) -> Self {
        let offset = WeekOffset::current();
        let window = compute_window(clock.now(), offset.weeks());
        Self {
            store: TaskStore::new(api, window),
            presenter,
            clock,
            offset,
            in_flight: None,
        }
    }

    pub fn clock(&self) -> Clock { self.clock }

    /// Change where "today" comes from. The displayed week is kept until the next navigation
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    pub fn offset(&self) -> WeekOffset { self.offset }
    pub fn store(&self) -> &TaskStore<A> { &self.store }
    pub fn presenter(&self) -> &P { &self.presenter }
    pub fn presenter_mut(&mut self) -> &mut P { &mut self.presenter }
    pub fn window(&self) -> &DayWindow { self.store.window() }

    /// Whether a week is being loaded
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    fn window_for(&self, offset: WeekOffset) -> DayWindow {
        compute_window(self.clock.now(), offset.weeks())
    }


    /// Reload the displayed week
    pub async fn refresh(&mut self) -> bool {
        self.go_to(self.offset).await
    }

    pub async fn previous_week(&mut self) -> bool {
        self.go_to(self.navigation_base().previous()).await
    }

    pub async fn next_week(&mut self) -> bool {
        self.go_to(self.navigation_base().next()).await
    }

    /// Go back to the week that contains today
    pub async fn current_week(&mut self) -> bool {
        let today_window = self.window_for(WeekOffset::current());
        if self.in_flight.is_none() && *self.store.window() == today_window {
            log::debug!("Already displaying the current week");
            return true;
        }
        self.go_to(WeekOffset::current()).await
    }

    /// Navigations are relative to the latest requested week, even if it is still loading
    fn navigation_base(&self) -> WeekOffset {
        match self.in_flight {
            Some((_, target)) => target,
            None => self.offset,
        }
    }

    /// Load the week at `target`, and display it
    pub async fn go_to(&mut self, target: WeekOffset) -> bool {
        let ticket = self.begin_navigation(target);
        let generation = ticket.generation();
        let result = ticket.fetch(self.store.api()).await;
        self.finish_navigation(generation, result)
    }

    /// First half of [`Self::go_to`], for callers that drive several loads at the same time.
    ///
    /// The returned ticket must be fetched, and its result handed to [`Self::finish_navigation`].
    pub fn begin_navigation(&mut self, target: WeekOffset) -> LoadTicket {
        let window = self.window_for(target);
        let ticket = self.store.begin_load(&window);
        log::debug!("Navigating to week {} ({})", target, window.week_start());
        self.in_flight = Some((ticket.generation(), target));
        ticket
    }

    /// Display the result of a navigation, unless another one has been started since.
    ///
    /// Returns whether the result has been displayed.
    pub fn finish_navigation(&mut self, generation: u64, result: Result<LoadedWeek>) -> bool {
        let target = match self.in_flight {
            Some((latest, target)) if latest == generation => target,
            _ => {
                if let Err(err) = &result {
                    log::debug!("Ignoring the failure of superseded load #{}: {}", generation, err);
                }
                if let Ok(loaded) = result {
                    // Let the store tell why this load is stale
                    if let Err(err) = self.store.apply_load(loaded) {
                        log::debug!("{}", err);
                    }
                }
                return false;
            },
        };
        self.in_flight = None;

        match result.and_then(|loaded| self.store.apply_load(loaded)) {
            Err(err) => {
                self.report(&err, locale::LOAD_FAILED);
                false
            },
            Ok(()) => {
                self.offset = target;
                self.render();
                true
            },
        }
    }


    /// Create a task. Returns the tasks the server created, or `None` in case of failure
    pub async fn create_task(&mut self, new_task: NewTask) -> Option<Vec<Task>> {
        match self.store.create(new_task).await {
            Err(err) => {
                let message = if err.is_missing_title() { locale::TITLE_REQUIRED } else { locale::CREATE_FAILED };
                self.report(&err, message);
                None
            },
            Ok(created) => {
                self.render();
                self.presenter.notify(locale::TASK_CREATED, NotificationKind::Success);
                Some(created)
            },
        }
    }

    /// Edit a task (e.g. from the edit form). Returns the updated task, or `None` in case of failure
    pub async fn update_task(&mut self, key: &TaskKey, patch: &TaskPatch) -> Option<Task> {
        match self.store.update(key, patch).await {
            Err(err) => {
                let message = if err.is_missing_title() { locale::TITLE_REQUIRED } else { locale::UPDATE_FAILED };
                self.report(&err, message);
                None
            },
            Ok(task) => {
                self.render();
                self.presenter.notify(locale::TASK_UPDATED, NotificationKind::Success);
                Some(task)
            },
        }
    }

    /// Flip the completion checkbox of a task
    pub async fn toggle_task(&mut self, key: &TaskKey) -> Option<Task> {
        match self.store.toggle_done(key).await {
            Err(err) => {
                self.report(&err, locale::UPDATE_FAILED);
                None
            },
            Ok(task) => {
                self.render();
                Some(task)
            },
        }
    }

    /// Ask for a deletion. It will only happen on [`Self::confirm_delete`]
    pub fn request_delete(&mut self, key: TaskKey) {
        self.store.request_delete(key);
    }

    pub fn cancel_delete(&mut self) -> Option<TaskKey> {
        self.store.cancel_delete()
    }

    /// Delete the task that is waiting for a confirmation.
    ///
    /// Returns `false` in case of failure. Confirming while nothing is pending does nothing, and succeeds.
    pub async fn confirm_delete(&mut self) -> bool {
        match self.store.confirm_delete().await {
            Err(err) => {
                self.report(&err, locale::DELETE_FAILED);
                false
            },
            Ok(None) => true,
            Ok(Some(_key)) => {
                self.render();
                self.presenter.notify(locale::TASK_DELETED, NotificationKind::Success);
                true
            },
        }
    }


    /// Hand the displayed week to the presenter
    pub fn render(&mut self) {
        let grouping = self.store.grouping();
        self.presenter.render(&grouping);
        self.presenter.render_weekly_list(&grouping.weekly);
    }

    fn report(&mut self, err: &Error, message: &str) {
        if err.is_user_visible() == false {
            log::debug!("{}", err);
            return;
        }
        log::error!("{}: {}", message, err);
        self.presenter.notify(message, NotificationKind::Error);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::mock_api::{ApiCall, MockTaskApi};
    use crate::mock_behaviour::MockBehaviour;
    use crate::scope::Scope;
    use crate::store::WindowGrouping;

    #[derive(Default)]
    struct Recorder {
        rendered: Vec<WindowGrouping>,
        notifications: Vec<(String, NotificationKind)>,
    }

    impl Presenter for Recorder {
        fn render(&mut self, grouping: &WindowGrouping) {
            self.rendered.push(grouping.clone());
        }
        fn render_weekly_list(&mut self, _tasks: &[Task]) {}
        fn notify(&mut self, message: &str, kind: NotificationKind) {
            self.notifications.push((message.to_string(), kind));
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session() -> PlannerSession<MockTaskApi, Recorder> {
        let api = MockTaskApi::new();
        api.seed("Run", Scope::Daily, date(2025, 5, 6), false);
        api.seed("Plan the trip", Scope::Daily, date(2025, 5, 13), false);
        let clock = Clock::Fixed(date(2025, 5, 7).and_hms_opt(9, 30, 0).unwrap());
        PlannerSession::with_clock(api, Recorder::default(), clock)
    }

    #[tokio::test]
    async fn navigation_moves_the_offset_only_on_success() {
        let mut session = session();
        assert!(session.refresh().await);
        assert_eq!(session.presenter().rendered.last().unwrap().range_label, "5—11 мая 2025");

        assert!(session.next_week().await);
        assert_eq!(session.offset(), WeekOffset::new(1));
        assert_eq!(session.presenter().rendered.last().unwrap().task_count(), 1);

        session.store().api().set_behaviour(MockBehaviour::fail_now(1));
        assert!(session.next_week().await == false);
        assert_eq!(session.offset(), WeekOffset::new(1));
        assert_eq!(session.window().week_start(), date(2025, 5, 12));
        assert_eq!(session.presenter().notifications.last().unwrap(), &(locale::LOAD_FAILED.to_string(), NotificationKind::Error));

        assert!(session.current_week().await);
        assert_eq!(session.offset(), WeekOffset::current());
    }

    #[tokio::test]
    async fn current_week_does_not_reload_needlessly() {
        let mut session = session();
        assert!(session.refresh().await);
        session.store().api().clear_calls();

        assert!(session.current_week().await);
        assert!(session.store().api().calls().is_empty());
    }

    #[tokio::test]
    async fn current_week_follows_the_clock() {
        let mut session = session();
        let sunday_night = date(2025, 5, 11).and_hms_opt(23, 59, 0).unwrap();
        session.set_clock(Clock::Fixed(sunday_night));
        assert!(session.refresh().await);
        assert_eq!(session.window().week_start(), date(2025, 5, 5));
        session.store().api().clear_calls();

        // The page stays open past midnight
        session.set_clock(Clock::Fixed(date(2025, 5, 12).and_hms_opt(0, 1, 0).unwrap()));
        assert!(session.current_week().await);
        assert_eq!(session.store().api().calls().len(), 2);
        assert_eq!(session.window().week_start(), date(2025, 5, 12));
        assert_eq!(session.window().today().map(|slot| slot.date()), Some(date(2025, 5, 12)));
        assert_eq!(session.presenter().rendered.last().unwrap().task_count(), 1);
    }

    #[tokio::test]
    async fn empty_titles_in_edits_ask_for_a_title() {
        let mut session = session();
        assert!(session.refresh().await);
        let key = TaskKey::new(Scope::Daily, 1u64);

        assert!(session.update_task(&key, &TaskPatch::default().title(" ")).await.is_none());
        assert!(session.update_task(&key, &TaskPatch::default().anchor_date(date(2025, 5, 13)).title("Run")).await.is_some());
        let messages: Vec<&str> = session.presenter().notifications.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(messages, vec![locale::TITLE_REQUIRED, locale::TASK_UPDATED]);
    }

    #[tokio::test]
    async fn superseded_navigations_are_silent() {
        let mut session = session();
        let first = session.begin_navigation(WeekOffset::new(1));
        let second = session.begin_navigation(WeekOffset::new(2));
        let (g1, g2) = (first.generation(), second.generation());

        let api = MockTaskApi::new();
        let (first, second) = tokio::join!(first.fetch(&api), second.fetch(&api));

        assert!(session.finish_navigation(g2, second));
        assert!(session.finish_navigation(g1, first) == false);
        assert_eq!(session.offset(), WeekOffset::new(2));
        assert!(session.presenter().notifications.is_empty());
    }

    #[tokio::test]
    async fn empty_titles_ask_for_a_title() {
        let mut session = session();
        assert!(session.create_task(NewTask::new("", Scope::Daily, date(2025, 5, 6))).await.is_none());
        assert_eq!(session.presenter().notifications, vec![(locale::TITLE_REQUIRED.to_string(), NotificationKind::Error)]);
        assert!(session.store().api().calls().is_empty());
    }

    #[tokio::test]
    async fn operations_notify_their_outcome() {
        let mut session = session();
        assert!(session.refresh().await);

        let created = session.create_task(NewTask::new("Stretch", Scope::Weekly, date(2025, 5, 5))).await.unwrap();
        let key = created[0].key();
        assert_eq!(session.presenter().rendered.last().unwrap().weekly.len(), 1);

        let toggled = session.toggle_task(&key).await.unwrap();
        assert!(toggled.is_done());
        assert_eq!(session.presenter().rendered.last().unwrap().week_stats.points(), 1);

        session.store().api().set_behaviour(MockBehaviour::reject_now(1, 403));
        session.request_delete(key.clone());
        assert!(session.confirm_delete().await == false);
        assert_eq!(session.store().pending_delete(), Some(&key));

        assert!(session.confirm_delete().await);
        assert!(session.store().get(&key).is_none());

        let messages: Vec<&str> = session.presenter().notifications.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(messages, vec![locale::TASK_CREATED, locale::DELETE_FAILED, locale::TASK_DELETED]);
        assert!(session.store().api().calls().contains(&ApiCall::DeleteTask(key)));
    }
}
