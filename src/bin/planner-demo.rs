//! This is an example of how week-planner can be used
//!
//! Without arguments, this runs against an in-memory task server.
//! With `planner-demo <base URL> [<CSRF token>]`, this displays the current week of a real server.

use chrono::NaiveDate;

use week_planner::client::Client;
use week_planner::mock_api::MockTaskApi;
use week_planner::session::PlannerSession;
use week_planner::traits::TaskApi;
use week_planner::utils::TextPresenter;
use week_planner::{DayWindow, NewTask, Scope, TaskPatch, WeekOffset};


#[tokio::main]
async fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(base_url) => {
            let client = match Client::new(&base_url, args.next()) {
                Ok(client) => client,
                Err(err) => {
                    log::error!("Unable to create a client: {}", err);
                    std::process::exit(1);
                },
            };
            let mut session = PlannerSession::new(client, TextPresenter::stdout());
            if session.refresh().await == false {
                std::process::exit(1);
            }
        },
        None => demo_with_mock().await,
    }
}

async fn demo_with_mock() {
    println!("This demo drives a planner session against an in-memory task server.");
    println!("You can set the RUST_LOG environment variable to display more info about what happens.");
    println!();

    let monday = DayWindow::current(WeekOffset::current()).week_start();
    let api = MockTaskApi::new();
    api.seed("Morning run", Scope::Daily, monday, true);
    api.seed("Call the plumber", Scope::Daily, monday.succ_opt().unwrap_or(monday), false);
    api.seed("Read a chapter", Scope::Weekly, monday, false);

    let mut session = PlannerSession::new(api, TextPresenter::stdout());
    run_scenario(&mut session, monday).await;
}

async fn run_scenario<A: TaskApi>(session: &mut PlannerSession<A, TextPresenter<std::io::Stdout>>, monday: NaiveDate) {
    println!("---- Loading the current week -----");
    session.refresh().await;

    println!("---- Creating a task -----");
    let new_task = NewTask::new("Buy groceries", Scope::Daily, monday).with_description("milk, bread");
    let created = session.create_task(new_task).await.unwrap_or_default();

    println!("---- Toggling it -----");
    for task in &created {
        session.toggle_task(&task.key()).await;
    }

    println!("---- Renaming the weekly task -----");
    let weekly_key = session.store().tasks()
        .find(|task| task.scope() == Scope::Weekly)
        .map(|task| task.key());
    if let Some(key) = &weekly_key {
        session.update_task(key, &TaskPatch::default().title("Read two chapters")).await;
    }

    println!("---- Next week, then back -----");
    session.next_week().await;
    session.current_week().await;

    println!("---- Deleting the weekly task -----");
    if let Some(key) = weekly_key {
        session.request_delete(key);
        session.confirm_delete().await;
    }
}
