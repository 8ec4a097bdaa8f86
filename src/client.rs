//! This module provides a client to connect to the task server

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config;
use crate::error::{Error, InvalidInput, Result};
use crate::scope::Scope;
use crate::task::{NewTask, Task, TaskKey, WireTask};
use crate::traits::TaskApi;

/// How much of an error body is kept in error messages
const MAX_ERROR_BODY_LEN: usize = 200;

/// The JSON answer of listings and creations
#[derive(Debug, Deserialize)]
struct TaskList {
    tasks: Vec<WireTask>,
}


/// A task source that fetches its data from the task server
#[derive(Debug)]
pub struct Client {
    base_url: Url,
    csrf_token: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection.
    ///
    /// `base_url` is the root of the task API (e.g. `https://my.server.com/api/`).
    /// `csrf_token` is the token embedded in the page, that the server expects on every mutating request.
    pub fn new<S: AsRef<str>>(base_url: S, csrf_token: Option<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())
            .map_err(|err| InvalidInput::InvalidUrl { url: base_url.as_ref().to_string(), reason: err.to_string() })?;
        if base_url.path().ends_with('/') == false {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config::request_timeout())
            .build()?;

        Ok(Self { base_url, csrf_token, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `tasks/{scope}/{tail}` on top of the base URL
    fn endpoint(&self, scope: Scope, tail: &str) -> Result<Url> {
        let path = format!("tasks/{}/{}", scope.path_segment(), tail);
        self.base_url.join(&path)
            .map_err(|err| InvalidInput::InvalidUrl { url: path, reason: err.to_string() }.into())
    }

    fn week_url(&self, scope: Scope, week_start: NaiveDate) -> Result<Url> {
        let mut url = self.endpoint(scope, "week/")?;
        url.query_pairs_mut().append_pair("start", &week_start.format("%Y-%m-%d").to_string());
        Ok(url)
    }

    fn task_url(&self, key: &TaskKey, action: Option<&str>) -> Result<Url> {
        let tail = match action {
            None => format!("{}/", key.id),
            Some(action) => format!("{}/{}/", key.id, action),
        };
        self.endpoint(key.scope, &tail)
    }

    /// A POST request, with the JSON and CSRF headers
    fn post(&self, url: Url) -> RequestBuilder {
        let request = self.http
            .post(url)
            .header(CONTENT_TYPE, "application/json");

        match &self.csrf_token {
            Some(token) => request.header(config::csrf_header_name(), token.as_str()),
            None => {
                log::warn!("No CSRF token is set, the server will probably reject this request");
                request
            },
        }
    }

    /// Send a request, and return its body in case the server answered with a 2xx status
    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() == false {
            log::debug!("Server answered {}: {}", status, text);
            return Err(Error::Server {
                status: status.as_u16(),
                message: text.chars().take(MAX_ERROR_BODY_LEN).collect(),
            });
        }
        Ok(text)
    }
}

fn to_json<T: Serialize>(body: &T) -> Result<String> {
    serde_json::to_string(body).map_err(Error::InvalidRequest)
}

fn parse_task(text: &str, scope: Scope) -> Result<Task> {
    let wire: WireTask = serde_json::from_str(text)?;
    wire.into_task(scope)
}

fn parse_task_list(text: &str, scope: Scope) -> Result<Vec<Task>> {
    let list: TaskList = serde_json::from_str(text)?;
    list.tasks.into_iter()
        .map(|wire| wire.into_task(scope))
        .collect()
}

#[async_trait]
impl TaskApi for Client {
    async fn list_week(&self, scope: Scope, week_start: NaiveDate) -> Result<Vec<Task>> {
        let url = self.week_url(scope, week_start)?;
        log::debug!("Listing {}", url);
        let text = self.send(self.http.get(url)).await?;
        parse_task_list(&text, scope)
    }

    async fn get_task(&self, key: &TaskKey) -> Result<Task> {
        let url = self.task_url(key, None)?;
        let text = self.send(self.http.get(url)).await?;
        parse_task(&text, key.scope)
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Vec<Task>> {
        let url = self.endpoint(new_task.scope, "create/")?;
        let body = to_json(&new_task.to_wire())?;
        let text = self.send(self.post(url).body(body)).await?;
        parse_task_list(&text, new_task.scope)
    }

    async fn update_task(&self, task: &Task) -> Result<Task> {
        let url = self.task_url(&task.key(), Some("update"))?;
        let body = to_json(task)?;
        let text = self.send(self.post(url).body(body)).await?;
        parse_task(&text, task.scope())
    }

    async fn delete_task(&self, key: &TaskKey) -> Result<()> {
        let url = self.task_url(key, Some("delete"))?;
        // The body is an acknowledgement at best, it is not checked
        let _ack = self.send(self.post(url)).await?;
        Ok(())
    }
}
