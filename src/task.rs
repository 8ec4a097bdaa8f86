//! Daily and weekly to-do tasks

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, InvalidInput, Result};
use crate::scope::Scope;


/// The identifier the server gave to a task.
///
/// It is opaque to this crate. Servers usually send integers, but strings are accepted as well.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// The numeric value of this id, if it is written as a canonical integer
    fn as_number(&self) -> Option<u64> {
        self.content.parse::<u64>().ok()
            .filter(|n| n.to_string() == self.content)
    }
}

impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TaskId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        Self { content: n.to_string() }
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

/// Numeric ids come first, sorted numerically (so that "9" comes before "10").
/// Other ids come after them, sorted alphabetically
impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(l), Some(r)) => l.cmp(&r),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.content.cmp(&other.content),
        }
    }
}
impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Used to support serde
impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_number() {
            Some(n) => serializer.serialize_u64(n),
            None => serializer.serialize_str(&self.content),
        }
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<TaskId, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(TaskId::from(n)),
            RawId::Text(s) => Ok(TaskId::from(s)),
        }
    }
}


/// Identifies a task among both daily and weekly tasks.
///
/// Daily and weekly tasks are stored in different server collections, so that an id is only unique within its scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey {
    pub scope: Scope,
    pub id: TaskId,
}

impl TaskKey {
    pub fn new<I: Into<TaskId>>(scope: Scope, id: I) -> Self {
        Self { scope, id: id.into() }
    }
}

impl Display for TaskKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.scope, self.id)
    }
}


/// A to-do task, as known by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireTask", into = "WireTask")]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    is_done: bool,
    scope: Scope,
    /// The day of a daily task, or the Monday of a weekly task
    anchor_date: NaiveDate,
}

impl Task {
    /// Create a Task instance.
    /// This does not create anything on the server: only the server hands out ids.
    pub fn new_with_parameters(id: TaskId, title: String, description: Option<String>, is_done: bool,
                               scope: Scope, anchor_date: NaiveDate) -> Self
    {
        Self {
            id,
            title,
            description: description.filter(|d| d.trim().is_empty() == false),
            is_done,
            scope,
            anchor_date,
        }
    }

    pub fn id(&self) -> &TaskId            { &self.id          }
    pub fn title(&self) -> &str            { &self.title       }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn is_done(&self) -> bool          { self.is_done      }
    pub fn scope(&self) -> Scope           { self.scope        }
    pub fn anchor_date(&self) -> NaiveDate { self.anchor_date  }

    pub fn key(&self) -> TaskKey {
        TaskKey { scope: self.scope, id: self.id.clone() }
    }

    /// A copy of this task, with its completion status flipped
    pub fn toggled(&self) -> Self {
        Self { is_done: !self.is_done, ..self.clone() }
    }
}


/// The JSON shape of a task: `{id, title, description, is_done, date | week_start}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireTask {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
}

impl WireTask {
    /// Convert into a Task, when the scope is known from the endpoint that returned it.
    ///
    /// The anchor field of this scope is preferred, but the other one is accepted as well.
    pub fn into_task(self, scope: Scope) -> Result<Task> {
        let anchor = match scope {
            Scope::Daily => self.date.or(self.week_start),
            Scope::Weekly => self.week_start.or(self.date),
        };
        let anchor = anchor.ok_or_else(|| {
            Error::InvalidResponse(serde::de::Error::custom(
                format!("{} task {} has no {} field", scope, self.id, scope.anchor_field())
            ))
        })?;
        Ok(Task::new_with_parameters(self.id, self.title, self.description, self.is_done, scope, anchor))
    }
}

impl TryFrom<WireTask> for Task {
    type Error = String;

    /// The scope is guessed from the anchor field
    fn try_from(wire: WireTask) -> std::result::Result<Self, Self::Error> {
        let scope = match (&wire.date, &wire.week_start) {
            (Some(_), None) => Scope::Daily,
            (None, Some(_)) => Scope::Weekly,
            (Some(_), Some(_)) => return Err(format!("task {} has both a date and a week_start", wire.id)),
            (None, None) => return Err(format!("task {} has neither a date nor a week_start", wire.id)),
        };
        wire.into_task(scope).map_err(|err| err.to_string())
    }
}

impl From<Task> for WireTask {
    fn from(task: Task) -> Self {
        let (date, week_start) = match task.scope {
            Scope::Daily => (Some(task.anchor_date), None),
            Scope::Weekly => (None, Some(task.anchor_date)),
        };
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            is_done: task.is_done,
            date,
            week_start,
        }
    }
}


/// What the user fills in to create a task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub scope: Scope,
    pub anchor_date: NaiveDate,
}

impl NewTask {
    pub fn new<S: ToString>(title: S, scope: Scope, anchor_date: NaiveDate) -> Self {
        Self { title: title.to_string(), description: None, scope, anchor_date }
    }

    pub fn with_description<S: ToString>(mut self, description: S) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Checks this can be sent to the server
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        self.scope.validate_anchor(self.anchor_date)
    }

    /// The body of a creation request
    pub fn to_wire(&self) -> CreateTaskBody {
        CreateTaskBody {
            title: self.title.trim().to_string(),
            description: self.description.clone().unwrap_or_default(),
            date: self.anchor_date,
            is_done: false,
        }
    }
}

/// The JSON body of a creation request. Both scopes use the `date` field here
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskBody {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub is_done: bool,
}


/// Changes to apply to an existing task. `None` fields are left untouched
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    /// An empty description removes the current one
    pub description: Option<String>,
    pub is_done: Option<bool>,
    pub anchor_date: Option<NaiveDate>,
}

impl TaskPatch {
    pub fn title<S: ToString>(mut self, title: S) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn description<S: ToString>(mut self, description: S) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn done(mut self, is_done: bool) -> Self {
        self.is_done = Some(is_done);
        self
    }

    pub fn anchor_date(mut self, anchor_date: NaiveDate) -> Self {
        self.anchor_date = Some(anchor_date);
        self
    }

    /// Checks this patch can be applied to a task of this scope
    pub fn validate(&self, scope: Scope) -> Result<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(anchor_date) = self.anchor_date {
            scope.validate_anchor(anchor_date)?;
        }
        Ok(())
    }

    /// Returns `base` with this patch applied, after checking the result is valid
    pub fn apply_to(&self, base: &Task) -> Result<Task> {
        self.validate(base.scope)?;
        let title = match &self.title {
            Some(t) => t.trim().to_string(),
            None => base.title.clone(),
        };
        let anchor_date = self.anchor_date.unwrap_or(base.anchor_date);

        Ok(Task::new_with_parameters(
            base.id.clone(),
            title,
            self.description.clone().or_else(|| base.description.clone()),
            self.is_done.unwrap_or(base.is_done),
            base.scope,
            anchor_date,
        ))
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(InvalidInput::MissingTitle.into());
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ids_from_numbers_or_strings() {
        let numeric: TaskId = serde_json::from_str("42").unwrap();
        let textual: TaskId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(numeric, textual);
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "42");

        let opaque: TaskId = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(serde_json::to_string(&opaque).unwrap(), "\"a1b2\"");
    }

    #[test]
    fn numeric_ids_sort_numerically() {
        let mut ids: Vec<TaskId> = vec!["10".into(), "9".into(), "100".into(), "abc".into()];
        ids.sort();
        let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["9", "10", "100", "abc"]);
    }

    #[test]
    fn mixed_ids_are_totally_ordered() {
        let (a, b, c) = (TaskId::from("9"), TaskId::from("10"), TaskId::from("1a"));
        assert!(a < b && b < c && a < c);

        // Big enough for the sort to check its comparisons
        let mut ids: Vec<TaskId> = (0..40u64).rev()
            .flat_map(|n| vec![TaskId::from(n), TaskId::from(format!("{}a", n)), TaskId::from(format!("0{}", n))])
            .collect();
        ids.sort();

        for pair in ids.windows(2) {
            assert!(pair[0] <= pair[1], "{} > {}", pair[0], pair[1]);
        }
        let numeric: Vec<&str> = ids.iter().take(40).map(|id| id.as_str()).collect();
        let expected: Vec<String> = (0..40u64).map(|n| n.to_string()).collect();
        assert_eq!(numeric, expected);
        assert_eq!(ids[40].as_str(), "00");
        assert_eq!(ids.last().map(|id| id.as_str()), Some("9a"));
    }

    #[test]
    fn scope_is_inferred_from_the_anchor_field() {
        let daily: Task = serde_json::from_str(r#"{"id": 3, "title": "Run", "description": "", "is_done": true, "date": "2025-05-06"}"#).unwrap();
        assert_eq!(daily.scope(), Scope::Daily);
        assert_eq!(daily.anchor_date(), date(2025, 5, 6));
        assert_eq!(daily.description(), None);
        assert!(daily.is_done());

        let weekly: Task = serde_json::from_str(r#"{"id": 3, "title": "Read", "week_start": "2025-05-05"}"#).unwrap();
        assert_eq!(weekly.scope(), Scope::Weekly);
        assert!(weekly.key() != daily.key());

        assert!(serde_json::from_str::<Task>(r#"{"id": 1, "title": "?"}"#).is_err());
    }

    #[test]
    fn serialized_tasks_use_the_scope_anchor_field() {
        let task = Task::new_with_parameters(7u64.into(), "Read".into(), Some("two chapters".into()), false, Scope::Weekly, date(2025, 5, 5));
        let json: serde_json::Value = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["week_start"], "2025-05-05");
        assert!(json.get("date").is_none());
    }

    #[test]
    fn scoped_decoding_accepts_either_field() {
        let wire: WireTask = serde_json::from_str(r#"{"id": "5", "title": "Plan", "date": "2025-05-05"}"#).unwrap();
        let task = wire.into_task(Scope::Weekly).unwrap();
        assert_eq!(task.scope(), Scope::Weekly);
        assert_eq!(task.anchor_date(), date(2025, 5, 5));
    }

    #[test]
    fn new_task_validation() {
        assert!(matches!(NewTask::new("", Scope::Daily, date(2025, 5, 6)).validate(), Err(Error::Validation(_))));
        assert!(matches!(NewTask::new("   ", Scope::Daily, date(2025, 5, 6)).validate(), Err(Error::Validation(_))));
        assert!(matches!(NewTask::new("Plan", Scope::Weekly, date(2025, 5, 6)).validate(), Err(Error::Validation(_))));
        assert!(NewTask::new("Plan", Scope::Weekly, date(2025, 5, 5)).validate().is_ok());

        let body = NewTask::new(" Run ", Scope::Daily, date(2025, 5, 6)).with_description("5 km").to_wire();
        assert_eq!(body, CreateTaskBody { title: "Run".into(), description: "5 km".into(), date: date(2025, 5, 6), is_done: false });
    }

    #[test]
    fn patches() {
        let task = Task::new_with_parameters(1u64.into(), "Run".into(), Some("5 km".into()), false, Scope::Daily, date(2025, 5, 6));

        let patched = TaskPatch::default().title("Swim").done(true).apply_to(&task).unwrap();
        assert_eq!(patched.title(), "Swim");
        assert_eq!(patched.description(), Some("5 km"));
        assert!(patched.is_done());
        assert_eq!(patched.key(), task.key());

        let cleared = TaskPatch::default().description("").apply_to(&task).unwrap();
        assert_eq!(cleared.description(), None);

        assert!(TaskPatch::default().title(" ").apply_to(&task).is_err());
        assert_eq!(task.toggled().toggled(), task);
    }
}
