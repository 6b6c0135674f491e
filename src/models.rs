use crate::error::{Result, TaskError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Numeric codes accepted for a priority, checked before names
const PRIORITY_CODES: [(&str, TaskPriority); 4] = [
    ("1", TaskPriority::Low),
    ("2", TaskPriority::Medium),
    ("3", TaskPriority::High),
    ("4", TaskPriority::Urgent),
];

/// Canonical priority names
const PRIORITY_NAMES: [(&str, TaskPriority); 4] = [
    ("low", TaskPriority::Low),
    ("medium", TaskPriority::Medium),
    ("high", TaskPriority::High),
    ("urgent", TaskPriority::Urgent),
];

/// Task priority, ordered from least to most pressing
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn code(&self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
            TaskPriority::Urgent => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        PRIORITY_CODES
            .iter()
            .map(|(_, p)| *p)
            .find(|p| p.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        PRIORITY_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| *p)
    }

    /// Lenient lookup: numeric code first, then name. `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        PRIORITY_CODES
            .iter()
            .chain(PRIORITY_NAMES.iter())
            .find(|(key, _)| *key == s)
            .map(|(_, p)| *p)
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        TaskPriority::parse(s).ok_or_else(|| TaskError::InvalidPriority(s.to_string()))
    }
}

/// Task lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(TaskError::InvalidStatus(s.to_string())),
        }
    }
}

/// A task, as held by any one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tasks keyed by id, one map per source
pub type TaskMap = HashMap<String, Task>;

impl Task {
    /// Create a task with a freshly generated id
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, now)
    }

    /// Rebuild a task whose id was assigned elsewhere
    pub fn with_id(id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            description: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            due_date: None,
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, TaskStatus::Done)
    }

    /// Due at or before `now`, whatever the status
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due <= now)
    }

    /// Advance `updated_at`. Never moves it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Apply a patch, bumping `updated_at` only if something changed
    pub fn apply(&mut self, update: &TaskUpdate, now: DateTime<Utc>) -> bool {
        let before = self.clone();

        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        for tag in &update.remove_tags {
            self.tags.remove(tag);
        }
        self.tags.extend(update.add_tags.iter().cloned());

        let changed = !self.same_content(&before);
        if changed {
            self.touch(now);
        }
        changed
    }

    /// Compare user-visible fields, ignoring id and timestamps
    pub fn same_content(&self, other: &Task) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.priority == other.priority
            && self.status == other.status
            && self.due_date == other.due_date
            && self.tags == other.tags
    }
}

/// Partial update for a task
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

/// Serialize a task map as a JSON array ordered by id
pub fn tasks_to_json(tasks: &TaskMap) -> Result<String> {
    let mut ordered: Vec<&Task> = tasks.values().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(serde_json::to_string_pretty(&ordered)?)
}

/// Load a task map from a JSON array of tasks
pub fn tasks_from_json(json: &str) -> Result<TaskMap> {
    let tasks: Vec<Task> = serde_json::from_str(json)?;
    let mut map = TaskMap::with_capacity(tasks.len());
    for task in tasks {
        if map.contains_key(&task.id) {
            return Err(TaskError::DuplicateTaskId(task.id));
        }
        map.insert(task.id.clone(), task);
    }
    Ok(map)
}
