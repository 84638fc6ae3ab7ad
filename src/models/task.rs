use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `priority_level` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "priority_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority level: {}", other)),
        }
    }
}

/// Input structure for creating or updating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 500))]
    pub text: String,

    #[validate(length(min = 1, max = 50))]
    pub category: String,

    /// When the task is due.
    pub date: DateTime<Utc>,

    pub priority_level: Priority,

    #[serde(default)]
    pub completed: bool,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub priority_level: Priority,
    pub completed: bool,
    /// Identifier of the owning user.
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task ready to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub text: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub priority_level: Priority,
    pub completed: bool,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTask {
    /// Builds an insertable task owned by `user_id`, stamped with `now`.
    pub fn new(input: TaskInput, user_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            text: input.text,
            category: input.category,
            date: input.date,
            priority_level: input.priority_level,
            completed: input.completed,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_task(self, id: i64) -> Task {
        Task {
            id,
            text: self.text,
            category: self.category,
            date: self.date,
            priority_level: self.priority_level,
            completed: self.completed,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Task {
    /// Replaces every mutable field with `input` and refreshes `updated_at`.
    /// Identity, owner and `created_at` are kept.
    pub fn apply(&mut self, input: TaskInput, now: DateTime<Utc>) {
        self.text = input.text;
        self.category = input.category;
        self.date = input.date;
        self.priority_level = input.priority_level;
        self.completed = input.completed;
        self.updated_at = now;
    }
}

/// Optional narrowing of an owner's task listing. Every `None` leaves that dimension unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub category: Option<String>,
    pub priority_level: Option<Priority>,
    /// Case-insensitive substring matched against the task text.
    pub keyword: Option<String>,
}

impl TaskFilter {
    /// Builds a filter from raw query values. Values are trimmed; blank ones count as absent.
    ///
    /// Returns an error for a priority that is present but not a known level.
    pub fn new(
        category: Option<&str>,
        priority_level: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<Self, String> {
        let priority_level = match non_blank(priority_level) {
            Some(raw) => Some(raw.parse::<Priority>()?),
            None => None,
        };

        Ok(Self {
            category: non_blank(category).map(str::to_string),
            priority_level,
            keyword: non_blank(keyword).map(str::to_string),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.priority_level.is_none() && self.keyword.is_none()
    }

    /// Whether `task` passes every present predicate.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(category) = &self.category {
            if &task.category != category {
                return false;
            }
        }
        if let Some(priority) = self.priority_level {
            if task.priority_level != priority {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if !task.text.to_lowercase().contains(&keyword.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
