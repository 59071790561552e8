// Data models for TodoStore

use chrono::{DateTime, Local, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A single todo item
///
/// Field names serialize in camelCase so lists exported by the browser
/// version of the app load without conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Build a pending todo. `text` is expected to be trimmed and non-empty.
    pub fn new(id: i64, text: impl Into<String>, priority: Priority, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            priority,
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Flip completion, keeping `completed_at` in step with `completed`
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
    }

    /// True if this todo was created on `day` in the local timezone
    pub fn created_on(&self, day: NaiveDate) -> bool {
        self.created_at.with_timezone(&Local).date_naive() == day
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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
            other => Err(format!("invalid priority: {} (expected low, medium or high)", other)),
        }
    }
}

/// Counts shown next to the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
}

impl Stats {
    pub fn pending(&self) -> usize {
        self.total - self.completed
    }
}

/// Hands out todo ids
///
/// Ids start from the wall clock in milliseconds but never repeat: a request
/// in the same millisecond as the previous one (or after the clock stepped
/// back) gets `last + 1`. Once `i64::MAX` has been handed out or observed the
/// generator is exhausted and returns `None`.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Make sure future ids are greater than `id`
    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }

    pub fn next_id(&mut self) -> Option<i64> {
        self.next_at(now_ms())
    }

    pub fn next_at(&mut self, now_ms: i64) -> Option<i64> {
        self.last = now_ms.max(self.last.checked_add(1)?);
        Some(self.last)
    }
}

/// Smallest positive id not in `used`
pub fn lowest_unused_id(used: &HashSet<i64>) -> i64 {
    let mut id = 1;
    while used.contains(&id) {
        id += 1;
    }
    id
}

/// Current UTC time truncated to milliseconds
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
