// Projection filters for the todo list

use crate::models::Todo;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Which todos a projection keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Pending,
    Done,
    Today, // created on the current local calendar day
}

impl Filter {
    pub fn matches(self, todo: &Todo, today: NaiveDate) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !todo.completed,
            Filter::Done => todo.completed,
            Filter::Today => todo.created_on(today),
        }
    }

    /// Text shown when the projection comes back empty
    pub fn empty_message(self) -> &'static str {
        match self {
            Filter::All => "Nothing to do. Add your first todo!",
            Filter::Pending => "All done, nothing pending!",
            Filter::Done => "Nothing completed yet.",
            Filter::Today => "Nothing added today.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Pending => "pending",
            Filter::Done => "done",
            Filter::Today => "today",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "pending" => Ok(Filter::Pending),
            "done" => Ok(Filter::Done),
            "today" => Ok(Filter::Today),
            other => Err(format!(
                "invalid filter: {} (expected all, pending, done or today)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{Local, TimeZone, Utc};

    fn todo_created_at_local(y: i32, m: u32, d: u32, h: u32) -> Todo {
        let created = Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().with_timezone(&Utc);
        Todo::new(1, "item", Priority::Medium, created)
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
        assert_eq!("Pending".parse::<Filter>().unwrap(), Filter::Pending);
        assert_eq!("DONE".parse::<Filter>().unwrap(), Filter::Done);
        assert_eq!("today".parse::<Filter>().unwrap(), Filter::Today);
        assert!("someday".parse::<Filter>().is_err());
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(Filter::Pending.to_string(), "pending");
        assert_eq!(Filter::default().to_string(), "all");
    }

    #[test]
    fn test_completion_filters() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut todo = todo_created_at_local(2024, 3, 1, 9);

        assert!(Filter::All.matches(&todo, day));
        assert!(Filter::Pending.matches(&todo, day));
        assert!(!Filter::Done.matches(&todo, day));

        todo.toggle(Utc::now());
        assert!(!Filter::Pending.matches(&todo, day));
        assert!(Filter::Done.matches(&todo, day));
    }

    #[test]
    fn test_today_uses_local_calendar_day() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert!(Filter::Today.matches(&todo_created_at_local(2024, 3, 1, 0), day));
        assert!(Filter::Today.matches(&todo_created_at_local(2024, 3, 1, 23), day));
        assert!(!Filter::Today.matches(&todo_created_at_local(2024, 2, 29, 23), day));
        assert!(!Filter::Today.matches(&todo_created_at_local(2024, 3, 2, 0), day));
    }
}
