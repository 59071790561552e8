// Terminal rendering of projections

use crate::filter::Filter;
use crate::models::{Priority, Stats, Todo};
use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};

/// Make untrusted text safe to print: control characters (newlines, ANSI
/// escape introducers) are shown escaped instead of being interpreted
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn priority_label(priority: Priority) -> ColoredString {
    let label = format!("{:<6}", priority.as_str());
    match priority {
        Priority::Low => label.as_str().green(),
        Priority::Medium => label.as_str().yellow(),
        Priority::High => label.as_str().red().bold(),
    }
}

/// Short local date, e.g. "Mar 1"
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%b %-d").to_string()
}

pub fn render_todo(todo: &Todo) -> String {
    let check = if todo.completed { "[x]" } else { "[ ]" };
    let text = escape_text(&todo.text);
    let text = if todo.completed {
        text.as_str().dimmed().strikethrough()
    } else {
        text.as_str().normal()
    };
    format!(
        "{} {} {} {:>6} {}",
        check,
        todo.id.to_string().as_str().cyan(),
        priority_label(todo.priority),
        format_date(todo.created_at),
        text
    )
}

/// One line per todo, or the filter's empty-state message
pub fn render_projection(todos: &[&Todo], filter: Filter) -> String {
    if todos.is_empty() {
        return filter.empty_message().dimmed().to_string();
    }
    todos.iter().map(|t| render_todo(t)).collect::<Vec<_>>().join("\n")
}

pub fn render_stats(stats: Stats) -> String {
    format!("{} total, {} done", stats.total, stats.completed)
}
