// Todo store: an ordered list of todos persisted to a single slot

use crate::error::ImportError;
use crate::filter::Filter;
use crate::models::{IdGenerator, Priority, Stats, Todo, lowest_unused_id, now};
use crate::slot::Slot;
use chrono::{DateTime, Local, NaiveDate, Utc};
use eyre::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// In-memory todo list, written through to its slot after every mutation
///
/// Storage order is insertion order with the newest todo first. Display order
/// comes from [`TodoStore::project`] and never changes the stored order.
pub struct TodoStore<S: Slot> {
    slot: S,
    todos: Vec<Todo>,
    ids: IdGenerator,
}

impl<S: Slot> TodoStore<S> {
    /// Open a store on `slot`, loading whatever it holds
    ///
    /// Never fails: a missing, unreadable or corrupt slot gives an empty list.
    pub fn open(slot: S) -> Self {
        let mut store = Self {
            slot,
            todos: Vec::new(),
            ids: IdGenerator::default(),
        };
        store.load();
        store
    }

    /// Reload the list from the slot, falling back to an empty list
    ///
    /// Entries that are not todo-shaped are skipped with a warning.
    pub fn load(&mut self) {
        let data = match self.slot.read() {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!("Slot is empty, starting with no todos");
                self.todos.clear();
                return;
            }
            Err(e) => {
                warn!(error = ?e, "Failed to read slot, starting with no todos");
                self.todos.clear();
                return;
            }
        };

        self.todos = match parse_todos_lenient(data.as_bytes(), &mut self.ids, now()) {
            Ok(todos) => todos,
            Err(e) => {
                warn!(error = %e, "Slot holds unreadable data, starting with no todos");
                Vec::new()
            }
        };

        info!(count = self.todos.len(), "Loaded todos");
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// All todos in storage order (newest first)
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a todo at the front of the list and return its id
    ///
    /// Blank text is ignored and yields `None`.
    pub fn add(&mut self, text: &str, priority: Priority) -> Result<Option<i64>> {
        let text = text.trim();
        if text.is_empty() {
            debug!("add: ignoring blank text");
            return Ok(None);
        }

        let id = match self.ids.next_id() {
            Some(id) => id,
            None => lowest_unused_id(&self.todos.iter().map(|t| t.id).collect()),
        };
        self.todos.insert(0, Todo::new(id, text, priority, now()));
        debug!(id, %priority, "add: created todo");

        self.save()?;
        Ok(Some(id))
    }

    /// Flip a todo between pending and completed. Returns false for an unknown id.
    pub fn toggle(&mut self, id: i64) -> Result<bool> {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            debug!(id, "toggle: no such todo");
            return Ok(false);
        };

        todo.toggle(now());
        debug!(id, completed = todo.completed, "toggle: updated todo");

        self.save()?;
        Ok(true)
    }

    /// Replace a todo's text. Blank text or an unknown id leaves the list alone.
    pub fn edit(&mut self, id: i64, new_text: &str) -> Result<bool> {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            debug!(id, "edit: ignoring blank text");
            return Ok(false);
        }

        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            debug!(id, "edit: no such todo");
            return Ok(false);
        };

        todo.text = new_text.to_string();
        debug!(id, "edit: updated text");

        self.save()?;
        Ok(true)
    }

    /// Remove a todo. Returns false for an unknown id.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let Some(index) = self.todos.iter().position(|t| t.id == id) else {
            debug!(id, "delete: no such todo");
            return Ok(false);
        };

        self.todos.remove(index);
        debug!(id, "delete: removed todo");

        self.save()?;
        Ok(true)
    }

    /// Remove every completed todo and return how many went
    pub fn clear_completed(&mut self) -> Result<usize> {
        let before = self.todos.len();
        self.todos.retain(|t| !t.completed);
        let removed = before - self.todos.len();
        debug!(removed, "clear_completed: removed todos");

        self.save()?;
        Ok(removed)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Filtered, sorted view of the list for the current local day
    pub fn project(&self, filter: Filter) -> Vec<&Todo> {
        self.project_on(filter, Local::now().date_naive())
    }

    /// Filtered, sorted view of the list, with "today" meaning `today`
    ///
    /// Pending todos come before completed ones; within each group the most
    /// recently created comes first.
    pub fn project_on(&self, filter: Filter, today: NaiveDate) -> Vec<&Todo> {
        let mut view: Vec<&Todo> = self.todos.iter().filter(|t| filter.matches(t, today)).collect();
        view.sort_by(|a, b| {
            a.completed
                .cmp(&b.completed)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        view
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total: self.todos.len(),
            completed: self.todos.iter().filter(|t| t.completed).count(),
        }
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    /// The whole list as pretty-printed JSON, two-space indented
    pub fn export(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.todos).context("Failed to serialize todos for export")
    }

    /// Replace the whole list with the todos in `bytes`
    ///
    /// Nothing changes unless every entry parses. Entries without an id (or
    /// with one already used earlier in the import) get a fresh id.
    pub fn import(&mut self, bytes: &[u8]) -> std::result::Result<usize, ImportError> {
        let todos = parse_todos(bytes, &mut self.ids, now())?;
        let count = todos.len();
        self.todos = todos;
        info!(count, "Imported todos");

        self.save().map_err(ImportError::Storage)?;
        Ok(count)
    }

    fn save(&mut self) -> Result<()> {
        let data = serde_json::to_string(&self.todos).context("Failed to serialize todos")?;
        self.slot.write(&data).context("Failed to save todos")
    }
}

/// File name for an export made on `date`
pub fn export_filename(date: NaiveDate) -> String {
    format!("todos-{}.json", date.format("%Y-%m-%d"))
}

/// A todo as it appears in an import file; everything but the text is optional
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoEntry {
    #[serde(default)]
    id: Option<i64>,
    text: String,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

/// Parse bytes that must hold a JSON array
fn parse_array(bytes: &[u8]) -> std::result::Result<Vec<Value>, ImportError> {
    match serde_json::from_slice(bytes).map_err(ImportError::Json)? {
        Value::Array(entries) => Ok(entries),
        other => Err(ImportError::NotArray {
            found: json_kind(&other),
        }),
    }
}

/// Check one array element is todo-shaped
fn parse_entry(index: usize, entry: Value) -> std::result::Result<TodoEntry, ImportError> {
    let entry: TodoEntry = serde_json::from_value(entry).map_err(|e| ImportError::InvalidRecord {
        index,
        reason: e.to_string(),
    })?;
    if entry.text.trim().is_empty() {
        return Err(ImportError::InvalidRecord {
            index,
            reason: "text is empty".to_string(),
        });
    }
    Ok(entry)
}

/// Parse a JSON array of todos; any bad entry rejects the whole array
fn parse_todos(bytes: &[u8], ids: &mut IdGenerator, now: DateTime<Utc>) -> std::result::Result<Vec<Todo>, ImportError> {
    let entries = parse_array(bytes)?
        .into_iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(build_todos(entries, ids, now))
}

/// Parse a JSON array of todos, skipping entries that are not todo-shaped
fn parse_todos_lenient(
    bytes: &[u8],
    ids: &mut IdGenerator,
    now: DateTime<Utc>,
) -> std::result::Result<Vec<Todo>, ImportError> {
    let entries = parse_array(bytes)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match parse_entry(index, entry) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable todo in slot");
                None
            }
        })
        .collect();
    Ok(build_todos(entries, ids, now))
}

/// Turn parsed entries into todos, repairing ids and completion timestamps
///
/// Ids that are missing, zero, or already used by an earlier entry are
/// replaced with fresh ones.
fn build_todos(entries: Vec<TodoEntry>, ids: &mut IdGenerator, now: DateTime<Utc>) -> Vec<Todo> {
    // Fresh ids must clear every id already in the data
    let mut taken: HashSet<i64> = entries.iter().filter_map(|e| e.id).filter(|id| *id != 0).collect();
    for id in &taken {
        ids.observe(*id);
    }

    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .map(|entry| {
            let id = match entry.id {
                Some(id) if id != 0 && seen.insert(id) => id,
                given => {
                    let id = ids.next_id().unwrap_or_else(|| lowest_unused_id(&taken));
                    taken.insert(id);
                    seen.insert(id);
                    debug!(?given, id, "Assigned fresh id to todo");
                    id
                }
            };

            let completed_at = match (entry.completed, entry.completed_at) {
                (true, Some(at)) => Some(at),
                (true, None) => Some(now),
                (false, _) => None,
            };

            Todo {
                id,
                text: entry.text.trim().to_string(),
                priority: entry.priority,
                completed: entry.completed,
                created_at: entry.created_at.unwrap_or(now),
                completed_at,
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
