// TodoStore - todo list with a single-slot JSON store, projections and import/export

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod render;
pub mod slot;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::ImportError;
pub use filter::Filter;
pub use models::{IdGenerator, Priority, Stats, Todo, now, now_ms};
pub use slot::{FileSlot, MemorySlot, Slot};
pub use store::{TodoStore, export_filename};
