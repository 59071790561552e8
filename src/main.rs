use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use todostore::{Config, FileSlot, Filter, Priority, TodoStore, export_filename, render};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Todo list manager - add, complete, filter, export and import todos")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the todo list file (default: from config, then the platform data dir)
    #[arg(short, long, env = "TODOSTORE_PATH")]
    store_path: Option<PathBuf>,

    /// Path to a config file (default: <config_dir>/todostore/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a todo
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// low, medium or high
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Mark a todo done, or pending again
    Toggle { id: i64 },

    /// Replace a todo's text
    Edit {
        id: i64,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a todo
    Delete {
        id: i64,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete all completed todos
    ClearDone {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show todos, pending first and newest first
    List {
        /// all, pending, done or today
        #[arg(short, long)]
        filter: Option<Filter>,
    },

    /// Show total and completed counts
    Stats,

    /// Write all todos to a JSON file
    Export {
        /// Output file, or "-" for stdout (default: todos-<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all todos with the contents of a JSON file
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let store_path = config.resolve_store_path(cli.store_path.as_deref())?;
    debug!(path = ?store_path, "Opening todo store");

    let mut store = TodoStore::open(FileSlot::new(&store_path));

    match cli.command {
        Commands::Add { text, priority } => {
            let priority = priority.unwrap_or(config.default_priority);
            match store.add(&text.join(" "), priority)? {
                Some(id) => println!("Added {}", id.to_string().as_str().cyan()),
                None => println!("Nothing to add: text is blank"),
            }
        }
        Commands::Toggle { id } => {
            if store.toggle(id)? {
                let state = match store.get(id) {
                    Some(todo) if todo.completed => "done",
                    _ => "pending",
                };
                println!("Marked {} {}", id, state);
            } else {
                println!("No todo with id {}", id);
            }
        }
        Commands::Edit { id, text } => {
            if store.get(id).is_none() {
                println!("No todo with id {}", id);
            } else if store.edit(id, &text.join(" "))? {
                println!("Updated {}", id);
            } else {
                println!("Nothing to change: text is blank");
            }
        }
        Commands::Delete { id, yes } => {
            let Some(todo) = store.get(id) else {
                println!("No todo with id {}", id);
                return Ok(());
            };
            let prompt = format!("Delete \"{}\"?", render::escape_text(&todo.text));
            if yes || confirm(&prompt)? {
                store.delete(id)?;
                println!("Deleted {}", id);
            }
        }
        Commands::ClearDone { yes } => {
            let done = store.stats().completed;
            if done == 0 {
                println!("No completed todos");
            } else if yes || confirm(&format!("Delete {} completed todos?", done))? {
                let removed = store.clear_completed()?;
                println!("Removed {} completed todos", removed);
            }
        }
        Commands::List { filter } => {
            let filter = filter.unwrap_or(config.default_filter);
            let view = store.project(filter);
            println!("{}", render::render_projection(&view, filter));
            println!("{}", render::render_stats(store.stats()).dimmed());
        }
        Commands::Stats => {
            println!("{}", render::render_stats(store.stats()));
        }
        Commands::Export { output } => {
            let data = store.export()?;
            match output {
                Some(path) if path == Path::new("-") => {
                    io::stdout().write_all(&data)?;
                    println!();
                }
                output => {
                    let path = output.unwrap_or_else(|| PathBuf::from(export_filename(Utc::now().date_naive())));
                    fs::write(&path, &data).with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = ?path, count = store.len(), "Exported todos");
                    println!("Exported {} todos to {}", store.len(), path.display());
                }
            }
        }
        Commands::Import { path } => {
            let data = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            match store.import(&data) {
                Ok(count) => println!("Imported {} todos", count),
                Err(e) if e.is_parse_error() => {
                    eprintln!("{} {}", "Import failed, nothing changed:".red(), e);
                    std::process::exit(1);
                }
                Err(e) => return Err(e).wrap_err("Import failed"),
            }
        }
    }

    Ok(())
}

/// Ask a yes/no question on stdin; anything but "y"/"yes" means no
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
