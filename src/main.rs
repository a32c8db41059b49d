//! todo - command-line front end for todolist
//!
//! Every command opens the stored list, applies at most one change, writes
//! it through, and prints the result.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use todolist::{FileStorage, PersistenceGateway, Task, TodoApp, TodoConfig, TodoError};

#[derive(Parser)]
#[command(name = "todo")]
#[command(version)]
#[command(about = "Keep a simple task list on this machine", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding the task list (overrides the config file)
    #[arg(short, long, global = true, env = "TODO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "TODO_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task description; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Mark a task completed
    Done {
        /// Task id or unique id prefix
        id: String,
    },

    /// Mark a task not completed
    Undo {
        /// Task id or unique id prefix
        id: String,
    },

    /// Flip a task between completed and not completed
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Remove all completed tasks
    Clear,

    /// Show tasks
    List {
        /// Only show tasks not yet completed
        #[arg(long, conflicts_with = "completed")]
        remaining: bool,

        /// Only show completed tasks
        #[arg(long)]
        completed: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    let default_filter = if cli.verbose { "todolist=debug,info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        let code = e.downcast_ref::<TodoError>().map_or(1, TodoError::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match cli.config.clone().or_else(TodoConfig::default_path) {
        Some(path) => TodoConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TodoConfig::default(),
    };

    let storage = config.storage(cli.data_dir.as_deref());
    tracing::debug!(path = %storage.file_path().display(), "using task storage");
    let mut app = TodoApp::open(PersistenceGateway::new(storage));

    match cli.command {
        Commands::Add { text } => {
            let text = text.join(" ");
            if app.add(&text)? {
                if let Some(task) = app.tasks().last() {
                    println!("{} {}", "Added".green().bold(), format_task(task));
                }
            } else {
                eprintln!(
                    "{} Nothing added: task description is blank",
                    "Warning:".yellow().bold()
                );
            }
        }

        Commands::Done { id } => set_completed(&mut app, &id, Some(true))?,
        Commands::Undo { id } => set_completed(&mut app, &id, Some(false))?,
        Commands::Toggle { id } => set_completed(&mut app, &id, None)?,

        Commands::Clear => {
            let removed = app.clear_completed()?;
            if removed == 0 {
                println!("No completed tasks to clear");
            } else {
                println!(
                    "{} {} completed task{}",
                    "Cleared".green().bold(),
                    removed,
                    if removed == 1 { "" } else { "s" }
                );
            }
        }

        Commands::List {
            remaining,
            completed,
            json,
        } => {
            let show_remaining = !completed;
            let show_completed = !remaining;

            if json {
                let tasks: Vec<&Task> = app
                    .tasks()
                    .iter()
                    .filter(|t| {
                        (show_remaining && !t.is_completed) || (show_completed && t.is_completed)
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&tasks)?);
                return Ok(());
            }

            if show_remaining {
                print_section("Remaining Tasks", app.remaining(), "No remaining tasks");
            }
            if show_remaining && show_completed {
                println!();
            }
            if show_completed {
                print_section("Completed Tasks", app.completed(), "No completed tasks");
            }

            let counts = app.counts();
            println!();
            println!(
                "{} remaining, {} completed",
                counts.remaining, counts.completed
            );
        }
    }

    Ok(())
}

/// Resolve `query` and set (or flip, for `None`) its completion flag.
fn set_completed(
    app: &mut TodoApp<FileStorage>,
    query: &str,
    completed: Option<bool>,
) -> anyhow::Result<()> {
    let id = app.store().find_by_prefix(query)?;
    match completed {
        Some(flag) => app.set_completed(id, flag)?,
        None => app.toggle(id)?,
    }

    if let Some(task) = app.store().get(id) {
        let verb = if task.is_completed {
            "Completed".green().bold()
        } else {
            "Reopened".cyan().bold()
        };
        println!("{} {}", verb, format_task(task));
    }
    Ok(())
}

fn print_section<'a>(title: &str, tasks: impl Iterator<Item = &'a Task>, empty: &str) {
    println!("{}", title.bold());
    let mut any = false;
    for task in tasks {
        any = true;
        println!("  {}", format_task(task));
    }
    if !any {
        println!("  {}", empty.dimmed());
    }
}

fn format_task(task: &Task) -> String {
    if task.is_completed {
        format!(
            "[x] {}  {}",
            task.id.short().dimmed(),
            task.description.strikethrough().dimmed()
        )
    } else {
        format!("[ ] {}  {}", task.id.short().yellow(), task.description)
    }
}
