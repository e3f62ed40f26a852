//! CLI - Command Line Interface
//!
//! Available commands:
//! - roster list ...   - manage lists (create, ls, show, update, delete,
//!   duplicate, reorder, stats)
//! - roster todo ...   - manage todos (add, ls, show, update, done, reopen,
//!   delete, move)
//! - roster stats      - figures across every todo of the acting user
//!
//! The acting user is taken from `--user`; without it every run acts as
//! the nil user, which keeps single-user setups free of bookkeeping.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use roster_core::{
    List, ListId, ListPatch, NewList, NewTodo, Priority, RosterConfig, SortDirection, SortField,
    Todo, TodoId, TodoPatch, UserId,
};
use roster_engine::{
    EngineError, ListStats, TodoOrderingService, TodoPage, TodoQueryParams, UserStats,
};
use roster_storage::{create_memory_store, JsonStore, SharedStore};

/// CLI errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage initialization failed: {0}")]
    StorageInit(String),

    #[error("Invalid date '{0}', expected RFC 3339 or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("{0}")]
    Command(String),
}

/// CLI configuration resolved from flags and the optional config file.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory holding the JSON document tree
    pub storage_root: PathBuf,

    /// Keep documents in memory only
    pub in_memory: bool,

    /// Acting user
    pub user: UserId,

    /// Verbose output
    pub verbose: bool,

    /// Output format
    pub output_format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(".roster"),
            in_memory: false,
            user: UserId(Uuid::nil()),
            verbose: false,
            output_format: OutputFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Roster CLI
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Storage root directory
    #[arg(short, long, global = true)]
    pub(crate) storage: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Acting user id
    #[arg(short, long, global = true)]
    pub(crate) user: Option<Uuid>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum)]
    pub(crate) output: Option<OutputFormat>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Manage todo lists
    #[command(subcommand)]
    List(ListCommand),

    /// Manage todos
    #[command(subcommand)]
    Todo(TodoCommand),

    /// Show figures across every todo you own
    Stats,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ListCommand {
    /// Create a list
    Create(CreateListArgs),

    /// Show your lists in order
    Ls,

    /// Show one list
    Show { id: ListId },

    /// Change name, description, color or visibility
    Update(UpdateListArgs),

    /// Delete a list and every todo in it
    Delete { id: ListId },

    /// Copy a list with its todos
    Duplicate(DuplicateListArgs),

    /// Move a list to a new position
    Reorder { id: ListId, order: i64 },

    /// Show figures for one list
    Stats { id: ListId },
}

#[derive(Args, Debug)]
pub(crate) struct CreateListArgs {
    /// List name
    pub name: String,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Display color as #rrggbb
    #[arg(long)]
    pub color: Option<String>,

    /// Make the list readable by other users
    #[arg(long)]
    pub public: bool,
}

#[derive(Args, Debug)]
pub(crate) struct UpdateListArgs {
    pub id: ListId,

    /// New name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// New display color as #rrggbb
    #[arg(long)]
    pub color: Option<String>,

    /// Change visibility
    #[arg(long)]
    pub public: Option<bool>,
}

#[derive(Args, Debug)]
pub(crate) struct DuplicateListArgs {
    pub id: ListId,

    /// Name for the copy, defaults to "<source> (copy)"
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum TodoCommand {
    /// Add a todo at the end of a list
    Add(AddTodoArgs),

    /// Query todos with filters, sorting and pagination
    Ls(LsTodoArgs),

    /// Show one todo
    Show { id: TodoId },

    /// Change fields of a todo
    Update(UpdateTodoArgs),

    /// Mark a todo completed
    Done { id: TodoId },

    /// Mark a completed todo pending again
    Reopen { id: TodoId },

    /// Delete a todo
    Delete { id: TodoId },

    /// Move a todo to a new position in its list
    Move { id: TodoId, order: i64 },
}

#[derive(Args, Debug)]
pub(crate) struct AddTodoArgs {
    /// List to add to
    pub list: ListId,

    /// Todo title
    pub title: String,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// low, medium or high
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Due date, RFC 3339 or YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,

    /// Tag, repeatable
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Estimated minutes
    #[arg(short, long)]
    pub estimate: Option<u32>,
}

#[derive(Args, Debug)]
pub(crate) struct LsTodoArgs {
    /// Restrict to one of your lists
    #[arg(short, long)]
    pub list: Option<ListId>,

    /// Match against title, description and tags
    #[arg(long)]
    pub search: Option<String>,

    /// low, medium or high
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// true shows only completed todos, false only pending ones
    #[arg(long)]
    pub completed: Option<bool>,

    /// Exact tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Earliest due date
    #[arg(long)]
    pub due_from: Option<String>,

    /// Latest due date
    #[arg(long)]
    pub due_to: Option<String>,

    /// created_at, updated_at, due_date, priority, title or sort_order
    #[arg(long)]
    pub sort_by: Option<SortField>,

    /// asc or desc
    #[arg(long)]
    pub direction: Option<SortDirection>,

    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u32>,

    /// Todos per page
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Debug)]
pub(crate) struct UpdateTodoArgs {
    pub id: TodoId,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// low, medium or high
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// New due date, RFC 3339 or YYYY-MM-DD
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,

    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,

    /// Replace all tags, repeatable
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Estimated minutes
    #[arg(short, long, conflicts_with = "clear_estimate")]
    pub estimate: Option<u32>,

    /// Remove the estimate
    #[arg(long)]
    pub clear_estimate: bool,

    /// Minutes actually spent
    #[arg(long)]
    pub actual: Option<u32>,
}

/// Parse CLI arguments and execute commands
pub async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let file_config = load_config(cli.config.as_deref()).await?;

    // Flags win over the config file.
    let config = CliConfig {
        storage_root: cli
            .storage
            .or(file_config.storage.root)
            .unwrap_or_else(|| PathBuf::from(".roster")),
        in_memory: file_config.storage.in_memory,
        user: UserId(cli.user.unwrap_or_else(Uuid::nil)),
        verbose: cli.verbose,
        output_format: cli.output.unwrap_or(OutputFormat::Pretty),
    };

    if config.verbose {
        tracing_subscriber::fmt::init();
    }

    let store = open_store(&config).await?;
    let service = TodoOrderingService::with_config(store, file_config.engine);

    match cli.command {
        Commands::List(cmd) => cmd_list(cmd, &service, &config).await,
        Commands::Todo(cmd) => cmd_todo(cmd, &service, &config).await,
        Commands::Stats => cmd_stats(&service, &config).await,
    }
}

pub(crate) async fn load_config(path: Option<&Path>) -> Result<RosterConfig, CliError> {
    let Some(path) = path else {
        return Ok(RosterConfig::default());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
}

pub(crate) async fn open_store(config: &CliConfig) -> Result<SharedStore, CliError> {
    if config.in_memory {
        debug!("using in-memory store");
        return Ok(create_memory_store());
    }
    debug!("opening store at {}", config.storage_root.display());
    let store = JsonStore::open(&config.storage_root)
        .await
        .map_err(|e| CliError::StorageInit(e.to_string()))?;
    Ok(Arc::new(store))
}

pub(crate) async fn cmd_list(
    cmd: ListCommand,
    service: &TodoOrderingService,
    config: &CliConfig,
) -> Result<(), CliError> {
    let user = config.user;
    match cmd {
        ListCommand::Create(args) => {
            let mut new = NewList::new(args.name);
            new.description = args.description;
            new.color = args.color;
            new.is_public = args.public.then_some(true);
            let list = service.create_list(user, new).await.map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&list),
                OutputFormat::Pretty => {
                    println!("Created list '{}' ({})", list.name, list.id);
                    Ok(())
                }
            }
        }
        ListCommand::Ls => {
            let lists = service.lists_for_user(user).await.map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&lists),
                OutputFormat::Pretty => {
                    if lists.is_empty() {
                        println!("No lists yet");
                    }
                    for list in &lists {
                        print_list_line(list);
                    }
                    Ok(())
                }
            }
        }
        ListCommand::Show { id } => {
            let list = service.get_list(id, user).await.map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&list),
                OutputFormat::Pretty => {
                    print_list(&list);
                    Ok(())
                }
            }
        }
        ListCommand::Update(args) => {
            let patch = ListPatch {
                name: args.name,
                description: args.description,
                color: args.color,
                is_public: args.public,
            };
            let list = service
                .update_list(args.id, user, patch)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&list),
                OutputFormat::Pretty => {
                    println!("Updated list '{}'", list.name);
                    Ok(())
                }
            }
        }
        ListCommand::Delete { id } => {
            let removed = service.delete_list(id, user).await.map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "deleted_list": id,
                    "deleted_todos": removed,
                })),
                OutputFormat::Pretty => {
                    println!("Deleted list {} and {} todos", id, removed);
                    Ok(())
                }
            }
        }
        ListCommand::Duplicate(args) => {
            let (list, copied) = service
                .duplicate_list(args.id, user, args.name)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "list": list,
                    "copied_todos": copied,
                })),
                OutputFormat::Pretty => {
                    println!("Duplicated into '{}' with {} todos ({})", list.name, copied, list.id);
                    Ok(())
                }
            }
        }
        ListCommand::Reorder { id, order } => {
            let list = service
                .reorder_list(id, user, order)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&list),
                OutputFormat::Pretty => {
                    println!("Moved list '{}' to position {}", list.name, list.sort_order);
                    Ok(())
                }
            }
        }
        ListCommand::Stats { id } => {
            let stats = service.list_stats(id, user).await.map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&stats),
                OutputFormat::Pretty => {
                    print_list_stats(&stats);
                    Ok(())
                }
            }
        }
    }
}

pub(crate) async fn cmd_todo(
    cmd: TodoCommand,
    service: &TodoOrderingService,
    config: &CliConfig,
) -> Result<(), CliError> {
    let user = config.user;
    match cmd {
        TodoCommand::Add(args) => {
            let mut new = NewTodo::new(args.title);
            new.description = args.description;
            new.priority = args.priority;
            new.due_date = parse_date_arg(args.due.as_deref())?;
            new.tags = (!args.tags.is_empty()).then_some(args.tags);
            new.estimated_minutes = args.estimate;
            let todo = service
                .create_todo(args.list, user, new)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&todo),
                OutputFormat::Pretty => {
                    println!(
                        "Added '{}' at position {} ({})",
                        todo.title, todo.sort_order, todo.id
                    );
                    Ok(())
                }
            }
        }
        TodoCommand::Ls(args) => {
            let params = TodoQueryParams {
                list_id: args.list,
                search: args.search,
                priority: args.priority,
                completed: args.completed,
                tag: args.tag,
                due_from: parse_date_arg(args.due_from.as_deref())?,
                due_to: parse_date_arg(args.due_to.as_deref())?,
                sort_by: args.sort_by,
                direction: args.direction,
                page: args.page,
                limit: args.limit,
            };
            let page = service
                .list_todos(user, &params)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&page),
                OutputFormat::Pretty => {
                    print_page(&page);
                    Ok(())
                }
            }
        }
        TodoCommand::Show { id } => {
            let todo = service.get_todo(id, user).await.map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&todo),
                OutputFormat::Pretty => {
                    print_todo(&todo);
                    Ok(())
                }
            }
        }
        TodoCommand::Update(args) => {
            let patch = TodoPatch {
                title: args.title,
                description: args.description,
                priority: args.priority,
                due_date: if args.clear_due {
                    Some(None)
                } else {
                    parse_date_arg(args.due.as_deref())?.map(Some)
                },
                tags: (!args.tags.is_empty()).then_some(args.tags),
                completed: None,
                estimated_minutes: if args.clear_estimate {
                    Some(None)
                } else {
                    args.estimate.map(Some)
                },
                actual_minutes: args.actual.map(Some),
            };
            let todo = service
                .update_todo(args.id, user, patch)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&todo),
                OutputFormat::Pretty => {
                    println!("Updated '{}'", todo.title);
                    Ok(())
                }
            }
        }
        TodoCommand::Done { id } => {
            let todo = service
                .set_completed(id, user, true)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&todo),
                OutputFormat::Pretty => {
                    println!("Completed '{}'", todo.title);
                    Ok(())
                }
            }
        }
        TodoCommand::Reopen { id } => {
            let todo = service
                .set_completed(id, user, false)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&todo),
                OutputFormat::Pretty => {
                    println!("Reopened '{}'", todo.title);
                    Ok(())
                }
            }
        }
        TodoCommand::Delete { id } => {
            service.delete_todo(id, user).await.map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&serde_json::json!({ "deleted_todo": id })),
                OutputFormat::Pretty => {
                    println!("Deleted todo {}", id);
                    Ok(())
                }
            }
        }
        TodoCommand::Move { id, order } => {
            let receipt = service
                .reorder_todo(id, user, order)
                .await
                .map_err(command_err)?;
            match config.output_format {
                OutputFormat::Json => print_json(&receipt),
                OutputFormat::Pretty => {
                    println!("Moved '{}' to position {}", receipt.title, receipt.order);
                    Ok(())
                }
            }
        }
    }
}

pub(crate) async fn cmd_stats(
    service: &TodoOrderingService,
    config: &CliConfig,
) -> Result<(), CliError> {
    let stats = service
        .user_stats(config.user)
        .await
        .map_err(command_err)?;
    match config.output_format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Pretty => {
            print_user_stats(&stats);
            Ok(())
        }
    }
}

fn command_err(e: EngineError) -> CliError {
    CliError::Command(e.to_string())
}

/// Accepts RFC 3339 timestamps and plain dates, the latter read as
/// midnight UTC.
pub(crate) fn parse_date(raw: &str) -> Result<DateTime<Utc>, CliError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| CliError::InvalidDate(raw.to_string()))
}

fn parse_date_arg(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, CliError> {
    raw.map(parse_date).transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| CliError::Command(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_list_line(list: &List) {
    let visibility = if list.is_public { "public" } else { "private" };
    println!(
        "{}  {}  {}/{} done  [{}]",
        list.id, list.name, list.completed_todo_count, list.todo_count, visibility
    );
}

fn print_list(list: &List) {
    println!("List: {}", list.name);
    println!("  id: {}", list.id);
    if !list.description.is_empty() {
        println!("  description: {}", list.description);
    }
    println!("  color: {}", list.color);
    println!("  public: {}", list.is_public);
    println!(
        "  todos: {} total, {} completed",
        list.todo_count, list.completed_todo_count
    );
    println!("  position: {}", list.sort_order);
}

fn print_todo_line(todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    let due = todo
        .due_date
        .map(|d| format!("  due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    println!(
        "[{}] {}  {}  ({}){}",
        mark, todo.id, todo.title, todo.priority, due
    );
}

fn print_todo(todo: &Todo) {
    println!("Todo: {}", todo.title);
    println!("  id: {}", todo.id);
    println!("  list: {}", todo.list_id);
    if !todo.description.is_empty() {
        println!("  description: {}", todo.description);
    }
    println!("  priority: {}", todo.priority);
    if let Some(due) = todo.due_date {
        println!("  due: {}", due.to_rfc3339());
    }
    if !todo.tags.is_empty() {
        println!("  tags: {}", todo.tags.join(", "));
    }
    match todo.completed_at {
        Some(at) => println!("  completed: {}", at.to_rfc3339()),
        None => println!("  completed: no"),
    }
    if let Some(estimate) = todo.estimated_minutes {
        println!("  estimated: {} min", estimate);
    }
    if let Some(actual) = todo.actual_minutes {
        println!("  actual: {} min", actual);
    }
    println!("  position: {}", todo.sort_order);
}

fn print_page(page: &TodoPage) {
    if page.todos.is_empty() {
        println!("No todos match");
    }
    for todo in &page.todos {
        print_todo_line(todo);
    }
    let p = &page.pagination;
    println!("page {}/{} ({} total)", p.current, p.pages.max(1), p.total);
}

fn print_list_stats(stats: &ListStats) {
    println!("total: {}", stats.total);
    println!(
        "completed: {} ({}%)",
        stats.completed, stats.completion_percentage
    );
    println!("pending: {}", stats.pending);
    println!("overdue: {}", stats.overdue);
    println!(
        "priority: {} high, {} medium, {} low",
        stats.high_priority, stats.medium_priority, stats.low_priority
    );
}

fn print_user_stats(stats: &UserStats) {
    println!("total: {}", stats.total);
    println!(
        "completed: {} ({}%)",
        stats.completed, stats.completion_percentage
    );
    println!("pending: {}", stats.pending);
    println!("overdue: {}", stats.overdue);
    println!(
        "priority: {} high, {} medium, {} low",
        stats.high_priority, stats.medium_priority, stats.low_priority
    );
    println!(
        "estimated: {} min total, {} min average",
        stats.total_estimated_minutes, stats.avg_estimated_minutes
    );
    println!("completed in the last 7 days: {}", stats.recently_completed);
}
