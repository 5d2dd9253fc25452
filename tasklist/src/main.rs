//! `tasklist`: command-line client for a remote task list.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/tasklist/config.toml`).
//!
//! ```bash
//! # List tasks from the default store
//! cargo run --bin tasklist -- list
//!
//! # Against another store
//! TASKLIST_API_URL=http://127.0.0.1:8080/api/todo cargo run --bin tasklist -- \
//!     add "Buy milk" --priority 2
//!
//! # Without a store
//! cargo run --bin tasklist -- --offline update 3 --status completed
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use tasklist::board::{BoardError, TaskBoard};
use tasklist::config::{CliArgs, ClientConfig, Command};
use tasklist::session::{EditSession, SubmitOutcome};
use tasklist::transport::TaskTransport;
use tasklist::transport::http::HttpTransport;
use tasklist::transport::loopback::LoopbackTransport;
use tasklist_proto::{Task, TaskId, TaskStatus};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref());
    let command = cli.command.unwrap_or(Command::List);

    if cli.offline {
        tracing::info!("using in-process store");
        run(TaskBoard::new(LoopbackTransport::with_tasks(demo_tasks())), command).await
    } else {
        tracing::info!(base_url = %config.base_url, "using remote store");
        run(TaskBoard::new(HttpTransport::new(config.base_url)), command).await
    }
}

/// Initialize logging to stderr, or to `file_path` through a non-blocking
/// writer. The returned guard must be held until shutdown.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let Some(log_path) = file_path else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let log_dir = log_path.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = log_path.file_name()?;
    let file_appender =
        tracing_appender::rolling::never(log_dir.unwrap_or_else(|| Path::new(".")), file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Runs one command against the board and prints the resulting list.
async fn run<T: TaskTransport>(mut board: TaskBoard<T>, command: Command) -> ExitCode {
    // A failed initial load is printed with the table below.
    let _ = board.load().await;
    let loaded_ok = board.controller().errors().is_empty();

    let result = execute(&mut board, command).await;

    print_tasks(&board.controller().tasks());
    for error in board.controller().errors() {
        eprintln!("error: {error}");
    }

    match result {
        Ok(None) => exit_code(loaded_ok),
        Ok(Some((outcome, errors))) => {
            for error in &errors {
                eprintln!("error: {error}");
            }
            match outcome {
                SubmitOutcome::Persisted => ExitCode::SUCCESS,
                SubmitOutcome::Unchanged => {
                    eprintln!("nothing to change");
                    ExitCode::SUCCESS
                }
                SubmitOutcome::Rejected | SubmitOutcome::Failed => ExitCode::FAILURE,
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Applies `command` and returns its outcome with the messages of the
/// session that ran it. `None` for `list`.
async fn execute<T: TaskTransport>(
    board: &mut TaskBoard<T>,
    command: Command,
) -> Result<Option<(SubmitOutcome, Vec<String>)>, BoardError> {
    let outcome = match command {
        Command::List => return Ok(None),
        Command::Add {
            name,
            status,
            priority,
        } => {
            let form = board.new_task_mut();
            form.set_name(name);
            form.set_status(status);
            form.set_priority(priority);
            board.submit_new().await
        }
        Command::Update {
            id,
            name,
            status,
            priority,
        } => {
            let session = board.session_mut(id).ok_or(BoardError::UnknownTask(id))?;
            apply_edits(session, name, status, priority);
            board.submit(id).await?
        }
        Command::Delete { id } => board.delete(id).await?,
    };
    Ok(Some((outcome, board.last_errors().to_vec())))
}

fn apply_edits(
    session: &mut EditSession,
    name: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<f64>,
) {
    if let Some(name) = name {
        session.set_name(name);
    }
    if let Some(status) = status {
        session.set_status(status);
    }
    if let Some(priority) = priority {
        session.set_priority(priority);
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("(no tasks)");
        return;
    }
    let width = tasks.iter().map(|t| t.name.len()).max().unwrap_or(0).max(4);
    println!("{:>4}  {:<width$}  {:<11}  PRIORITY", "ID", "NAME", "STATUS");
    for task in tasks {
        println!(
            "{:>4}  {:<width$}  {:<11}  {}",
            task.id.get(),
            task.name,
            task.status.label(),
            task.priority
        );
    }
}

fn demo_tasks() -> Vec<Task> {
    [
        ("Write report", TaskStatus::InProgress, 2),
        ("Buy milk", TaskStatus::NotStarted, 1),
        ("Book flights", TaskStatus::Completed, 0),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, status, priority), id)| Task {
        id: TaskId::new(id),
        name: name.to_string(),
        status,
        priority,
    })
    .collect()
}
