use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use taskvault_core::config::Settings;

mod commands;

#[derive(Parser)]
#[command(
    name = "taskvault",
    version,
    about = "Markdown task manager with GitHub and pomodoro workflows"
)]
struct Cli {
    /// Override the configured vault path
    #[arg(long, global = true, value_name = "DIR")]
    vault: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new task
    New {
        title: String,
        description: Option<String>,
        /// Create a linked GitHub issue for the task
        #[arg(long)]
        github_issue: bool,
        /// Project to file the task under (default: current repository)
        #[arg(long)]
        project: Option<String>,
    },
    /// List tasks
    #[command(alias = "view")]
    List {
        /// Project to list (default: current repository)
        project: Option<String>,
        /// List tasks across all projects
        #[arg(short, long)]
        all: bool,
        /// Emit JSON instead of the glyph listing
        #[arg(long)]
        json: bool,
    },
    /// Start development on a GitHub issue and mark its task in-progress
    Start {
        issue: u32,
        /// Run a pomodoro once the task is started
        #[arg(long)]
        pomodoro: bool,
    },
    /// Mark a task as done by title
    Done {
        title: String,
        /// Project holding the task (default: current repository)
        #[arg(long)]
        project: Option<String>,
    },
    /// Push the branch, open and merge its pull request, and mark the task done
    Finish,
    /// Symlink the project's task directory into the current directory
    Link {
        /// Also append the link name to .gitignore
        #[arg(long)]
        gitignore: bool,
    },
    /// Pomodoro timer
    #[command(alias = "po")]
    Pomodoro {
        #[command(subcommand)]
        action: PomodoroAction,
    },
    /// Print version information
    Version,
}

#[derive(Subcommand)]
enum PomodoroAction {
    /// Run work intervals with breaks in between
    Start {
        /// Number of work intervals to run
        #[arg(long, default_value_t = 1)]
        intervals: u32,
    },
    /// Update pomodoro durations in the config file
    Configure {
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        short_break: Option<u32>,
        #[arg(long)]
        long_break: Option<u32>,
        #[arg(long)]
        long_break_interval: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load_or_init()?;
    if let Some(vault) = cli.vault {
        settings.general.vault_path = vault.display().to_string();
    }
    match cli.command {
        Command::New {
            title,
            description,
            github_issue,
            project,
        } => commands::run_new(
            &settings,
            &title,
            description.as_deref().unwrap_or(""),
            github_issue,
            project,
        ),
        Command::List { project, all, json } => commands::run_list(&settings, project, all, json),
        Command::Start { issue, pomodoro } => commands::run_start(&settings, issue, pomodoro),
        Command::Done { title, project } => commands::run_done(&settings, &title, project),
        Command::Finish => commands::run_finish(&settings),
        Command::Link { gitignore } => commands::run_link(&settings, gitignore),
        Command::Pomodoro { action } => match action {
            PomodoroAction::Start { intervals } => {
                commands::run_pomodoro_start(&settings, intervals)
            }
            PomodoroAction::Configure {
                duration,
                short_break,
                long_break,
                long_break_interval,
            } => commands::run_pomodoro_configure(
                &settings,
                duration,
                short_break,
                long_break,
                long_break_interval,
            ),
        },
        Command::Version => {
            println!("taskvault {}", taskvault_core::version());
            Ok(())
        }
    }
}
