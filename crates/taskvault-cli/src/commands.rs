use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use taskvault_core::config::{self, Settings};
use taskvault_core::git;
use taskvault_core::lifecycle::{self, LifecycleError};
use taskvault_core::pomodoro::{self, BreakKind};
use taskvault_core::store::{self, Scope, StoreError};

pub fn run_new(
    settings: &Settings,
    title: &str,
    description: &str,
    github_issue: bool,
    project: Option<String>,
) -> Result<()> {
    let project = resolve_project(project)?;
    let mut issue = 0;
    if github_issue {
        if !git::is_git_repository() || !git::has_github_remote() {
            bail!("--github-issue requires a Git repository with a GitHub remote");
        }
        if !git::gh_available() {
            bail!("--github-issue requires the gh CLI on PATH");
        }
        issue = git::create_issue(title, description)?;
        println!("GitHub issue #{issue} created.");
    }
    let path = store::create_task(settings, &project, title, description, issue)?;
    println!("Task created: {}", path.display());
    Ok(())
}

pub fn run_list(
    settings: &Settings,
    project: Option<String>,
    all: bool,
    json: bool,
) -> Result<()> {
    let scope = if all {
        Scope::All
    } else {
        Scope::Project(resolve_project(project)?)
    };
    let tasks = store::list_tasks(settings, &scope)?;

    if json {
        let rows: Vec<serde_json::Value> = tasks
            .iter()
            .map(|stored| {
                serde_json::json!({
                    "title": stored.task.title,
                    "status": stored.task.status.as_str(),
                    "created_date": stored.task.created_date,
                    "start_date": stored.task.start_date,
                    "done_date": stored.task.done_date,
                    "pomodoro_count": stored.task.pomodoro_count,
                    "issue": stored.task.issue,
                    "duration": stored.task.duration,
                    "path": stored.path.display().to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for stored in &tasks {
        let task = &stored.task;
        if task.issue != 0 {
            println!("{} #{} {}", task.status.symbol(), task.issue, task.title);
        } else {
            println!("{} {}", task.status.symbol(), task.title);
        }
    }
    Ok(())
}

pub fn run_start(settings: &Settings, issue: u32, pomodoro: bool) -> Result<()> {
    let project = resolve_project(None)?;
    git::start_issue_development(issue)?;
    match lifecycle::mark_in_progress_by_issue(settings, &project, issue) {
        Ok(stored) => println!("Task '{}' marked as in-progress.", stored.task.title),
        Err(LifecycleError::Transition(err)) => println!("{err}"),
        Err(LifecycleError::Store(StoreError::NotFound(_))) => {
            println!("No task found with issue #{issue}.");
        }
        Err(err) => return Err(err.into()),
    }
    play_sound(settings.sounds.start.as_deref());
    if pomodoro {
        run_pomodoro_start(settings, 1)?;
    }
    Ok(())
}

pub fn run_done(settings: &Settings, title: &str, project: Option<String>) -> Result<()> {
    let project = resolve_project(project)?;
    match lifecycle::mark_done_by_title(settings, &project, title) {
        Ok(_) => {
            play_sound(settings.sounds.done.as_deref());
            println!("Task '{title}' marked as done.");
            Ok(())
        }
        Err(LifecycleError::Transition(err)) => {
            println!("{err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn run_finish(settings: &Settings) -> Result<()> {
    let branch = git::current_branch()?;
    let Some(issue) = git::issue_number_from_branch(&branch) else {
        println!("No issue number found in branch name: {branch}");
        return Ok(());
    };
    println!("Found issue #{issue} in branch {branch}.");

    println!("Pushing branch to remote...");
    git::push()?;

    println!("Creating pull request...");
    let title = git::issue_title(issue)?;
    git::create_pull_request(&title, issue)?;

    println!("Merging pull request and deleting branch...");
    git::merge_pull_request()?;

    let project = resolve_project(None)?;
    match lifecycle::mark_done_by_issue(settings, &project, issue) {
        Ok(stored) => println!("Task '{}' marked as done.", stored.task.title),
        Err(LifecycleError::Store(StoreError::NotFound(_))) => {
            println!("No task note found with issue #{issue}.");
        }
        Err(LifecycleError::Transition(err)) => println!("{err}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

pub fn run_link(settings: &Settings, gitignore: bool) -> Result<()> {
    let project = resolve_project(None)?;
    let target = Path::new(&settings.general.vault_path)
        .join(&project)
        .join(store::TASK_DIR_NAME);
    if !target.is_dir() {
        bail!(
            "target task directory does not exist: {}",
            target.display()
        );
    }

    let link = Path::new("tasky");
    if link.symlink_metadata().is_ok() {
        println!("Symbolic link 'tasky' already exists. Replacing it.");
        fs::remove_file(link)?;
    }
    create_symlink(&target, link)?;
    println!("Symbolic link 'tasky' -> {}", target.display());

    if gitignore {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(".gitignore")
            .context("open .gitignore")?;
        writeln!(file, "tasky/")?;
        println!("'tasky/' added to .gitignore.");
    }
    Ok(())
}

pub fn run_pomodoro_start(settings: &Settings, intervals: u32) -> Result<()> {
    let intervals = intervals.max(1);
    let work_minutes = settings.pomodoro.pomodoro_duration.max(1);
    for completed in 1..=intervals {
        println!("Starting pomodoro {completed} of {intervals} ({work_minutes} min)...");
        run_countdown(work_minutes);
        println!("Pomodoro finished!");
        play_sound(settings.sounds.break_sound.as_deref());
        log_completed_interval(settings, work_minutes);

        if completed < intervals {
            let kind = pomodoro::break_after(completed, &settings.pomodoro);
            let minutes = pomodoro::break_minutes(kind, &settings.pomodoro);
            let label = match kind {
                BreakKind::Short => "short",
                BreakKind::Long => "long",
            };
            println!("Starting {label} break ({minutes} min)...");
            run_countdown(minutes);
            println!("Break finished!");
        }
    }
    println!("Pomodoro cycle ended.");
    Ok(())
}

pub fn run_pomodoro_configure(
    settings: &Settings,
    duration: Option<u32>,
    short_break: Option<u32>,
    long_break: Option<u32>,
    long_break_interval: Option<u32>,
) -> Result<()> {
    let path = config::config_path()?;
    // The in-memory settings may carry a transient --vault override; start
    // from the on-disk file so only the pomodoro fields change.
    let mut settings = config::load(&path)?.unwrap_or_else(|| settings.clone());
    if let Some(value) = duration {
        settings.pomodoro.pomodoro_duration = value;
    }
    if let Some(value) = short_break {
        settings.pomodoro.short_break_duration = value;
    }
    if let Some(value) = long_break {
        settings.pomodoro.long_break_duration = value;
    }
    if let Some(value) = long_break_interval {
        settings.pomodoro.long_break_interval = value;
    }
    config::save(&path, &settings)?;
    println!("Pomodoro configuration saved to {}.", path.display());
    Ok(())
}

/// The work-interval-completed hook: logs the finished interval against the
/// task linked to the current branch's issue, when there is one.
fn log_completed_interval(settings: &Settings, minutes: u32) {
    if !git::is_git_repository() {
        return;
    }
    let Ok(branch) = git::current_branch() else {
        return;
    };
    let Some(issue) = git::issue_number_from_branch(&branch) else {
        return;
    };
    let Some(project) = git::project_name() else {
        return;
    };
    match lifecycle::log_interval_for_issue(settings, &project, issue, minutes) {
        Ok(Some(stored)) => println!("Logged {minutes} min against '{}'.", stored.task.title),
        Ok(None) => {}
        Err(err) => eprintln!("warning: could not log work interval: {err}"),
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).context("create symbolic link")
}

#[cfg(not(unix))]
fn create_symlink(_target: &Path, _link: &Path) -> Result<()> {
    bail!("symbolic links are only supported on Unix")
}

fn run_countdown(minutes: u32) {
    let total_secs = u64::from(minutes) * 60;
    for elapsed in 0..=total_secs {
        print!("\r{}", pomodoro::render_frame(elapsed, total_secs));
        let _ = io::stdout().flush();
        if elapsed < total_secs {
            thread::sleep(Duration::from_secs(1));
        }
    }
    println!();
}

fn play_sound(path: Option<&str>) {
    let Some(path) = path.filter(|path| !path.is_empty()) else {
        return;
    };
    if let Err(err) = Command::new("aplay").arg(path).status() {
        eprintln!("warning: could not play sound {path}: {err}");
    }
}

fn resolve_project(explicit: Option<String>) -> Result<String> {
    if let Some(project) = explicit {
        return Ok(project);
    }
    git::project_name()
        .context("could not determine project name; pass --project or run inside a project directory")
}
