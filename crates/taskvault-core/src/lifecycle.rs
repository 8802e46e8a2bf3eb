use chrono::Local;
use thiserror::Error;

use crate::config::Settings;
use crate::store::{self, StoreError, StoredTask};
use crate::task::{Status, Task};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Soft precondition failure on a status transition. The record is left
/// unchanged; callers report it and carry on.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("task '{0}' is already marked as in-progress")]
    AlreadyInProgress(String),
    #[error("task '{0}' is already marked as done")]
    AlreadyDone(String),
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

pub fn now_datetime() -> String {
    Local::now().format(DATETIME_FORMAT).to_string()
}

pub fn now_date() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Moves a record to InProgress and stamps `start_date`. Rejects only the
/// InProgress -> InProgress no-op; Done -> InProgress is not blocked.
pub fn mark_in_progress(task: &mut Task) -> Result<(), TransitionError> {
    if task.status == Status::InProgress {
        return Err(TransitionError::AlreadyInProgress(task.title.clone()));
    }
    task.status = Status::InProgress;
    task.start_date = Some(now_datetime());
    Ok(())
}

/// Moves a record to Done and stamps `done_date` (date only).
pub fn mark_done(task: &mut Task) -> Result<(), TransitionError> {
    if task.status == Status::Done {
        return Err(TransitionError::AlreadyDone(task.title.clone()));
    }
    task.status = Status::Done;
    task.done_date = Some(now_date());
    Ok(())
}

/// Logs one completed work interval. Orthogonal to lifecycle state, so no
/// precondition.
pub fn record_work_interval(task: &mut Task, minutes: u32) {
    task.pomodoro_count += 1;
    task.duration += minutes;
}

pub fn mark_done_by_title(
    settings: &Settings,
    project: &str,
    title: &str,
) -> Result<StoredTask, LifecycleError> {
    let mut stored = store::find_by_title(settings, project, title)?;
    mark_done(&mut stored.task)?;
    store::save_task(&stored.path, &stored.task, &stored.body)?;
    Ok(stored)
}

pub fn mark_done_by_issue(
    settings: &Settings,
    project: &str,
    issue: u32,
) -> Result<StoredTask, LifecycleError> {
    let mut stored = store::find_by_issue(settings, project, issue)?;
    mark_done(&mut stored.task)?;
    store::save_task(&stored.path, &stored.task, &stored.body)?;
    Ok(stored)
}

pub fn mark_in_progress_by_title(
    settings: &Settings,
    project: &str,
    title: &str,
) -> Result<StoredTask, LifecycleError> {
    let mut stored = store::find_by_title(settings, project, title)?;
    mark_in_progress(&mut stored.task)?;
    store::save_task(&stored.path, &stored.task, &stored.body)?;
    Ok(stored)
}

pub fn mark_in_progress_by_issue(
    settings: &Settings,
    project: &str,
    issue: u32,
) -> Result<StoredTask, LifecycleError> {
    let mut stored = store::find_by_issue(settings, project, issue)?;
    mark_in_progress(&mut stored.task)?;
    store::save_task(&stored.path, &stored.task, &stored.body)?;
    Ok(stored)
}

/// The "work interval completed" hook. Finds the project's task carrying
/// `issue` and logs one interval against it; Ok(None) when no task is linked
/// to that issue.
pub fn log_interval_for_issue(
    settings: &Settings,
    project: &str,
    issue: u32,
    minutes: u32,
) -> Result<Option<StoredTask>, LifecycleError> {
    let mut stored = match store::find_by_issue(settings, project, issue) {
        Ok(stored) => stored,
        Err(StoreError::NotFound(_)) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    record_work_interval(&mut stored.task, minutes);
    store::save_task(&stored.path, &stored.task, &stored.body)?;
    Ok(Some(stored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{create_task, find_by_title, list_tasks, Scope};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Task {
        Task::new("Fix login bug", "2026-08-25 08:00:00".to_string())
    }

    #[test]
    fn mark_in_progress_sets_start_date() {
        let mut task = sample();
        mark_in_progress(&mut task).expect("transition");
        assert_eq!(task.status, Status::InProgress);
        assert!(task.start_date.is_some());
        assert!(task.done_date.is_none());
    }

    #[test]
    fn mark_in_progress_twice_reports_already_in_state() {
        let mut task = sample();
        mark_in_progress(&mut task).expect("first");
        let start_date = task.start_date.clone();
        let err = mark_in_progress(&mut task);
        assert!(matches!(err, Err(TransitionError::AlreadyInProgress(_))));
        assert_eq!(task.start_date, start_date);
    }

    #[test]
    fn mark_done_twice_reports_already_in_state() {
        let mut task = sample();
        mark_done(&mut task).expect("first");
        let done_date = task.done_date.clone();
        let err = mark_done(&mut task);
        assert!(matches!(err, Err(TransitionError::AlreadyDone(_))));
        assert_eq!(task.done_date, done_date);
    }

    #[test]
    fn start_date_does_not_exceed_done_date() {
        let mut task = sample();
        mark_in_progress(&mut task).expect("start");
        mark_done(&mut task).expect("done");
        let start_day = task.start_date.as_deref().expect("start")[..10].to_string();
        let done_day = task.done_date.as_deref().expect("done").to_string();
        assert!(start_day <= done_day);
    }

    #[test]
    fn done_to_in_progress_is_not_blocked() {
        // Historical behavior: the engine only guards the InProgress no-op,
        // so a Done record can be pushed back to InProgress.
        let mut task = sample();
        mark_done(&mut task).expect("done");
        mark_in_progress(&mut task).expect("reopen");
        assert_eq!(task.status, Status::InProgress);
    }

    #[test]
    fn record_work_interval_is_unconditional() {
        let mut task = sample();
        mark_done(&mut task).expect("done");
        record_work_interval(&mut task, 25);
        record_work_interval(&mut task, 15);
        assert_eq!(task.pomodoro_count, 2);
        assert_eq!(task.duration, 40);
    }

    #[test]
    fn full_task_scenario() {
        let temp = TempDir::new().expect("tempdir");
        let settings = Settings::with_vault(temp.path().display().to_string());

        create_task(&settings, "demo", "Fix login bug", "Repro notes", 0).expect("create");
        mark_in_progress_by_title(&settings, "demo", "fix login bug").expect("start");

        let stored = find_by_title(&settings, "demo", "Fix login bug").expect("find");
        assert_eq!(stored.task.status, Status::InProgress);
        assert!(stored.task.start_date.is_some());

        let issue_free = log_interval_for_issue(&settings, "demo", 99, 25).expect("log");
        assert!(issue_free.is_none());

        let mut stored = find_by_title(&settings, "demo", "Fix login bug").expect("find");
        record_work_interval(&mut stored.task, 25);
        store::save_task(&stored.path, &stored.task, &stored.body).expect("save");

        mark_done_by_title(&settings, "demo", "Fix login bug").expect("done");

        let tasks = list_tasks(&settings, &Scope::Project("demo".to_string())).expect("list");
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0].task;
        assert_eq!(task.status, Status::Done);
        assert_eq!(task.pomodoro_count, 1);
        assert_eq!(task.duration, 25);
        assert!(task.start_date.is_some());
        assert!(task.done_date.is_some());
        assert_eq!(tasks[0].body, "Repro notes");
    }

    #[test]
    fn mark_done_by_title_second_call_is_soft_failure() {
        let temp = TempDir::new().expect("tempdir");
        let settings = Settings::with_vault(temp.path().display().to_string());
        create_task(&settings, "demo", "Repeat", "", 0).expect("create");

        mark_done_by_title(&settings, "demo", "Repeat").expect("first");
        let first_done = find_by_title(&settings, "demo", "Repeat")
            .expect("find")
            .task
            .done_date;

        let second = mark_done_by_title(&settings, "demo", "Repeat");
        assert!(matches!(
            second,
            Err(LifecycleError::Transition(TransitionError::AlreadyDone(_)))
        ));
        let after = find_by_title(&settings, "demo", "Repeat")
            .expect("find")
            .task
            .done_date;
        assert_eq!(after, first_done);
    }

    #[test]
    fn log_interval_for_issue_updates_linked_task() {
        let temp = TempDir::new().expect("tempdir");
        let settings = Settings::with_vault(temp.path().display().to_string());
        create_task(&settings, "demo", "Linked", "", 42).expect("create");

        let stored = log_interval_for_issue(&settings, "demo", 42, 25)
            .expect("log")
            .expect("linked task");
        assert_eq!(stored.task.pomodoro_count, 1);
        assert_eq!(stored.task.duration, 25);

        let reread = find_by_title(&settings, "demo", "Linked").expect("find");
        assert_eq!(reread.task.pomodoro_count, 1);
        assert_eq!(reread.task.duration, 25);
    }
}
