use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Settings;
use crate::lifecycle::now_datetime;
use crate::task::{decode_task, encode_task, Task, TaskParseError};

/// Directory name holding task files inside a project (or the vault root for
/// the all-projects listing).
pub const TASK_DIR_NAME: &str = "Tasky";

pub const TASK_FILE_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task '{0}' not found")]
    NotFound(String),
    #[error("invalid task file: {0}")]
    Parse(#[from] TaskParseError),
    #[error("task store IO error: {0}")]
    Io(#[from] io::Error),
}

/// Which part of the vault an operation reads from. A project scope reads
/// `<vault>/<project>/Tasky`; the all-projects scope reads `<vault>/Tasky`.
/// The asymmetry matches the historical vault layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Project(String),
    All,
}

impl Scope {
    pub fn root(&self, settings: &Settings) -> PathBuf {
        let vault = Path::new(&settings.general.vault_path);
        match self {
            Scope::Project(name) => vault.join(name).join(TASK_DIR_NAME),
            Scope::All => vault.join(TASK_DIR_NAME),
        }
    }
}

/// A decoded task together with its storage identity.
#[derive(Debug, Clone)]
pub struct StoredTask {
    pub task: Task,
    pub body: String,
    pub path: PathBuf,
}

/// Recursively collects `.md` files under `root` in sorted walk order.
/// A missing root is an empty store, not an error; an IO failure mid-walk
/// aborts the scan and discards partial results.
pub fn list_markdown_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    collect_markdown_files(root, &mut files)?;
    Ok(files)
}

fn collect_markdown_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_markdown_files(&path, files)?;
        } else if has_task_extension(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn has_task_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == TASK_FILE_EXTENSION)
        .unwrap_or(false)
}

/// Walks `root` and returns the first decoded task matching `predicate`,
/// without visiting the rest of the tree. Files that fail to read or decode
/// are skipped. Duplicate matches are resolved by walk order.
pub fn find_first<F>(root: &Path, predicate: F) -> Result<Option<StoredTask>, StoreError>
where
    F: Fn(&Task) -> bool,
{
    if !root.exists() {
        return Ok(None);
    }
    find_in_dir(root, &predicate)
}

fn find_in_dir<F>(dir: &Path, predicate: &F) -> Result<Option<StoredTask>, StoreError>
where
    F: Fn(&Task) -> bool,
{
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            if let Some(found) = find_in_dir(&path, predicate)? {
                return Ok(Some(found));
            }
            continue;
        }
        if !has_task_extension(&path) {
            continue;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => continue,
        };
        if let Ok((task, body)) = decode_task(&text) {
            if predicate(&task) {
                return Ok(Some(StoredTask { task, body, path }));
            }
        }
    }
    Ok(None)
}

/// Decodes every candidate file under the scope root. Malformed or unreadable
/// files are skipped with a warning so one corrupt file never hides the rest.
pub fn list_tasks(settings: &Settings, scope: &Scope) -> Result<Vec<StoredTask>, StoreError> {
    let root = scope.root(settings);
    let mut tasks = Vec::new();
    for path in list_markdown_files(&root)? {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("warning: skipping {}: {}", path.display(), err);
                continue;
            }
        };
        match decode_task(&text) {
            Ok((task, body)) => tasks.push(StoredTask { task, body, path }),
            Err(err) => eprintln!("warning: skipping {}: {}", path.display(), err),
        }
    }
    Ok(tasks)
}

/// Case-insensitive exact title match; first match in walk order wins.
pub fn find_by_title(
    settings: &Settings,
    project: &str,
    title: &str,
) -> Result<StoredTask, StoreError> {
    let root = Scope::Project(project.to_string()).root(settings);
    let needle = title.to_lowercase();
    find_first(&root, |task| task.title.to_lowercase() == needle)?
        .ok_or_else(|| StoreError::NotFound(title.to_string()))
}

pub fn find_by_issue(
    settings: &Settings,
    project: &str,
    issue: u32,
) -> Result<StoredTask, StoreError> {
    if issue == 0 {
        return Err(StoreError::NotFound(format!("issue #{issue}")));
    }
    let root = Scope::Project(project.to_string()).root(settings);
    find_first(&root, |task| task.issue == issue)?
        .ok_or_else(|| StoreError::NotFound(format!("issue #{issue}")))
}

/// Creates a new Todo record. The filename is the lowercased title with
/// spaces replaced by hyphens, prefixed with `<issue>-` when an issue is
/// linked; collisions get an incrementing numeric suffix, re-checking
/// existence on every candidate.
pub fn create_task(
    settings: &Settings,
    project: &str,
    title: &str,
    body: &str,
    issue: u32,
) -> Result<PathBuf, StoreError> {
    let dir = Scope::Project(project.to_string()).root(settings);
    fs::create_dir_all(&dir)?;

    let mut task = Task::new(title, now_datetime());
    task.issue = issue;

    let slug = title.to_lowercase().replace(' ', "-");
    let base = if issue != 0 {
        format!("{issue}-{slug}")
    } else {
        slug
    };
    let mut path = dir.join(format!("{base}.{TASK_FILE_EXTENSION}"));
    let mut attempt: u64 = 1;
    while path.exists() {
        path = dir.join(format!("{base}-{attempt}.{TASK_FILE_EXTENSION}"));
        attempt += 1;
    }

    save_task(&path, &task, body)?;
    Ok(path)
}

/// Re-encodes and overwrites the file at `path`. Not atomic; a crash
/// mid-write can truncate the file.
pub fn save_task(path: &Path, task: &Task, body: &str) -> Result<(), StoreError> {
    let content = encode_task(task, body)?;
    fs::write(path, content)?;
    Ok(())
}
