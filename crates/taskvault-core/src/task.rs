use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskParseError {
    #[error("missing front matter delimiter")]
    MissingFrontMatter,
    #[error("missing closing --- for front matter")]
    MissingFrontMatterEnd,
    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "todo")]
    Todo,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in progress",
            Status::Done => "done",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Status::Todo => "☐",
            Status::InProgress => "➜",
            Status::Done => "✓",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One task record, mirroring the frontmatter block of a task file.
/// Field order is emission order; optional fields are omitted when unset so
/// rewrites stay diff-minimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub status: Status,
    #[serde(default)]
    pub created_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default)]
    pub pomodoro_count: u32,
    /// Linked issue number; 0 means no issue is linked.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub issue: u32,
    /// Cumulative minutes of completed work intervals.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration: u32,
}

impl Task {
    pub fn new(title: &str, created_date: String) -> Self {
        Self {
            title: title.to_string(),
            status: Status::Todo,
            created_date,
            done_date: None,
            start_date: None,
            pomodoro_count: 0,
            issue: 0,
            duration: 0,
        }
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

pub fn split_front_matter(text: &str) -> Result<(String, String), TaskParseError> {
    if !text.starts_with("---") {
        return Err(TaskParseError::MissingFrontMatter);
    }
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() || lines[0].trim() != "---" {
        return Err(TaskParseError::MissingFrontMatter);
    }
    let mut end_idx = None;
    for (idx, line) in lines.iter().enumerate().skip(1) {
        if line.trim() == "---" {
            end_idx = Some(idx);
            break;
        }
    }
    let end_idx = end_idx.ok_or(TaskParseError::MissingFrontMatterEnd)?;
    let front = lines[1..end_idx].join("\n");
    let body = lines[end_idx + 1..].join("\n");
    Ok((front, body))
}

/// Parses a raw task file into its record and free-text body. The body is the
/// remainder after the closing delimiter, trimmed of surrounding whitespace.
/// Unrecognized frontmatter keys are accepted and ignored.
pub fn decode_task(text: &str) -> Result<(Task, String), TaskParseError> {
    let (front, body) = split_front_matter(text)?;
    let task: Task = serde_yaml::from_str(&front)?;
    Ok((task, body.trim().to_string()))
}

/// Renders a record and body back into the on-disk layout. Left inverse of
/// [`decode_task`] for any record and whitespace-trimmed body.
pub fn encode_task(task: &Task, body: &str) -> Result<String, TaskParseError> {
    let front = serde_yaml::to_string(task)?;
    Ok(format!("---\n{front}---\n\n{body}"))
}
