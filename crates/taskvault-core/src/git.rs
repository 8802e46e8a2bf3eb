use std::process::Command;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;

static ISSUE_BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-").expect("regex"));
static ISSUE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://github\.com/.+/issues/(\d+)").expect("regex"));

pub fn is_git_repository() -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

pub fn has_github_remote() -> bool {
    run_capture("git", &["remote", "-v"])
        .map(|output| output.contains("github.com"))
        .unwrap_or(false)
}

pub fn gh_available() -> bool {
    which::which("gh").is_ok()
}

/// Resolves the project scope name: GitHub remote repository name, else the
/// repository top-level directory name, else the current directory name.
pub fn project_name() -> Option<String> {
    if is_git_repository() {
        if let Ok(url) = run_capture("git", &["config", "--get", "remote.origin.url"]) {
            if let Some(name) = repo_name_from_remote_url(&url) {
                return Some(name);
            }
        }
        if let Ok(toplevel) = run_capture("git", &["rev-parse", "--show-toplevel"]) {
            if let Some(name) = path_basename(&toplevel) {
                return Some(name);
            }
        }
    }
    let cwd = std::env::current_dir().ok()?;
    cwd.file_name()
        .map(|name| name.to_string_lossy().to_string())
}

fn path_basename(path: &str) -> Option<String> {
    std::path::Path::new(path.trim())
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
}

pub fn repo_name_from_remote_url(url: &str) -> Option<String> {
    let url = url.trim();
    if !url.contains("github.com") {
        return None;
    }
    let (_, repo_path) = url.split_once(':')?;
    let repo_path = repo_path.trim_end_matches(".git");
    repo_path
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
}

pub fn current_branch() -> Result<String> {
    run_capture("git", &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// Branches created by `gh issue develop` are named `<issue>-<slug>`.
pub fn issue_number_from_branch(branch: &str) -> Option<u32> {
    ISSUE_BRANCH_RE
        .captures(branch)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Creates a GitHub issue and returns its number, parsed from the issue URL
/// `gh` prints.
pub fn create_issue(title: &str, body: &str) -> Result<u32> {
    let output = run_capture("gh", &["issue", "create", "--title", title, "--body", body])?;
    let number = ISSUE_URL_RE
        .captures(&output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .with_context(|| format!("no issue number in gh output: {output}"))?;
    Ok(number)
}

pub fn start_issue_development(issue: u32) -> Result<()> {
    run_passthrough(
        "gh",
        &["issue", "develop", &issue.to_string(), "--checkout"],
    )
}

pub fn issue_title(issue: u32) -> Result<String> {
    let output = run_capture("gh", &["issue", "view", &issue.to_string(), "--json", "title"])?;
    let value: serde_json::Value =
        serde_json::from_str(&output).context("parse issue title JSON")?;
    value
        .get("title")
        .and_then(|title| title.as_str())
        .map(|title| title.to_string())
        .context("issue title missing from gh output")
}

pub fn push() -> Result<()> {
    run_passthrough("git", &["push"])
}

pub fn create_pull_request(title: &str, issue: u32) -> Result<()> {
    let body = format!("Closes #{issue}");
    run_passthrough("gh", &["pr", "create", "--title", title, "--body", &body])
}

/// Squash-merges the current pull request and deletes its branch.
pub fn merge_pull_request() -> Result<()> {
    run_passthrough("gh", &["pr", "merge", "-d", "-s"])
}

fn run_capture(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("run {program}"))?;
    if !output.status.success() {
        bail!(
            "{} {} failed: {}",
            program,
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn run_passthrough(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("run {program}"))?;
    if !status.success() {
        bail!("{} {} failed", program, args.join(" "));
    }
    Ok(())
}
