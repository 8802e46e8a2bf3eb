//! Core domain types for taskvault: the markdown task store, the status
//! transition engine, and the git/pomodoro collaborators around them.

pub mod config;
pub mod git;
pub mod lifecycle;
pub mod pomodoro;
pub mod store;
pub mod task;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
