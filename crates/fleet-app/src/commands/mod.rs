//! CLI Commands

pub mod create_issue;
pub mod replay;

pub use create_issue::CreateIssueCommand;
pub use replay::ReplayCommand;
