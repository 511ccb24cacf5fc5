//! Inbound Adapters - Request handling

pub mod issue_controller;

pub use issue_controller::{Headers, IssueController, IssueDto, Response};
