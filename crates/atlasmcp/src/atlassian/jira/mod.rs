pub mod create;
pub mod get;
pub mod search;
pub mod transition;
pub mod update;

// Re-export public data functions for the MCP tool handlers and REST routes
pub use create::{create_issue_data, CreateIssueParams};
pub use get::get_issue_data;
pub use search::{assigned_issues_data, search_issues_data, AssignedIssuesOutput};
pub use transition::{
    assign_issue_data, link_to_epic_data, transition_issue_data, TransitionOutcome,
};
pub use update::{bulk_edit_issues_data, update_issue_data};
