//! Transformations for the Atlassian REST APIs.

pub mod confluence;
pub mod jira;
