pub mod bitbucket;
pub mod git;
pub mod jira;
pub mod model;
