pub mod branch;
pub mod fields;
pub mod generation;
pub mod pull_request;
