pub mod code_host;
pub mod issue_tracker;
pub mod text_generation;
pub mod version_control;

pub use code_host::CodeHostService;
pub use issue_tracker::IssueTrackerService;
pub use text_generation::{BackendError, CompletionBackend, TextGenerationService};
pub use version_control::VersionControlService;
