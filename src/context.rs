use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    CodeHostService, IssueTrackerService, TextGenerationService, VersionControlService,
};

/// Caller-owned service handles, constructed once in `main` and passed by
/// reference into commands. There are no module-level globals.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub version_control: Arc<dyn VersionControlService>,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub code_host: Arc<dyn CodeHostService>,
    pub generation: Arc<dyn TextGenerationService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        version_control: Arc<dyn VersionControlService>,
        issue_tracker: Arc<dyn IssueTrackerService>,
        code_host: Arc<dyn CodeHostService>,
        generation: Arc<dyn TextGenerationService>,
    ) -> Self {
        Self {
            config,
            version_control,
            issue_tracker,
            code_host,
            generation,
        }
    }
}
