use std::env;
use std::path::PathBuf;

use crate::error::AppResult;

pub const DEFAULT_MODEL_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Process configuration, read once from the environment in `main` and
/// carried by value inside `AppContext`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_server_url: Option<String>,
    pub model_command: Option<String>,
    pub jira_url: Option<String>,
    pub jira_user: Option<String>,
    pub jira_token: Option<String>,
    pub bitbucket_user: Option<String>,
    pub bitbucket_app_password: Option<String>,
    pub bitbucket_workspace: Option<String>,
    pub config_dir: PathBuf,
    pub target_branch: String,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let cwd = env::current_dir()?;
        let config_dir = env_var("BITLIFT_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.join("config"));

        Ok(Self {
            model_server_url: env_var("MODEL_SERVER_URL")
                .or_else(|| Some(DEFAULT_MODEL_SERVER_URL.to_string())),
            model_command: env_var("MODEL_COMMAND"),
            jira_url: env_var("JIRA_URL"),
            jira_user: env_var("JIRA_USER"),
            jira_token: env_var("JIRA_TOKEN"),
            bitbucket_user: env_var("BITBUCKET_USER"),
            bitbucket_app_password: env_var("BITBUCKET_APP_PASSWORD"),
            bitbucket_workspace: env_var("BITBUCKET_WORKSPACE"),
            config_dir,
            target_branch: env_var("BITLIFT_TARGET_BRANCH").unwrap_or_else(|| "main".to_string()),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
