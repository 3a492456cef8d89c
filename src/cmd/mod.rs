pub mod branch;
pub mod branches;
pub mod commit;
pub mod describe;
pub mod generate;
pub mod pr;
pub mod serve;

use crate::error::{AppError, AppResult};

/// Yes/no confirmation on stdin. A closed or interrupted prompt counts as
/// "no" so an aborted run never half-applies anything.
pub(crate) async fn confirm(question: &str) -> AppResult<bool> {
    let question = question.to_string();
    tokio::task::spawn_blocking(move || {
        dialoguer::Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .unwrap_or(false)
    })
    .await
    .map_err(|err| AppError::Configuration(format!("prompt task failed: {err}")))
}
