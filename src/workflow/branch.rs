use tracing::warn;

use crate::context::AppContext;
use crate::domain::branch::BranchName;
use crate::domain::generation::SamplingParams;
use crate::error::AppResult;
use crate::services::TextGenerationService;

pub struct BranchOutcome {
    pub branch: BranchName,
    pub created: bool,
    pub checked_out: bool,
}

/// Create or check out the branch for a ticket.
///
/// Summary lookup is best-effort: on tracker failure the branch name falls
/// back to the ticket-only form instead of aborting.
pub async fn create_branch_for_ticket(
    ctx: &AppContext,
    ticket: &str,
    branch_type: &str,
) -> AppResult<BranchOutcome> {
    match ctx.version_control.is_clean().await {
        Ok(true) => {}
        Ok(false) => warn!("working tree has uncommitted changes, they will follow the checkout"),
        Err(err) => warn!("could not check working tree status: {err}"),
    }

    let summary = match ctx.issue_tracker.issue_summary(ticket).await {
        Ok(summary) => Some(summary),
        Err(err) => {
            warn!("summary lookup for {ticket} failed, using ticket-only branch name: {err}");
            None
        }
    };

    let summary = match summary {
        Some(text) if !text.is_ascii() => {
            Some(transliterate(ctx.generation.as_ref(), &text).await)
        }
        other => other,
    };

    let branch = BranchName::for_ticket(branch_type, ticket, summary.as_deref());

    let existing = ctx.version_control.local_branches().await;
    let created = !existing.iter().any(|name| name == branch.as_str());
    let checked_out = ctx.version_control.checkout(&branch, created).await;

    // Re-checking-out an existing branch: bring it up to date, best-effort.
    if checked_out && !created {
        if let Err(err) = ctx.version_control.pull_latest().await {
            warn!("could not pull latest for {branch}: {err}");
        }
    }

    Ok(BranchOutcome {
        branch,
        created,
        checked_out,
    })
}

/// Ask the generation service for an ASCII rendition of a non-ASCII
/// summary; strip to ASCII ourselves when generation degrades or answers
/// with more non-ASCII text.
async fn transliterate(generation: &dyn TextGenerationService, text: &str) -> String {
    let prompt = format!(
        "Transliterate the following text into plain ASCII English. Reply with the text only:\n{text}"
    );
    let outcome = generation.generate(&prompt, &SamplingParams::default()).await;
    if !outcome.is_degraded() && outcome.text().is_ascii() {
        outcome.into_text()
    } else {
        text.chars().filter(char::is_ascii).collect()
    }
}
