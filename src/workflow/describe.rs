use std::path::Path;

use tracing::warn;

use crate::context::AppContext;
use crate::domain::generation::GenerationOutcome;
use crate::error::AppResult;
use crate::resolver::FieldResolver;
use crate::template;

/// Produce a PR description for a ticket: diff against the target branch,
/// resolve template fields, render the template and hand everything to the
/// generation service.
pub async fn generate_description(
    ctx: &AppContext,
    ticket: &str,
    template_path: &Path,
    target_branch: &str,
    interactive: bool,
) -> AppResult<GenerationOutcome> {
    let diff = ctx.version_control.diff_against(target_branch).await?;

    let resolver = FieldResolver::new(
        ctx.generation.clone(),
        ctx.config.config_dir.clone(),
        interactive,
    );
    let fields = resolver.resolve(ticket).await;

    let template_text = load_template(template_path).map(|raw| template::render(&raw, &fields));

    Ok(ctx
        .generation
        .pr_description(ticket, &diff, template_text.as_deref())
        .await)
}

/// Read the template, falling back to the committed `.example` file when
/// the named one is missing. No template at all is tolerated; the prompt
/// simply goes out without a format section.
fn load_template(path: &Path) -> Option<String> {
    if let Ok(contents) = std::fs::read_to_string(path) {
        return Some(contents);
    }
    let fallback = path.with_extension("example");
    match std::fs::read_to_string(&fallback) {
        Ok(contents) => {
            warn!(
                "template {} not found, using {}",
                path.display(),
                fallback.display()
            );
            Some(contents)
        }
        Err(_) => {
            warn!(
                "no template found at {} or {}, generating without one",
                path.display(),
                fallback.display()
            );
            None
        }
    }
}
