use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::domain::fields::{FieldConfig, FieldSource, FieldSpec};
use crate::domain::generation::SamplingParams;
use crate::error::{AppError, AppResult};
use crate::services::TextGenerationService;

const DEFAULT_CONFIG_FILE: &str = "default_field_config.yaml";
const OVERRIDES_DIR: &str = "ticket_overrides";

/// Merges the default field configuration with a per-ticket override file
/// into a flat field → value map. Output always contains exactly the fields
/// declared in the defaults; one bad field never aborts the rest.
pub struct FieldResolver {
    generation: Arc<dyn TextGenerationService>,
    config_dir: PathBuf,
    interactive: bool,
}

impl FieldResolver {
    pub fn new(
        generation: Arc<dyn TextGenerationService>,
        config_dir: PathBuf,
        interactive: bool,
    ) -> Self {
        Self {
            generation,
            config_dir,
            interactive,
        }
    }

    pub async fn resolve(&self, ticket: &str) -> BTreeMap<String, String> {
        let defaults = load_config(&self.config_dir.join(DEFAULT_CONFIG_FILE));
        let override_path = self
            .config_dir
            .join(OVERRIDES_DIR)
            .join(format!("{ticket}.yaml"));
        let overrides = if override_path.exists() {
            load_config(&override_path)
        } else {
            FieldConfig::new()
        };

        let mut fields = BTreeMap::new();
        for (name, default_spec) in &defaults {
            let value = match self
                .resolve_field(ticket, name, default_spec, overrides.get(name))
                .await
            {
                Ok(value) => value,
                Err(err) => {
                    warn!("field '{name}' failed to resolve: {err}");
                    format!("<unresolved: {err}>")
                }
            };
            fields.insert(name.clone(), value);
        }
        fields
    }

    async fn resolve_field(
        &self,
        ticket: &str,
        name: &str,
        default_spec: &FieldSpec,
        override_spec: Option<&FieldSpec>,
    ) -> AppResult<String> {
        let source = override_spec
            .and_then(|spec| spec.source)
            .or(default_spec.source);

        match source {
            Some(FieldSource::Ai) => {
                let prompt = format!("Provide a short summary of the work for ticket {ticket}.");
                Ok(self
                    .generation
                    .generate(&prompt, &SamplingParams::default())
                    .await
                    .into_text())
            }
            Some(FieldSource::TicketId) => Ok(ticket.to_string()),
            Some(FieldSource::Manual) => {
                match override_spec.and_then(|spec| spec.value.clone()) {
                    Some(value) => Ok(value),
                    None if self.interactive => prompt_for_value(name).await,
                    None => Ok(String::new()),
                }
            }
            Some(FieldSource::Default) => Ok(default_spec.value.clone().unwrap_or_default()),
            Some(FieldSource::Custom) => {
                Ok(override_spec
                    .and_then(|spec| spec.value.clone())
                    .unwrap_or_default())
            }
            Some(FieldSource::Unknown) | None => {
                warn!("field '{name}' has an unrecognized source, resolving to empty");
                Ok(String::new())
            }
        }
    }
}

/// Load a field-configuration document, failing soft to an empty map.
fn load_config(path: &Path) -> FieldConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("could not read {}: {err}", path.display());
            return FieldConfig::new();
        }
    };
    match serde_yaml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            warn!("could not parse {}: {err}", path.display());
            FieldConfig::new()
        }
    }
}

/// Interactive stdin prompt for `manual` fields. An interrupted or failed
/// prompt resolves to an empty string rather than propagating.
async fn prompt_for_value(field: &str) -> AppResult<String> {
    let prompt = format!("Please enter value for '{field}'");
    let value = tokio::task::spawn_blocking(move || {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .unwrap_or_default()
    })
    .await
    .map_err(|err| AppError::Configuration(format!("prompt task failed: {err}")))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::domain::generation::GenerationOutcome;

    struct StaticGeneration;

    #[async_trait]
    impl TextGenerationService for StaticGeneration {
        async fn generate(&self, _prompt: &str, _params: &SamplingParams) -> GenerationOutcome {
            GenerationOutcome::Generated("AI-summary".to_string())
        }

        async fn commit_message(&self, _diff: &str, _ticket: Option<&str>) -> GenerationOutcome {
            GenerationOutcome::Generated("commit".to_string())
        }

        async fn pr_description(
            &self,
            _ticket: &str,
            _diff: &str,
            _template: Option<&str>,
        ) -> GenerationOutcome {
            GenerationOutcome::Generated("description".to_string())
        }
    }

    fn resolver_with(defaults: &str, overrides: Option<(&str, &str)>) -> (FieldResolver, TempDir) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), defaults).unwrap();
        if let Some((ticket, contents)) = overrides {
            let overrides_dir = dir.path().join(OVERRIDES_DIR);
            std::fs::create_dir_all(&overrides_dir).unwrap();
            std::fs::write(overrides_dir.join(format!("{ticket}.yaml")), contents).unwrap();
        }
        let resolver = FieldResolver::new(
            Arc::new(StaticGeneration),
            dir.path().to_path_buf(),
            false,
        );
        (resolver, dir)
    }

    #[tokio::test]
    async fn no_override_returns_exactly_declared_fields() {
        let (resolver, _dir) = resolver_with(
            "jira_ticket:\n  source: ticket_id\nsummary:\n  source: default\n  value: x\n",
            None,
        );
        let fields = resolver.resolve("ABC-7").await;
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["jira_ticket"], "ABC-7");
        assert_eq!(fields["summary"], "x");
    }

    #[tokio::test]
    async fn override_supersedes_single_field_only() {
        let (resolver, _dir) = resolver_with(
            "jira_ticket:\n  source: ticket_id\nsummary:\n  source: default\n  value: x\n",
            Some(("TEST-1", "summary:\n  source: custom\n  value: overridden\n")),
        );
        let fields = resolver.resolve("TEST-1").await;
        assert_eq!(fields["jira_ticket"], "TEST-1");
        assert_eq!(fields["summary"], "overridden");
    }

    #[tokio::test]
    async fn custom_without_value_resolves_to_empty() {
        let (resolver, _dir) = resolver_with("notes:\n  source: custom\n", None);
        let fields = resolver.resolve("ABC-7").await;
        assert_eq!(fields["notes"], "");
    }

    #[tokio::test]
    async fn unknown_source_does_not_abort_later_fields() {
        let (resolver, _dir) = resolver_with(
            "broken:\n  source: telepathy\nticket:\n  source: ticket_id\n",
            None,
        );
        let fields = resolver.resolve("ABC-7").await;
        assert_eq!(fields["broken"], "");
        assert_eq!(fields["ticket"], "ABC-7");
    }

    #[tokio::test]
    async fn ai_fields_use_the_generation_service() {
        let (resolver, _dir) = resolver_with("summary:\n  source: ai\n", None);
        let fields = resolver.resolve("ABC-7").await;
        assert_eq!(fields["summary"], "AI-summary");
    }

    #[tokio::test]
    async fn manual_field_is_empty_when_not_interactive() {
        let (resolver, _dir) = resolver_with("reviewer:\n  source: manual\n", None);
        let fields = resolver.resolve("ABC-7").await;
        assert_eq!(fields["reviewer"], "");
    }

    #[tokio::test]
    async fn manual_field_takes_override_value_without_prompting() {
        let (resolver, _dir) = resolver_with(
            "reviewer:\n  source: manual\n",
            Some(("ABC-7", "reviewer:\n  value: alice\n")),
        );
        let fields = resolver.resolve("ABC-7").await;
        assert_eq!(fields["reviewer"], "alice");
    }

    #[tokio::test]
    async fn undeclared_override_fields_are_ignored() {
        let (resolver, _dir) = resolver_with(
            "jira_ticket:\n  source: ticket_id\n",
            Some(("ABC-7", "sneaky:\n  source: custom\n  value: nope\n")),
        );
        let fields = resolver.resolve("ABC-7").await;
        assert_eq!(fields.len(), 1);
        assert!(!fields.contains_key("sneaky"));
    }

    #[tokio::test]
    async fn missing_defaults_file_yields_empty_map() {
        let dir = TempDir::new().unwrap();
        let resolver = FieldResolver::new(
            Arc::new(StaticGeneration),
            dir.path().to_path_buf(),
            false,
        );
        assert!(resolver.resolve("ABC-7").await.is_empty());
    }

    #[tokio::test]
    async fn unparseable_defaults_fail_soft() {
        let (resolver, _dir) = resolver_with(":\n  - not yaml mapping {{{", None);
        assert!(resolver.resolve("ABC-7").await.is_empty());
    }
}
