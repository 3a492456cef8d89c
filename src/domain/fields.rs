use std::collections::BTreeMap;

use serde::Deserialize;

/// Where a PR-template field gets its value from.
///
/// Closed set matched exhaustively; values outside it deserialize to
/// `Unknown` and resolve to an empty string rather than failing the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Ai,
    TicketId,
    Manual,
    Default,
    Custom,
    #[serde(other)]
    Unknown,
}

/// One entry of a field-configuration document. Both keys are optional in
/// the YAML; the resolver decides what absence means per source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSpec {
    pub source: Option<FieldSource>,
    pub value: Option<String>,
}

/// Shape of `default_field_config.yaml` and of per-ticket override files.
pub type FieldConfig = BTreeMap<String, FieldSpec>;
