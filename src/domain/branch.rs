use regex::Regex;

/// Longest slug segment we embed after `{type}/{TICKET}-`.
const SLUG_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchName(pub String);

impl BranchName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build `{branch_type}/{TICKET}-{slug}`, or `{branch_type}/{TICKET}`
    /// when no usable summary is available.
    pub fn for_ticket(branch_type: &str, ticket: &str, summary: Option<&str>) -> Self {
        let ticket = ticket.trim();
        let slug = summary.map(slugify).filter(|slug| !slug.is_empty());
        match slug {
            Some(slug) => Self(format!("{branch_type}/{ticket}-{slug}")),
            None => Self(format!("{branch_type}/{ticket}")),
        }
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase, ASCII-alphanumeric-and-dash slug, capped at [`SLUG_LIMIT`].
pub fn slugify(input: &str) -> String {
    let mut result = String::with_capacity(input.len().min(SLUG_LIMIT));
    let mut prev_dash = true;
    for ch in input.chars() {
        if result.len() >= SLUG_LIMIT {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            result.push('-');
            prev_dash = true;
        }
    }
    result.trim_matches('-').to_string()
}

/// Pull a `PROJ-123` style ticket id out of free text (typically a branch
/// name like `feature/ABC-42-do-the-thing`).
pub fn extract_ticket_id(text: &str) -> Option<String> {
    let pattern = Regex::new(r"[A-Z][A-Z0-9]*-\d+").ok()?;
    pattern.find(text).map(|m| m.as_str().to_string())
}
