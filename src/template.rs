use std::collections::BTreeMap;

/// Substitute `{field}` placeholders with resolved values. Placeholders
/// without a resolved value are left in place so a half-filled template is
/// visibly half-filled instead of silently losing sections.
pub fn render(template: &str, fields: &BTreeMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (name, value) in fields {
        rendered = rendered.replace(&format!("{{{name}}}"), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("jira_ticket".to_string(), "ABC-1".to_string());
        fields.insert("summary".to_string(), "fix the thing".to_string());
        let out = render("# {jira_ticket}\n\n{summary}\n", &fields);
        assert_eq!(out, "# ABC-1\n\nfix the thing\n");
    }

    #[test]
    fn leaves_unknown_placeholders_visible() {
        let fields = BTreeMap::new();
        assert_eq!(render("{mystery}", &fields), "{mystery}");
    }
}
