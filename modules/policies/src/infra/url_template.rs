//! `:name` placeholder substitution for upstream URL templates.

/// Replace every `:name` placeholder found in `params`.
///
/// Values are percent-encoded as a single path segment. Placeholders not in
/// `params` and colons not followed by a name (`https:`, `host:8443`) are
/// left untouched.
#[must_use]
pub fn render(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(':') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..name_len];

        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) if !name.is_empty() => {
                out.push_str(&urlencoding::encode(value));
            }
            _ => {
                out.push(':');
                out.push_str(name);
            }
        }
        rest = &after[name_len..];
    }
    out.push_str(rest);
    out
}
