/// Characters removed from free-text input before escaping
pub const BLACKLIST: &[char] = &['$', '{', '}', '\\', '\0'];

/// How a string field is cleaned once it passes validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitize {
    None,
    Trim,
    Text,
    /// Identifiers: hex digits compare equal in any case
    Lowercase,
}

impl Sanitize {
    pub fn apply(self, input: &str) -> String {
        match self {
            Sanitize::None => input.to_string(),
            Sanitize::Trim => input.trim().to_string(),
            Sanitize::Text => escape(&strip_blacklisted(input)).trim().to_string(),
            Sanitize::Lowercase => input.trim().to_ascii_lowercase(),
        }
    }
}

pub fn strip_blacklisted(input: &str) -> String {
    input.chars().filter(|c| !BLACKLIST.contains(c)).collect()
}

/// HTML-escape the characters that are significant in markup
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_strips_escapes_and_trims() {
        assert_eq!(Sanitize::Text.apply("  Group 001 "), "Group 001");
        assert_eq!(Sanitize::Text.apply("<b>Math</b>"), "&lt;b&gt;Math&lt;&#x2F;b&gt;");
        assert_eq!(Sanitize::Text.apply("{$gt: ''}"), "gt: &#x27;&#x27;");
    }

    #[test]
    fn trim_only_keeps_content() {
        assert_eq!(Sanitize::Trim.apply(" a@b.io "), "a@b.io");
        assert_eq!(Sanitize::None.apply(" x "), " x ");
        assert_eq!(Sanitize::Lowercase.apply("507F1F77BCF86CD799439011"), "507f1f77bcf86cd799439011");
    }
}
