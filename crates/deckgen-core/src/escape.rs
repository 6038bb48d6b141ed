//! Markup escaping shared by every backend.
//!
//! Every string supplied by a user or a model passes through [`escape_markup`]
//! exactly once, at the point it is written into markup. Stages before the
//! backends keep text raw.

use std::borrow::Cow;

/// Replace `< > & " '` with their named entities.
///
/// Borrows when there is nothing to escape.
pub fn escape_markup(s: &str) -> Cow<'_, str> {
    let Some(first) = s.find(['<', '>', '&', '"', '\'']) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len() + 16);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Drop characters XML 1.0 cannot carry (most C0 controls).
///
/// Model output occasionally contains stray control bytes; a single one
/// makes the whole part unreadable.
pub fn strip_invalid_xml_chars(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| is_xml_char(c)).collect())
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Escape for insertion into XML text or attribute content.
pub fn escape_xml_text(s: &str) -> String {
    escape_markup(&strip_invalid_xml_chars(s)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_five() {
        assert_eq!(
            escape_markup(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_borrowed_when_clean() {
        assert!(matches!(escape_markup("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_once() {
        let once = escape_markup("AI & Robots");
        assert_eq!(once, "AI &amp; Robots");
        assert!(!once.contains("&amp;amp;"));
    }

    #[test]
    fn test_strip_control_chars() {
        assert_eq!(escape_xml_text("a\u{0}b\u{7}c\td"), "abc\td");
    }
}
