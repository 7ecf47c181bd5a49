//! Markup stripping
//!
//! Removes every HTML tag and attribute from user text. Elements whose content is
//! not meant to be displayed (scripts, styles, ...) are dropped together with
//! their content. Everything else is kept as plain text.

use regex::Regex;
use std::sync::LazyLock;

const NON_TEXT_ELEMENTS: [&str; 6] = ["script", "style", "textarea", "noscript", "option", "iframe"];

/// `<script ...>...</script>` and friends; an unclosed element swallows the rest
static NON_TEXT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = NON_TEXT_ELEMENTS
        .iter()
        .map(|tag| format!(r"<{tag}\b[^>]*>.*?(?:</{tag}\s*>|\z)"))
        .collect();
    Regex::new(&format!("(?is){}", alternatives.join("|"))).expect("Invalid non-text regex")
});

static COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("Invalid comment regex"));

/// Any tag, including quoted attribute values that contain `>`
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"</?[a-zA-Z][^>"']*(?:(?:"[^"]*"|'[^']*')[^>"']*)*>|<[!?][^>]*>"#)
        .expect("Invalid tag regex")
});

/// Tag opened at the very end of the input and never closed, possibly inside an
/// unclosed quoted attribute
static UNTERMINATED_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[a-zA-Z/!?](?:[^>"']|"[^"]*"|'[^']*')*(?:"[^"]*|'[^']*)?\z"#)
        .expect("Invalid unterminated tag regex")
});

fn strip_once(input: &str) -> String {
    let without_elements = NON_TEXT_REGEX.replace_all(input, "");
    let without_comments = COMMENT_REGEX.replace_all(&without_elements, "");
    let without_tags = TAG_REGEX.replace_all(&without_comments, "");
    UNTERMINATED_TAG_REGEX
        .replace(&without_tags, "")
        .into_owned()
}

/// Strip all markup from `input`, returning plain text
///
/// Repeats until nothing changes, since removing an inner tag can splice the
/// surrounding text into a new one.
pub fn strip_markup(input: &str) -> String {
    let mut current = strip_once(input);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_simple_tags() {
        assert_eq!(strip_markup("<b>hi</b>"), "hi");
        assert_eq!(strip_markup("<p>Hello <em>there</em></p>"), "Hello there");
    }

    #[test]
    fn test_drops_script_content() {
        assert_eq!(strip_markup("<script>x</script>world"), "world");
        assert_eq!(
            strip_markup("a<SCRIPT type=\"text/javascript\">alert(1)</SCRIPT>b"),
            "ab"
        );
        assert_eq!(strip_markup("<style>p { color: red }</style>text"), "text");
        assert_eq!(strip_markup("before<script>never closed"), "before");
    }

    #[test]
    fn test_strips_attributes_with_angle_brackets() {
        assert_eq!(strip_markup(r#"<a href="x>y" onclick='z>w'>link</a>"#), "link");
        assert_eq!(strip_markup(r#"<img src=x onerror="alert(1)">"#), "");
    }

    #[test]
    fn test_nested_tags_cannot_reassemble() {
        assert_eq!(strip_markup("<<b>script>alert(1)<</b>/script>"), "");
        assert_eq!(strip_markup("<<i>b>bold<</i>/b>"), "bold");
        assert!(!strip_markup("x<<<b>b>>img src=y>").contains("<img"));
    }

    #[test]
    fn test_drops_unterminated_trailing_tag() {
        assert_eq!(strip_markup("hi <img src=x onerror=alert(1)").trim(), "hi");
        assert_eq!(strip_markup("hi </b"), "hi ");
        assert_eq!(strip_markup(r#"ok <a title="x>y"#), "ok ");
        assert_eq!(strip_markup("3 <4"), "3 <4");
    }

    #[test]
    fn test_strips_comments_and_doctype() {
        assert_eq!(strip_markup("a<!-- hidden -->b"), "ab");
        assert_eq!(strip_markup("<!DOCTYPE html>doc"), "doc");
    }

    #[test]
    fn test_keeps_plain_text() {
        assert_eq!(strip_markup("a < b and 3<4"), "a < b and 3<4");
        assert_eq!(strip_markup("no markup here"), "no markup here");
        assert_eq!(strip_markup("你好 <i>世界</i>"), "你好 世界");
    }

    #[test]
    fn test_markup_only_becomes_blank() {
        assert_eq!(strip_markup("<p>   </p>").trim(), "");
        assert_eq!(strip_markup("<br/><hr>"), "");
    }
}
