use std::sync::LazyLock;

use regex::Regex;

/// `@` not preceded by a word character, then one or more tag characters.
/// Word boundaries are ASCII so `@café` yields `caf`, as in the web client.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\B)@([A-Za-z0-9_-]+)(?-u:\b)").expect("tag pattern is valid")
});

/// Extract `@tag` tokens from todo text, in order of appearance.
///
/// The leading `@` is stripped. Tags are case-sensitive and repeated tokens
/// are kept as repeated entries.
pub fn extract_tags(text: &str) -> Vec<String> {
    TAG_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Wrap every tag token (including its `@`) with `open`/`close` markers.
pub fn highlight_tags(text: &str, open: &str, close: &str) -> String {
    TAG_RE
        .replace_all(text, |caps: &regex::Captures| {
            format!("{}{}{}", open, &caps[0], close)
        })
        .into_owned()
}
