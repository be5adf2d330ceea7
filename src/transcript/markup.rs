use regex::Regex;
use std::sync::LazyLock;

// HTML-ish styling tags: <i>, </i>, <font color="#fff">, <b>
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^<>\n]*>").expect("tag regex"));

// ASS override blocks: {\an8}, {\i1}
static OVERRIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\\[^{}\n]*\}").expect("override regex"));

/// Remove styling markup from a raw transcript.
///
/// Runs to a fixed point, so `strip_markup(strip_markup(x)) == strip_markup(x)`.
/// Never matches across a newline and never touches `-->` timing lines.
pub fn strip_markup(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let without_tags = TAG.replace_all(&current, "");
        let next = OVERRIDE.replace_all(&without_tags, "").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}
