//! Reduce editor markup (markdown plus govspeak callouts) to plain text for
//! search indexing.

use std::sync::LazyLock;

use regex::Regex;

/// `[text](url)` and `![alt](url)`.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

/// Headings, block quotes and list markers at the start of a line.
static LINE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]{0,3}(?:#{1,6}|>|[-*+]|\d+\.)[ \t]+").expect("valid regex")
});

/// Govspeak block markers such as `$CTA`, `$E` and `$A`.
static GOVSPEAK_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[A-Z]+\b").expect("valid regex"));

/// Inline delimiters wrapping a run of text: strong, emphasis, code and the
/// govspeak `^info^`, `%warning%` and `@important@` callouts. A delimiter only
/// counts at a word edge, so `visa_form` and `help@fco.gov.uk` are left alone.
static INLINE_PAIR_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        ("**", '*'),
        ("__", '_'),
        ("*", '*'),
        ("_", '_'),
        ("`", '`'),
        ("^", '^'),
        ("%", '%'),
        ("@", '@'),
    ]
    .into_iter()
    .map(|(delim, ch)| {
        let d = regex::escape(delim);
        let c = regex::escape(&ch.to_string());
        Regex::new(&format!(
            r"(^|[\s(\[]){d}([^\s{c}](?:[^{c}\n]*[^\s{c}])?){d}($|[\s).,;:!?\]])"
        ))
        .expect("valid regex")
    })
    .collect()
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip markup and collapse whitespace.
pub fn strip_markup(text: &str) -> String {
    let text = LINK_RE.replace_all(text, "$1");
    let text = LINE_PREFIX_RE.replace_all(&text, "");
    let text = GOVSPEAK_MARKER_RE.replace_all(&text, " ");
    collapse_whitespace(&strip_inline_pairs(text.into_owned()))
}

fn strip_inline_pairs(mut text: String) -> String {
    for re in INLINE_PAIR_RES.iter() {
        // Neighbouring pairs share the space between them, so repeat until
        // nothing matches.
        while re.is_match(&text) {
            text = re.replace_all(&text, "$1$2$3").into_owned();
        }
    }
    text
}

/// Join non-empty fragments with single spaces, collapsing inner runs.
pub fn join_text<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    fragments
        .into_iter()
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_marker_removed() {
        assert_eq!(strip_markup("## Summary"), "Summary");
    }

    #[test]
    fn emphasis_and_links_reduced_to_text() {
        assert_eq!(
            strip_markup("Read **this** and [the FCO page](https://example.com/fco)."),
            "Read this and the FCO page."
        );
    }

    #[test]
    fn list_items_and_quotes_flattened() {
        let text = "Before you go:\n\n- check your passport\n* get insurance\n> stay safe";
        assert_eq!(
            strip_markup(text),
            "Before you go: check your passport get insurance stay safe"
        );
    }

    #[test]
    fn govspeak_callouts_stripped() {
        assert_eq!(strip_markup("$CTA\nCall us\n$CTA"), "Call us");
        assert_eq!(strip_markup("^Important^ %Warning%"), "Important Warning");
    }

    #[test]
    fn adjacent_emphasis_all_removed() {
        assert_eq!(strip_markup("*one* *two* `three`"), "one two three");
        assert_eq!(strip_markup("(_see below_)"), "(see below)");
    }

    #[test]
    fn email_addresses_and_identifiers_kept() {
        assert_eq!(
            strip_markup("Email help@fco.gov.uk about visa_form #2"),
            "Email help@fco.gov.uk about visa_form #2"
        );
        assert_eq!(strip_markup("Costs 5% or 10%"), "Costs 5% or 10%");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(strip_markup("Body text"), "Body text");
    }

    #[test]
    fn join_skips_empty_fragments() {
        assert_eq!(
            join_text(["Summary", "  ", "Part One", "Body\n text"]),
            "Summary Part One Body text"
        );
    }
}
