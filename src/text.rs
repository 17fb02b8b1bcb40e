// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Message body sanitizing and URL linkification.
//!
//! Message text is exported with literal `\n` escapes and may contain
//! characters that Markdown would misread. [`sanitize`] turns a raw body into
//! Markdown that renders as the sender wrote it, with bare URLs turned into
//! links.
//!
//! Sanitizing already-sanitized text is a no-op: links of the form
//! `[url](url)` are left alone and brackets that already carry a backslash
//! are not escaped twice.

use regex::Regex;
use std::sync::LazyLock;

const URL_PATTERN: &str = r"http(?:[^.\s]+\.[^.\s]*)+[^.\s]{2,}";

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("({URL_PATTERN})")).expect("valid URL pattern"));

static WHOLE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^(?:{URL_PATTERN})$")).expect("valid URL pattern"));

/// Rewrites every URL-shaped substring into a Markdown link `[url](url)`.
///
/// # Example
///
/// ```
/// use dm2epub::text::to_link;
///
/// assert_eq!(
///     to_link("see http://example.com/x.html now"),
///     "see [http://example.com/x.html](http://example.com/x.html) now",
/// );
/// ```
#[must_use]
pub fn to_link(text: &str) -> String {
    URL.replace_all(text, "[${1}](${1})").into_owned()
}

/// Converts a raw message body into Markdown.
///
/// Trims surrounding whitespace, expands literal `\n` escapes into line
/// breaks, escapes `[` and linkifies URLs.
///
/// # Example
///
/// ```
/// use dm2epub::text::sanitize;
///
/// let once = sanitize("  [sic] see http://example.com/a.html\\nbye ");
/// assert_eq!(
///     once,
///     "\\[sic] see [http://example.com/a.html](http://example.com/a.html)\nbye"
/// );
/// assert_eq!(sanitize(&once), once);
/// ```
#[must_use]
pub fn sanitize(text: &str) -> String {
    let expanded = text.trim().replace("\\n", "\n");
    let body = expanded.trim();

    let mut out = String::with_capacity(body.len() + body.len() / 4);
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = body[cursor..].find('[') {
        let open = cursor + offset;
        if let Some(len) = self_link_len(&body[open..]) {
            out.push_str(&linkify_plain(&body[plain_start..open]));
            out.push_str(&body[open..open + len]);
            plain_start = open + len;
            cursor = plain_start;
        } else {
            cursor = open + 1;
        }
    }
    out.push_str(&linkify_plain(&body[plain_start..]));

    out
}

/// Escapes unescaped brackets, then linkifies URLs.
fn linkify_plain(segment: &str) -> String {
    if segment.is_empty() {
        return String::new();
    }
    to_link(&escape_brackets(segment))
}

/// Prefixes each `[` with a backslash unless it already has one.
fn escape_brackets(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    let mut prev = None;
    for c in s.chars() {
        if c == '[' && prev != Some('\\') {
            result.push('\\');
        }
        result.push(c);
        prev = Some(c);
    }
    result
}

/// Returns the byte length of a `[url](url)` link at the start of `s`.
///
/// Both halves must be identical and the label must be a URL in its own
/// right, which is exactly what [`to_link`] produces. URLs may themselves
/// contain `](`, so the longest such link wins.
fn self_link_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('[')?;
    rest.rmatch_indices("](").find_map(|(split, _)| {
        let label = &rest[..split];
        let target = rest[split + 2..].strip_prefix(label)?;
        (target.starts_with(')') && WHOLE_URL.is_match(label)).then_some(2 * split + 4)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_url_in_sentence() {
        assert_eq!(
            to_link("see http://example.com/x.html now"),
            "see [http://example.com/x.html](http://example.com/x.html) now"
        );
    }

    #[test]
    fn links_multiple_urls() {
        assert_eq!(
            to_link("https://a.org/x and https://b.org/y"),
            "[https://a.org/x](https://a.org/x) and [https://b.org/y](https://b.org/y)"
        );
    }

    #[test]
    fn leaves_text_without_urls() {
        assert_eq!(to_link("no links here."), "no links here.");
        assert_eq!(to_link("http alone"), "http alone");
    }

    #[test]
    fn does_not_swallow_trailing_full_stop() {
        assert_eq!(
            to_link("visit https://rust-lang.org."),
            "visit [https://rust-lang.org](https://rust-lang.org)."
        );
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize("  hello \n"), "hello");
    }

    #[test]
    fn expands_escaped_newlines() {
        assert_eq!(sanitize("one\\ntwo\\nthree"), "one\ntwo\nthree");
    }

    #[test]
    fn trims_expanded_trailing_newline() {
        assert_eq!(sanitize("bye\\n"), "bye");
    }

    #[test]
    fn escapes_brackets() {
        assert_eq!(sanitize("[1] and [2]"), "\\[1] and \\[2]");
    }

    #[test]
    fn does_not_escape_escaped_bracket() {
        assert_eq!(sanitize("\\[done]"), "\\[done]");
    }

    #[test]
    fn keeps_existing_self_link() {
        let link = "[http://example.com/x.html](http://example.com/x.html)";
        assert_eq!(sanitize(link), link);
    }

    #[test]
    fn escapes_foreign_markdown_link() {
        assert_eq!(
            sanitize("[docs](http://example.com/docs)"),
            "\\[docs]([http://example.com/docs)](http://example.com/docs))"
        );
    }

    #[test]
    fn sanitize_is_idempotent() {
        let samples = [
            "see http://example.com/x.html now",
            "[a] [b] \\[c]",
            "  line\\nbreak http://t.co/abcdef\\n  ",
            "http://a.com/[x].html",
            "text with [http://example.com/a.b](http://example.com/a.b) link",
            "see http://example.com/ab](http://example.com/ab) now",
            "[docs](http://example.com/docs)",
            "",
            "plain",
        ];
        for raw in samples {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn keeps_link_whose_url_contains_bracket_paren() {
        let url = "http://example.com/ab](http://example.com/ab)";
        let once = sanitize(&format!("see {url} now"));

        assert_eq!(once, format!("see [{url}]({url}) now"));
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn detects_self_link_length() {
        let link = "[http://a.com/xy](http://a.com/xy)";
        assert_eq!(self_link_len(&format!("{link} tail")), Some(link.len()));
        assert_eq!(self_link_len("[label](http://a.com/xy)"), None);
        assert_eq!(self_link_len("[x](x)"), None);

        let nested = "[http://a.com/ab](http://a.com/ab)](http://a.com/ab](http://a.com/ab))";
        assert_eq!(self_link_len(nested), Some(nested.len()));
    }
}
