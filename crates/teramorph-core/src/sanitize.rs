//! Field sanitization.
//!
//! Untrusted form input is normalized before anything else looks at it.
//! Single-line fields lose control characters and repeated whitespace;
//! the message keeps its line structure but with at most one blank line
//! in a row. Length caps count characters, not bytes, and apply last.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of the first and last name fields.
pub const NAME_MAX_CHARS: usize = 120;

/// Maximum length of the email field (RFC 5321 path limit).
pub const EMAIL_MAX_CHARS: usize = 254;

/// Maximum length of the message field.
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Separator that replaces line breaks when a message is stored.
pub const LINE_DELIMITER: &str = " | ";

static CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| static_regex(r"[\x00-\x1F\x7F]"));

/// Same as [`CONTROL_CHARS`] minus tab and line feed.
static CONTROL_CHARS_MULTILINE: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]"));

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| static_regex(r"\s{2,}"));

static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| static_regex(r"\n{3,}"));

/// Compile a pattern written into the source. Only ever called with
/// literals covered by the unit tests.
#[allow(clippy::expect_used)]
pub(crate) fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile")
}

/// Clean a single-line field.
///
/// Control characters become spaces, runs of two or more whitespace
/// characters collapse to one space, and the result is cut to `max_chars`
/// characters. Ends are trimmed both before and after the cut.
#[must_use]
pub fn clean_line(input: &str, max_chars: usize) -> String {
    let spaced = CONTROL_CHARS.replace_all(input, " ");
    let collapsed = WHITESPACE_RUN.replace_all(&spaced, " ");
    truncate_chars(collapsed.trim(), max_chars)
        .trim_end()
        .to_owned()
}

/// Clean a multiline field.
///
/// Line endings are normalized to `\n`, control characters other than tab
/// and newline become spaces, three or more consecutive newlines collapse
/// to two, and the result is cut to `max_chars` characters with the ends
/// trimmed before and after the cut.
#[must_use]
pub fn clean_multiline(input: &str, max_chars: usize) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    let spaced = CONTROL_CHARS_MULTILINE.replace_all(&normalized, " ");
    let collapsed = NEWLINE_RUN.replace_all(&spaced, "\n\n");
    truncate_chars(collapsed.trim(), max_chars)
        .trim_end()
        .to_owned()
}

/// Replace every line break with [`LINE_DELIMITER`] so the stored value
/// occupies a single CSV line.
#[must_use]
pub fn flatten_lines(input: &str) -> String {
    input.replace('\n', LINE_DELIMITER)
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((end, _)) => input[..end].to_owned(),
        None => input.to_owned(),
    }
}
