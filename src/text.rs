//! Translation text cleanup.
//!
//! The API returns translations with inline markup such as
//! `<sup foot_note=123456>1</sup>`. Stripping the tags leaves the footnote
//! number glued to the preceding word (`bertakwa,1`, `Mīm.1`). The helpers
//! here remove the markup and then those remnants.
//!
//! [`strip_footnote_remnants`] is the one implementation of the remnant
//! heuristic. It is used both while loading verses and by the standalone
//! `fix-footnotes` pass over an existing database.
use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Maximal runs of decimal digits. Candidates for removal are filtered by
/// [`is_footnote_remnant`].
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Remove every `<...>` tag, keeping the text between tags.
pub fn strip_html(text: &str) -> Cow<'_, str> {
    HTML_TAG.replace_all(text, "")
}

/// Delete footnote-number remnants from translation text.
///
/// A remnant is a run of one or two digits that directly follows a
/// character which is neither a digit nor whitespace, and is directly
/// followed by whitespace, `,`, `.` or the end of the text:
///
/// - `"bertakwa,1"` becomes `"bertakwa,"`
/// - `"Mīm.1"` becomes `"Mīm."`
/// - `"sabar12."` becomes `"sabar."`
/// - `"ayat5nya"` and `"tahun 2020"` are left alone
///
/// This is a lexical heuristic: a genuine one- or two-digit number glued to
/// a word at a clause boundary is removed as well. Published text depends
/// on the exact behavior, so it must not be tightened.
pub fn strip_footnote_remnants(text: &str) -> Cow<'_, str> {
    let mut cleaned: Option<String> = None;
    let mut last = 0;

    for m in DIGIT_RUN.find_iter(text) {
        if !is_footnote_remnant(text, m.start(), m.end()) {
            continue;
        }
        let out = cleaned.get_or_insert_with(|| String::with_capacity(text.len()));
        out.push_str(&text[last..m.start()]);
        last = m.end();
    }

    match cleaned {
        Some(mut out) => {
            out.push_str(&text[last..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

/// Full cleanup applied to a translation at ingest time.
pub fn clean_translation(raw: &str) -> String {
    let without_tags = strip_html(raw);
    strip_footnote_remnants(&without_tags).into_owned()
}

/// `start..end` is a maximal digit run, so the character before it (if any)
/// is never a digit.
fn is_footnote_remnant(text: &str, start: usize, end: usize) -> bool {
    let run_len = text[start..end].chars().count();
    if run_len > 2 {
        return false;
    }

    let preceded = match text[..start].chars().next_back() {
        Some(c) => !c.is_whitespace(),
        None => false,
    };
    if !preceded {
        return false;
    }

    match text[end..].chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || c == ',' || c == '.',
    }
}
