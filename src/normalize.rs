//! Post-reduction text clean-up passes.
//!
//! A fixed chain of whole-string rewrites that compensates for artifacts of
//! the original production tooling: typographic punctuation, adjacent style
//! spans closed and immediately reopened, hyphenated line wraps, all-caps
//! section titles set in bold, runs of spaces, and bare footnote numbers.
//!
//! The order of the chain is a contract. Dash clean-up assumes character
//! substitution has already turned en-dashes into plain hyphens, and heading
//! detection assumes whitespace is already stable; see `passes_run_in_fixed_order`.

use std::sync::LazyLock;

use regex::Regex;

/// Two alphabetic fragments of at least two characters joined by a hyphen
/// and a space: a line wrap from the source layout engine. Shorter fragments
/// and digits are left alone to avoid breaking legitimate compounds.
static HYPHEN_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-zåäöÅÄÖ]{2,})- ([A-Za-zåäöÅÄÖ]{2,})").unwrap());

/// A bold run consisting entirely of uppercase letters, digits and a small
/// punctuation set, possibly with internal spaces: a section title.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<b>(([A-ZÅÄÖ0-9"?.,\-]+ ?)+)</b>"#).unwrap());

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ ]+").unwrap());

/// Sentence-ending punctuation (optionally with a stray quote), a space,
/// then a short cluster of 1-2 digit groups: a footnote reference.
static NOTE_CLUSTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([.,]"? )(([0-9]{1,2}[-,]?)+)"#).unwrap());

/// Run the full normalization chain over reduced markup.
///
/// Each pass is a pure string rewrite that consumes the previous pass's
/// whole output. Passes that find no matches are no-ops.
pub fn normalize(text: &str) -> String {
    // Fixed order; reordering silently changes output.
    let passes: [fn(&str) -> String; 6] = [
        replace_nonstandard_chars,
        collapse_reopened_tags,
        join_hyphenated_linebreaks,
        promote_section_headings,
        collapse_whitespace,
        bracket_note_numbers,
    ];

    passes
        .iter()
        .fold(text.to_string(), |text, pass| pass(&text))
}

/// Replace typographic punctuation with plain-ASCII equivalents.
pub fn replace_nonstandard_chars(text: &str) -> String {
    text.replace('\u{201D}', "\"").replace('\u{2013}', "-")
}

/// Merge style spans that close and immediately reopen, e.g.
/// `</b><b>` with nothing between.
pub fn collapse_reopened_tags(text: &str) -> String {
    let mut text = text.to_string();
    for tag in ["i", "b"] {
        text = text.replace(&format!("</{tag}><{tag}>"), "");
    }
    text
}

/// Rejoin words split by hyphenated line wraps: `beauti- ful` -> `beautiful`.
pub fn join_hyphenated_linebreaks(text: &str) -> String {
    let mut out = text.to_string();
    for caps in HYPHEN_BREAK_RE.captures_iter(text) {
        out = out.replace(&caps[0], &format!("{}{}", &caps[1], &caps[2]));
    }
    out
}

/// Turn all-caps bold runs into `<h3>` headings, title-casing the text in a
/// single pass: first character uppercased, the remainder lowercased. This
/// matches the source tool's behavior, which is not per-word title case.
pub fn promote_section_headings(text: &str) -> String {
    let mut out = text.to_string();
    for caps in HEADING_RE.captures_iter(text) {
        let mut chars = caps[1].chars();
        let title = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect::<String>(),
            None => String::new(),
        };
        out = out.replace(&caps[0], &format!("<h3>{title}</h3>"));
    }
    out
}

/// Collapse runs of spaces into a single space. Newlines used as document
/// separators are untouched.
pub fn collapse_whitespace(text: &str) -> String {
    SPACE_RUN_RE.replace_all(text, " ").into_owned()
}

/// Wrap footnote reference clusters in square brackets: `end. 12-13` ->
/// `end. [12-13]`. The punctuation and its trailing space are preserved.
pub fn bracket_note_numbers(text: &str) -> String {
    let mut out = text.to_string();
    for caps in NOTE_CLUSTER_RE.captures_iter(text) {
        out = out.replace(&caps[0], &format!("{}[{}]", &caps[1], &caps[2]));
    }
    out
}
