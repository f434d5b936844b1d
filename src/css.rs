//! Stylesheet rule extraction.
//!
//! A best-effort extractor for `selector { property: value; ... }` blocks,
//! not a validating CSS parser. Stray text outside rule blocks, declarations
//! without a colon, and selectors the pattern cannot express are all silently
//! ignored; the reducer degrades to "no bold/italic inference" when a lookup
//! misses.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Matches one rule block. Selector characters are limited to letters,
/// digits, `@`, `-` and `.`; the body may span multiple lines.
static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)([@A-Za-z0-9.\-]+)\s*\{([^}]+)\}").unwrap());

/// Parsed stylesheet rules, keyed by selector name.
///
/// Built once per archive and read-only afterwards, so a shared reference
/// can be threaded through every document reduction.
#[derive(Debug, Default)]
pub struct StyleIndex {
    rules: HashMap<String, HashMap<String, String>>,
}

impl StyleIndex {
    /// An index with no rules. Every lookup misses.
    pub fn empty() -> Self {
        StyleIndex::default()
    }

    /// Extract rule blocks from stylesheet text. Never fails; unparsable
    /// input just yields fewer rules.
    ///
    /// If the same selector appears in multiple blocks, the later block's
    /// properties fully replace the earlier one's.
    pub fn parse(css: &str) -> Self {
        let mut rules: HashMap<String, HashMap<String, String>> = HashMap::new();

        for caps in RULE_RE.captures_iter(css) {
            let selector = caps[1].to_string();

            let mut properties = HashMap::new();
            for declaration in caps[2].split(';') {
                let declaration = declaration.trim();
                if let Some((property, value)) = declaration.split_once(':') {
                    properties.insert(property.trim().to_string(), value.trim().to_string());
                }
            }

            rules.insert(selector, properties);
        }

        StyleIndex { rules }
    }

    /// All declared properties for a selector, if the selector has a rule.
    pub fn get(&self, selector: &str) -> Option<&HashMap<String, String>> {
        self.rules.get(selector)
    }

    /// A single declared value, e.g. `declaration("span.char-style-override-1",
    /// "font-weight")`.
    pub fn declaration(&self, selector: &str, property: &str) -> Option<&str> {
        self.rules
            .get(selector)
            .and_then(|props| props.get(property))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_rule() {
        let index = StyleIndex::parse("p.note { font-weight: bold; font-style: italic; }");

        assert_eq!(index.len(), 1);
        let props = index.get("p.note").unwrap();
        assert_eq!(props.get("font-weight").map(String::as_str), Some("bold"));
        assert_eq!(props.get("font-style").map(String::as_str), Some("italic"));
    }

    #[test]
    fn parses_multiline_bodies() {
        let css = "span.char-style-override-1 {\n\tfont-style: italic;\n\tcolor: #000;\n}\n";
        let index = StyleIndex::parse(css);
        assert_eq!(
            index.declaration("span.char-style-override-1", "font-style"),
            Some("italic")
        );
        assert_eq!(
            index.declaration("span.char-style-override-1", "color"),
            Some("#000")
        );
    }

    #[test]
    fn later_block_replaces_earlier() {
        let css = "p { color: red; margin: 0; }\np { color: blue; }";
        let index = StyleIndex::parse(css);

        assert_eq!(index.declaration("p", "color"), Some("blue"));
        // Full replacement, not a merge
        assert_eq!(index.declaration("p", "margin"), None);
    }

    #[test]
    fn ignores_declarations_without_colon() {
        let index = StyleIndex::parse("p { font-weight: bold; nonsense }");
        let props = index.get("p").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("font-weight").map(String::as_str), Some("bold"));
    }

    #[test]
    fn ignores_stray_text() {
        let css = "/* generated */\n???\n@page { margin: 1em; }\ngarbage without a block";
        let index = StyleIndex::parse(css);
        assert_eq!(index.len(), 1);
        assert_eq!(index.declaration("@page", "margin"), Some("1em"));
    }

    #[test]
    fn empty_input_yields_empty_index() {
        assert!(StyleIndex::parse("").is_empty());
        assert!(StyleIndex::empty().get("p").is_none());
    }
}
