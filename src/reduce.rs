//! Element-tree reduction to simplified markup.
//!
//! Walks a document body recursively and emits a reduced tag vocabulary:
//! paragraphs, bold, italic, images and rules. Everything else passes
//! through as bare text. Which spans become bold or italic is decided by
//! looking their class tokens up in the [`StyleIndex`].
//!
//! Closing tags are queued per element before recursing into its children
//! and unwound in reverse after the recursion returns, so output nesting is
//! well-formed at any input depth without materializing a stack.

use std::fmt::Write;

use crate::css::StyleIndex;
use crate::dom::Element;

/// Display-size hint attached to every emitted image.
pub const IMAGE_SIZE_HINT: &str = "max-width: 240px; max-height: 240px;";

/// InDesign emits decorative section dividers as `div` containers with ids
/// carrying this prefix.
const DIVIDER_ID_PREFIX: &str = "_idContainer";

/// Reduce a document body's children to simplified markup.
pub fn reduce_body(body: &Element, styles: &StyleIndex) -> String {
    reduce_elements(&body.children, styles)
}

/// Reduce a sequence of sibling elements to simplified markup.
pub fn reduce_elements(elements: &[Element], styles: &StyleIndex) -> String {
    let mut out = String::new();
    for element in elements {
        reduce_element(element, styles, &mut out);
    }
    out
}

fn reduce_element(element: &Element, styles: &StyleIndex, out: &mut String) {
    // Closing tags queued here are emitted after the children, in strict
    // reverse order of queuing.
    let mut closers: Vec<&'static str> = Vec::new();

    match element.tag.as_str() {
        "img" => {
            // Keep only the source; all other attributes are layout noise.
            out.push_str("<img ");
            if let Some(src) = element.attr("src") {
                let _ = write!(out, "src=\"{src}\" ");
            }
            let _ = write!(out, "style=\"{IMAGE_SIZE_HINT}\" />");
        }
        "div" if element
            .attr("id")
            .unwrap_or("")
            .starts_with(DIVIDER_ID_PREFIX) =>
        {
            // Decorative divider: emit the rule immediately, not deferred.
            out.push_str("<hr>\n");
        }
        "p" => {
            out.push_str("<p>");
            closers.push("</p>");
        }
        "span" => {
            // Each class token may independently contribute a wrap; wraps
            // nest in discovery order. A span with no class, or classes
            // with no matching rule, contributes nothing.
            for class in element.attr("class").unwrap_or("").split_whitespace() {
                let selector = format!("{}.{}", element.tag, class);
                if styles.declaration(&selector, "font-weight") == Some("bold") {
                    out.push_str("<b>");
                    closers.push("</b>");
                }
                if styles.declaration(&selector, "font-style") == Some("italic") {
                    out.push_str("<i>");
                    closers.push("</i>");
                }
            }
        }
        _ => {}
    }

    for child in &element.children {
        reduce_element(child, styles, out);
    }

    out.push_str(element.text.trim());
    out.push(' ');

    for closer in closers.iter().rev() {
        out.push_str(closer);
    }
}
