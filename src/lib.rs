//! # flatbook
//!
//! Flatten an EPUB into a single simplified HTML page.
//!
//! flatbook discards layout fidelity in favor of a reduced tag vocabulary
//! (paragraph, bold, italic, image, heading, rule) and a chain of text
//! clean-up passes that undo artifacts of the original production tooling:
//! hyphenated line wraps, typographic punctuation, reopened style spans,
//! bare footnote numbers, and decorative section dividers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatbook::{convert, default_out_dir};
//! use std::path::Path;
//!
//! let input = Path::new("book.epub");
//! let conversion = convert(input, default_out_dir(input))?;
//!
//! for warning in &conversion.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! println!("wrote {}", conversion.html_path.display());
//! # Ok::<(), flatbook::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! The pipeline has three core stages, each usable on its own:
//!
//! - [`StyleIndex::parse`] extracts `selector { property: value; }` rules
//!   from the archive's stylesheet.
//! - [`reduce_body`] recursively reduces a document body to the simplified
//!   tag vocabulary, consulting the style index for bold/italic spans.
//! - [`normalize`] runs the fixed, ordered chain of whole-string clean-up
//!   passes over the reduced markup.

pub mod css;
pub mod dom;
pub mod epub;
pub mod error;
pub mod normalize;
pub mod reduce;

pub use css::StyleIndex;
pub use dom::{Element, parse_document};
pub use epub::{Conversion, build_style_index, convert, default_out_dir, process_document};
pub use error::{Error, Result};
pub use normalize::normalize;
pub use reduce::{reduce_body, reduce_elements};
