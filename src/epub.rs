//! Archive-to-page conversion pipeline.
//!
//! Opens an EPUB, builds the [`StyleIndex`] from its stylesheet, unpacks
//! images, then reduces and normalizes every content document into one
//! concatenated HTML page written to the output directory.
//!
//! Only two failures abort a run: the archive cannot be opened, or a
//! document cannot be parsed into a tree. A missing or empty body is a
//! per-document warning; the rest of the archive still converts.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use zip::ZipArchive;

use crate::css::StyleIndex;
use crate::dom::parse_document;
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::reduce::reduce_body;

/// Archive entries with an image extension are unpacked into the image
/// directory. Deliberately unanchored: the extension may sit anywhere in
/// the entry name, so `scan.jpg.orig` still counts as an image.
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(jpg|jpeg|gif|png|bmp|svg)").unwrap());

/// Visual separator appended after each document's text.
const DOCUMENT_SEPARATOR: &str = "\n<hr>\n";

/// Destination image paths longer than this many bytes are truncated.
const MAX_IMAGE_PATH_LEN: usize = 150;

/// Summary of a completed conversion.
#[derive(Debug)]
pub struct Conversion {
    /// Path of the written HTML page.
    pub html_path: PathBuf,
    /// Number of content documents that contributed text.
    pub documents: usize,
    /// Number of images unpacked.
    pub images: usize,
    /// Per-document warnings (documents skipped for a missing or empty
    /// body). Never fatal.
    pub warnings: Vec<String>,
}

/// Derive the default output directory from the input path by stripping a
/// trailing `.epub` suffix.
pub fn default_out_dir(input: &Path) -> PathBuf {
    let s = input.to_string_lossy();
    match s.strip_suffix(".epub") {
        Some(stripped) => PathBuf::from(stripped),
        None => input.to_path_buf(),
    }
}

/// Reduce and normalize one content document.
///
/// Returns the document's flattened text plus an optional warning. A
/// document whose body is missing or empty contributes an empty string and
/// a warning instead of aborting the archive. Unparsable bytes are a hard
/// error.
pub fn process_document(bytes: &[u8], styles: &StyleIndex) -> Result<(String, Option<String>)> {
    let root = parse_document(bytes)?;

    let Some(body) = root.find("body") else {
        return Ok((String::new(), Some("body was missing".to_string())));
    };
    if body.children.is_empty() && body.text.trim().is_empty() {
        return Ok((String::new(), Some("body was empty".to_string())));
    }

    let reduced = reduce_body(body, styles);
    Ok((normalize(&reduced), None))
}

/// Build a [`StyleIndex`] from stylesheet bytes. Never fails; undecodable
/// or unparsable input yields an empty index.
pub fn build_style_index(css_bytes: &[u8]) -> StyleIndex {
    match std::str::from_utf8(css_bytes) {
        Ok(css) => StyleIndex::parse(css),
        Err(_) => StyleIndex::empty(),
    }
}

/// Convert an EPUB into a single simplified HTML page under `out_dir`.
///
/// Writes `<out_dir>/index.html` and copies images to `<out_dir>/image/`.
///
/// # Example
///
/// ```no_run
/// use flatbook::{convert, default_out_dir};
/// use std::path::Path;
///
/// let input = Path::new("book.epub");
/// let conversion = convert(input, default_out_dir(input))?;
/// println!("wrote {}", conversion.html_path.display());
/// # Ok::<(), flatbook::Error>(())
/// ```
pub fn convert(input: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<Conversion> {
    let out_dir = out_dir.as_ref();
    let file = File::open(input.as_ref())?;
    let mut archive = ZipArchive::new(file)?;

    // Entry names in archive order; `file_names()` does not preserve it.
    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }

    let styles = read_style_index(&mut archive, &names)?;
    let images = unpack_images(&mut archive, &names, out_dir)?;

    let mut page = String::new();
    let mut warnings = Vec::new();
    let mut documents = 0;

    for name in names.iter().filter(|n| n.ends_with(".xhtml")) {
        let bytes = read_entry(&mut archive, name)?;
        let (text, warning) = process_document(&bytes, &styles)
            .map_err(|e| Error::InvalidEpub(format!("{name}: {e}")))?;

        if let Some(warning) = warning {
            log::warn!("{name}: {warning}");
            warnings.push(format!("{name}: {warning}"));
            continue;
        }

        page.push_str(&text);
        page.push_str(DOCUMENT_SEPARATOR);
        documents += 1;
    }

    fs::create_dir_all(out_dir)?;
    let html_path = out_dir.join("index.html");
    fs::write(&html_path, &page)?;

    Ok(Conversion {
        html_path,
        documents,
        images,
        warnings,
    })
}

/// Parse the archive's stylesheet into a [`StyleIndex`]. With multiple
/// `.css` entries the last one in archive order wins; with none, every
/// style lookup misses and no bold/italic is inferred.
fn read_style_index<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    names: &[String],
) -> Result<StyleIndex> {
    match names.iter().filter(|n| n.ends_with(".css")).next_back() {
        Some(name) => {
            let bytes = read_entry(archive, name)?;
            Ok(build_style_index(&bytes))
        }
        None => Ok(StyleIndex::empty()),
    }
}

fn unpack_images<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    names: &[String],
    out_dir: &Path,
) -> Result<usize> {
    let mut count = 0;
    for name in names.iter().filter(|n| IMAGE_RE.is_match(n)) {
        let image_dir = out_dir.join("image");
        fs::create_dir_all(&image_dir)?;

        let basename = name.rsplit('/').next().unwrap_or(name);
        let dest = truncate_image_path(&image_dir.join(basename));

        let mut entry = archive.by_name(name)?;
        let mut dest_file = File::create(&dest)?;
        io::copy(&mut entry, &mut dest_file)?;
        count += 1;
    }
    Ok(count)
}

/// Shorten overlong destination paths to 140 bytes plus a dot and the last
/// three characters of the original (preserving a usable extension),
/// backing off to a character boundary where needed.
fn truncate_image_path(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.len() <= MAX_IMAGE_PATH_LEN {
        return path.to_path_buf();
    }

    let head = floor_char_boundary(&s, 140);
    let tail = floor_char_boundary(&s, s.len() - 3);
    PathBuf::from(format!("{}.{}", &s[..head], &s[tail..]))
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(name)?;
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents)?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_out_dir_strips_epub_suffix() {
        assert_eq!(
            default_out_dir(Path::new("/books/novel.epub")),
            PathBuf::from("/books/novel")
        );
        assert_eq!(
            default_out_dir(Path::new("archive.zip")),
            PathBuf::from("archive.zip")
        );
    }

    #[test]
    fn process_document_flattens_body() {
        let styles = StyleIndex::parse("span.em { font-style: italic; }");
        let doc = br#"<html><body><p>Plain and <span class="em">slanted</span></p></body></html>"#;

        let (text, warning) = process_document(doc, &styles).unwrap();
        assert!(warning.is_none());
        assert_eq!(text, "<p><i>slanted </i>Plain and </p>");
    }

    #[test]
    fn missing_body_warns_without_failing() {
        let doc = b"<html><head><title>t</title></head></html>";
        let (text, warning) = process_document(doc, &StyleIndex::empty()).unwrap();
        assert!(text.is_empty());
        assert!(warning.is_some());
    }

    #[test]
    fn empty_body_warns_without_failing() {
        let doc = b"<html><body>   </body></html>";
        let (text, warning) = process_document(doc, &StyleIndex::empty()).unwrap();
        assert!(text.is_empty());
        assert!(warning.is_some());
    }

    #[test]
    fn unparsable_document_is_fatal() {
        assert!(process_document(b"<html><body>", &StyleIndex::empty()).is_err());
    }

    #[test]
    fn style_index_from_invalid_utf8_is_empty() {
        assert!(build_style_index(&[0xFF, 0xFE, 0x00]).is_empty());
    }

    #[test]
    fn image_entries_match_anywhere_in_the_name() {
        assert!(IMAGE_RE.is_match("OEBPS/image/cover.png"));
        assert!(IMAGE_RE.is_match("OEBPS/image/scan.jpg.orig"));
        assert!(!IMAGE_RE.is_match("OEBPS/css/idGeneratedStyles.css"));
        assert!(!IMAGE_RE.is_match("OEBPS/chapter1.xhtml"));
    }

    #[test]
    fn image_paths_are_truncated() {
        let long_name = format!("/tmp/out/image/{}.jpeg", "x".repeat(160));
        let truncated = truncate_image_path(Path::new(&long_name));
        let s = truncated.to_string_lossy();
        assert_eq!(s.len(), 144);
        assert!(s.ends_with(".peg"));
    }

    #[test]
    fn short_image_paths_are_unchanged() {
        let path = Path::new("/tmp/out/image/cover.jpg");
        assert_eq!(truncate_image_path(path), path);
    }
}
