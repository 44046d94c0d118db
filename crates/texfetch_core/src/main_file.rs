use once_cell::sync::Lazy;
use regex::Regex;

static TEX_LIKE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^.].*\..*t.*x$").unwrap());
static DOCUMENT_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\\document(?:class|style)").unwrap());
static SUBFILE_DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"document.*subfiles").unwrap());

/// Names like `paper.tex` or `paper.ltx`; hidden files never match.
pub fn is_tex_like_name(name: &str) -> bool {
    TEX_LIKE_NAME.is_match(name)
}

/// Case-sensitive `.{ext}` suffix check on a visible file name.
pub fn has_extension(name: &str, ext: &str) -> bool {
    !name.starts_with('.')
        && name
            .strip_suffix(ext)
            .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
}

/// A top-level document: declares a class or style at the start of a line
/// and is not itself a `subfiles` child.
pub fn is_main_document(text: &str) -> bool {
    !SUBFILE_DECLARATION.is_match(text) && DOCUMENT_DECLARATION.is_match(text)
}
