use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::{Compiler, SourceKind};

/// Mutable state of one run, threaded through every pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub tag: String,
    pub work_dir: PathBuf,
    /// Current path of the fetched file; renamed as its type is discovered.
    pub archive: PathBuf,
    pub source: SourceKind,
    pub compiler: Compiler,
    pub main_file: Option<String>,
}

impl BuildContext {
    /// The work directory is `{root}/{tag}`; the source kind starts as a
    /// guess from the compiler name.
    pub fn new(tag: &str, root: &Path, compiler: Compiler) -> Self {
        let work_dir = root.join(tag.trim_end_matches('/'));
        let archive = work_dir.join(archive_name(tag));
        let source = if compiler.is_latex() {
            SourceKind::Latex
        } else {
            SourceKind::Tex
        };
        Self {
            tag: tag.to_string(),
            work_dir,
            archive,
            source,
            compiler,
            main_file: None,
        }
    }

    pub fn archive_file_name(&self) -> Option<String> {
        self.archive
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Path the archive takes once its type is known, e.g. `2101.00001.tar`.
    pub fn archive_with_extension(&self, ext: &str) -> PathBuf {
        append_extension(&self.archive, ext)
    }

    /// No LaTeX main file: build as plain TeX instead.
    pub fn degrade_to_plain_tex(&mut self) {
        self.source = SourceKind::Tex;
        self.compiler = Compiler::plain_tex();
    }

    pub fn main_path(&self) -> Option<PathBuf> {
        self.main_file.as_ref().map(|name| self.work_dir.join(name))
    }
}

/// Last path segment of the identifier, e.g. `hep-th/9901001` -> `9901001`.
pub fn archive_name(tag: &str) -> &str {
    let trimmed = tag.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Appends `.{ext}` without touching dots already in the name.
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
