use std::io;
use std::path::Path;

use texfetch_core::{has_extension, is_main_document, is_tex_like_name};
use texfetch_logging::tf_trace;

use crate::persist::{list_dir, read_lossy};

/// TeX-like files in `dir` that declare a top-level document, in name order.
///
/// Picking the first entry is a heuristic: papers with several stand-alone
/// documents (a supplement, a cover letter) may yield the wrong one.
pub fn locate_main_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut results = Vec::new();
    for name in list_dir(dir)? {
        if !is_tex_like_name(&name) {
            continue;
        }
        let path = dir.join(&name);
        if !path.is_file() {
            continue;
        }
        let text = read_lossy(&path)?;
        if is_main_document(&text) {
            results.push(name);
        } else {
            tf_trace!("{name} is not a main document");
        }
    }
    Ok(results)
}

/// Regular files in `dir` named `*.{ext}`, in name order.
pub fn files_with_extension(dir: &Path, ext: &str) -> io::Result<Vec<String>> {
    Ok(list_dir(dir)?
        .into_iter()
        .filter(|name| has_extension(name, ext) && dir.join(name).is_file())
        .collect())
}
