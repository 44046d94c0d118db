use std::path::{Path, PathBuf};

use texfetch_logging::tf_info;

use crate::runner::{run_best_effort, ToolInvocation, ToolRunner};

const DVI_TO_PS: &str = "dvips";
const PS_TO_PDF: &str = "ps2pdf";

/// DVI -> PostScript -> PDF. Tool failures are only logged; the returned path
/// may not exist afterwards.
pub fn dvi_to_pdf(runner: &dyn ToolRunner, dvi: &Path) -> PathBuf {
    let (dir, name) = split(dvi);
    let ps = dvi.with_extension("ps");
    let ps_name = split(&ps).1;
    tf_info!("{DVI_TO_PS} {name}");
    run_best_effort(
        runner,
        &ToolInvocation::new(DVI_TO_PS, &dir).args(["-o", ps_name.as_str(), name.as_str()]),
    );
    ps_to_pdf(runner, &ps)
}

pub fn ps_to_pdf(runner: &dyn ToolRunner, ps: &Path) -> PathBuf {
    let (dir, name) = split(ps);
    tf_info!("{PS_TO_PDF} {name}");
    run_best_effort(runner, &ToolInvocation::new(PS_TO_PDF, &dir).arg(name));
    ps.with_extension("pdf")
}

fn split(path: &Path) -> (PathBuf, String) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, name)
}
