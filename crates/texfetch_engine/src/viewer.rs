use std::io;
use std::path::Path;

use texfetch_logging::tf_debug;

/// Shows a finished PDF to the operator.
pub trait PdfViewer: Send + Sync {
    fn open(&self, pdf: &Path) -> io::Result<()>;
}

/// Hands the PDF to the desktop's default application for PDFs
/// (`open` on macOS, `ShellExecute` on Windows, `xdg-open` and friends elsewhere).
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopViewer;

impl PdfViewer for DesktopViewer {
    fn open(&self, pdf: &Path) -> io::Result<()> {
        if !pdf.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", pdf.display()),
            ));
        }
        tf_debug!("opening {}", pdf.display());
        open::that(pdf)
    }
}
