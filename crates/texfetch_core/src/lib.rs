//! Texfetch core: pure decisions of the fetch-and-build pipeline.
mod compiler;
mod context;
mod kind;
mod log_scan;
mod main_file;
mod sniff;

pub use compiler::{CompileCommand, Compiler, DEFAULT_COMPILER, RAW_INPUT_ENCODING};
pub use context::{append_extension, archive_name, BuildContext};
pub use kind::{AlternativeFormat, ArchiveKind, FetchedKind, SourceKind};
pub use log_scan::{needs_rerun, Adjustment, LogFindings, MAX_RERUNS, RERUN_MARKER};
pub use main_file::{has_extension, is_main_document, is_tex_like_name};
pub use sniff::{is_dvi_preamble, sniff, UnknownFormat, HEADER_LEN};
