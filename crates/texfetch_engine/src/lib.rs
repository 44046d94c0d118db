//! Texfetch engine: network, filesystem and toolchain side of the pipeline.
mod compile;
mod convert;
mod extract;
mod fetch;
mod formats;
mod locate;
mod persist;
mod pipeline;
mod runner;
mod types;
mod viewer;

pub use compile::{
    AllInOneEngine, CompilationDriver, CompileError, CompileStrategy, LatexToolchain,
    StrategyFailure, ALL_IN_ONE_ENGINE, MISSING_FONT_LOG, PACKAGE_FETCHER,
};
pub use convert::{dvi_to_pdf, ps_to_pdf};
pub use extract::{extract_archive, is_safe_entry, ExtractError, Extracted};
pub use fetch::{FetchSettings, ReqwestFetcher, SourceFetcher, DEFAULT_BASE_URL};
pub use formats::{choose_format, parse_format_links};
pub use locate::{files_with_extension, locate_main_files};
pub use persist::{
    ensure_work_dir, list_dir, read_header, read_lossy, AtomicFileWriter, PersistError,
};
pub use pipeline::{Pipeline, PipelineOptions};
pub use runner::{run_best_effort, SystemRunner, ToolError, ToolInvocation, ToolRunner, ToolStatus};
pub use types::{FailureKind, FetchError, PipelineError, RunOutcome};
pub use viewer::{DesktopViewer, PdfViewer};
