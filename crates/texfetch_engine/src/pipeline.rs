use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use texfetch_core::{
    is_dvi_preamble, sniff, ArchiveKind, BuildContext, Compiler, FetchedKind, SourceKind,
};
use texfetch_logging::{tf_debug, tf_info, tf_warn};

use crate::compile::CompilationDriver;
use crate::convert::{dvi_to_pdf, ps_to_pdf};
use crate::extract::extract_archive;
use crate::fetch::SourceFetcher;
use crate::locate::{files_with_extension, locate_main_files};
use crate::persist::{ensure_work_dir, list_dir, read_header};
use crate::runner::ToolRunner;
use crate::viewer::PdfViewer;
use crate::{PipelineError, RunOutcome};

const WITHDRAWN_MARKER: &str = "withdrawn";

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Per-identifier work directories are created under this directory.
    pub root: PathBuf,
    pub force_download: bool,
    pub skip_extract: bool,
    pub open_viewer: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            force_download: false,
            skip_extract: false,
            open_viewer: true,
        }
    }
}

/// Fetch, classify, extract, build and view one paper.
pub struct Pipeline {
    options: PipelineOptions,
    fetcher: Box<dyn SourceFetcher>,
    runner: Box<dyn ToolRunner>,
    viewer: Box<dyn PdfViewer>,
    driver: CompilationDriver,
}

impl Pipeline {
    pub fn new(
        options: PipelineOptions,
        fetcher: Box<dyn SourceFetcher>,
        runner: Box<dyn ToolRunner>,
        viewer: Box<dyn PdfViewer>,
    ) -> Self {
        Self {
            options,
            fetcher,
            runner,
            viewer,
            driver: CompilationDriver::default(),
        }
    }

    pub fn with_driver(mut self, driver: CompilationDriver) -> Self {
        self.driver = driver;
        self
    }

    pub async fn run(&self, tag: &str, compiler: Compiler) -> Result<RunOutcome, PipelineError> {
        let mut ctx = BuildContext::new(tag, &self.options.root, compiler);
        tf_info!("arxiv: {tag}");
        tf_info!("compiler: {}", ctx.compiler);
        tf_info!("skipextract: {}", self.options.skip_extract);
        tf_info!("forcedownload: {}", self.options.force_download);
        tf_debug!("source: {}", ctx.source);

        ensure_work_dir(&ctx.work_dir).map_err(|source| PipelineError::WorkDir {
            path: ctx.work_dir.clone(),
            source,
        })?;

        if !ctx.archive.exists() || self.options.force_download {
            let fetched = self.fetcher.fetch_source(tag, &ctx.archive).await;
            tf_debug!("fetched: {fetched}");
            if fetched == FetchedKind::Dvi {
                ctx.source = SourceKind::Dvi;
                tf_debug!("source: {}", ctx.source);
            }
        }
        if !ctx.archive.exists() {
            return Err(PipelineError::ArchiveMissing(ctx.archive.clone()));
        }

        let header = read_header(&ctx.archive).map_err(io_error(&ctx.archive))?;
        match sniff(&header) {
            Ok(ArchiveKind::Pdf) => {
                rename_archive(&mut ctx, "pdf")?;
                ctx.source = SourceKind::Pdf;
                tf_debug!("source: {}", ctx.source);
            }
            Ok(ArchiveKind::Ps) => {
                rename_archive(&mut ctx, "ps")?;
                ctx.source = SourceKind::Ps;
                tf_debug!("source: {}", ctx.source);
            }
            Ok(kind) => {
                let wants_sources = ctx.source.is_tex_like() || ctx.source == SourceKind::Dvi;
                if !self.options.skip_extract && wants_sources {
                    extract(&mut ctx, kind);
                }
            }
            Err(_) if ctx.source == SourceKind::Dvi && is_dvi_preamble(&header) => {
                rename_archive(&mut ctx, "dvi")?;
            }
            Err(source) => {
                return Err(PipelineError::UnknownFormat {
                    path: ctx.archive.clone(),
                    source,
                })
            }
        }

        let pdf = match ctx.source {
            SourceKind::Pdf => ctx.archive.clone(),
            SourceKind::Ps => ps_to_pdf(self.runner.as_ref(), &ctx.archive),
            SourceKind::Dvi => self.build_from_dvi(&ctx)?,
            SourceKind::Latex | SourceKind::Tex => match self.build_from_tex(&mut ctx)? {
                Some(pdf) => pdf,
                None => {
                    tf_info!("Paper withdrawn");
                    return Ok(RunOutcome::Withdrawn);
                }
            },
        };

        if self.options.open_viewer {
            if let Err(err) = self.viewer.open(&pdf) {
                tf_warn!("cannot open {}: {err}", pdf.display());
            }
        }
        Ok(RunOutcome::Built(pdf))
    }

    fn build_from_dvi(&self, ctx: &BuildContext) -> Result<PathBuf, PipelineError> {
        let dir = &ctx.work_dir;
        let dvis = files_with_extension(dir, "dvi").map_err(io_error(dir))?;
        let Some(dvi) = dvis.first() else {
            let listing = list_dir(dir).map_err(io_error(dir))?;
            return Err(PipelineError::NoDviFound { listing });
        };
        Ok(dvi_to_pdf(self.runner.as_ref(), &dir.join(dvi)))
    }

    /// `Ok(None)` means the paper was withdrawn.
    fn build_from_tex(&self, ctx: &mut BuildContext) -> Result<Option<PathBuf>, PipelineError> {
        let dir = ctx.work_dir.clone();
        let mut candidates = Vec::new();
        if ctx.source == SourceKind::Latex {
            candidates = locate_main_files(&dir).map_err(io_error(&dir))?;
            if candidates.is_empty() {
                tf_debug!("can't find the main LaTeX file, switch to plain TeX");
                ctx.degrade_to_plain_tex();
            }
        }
        if ctx.source == SourceKind::Tex {
            candidates = files_with_extension(&dir, "tex").map_err(io_error(&dir))?;
        }

        let Some(main) = candidates.into_iter().next() else {
            let listing = list_dir(&dir).map_err(io_error(&dir))?;
            let archive = ctx.archive_file_name();
            let extracted: Vec<&String> = listing
                .iter()
                .filter(|name| Some(*name) != archive.as_ref())
                .collect();
            if matches!(extracted.as_slice(), [only] if only.as_str() == WITHDRAWN_MARKER) {
                return Ok(None);
            }
            return Err(PipelineError::NoTexFound { listing });
        };

        tf_debug!("main file: {main}");
        ctx.main_file = Some(main);
        let pdf = self.driver.compile(ctx, self.runner.as_ref())?;
        Ok(Some(pdf))
    }
}

fn extract(ctx: &mut BuildContext, kind: ArchiveKind) {
    match extract_archive(&ctx.archive, kind) {
        Ok(extracted) => {
            tf_debug!("extracted {} files", extracted.files.len());
            if let Some(archive) = extracted.archive {
                ctx.archive = archive;
            }
        }
        Err(err) => tf_warn!("extraction failed: {err}"),
    }
}

fn rename_archive(ctx: &mut BuildContext, ext: &str) -> Result<(), PipelineError> {
    let renamed = ctx.archive_with_extension(ext);
    fs::rename(&ctx.archive, &renamed).map_err(io_error(&renamed))?;
    ctx.archive = renamed;
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PipelineError + '_ {
    move |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}
