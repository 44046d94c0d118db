#![allow(dead_code)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};
use texfetch_core::FetchedKind;
use texfetch_engine::{PdfViewer, SourceFetcher, ToolError, ToolInvocation, ToolRunner, ToolStatus};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(texfetch_logging::initialize_for_tests);
}

type Script = dyn Fn(&ToolInvocation) -> Result<ToolStatus, ToolError> + Send + Sync;

/// Records every invocation and answers with a script instead of spawning.
#[derive(Clone)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<ToolInvocation>>>,
    script: Arc<Script>,
}

impl FakeRunner {
    pub fn new(
        script: impl Fn(&ToolInvocation) -> Result<ToolStatus, ToolError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(script),
        }
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.program).collect()
    }

    pub fn count(&self, program: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.program == program)
            .count()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus, ToolError> {
        self.calls.lock().unwrap().push(invocation.clone());
        (self.script)(invocation)
    }
}

/// Emulates a TeX installation by writing the files each tool would write.
pub struct FakeTexLive {
    pub tectonic_available: bool,
    /// Log left behind by the package fetcher; `None` leaves no log at all.
    pub fetcher_log: Option<String>,
    /// Log written by the n-th compiler run; the last entry repeats.
    pub run_logs: Vec<String>,
    /// When false the compilers write a log but no output file.
    pub produces_output: bool,
    /// Written to `missfont.log` by every compiler run.
    pub missing_fonts: Option<String>,
}

impl Default for FakeTexLive {
    fn default() -> Self {
        Self {
            tectonic_available: false,
            fetcher_log: Some("This is pdfTeX, Version 3.141592653\n".into()),
            run_logs: vec!["Output written.\n".into()],
            produces_output: true,
            missing_fonts: None,
        }
    }
}

impl FakeTexLive {
    pub fn runner(self) -> FakeRunner {
        let runs = AtomicUsize::new(0);
        FakeRunner::new(move |invocation| {
            let target = invocation.target().unwrap_or_default().to_string();
            let stem = Path::new(&target)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let write = |ext: &str, content: &str| {
                fs::write(invocation.cwd.join(format!("{stem}.{ext}")), content).unwrap();
            };
            match invocation.program.as_str() {
                "tectonic" if self.tectonic_available => {
                    write("pdf", "%PDF-1.5 tectonic");
                }
                "tectonic" => {
                    return Err(ToolError::NotFound {
                        program: invocation.program.clone(),
                    })
                }
                "texliveonfly" => {
                    if let Some(log) = &self.fetcher_log {
                        write("log", log);
                    }
                }
                "pdflatex" | "xelatex" | "pdftex" | "latex" | "tex" => {
                    let n = runs.fetch_add(1, Ordering::SeqCst);
                    let log = self
                        .run_logs
                        .get(n)
                        .or(self.run_logs.last())
                        .cloned()
                        .unwrap_or_default();
                    write("log", &log);
                    if let Some(fonts) = &self.missing_fonts {
                        fs::write(invocation.cwd.join("missfont.log"), fonts).unwrap();
                    }
                    if self.produces_output {
                        let pdf_engine = invocation.program.starts_with("pdf")
                            || invocation.program.starts_with("xe");
                        if pdf_engine {
                            write("pdf", "%PDF-1.5 compiled");
                        } else {
                            write("dvi", "\u{f7}dvi");
                        }
                    }
                }
                "dvips" => {
                    // dvips -o <ps> <dvi>
                    let ps = &invocation.args[1];
                    fs::write(invocation.cwd.join(ps), "%!PS-Adobe-2.0").unwrap();
                }
                "ps2pdf" => {
                    write("pdf", "%PDF-1.4 from ps");
                }
                _ => {}
            }
            Ok(ToolStatus::success())
        })
    }
}

/// Writes fixed bytes as the archive and reports a fixed kind.
#[derive(Clone)]
pub struct StaticFetcher {
    pub bytes: Option<Vec<u8>>,
    pub kind: FetchedKind,
    pub calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn new(bytes: Vec<u8>, kind: FetchedKind) -> Self {
        Self {
            bytes: Some(bytes),
            kind,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            bytes: None,
            kind: FetchedKind::Error,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SourceFetcher for StaticFetcher {
    async fn fetch_source(&self, _tag: &str, archive: &Path) -> FetchedKind {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(bytes) = &self.bytes {
            fs::write(archive, bytes).unwrap();
        }
        self.kind
    }
}

#[derive(Clone, Default)]
pub struct RecordingViewer {
    opened: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingViewer {
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }
}

impl PdfViewer for RecordingViewer {
    fn open(&self, pdf: &Path) -> io::Result<()> {
        self.opened.lock().unwrap().push(pdf.to_path_buf());
        Ok(())
    }
}

/// A viewer whose launcher is never available.
#[derive(Clone, Default)]
pub struct BrokenViewer;

impl PdfViewer for BrokenViewer {
    fn open(&self, _pdf: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no PDF viewer installed"))
    }
}

/// An uncompressed tar holding `files`.
pub fn tar_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

/// A gzip stream with `name` recorded in its header, like `gzip -N`.
pub fn gz_named(name: &str, content: &[u8]) -> Vec<u8> {
    let mut encoder = GzBuilder::new()
        .filename(name)
        .write(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

pub fn gz_plain(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

pub const MAIN_TEX: &str = "\\documentclass{article}\n\\begin{document}\nHello\n\\end{document}\n";
