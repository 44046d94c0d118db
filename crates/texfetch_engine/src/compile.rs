use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use texfetch_core::{needs_rerun, BuildContext, CompileCommand, LogFindings, MAX_RERUNS};
use texfetch_logging::{tf_debug, tf_info, tf_warn};
use thiserror::Error;

use crate::convert::dvi_to_pdf;
use crate::persist::read_lossy;
use crate::runner::{run_best_effort, ToolInvocation, ToolRunner};

/// Self-contained engine that fetches its own support files.
pub const ALL_IN_ONE_ENGINE: &str = "tectonic";
/// Wrapper that installs missing TeX Live packages while compiling.
pub const PACKAGE_FETCHER: &str = "texliveonfly";
/// Written by kpathsea when fonts cannot be generated.
pub const MISSING_FONT_LOG: &str = "missfont.log";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no main file selected")]
    NoMainFile,
    #[error("no PDF was produced for {main}")]
    NoOutput { main: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StrategyFailure(pub String);

/// One way of turning the main file into a PDF.
pub trait CompileStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build `ctx.main_file`; may switch `ctx.compiler` along the way.
    fn attempt(
        &self,
        ctx: &mut BuildContext,
        runner: &dyn ToolRunner,
    ) -> Result<PathBuf, StrategyFailure>;
}

/// Tries each strategy in order and stops at the first PDF.
pub struct CompilationDriver {
    strategies: Vec<Box<dyn CompileStrategy>>,
}

impl Default for CompilationDriver {
    fn default() -> Self {
        Self::new(vec![Box::new(AllInOneEngine), Box::new(LatexToolchain)])
    }
}

impl CompilationDriver {
    pub fn new(strategies: Vec<Box<dyn CompileStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn compile(
        &self,
        ctx: &mut BuildContext,
        runner: &dyn ToolRunner,
    ) -> Result<PathBuf, CompileError> {
        let main = ctx.main_file.clone().ok_or(CompileError::NoMainFile)?;
        for strategy in &self.strategies {
            tf_debug!("compiling {main} with {}", strategy.name());
            match strategy.attempt(ctx, runner) {
                Ok(pdf) => return Ok(pdf),
                Err(failure) => tf_warn!("{}: {failure}", strategy.name()),
            }
        }
        Err(CompileError::NoOutput { main })
    }
}

fn main_file(ctx: &BuildContext) -> Result<String, StrategyFailure> {
    ctx.main_file
        .clone()
        .ok_or_else(|| StrategyFailure("no main file selected".into()))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AllInOneEngine;

impl CompileStrategy for AllInOneEngine {
    fn name(&self) -> &'static str {
        ALL_IN_ONE_ENGINE
    }

    fn attempt(
        &self,
        ctx: &mut BuildContext,
        runner: &dyn ToolRunner,
    ) -> Result<PathBuf, StrategyFailure> {
        let main = main_file(ctx)?;
        let invocation = ToolInvocation::new(ALL_IN_ONE_ENGINE, &ctx.work_dir).arg(main.as_str());
        let pdf = ctx.work_dir.join(&main).with_extension("pdf");
        match runner.run(&invocation) {
            Ok(status) if status.success && pdf.exists() => Ok(pdf),
            Ok(status) if status.success => Err(StrategyFailure(format!(
                "{} was not produced",
                pdf.display()
            ))),
            Ok(status) => Err(StrategyFailure(format!(
                "`{invocation}` exited with status {:?}",
                status.code
            ))),
            Err(err) => Err(StrategyFailure(err.to_string())),
        }
    }
}

/// The classic route: package fetcher, log-driven adjustments, reruns, and a
/// DVI conversion when the final compiler does not write PDF.
#[derive(Debug, Default, Clone, Copy)]
pub struct LatexToolchain;

impl CompileStrategy for LatexToolchain {
    fn name(&self) -> &'static str {
        "latex toolchain"
    }

    fn attempt(
        &self,
        ctx: &mut BuildContext,
        runner: &dyn ToolRunner,
    ) -> Result<PathBuf, StrategyFailure> {
        let main = main_file(ctx)?;
        let dir = ctx.work_dir.clone();
        let main_path = dir.join(&main);
        let log_path = main_path.with_extension("log");

        let fetcher = ToolInvocation::new(PACKAGE_FETCHER, &dir)
            .args(["-c", ctx.compiler.name()])
            .arg(main.as_str());
        tf_debug!("{fetcher}");
        run_best_effort(runner, &fetcher);

        let mut command = CompileCommand::new(ctx.compiler.clone());
        if !log_path.exists() {
            tf_debug!("no log after {PACKAGE_FETCHER}, probing with {}", ctx.compiler);
            run_best_effort(runner, &compiler_invocation(&command, &main, &dir));
        }

        let findings = LogFindings::scan(&read_log(&log_path));
        for adjustment in findings.apply(&mut command) {
            tf_debug!("{adjustment}");
        }
        ctx.compiler = command.compiler().clone();

        let missing_fonts = dir.join(MISSING_FONT_LOG);
        remove_stale(&missing_fonts);

        let run = compiler_invocation(&command, &main, &dir);
        tf_debug!("{run}");
        run_best_effort(runner, &run);

        let mut reruns = 0;
        while needs_rerun(&read_log(&log_path)) {
            if reruns == MAX_RERUNS {
                tf_warn!("{main} still asks for a rerun after {MAX_RERUNS} reruns");
                break;
            }
            reruns += 1;
            tf_debug!("rerun {reruns}: {run}");
            run_best_effort(runner, &run);
        }

        report_missing_fonts(&missing_fonts);

        let pdf = if ctx.compiler.is_pdf_producer() {
            main_path.with_extension("pdf")
        } else {
            dvi_to_pdf(runner, &main_path.with_extension("dvi"))
        };
        if pdf.exists() {
            Ok(pdf)
        } else {
            Err(StrategyFailure(format!("{} was not produced", pdf.display())))
        }
    }
}

fn compiler_invocation(command: &CompileCommand, main: &str, dir: &Path) -> ToolInvocation {
    ToolInvocation::new(command.program(), dir).args(command.args(main))
}

/// A missing log reads as empty: nothing to adjust, nothing to rerun.
fn read_log(path: &Path) -> String {
    read_lossy(path).unwrap_or_default()
}

fn remove_stale(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tf_debug!("removed stale {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => tf_warn!("cannot remove {}: {err}", path.display()),
    }
}

fn report_missing_fonts(path: &Path) {
    if let Ok(text) = read_lossy(path) {
        tf_warn!("Missing fonts!");
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            tf_info!("{line}");
        }
    }
}
