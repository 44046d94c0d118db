mod common;

use std::fs;
use std::path::Path;

use common::{init_logging, FakeTexLive, MAIN_TEX};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use texfetch_core::{BuildContext, Compiler, MAX_RERUNS, RAW_INPUT_ENCODING};
use texfetch_engine::{CompilationDriver, CompileError, MISSING_FONT_LOG};

const RERUN_LOG: &str =
    "LaTeX Warning: Label(s) may have changed. Rerun to get cross-references right.\n";

const MISSING_FONTS: &str = "mktextfm ecrm1000\nmktexpk --mfmode / --bdpi 600 cmr10\n";

fn context(temp: &TempDir, compiler: &str) -> BuildContext {
    let mut ctx = BuildContext::new("2101.00001", temp.path(), Compiler::new(compiler));
    fs::create_dir_all(&ctx.work_dir).unwrap();
    fs::write(ctx.work_dir.join("main.tex"), MAIN_TEX).unwrap();
    ctx.main_file = Some("main.tex".into());
    ctx
}

#[test]
fn all_in_one_engine_bypasses_the_toolchain() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive {
        tectonic_available: true,
        ..FakeTexLive::default()
    }
    .runner();

    let pdf = CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert_eq!(pdf, ctx.work_dir.join("main.pdf"));
    assert_eq!(runner.programs(), vec!["tectonic"]);
}

#[test]
fn falls_back_to_package_fetcher_then_compiler() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive::default().runner();

    let pdf = CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert_eq!(pdf, ctx.work_dir.join("main.pdf"));
    assert_eq!(runner.programs(), vec!["tectonic", "texliveonfly", "pdflatex"]);
    let calls = runner.calls();
    assert_eq!(calls[1].args, vec!["-c", "pdflatex", "main.tex"]);
    assert_eq!(
        calls[2].args,
        vec!["-interaction=batchmode", "-halt-on-error", "-shell-escape", "main.tex"]
    );
    assert_eq!(calls[2].cwd, ctx.work_dir);
}

#[test]
fn rerun_marker_twice_means_three_compiler_runs() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive {
        run_logs: vec![RERUN_LOG.into(), RERUN_LOG.into(), "Output written.\n".into()],
        ..FakeTexLive::default()
    }
    .runner();

    CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert_eq!(runner.count("pdflatex"), 3);
}

#[test]
fn reruns_are_capped() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive {
        run_logs: vec![RERUN_LOG.into()],
        ..FakeTexLive::default()
    }
    .runner();

    let pdf = CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert!(pdf.exists());
    assert_eq!(runner.count("pdflatex"), 1 + MAX_RERUNS);
}

#[test]
fn encoding_and_latex_errors_compound() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive {
        fetcher_log: Some(
            "! Package inputenc Error: Invalid UTF-8 byte \"E9.\n! LaTeX Error: Unicode character.\n"
                .into(),
        ),
        ..FakeTexLive::default()
    }
    .runner();

    let pdf = CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert_eq!(pdf, ctx.work_dir.join("main.pdf"));
    assert_eq!(ctx.compiler, Compiler::xelatex());
    let last = runner.calls().pop().unwrap();
    assert_eq!(last.program, "xelatex");
    assert!(last.args.contains(&RAW_INPUT_ENCODING.to_string()));
    assert_eq!(last.target(), Some("main.tex"));
}

#[test]
fn postscript_figures_go_through_dvi() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive {
        fetcher_log: Some("PSTricks' core package, version 2.97\n".into()),
        ..FakeTexLive::default()
    }
    .runner();

    let pdf = CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert_eq!(pdf, ctx.work_dir.join("main.pdf"));
    assert_eq!(ctx.compiler, Compiler::new("latex"));
    assert_eq!(
        runner.programs(),
        vec!["tectonic", "texliveonfly", "latex", "dvips", "ps2pdf"]
    );
    let dvips = &runner.calls()[3];
    assert_eq!(dvips.args, vec!["-o", "main.ps", "main.dvi"]);
}

#[test]
fn missing_log_triggers_a_probe_run() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive {
        fetcher_log: None,
        ..FakeTexLive::default()
    }
    .runner();

    CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert_eq!(
        runner.programs(),
        vec!["tectonic", "texliveonfly", "pdflatex", "pdflatex"]
    );
}

#[test]
fn stale_missing_font_log_is_removed() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let stale = ctx.work_dir.join(MISSING_FONT_LOG);
    fs::write(&stale, "mktextfm ecrm1000\n").unwrap();
    let runner = FakeTexLive::default().runner();

    CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert!(!stale.exists());
}

#[test]
fn missing_fonts_are_reported_without_failing_the_build() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive {
        missing_fonts: Some(MISSING_FONTS.into()),
        ..FakeTexLive::default()
    }
    .runner();

    let pdf = CompilationDriver::default().compile(&mut ctx, &runner).unwrap();

    assert_eq!(pdf, ctx.work_dir.join("main.pdf"));
    let report = ctx.work_dir.join(MISSING_FONT_LOG);
    assert!(report.exists());
    assert_eq!(fs::read_to_string(report).unwrap().lines().count(), 2);
}

#[test]
fn no_output_from_any_strategy_is_an_error() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, "pdflatex");
    let runner = FakeTexLive {
        produces_output: false,
        ..FakeTexLive::default()
    }
    .runner();

    let err = CompilationDriver::default().compile(&mut ctx, &runner).unwrap_err();

    assert!(matches!(err, CompileError::NoOutput { ref main } if main == "main.tex"));
}

#[test]
fn compile_requires_a_main_file() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut ctx = BuildContext::new("x", temp.path(), Compiler::default());
    let runner = FakeTexLive::default().runner();

    let err = CompilationDriver::default().compile(&mut ctx, &runner).unwrap_err();

    assert!(matches!(err, CompileError::NoMainFile));
    assert!(runner.calls().is_empty());
    assert!(!Path::new(&ctx.work_dir).join("main.pdf").exists());
}
