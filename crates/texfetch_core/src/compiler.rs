use std::fmt;

pub const DEFAULT_COMPILER: &str = "pdflatex";
const PLAIN_TEX_COMPILER: &str = "pdftex";
const XELATEX_COMPILER: &str = "xelatex";

/// Argument that makes LaTeX accept whatever bytes the sources contain.
pub const RAW_INPUT_ENCODING: &str = "\\UseRawInputEncoding \\input";

const BATCH_ARGS: [&str; 3] = ["-interaction=batchmode", "-halt-on-error", "-shell-escape"];

/// Name of a TeX-family engine, e.g. `pdflatex`, `xelatex`, `latex`, `pdftex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Compiler(String);

impl Compiler {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn plain_tex() -> Self {
        Self::new(PLAIN_TEX_COMPILER)
    }

    pub fn xelatex() -> Self {
        Self::new(XELATEX_COMPILER)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_latex(&self) -> bool {
        self.0.ends_with("latex")
    }

    /// Engines that write a PDF directly; everything else writes DVI.
    pub fn is_pdf_producer(&self) -> bool {
        self.0.starts_with("pdf") || self.0.starts_with("xe")
    }

    /// The DVI-producing sibling: `pdflatex` -> `latex`, `xetex` -> `tex`.
    pub fn dvi_mode(&self) -> Self {
        Self(self.0.replace("pdf", "").replace("xe", ""))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER)
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-interactive compiler invocation, adjusted between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    compiler: Compiler,
    raw_input_encoding: bool,
}

impl CompileCommand {
    pub fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            raw_input_encoding: false,
        }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn program(&self) -> &str {
        self.compiler.name()
    }

    pub fn set_compiler(&mut self, compiler: Compiler) {
        self.compiler = compiler;
    }

    pub fn enable_raw_input_encoding(&mut self) {
        self.raw_input_encoding = true;
    }

    pub fn uses_raw_input_encoding(&self) -> bool {
        self.raw_input_encoding
    }

    pub fn args(&self, main_file: &str) -> Vec<String> {
        let mut args: Vec<String> = BATCH_ARGS.iter().map(|arg| arg.to_string()).collect();
        if self.raw_input_encoding {
            args.push(RAW_INPUT_ENCODING.to_string());
        }
        args.push(main_file.to_string());
        args
    }
}
