use std::fmt;

use crate::{CompileCommand, Compiler};

/// Printed by LaTeX when cross-references have not settled yet.
pub const RERUN_MARKER: &str = "Rerun to";

/// Upper bound on reruns after the first adjusted run.
pub const MAX_RERUNS: usize = 5;

const INPUT_ENCODING_MARKERS: [&str; 2] = ["Package inputenc Error:", "UseRawInputEncoding"];
const POSTSCRIPT_MARKERS: [&str; 2] = ["extension: .pstex", "PSTricks"];
const LATEX_ERROR_MARKER: &str = "! LaTeX Error: ";

/// Conditions found in a compiler log that call for a different invocation.
///
/// The three checks are independent and compound when applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFindings {
    pub input_encoding_error: bool,
    pub postscript_figures: bool,
    pub latex_error: bool,
}

/// A change made to the compile command, reported for verbose runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    RawInputEncoding,
    DviMode(Compiler),
    XeLatex,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::RawInputEncoding => write!(f, "inputenc error, using raw input encoding"),
            Adjustment::DviMode(compiler) => write!(f, "switch to PostScript with {compiler}"),
            Adjustment::XeLatex => write!(f, "switch to XeLaTeX"),
        }
    }
}

impl LogFindings {
    pub fn scan(log: &str) -> Self {
        Self {
            input_encoding_error: INPUT_ENCODING_MARKERS.iter().any(|m| log.contains(m)),
            postscript_figures: POSTSCRIPT_MARKERS.iter().any(|m| log.contains(m)),
            latex_error: log.contains(LATEX_ERROR_MARKER),
        }
    }

    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every finding to `command`, in order: encoding, PostScript, LaTeX error.
    pub fn apply(&self, command: &mut CompileCommand) -> Vec<Adjustment> {
        let mut applied = Vec::new();
        if self.input_encoding_error {
            command.enable_raw_input_encoding();
            applied.push(Adjustment::RawInputEncoding);
        }
        if self.postscript_figures {
            let dvi = command.compiler().dvi_mode();
            command.set_compiler(dvi.clone());
            applied.push(Adjustment::DviMode(dvi));
        }
        if self.latex_error {
            command.set_compiler(Compiler::xelatex());
            applied.push(Adjustment::XeLatex);
        }
        applied
    }
}

pub fn needs_rerun(log: &str) -> bool {
    log.contains(RERUN_MARKER)
}
