use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use texfetch_logging::{tf_debug, tf_warn};
use thiserror::Error;

/// One external program call, always run inside the work directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The last argument, which is the input file for every tool we drive.
    pub fn target(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    pub success: bool,
    pub code: Option<i32>,
}

impl ToolStatus {
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failure(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{program} not found")]
    NotFound { program: String },
    #[error("{program} failed to start: {source}")]
    Io { program: String, source: io::Error },
}

pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus, ToolError>;
}

/// Run a tool whose failure is not fatal; returns whether it succeeded.
pub fn run_best_effort(runner: &dyn ToolRunner, invocation: &ToolInvocation) -> bool {
    match runner.run(invocation) {
        Ok(status) if status.success => true,
        Ok(status) => {
            tf_warn!("`{invocation}` exited with status {:?}", status.code);
            false
        }
        Err(err) => {
            tf_warn!("`{invocation}`: {err}");
            false
        }
    }
}

/// Spawns real processes. Output is shown live when verbose, discarded otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus, ToolError> {
        tf_debug!("running `{invocation}` in {}", invocation.cwd.display());
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).current_dir(&invocation.cwd);
        if !self.verbose {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        let status = command.status().map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                ToolError::NotFound {
                    program: invocation.program.clone(),
                }
            } else {
                ToolError::Io {
                    program: invocation.program.clone(),
                    source: err,
                }
            }
        })?;

        Ok(ToolStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}
