use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use texfetch_core::{archive_name, Compiler, DEFAULT_COMPILER};
use texfetch_engine::{FetchSettings, PipelineOptions, DEFAULT_BASE_URL};

/// Fetch an arXiv paper's sources, build them and open the PDF
#[derive(Parser, Debug)]
#[command(name = "texfetch", version, about, long_about = None)]
pub struct Cli {
    /// arXiv identifier, e.g. 2101.00001 or hep-th/9901001
    #[arg(value_parser = parse_tag)]
    pub tag: String,

    /// Compiler used for LaTeX sources
    #[arg(long, default_value = DEFAULT_COMPILER)]
    pub compiler: String,

    /// Download again even if the archive is already present
    #[arg(short = 'f', long)]
    pub forcedownload: bool,

    /// Do not unpack the archive; build from what is already there
    #[arg(short = 's', long)]
    pub skipextract: bool,

    /// Show tool output and every decision taken
    #[arg(short, long)]
    pub verbose: bool,

    /// Base URL of the repository
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub mirror: String,

    /// Directory holding one work directory per identifier
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Build only, do not launch the PDF viewer
    #[arg(long)]
    pub no_view: bool,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// The last segment names the archive and the work directory, so it must be
/// a real file name.
fn parse_tag(raw: &str) -> Result<String, String> {
    match archive_name(raw) {
        "" | "." | ".." => Err(format!("`{raw}` is not an arXiv identifier")),
        _ => Ok(raw.to_string()),
    }
}

impl Cli {
    pub fn compiler(&self) -> Compiler {
        Compiler::new(&self.compiler)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            base_url: self.mirror.clone(),
            request_timeout: Duration::from_secs(self.timeout),
            ..FetchSettings::default()
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            root: self.root.clone(),
            force_download: self.forcedownload,
            skip_extract: self.skipextract,
            open_viewer: !self.no_view,
        }
    }
}
