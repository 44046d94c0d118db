use std::fmt;

/// Content type of a file as recognised from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Pdf,
    Ps,
    Gz,
    Tar,
}

impl ArchiveKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Pdf => "pdf",
            ArchiveKind::Ps => "ps",
            ArchiveKind::Gz => "gz",
            ArchiveKind::Tar => "tar",
        }
    }

    /// True for containers that have to be unpacked before building.
    pub fn is_packed(self) -> bool {
        matches!(self, ArchiveKind::Gz | ArchiveKind::Tar)
    }
}

/// What has to be built to reach a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Latex,
    Tex,
    Dvi,
    Ps,
    Pdf,
}

impl SourceKind {
    /// Both TeX flavours go through main-file lookup and compilation.
    pub fn is_tex_like(self) -> bool {
        matches!(self, SourceKind::Latex | SourceKind::Tex)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Latex => "latex",
            SourceKind::Tex => "tex",
            SourceKind::Dvi => "dvi",
            SourceKind::Ps => "ps",
            SourceKind::Pdf => "pdf",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a fetch actually obtained, which may differ from what was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchedKind {
    Dvi,
    Ps,
    Pdf,
    Latex,
    Error,
}

impl From<ArchiveKind> for FetchedKind {
    fn from(kind: ArchiveKind) -> Self {
        match kind {
            ArchiveKind::Pdf => FetchedKind::Pdf,
            ArchiveKind::Ps => FetchedKind::Ps,
            ArchiveKind::Gz | ArchiveKind::Tar => FetchedKind::Latex,
        }
    }
}

impl fmt::Display for FetchedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchedKind::Dvi => "dvi",
            FetchedKind::Ps => "ps",
            FetchedKind::Pdf => "pdf",
            FetchedKind::Latex => "latex",
            FetchedKind::Error => "error",
        };
        f.write_str(label)
    }
}

/// Formats offered on the repository's "other formats" page that we can build from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeFormat {
    Dvi,
    Ps,
    Pdf,
}

impl AlternativeFormat {
    /// Most preferred first.
    pub const PREFERENCE: [AlternativeFormat; 3] =
        [AlternativeFormat::Dvi, AlternativeFormat::Ps, AlternativeFormat::Pdf];

    /// Name used as the first segment of the download path.
    pub fn name(self) -> &'static str {
        match self {
            AlternativeFormat::Dvi => "dvi",
            AlternativeFormat::Ps => "ps",
            AlternativeFormat::Pdf => "pdf",
        }
    }
}

impl From<AlternativeFormat> for FetchedKind {
    fn from(format: AlternativeFormat) -> Self {
        match format {
            AlternativeFormat::Dvi => FetchedKind::Dvi,
            AlternativeFormat::Ps => FetchedKind::Ps,
            AlternativeFormat::Pdf => FetchedKind::Pdf,
        }
    }
}
