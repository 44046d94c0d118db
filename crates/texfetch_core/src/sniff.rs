use std::fmt::Write;

use crate::ArchiveKind;

/// Number of leading bytes needed to recognise every supported format.
pub const HEADER_LEN: usize = 262;

const TAR_MAGIC_RANGE: std::ops::Range<usize> = 257..262;
const REPORTED_HEADER_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown header {}", escape(.header))]
pub struct UnknownFormat {
    pub header: Vec<u8>,
}

/// Classify a file from its leading bytes.
///
/// Headers shorter than [`HEADER_LEN`] are fine: they simply cannot be a tar.
///
/// Besides the `%PS` prefix, the DSC form `%!PS` that real PostScript files
/// start with is deliberately accepted as PostScript too.
pub fn sniff(header: &[u8]) -> Result<ArchiveKind, UnknownFormat> {
    if header.starts_with(b"%PDF") {
        return Ok(ArchiveKind::Pdf);
    }
    if header.starts_with(b"%PS") || header.starts_with(b"%!PS") {
        return Ok(ArchiveKind::Ps);
    }
    if header.starts_with(&[0x1f, 0x8b]) {
        return Ok(ArchiveKind::Gz);
    }
    if header.get(TAR_MAGIC_RANGE) == Some(b"ustar".as_slice()) {
        return Ok(ArchiveKind::Tar);
    }
    Err(UnknownFormat {
        header: header.iter().take(REPORTED_HEADER_LEN).copied().collect(),
    })
}

/// DVI files open with the `pre` opcode followed by format id 2.
pub fn is_dvi_preamble(header: &[u8]) -> bool {
    header.starts_with(&[0xf7, 0x02])
}

fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b\"");
    for byte in bytes {
        for c in std::ascii::escape_default(*byte) {
            let _ = out.write_char(c as char);
        }
    }
    out.push('"');
    out
}
