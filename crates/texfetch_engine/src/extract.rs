use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Component, Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tar::{Archive, EntryType};
use tempfile::NamedTempFile;
use texfetch_core::{append_extension, sniff, ArchiveKind};
use texfetch_logging::{tf_debug, tf_warn};
use thiserror::Error;

use crate::persist::read_header;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0:?} is not an archive")]
    NotAnArchive(ArchiveKind),
    #[error("cannot rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("cannot unpack {}: {source}", .path.display())]
    Unpack { path: PathBuf, source: io::Error },
}

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Where the archive lives now; `None` once a gzip stream has been consumed.
    pub archive: Option<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Rename `archive` with the suffix of its kind and unpack it next to itself.
///
/// Tar archives keep their `.tar` file. Gzip streams are decompressed and the
/// `.gz` file removed; a gzipped tar is unpacked like a plain one.
pub fn extract_archive(archive: &Path, kind: ArchiveKind) -> Result<Extracted, ExtractError> {
    if !kind.is_packed() {
        return Err(ExtractError::NotAnArchive(kind));
    }
    let dir = match archive.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let renamed = append_extension(archive, kind.extension());
    fs::rename(archive, &renamed).map_err(|source| ExtractError::Rename {
        from: archive.to_path_buf(),
        to: renamed.clone(),
        source,
    })?;
    tf_debug!("renamed archive to {}", renamed.display());

    let unpack_err = |source| ExtractError::Unpack {
        path: renamed.clone(),
        source,
    };
    match kind {
        ArchiveKind::Tar => {
            let file = File::open(&renamed).map_err(unpack_err)?;
            let files = unpack_tar(BufReader::new(file), &dir).map_err(unpack_err)?;
            Ok(Extracted {
                archive: Some(renamed),
                files,
            })
        }
        _ => {
            let files = gunzip(&renamed, &dir).map_err(unpack_err)?;
            fs::remove_file(&renamed).map_err(unpack_err)?;
            Ok(Extracted {
                archive: None,
                files,
            })
        }
    }
}

/// Rejects members that could escape the target directory: absolute paths,
/// `..` components, device nodes, FIFOs, and links pointing outside.
pub fn is_safe_entry(path: &Path, entry_type: EntryType, link: Option<&Path>) -> bool {
    if !is_contained(path) {
        return false;
    }
    match entry_type {
        EntryType::Regular | EntryType::Continuous | EntryType::Directory => true,
        EntryType::Symlink | EntryType::Link => link.is_some_and(is_contained),
        _ => false,
    }
}

fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn unpack_tar<R: Read>(reader: R, dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut archive = Archive::new(reader);
    let mut files = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let entry_type = entry.header().entry_type();
        if entry_type == EntryType::XGlobalHeader {
            continue;
        }
        let link = entry.link_name()?.map(|link| link.into_owned());
        if !is_safe_entry(&path, entry_type, link.as_deref()) {
            tf_warn!("skipping unsafe archive member {}", path.display());
            continue;
        }
        if entry.unpack_in(dir)? && entry_type != EntryType::Directory {
            files.push(dir.join(&path));
        }
    }
    tf_debug!("unpacked {} files into {}", files.len(), dir.display());
    Ok(files)
}

/// `gzip -dNf`: decompress every member and restore the name stored in the
/// first header, overwriting.
fn gunzip(gz: &Path, dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(gz)?));
    // Later members replace the decoder's header, so take the name up front.
    let stored_name = decoder
        .header()
        .and_then(|header| header.filename())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .and_then(|name| {
            Path::new(&name)
                .file_name()
                .map(|base| base.to_string_lossy().into_owned())
        });

    let mut tmp = NamedTempFile::new_in(dir)?;
    io::copy(&mut decoder, &mut tmp)?;
    tmp.flush()?;

    if matches!(sniff(&read_header(tmp.path())?), Ok(ArchiveKind::Tar)) {
        tf_debug!("{} holds a tar archive", gz.display());
        return unpack_tar(BufReader::new(tmp.reopen()?), dir);
    }

    let target = match stored_name.map(|name| dir.join(name)) {
        Some(target) if target != gz => target,
        _ => gz.with_extension(""),
    };
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(vec![target])
}
