//! Whole-directory zip packing and single-entry reads.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::archive::error::{ArchiveError, ArchiveResult};

/// One file or directory below the packed root.
struct PackEntry {
    /// `/`-separated name inside the archive
    name: String,
    source: PathBuf,
    is_dir: bool,
}

/// Compress every file and directory below `source_dir` into `dest_file`.
///
/// The archive is written next to `dest_file` first and renamed over it, so
/// readers only ever see the previous or the new complete archive.
pub fn pack(source_dir: &Path, dest_file: &Path) -> ArchiveResult<()> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::NotADirectory(source_dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    collect_entries(source_dir, source_dir, &mut entries)?;

    let parent = match dest_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(parent)?;

    {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(staging.as_file_mut());

        for entry in &entries {
            if entry.is_dir {
                writer.add_directory(format!("{}/", entry.name), options)?;
            } else {
                writer.start_file(entry.name.as_str(), options)?;
                let mut file = File::open(&entry.source)?;
                io::copy(&mut file, &mut writer)?;
            }
        }

        writer.finish()?;
    }

    staging.persist(dest_file).map_err(|e| ArchiveError::Io(e.error))?;
    debug!(
        source = %source_dir.display(),
        dest = %dest_file.display(),
        entries = entries.len(),
        "packed archive"
    );
    Ok(())
}

// sorted so the same tree always packs in the same order
fn collect_entries(root: &Path, dir: &Path, out: &mut Vec<PackEntry>) -> ArchiveResult<()> {
    let mut children: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    children.sort_by_key(|e| e.file_name());

    for child in children {
        let file_type = child.file_type()?;
        let path = child.path();
        let name = archive_name(root, &path)?;

        if file_type.is_dir() {
            out.push(PackEntry {
                name,
                source: path.clone(),
                is_dir: true,
            });
            collect_entries(root, &path, out)?;
        } else if file_type.is_file() {
            out.push(PackEntry {
                name,
                source: path,
                is_dir: false,
            });
        }
    }

    Ok(())
}

fn archive_name(root: &Path, path: &Path) -> ArchiveResult<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ArchiveError::NotADirectory(path.to_path_buf()))?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Extract the whole archive at `src_file` into `dest_dir`.
pub fn unpack(src_file: &Path, dest_dir: &Path) -> ArchiveResult<()> {
    let file = File::open(src_file)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    fs::create_dir_all(dest_dir)?;
    archive.extract(dest_dir)?;

    debug!(
        source = %src_file.display(),
        dest = %dest_dir.display(),
        entries = archive.len(),
        "unpacked archive"
    );
    Ok(())
}

/// Read one entry as text without extracting anything else.
///
/// Returns `Ok(None)` when the archive has no entry called `name`.
pub fn read_entry(src_file: &Path, name: &str) -> ArchiveResult<Option<String>> {
    let file = File::open(src_file)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    let text = String::from_utf8(bytes).map_err(|_| ArchiveError::NotText {
        name: name.to_string(),
    })?;
    Ok(Some(text))
}
