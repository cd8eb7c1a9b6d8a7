//! ZIP extraction into a modpack directory.
//!
//! Every entry name is resolved against the destination before anything is
//! written, so one escaping entry rejects the whole archive and leaves the
//! destination untouched.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::path::resolve_within;
use crate::{ModhostError, Result};

/// Counts of what an extraction wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Regular files written.
    pub files: usize,
    /// Directory entries created.
    pub directories: usize,
}

/// Planned write for a single archive entry.
#[derive(Debug)]
struct PlannedEntry {
    index: usize,
    target: PathBuf,
    is_dir: bool,
}

/// Resolve an archive entry name against `dest`.
///
/// Backslashes are treated as separators since some archivers write them.
pub fn resolve_entry(dest: &Path, name: &str) -> Result<PathBuf> {
    let name = name.replace('\\', "/");
    resolve_within(dest, &name).map_err(|e| match e {
        ModhostError::InvalidPath(_) => {
            ModhostError::Archive(format!("unsafe entry in archive: {name:?}"))
        }
        other => other,
    })
}

/// Extract the ZIP archive at `source` into `dest`.
///
/// `dest` must exist. Existing files at entry paths are overwritten.
pub fn extract_zip(source: &Path, dest: &Path) -> Result<ExtractSummary> {
    let file = File::open(source)?;
    let mut archive = ZipArchive::new(file)?;

    let mut plan = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let target = resolve_entry(dest, entry.name())?;
        plan.push(PlannedEntry {
            index,
            target,
            is_dir: entry.is_dir(),
        });
    }

    let mut summary = ExtractSummary::default();
    for planned in plan {
        if planned.is_dir {
            fs::create_dir_all(&planned.target)?;
            summary.directories += 1;
            continue;
        }

        if let Some(parent) = planned.target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut entry = archive.by_index(planned.index)?;
        let mut out = File::create(&planned.target)?;
        copy_entry(&mut entry, &mut out, &planned.target)?;
        summary.files += 1;
    }

    Ok(summary)
}

/// Stream one entry to disk. Read failures (bad checksum, broken deflate
/// stream) are archive errors; write failures stay I/O errors.
fn copy_entry(entry: &mut impl Read, out: &mut impl Write, target: &Path) -> Result<()> {
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ModhostError::Archive(format!(
                    "corrupt entry {}: {e}",
                    target.display()
                )))
            }
        };
        out.write_all(&buf[..n])?;
    }
}
