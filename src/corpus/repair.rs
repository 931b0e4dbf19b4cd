//! Wraps raw multi-record corpus files in a single root element.
//!
//! Raw AP89 files are a sequence of `<DOC>` blocks with nothing around them,
//! which a strict XML parser refuses. The repair is a pure textual wrap: the
//! original lines are copied byte for byte between `<ROOT>` and `</ROOT>`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ItemError;

pub const ROOT_OPEN: &str = "<ROOT>";
pub const ROOT_CLOSE: &str = "</ROOT>";

/// What happened to one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// Content was wrapped in a root element.
    Written,
    /// Content already had a root element and was copied unchanged.
    PassedThrough,
    /// The destination already existed and was left alone.
    Skipped,
}

/// Path of the repaired copy of `source`.
pub fn repaired_path(source: &Path, suffix: &str) -> PathBuf {
    let mut name = source.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write the repaired copy of `source` to `destination`.
///
/// With `skip_existing`, an existing destination is never touched, so running
/// the repair twice yields the same bytes as running it once.
pub fn repair_file(
    source: &Path,
    destination: &Path,
    skip_existing: bool,
) -> Result<RepairOutcome, ItemError> {
    let to_error = |source_err: io::Error| ItemError::Repair {
        path: source.to_path_buf(),
        source: source_err,
    };

    let reader = File::open(source).map(BufReader::new).map_err(to_error)?;

    let mut options = OpenOptions::new();
    options.write(true);
    if skip_existing {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }
    let out = match options.open(destination) {
        Ok(file) => file,
        Err(e) if skip_existing && e.kind() == io::ErrorKind::AlreadyExists => {
            debug!("{:?} already repaired, skipping", destination);
            return Ok(RepairOutcome::Skipped);
        }
        Err(e) => return Err(to_error(e)),
    };

    match wrap(reader, BufWriter::new(out)) {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            // A half-written file would be skipped by the next run.
            if let Err(remove_err) = fs::remove_file(destination) {
                warn!("Failed to remove partial {:?}: {}", destination, remove_err);
            }
            Err(to_error(e))
        }
    }
}

/// Copy `reader` into `writer`, adding a root element when it lacks one.
pub fn wrap<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<RepairOutcome> {
    let mut line = Vec::new();
    let mut leading = Vec::new();

    // Hold back blank lines until the first content line decides the outcome.
    let rooted = loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break false;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            leading.extend_from_slice(&line);
            continue;
        }
        break String::from_utf8_lossy(&line).trim() == ROOT_OPEN;
    };

    if !rooted {
        writeln!(writer, "{ROOT_OPEN}")?;
    }
    writer.write_all(&leading)?;
    writer.write_all(&line)?;

    let mut last = line.last().or(leading.last()).copied();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        writer.write_all(&line)?;
        last = line.last().copied();
    }

    if rooted {
        writer.flush()?;
        return Ok(RepairOutcome::PassedThrough);
    }

    if matches!(last, Some(b) if b != b'\n') {
        writer.write_all(b"\n")?;
    }
    writeln!(writer, "{ROOT_CLOSE}")?;
    writer.flush()?;
    Ok(RepairOutcome::Written)
}
