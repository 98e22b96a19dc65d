// qdebug - app/tail.rs
//
// Streams the log file to a writer, optionally following new appends.
//
// The follow loop polls the file on a fixed interval and copies any bytes
// past the last offset. A file that shrinks, disappears or is replaced by a
// different file (the user deleted the log to start fresh) resets the offset
// to 0, so the new file is picked up from its beginning. Replacement is
// detected by device and inode on Unix and by creation time elsewhere.
//
// The poll loop sleeps in small sub-intervals so the cancel flag is checked
// within TAIL_CANCEL_CHECK_INTERVAL_MS of being set.

use crate::util::constants::{
    MAX_TAIL_READ_BYTES_PER_TICK, TAIL_CANCEL_CHECK_INTERVAL_MS, TAIL_POLL_INTERVAL_MS,
};
use crate::util::error::QError;
use std::fs::{File, Metadata};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Identity of an open file, stable across appends and renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileId(u64, u64);

impl FileId {
    #[cfg(unix)]
    fn of(meta: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self(meta.dev(), meta.ino()))
    }

    #[cfg(not(unix))]
    fn of(meta: &Metadata) -> Option<Self> {
        let created = meta.created().ok()?;
        let since = created.duration_since(std::time::UNIX_EPOCH).ok()?;
        Some(Self(since.as_secs(), u64::from(since.subsec_nanos())))
    }
}

/// Position reached in the log: the byte offset and the file it refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TailCursor {
    offset: u64,
    file: Option<FileId>,
}

impl TailCursor {
    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Read up to `MAX_TAIL_READ_BYTES_PER_TICK` bytes appended after `cursor`.
///
/// Returns the bytes and the advanced cursor. A missing file reads as empty
/// with a fresh cursor; a file shorter than the offset, or a different file
/// now at `path`, is re-read from the start.
pub fn read_new_bytes(path: &Path, cursor: TailCursor) -> Result<(Vec<u8>, TailCursor), QError> {
    let read_err = |source: io::Error| QError::LogRead {
        path: path.to_path_buf(),
        source,
    };

    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok((Vec::new(), TailCursor::default()))
        }
        Err(e) => return Err(read_err(e)),
    };
    let meta = file.metadata().map_err(read_err)?;
    let len = meta.len();
    let id = FileId::of(&meta);

    let replaced = cursor.file.is_some() && cursor.file != id;
    let start = if replaced {
        tracing::debug!(path = %path.display(), "Log replaced, reading from start");
        0
    } else if len < cursor.offset {
        tracing::debug!(
            path = %path.display(),
            len,
            offset = cursor.offset,
            "Log shrank, reading from start"
        );
        0
    } else {
        cursor.offset
    };

    let mut buf = Vec::new();
    if len > start {
        file.seek(SeekFrom::Start(start)).map_err(read_err)?;
        file.take(MAX_TAIL_READ_BYTES_PER_TICK as u64)
            .read_to_end(&mut buf)
            .map_err(read_err)?;
    }
    let next = TailCursor {
        offset: start + buf.len() as u64,
        file: id,
    };
    Ok((buf, next))
}

/// Copy the current log contents to `out`; returns the position reached.
pub fn dump<W: Write>(path: &Path, out: &mut W) -> Result<TailCursor, QError> {
    let mut cursor = TailCursor::default();
    loop {
        let (bytes, next) = read_new_bytes(path, cursor)?;
        cursor = next;
        if bytes.is_empty() {
            return Ok(cursor);
        }
        write_out(out, &bytes)?;
    }
}

/// Stream bytes appended to the log after `cursor` until `cancel` is set.
pub fn follow<W: Write>(
    path: &Path,
    mut cursor: TailCursor,
    out: &mut W,
    cancel: &AtomicBool,
) -> Result<(), QError> {
    tracing::info!(path = %path.display(), offset = cursor.offset, "Following log");
    let poll = Duration::from_millis(TAIL_POLL_INTERVAL_MS);
    let check = Duration::from_millis(TAIL_CANCEL_CHECK_INTERVAL_MS);

    while !cancel.load(Ordering::SeqCst) {
        let (bytes, next) = read_new_bytes(path, cursor)?;
        cursor = next;
        if !bytes.is_empty() {
            write_out(out, &bytes)?;
            continue;
        }

        let mut slept = Duration::ZERO;
        while slept < poll && !cancel.load(Ordering::SeqCst) {
            std::thread::sleep(check);
            slept += check;
        }
    }
    tracing::debug!("Follow cancelled");
    Ok(())
}

fn write_out<W: Write>(out: &mut W, bytes: &[u8]) -> Result<(), QError> {
    out.write_all(bytes)
        .and_then(|()| out.flush())
        .map_err(|source| QError::FileWriteFailure {
            path: "<output>".into(),
            operation: "write",
            source,
        })
}
