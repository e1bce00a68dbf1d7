//! Storage layer for the ct time tracker.
//!
//! Each user has one append-only log file, `<user>.txt`, inside a shared
//! working directory. Lines are never rewritten or removed.
//!
//! # Concurrency
//!
//! No locking is performed. Two `ct` processes appending to the same user's
//! log at once may interleave their lines; callers that run several
//! instances must serialize them externally.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ct_core::Event;
use thiserror::Error;

/// File extension of user log files.
pub const LOG_EXTENSION: &str = "txt";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The working directory does not exist.
    #[error("working directory {} does not exist; run 'ct init' first", .0.display())]
    MissingDirectory(PathBuf),

    /// Reading or writing a file failed.
    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A user's log file found in the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLog {
    pub user: String,
    pub path: PathBuf,
}

/// Handle on a working directory of per-user logs.
#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
}

impl LogStore {
    /// Opens an existing working directory.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::MissingDirectory(dir.to_path_buf()));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Opens a working directory, creating it if necessary.
    pub fn create(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            action: "create",
            path: dir.to_path_buf(),
            source,
        })?;
        Self::open(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log file for `user`.
    pub fn user_path(&self, user: &str) -> PathBuf {
        self.dir.join(format!("{user}.{LOG_EXTENSION}"))
    }

    /// Reads a user's log. Returns `None` if the user has no log yet.
    pub fn read_lines(&self, user: &str) -> Result<Option<Vec<String>>, StoreError> {
        read_log(&self.user_path(user))
    }

    /// Appends one line to a user's log.
    pub fn append_line(&self, user: &str, line: &str) -> Result<(), StoreError> {
        self.append_lines(user, &[line])
    }

    /// Appends events to a user's log in a single write.
    pub fn append_events(&self, user: &str, events: &[Event]) -> Result<(), StoreError> {
        let lines: Vec<String> = events.iter().map(ToString::to_string).collect();
        self.append_lines(user, &lines)
    }

    /// Appends lines to a user's log in a single write.
    ///
    /// Lines containing a newline are rejected so one call always adds
    /// exactly `lines.len()` records. If the file does not end in a newline,
    /// one is written first so the last existing record stays intact.
    pub fn append_lines<S: AsRef<str>>(&self, user: &str, lines: &[S]) -> Result<(), StoreError> {
        let path = self.user_path(user);
        if lines.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for line in lines {
            let line = line.as_ref();
            if line.contains('\n') {
                return Err(StoreError::Io {
                    action: "append to",
                    path,
                    source: io::Error::new(io::ErrorKind::InvalidInput, "record contains a newline"),
                });
            }
            buf.push_str(line);
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Io {
                action: "open",
                path: path.clone(),
                source,
            })?;
        let unterminated = ends_without_newline(&mut file).map_err(|source| StoreError::Io {
            action: "read",
            path: path.clone(),
            source,
        })?;
        if unterminated {
            tracing::warn!(path = %path.display(), "log did not end with a newline; terminating last record");
            buf.insert(0, '\n');
        }
        file.write_all(buf.as_bytes())
            .map_err(|source| StoreError::Io {
                action: "append to",
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), records = lines.len(), "appended to log");
        Ok(())
    }

    /// Lists every user log in the working directory, sorted by user.
    pub fn list_user_files(&self) -> Result<Vec<UserLog>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            action: "list",
            path: self.dir.clone(),
            source,
        })?;

        let mut logs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                action: "list",
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != LOG_EXTENSION) {
                continue;
            }
            let Some(user) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping log with non-UTF-8 name");
                continue;
            };
            logs.push(UserLog {
                user: user.to_string(),
                path,
            });
        }

        logs.sort_by(|a, b| a.user.cmp(&b.user));
        Ok(logs)
    }
}

/// Whether a non-empty file's last byte is something other than `\n`.
fn ends_without_newline(file: &mut fs::File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Reads a log file's lines. Returns `None` if the file does not exist.
///
/// Lines are decoded one at a time. A line that is not valid UTF-8 is kept
/// with replacement characters, which the event parser rejects, so one bad
/// record never makes the whole file unreadable.
pub fn read_log(path: &Path) -> Result<Option<Vec<String>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(decode_lines(path, &bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            action: "read",
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn decode_lines(path: &Path, bytes: &[u8]) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);

    body.split(|&b| b == b'\n')
        .enumerate()
        .map(|(idx, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            match std::str::from_utf8(raw) {
                Ok(line) => line.to_string(),
                Err(_) => {
                    tracing::warn!(path = %path.display(), line = idx + 1, "record is not valid UTF-8");
                    String::from_utf8_lossy(raw).into_owned()
                }
            }
        })
        .collect()
}
