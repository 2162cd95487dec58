//! Merge per-bundle output into one deduplicated, newest-first dataset.
//!
//! A [`DatasetAssembler`] is built fresh for each run and owns the accumulator
//! and the seen-id index. First-seen wins on duplicate ids; later copies are
//! reported, with a flag when their content differs from the kept record.
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc, Weekday};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::twitter::bundle::{process_file, BundleError};
use crate::twitter::types::PostRecord;

/// `created_at` layout used by the timeline API after the leading weekday,
/// e.g. `Dec 22 19:54:02 +0000 2020` out of `Tue Dec 22 19:54:02 +0000 2020`.
pub const CREATED_AT_FORMAT: &str = "%b %d %H:%M:%S %z %Y";

/// Sort key for records whose `created_at` is absent or unparseable.
/// Under newest-first order these land at the end.
pub const MISSING_TIMESTAMP_SORT_KEY: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// Parse a `created_at` value.
///
/// The weekday must be a weekday name but is not checked against the date:
/// captured payloads and hand-written fixtures do not always agree.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let (weekday, rest) = raw.trim().split_once(' ')?;
    weekday.parse::<Weekday>().ok()?;
    DateTime::parse_from_str(rest.trim_start(), CREATED_AT_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn sort_key(post: &PostRecord) -> DateTime<Utc> {
    match post.created_at.as_deref() {
        None => MISSING_TIMESTAMP_SORT_KEY,
        Some(raw) => parse_created_at(raw).unwrap_or_else(|| {
            warn!(id = %post.id, created_at = raw, "assemble.timestamp_unparseable");
            MISSING_TIMESTAMP_SORT_KEY
        }),
    }
}

/// A later copy of an id that was already kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSkip {
    pub id: String,
    pub source: Option<PathBuf>,
    /// The skipped copy differs from the kept one (counters edited between captures, ...).
    pub diverged: bool,
}

/// Result of one run.
#[derive(Debug, Default)]
pub struct Dataset {
    pub posts: Vec<PostRecord>,
    pub duplicates: Vec<DuplicateSkip>,
    pub failures: Vec<BundleError>,
    pub files_processed: usize,
}

impl Dataset {
    pub fn duplicates_skipped(&self) -> usize {
        self.duplicates.len()
    }
}

#[derive(Debug, Default)]
pub struct DatasetAssembler {
    posts: Vec<PostRecord>,
    seen: HashMap<String, usize>,
    duplicates: Vec<DuplicateSkip>,
    failures: Vec<BundleError>,
    files_processed: usize,
}

impl DatasetAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process every file in the given order and return the sorted dataset.
    pub fn assemble<I, P>(paths: I) -> Dataset
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut assembler = Self::new();
        for path in paths {
            assembler.ingest_file(path.as_ref());
        }
        assembler.finish()
    }

    /// Read one bundle file. Read or parse failures are recorded and the file contributes nothing.
    pub fn ingest_file(&mut self, path: &Path) {
        match process_file(path) {
            Ok(output) => {
                self.files_processed += 1;
                info!(
                    path = %path.display(),
                    posts = output.stats.posts,
                    api_errors = output.stats.api_error_records,
                    "assemble.file_ingested"
                );
                self.ingest_posts(output.posts, Some(path));
            }
            Err(err) => {
                warn!(path = %err.path().display(), error = %err, "assemble.file_failed");
                self.failures.push(err);
            }
        }
    }

    pub fn ingest_posts<I>(&mut self, posts: I, source: Option<&Path>)
    where
        I: IntoIterator<Item = PostRecord>,
    {
        for post in posts {
            match self.seen.get(&post.id) {
                Some(&kept) => {
                    let diverged = self.posts[kept] != post;
                    if diverged {
                        warn!(id = %post.id, "assemble.duplicate_skipped_diverged");
                    } else {
                        debug!(id = %post.id, "assemble.duplicate_skipped");
                    }
                    self.duplicates.push(DuplicateSkip {
                        id: post.id,
                        source: source.map(Path::to_path_buf),
                        diverged,
                    });
                }
                None => {
                    self.seen.insert(post.id.clone(), self.posts.len());
                    self.posts.push(post);
                }
            }
        }
    }

    /// Sort newest first. Ties keep encounter order.
    pub fn finish(self) -> Dataset {
        let mut posts = self.posts;
        posts.sort_by_cached_key(|post| Reverse(sort_key(post)));
        Dataset {
            posts,
            duplicates: self.duplicates,
            failures: self.failures,
            files_processed: self.files_processed,
        }
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize dataset for {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Write the dataset as pretty JSON with non-ASCII text kept verbatim.
///
/// Output goes to a temporary file next to `path` which replaces `path` only
/// once fully written, so a failed write never leaves a truncated artifact.
pub fn write_dataset(path: &Path, posts: &[PostRecord]) -> Result<(), WriteError> {
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, posts).map_err(|source| {
            WriteError::Serialize {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
