//! Walk one capture bundle and pull every post out of its search timeline.
//!
//! A bundle is a JSON array of [`CaptureRecord`]s. Posts sit at
//! `response.data.search_by_raw_query.search_timeline.timeline.instructions[]`,
//! inside `TimelineAddEntries` instructions, in entries whose content is a
//! `TimelineTimelineItem` wrapping a `TimelineTweet`. Cursor entries, module
//! entries, and every other instruction type are ignored.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::twitter::extract::extract_post;
use crate::twitter::path::lookup;
use crate::twitter::types::{CaptureRecord, PostRecord};

pub const INSTRUCTIONS_PATH: &[&str] = &[
    "data",
    "search_by_raw_query",
    "search_timeline",
    "timeline",
    "instructions",
];
pub const ADD_ENTRIES: &str = "TimelineAddEntries";
pub const TIMELINE_ITEM: &str = "TimelineTimelineItem";
pub const TIMELINE_TWEET: &str = "TimelineTweet";

/// File-level failures. The file contributes nothing; the run continues.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read bundle {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse bundle {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl BundleError {
    pub fn path(&self) -> &Path {
        match self {
            BundleError::Read { path, .. } | BundleError::Parse { path, .. } => path,
        }
    }
}

/// Counters for one bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleStats {
    pub records: usize,
    /// Records whose response carried an `errors` field.
    pub api_error_records: usize,
    /// Array elements that were not capture-record shaped.
    pub malformed_records: usize,
    pub candidates: usize,
    pub rejected_expected: usize,
    pub rejected_malformed: usize,
    pub posts: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BundleOutput {
    pub posts: Vec<PostRecord>,
    pub stats: BundleStats,
}

/// Read a bundle file into its raw capture-record values.
pub fn read_bundle(path: &Path) -> Result<Vec<Value>, BundleError> {
    let bytes = fs::read(path).map_err(|source| BundleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| BundleError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and process one bundle file.
pub fn process_file(path: &Path) -> Result<BundleOutput, BundleError> {
    let records = read_bundle(path)?;
    let output = process_bundle(records);
    debug!(
        path = %path.display(),
        records = output.stats.records,
        api_errors = output.stats.api_error_records,
        candidates = output.stats.candidates,
        posts = output.stats.posts,
        "bundle.processed"
    );
    Ok(output)
}

/// Extract every post from an already parsed bundle, in encounter order.
pub fn process_bundle(records: Vec<Value>) -> BundleOutput {
    let mut out = BundleOutput::default();

    for (index, raw) in records.into_iter().enumerate() {
        out.stats.records += 1;
        if !raw.is_object() {
            out.stats.malformed_records += 1;
            warn!(index, kind = json_kind(&raw), "bundle.record_malformed");
            continue;
        }
        let record: CaptureRecord = match serde_json::from_value(raw) {
            Ok(record) => record,
            Err(err) => {
                out.stats.malformed_records += 1;
                warn!(index, error = %err, "bundle.record_malformed");
                continue;
            }
        };
        process_record(&record, index, &mut out);
    }

    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn process_record(record: &CaptureRecord, index: usize, out: &mut BundleOutput) {
    if record.has_api_errors() {
        out.stats.api_error_records += 1;
        debug!(index, url = %record.url, "bundle.record_api_errors");
        return;
    }

    for candidate in timeline_candidates(&record.response) {
        out.stats.candidates += 1;
        match extract_post(candidate) {
            Ok(post) => {
                out.stats.posts += 1;
                out.posts.push(post);
            }
            Err(rejection) if rejection.is_expected() => {
                out.stats.rejected_expected += 1;
                trace!(index, %rejection, "bundle.candidate_skipped");
            }
            Err(rejection) => {
                out.stats.rejected_malformed += 1;
                debug!(index, %rejection, "bundle.candidate_malformed");
            }
        }
    }
}

/// Post candidates under the search timeline wrapper of one response.
///
/// Entries that match the item/tweet pattern but carry no `tweet_results.result`
/// still yield `None`, so the extractor sees (and counts) them as absent.
pub fn timeline_candidates(response: &Value) -> Vec<Option<&Value>> {
    lookup(response, INSTRUCTIONS_PATH)
        .as_array()
        .unwrap_or_default()
        .iter()
        .filter(|instruction| lookup(instruction, &["type"]).as_str() == Some(ADD_ENTRIES))
        .flat_map(|instruction| lookup(instruction, &["entries"]).as_array().unwrap_or_default())
        .filter_map(|entry| {
            let content = lookup(entry, &["content"]);
            let is_item = content.then(&["entryType"]).as_str() == Some(TIMELINE_ITEM);
            let is_tweet =
                content.then(&["itemContent", "itemType"]).as_str() == Some(TIMELINE_TWEET);
            (is_item && is_tweet)
                .then(|| content.then(&["itemContent", "tweet_results", "result"]).value())
        })
        .collect()
}
