//! Turn one `tweet_results.result` candidate into a [`PostRecord`].
//!
//! The candidate shape is the GraphQL timeline representation: scalar fields live
//! under `legacy`, the author under `core.user_results.result`, and a quoted post
//! under `quoted_status_result.result`. Any of these may be missing; only the
//! type tag, `legacy`, the author result, and `rest_id` are load-bearing.
use serde_json::Value;
use thiserror::Error;

use crate::twitter::path::{lookup, Resolved};
use crate::twitter::types::{Entities, PostContext, PostRecord};

/// `__typename` carried by real posts. Tombstones and visibility wrappers differ.
pub const POST_TYPENAME: &str = "Tweet";

/// Deepest level that is extracted. Depth 0 is the timeline post, depth 1 its quote.
pub const MAX_QUOTE_DEPTH: usize = 1;

/// Why a candidate did not yield a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no candidate")]
    Absent,
    #[error("not a post (typename {typename:?})")]
    NotAPost { typename: Option<String> },
    #[error("legacy field container missing")]
    MissingLegacy,
    #[error("author result missing")]
    MissingAuthor,
    #[error("post identifier missing")]
    MissingId,
    #[error("unexpected shape for {what}")]
    Malformed { what: &'static str },
}

impl Rejection {
    /// Absence the timeline routinely produces, as opposed to a shape we did not expect.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Rejection::Malformed { .. })
    }
}

/// Extract a top-level post record from a candidate.
///
/// ```
/// use serde_json::json;
/// use sift_social::twitter::extract::{extract_post, Rejection};
///
/// let tombstone = json!({"__typename": "TweetTombstone"});
/// assert!(matches!(extract_post(Some(&tombstone)), Err(Rejection::NotAPost { .. })));
/// ```
pub fn extract_post(candidate: Option<&Value>) -> Result<PostRecord, Rejection> {
    extract_at_depth(candidate, 0)
}

fn extract_at_depth(candidate: Option<&Value>, depth: usize) -> Result<PostRecord, Rejection> {
    let candidate = candidate
        .filter(|v| !v.is_null())
        .ok_or(Rejection::Absent)?;
    if !candidate.is_object() {
        return Err(Rejection::Malformed { what: "candidate" });
    }

    match lookup(candidate, &["__typename"]).as_str() {
        Some(POST_TYPENAME) => {}
        other => {
            return Err(Rejection::NotAPost {
                typename: other.map(str::to_owned),
            });
        }
    }

    let legacy = required_object(
        lookup(candidate, &["legacy"]),
        Rejection::MissingLegacy,
        "legacy",
    )?;
    let author = required_object(
        lookup(candidate, &["core", "user_results", "result"]),
        Rejection::MissingAuthor,
        "author result",
    )?;
    let author_legacy = lookup(author, &["legacy"]);
    let author_core = lookup(author, &["core"]);

    let author_handle = author_legacy
        .then(&["screen_name"])
        .as_str()
        .or_else(|| author_core.then(&["screen_name"]).as_str())
        .map(str::to_owned);
    let author_name = author_legacy
        .then(&["name"])
        .as_str()
        .or_else(|| author_core.then(&["name"]).as_str())
        .map(str::to_owned);
    let author_id = author_legacy
        .then(&["id_str"])
        .as_ident()
        .or_else(|| lookup(author, &["rest_id"]).as_ident());

    // Long-form posts keep a truncated `full_text` and the complete body in `note_tweet`.
    let text = lookup(
        candidate,
        &["note_tweet", "note_tweet_results", "result", "text"],
    )
    .as_str()
    .or_else(|| lookup(legacy, &["full_text"]).as_str())
    .map(str::to_owned);

    let context = if depth == 0 {
        Some(extract_context(candidate, legacy, depth))
    } else {
        None
    };

    let id = lookup(candidate, &["rest_id"])
        .as_ident()
        .ok_or(Rejection::MissingId)?;

    Ok(PostRecord {
        id,
        author_handle,
        author_name,
        author_id,
        created_at: owned_str(lookup(legacy, &["created_at"])),
        text,
        language: owned_str(lookup(legacy, &["lang"])),
        favorite_count: count(legacy, "favorite_count"),
        retweet_count: count(legacy, "retweet_count"),
        reply_count: count(legacy, "reply_count"),
        quote_count: count(legacy, "quote_count"),
        source: owned_str(lookup(candidate, &["source"])),
        context,
    })
}

fn extract_context(candidate: &Value, legacy: &Value, depth: usize) -> PostContext {
    let entities = lookup(legacy, &["entities"]);

    let reply_target = lookup(legacy, &["in_reply_to_status_id_str"]);
    let is_reply = reply_target.is_truthy();
    let (reply_to_handle, reply_to_id) = if is_reply {
        (
            owned_str(lookup(legacy, &["in_reply_to_screen_name"])),
            reply_target.as_ident(),
        )
    } else {
        (None, None)
    };

    // The flag and the nested result are checked independently; either missing means no quote.
    let is_quote = lookup(legacy, &["is_quote_status"])
        .as_bool()
        .unwrap_or(false);
    let quoted_post = if is_quote && depth < MAX_QUOTE_DEPTH {
        extract_at_depth(
            lookup(candidate, &["quoted_status_result", "result"]).value(),
            depth + 1,
        )
        .ok()
        .map(Box::new)
    } else {
        None
    };

    PostContext {
        entities: Entities {
            hashtags: entity_texts(entities, "hashtags", "text"),
            user_mentions: entity_texts(entities, "user_mentions", "screen_name"),
            urls: entity_texts(entities, "urls", "expanded_url"),
        },
        is_reply,
        reply_to_handle,
        reply_to_id,
        is_quote,
        quoted_post,
    }
}

/// An empty object is as useless as a missing one; a non-object is malformed.
fn required_object<'a>(
    resolved: Resolved<'a>,
    missing: Rejection,
    what: &'static str,
) -> Result<&'a Value, Rejection> {
    match resolved.value() {
        None => Err(missing),
        Some(Value::Object(map)) if map.is_empty() => Err(missing),
        Some(v @ Value::Object(_)) => Ok(v),
        Some(_) => Err(Rejection::Malformed { what }),
    }
}

fn owned_str(resolved: Resolved<'_>) -> Option<String> {
    resolved.as_str().map(str::to_owned)
}

fn count(legacy: &Value, key: &str) -> u64 {
    lookup(legacy, &[key]).as_count().unwrap_or(0)
}

fn entity_texts(entities: Resolved<'_>, list: &str, field: &str) -> Vec<String> {
    entities
        .then(&[list])
        .as_array()
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| lookup(entry, &[field]).as_str())
        .map(str::to_owned)
        .collect()
}
