#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::{json, Value};
use sift_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "sift-tests",
            log_dir: Some(std::env::temp_dir().join("sift-tests")),
            emit_stderr: true,
            format: if std::env::var("SIFT_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        sift_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// A timeline post candidate with the fields the extractor reads.
pub fn tweet(id: &str, handle: &str, created_at: Option<&str>, text: &str) -> Value {
    let mut legacy = json!({
        "full_text": text,
        "lang": "en",
        "favorite_count": 3,
        "retweet_count": 1,
        "reply_count": 0,
        "quote_count": 0,
        "is_quote_status": false,
        "entities": {"hashtags": [], "user_mentions": [], "urls": []}
    });
    if let Some(ts) = created_at {
        legacy["created_at"] = json!(ts);
    }
    json!({
        "__typename": "Tweet",
        "rest_id": id,
        "core": {"user_results": {"result": {
            "__typename": "User",
            "rest_id": "100",
            "legacy": {"screen_name": handle, "name": handle.to_uppercase()}
        }}},
        "legacy": legacy,
        "source": "<a href=\"https://mobile.twitter.com\" rel=\"nofollow\">Twitter Web App</a>"
    })
}

/// One SearchTimeline capture record holding the given post candidates.
pub fn search_capture(results: Vec<Value>) -> Value {
    let mut entries: Vec<Value> = results
        .into_iter()
        .enumerate()
        .map(|(i, result)| {
            json!({
                "entryId": format!("tweet-{i}"),
                "sortIndex": format!("{}", 1000 - i),
                "content": {
                    "entryType": "TimelineTimelineItem",
                    "__typename": "TimelineTimelineItem",
                    "itemContent": {
                        "itemType": "TimelineTweet",
                        "__typename": "TimelineTweet",
                        "tweet_results": {"result": result},
                        "tweetDisplayType": "Tweet"
                    }
                }
            })
        })
        .collect();
    entries.push(json!({
        "entryId": "cursor-bottom-0",
        "content": {"entryType": "TimelineTimelineCursor", "value": "DAADDAAB", "cursorType": "Bottom"}
    }));

    json!({
        "url": "https://x.com/i/api/graphql/abc123/SearchTimeline?variables=%7B%7D",
        "method": "GET",
        "post_data": null,
        "response": {"data": {"search_by_raw_query": {"search_timeline": {"timeline": {
            "instructions": [{"type": "TimelineAddEntries", "entries": entries}]
        }}}}}
    })
}

/// A capture record whose response only carries API errors.
pub fn error_capture() -> Value {
    json!({
        "url": "https://x.com/i/api/graphql/abc123/SearchTimeline",
        "method": "GET",
        "post_data": null,
        "response": {"errors": [{"message": "Rate limit exceeded", "code": 88}]}
    })
}

pub fn write_bundle(dir: &Path, name: &str, records: &[Value]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(records).expect("serialize bundle"))
        .expect("write bundle");
    path
}
