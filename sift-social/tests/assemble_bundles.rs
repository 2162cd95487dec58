mod common;

use std::fs;

use common::{error_capture, init_test_tracing, search_capture, tweet, write_bundle};
use serde_json::{json, Value};
use sift_social::twitter::{write_dataset, BundleError, DatasetAssembler};
use tempfile::TempDir;

const DEC_2020: &str = "Tue Dec 22 19:54:02 +0000 2020";
const JAN_2021: &str = "Wed Jan 01 00:00:00 +0000 2021";

#[test]
fn duplicate_ids_across_bundles_keep_first_seen() {
    init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let a = write_bundle(
        tmp.path(),
        "alice_2020-11-01_to_2021-01-01.json",
        &[search_capture(vec![tweet("12345", "alice", Some(DEC_2020), "first copy")])],
    );
    let b = write_bundle(
        tmp.path(),
        "alice_2021-01-01_to_2021-03-01.json",
        &[search_capture(vec![tweet("12345", "alice", Some(DEC_2020), "second copy")])],
    );

    let ds = DatasetAssembler::assemble([&a, &b]);

    let matching: Vec<_> = ds.posts.iter().filter(|p| p.id == "12345").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].text.as_deref(), Some("first copy"));
    assert_eq!(ds.duplicates_skipped(), 1);
    assert!(ds.duplicates[0].diverged);
    assert_eq!(ds.duplicates[0].source.as_deref(), Some(b.as_path()));
}

#[test]
fn output_is_newest_first_with_missing_dates_last() {
    init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let bundle = write_bundle(
        tmp.path(),
        "bundle.json",
        &[search_capture(vec![
            tweet("1", "alice", Some(DEC_2020), "december"),
            tweet("2", "alice", Some(JAN_2021), "january"),
            tweet("3", "alice", None, "undated"),
        ])],
    );

    let ds = DatasetAssembler::assemble([bundle]);
    let ids: Vec<_> = ds.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["2", "1", "3"]);
}

#[test]
fn error_records_and_broken_files_do_not_stop_the_run() {
    init_test_tracing();
    let tmp = TempDir::new().unwrap();

    let errors_only = write_bundle(tmp.path(), "a_errors.json", &[error_capture()]);
    let broken = tmp.path().join("b_broken.json");
    fs::write(&broken, b"[{\"url\": \"truncated").unwrap();
    let missing = tmp.path().join("c_missing.json");
    let good = write_bundle(
        tmp.path(),
        "d_good.json",
        &[
            error_capture(),
            search_capture(vec![tweet("42", "bob", Some(JAN_2021), "still here")]),
        ],
    );

    let ds = DatasetAssembler::assemble([&errors_only, &broken, &missing, &good]);

    assert_eq!(ds.files_processed, 2);
    assert_eq!(ds.failures.len(), 2);
    assert!(matches!(&ds.failures[0], BundleError::Parse { path, .. } if path == &broken));
    assert!(matches!(&ds.failures[1], BundleError::Read { path, .. } if path == &missing));
    assert_eq!(ds.posts.len(), 1);
    assert_eq!(ds.posts[0].id, "42");
}

#[test]
fn non_array_bundle_is_a_parse_failure() {
    init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("object.json");
    fs::write(&path, serde_json::to_vec(&search_capture(vec![])).unwrap()).unwrap();

    let ds = DatasetAssembler::assemble([&path]);
    assert!(ds.posts.is_empty());
    assert!(matches!(ds.failures.as_slice(), [BundleError::Parse { .. }]));
}

#[test]
fn end_to_end_output_preserves_unicode_and_shape() {
    init_test_tracing();
    let tmp = TempDir::new().unwrap();

    let mut quoting = tweet("10", "alice", Some(JAN_2021), "看这个 👀 #rust");
    quoting["legacy"]["is_quote_status"] = json!(true);
    quoting["legacy"]["entities"]["hashtags"] = json!([{"text": "rust", "indices": [7, 12]}]);
    quoting["quoted_status_result"] = json!({"result": tweet("9", "bob", Some(DEC_2020), "Ünïcödé")});

    let mut reply = tweet("11", "carol", Some(DEC_2020), "@alice agreed");
    reply["legacy"]["in_reply_to_status_id_str"] = json!("10");
    reply["legacy"]["in_reply_to_screen_name"] = json!("alice");
    reply["legacy"]["entities"]["user_mentions"] = json!([{"screen_name": "alice"}]);

    let bundle = write_bundle(
        tmp.path(),
        "mixed.json",
        &[search_capture(vec![
            quoting,
            json!({"__typename": "TweetTombstone", "tombstone": {}}),
            reply,
        ])],
    );

    let ds = DatasetAssembler::assemble([bundle]);
    let out = tmp.path().join("out").join("data_combined_tweets.json");
    write_dataset(&out, &ds.posts).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("看这个 👀 #rust"));
    assert!(text.contains("Ünïcödé"));

    let written: Value = serde_json::from_str(&text).unwrap();
    let rows = written.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["tweet_id"], "10");
    assert_eq!(rows[0]["is_quote"], true);
    assert_eq!(rows[0]["entities"]["hashtags"], json!(["rust"]));
    assert_eq!(rows[0]["quoted_tweet_details"]["tweet_id"], "9");
    assert_eq!(rows[0]["quoted_tweet_details"]["user_screen_name"], "bob");
    assert!(rows[0]["quoted_tweet_details"].get("quoted_tweet_details").is_none());
    assert_eq!(rows[0]["is_reply"], false);
    assert!(rows[0]["reply_to_tweet_id"].is_null());

    assert_eq!(rows[1]["tweet_id"], "11");
    assert_eq!(rows[1]["is_reply"], true);
    assert_eq!(rows[1]["reply_to_screen_name"], "alice");
    assert_eq!(rows[1]["reply_to_tweet_id"], "10");
    assert_eq!(rows[1]["entities"]["user_mentions"], json!(["alice"]));
    assert_eq!(rows[1]["entities"]["urls"], json!([]));
    assert!(rows[1]["quoted_tweet_details"].is_null());
}
