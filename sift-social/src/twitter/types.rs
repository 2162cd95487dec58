use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One intercepted request/response pair inside a capture bundle.
///
/// Only `response` is consumed. The request metadata is informational, so a
/// null or mistyped value reads as absent rather than failing the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub method: String,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub post_data: Option<String>,
    /// Parsed response body; may carry `errors` instead of or beside `data`.
    #[serde(default)]
    pub response: Value,
}

fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_owned))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_opt_text(deserializer).map(Option::unwrap_or_default)
}

impl CaptureRecord {
    /// The upstream API flagged this request as (partially) failed.
    pub fn has_api_errors(&self) -> bool {
        self.response
            .as_object()
            .is_some_and(|obj| obj.contains_key("errors"))
    }
}

/// Flattened post record written to the dataset.
///
/// Quoted posts use the same type at reduced depth: `context` is `None` there,
/// so entities, reply fields, and a nested quote never appear below the top level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    #[serde(rename = "tweet_id")]
    pub id: String,
    #[serde(rename = "user_screen_name")]
    pub author_handle: Option<String>,
    #[serde(rename = "user_name")]
    pub author_name: Option<String>,
    #[serde(rename = "user_id")]
    pub author_id: Option<String>,
    pub created_at: Option<String>,
    #[serde(rename = "full_text")]
    pub text: Option<String>,
    pub language: Option<String>,
    pub favorite_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub quote_count: u64,
    /// Raw attribution markup, e.g. `<a href="...">Twitter Web App</a>`.
    pub source: Option<String>,

    #[serde(flatten)]
    pub context: Option<PostContext>,
}

/// Fields only carried by top-level records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostContext {
    pub entities: Entities,
    pub is_reply: bool,
    #[serde(rename = "reply_to_screen_name")]
    pub reply_to_handle: Option<String>,
    #[serde(rename = "reply_to_tweet_id")]
    pub reply_to_id: Option<String>,
    pub is_quote: bool,
    #[serde(rename = "quoted_tweet_details")]
    pub quoted_post: Option<Box<PostRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entities {
    pub hashtags: Vec<String>,
    pub user_mentions: Vec<String>,
    pub urls: Vec<String>,
}

impl PostRecord {
    pub fn quoted_post(&self) -> Option<&PostRecord> {
        self.context.as_ref()?.quoted_post.as_deref()
    }

    pub fn entities(&self) -> Option<&Entities> {
        self.context.as_ref().map(|c| &c.entities)
    }
}
