// Hacker News API types.
// Defines the item graph, feed kinds, and the row projection used by list panes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the fixed story listings the item API publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    #[default]
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl FeedKind {
    /// All feed kinds, in the order they map to the number keys 1..=6.
    pub const ALL: [FeedKind; 6] = [
        FeedKind::Top,
        FeedKind::New,
        FeedKind::Best,
        FeedKind::Ask,
        FeedKind::Show,
        FeedKind::Job,
    ];

    /// Endpoint name on the listing API.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Top => "topstories",
            FeedKind::New => "newstories",
            FeedKind::Best => "beststories",
            FeedKind::Ask => "askstories",
            FeedKind::Show => "showstories",
            FeedKind::Job => "jobstories",
        }
    }

    /// Short display name for the header and the `--feed` flag.
    pub fn label(&self) -> &'static str {
        match self {
            FeedKind::Top => "Top",
            FeedKind::New => "New",
            FeedKind::Best => "Best",
            FeedKind::Ask => "Ask",
            FeedKind::Show => "Show",
            FeedKind::Job => "Jobs",
        }
    }

    /// Parse a `--feed` argument.
    pub fn parse(s: &str) -> Option<FeedKind> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Some(FeedKind::Top),
            "new" => Some(FeedKind::New),
            "best" => Some(FeedKind::Best),
            "ask" => Some(FeedKind::Ask),
            "show" => Some(FeedKind::Show),
            "job" | "jobs" => Some(FeedKind::Job),
            _ => None,
        }
    }
}

/// One node in the remote item graph, discriminated by the wire `type` field.
/// Each kind carries only the fields that exist for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Story(Story),
    Comment(Comment),
    Job(Job),
    Poll(Poll),
    Pollopt(PollOpt),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub descendants: i64,
    #[serde(default)]
    pub kids: Vec<u64>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub kids: Vec<u64>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Poll {
    pub id: u64,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub descendants: i64,
    #[serde(default)]
    pub kids: Vec<u64>,
    #[serde(default)]
    pub parts: Vec<u64>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollOpt {
    pub id: u64,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub poll: Option<u64>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

impl Item {
    pub fn id(&self) -> u64 {
        match self {
            Item::Story(s) => s.id,
            Item::Comment(c) => c.id,
            Item::Job(j) => j.id,
            Item::Poll(p) => p.id,
            Item::Pollopt(o) => o.id,
        }
    }

    /// Ordered child identifiers, empty for kinds without children.
    pub fn kids(&self) -> &[u64] {
        match self {
            Item::Story(s) => &s.kids,
            Item::Comment(c) => &c.kids,
            Item::Poll(p) => &p.kids,
            Item::Job(_) | Item::Pollopt(_) => &[],
        }
    }

    pub fn is_deleted(&self) -> bool {
        match self {
            Item::Story(s) => s.deleted,
            Item::Comment(c) => c.deleted,
            Item::Job(j) => j.deleted,
            Item::Poll(p) => p.deleted,
            Item::Pollopt(o) => o.deleted,
        }
    }

    pub fn is_dead(&self) -> bool {
        match self {
            Item::Story(s) => s.dead,
            Item::Comment(c) => c.dead,
            Item::Job(j) => j.dead,
            Item::Poll(p) => p.dead,
            Item::Pollopt(o) => o.dead,
        }
    }

    /// The single displayability check applied by the thread assembler and
    /// any other consumer of comment items: comment kind, not moderated out.
    pub fn is_displayable_comment(&self) -> bool {
        matches!(self, Item::Comment(c) if !c.deleted && !c.dead)
    }
}

/// Which item kind a list row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Story,
    Job,
    Poll,
}

/// Normalized story projection shown in the feed and search panes.
/// Derived from an item or a search hit; never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayRow {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub comment_count: i64,
    pub time: DateTime<Utc>,
    pub url: Option<String>,
    pub kind: RowKind,
}

impl DisplayRow {
    /// Project an item into a list row. Comment-kind and deleted/dead items
    /// yield `None` and are dropped by callers, not reported as errors.
    pub fn from_item(item: &Item) -> Option<DisplayRow> {
        if item.is_deleted() || item.is_dead() {
            return None;
        }
        match item {
            Item::Story(s) => Some(DisplayRow {
                id: s.id,
                title: plain_text(s.title.as_deref().unwrap_or_default()),
                author: s.by.clone().unwrap_or_default(),
                score: s.score,
                comment_count: s.descendants,
                time: timestamp(s.time),
                url: s.url.clone(),
                kind: RowKind::Story,
            }),
            Item::Job(j) => Some(DisplayRow {
                id: j.id,
                title: plain_text(j.title.as_deref().unwrap_or_default()),
                author: j.by.clone().unwrap_or_default(),
                score: j.score,
                comment_count: 0,
                time: timestamp(j.time),
                url: j.url.clone(),
                kind: RowKind::Job,
            }),
            Item::Poll(p) => Some(DisplayRow {
                id: p.id,
                title: plain_text(p.title.as_deref().unwrap_or_default()),
                author: p.by.clone().unwrap_or_default(),
                score: p.score,
                comment_count: p.descendants,
                time: timestamp(p.time),
                url: None,
                kind: RowKind::Poll,
            }),
            Item::Comment(_) | Item::Pollopt(_) => None,
        }
    }

    /// Project a search hit into a list row. Hits whose string identifier
    /// does not parse as a number are dropped, not errored.
    pub fn from_hit(hit: &SearchHit) -> Option<DisplayRow> {
        let id = hit.object_id.parse::<u64>().ok()?;
        Some(DisplayRow {
            id,
            title: plain_text(hit.title.as_deref().unwrap_or_default()),
            author: hit.author.clone().unwrap_or_default(),
            score: hit.points.unwrap_or(0),
            comment_count: hit.num_comments.unwrap_or(0),
            time: timestamp(hit.created_at_i),
            url: hit.url.clone(),
            kind: RowKind::Story,
        })
    }

    /// Canonical discussion page for this row.
    pub fn discussion_url(&self) -> String {
        format!("https://news.ycombinator.com/item?id={}", self.id)
    }
}

/// One hit from the full-text search API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub num_comments: Option<i64>,
    #[serde(default)]
    pub created_at_i: i64,
}

/// One page of full-text search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
    #[serde(default)]
    pub page: u32,
    #[serde(default, rename = "nbPages")]
    pub total_pages: u32,
}

pub(crate) fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Strip the HTML tags and entities the item API embeds in titles and
/// comment text. `<p>` and `<br>` become line breaks.
pub fn plain_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let seg = &rest[start..];
        match seg.find('>') {
            Some(end) => {
                let tag = seg[1..end].trim();
                if tag.eq_ignore_ascii_case("p") || tag.eq_ignore_ascii_case("br") {
                    out.push('\n');
                }
                rest = &seg[end + 1..];
            }
            None => {
                out.push_str(seg);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_deserializes_by_kind() {
        let json = r#"{
            "id": 8863, "type": "story", "by": "dhouston", "time": 1175714200,
            "kids": [8952, 9224], "score": 111, "descendants": 71,
            "title": "My YC app: Dropbox", "url": "http://www.getdropbox.com/u/2/screencast.html"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        match &item {
            Item::Story(s) => {
                assert_eq!(s.id, 8863);
                assert_eq!(s.kids.len(), 2);
                assert_eq!(s.score, 111);
            }
            other => panic!("expected story, got {:?}", other),
        }
        assert_eq!(item.kids(), &[8952, 9224]);
    }

    #[test]
    fn test_comment_displayability() {
        let json = r#"{"id": 2921983, "type": "comment", "by": "norvig", "time": 1314211127,
                       "text": "Aw shucks", "parent": 2921506, "kids": [2922097]}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.is_displayable_comment());

        let dead = r#"{"id": 1, "type": "comment", "dead": true}"#;
        let item: Item = serde_json::from_str(dead).unwrap();
        assert!(!item.is_displayable_comment());

        let story = r#"{"id": 2, "type": "story", "title": "t"}"#;
        let item: Item = serde_json::from_str(story).unwrap();
        assert!(!item.is_displayable_comment());
    }

    #[test]
    fn test_row_from_item_filters_kinds_and_moderation() {
        let comment: Item =
            serde_json::from_str(r#"{"id": 1, "type": "comment", "text": "hi"}"#).unwrap();
        assert!(DisplayRow::from_item(&comment).is_none());

        let dead: Item =
            serde_json::from_str(r#"{"id": 2, "type": "story", "title": "t", "dead": true}"#)
                .unwrap();
        assert!(DisplayRow::from_item(&dead).is_none());

        let deleted: Item =
            serde_json::from_str(r#"{"id": 3, "type": "job", "deleted": true}"#).unwrap();
        assert!(DisplayRow::from_item(&deleted).is_none());

        let story: Item = serde_json::from_str(
            r#"{"id": 4, "type": "story", "title": "Show HN: thing", "score": 10, "descendants": 3}"#,
        )
        .unwrap();
        let row = DisplayRow::from_item(&story).unwrap();
        assert_eq!(row.id, 4);
        assert_eq!(row.kind, RowKind::Story);
        assert_eq!(row.comment_count, 3);
    }

    #[test]
    fn test_row_from_hit_drops_malformed_id() {
        let good = SearchHit {
            object_id: "12345".to_string(),
            title: Some("hello".to_string()),
            author: Some("pg".to_string()),
            url: None,
            points: Some(42),
            num_comments: Some(7),
            created_at_i: 1175714200,
        };
        let row = DisplayRow::from_hit(&good).unwrap();
        assert_eq!(row.id, 12345);
        assert_eq!(row.score, 42);

        let bad = SearchHit {
            object_id: "not-a-number".to_string(),
            ..good
        };
        assert!(DisplayRow::from_hit(&bad).is_none());
    }

    #[test]
    fn test_plain_text_strips_markup() {
        assert_eq!(plain_text("a &amp; b<p>c &#x27;d&#x27;"), "a & b\nc 'd'");
        assert_eq!(
            plain_text(r#"see <a href="http://x.com">here</a>"#),
            "see here"
        );
        assert_eq!(plain_text("no markup"), "no markup");
    }

    #[test]
    fn test_feed_kind_parse_and_endpoint() {
        assert_eq!(FeedKind::parse("top"), Some(FeedKind::Top));
        assert_eq!(FeedKind::parse("JOBS"), Some(FeedKind::Job));
        assert_eq!(FeedKind::parse("bogus"), None);
        assert_eq!(FeedKind::Show.as_str(), "showstories");
        assert_eq!(FeedKind::ALL.len(), 6);
    }
}
