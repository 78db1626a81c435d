use crate::social::Comment;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Graph API timestamps look like `2024-03-01T10:00:00+0000`
const GRAPH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

pub fn parse_created_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, GRAPH_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// Append-only comment sequences keyed by live video id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThreads {
    threads: HashMap<String, Vec<Comment>>,
}

impl CommentThreads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, video_id: &str) -> Option<&[Comment]> {
        self.threads.get(video_id).map(Vec::as_slice)
    }

    /// Empty the thread but keep the entry
    pub fn reset(&mut self, video_id: &str) {
        self.threads.insert(video_id.to_string(), Vec::new());
    }

    /// Creates the thread on first use, then keeps source order
    pub fn append(&mut self, video_id: &str, comments: Vec<Comment>) {
        self.threads
            .entry(video_id.to_string())
            .or_default()
            .extend(comments);
    }

    /// Unix seconds just past the newest stored comment, so the boundary
    /// comment is not fetched again. `None` means fetch from the start.
    pub fn cursor(&self, video_id: &str) -> Option<i64> {
        let last = self.threads.get(video_id)?.last()?;
        parse_created_time(&last.created_time).map(|t| t.timestamp() + 1)
    }

    /// Threads that have at least one comment
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &[Comment])> {
        self.threads
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(id, items)| (id.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, created_time: &str) -> Comment {
        Comment {
            id: id.to_string(),
            message: format!("message {}", id),
            from: None,
            picture: String::new(),
            created_time: created_time.to_string(),
        }
    }

    #[test]
    fn test_parse_graph_and_rfc3339_times() {
        let graph = parse_created_time("2024-03-01T10:00:00+0000").unwrap();
        let rfc = parse_created_time("2024-03-01T10:00:00Z").unwrap();

        assert_eq!(graph.timestamp(), 1_709_287_200);
        assert_eq!(graph, rfc);
        assert!(parse_created_time("yesterday").is_none());
    }

    #[test]
    fn test_cursor_is_last_timestamp_plus_one() {
        let mut threads = CommentThreads::new();
        assert_eq!(threads.cursor("v1"), None);

        threads.append(
            "v1",
            vec![
                comment("a", "2024-03-01T09:59:00+0000"),
                comment("b", "2024-03-01T10:00:00+0000"),
            ],
        );

        assert_eq!(threads.cursor("v1"), Some(1_709_287_201));
    }

    #[test]
    fn test_unparsable_timestamp_has_no_cursor() {
        let mut threads = CommentThreads::new();
        threads.append("v1", vec![comment("a", "not a time")]);

        assert_eq!(threads.cursor("v1"), None);
    }

    #[test]
    fn test_reset_keeps_empty_entry() {
        let mut threads = CommentThreads::new();
        threads.append("v1", vec![comment("a", "2024-03-01T10:00:00+0000")]);
        threads.reset("v1");

        assert_eq!(threads.get("v1"), Some(&[][..]));
        assert_eq!(threads.len(), 1);
        assert_eq!(threads.non_empty().count(), 0);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut threads = CommentThreads::new();
        threads.append("v1", vec![comment("a", "2024-03-01T10:00:00+0000")]);
        threads.append(
            "v1",
            vec![
                comment("c", "2024-03-01T10:00:05+0000"),
                comment("b", "2024-03-01T10:00:03+0000"),
            ],
        );

        let ids: Vec<_> = threads.get("v1").unwrap().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }
}
