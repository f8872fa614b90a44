//! Hierarchical topic paths: canonicalization and sub-path expansion.

/// An ordered sequence of non-empty path segments.
///
/// Canonicalization drops empty segments and strips any embedded `/`
/// character out of a segment (rather than splitting on it) before the
/// path is joined.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Topic {
    segments: Vec<String>,
}

impl Topic {
    /// Builds a `Topic` from raw, possibly-dirty segments (e.g. as
    /// received over the gRPC subscription API's repeated `Path`
    /// segments field). A `/` embedded inside a segment is removed, not
    /// treated as a separator.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned = segments
            .into_iter()
            .map(|s| s.as_ref().replace('/', ""))
            .filter(|seg| !seg.is_empty())
            .collect();
        Topic { segments: cleaned }
    }

    /// Parses a single `/`-joined path string, e.g. `"a/b/c"`.
    pub fn parse(raw: &str) -> Self {
        Topic::from_segments(raw.split('/'))
    }

    /// True if this topic has no segments and therefore no valid
    /// canonical path (invalid for subscription).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The canonical `/`-joined string form of this topic.
    pub fn canonical(&self) -> String {
        self.segments.join("/")
    }

    /// The left-to-right non-empty prefixes of this topic's canonical
    /// path: for `a/b/c`, `["a", "a/b", "a/b/c"]`.
    ///
    /// A publish to `a/b/c` is routed to subscribers of any of these
    /// prefixes ("sub-path expansion").
    pub fn sub_paths(&self) -> Vec<String> {
        let mut prefixes = Vec::with_capacity(self.segments.len());
        for i in 1..=self.segments.len() {
            prefixes.push(self.segments[..i].join("/"));
        }
        prefixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_embedded_slashes_and_drops_empty_segments() {
        let topic = Topic::from_segments(["root", "", "a/b", "leaf"]);
        assert_eq!(topic.canonical(), "root/ab/leaf");
    }

    #[test]
    fn parse_splits_on_slash() {
        let topic = Topic::parse("root/node/leaf");
        assert_eq!(topic.segments(), &["root", "node", "leaf"]);
    }

    #[test]
    fn empty_path_is_invalid() {
        assert!(Topic::parse("").is_empty());
        assert!(Topic::from_segments(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn sub_paths_are_left_to_right_prefixes() {
        let topic = Topic::parse("a/b/c");
        assert_eq!(topic.sub_paths(), vec!["a", "a/b", "a/b/c"]);
    }

    #[test]
    fn single_segment_sub_paths_is_itself() {
        let topic = Topic::parse("a");
        assert_eq!(topic.sub_paths(), vec!["a"]);
    }
}
