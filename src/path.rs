//! Path parsing and pattern matching.
//!
//! Grounded in `original_source/http/path.h`'s `HTTP_PathComponents` /
//! `HTTP_PathPattern` / `http_pc_match_patterns`, translated from a
//! `malloc`'d singly-linked list into an owned `Vec<PathSegment>` — Rust's
//! ownership model makes the Vec strictly simpler here, with no change in
//! the matching semantics.

/// The literal token that marks a wildcard slot in a pattern.
pub const WILDCARD: &str = "*";

/// One slash-separated segment of a path or pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// The segment text (empty for the lone segment of root `/`).
    pub value: String,
    /// Ordinal of this wildcard among the pattern's wildcards, or `-1` if
    /// this segment is not (or, for a path, was not resolved to) a
    /// wildcard slot.
    pub wildcard_index: isize,
}

/// An ordered sequence of path segments, as produced by parsing either a
/// concrete path or (before `wildcard_index` resolution) a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathComponents {
    pub segments: Vec<PathSegment>,
}

impl PathComponents {
    /// Parses `path`, stripping a single leading `/` and splitting on `/`.
    ///
    /// The root path `/` yields exactly one empty-string segment; any other
    /// empty path yields zero segments.
    pub fn parse(path: &str) -> PathComponents {
        let is_root = path == "/" || path.is_empty();
        let trimmed = path.strip_prefix('/').unwrap_or(path);

        if trimmed.is_empty() {
            return PathComponents {
                segments: if is_root {
                    vec![PathSegment {
                        value: String::new(),
                        wildcard_index: -1,
                    }]
                } else {
                    Vec::new()
                },
            };
        }

        let segments = trimmed
            .split('/')
            .map(|value| PathSegment {
                value: value.to_string(),
                wildcard_index: -1,
            })
            .collect();
        PathComponents { segments }
    }

    /// Number of path variables whose resolved wildcard ordinal equals
    /// `pos`, collected in order. Empty if the matched pattern has no
    /// wildcard at that ordinal (or the path hasn't been matched yet).
    pub fn pathvar(&self, pos: usize) -> PathComponents {
        let segments = self
            .segments
            .iter()
            .filter(|s| s.wildcard_index == pos as isize)
            .cloned()
            .collect();
        PathComponents { segments }
    }
}

/// A registered route pattern: path components plus wildcard/hard counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    pub components: PathComponents,
    /// Number of segments equal to [`WILDCARD`].
    pub wildcard_count: usize,
    /// Number of segments that are not wildcards.
    pub hard_count: usize,
}

impl PathPattern {
    /// Parses a pattern string such as `/a/*/c`, assigning each wildcard
    /// segment its ordinal among the pattern's wildcards.
    pub fn parse(pattern: &str) -> PathPattern {
        let mut components = PathComponents::parse(pattern);
        let mut wildcard_count = 0;
        let mut hard_count = 0;
        for segment in &mut components.segments {
            if segment.value == WILDCARD {
                segment.wildcard_index = wildcard_count as isize;
                wildcard_count += 1;
            } else {
                hard_count += 1;
            }
        }
        PathPattern {
            components,
            wildcard_count,
            hard_count,
        }
    }

    fn len(&self) -> usize {
        self.wildcard_count + self.hard_count
    }

    /// Matches this pattern against `path`, annotating each path segment's
    /// `wildcard_index` in place on success.
    ///
    /// Implements the greedy-but-nondeterministic wildcard rule: a wildcard
    /// slot tries "absorb exactly one segment" before "absorb this segment
    /// and keep going", so `/a/*/c` matches both `/a/x/c` and `/a/x/y/c`.
    pub fn matches(&self, path: &mut PathComponents) -> bool {
        match_segments(&self.components.segments, &mut path.segments)
    }
}

fn match_segments(pattern: &[PathSegment], path: &mut [PathSegment]) -> bool {
    match (pattern.first(), path.first()) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(p), Some(_)) => {
            if p.wildcard_index < 0 {
                if p.value == path[0].value {
                    path[0].wildcard_index = -1;
                    if match_segments(&pattern[1..], &mut path[1..]) {
                        return true;
                    }
                }
                false
            } else {
                let consume_one = match_segments(&pattern[1..], &mut path[1..]);
                let absorb_more = !consume_one && match_segments(pattern, &mut path[1..]);
                if consume_one || absorb_more {
                    path[0].wildcard_index = p.wildcard_index;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Selects the best-matching pattern's index among `patterns` for `path`.
///
/// The winner is the matching pattern with the most components; ties break
/// toward fewer wildcards; further ties break toward the earlier-registered
/// pattern. Returns `None` if no pattern matches.
pub fn match_patterns(patterns: &[PathPattern], path: &mut PathComponents) -> Option<usize> {
    let mut best: Option<usize> = None;

    for (i, pattern) in patterns.iter().enumerate() {
        let mut candidate_path = path.clone();
        if !pattern.matches(&mut candidate_path) {
            continue;
        }

        let winner = match best {
            None => true,
            Some(b) => {
                let b_pattern = &patterns[b];
                pattern.len() > b_pattern.len()
                    || (pattern.len() == b_pattern.len() && pattern.wildcard_count < b_pattern.wildcard_count)
            }
        };

        if winner {
            best = Some(i);
            *path = candidate_path;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_is_one_empty_segment() {
        let pc = PathComponents::parse("/");
        assert_eq!(pc.segments.len(), 1);
        assert_eq!(pc.segments[0].value, "");
    }

    #[test]
    fn empty_path_is_no_segments() {
        let pc = PathComponents::parse("");
        assert!(pc.segments.is_empty());
    }

    #[test]
    fn simple_path_splits_on_slash() {
        let pc = PathComponents::parse("/a/b/c");
        let values: Vec<_> = pc.segments.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn wildcard_absorbs_one_segment() {
        let pattern = PathPattern::parse("/a/*/c");
        let mut path = PathComponents::parse("/a/x/c");
        assert!(pattern.matches(&mut path));
    }

    #[test]
    fn wildcard_absorbs_multiple_segments() {
        let pattern = PathPattern::parse("/a/*/c");
        let mut path = PathComponents::parse("/a/x/y/c");
        assert!(pattern.matches(&mut path));
    }

    #[test]
    fn non_matching_pattern_fails() {
        let pattern = PathPattern::parse("/a/*/c/d");
        let mut path = PathComponents::parse("/a/x/c");
        assert!(!pattern.matches(&mut path));
    }

    #[test]
    fn more_specific_pattern_wins_on_equal_length() {
        let patterns = vec![PathPattern::parse("/a/*"), PathPattern::parse("/a/*/c")];
        let mut path = PathComponents::parse("/a/b/c");
        let best = match_patterns(&patterns, &mut path).unwrap();
        assert_eq!(best, 1);
    }

    #[test]
    fn only_matching_pattern_wins_even_if_shorter() {
        let patterns = vec![PathPattern::parse("/a/*"), PathPattern::parse("/a/*/c/d")];
        let mut path = PathComponents::parse("/a/b/c");
        let best = match_patterns(&patterns, &mut path).unwrap();
        assert_eq!(best, 0);
    }

    #[test]
    fn no_match_returns_none() {
        let patterns = vec![PathPattern::parse("/x"), PathPattern::parse("/y/z")];
        let mut path = PathComponents::parse("/a/b/c");
        assert_eq!(match_patterns(&patterns, &mut path), None);
    }

    #[test]
    fn pathvar_collects_wildcard_segments_in_order() {
        let pattern = PathPattern::parse("/users/*/posts/*");
        let mut path = PathComponents::parse("/users/42/posts/7/8");
        assert!(pattern.matches(&mut path));
        let first = path.pathvar(0);
        assert_eq!(first.segments[0].value, "42");
        let second = path.pathvar(1);
        let values: Vec<_> = second.segments.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["7", "8"]);
    }
}
