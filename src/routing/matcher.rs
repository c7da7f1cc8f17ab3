//! Entry point matching.
//!
//! # Responsibilities
//! - Descend the segment tree along a query path
//! - Backtrack to the nearest ancestor carrying an entry point
//! - Recover placeholder values and the start of the extra path
//! - Rank competing matches
//!
//! # Design Decisions
//! - Static children win over the dynamic child at every level
//! - Placeholder names come from the matched pattern, never from the tree
//! - No match is a normal result, not an error

use std::cmp::{Ordering, Reverse};
use std::sync::Arc;

use crate::routing::entry_point::{split_segments, EntryPoint, PatternSegment};
use crate::routing::segment::{NodeId, SegmentTree};

/// Result of matching a request path against the registered entry points.
#[derive(Debug, Clone, Default)]
pub struct EntryPointMatch {
    /// The matched entry point, if any.
    pub entry_point: Option<Arc<EntryPoint>>,
    /// Placeholder name/value pairs, in pattern order.
    pub url_params: Vec<(String, String)>,
    /// Byte offset in the queried path where the extra path starts.
    pub extra_start_index: usize,
}

/// Sort key for matches: greater is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchRank {
    present: bool,
    dynamic_segments: Reverse<usize>,
    depth: usize,
}

impl EntryPointMatch {
    /// A match without placeholders.
    pub fn new(entry_point: Arc<EntryPoint>, extra_start_index: usize) -> Self {
        Self {
            entry_point: Some(entry_point),
            url_params: Vec::new(),
            extra_start_index,
        }
    }

    /// The empty result.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.entry_point.is_some()
    }

    /// Number of path segments covered by the matched pattern.
    pub fn depth(&self) -> usize {
        self.entry_point.as_ref().map_or(0, |ep| ep.depth())
    }

    /// Number of placeholder segments the match went through.
    pub fn dynamic_segments(&self) -> usize {
        self.url_params.len()
    }

    /// Value captured for a placeholder.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.url_params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The part of `path` beyond the matched pattern.
    pub fn extra_path<'a>(&self, path: &'a str) -> &'a str {
        path.get(self.extra_start_index..).unwrap_or("")
    }

    /// Ranking: a match beats no match, fewer placeholders beat more,
    /// then the deeper pattern wins.
    pub fn rank(&self) -> MatchRank {
        MatchRank {
            present: self.is_match(),
            dynamic_segments: Reverse(self.dynamic_segments()),
            depth: self.depth(),
        }
    }

    /// Compare two matches by rank.
    pub fn compare(&self, other: &EntryPointMatch) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// Match `query` against the tree.
///
/// `query` is the full path to route, e.g. script name and path info joined.
pub fn match_path(tree: &SegmentTree, query: &str, match_after_slash: bool) -> EntryPointMatch {
    let mut match_after_slash = match_after_slash;
    let mut current = NodeId::ROOT;
    let mut dynamic = false;
    let mut consumed_all = true;

    if query.is_empty() {
        match_after_slash = true;
    } else if !query.starts_with('/') {
        tracing::debug!(query = %query, "Path is not absolute, no entry point can match");
        return EntryPointMatch::none();
    }

    for (_, segment) in split_segments(query) {
        let next = match tree.static_child(current, segment) {
            Some(child) => Some(child),
            None if !segment.is_empty() => {
                let child = tree.dynamic_child(current);
                dynamic |= child.is_some();
                child
            }
            None => None,
        };

        match next {
            Some(child) => current = child,
            None => {
                consumed_all = false;
                break;
            }
        }
    }

    let check_trailing_slash = match_after_slash && (query.is_empty() || !consumed_all);
    let found = backtrack(tree, current, check_trailing_slash);

    let Some(ep) = found else {
        tracing::debug!(query = %query, "No entry point match found");
        return EntryPointMatch::none();
    };

    if dynamic {
        let result = capture_params(ep, query);
        tracing::debug!(
            query = %query,
            entry_point = %result.entry_point.as_ref().map_or("", |ep| ep.path()),
            params = result.url_params.len(),
            "Matched dynamic entry point"
        );
        result
    } else {
        tracing::debug!(query = %query, entry_point = %ep.path(), "Matched entry point");
        let extra_start_index = if query.is_empty() { 0 } else { ep.path().len() };
        EntryPointMatch::new(ep, extra_start_index)
    }
}

/// Walk up from `from` to the nearest node carrying an entry point.
///
/// With `check_trailing_slash`, a node whose first static child is the
/// trailing-slash child resolves to that child's entry point, so that
/// `/head/tail` can match `/head/`.
fn backtrack(
    tree: &SegmentTree,
    from: NodeId,
    check_trailing_slash: bool,
) -> Option<Arc<EntryPoint>> {
    let mut current = Some(from);
    while let Some(id) = current {
        if check_trailing_slash {
            let slash_ep = tree
                .first_static_child(id)
                .filter(|child| tree.text(*child).is_empty())
                .and_then(|child| tree.entry_point(child));
            if let Some(ep) = slash_ep {
                return Some(ep.clone());
            }
        }
        if let Some(ep) = tree.entry_point(id) {
            return Some(ep.clone());
        }
        current = tree.parent(id);
    }
    None
}

/// Build the result for a match that went through a placeholder.
fn capture_params(ep: Arc<EntryPoint>, query: &str) -> EntryPointMatch {
    let (url_params, extra_start_index) = pair_segments(&ep, query);
    EntryPointMatch {
        entry_point: Some(ep),
        url_params,
        extra_start_index,
    }
}

/// Pair the query segments with the pattern to extract placeholder values
/// and the start of the extra path.
fn pair_segments(ep: &EntryPoint, query: &str) -> (Vec<(String, String)>, usize) {
    let mut url_params = Vec::new();
    let mut pattern = ep.segments();

    for (offset, value) in split_segments(query) {
        let Some(segment) = pattern.next() else {
            // Points at the '/' preceding the first unpaired segment.
            return (url_params, offset - 1);
        };
        if let PatternSegment::Placeholder(name) = segment {
            url_params.push((name.to_string(), value.to_string()));
        }
    }
    (url_params, query.len())
}
