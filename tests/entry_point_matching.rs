//! Matching behavior through the public router API.

mod common;

use common::{app, matched, router_with};
use entrypoint_router::routing::Router;

#[test]
fn test_empty_path_route() {
    let router = router_with(&[""]);

    let m = router.match_entry_point("", "", false);
    assert_eq!(matched(&m), Some(""));
    assert_eq!(m.extra_start_index, 0);
    assert_eq!(m.depth(), 0);

    let m = router.match_entry_point("", "/", false);
    assert_eq!(matched(&m), Some(""));
    assert_eq!(m.extra_start_index, 0);
    assert_eq!(m.depth(), 0);
}

#[test]
fn test_slash_route() {
    let router = router_with(&["/"]);

    let m = router.match_entry_point("", "", false);
    assert_eq!(matched(&m), Some("/"));
    assert_eq!(m.extra_start_index, 0);
    assert_eq!(m.depth(), 1);

    let m = router.match_entry_point("", "/", false);
    assert_eq!(matched(&m), Some("/"));
    assert_eq!(m.extra_start_index, 1);
    assert_eq!(m.depth(), 1);
}

#[test]
fn test_url_params() {
    let router = router_with(&["/users", "/users/${user}"]);

    assert!(!router.match_entry_point("", "", false).is_match());

    let m = router.match_entry_point("", "/users", false);
    assert_eq!(matched(&m), Some("/users"));
    assert_eq!(m.extra_start_index, 6);
    assert_eq!(m.depth(), 1);

    let m = router.match_entry_point("", "/users/", false);
    assert_eq!(matched(&m), Some("/users"));
    assert_eq!(m.extra_start_index, 6);

    let m = router.match_entry_point("", "/users/jos", false);
    assert_eq!(matched(&m), Some("/users/${user}"));
    assert_eq!(m.extra_start_index, 10);
    assert_eq!(m.url_params, vec![("user".to_string(), "jos".to_string())]);
    assert_eq!(m.depth(), 2);

    let m = router.match_entry_point("", "/users/jos/extra", false);
    assert_eq!(matched(&m), Some("/users/${user}"));
    assert_eq!(m.extra_start_index, 10);
    assert_eq!(m.extra_path("/users/jos/extra"), "/extra");
    assert_eq!(m.param("user"), Some("jos"));
}

#[test]
fn test_script_name_without_root_route() {
    let router = router_with(&["/users", "/users/${user}"]);
    let script = "/entrypoint.dll";

    assert!(!router.match_entry_point(script, "", true).is_match());

    let m = router.match_entry_point(script, "/users", true);
    assert_eq!(matched(&m), Some("/users"));
    assert_eq!(m.extra_start_index, 6);

    let m = router.match_entry_point(script, "/users/", true);
    assert_eq!(matched(&m), Some("/users"));
    assert_eq!(m.extra_start_index, 6);

    let m = router.match_entry_point(script, "/users/jos/extra", true);
    assert_eq!(matched(&m), Some("/users/${user}"));
    assert_eq!(m.extra_start_index, 10);
    assert_eq!(m.param("user"), Some("jos"));
}

#[test]
fn test_script_name_with_root_route() {
    let router = router_with(&["/users", "/users/${user}", "/"]);
    let script = "/entrypoint.dll";

    let m = router.match_entry_point(script, "", true);
    assert_eq!(matched(&m), Some("/"));
    assert_eq!(m.extra_start_index, 0);
    assert_eq!(m.depth(), 1);

    let m = router.match_entry_point(script, "/users", true);
    assert_eq!(matched(&m), Some("/users"));
    assert_eq!(m.extra_start_index, 6);

    let m = router.match_entry_point(script, "/users/jos", true);
    assert_eq!(matched(&m), Some("/users/${user}"));
    assert_eq!(m.extra_start_index, 10);
}

#[test]
fn test_backtracking() {
    let router = router_with(&["/users", "/users/${user}", "/users/${user}/posts/all"]);

    let m = router.match_entry_point("", "/users/jos/posts", true);
    assert_eq!(matched(&m), Some("/users/${user}"));
    assert_eq!(m.extra_start_index, 10);
    assert_eq!(m.param("user"), Some("jos"));
    assert_eq!(m.depth(), 2);

    let m = router.match_entry_point("", "/users/jos/posts/all", true);
    assert_eq!(matched(&m), Some("/users/${user}/posts/all"));
    assert_eq!(m.extra_start_index, 20);
    assert_eq!(m.param("user"), Some("jos"));
    assert_eq!(m.depth(), 4);
}

#[test]
fn test_prefer_deepest() {
    let router = router_with(&["/a", "/a/a"]);

    let m = router.match_entry_point("/a", "/a", true);
    assert_eq!(matched(&m), Some("/a/a"));
    assert_eq!(m.extra_start_index, 2);
    assert_eq!(m.depth(), 2);
}

#[test]
fn test_prefer_static_over_placeholder_prefix() {
    let router = router_with(&["/foo/bar", "/${arg}/foo/bar"]);

    let m = router.match_entry_point("/foo", "/foo/bar", true);
    assert_eq!(matched(&m), Some("/foo/bar"));
    assert_eq!(m.extra_start_index, 8);
    assert!(m.url_params.is_empty());
}

#[test]
fn test_prefer_fewer_placeholders_over_depth() {
    let router = router_with(&["/${var1}/${var2}/${var3}", "/b/c"]);

    let m = router.match_entry_point("/a", "/b/c", true);
    assert_eq!(matched(&m), Some("/b/c"));
    assert_eq!(m.extra_start_index, 4);
    assert!(m.url_params.is_empty());
    assert_eq!(m.depth(), 2);
}

#[test]
fn test_equal_rank_prefers_path_only() {
    let router = router_with(&["/${x}"]);

    let m = router.match_entry_point("/s", "/t", false);
    assert_eq!(matched(&m), Some("/${x}"));
    assert_eq!(m.param("x"), Some("t"));
    assert_eq!(m.extra_start_index, 2);
}

#[test]
fn test_match_inside_script_name_is_discarded() {
    let router = router_with(&["/a"]);

    // "/a" only covers part of the script name.
    assert!(!router.match_entry_point("/a/b", "/c", false).is_match());

    // Covering the whole script name is fine; the path becomes extra path.
    let m = router.match_entry_point("/a", "/other", false);
    assert_eq!(matched(&m), Some("/a"));
    assert_eq!(m.extra_start_index, 0);
    assert_eq!(m.extra_path("/other"), "/other");
}

#[test]
fn test_trailing_slash_convention() {
    let router = router_with(&["/docs/"]);

    let m = router.match_entry_point("", "/docs/intro", true);
    assert_eq!(matched(&m), Some("/docs/"));
    assert_eq!(m.extra_path("/docs/intro"), "intro");

    assert!(!router.match_entry_point("", "/docs/intro", false).is_match());
    assert!(!router.match_entry_point("", "/docs", false).is_match());
    // Without the slash the whole query is consumed, so the slash child is never consulted.
    assert!(!router.match_entry_point("", "/docs", true).is_match());
    assert_eq!(matched(&router.match_entry_point("", "/docs/", false)), Some("/docs/"));
    assert_eq!(matched(&router.match_entry_point("", "/docs/", true)), Some("/docs/"));
}

#[test]
fn test_static_segment_preferred_without_backtracking_into_placeholder() {
    let router = router_with(&["/a/${x}/c", "/a/b"]);

    // "b" is taken statically, the placeholder branch is not retried.
    let m = router.match_entry_point("", "/a/b/c", false);
    assert_eq!(matched(&m), Some("/a/b"));
    assert_eq!(m.extra_path("/a/b/c"), "/c");

    let m = router.match_entry_point("", "/a/z/c", false);
    assert_eq!(matched(&m), Some("/a/${x}/c"));
    assert_eq!(m.param("x"), Some("z"));
}

#[test]
fn test_add_match_remove_round_trip() {
    let mut router = Router::new();
    router.add_entry_point(app("/blog/${year}/${slug}"));
    router.add_entry_point(app("/blog"));

    let m = router.match_entry_point("", "/blog/2023/hello", false);
    assert_eq!(m.param("year"), Some("2023"));
    assert_eq!(m.param("slug"), Some("hello"));
    assert_eq!(m.dynamic_segments(), 2);

    router.remove_entry_point("/blog/${year}/${slug}");
    let m = router.match_entry_point("", "/blog/2023/hello", false);
    assert_eq!(matched(&m), Some("/blog"));
    assert!(m.url_params.is_empty());

    router.remove_entry_point("/blog");
    assert!(router.is_empty());
    assert!(router.tree().is_empty());
    assert!(!router.match_entry_point("", "/blog", false).is_match());
}
