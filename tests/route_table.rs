//! Concurrent access and live reload of the shared route table.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use common::{app, matched};
use entrypoint_router::config::parse_config;
use entrypoint_router::lifecycle::reload::run_reload_loop;
use entrypoint_router::lifecycle::startup::{build_route_table, build_router, StartupError};
use entrypoint_router::routing::{HandlerRegistry, RouteTable, Router};
use entrypoint_router::{RouterConfig, Shutdown};
use tokio::sync::mpsc;

const INITIAL: &str = r#"
    [[entry_points]]
    path = "/"
    handler = "home"

    [[entry_points]]
    path = "/users/${user}"
    handler = "users"
"#;

const RELOADED: &str = r#"
    [[entry_points]]
    path = "/"
    handler = "home"

    [[entry_points]]
    path = "/accounts/${id}"
    handler = "accounts"
"#;

fn build(config: &RouterConfig) -> Result<Router, StartupError> {
    build_router(config, &HandlerRegistry::placeholders(config))
}

#[test]
fn test_readers_never_see_partial_updates() {
    const READERS: usize = 4;

    let table = Arc::new(RouteTable::new(Router::new()));
    table.add_entry_point(app("/"));
    let stop = Arc::new(AtomicBool::new(false));
    // Every reader finishes one lookup before the writer starts.
    let started = Arc::new(Barrier::new(READERS + 1));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let table = table.clone();
            let stop = stop.clone();
            let started = started.clone();
            thread::spawn(move || {
                let mut lookups = 0u64;
                loop {
                    let m = table.match_entry_point("", "/items/42/detail", true);
                    // Either the item route is live or the root catches it.
                    match matched(&m) {
                        Some("/items/${id}") => assert_eq!(m.param("id"), Some("42")),
                        Some("/") => assert!(m.url_params.is_empty()),
                        other => panic!("unexpected match {other:?}"),
                    }
                    lookups += 1;
                    if lookups == 1 {
                        started.wait();
                    }
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                }
                lookups
            })
        })
        .collect();

    started.wait();
    for _ in 0..200 {
        table.add_entry_point(app("/items/${id}"));
        table.remove_entry_point("/items/${id}");
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        assert!(reader.join().unwrap() >= 1);
    }
    assert_eq!(table.len(), 1);
    table.snapshot().tree().check_invariants().unwrap();
}

#[test]
fn test_concurrent_writers_are_serialized() {
    let table = Arc::new(RouteTable::default());

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let table = table.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    table.add_entry_point(app(&format!("/w{w}/{i}")));
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(table.len(), 100);
    let m = table.match_entry_point("", "/w3/24", false);
    assert_eq!(matched(&m), Some("/w3/24"));
}

#[tokio::test]
async fn test_reload_loop_swaps_router() {
    let initial = parse_config(INITIAL).unwrap();
    let table = build_route_table(&initial, &HandlerRegistry::placeholders(&initial)).unwrap();
    assert_eq!(
        table.match_entry_point("", "/users/jos", false).param("user"),
        Some("jos")
    );

    let shutdown = Shutdown::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_reload_loop(table.clone(), build, rx, shutdown.subscribe()));

    tx.send(parse_config(RELOADED).unwrap()).unwrap();

    let mut swapped = false;
    for _ in 0..50 {
        if table.match_entry_point("", "/accounts/7", false).param("id") == Some("7") {
            swapped = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(swapped, "reloaded config was not applied");

    assert!(!table.match_entry_point("", "/users/jos", false).is_match());

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("reload loop did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_reload_loop_keeps_table_on_build_failure() {
    let initial = parse_config(INITIAL).unwrap();
    let table = build_route_table(&initial, &HandlerRegistry::placeholders(&initial)).unwrap();

    // Only knows the initial handlers, so the reloaded config cannot be built.
    let registry = HandlerRegistry::placeholders(&initial);
    let (tx, rx) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(run_reload_loop(
        table.clone(),
        move |config: &RouterConfig| build_router(config, &registry),
        rx,
        shutdown.subscribe(),
    ));

    tx.send(parse_config(RELOADED).unwrap()).unwrap();
    drop(tx);

    // Closing the channel ends the loop once the update is processed.
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("reload loop did not stop")
        .unwrap();

    assert_eq!(table.len(), 2);
    let m = table.match_entry_point("", "/users/jos", false);
    assert_eq!(m.param("user"), Some("jos"));
}
