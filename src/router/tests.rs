use super::*;
use crate::dispatcher::{HandlerEntry, Payload};
use http::Method;

fn entry(name: &'static str) -> Arc<HandlerEntry> {
    HandlerEntry::new(name, vec![], |_ctx, _args| Ok(Payload::Empty))
}

#[test]
fn exact_match_wins_over_pattern() {
    let table = RouteTable::new();
    table.register("/todo/{id}", &[Method::GET], entry("pattern"));
    table.register("/todo/latest", &[Method::GET], entry("exact"));

    let hit = table.lookup(&Method::GET, "/todo/latest").unwrap();
    assert_eq!(hit.route.handler.name, "exact");
    assert!(hit.path_params.is_empty());
}

#[test]
fn pattern_binds_named_segments() {
    let table = RouteTable::new();
    table.register("/user/{name}/todo/{id}", &[Method::GET], entry("h"));

    let hit = table.lookup(&Method::GET, "/user/ferris/todo/42").unwrap();
    let params: Vec<(&str, &str)> = hit
        .path_params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_str()))
        .collect();
    assert_eq!(params, vec![("name", "ferris"), ("id", "42")]);
}

#[test]
fn segment_counts_must_agree() {
    let table = RouteTable::new();
    table.register("/todo/{id}", &[Method::GET], entry("h"));

    assert!(table.lookup(&Method::GET, "/todo").is_none());
    assert!(table.lookup(&Method::GET, "/todo/1/extra").is_none());
}

#[test]
fn named_segment_rejects_empty_value() {
    let table = RouteTable::new();
    table.register("/todo/{id}", &[Method::GET], entry("h"));

    assert!(table.lookup(&Method::GET, "/todo/").is_none());
}

#[test]
fn method_must_match() {
    let table = RouteTable::new();
    table.register("/todo", &[Method::GET, Method::POST], entry("h"));

    assert!(table.lookup(&Method::GET, "/todo").is_some());
    assert!(table.lookup(&Method::DELETE, "/todo").is_none());
}

#[test]
fn identical_registration_replaces_handler() {
    let table = RouteTable::new();
    table.register("/a", &[Method::GET], entry("old"));
    table.register("/a", &[Method::GET], entry("new"));

    assert_eq!(table.list().len(), 1);
    let hit = table.lookup(&Method::GET, "/a").unwrap();
    assert_eq!(hit.route.handler.name, "new");
}

#[test]
fn overlapping_methods_move_to_the_new_route() {
    let table = RouteTable::new();
    table.register("/a", &[Method::GET, Method::POST], entry("old"));
    table.register("/a", &[Method::POST], entry("new"));

    assert_eq!(table.lookup(&Method::GET, "/a").unwrap().route.handler.name, "old");
    assert_eq!(table.lookup(&Method::POST, "/a").unwrap().route.handler.name, "new");
}

#[test]
fn remove_drops_every_method_at_the_path() {
    let table = RouteTable::new();
    table.register("/a", &[Method::GET], entry("get"));
    table.register("/a", &[Method::DELETE], entry("delete"));
    table.register("/b", &[Method::GET], entry("b"));

    table.remove("/a");
    assert!(table.lookup(&Method::GET, "/a").is_none());
    assert!(table.lookup(&Method::DELETE, "/a").is_none());
    assert!(table.lookup(&Method::GET, "/b").is_some());

    // Removing again is a no-op.
    table.remove("/a");
}

#[test]
fn list_preserves_insertion_order() {
    let table = RouteTable::new();
    table.register("/one", &[Method::GET], entry("one"));
    table.register("/two", &[Method::GET], entry("two"));
    table.register("/three", &[Method::GET], entry("three"));

    let order: Vec<&str> = table.list().iter().map(|r| r.handler.name).collect();
    assert_eq!(order, vec!["one", "two", "three"]);
}

#[test]
fn literal_brace_path_still_matches_exactly() {
    let table = RouteTable::new();
    table.register("/static/refresh", &[Method::GET], entry("refresh"));

    assert!(table.lookup(&Method::GET, "/static/refresh").is_some());
    assert!(table.lookup(&Method::GET, "/static/other").is_none());
}
