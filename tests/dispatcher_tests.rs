use http::Method;
use serde_json::{json, Value};
use spur::dispatcher::{
    Dispatcher, HandlerEntry, ParamSpec, Payload, RequestContext, RequestParts, TargetType,
};
use spur::error::DispatchError;
use spur::router::RouteTable;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn dispatcher(table: Arc<RouteTable>) -> Dispatcher {
    Dispatcher::new(table)
}

fn get(dispatcher: &Dispatcher, path: &str) -> (u16, Value) {
    let outcome =
        dispatcher.dispatch_synthetic(Method::GET, path, HashMap::new(), HashMap::new(), None);
    let body = serde_json::from_slice(&outcome.body).unwrap_or(Value::Null);
    (outcome.status, body)
}

fn post(dispatcher: &Dispatcher, path: &str, body: &str) -> (u16, Value) {
    let outcome = dispatcher.dispatch_synthetic(
        Method::POST,
        path,
        HashMap::new(),
        HashMap::new(),
        Some(body.to_string()),
    );
    let body = serde_json::from_slice(&outcome.body).unwrap_or(Value::Null);
    (outcome.status, body)
}

#[test]
fn unknown_route_is_404_with_json_error() {
    let table = Arc::new(RouteTable::new());
    let d = dispatcher(table);
    let (status, body) = get(&d, "/nope");
    assert_eq!(status, 404);
    assert_eq!(body["error"], "no route for GET /nope");
}

#[test]
fn path_params_bind_and_coerce() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/echo/{word}",
        &[Method::GET],
        HandlerEntry::new(
            "echo",
            vec![ParamSpec::Path { name: "word" }],
            |_ctx, args| Ok(Payload::Json(json!({ "word": args.str(0)? }))),
        ),
    );
    let d = dispatcher(table);
    let (status, body) = get(&d, "/echo/hello");
    assert_eq!(status, 200);
    assert_eq!(body["word"], "hello");
}

#[test]
fn query_defaults_apply_when_absent() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/limit",
        &[Method::GET],
        HandlerEntry::new(
            "limit",
            vec![ParamSpec::Query {
                name: "limit",
                ty: TargetType::UInt,
                default: Some(json!(10)),
            }],
            |_ctx, args| Ok(Payload::Json(json!(args.u64(0)?))),
        ),
    );
    let d = dispatcher(table);

    assert_eq!(get(&d, "/limit").1, json!(10));
    assert_eq!(get(&d, "/limit?limit=3").1, json!(3));
}

#[test]
fn missing_required_query_param_is_400_naming_it() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/todo",
        &[Method::GET],
        HandlerEntry::new(
            "todo",
            vec![ParamSpec::Query {
                name: "id",
                ty: TargetType::UInt,
                default: None,
            }],
            |_ctx, _args| Ok(Payload::Empty),
        ),
    );
    let d = dispatcher(table);
    let (status, body) = get(&d, "/todo");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "missing parameter `id`");
}

#[test]
fn uncoercible_query_param_is_400_invalid_field() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/todo",
        &[Method::GET],
        HandlerEntry::new(
            "todo",
            vec![ParamSpec::Query {
                name: "id",
                ty: TargetType::UInt,
                default: None,
            }],
            |_ctx, _args| Ok(Payload::Empty),
        ),
    );
    let d = dispatcher(table);
    let (status, body) = get(&d, "/todo?id=banana");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid value for field `id`");
}

#[test]
fn json_field_strictness_and_defaults() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/item",
        &[Method::POST],
        HandlerEntry::new(
            "item",
            vec![
                ParamSpec::JsonField {
                    name: "task",
                    ty: TargetType::Str,
                    default: None,
                },
                ParamSpec::JsonField {
                    name: "is_done",
                    ty: TargetType::Bool,
                    default: Some(json!(false)),
                },
            ],
            |_ctx, args| {
                Ok(Payload::Json(
                    json!({ "task": args.str(0)?, "is_done": args.bool_or(1, false) }),
                ))
            },
        ),
    );
    let d = dispatcher(table);

    let (status, body) = post(&d, "/item", r#"{"task":"write tests"}"#);
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "task": "write tests", "is_done": false }));

    // A JSON number where a string is declared is rejected, not stringified.
    let (status, body) = post(&d, "/item", r#"{"task": 7}"#);
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid value for field `task`");

    let (status, body) = post(&d, "/item", "{}");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "missing parameter `task`");
}

#[test]
fn malformed_body_is_reported_once() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/item",
        &[Method::POST],
        HandlerEntry::new("item", vec![ParamSpec::JsonBody], |_ctx, mut args| {
            Ok(Payload::Json(args.take(0)))
        }),
    );
    let d = dispatcher(table);

    let (status, _) = post(&d, "/item", "{not json");
    assert_eq!(status, 400);

    // An absent body where JsonBody is declared is also a 400.
    let outcome = d.dispatch_synthetic(Method::POST, "/item", HashMap::new(), HashMap::new(), None);
    assert_eq!(outcome.status, 400);
    let body: Value = serde_json::from_slice(&outcome.body).unwrap();
    assert_eq!(body["error"], "malformed request body: request body is required");
}

#[test]
fn depends_chain_resolves_and_failures_propagate() {
    let table = Arc::new(RouteTable::new());
    let inner = HandlerEntry::new(
        "inner",
        vec![ParamSpec::Query {
            name: "who",
            ty: TargetType::Str,
            default: None,
        }],
        |_ctx, args| Ok(Payload::Text(format!("hello {}", args.str(0)?))),
    );
    table.register(
        "/outer",
        &[Method::GET],
        HandlerEntry::new(
            "outer",
            vec![ParamSpec::Depends(inner)],
            |_ctx, args| Ok(Payload::Json(json!({ "greeting": args.str(0)? }))),
        ),
    );
    let d = dispatcher(table);

    let (status, body) = get(&d, "/outer?who=ferris");
    assert_eq!(status, 200);
    assert_eq!(body["greeting"], "hello ferris");

    // The inner handler's missing-param failure becomes the outer failure.
    let (status, body) = get(&d, "/outer");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "missing parameter `who`");
}

#[test]
fn dependency_edges_are_not_memoized() {
    let counter = Arc::new(AtomicUsize::new(0));
    let tallied = {
        let counter = Arc::clone(&counter);
        HandlerEntry::new("tally", vec![], move |_ctx, _args| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Payload::Json(json!(n)))
        })
    };

    let table = Arc::new(RouteTable::new());
    table.register(
        "/twice",
        &[Method::GET],
        HandlerEntry::new(
            "twice",
            vec![
                ParamSpec::Depends(Arc::clone(&tallied)),
                ParamSpec::Depends(tallied),
            ],
            |_ctx, args| Ok(Payload::Json(json!([args.u64(0)?, args.u64(1)?]))),
        ),
    );
    let d = dispatcher(table);

    let (status, body) = get(&d, "/twice");
    assert_eq!(status, 200);
    // Two edges to the same handler run it twice.
    assert_eq!(body, json!([1, 2]));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn handler_can_override_success_status() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/created",
        &[Method::POST],
        HandlerEntry::new("created", vec![ParamSpec::Response], |ctx, _args| {
            ctx.response.set_status(201);
            Ok(Payload::Json(json!({ "id": 1 })))
        }),
    );
    let d = dispatcher(table);
    let (status, _) = post(&d, "/created", "");
    assert_eq!(status, 201);
}

#[test]
fn handler_errors_carry_their_status() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/dup",
        &[Method::POST],
        HandlerEntry::new("dup", vec![], |_ctx, _args| {
            Err(DispatchError::handler(409, "Username already exists"))
        }),
    );
    let d = dispatcher(table);
    let (status, body) = post(&d, "/dup", "");
    assert_eq!(status, 409);
    assert_eq!(body["error"], "Username already exists");
}

#[test]
fn synthetic_and_network_style_contexts_agree() {
    let table = Arc::new(RouteTable::new());
    table.register(
        "/echo",
        &[Method::GET],
        HandlerEntry::new(
            "echo",
            vec![ParamSpec::Query {
                name: "x",
                ty: TargetType::Str,
                default: None,
            }],
            |_ctx, args| Ok(Payload::Json(json!({ "x": args.str(0)? }))),
        ),
    );
    let d = dispatcher(table);

    // Synthetic path, query embedded in the path string.
    let synthetic =
        d.dispatch_synthetic(Method::GET, "/echo?x=42", HashMap::new(), HashMap::new(), None);

    // Network-shaped path: a pre-parsed context, as the transport builds it.
    let mut ctx = RequestContext::new(RequestParts {
        method: Method::GET,
        path: "/echo".to_string(),
        headers: HashMap::new(),
        query: HashMap::from([("x".to_string(), "42".to_string())]),
        body: None,
    });
    let network = d.dispatch(&mut ctx);

    assert_eq!(synthetic.status, network.status);
    assert_eq!(synthetic.body, network.body);
    assert_eq!(synthetic.content_type, network.content_type);
}

#[test]
fn binary_payload_cannot_feed_a_dependency_edge() {
    let table = Arc::new(RouteTable::new());
    let binary = HandlerEntry::new("binary", vec![], |_ctx, _args| {
        Ok(Payload::Bytes {
            content_type: "application/octet-stream",
            body: vec![1, 2, 3],
        })
    });
    table.register(
        "/uses-binary",
        &[Method::GET],
        HandlerEntry::new(
            "uses_binary",
            vec![ParamSpec::Depends(binary)],
            |_ctx, _args| Ok(Payload::Empty),
        ),
    );
    let d = dispatcher(table);
    let (status, _) = get(&d, "/uses-binary");
    assert_eq!(status, 500);
}
