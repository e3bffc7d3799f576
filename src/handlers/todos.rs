//! Todo routes. Every route depends on the user-id handler, so an invalid or
//! absent credential fails the chain before any store access.

use super::users::date_window_bindings;
use crate::dispatcher::{HandlerEntry, ParamSpec, Payload, TargetType};
use crate::error::DispatchError;
use crate::router::RouteTable;
use crate::store::Store;
use crate::timefmt;
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;

pub(super) fn register(table: &RouteTable, store: &Arc<Store>, user_id: &Arc<HandlerEntry>) {
    let db = Arc::clone(store);
    table.register(
        "/todo",
        &[Method::POST],
        HandlerEntry::new(
            "todo_create",
            vec![
                ParamSpec::Depends(Arc::clone(user_id)),
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
            move |_ctx, args| {
                let user_id = args.u64(0)?;
                let task = args.str(1)?;
                if task.is_empty() {
                    return Err(DispatchError::handler(400, "Task cannot be empty"));
                }
                let id = db.create_todo(user_id, task, args.bool_or(2, false));
                Ok(Payload::Json(json!(id)))
            },
        ),
    );

    let db = Arc::clone(store);
    table.register(
        "/todo",
        &[Method::PUT],
        HandlerEntry::new(
            "todo_put",
            vec![
                ParamSpec::Depends(Arc::clone(user_id)),
                ParamSpec::Query {
                    name: "id",
                    ty: TargetType::UInt,
                    default: None,
                },
                ParamSpec::JsonField {
                    name: "task",
                    ty: TargetType::Str,
                    default: Some(Value::Null),
                },
                ParamSpec::JsonField {
                    name: "is_done",
                    ty: TargetType::Bool,
                    default: Some(Value::Null),
                },
            ],
            move |_ctx, args| {
                let user_id = args.u64(0)?;
                let id = args.u64(1)?;
                let task = args.opt_str(2);
                let is_done = args.opt_bool(3);
                if task.is_none() && is_done.is_none() {
                    return Err(DispatchError::handler(
                        400,
                        "JSON field `task` and `is_done` are not specified",
                    ));
                }
                db.update_todo(user_id, id, task, is_done);
                Ok(Payload::Empty)
            },
        ),
    );

    let db = Arc::clone(store);
    table.register(
        "/todo",
        &[Method::DELETE],
        HandlerEntry::new(
            "todo_delete",
            vec![
                ParamSpec::Depends(Arc::clone(user_id)),
                ParamSpec::Query {
                    name: "id",
                    ty: TargetType::UInt,
                    default: None,
                },
            ],
            move |_ctx, args| {
                db.delete_todo(args.u64(0)?, args.u64(1)?);
                Ok(Payload::Empty)
            },
        ),
    );

    let db = Arc::clone(store);
    table.register(
        "/todos",
        &[Method::GET],
        HandlerEntry::new(
            "todos_get",
            date_window_bindings(ParamSpec::Depends(Arc::clone(user_id))),
            move |_ctx, args| {
                let user_id = args.u64(0)?;
                let min = args.opt_timestamp(1);
                let max = args.opt_timestamp(2);
                let limit = args.u64(3)? as usize;
                let todos: Vec<Value> = db
                    .todos_between(user_id, min, max, limit)
                    .into_iter()
                    .map(|t| {
                        json!({
                            "id": t.id,
                            "task": t.task,
                            "is_done": t.is_done,
                            "created_at": timefmt::format(t.created_at),
                        })
                    })
                    .collect();
                Ok(Payload::Json(Value::Array(todos)))
            },
        ),
    );

    let db = Arc::clone(store);
    table.register(
        "/todos",
        &[Method::DELETE],
        HandlerEntry::new(
            "todos_delete",
            vec![ParamSpec::Depends(Arc::clone(user_id))],
            move |_ctx, args| {
                db.delete_todos(args.u64(0)?);
                Ok(Payload::Empty)
            },
        ),
    );
}
