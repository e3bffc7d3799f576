//! User account routes: token issuance, signup, login, verification, listing.

use crate::dispatcher::{HandlerEntry, ParamSpec, Payload, TargetType};
use crate::error::DispatchError;
use crate::router::RouteTable;
use crate::security::{bearer_token, AuthError, TokenAuthority, AUTH_HEADER};
use crate::store::{password_hash, Store};
use crate::timefmt;
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The posted credential form, also the shape of the token claims.
#[derive(Debug, Clone, Deserialize)]
pub struct UserForm {
    pub username: String,
    pub password: String,
}

impl UserForm {
    fn from_body(body: Value) -> Result<Self, DispatchError> {
        serde_json::from_value(body).map_err(|e| DispatchError::MalformedBody(e.to_string()))
    }

    fn claims(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
        ])
    }
}

fn issue_token(
    authority: &TokenAuthority,
    form: &UserForm,
) -> Result<Payload, DispatchError> {
    let token = authority
        .issue(form.claims())
        .map_err(|e| DispatchError::handler(500, format!("token issuance failed: {e}")))?;
    Ok(Payload::Text(token))
}

/// `GET /user/verify` and the dependency edge every protected route rides on.
/// Yields the username carried in the bearer credential.
pub(super) fn verify_entry(authority: Arc<TokenAuthority>) -> Arc<HandlerEntry> {
    HandlerEntry::new("user_verify", vec![ParamSpec::Request], move |ctx, _args| {
        let token = bearer_token(ctx.header(AUTH_HEADER))?;
        let claims = authority.verify(token).map_err(AuthError::Verify)?;
        let username = claims.get("username").cloned().ok_or_else(|| {
            DispatchError::handler(500, "Fail to deserialize JWT payload into UserForm")
        })?;
        Ok(Payload::Text(username))
    })
}

/// Depends on verify; yields the numeric user id.
pub(super) fn user_id_entry(store: Arc<Store>, verify: Arc<HandlerEntry>) -> Arc<HandlerEntry> {
    HandlerEntry::new(
        "user_get_id",
        vec![ParamSpec::Depends(verify)],
        move |_ctx, args| {
            let username = args.str(0)?;
            let user = store
                .find_user(username)
                .ok_or_else(|| DispatchError::handler(400, "User not found in the database"))?;
            Ok(Payload::Json(json!(user.id)))
        },
    )
}

/// Shared query contract for the listing routes: optional `date-min` /
/// `date-max` timestamps and a `limit` defaulting to 10.
pub(super) fn date_window_bindings(first: ParamSpec) -> Vec<ParamSpec> {
    vec![
        first,
        ParamSpec::Query {
            name: "date-min",
            ty: TargetType::Timestamp,
            default: Some(Value::Null),
        },
        ParamSpec::Query {
            name: "date-max",
            ty: TargetType::Timestamp,
            default: Some(Value::Null),
        },
        ParamSpec::Query {
            name: "limit",
            ty: TargetType::UInt,
            default: Some(json!(10)),
        },
    ]
}

pub(super) fn register(
    table: &RouteTable,
    store: &Arc<Store>,
    authority: &Arc<TokenAuthority>,
    verify: &Arc<HandlerEntry>,
    user_id: &Arc<HandlerEntry>,
) {
    let auth = Arc::clone(authority);
    table.register(
        "/user/create-token",
        &[Method::POST],
        HandlerEntry::new(
            "user_create_token",
            vec![ParamSpec::JsonBody],
            move |_ctx, mut args| {
                let form = UserForm::from_body(args.take(0))?;
                issue_token(&auth, &form)
            },
        ),
    );

    let auth = Arc::clone(authority);
    let db = Arc::clone(store);
    table.register(
        "/user/signup",
        &[Method::POST],
        HandlerEntry::new(
            "user_signup",
            vec![ParamSpec::JsonBody],
            move |_ctx, mut args| {
                let form = UserForm::from_body(args.take(0))?;
                if form.username.is_empty() {
                    return Err(DispatchError::handler(400, "Username cannot be empty"));
                }
                if form.password.is_empty() {
                    return Err(DispatchError::handler(400, "Password cannot be empty"));
                }
                db.create_user(&form.username, &password_hash(&form.password))
                    .map_err(|_| DispatchError::handler(409, "Username already exists"))?;
                issue_token(&auth, &form)
            },
        ),
    );

    let auth = Arc::clone(authority);
    let db = Arc::clone(store);
    table.register(
        "/user/login",
        &[Method::POST],
        HandlerEntry::new(
            "user_login",
            vec![ParamSpec::JsonBody],
            move |_ctx, mut args| {
                let form = UserForm::from_body(args.take(0))?;
                let user = db.find_user(&form.username).ok_or_else(|| {
                    DispatchError::handler(400, "Username not found in the database")
                })?;
                if user.password != password_hash(&form.password) {
                    return Err(DispatchError::handler(400, "Invalid password"));
                }
                issue_token(&auth, &form)
            },
        ),
    );

    table.register("/user/verify", &[Method::GET], Arc::clone(verify));
    table.register("/user/id", &[Method::GET], Arc::clone(user_id));

    let db = Arc::clone(store);
    table.register(
        "/user",
        &[Method::GET],
        HandlerEntry::new(
            "user_get",
            vec![ParamSpec::Depends(Arc::clone(verify))],
            move |_ctx, args| {
                let username = args.str(0)?;
                let user = db.find_user(username).ok_or_else(|| {
                    DispatchError::handler(400, "User not found in the database")
                })?;
                Ok(Payload::Json(json!({
                    "username": user.username,
                    "created_at": timefmt::format(user.created_at),
                })))
            },
        ),
    );

    let db = Arc::clone(store);
    table.register(
        "/users",
        &[Method::GET],
        HandlerEntry::new(
            "users_get",
            date_window_bindings(ParamSpec::Depends(Arc::clone(verify))),
            move |_ctx, args| {
                let min = args.opt_timestamp(1);
                let max = args.opt_timestamp(2);
                let limit = args.u64(3)? as usize;
                let users: Vec<Value> = db
                    .users_between(min, max, limit)
                    .into_iter()
                    .map(|u| {
                        json!({
                            "username": u.username,
                            "created_at": timefmt::format(u.created_at),
                        })
                    })
                    .collect();
                Ok(Payload::Json(Value::Array(users)))
            },
        ),
    );

    let db = Arc::clone(store);
    table.register(
        "/user",
        &[Method::DELETE],
        HandlerEntry::new(
            "user_delete",
            vec![ParamSpec::Depends(Arc::clone(user_id))],
            move |_ctx, args| {
                let id = args.u64(0)?;
                db.delete_user(id);
                db.delete_todos(id);
                Ok(Payload::Empty)
            },
        ),
    );
}
