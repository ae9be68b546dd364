//! In-process stand-in for the managed backend: a small axum app speaking
//! the provider dialect the service consumes (table-scoped REST with
//! eq/neq/is filters, ordering, embeds, and the auth plane's signup /
//! password-grant / user / logout / admin endpoints). State lives in a
//! mutex so tests can seed and inspect it directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::DateTime;
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Service key the app under test is configured with.
pub const SERVICE_KEY: &str = "service-key-test";

type JsonMap = Map<String, Value>;

#[derive(Clone, Default)]
pub struct StubProvider {
    db: Arc<Mutex<StubDb>>,
}

#[derive(Default)]
struct StubDb {
    users: Vec<StubUser>,
    tokens: HashMap<String, Uuid>,
    tables: HashMap<String, Vec<JsonMap>>,
    sequence: i64,
}

#[derive(Clone)]
struct StubUser {
    id: Uuid,
    email: String,
    password: String,
    metadata: Value,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/auth/v1/signup", post(signup))
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/user", get(get_user))
            .route("/auth/v1/logout", post(logout))
            .route("/auth/v1/health", get(health))
            .route("/auth/v1/admin/users/:id", delete(admin_delete_user))
            // The data plane answers its root with API metadata; the app's
            // health probe relies on it.
            .route("/rest/v1/", get(rest_root))
            .route(
                "/rest/v1/:table",
                get(rest_get)
                    .post(rest_post)
                    .patch(rest_patch)
                    .delete(rest_delete),
            )
            .with_state(self.clone())
    }

    /// Provision an identity directly at the "provider", the way admin
    /// accounts are created out-of-band in production.
    pub fn seed_user(&self, email: &str, password: &str, nombre: &str, rol: &str) -> Uuid {
        let mut db = self.db.lock().unwrap();
        let id = Uuid::new_v4();
        db.users.push(StubUser {
            id,
            email: email.to_string(),
            password: password.to_string(),
            metadata: json!({ "nombre": nombre, "rol": rol }),
        });
        id
    }

    pub fn user_exists(&self, email: &str) -> bool {
        self.db
            .lock()
            .unwrap()
            .users
            .iter()
            .any(|u| u.email == email)
    }

    pub fn table_len(&self, table: &str) -> usize {
        self.db
            .lock()
            .unwrap()
            .tables
            .get(table)
            .map_or(0, |rows| rows.len())
    }
}

fn user_json(user: &StubUser) -> Value {
    json!({
        "id": user.id,
        "aud": "authenticated",
        "email": user.email,
        "user_metadata": user.metadata,
    })
}

fn session_json(user: &StubUser, token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "user": user_json(user),
    })
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(String::from)
}

fn stamp(sequence: i64) -> String {
    DateTime::from_timestamp(1_700_000_000 + sequence, 0)
        .unwrap()
        .to_rfc3339()
}

// ---------------------------------------------------------------------------
// Auth plane
// ---------------------------------------------------------------------------

async fn signup(State(stub): State<StubProvider>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let metadata = body.get("data").cloned().unwrap_or_else(|| json!({}));

    let mut db = stub.db.lock().unwrap();
    if db.users.iter().any(|u| u.email == email) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "code": 422, "msg": "User already registered" })),
        )
            .into_response();
    }

    let user = StubUser {
        id: Uuid::new_v4(),
        email,
        password,
        metadata,
    };
    let token = format!("tok-{}", Uuid::new_v4());
    db.tokens.insert(token.clone(), user.id);
    let session = session_json(&user, &token);
    db.users.push(user);

    Json(session).into_response()
}

async fn token(
    State(stub): State<StubProvider>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if params.get("grant_type").map(String::as_str) != Some("password") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut db = stub.db.lock().unwrap();
    let Some(user) = db
        .users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned()
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
        )
            .into_response();
    };

    let token = format!("tok-{}", Uuid::new_v4());
    db.tokens.insert(token.clone(), user.id);
    Json(session_json(&user, &token)).into_response()
}

async fn get_user(State(stub): State<StubProvider>, headers: HeaderMap) -> Response {
    let db = stub.db.lock().unwrap();
    let user = bearer(&headers)
        .and_then(|token| db.tokens.get(&token).copied())
        .and_then(|id| db.users.iter().find(|u| u.id == id));

    match user {
        Some(user) => Json(user_json(user)).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "invalid JWT" })),
        )
            .into_response(),
    }
}

async fn logout(State(stub): State<StubProvider>, headers: HeaderMap) -> Response {
    if let Some(token) = bearer(&headers) {
        stub.db.lock().unwrap().tokens.remove(&token);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "name": "GoTrue" }))
}

async fn rest_root() -> Json<Value> {
    Json(json!({ "info": { "title": "stub data plane" } }))
}

async fn admin_delete_user(
    State(stub): State<StubProvider>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    if bearer(&headers).as_deref() != Some(SERVICE_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "service key required" })),
        )
            .into_response();
    }

    let mut db = stub.db.lock().unwrap();
    db.users.retain(|u| u.id != id);
    db.tokens.retain(|_, uid| *uid != id);
    Json(json!({})).into_response()
}

// ---------------------------------------------------------------------------
// Data plane
// ---------------------------------------------------------------------------

const RESERVED_PARAMS: [&str; 4] = ["select", "order", "limit", "offset"];

async fn rest_get(
    State(stub): State<StubProvider>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let db = stub.db.lock().unwrap();
    let rows = db.tables.get(&table).cloned().unwrap_or_default();

    let mut matched = apply_filters(rows, &params);
    apply_order(&mut matched, &params);
    apply_limit(&mut matched, &params);

    let select = params
        .iter()
        .find(|(k, _)| k == "select")
        .map(|(_, v)| v.clone());
    let projected: Vec<Value> = matched
        .iter()
        .map(|row| project(&db, row, select.as_deref()))
        .collect();

    Json(projected).into_response()
}

async fn rest_post(
    State(stub): State<StubProvider>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let incoming: Vec<JsonMap> = match body {
        Value::Object(row) => vec![row],
        Value::Array(rows) => rows
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "invalid body" })),
            )
                .into_response()
        }
    };

    let mut db = stub.db.lock().unwrap();
    let mut created = Vec::new();
    for mut row in incoming {
        db.sequence += 1;
        row.insert("id".to_string(), json!(db.sequence));
        row.insert("created_at".to_string(), json!(stamp(db.sequence)));

        if let Err(response) = check_constraints(&db, &table, &row, None) {
            return response;
        }

        db.tables
            .entry(table.clone())
            .or_default()
            .push(row.clone());
        created.push(Value::Object(row));
    }

    (StatusCode::CREATED, Json(created)).into_response()
}

async fn rest_patch(
    State(stub): State<StubProvider>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    Json(body): Json<Value>,
) -> Response {
    let Some(changes) = body.as_object().cloned() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "invalid body" })),
        )
            .into_response();
    };

    let mut db = stub.db.lock().unwrap();
    let rows = db.tables.get(&table).cloned().unwrap_or_default();
    let matched_ids: Vec<Value> = apply_filters(rows, &params)
        .iter()
        .filter_map(|row| row.get("id").cloned())
        .collect();

    let mut updated = Vec::new();
    for id in &matched_ids {
        let current = db
            .tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|r| r.get("id") == Some(id)))
            .cloned()
            .unwrap_or_default();
        let mut candidate = current;
        candidate.extend(changes.clone());

        if let Err(response) = check_constraints(&db, &table, &candidate, Some(id)) {
            return response;
        }
        updated.push(candidate);
    }

    if let Some(rows) = db.tables.get_mut(&table) {
        for row in rows.iter_mut() {
            if row
                .get("id")
                .map_or(false, |id| matched_ids.contains(id))
            {
                row.extend(changes.clone());
            }
        }
    }

    Json(updated.into_iter().map(Value::Object).collect::<Vec<_>>()).into_response()
}

async fn rest_delete(
    State(stub): State<StubProvider>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut db = stub.db.lock().unwrap();
    let rows = db.tables.get(&table).cloned().unwrap_or_default();
    let removed = apply_filters(rows, &params);
    let removed_ids: Vec<Value> = removed
        .iter()
        .filter_map(|row| row.get("id").cloned())
        .collect();

    if let Some(rows) = db.tables.get_mut(&table) {
        rows.retain(|row| {
            row.get("id")
                .map_or(true, |id| !removed_ids.contains(id))
        });
    }

    Json(removed.into_iter().map(Value::Object).collect::<Vec<_>>()).into_response()
}

// ---------------------------------------------------------------------------
// Query semantics
// ---------------------------------------------------------------------------

fn apply_filters(rows: Vec<JsonMap>, params: &[(String, String)]) -> Vec<JsonMap> {
    rows.into_iter()
        .filter(|row| {
            params.iter().all(|(key, raw)| {
                if RESERVED_PARAMS.contains(&key.as_str()) {
                    return true;
                }
                if let Some(value) = raw.strip_prefix("eq.") {
                    matches_value(row.get(key), value)
                } else if let Some(value) = raw.strip_prefix("neq.") {
                    !matches_value(row.get(key), value)
                } else if raw == "is.null" {
                    row.get(key).map_or(true, Value::is_null)
                } else {
                    true
                }
            })
        })
        .collect()
}

fn matches_value(value: Option<&Value>, raw: &str) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => s == raw,
        Some(Value::Number(n)) => n.to_string() == raw,
        Some(Value::Bool(b)) => b.to_string() == raw,
        Some(_) => false,
    }
}

fn apply_order(rows: &mut [JsonMap], params: &[(String, String)]) {
    let Some(order) = params
        .iter()
        .find(|(k, _)| k == "order")
        .map(|(_, v)| v.clone())
    else {
        return;
    };
    let Some((column, direction)) = order.split_once('.') else {
        return;
    };

    rows.sort_by(|a, b| cmp_json(a.get(column), b.get(column)));
    if direction == "desc" {
        rows.reverse();
    }
}

fn cmp_json(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn apply_limit(rows: &mut Vec<JsonMap>, params: &[(String, String)]) {
    if let Some(limit) = params
        .iter()
        .find(|(k, _)| k == "limit")
        .and_then(|(_, v)| v.parse::<usize>().ok())
    {
        rows.truncate(limit);
    }
}

/// Apply a `select` projection, resolving `alias:fk(columns)` embeds
/// against the referenced table.
fn project(db: &StubDb, row: &JsonMap, select: Option<&str>) -> Value {
    let Some(select) = select else {
        return Value::Object(row.clone());
    };

    let mut out = JsonMap::new();
    for segment in split_top_level(select) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if segment == "*" {
            for (k, v) in row {
                out.insert(k.clone(), v.clone());
            }
        } else if let Some(open) = segment.find('(') {
            let head = &segment[..open];
            let columns: Vec<&str> = segment[open + 1..segment.len() - 1]
                .split(',')
                .map(str::trim)
                .collect();
            let Some((alias, fk)) = head.split_once(':') else {
                continue;
            };

            let embedded = row
                .get(fk)
                .filter(|v| !v.is_null())
                .and_then(|fk_value| {
                    db.tables
                        .get(alias)?
                        .iter()
                        .find(|r| r.get("id") == Some(fk_value))
                })
                .map(|target| {
                    let mut picked = JsonMap::new();
                    for column in &columns {
                        if let Some(v) = target.get(*column) {
                            picked.insert((*column).to_string(), v.clone());
                        }
                    }
                    Value::Object(picked)
                })
                .unwrap_or(Value::Null);

            out.insert(alias.to_string(), embedded);
        } else if let Some(v) = row.get(segment) {
            out.insert(segment.to_string(), v.clone());
        }
    }

    Value::Object(out)
}

fn split_top_level(select: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in select.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(&select[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&select[start..]);
    segments
}

/// Unique and foreign-key constraints, mirroring the production schema.
fn check_constraints(
    db: &StubDb,
    table: &str,
    candidate: &JsonMap,
    exclude_id: Option<&Value>,
) -> Result<(), Response> {
    let uniques: &[&str] = match table {
        "clientes" | "tecnicos" => &["email", "usuario_id"],
        _ => &[],
    };
    for column in uniques {
        if let Some(value) = candidate.get(*column).filter(|v| !v.is_null()) {
            let clash = db.tables.get(table).map_or(false, |rows| {
                rows.iter().any(|r| {
                    r.get("id").map(|id| Some(id) != exclude_id).unwrap_or(true)
                        && r.get(*column) == Some(value)
                })
            });
            if clash {
                return Err((
                    StatusCode::CONFLICT,
                    Json(json!({
                        "code": "23505",
                        "message": format!(
                            "duplicate key value violates unique constraint \"{}_{}_key\"",
                            table, column
                        )
                    })),
                )
                    .into_response());
            }
        }
    }

    let foreign_keys: &[(&str, &str)] = match table {
        "sedes" => &[("cliente_id", "clientes")],
        "servicios" => &[
            ("cliente_id", "clientes"),
            ("sede_id", "sedes"),
            ("tecnico_id", "tecnicos"),
        ],
        _ => &[],
    };
    for (column, target) in foreign_keys {
        if let Some(value) = candidate.get(*column).filter(|v| !v.is_null()) {
            let exists = db.tables.get(*target).map_or(false, |rows| {
                rows.iter().any(|r| r.get("id") == Some(value))
            });
            if !exists {
                return Err((
                    StatusCode::CONFLICT,
                    Json(json!({
                        "code": "23503",
                        "message": format!(
                            "insert or update on table \"{}\" violates foreign key constraint \"{}_{}_fkey\"",
                            table, table, column
                        )
                    })),
                )
                    .into_response());
            }
        }
    }

    Ok(())
}
