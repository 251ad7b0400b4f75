use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{authenticate, fail, invalid, new_id, ok, Db, Failure, PageParams, User};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let mut errors = Vec::new();
    if !input.email.contains('@') {
        errors.push(("email", "A valid email is required"));
    }
    if input.password.len() < 6 {
        errors.push(("password", "Password must be at least 6 characters"));
    }
    if input.name.trim().is_empty() {
        errors.push(("name", "Name is required"));
    }
    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    let mut store = db.write().await;
    if store.users.values().any(|u| u.email == input.email) {
        return Err(fail(StatusCode::CONFLICT, "Email already registered"));
    }

    let now = Utc::now();
    let user = User {
        id: new_id(),
        email: input.email,
        name: input.name,
        phone: input.phone,
        role: input.role.unwrap_or_else(|| "user".to_string()),
        created_at: now,
        updated_at: now,
    };
    let token = new_id();
    store.passwords.insert(user.id.clone(), input.password);
    store.sessions.insert(token.clone(), user.id.clone());
    store.users.insert(user.id.clone(), user.clone());
    tracing::info!(user = %user.id, "registered");

    Ok((
        StatusCode::CREATED,
        ok("User registered successfully", json!({ "user": user, "token": token })),
    ))
}

pub async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = store
        .users
        .values()
        .find(|u| u.email == input.email)
        .filter(|u| store.passwords.get(&u.id) == Some(&input.password))
        .cloned()
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;

    let token = new_id();
    store.sessions.insert(token.clone(), user.id.clone());
    Ok(ok("Login successful", json!({ "user": user, "token": token })))
}

pub async fn logout(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    store.sessions.retain(|_, id| *id != user.id);
    Ok(Json(json!({ "success": true, "message": "Logged out successfully" })))
}

pub async fn current_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    Ok(Json(json!({ "success": true, "data": user })))
}

pub async fn list_users(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let caller = authenticate(&store, &headers)?;
    if caller.role != "admin" {
        return Err(fail(StatusCode::FORBIDDEN, "Admin access required"));
    }
    let mut users: Vec<User> = store.users.values().cloned().collect();
    users.sort_by_key(|u| u.created_at);
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(usize::MAX).max(1);
    let users: Vec<User> = users
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();
    Ok(ok("Users retrieved successfully", users))
}
