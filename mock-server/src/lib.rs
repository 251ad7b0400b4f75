//! In-memory implementation of the ticket desk API.
//!
//! Serves every endpoint under `/api/v1` with the same `{ success, message,
//! data }` envelopes and error bodies as the real backend, so the client can
//! be exercised end to end without one.

mod auth;
mod data_entries;
mod extract;
mod tickets;

use std::{collections::HashMap, sync::Arc};

use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use extract::Fields;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub created_by: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Store {
    pub users: HashMap<String, User>,
    /// Plain-text passwords by user id; this server only ever holds test data.
    passwords: HashMap<String, String>,
    /// Bearer token to user id.
    sessions: HashMap<String, String>,
    pub tickets: Vec<Ticket>,
    pub data_entries: Vec<DataEntry>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error response: status plus `{ success: false, message, errors? }`.
pub type Failure = (StatusCode, Json<Value>);

pub(crate) fn fail(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "success": false, "message": message })))
}

pub(crate) fn invalid(errors: Vec<(&str, &str)>) -> Failure {
    let errors: serde_json::Map<String, Value> = errors
        .into_iter()
        .map(|(field, msg)| (field.to_string(), Value::String(msg.to_string())))
        .collect();
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": "Validation failed", "errors": errors })),
    )
}

pub(crate) fn ok<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({ "success": true, "message": message, "data": data }))
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Resolve the bearer token to a user, or 401.
pub(crate) fn authenticate(store: &Store, headers: &HeaderMap) -> Result<User, Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Authentication required"))?;
    store
        .sessions
        .get(token)
        .and_then(|id| store.users.get(id))
        .cloned()
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Invalid or expired token"))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// `{ items, pagination }` slice of `all`.
pub(crate) fn paginate<T: Serialize>(all: Vec<T>, params: &PageParams) -> Value {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).max(1);
    let total = all.len();
    let items: Vec<T> = all.into_iter().skip((page - 1).saturating_mul(limit)).take(limit).collect();
    json!({
        "items": items,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total.div_ceil(limit),
        }
    })
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/current-user", get(auth::current_user))
        .route("/users", get(auth::list_users))
        .route("/tickets", get(tickets::list_all).post(tickets::create))
        .route("/tickets/my-tickets", get(tickets::list_mine))
        .route("/tickets/stats", get(tickets::stats))
        .route(
            "/tickets/{id}",
            get(tickets::get_one).put(tickets::update).delete(tickets::delete),
        )
        .route(
            "/tickets/{id}/messages",
            get(tickets::list_messages).post(tickets::add_message),
        )
        .route(
            "/data-entries",
            get(data_entries::list).post(data_entries::create),
        )
        .route(
            "/data-entries/{id}",
            get(data_entries::get_one)
                .put(data_entries::update)
                .delete(data_entries::delete),
        )
        .with_state(db);
    Router::new().nest("/api/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_and_counts() {
        let page = paginate((1..=25).collect::<Vec<u32>>(), &PageParams { page: Some(3), limit: Some(10) });
        assert_eq!(page["items"], json!([21, 22, 23, 24, 25]));
        assert_eq!(page["pagination"]["total"], 25);
        assert_eq!(page["pagination"]["totalPages"], 3);
    }

    #[test]
    fn paginate_clamps_zero_page() {
        let page = paginate(vec!["a", "b"], &PageParams { page: Some(0), limit: None });
        assert_eq!(page["items"], json!(["a", "b"]));
        assert_eq!(page["pagination"]["page"], 1);
    }

    #[test]
    fn invalid_lists_field_errors() {
        let (status, Json(body)) = invalid(vec![("title", "Title is required")]);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["title"], "Title is required");
        assert_eq!(body["success"], false);
    }

    #[test]
    fn ticket_serializes_with_mongo_style_id() {
        let now = Utc::now();
        let ticket = Ticket {
            id: "t1".to_string(),
            title: "VPN".to_string(),
            description: "down".to_string(),
            status: "open".to_string(),
            priority: "high".to_string(),
            category: "network".to_string(),
            created_by: "u1".to_string(),
            assigned_to: None,
            attachments: Vec::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["_id"], "t1");
        assert_eq!(json["createdBy"], "u1");
        assert!(json.get("assignedTo").is_none());
    }
}
