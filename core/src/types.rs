//! Domain DTOs for the ticket API.
//!
//! # Design
//! These types mirror the server's schema (`_id`, camelCase fields, lowercase
//! enum values) but are defined independently of the mock-server crate;
//! integration tests catch any drift between the two. Request payloads that
//! may carry files pick their own encoding in `into_payload`: multipart when
//! at least one file is attached, JSON otherwise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Payload;
use crate::error::ApiResult;
use crate::http::{Attachment, MultipartForm};
use crate::query::QueryParams;

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// `{ success, message, data }` wrapper around every response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

/// Envelope for responses that carry no payload worth decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

// ---------------------------------------------------------------------------
// Users and auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `data` of a successful register or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// Ticket lifecycle state. Values this client does not know decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Open,
    #[serde(alias = "in_progress")]
    InProgress,
    Pending,
    Resolved,
    Closed,
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Pending => "pending",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
            TicketStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
    #[serde(other)]
    Unknown,
}

impl TicketPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
            TicketPriority::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: String,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<TicketMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status counts from `GET /tickets/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub category: String,
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl CreateTicket {
    pub fn into_payload(self) -> ApiResult<Payload> {
        if self.attachments.is_empty() {
            return Payload::json(&self);
        }
        let form = MultipartForm::new()
            .text("title", self.title)
            .text("description", self.description)
            .text("priority", self.priority.as_str())
            .text("category", self.category);
        Ok(Payload::Multipart(attach_all(form, "attachments", self.attachments)))
    }
}

/// Partial update. Only the fields that are set reach the server.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl UpdateTicket {
    pub fn into_payload(self) -> ApiResult<Payload> {
        if self.attachments.is_empty() {
            return Payload::json(&self);
        }
        let mut form = MultipartForm::new();
        form = text_if_set(form, "title", self.title);
        form = text_if_set(form, "description", self.description);
        form = text_if_set(form, "status", self.status.map(|s| s.as_str().to_string()));
        form = text_if_set(form, "priority", self.priority.map(|p| p.as_str().to_string()));
        form = text_if_set(form, "category", self.category);
        form = text_if_set(form, "assignedTo", self.assigned_to);
        Ok(Payload::Multipart(attach_all(form, "attachments", self.attachments)))
    }
}

/// Body of `POST /tickets/:id/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub message: String,
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl NewMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attachments: Vec::new(),
        }
    }

    pub fn into_payload(self) -> ApiResult<Payload> {
        if self.attachments.is_empty() {
            return Payload::json(&self);
        }
        let form = MultipartForm::new().text("message", self.message);
        Ok(Payload::Multipart(attach_all(form, "attachments", self.attachments)))
    }
}

// ---------------------------------------------------------------------------
// Data entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDataEntry {
    pub title: String,
    pub description: String,
    #[serde(skip)]
    pub image: Option<Attachment>,
}

impl CreateDataEntry {
    pub fn into_payload(self) -> ApiResult<Payload> {
        match self.image {
            None => Payload::json(&self),
            Some(image) => Ok(Payload::Multipart(
                MultipartForm::new()
                    .text("title", self.title)
                    .text("description", self.description)
                    .file("image", image),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDataEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip)]
    pub image: Option<Attachment>,
}

impl UpdateDataEntry {
    pub fn into_payload(self) -> ApiResult<Payload> {
        let Some(image) = self.image.clone() else {
            return Payload::json(&self);
        };
        let mut form = MultipartForm::new();
        form = text_if_set(form, "title", self.title);
        form = text_if_set(form, "description", self.description);
        Ok(Payload::Multipart(form.file("image", image)))
    }
}

// ---------------------------------------------------------------------------
// Read filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .push("page", self.page)
            .push("limit", self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<String>,
}

impl TicketQuery {
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .push("page", self.page)
            .push("limit", self.limit)
            .push("status", self.status.map(TicketStatus::as_str))
            .push("priority", self.priority.map(TicketPriority::as_str))
            .push("category", self.category.clone())
    }
}

// Empty strings are skipped along with `None`, matching form truthiness.
fn text_if_set(form: MultipartForm, name: &str, value: Option<String>) -> MultipartForm {
    match value {
        Some(v) if !v.is_empty() => form.text(name, v),
        _ => form,
    }
}

fn attach_all(mut form: MultipartForm, name: &str, files: Vec<Attachment>) -> MultipartForm {
    for file in files {
        form = form.file(name, file);
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Part;

    fn screenshot() -> Attachment {
        Attachment::new("screen.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    fn create_ticket(attachments: Vec<Attachment>) -> CreateTicket {
        CreateTicket {
            title: "VPN down".to_string(),
            description: "Cannot connect since 9am".to_string(),
            priority: TicketPriority::High,
            category: "network".to_string(),
            attachments,
        }
    }

    #[test]
    fn create_ticket_without_attachments_is_json() {
        let payload = create_ticket(Vec::new()).into_payload().unwrap();
        let Payload::Json(body) = payload else {
            panic!("expected JSON payload");
        };
        assert_eq!(
            body,
            serde_json::json!({
                "title": "VPN down",
                "description": "Cannot connect since 9am",
                "priority": "high",
                "category": "network",
            })
        );
    }

    #[test]
    fn create_ticket_with_attachments_is_multipart() {
        let payload = create_ticket(vec![screenshot(), screenshot()]).into_payload().unwrap();
        let Payload::Multipart(form) = payload else {
            panic!("expected multipart payload");
        };
        let names: Vec<&str> = form.parts().iter().map(Part::name).collect();
        assert_eq!(
            names,
            ["title", "description", "priority", "category", "attachments", "attachments"]
        );
        assert_eq!(form.text_value("priority"), Some("high"));
    }

    #[test]
    fn update_ticket_json_skips_unset_fields() {
        let update = UpdateTicket {
            status: Some(TicketStatus::InProgress),
            assigned_to: Some("u2".to_string()),
            ..Default::default()
        };
        let Payload::Json(body) = update.into_payload().unwrap() else {
            panic!("expected JSON payload");
        };
        assert_eq!(body, serde_json::json!({"status": "in-progress", "assignedTo": "u2"}));
    }

    #[test]
    fn update_ticket_multipart_skips_empty_fields() {
        let update = UpdateTicket {
            title: Some(String::new()),
            category: Some("hardware".to_string()),
            attachments: vec![screenshot()],
            ..Default::default()
        };
        let Payload::Multipart(form) = update.into_payload().unwrap() else {
            panic!("expected multipart payload");
        };
        let names: Vec<&str> = form.parts().iter().map(Part::name).collect();
        assert_eq!(names, ["category", "attachments"]);
    }

    #[test]
    fn message_encoding_follows_attachments() {
        assert!(matches!(NewMessage::new("hi").into_payload().unwrap(), Payload::Json(_)));
        let msg = NewMessage {
            message: "see attached".to_string(),
            attachments: vec![screenshot()],
        };
        assert!(matches!(msg.into_payload().unwrap(), Payload::Multipart(_)));
    }

    #[test]
    fn data_entry_image_switches_to_multipart() {
        let entry = CreateDataEntry {
            title: "Rack photo".to_string(),
            description: "Row 4".to_string(),
            image: None,
        };
        assert!(matches!(entry.clone().into_payload().unwrap(), Payload::Json(_)));

        let entry = CreateDataEntry {
            image: Some(screenshot()),
            ..entry
        };
        let Payload::Multipart(form) = entry.into_payload().unwrap() else {
            panic!("expected multipart payload");
        };
        assert_eq!(form.parts().last().map(Part::name), Some("image"));
    }

    #[test]
    fn status_accepts_snake_case_alias() {
        let status: TicketStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(status, TicketStatus::InProgress);
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""in-progress""#);
    }

    #[test]
    fn ticket_decodes_server_shape() {
        let ticket: Ticket = serde_json::from_str(
            r#"{
                "_id": "t1",
                "title": "VPN down",
                "description": "Cannot connect",
                "status": "open",
                "priority": "urgent",
                "category": "network",
                "createdBy": "u1",
                "createdAt": "2024-05-01T10:00:00.000Z",
                "updatedAt": "2024-05-01T10:00:00.000Z",
                "__v": 0
            }"#,
        )
        .unwrap();
        assert_eq!(ticket.id, "t1");
        assert_eq!(ticket.priority, TicketPriority::Urgent);
        assert!(ticket.assigned_to.is_none());
        assert!(ticket.messages.is_empty());
    }

    #[test]
    fn unrecognized_enum_values_keep_the_page() {
        let page: Page<Ticket> = serde_json::from_value(serde_json::json!({
            "items": [
                {
                    "_id": "t1", "title": "a", "description": "a", "status": "open",
                    "priority": "low", "category": "x", "createdBy": "u1",
                    "createdAt": "2024-05-01T10:00:00Z", "updatedAt": "2024-05-01T10:00:00Z"
                },
                {
                    "_id": "t2", "title": "b", "description": "b", "status": "on-hold",
                    "priority": "critical", "category": "x", "createdBy": "u1",
                    "createdAt": "2024-05-01T10:00:00Z", "updatedAt": "2024-05-01T10:00:00Z"
                }
            ],
            "pagination": { "page": 1, "limit": 10, "total": 2, "totalPages": 1 }
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].status, TicketStatus::Open);
        assert_eq!(page.items[1].status, TicketStatus::Unknown);
        assert_eq!(page.items[1].priority, TicketPriority::Unknown);
    }

    #[test]
    fn ticket_query_params_skip_unset_filters() {
        let query = TicketQuery {
            page: Some(1),
            status: Some(TicketStatus::Resolved),
            ..Default::default()
        };
        let url = crate::query::build_url("http://x/tickets", &query.to_params());
        assert_eq!(url, "http://x/tickets?page=1&status=resolved");
    }
}
