use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    authenticate, fail, invalid, new_id, ok, paginate, Db, Failure, Fields, PageParams, Store,
    Ticket, TicketMessage, User,
};

const STATUSES: [&str; 5] = ["open", "in-progress", "pending", "resolved", "closed"];
const PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

#[derive(Debug, Default, Deserialize)]
pub struct TicketFilter {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
}

impl TicketFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        self.status.as_ref().is_none_or(|s| &ticket.status == s)
            && self.priority.as_ref().is_none_or(|p| &ticket.priority == p)
            && self.category.as_ref().is_none_or(|c| &ticket.category == c)
    }

    fn page(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

fn involves(ticket: &Ticket, user: &User) -> bool {
    ticket.created_by == user.id || ticket.assigned_to.as_deref() == Some(user.id.as_str())
}

fn can_see(ticket: &Ticket, user: &User) -> bool {
    user.role == "admin" || involves(ticket, user)
}

fn find_ticket<'a>(store: &'a mut Store, id: &str, user: &User) -> Result<&'a mut Ticket, Failure> {
    let ticket = store
        .tickets
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Ticket not found"))?;
    if !can_see(ticket, user) {
        return Err(fail(StatusCode::FORBIDDEN, "Not allowed to access this ticket"));
    }
    Ok(ticket)
}

pub async fn create(
    State(db): State<Db>,
    headers: HeaderMap,
    fields: Fields,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;

    let mut errors = Vec::new();
    if fields.text("title").is_none() {
        errors.push(("title", "Title is required"));
    }
    if fields.text("description").is_none() {
        errors.push(("description", "Description is required"));
    }
    if fields.text("category").is_none() {
        errors.push(("category", "Category is required"));
    }
    let priority = fields.text("priority").unwrap_or("medium");
    if !PRIORITIES.contains(&priority) {
        errors.push(("priority", "Priority must be low, medium, high or urgent"));
    }
    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    let now = Utc::now();
    let ticket = Ticket {
        id: new_id(),
        title: fields.text("title").unwrap_or_default().to_string(),
        description: fields.text("description").unwrap_or_default().to_string(),
        status: "open".to_string(),
        priority: priority.to_string(),
        category: fields.text("category").unwrap_or_default().to_string(),
        created_by: user.id.clone(),
        assigned_to: None,
        attachments: fields.files_named("attachments"),
        messages: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    store.tickets.push(ticket.clone());
    tracing::info!(ticket = %ticket.id, user = %user.id, "ticket created");
    Ok((StatusCode::CREATED, ok("Ticket created successfully", ticket)))
}

pub async fn list_all(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<TicketFilter>,
) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let tickets: Vec<Ticket> = store
        .tickets
        .iter()
        .filter(|t| can_see(t, &user) && filter.matches(t))
        .cloned()
        .collect();
    Ok(ok("Tickets retrieved successfully", paginate(tickets, &filter.page())))
}

pub async fn list_mine(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<TicketFilter>,
) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let tickets: Vec<Ticket> = store
        .tickets
        .iter()
        .filter(|t| involves(t, &user) && filter.matches(t))
        .cloned()
        .collect();
    Ok(ok("Tickets retrieved successfully", paginate(tickets, &filter.page())))
}

pub async fn stats(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let visible: Vec<&Ticket> = store.tickets.iter().filter(|t| can_see(t, &user)).collect();
    let count = |status: &str| visible.iter().filter(|t| t.status == status).count();
    Ok(ok(
        "Ticket statistics retrieved successfully",
        json!({
            "total": visible.len(),
            "open": count("open"),
            "inProgress": count("in-progress"),
            "resolved": count("resolved"),
            "closed": count("closed"),
        }),
    ))
}

pub async fn get_one(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let ticket = find_ticket(&mut store, &id, &user)?;
    Ok(ok("Ticket retrieved successfully", &*ticket))
}

pub async fn update(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    fields: Fields,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;

    let mut errors = Vec::new();
    if fields.text("status").is_some_and(|s| !STATUSES.contains(&s)) {
        errors.push(("status", "Unknown status"));
    }
    if fields.text("priority").is_some_and(|p| !PRIORITIES.contains(&p)) {
        errors.push(("priority", "Priority must be low, medium, high or urgent"));
    }
    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    let ticket = find_ticket(&mut store, &id, &user)?;
    for (field, slot) in [
        ("title", &mut ticket.title),
        ("description", &mut ticket.description),
        ("status", &mut ticket.status),
        ("priority", &mut ticket.priority),
        ("category", &mut ticket.category),
    ] {
        if let Some(value) = fields.text(field) {
            *slot = value.to_string();
        }
    }
    if let Some(assignee) = fields.text("assignedTo") {
        ticket.assigned_to = Some(assignee.to_string());
    }
    ticket.attachments.extend(fields.files_named("attachments"));
    ticket.updated_at = Utc::now();
    Ok(ok("Ticket updated successfully", &*ticket))
}

pub async fn delete(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    find_ticket(&mut store, &id, &user)?;
    store.tickets.retain(|t| t.id != id);
    Ok(Json(json!({ "success": true, "message": "Ticket deleted successfully" })))
}

pub async fn list_messages(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let ticket = find_ticket(&mut store, &id, &user)?;
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(usize::MAX).max(1);
    let messages: Vec<&TicketMessage> = ticket
        .messages
        .iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();
    Ok(ok("Messages retrieved successfully", messages))
}

pub async fn add_message(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    fields: Fields,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let Some(content) = fields.text("message") else {
        return Err(invalid(vec![("message", "Message is required")]));
    };

    let ticket = find_ticket(&mut store, &id, &user)?;
    let message = TicketMessage {
        id: new_id(),
        content: content.to_string(),
        created_by: user.id.clone(),
        attachments: fields.files_named("attachments"),
        created_at: Utc::now(),
    };
    ticket.messages.push(message.clone());
    ticket.updated_at = message.created_at;
    Ok((StatusCode::CREATED, ok("Message added successfully", message)))
}
