use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{authenticate, fail, invalid, new_id, ok, DataEntry, Db, Failure, Fields, PageParams};

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
    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    let now = Utc::now();
    let entry = DataEntry {
        id: new_id(),
        title: fields.text("title").unwrap_or_default().to_string(),
        description: fields.text("description").unwrap_or_default().to_string(),
        image: fields.files_named("image").into_iter().next(),
        created_by: user.id,
        created_at: now,
        updated_at: now,
    };
    store.data_entries.push(entry.clone());
    Ok((StatusCode::CREATED, ok("Data entry created successfully", entry)))
}

pub async fn list(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(usize::MAX).max(1);
    let entries: Vec<&DataEntry> = store
        .data_entries
        .iter()
        .filter(|e| e.created_by == user.id)
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();
    Ok(ok("Data entries retrieved successfully", entries))
}

fn find_entry<'a>(entries: &'a mut [DataEntry], id: &str, user_id: &str) -> Result<&'a mut DataEntry, Failure> {
    entries
        .iter_mut()
        .find(|e| e.id == id && e.created_by == user_id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Data entry not found"))
}

pub async fn get_one(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let entry = find_entry(&mut store.data_entries, &id, &user.id)?;
    Ok(ok("Data entry retrieved successfully", &*entry))
}

pub async fn update(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    fields: Fields,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let entry = find_entry(&mut store.data_entries, &id, &user.id)?;
    if let Some(title) = fields.text("title") {
        entry.title = title.to_string();
    }
    if let Some(description) = fields.text("description") {
        entry.description = description.to_string();
    }
    if let Some(image) = fields.files_named("image").into_iter().next() {
        entry.image = Some(image);
    }
    entry.updated_at = Utc::now();
    Ok(ok("Data entry updated successfully", &*entry))
}

pub async fn delete(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    find_entry(&mut store.data_entries, &id, &user.id)?;
    store.data_entries.retain(|e| e.id != id);
    Ok(Json(json!({ "success": true, "message": "Data entry deleted successfully" })))
}
