use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    Json,
};
use serde_json::Value;

use crate::{fail, Failure};

/// Form fields from either a JSON object or a multipart body.
///
/// Text values are kept by field name; uploaded files are reduced to
/// `(field, file name)` pairs.
#[derive(Debug, Default)]
pub struct Fields {
    pub values: HashMap<String, String>,
    pub files: Vec<(String, String)>,
}

impl Fields {
    /// Non-empty text value of `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn files_named(&self, name: &str) -> Vec<String> {
        self.files
            .iter()
            .filter(|(field, _)| field == name)
            .map(|(_, file)| format!("uploads/{file}"))
            .collect()
    }
}

impl<S: Send + Sync> FromRequest<S> for Fields {
    type Rejection = Failure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
            let mut fields = Fields::default();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed multipart body"))?
            {
                let name = field.name().unwrap_or_default().to_string();
                match field.file_name().map(str::to_string) {
                    Some(file_name) => {
                        field
                            .bytes()
                            .await
                            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
                        fields.files.push((name, file_name));
                    }
                    None => {
                        let text = field
                            .text()
                            .await
                            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
                        fields.values.insert(name, text);
                    }
                }
            }
            return Ok(fields);
        }

        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed JSON body"))?;
        let Value::Object(map) = body else {
            return Err(fail(StatusCode::BAD_REQUEST, "Expected a JSON object"));
        };
        let values = map
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                Value::Null => None,
                other => Some((k, other.to_string())),
            })
            .collect();
        Ok(Fields {
            values,
            files: Vec::new(),
        })
    }
}
