//! Form submissions and the form part of a context document
//!
//! Submissions arrive urlencoded or as `multipart/form-data`; both are read
//! into [`FormData`]. Responses describe forms with [`FormView`]: one entry
//! per field with its current value and inline errors.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use axum::Form;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use crate::models::ValidationError;

/// A file part of a multipart submission
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Text fields and files of a submitted form
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Text value of `name`; missing fields read as empty.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            files: HashMap::new(),
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        let bad = |e: axum::extract::multipart::MultipartError| ApiError::BadRequest {
            message: e.body_text(),
        };

        while let Some(field) = multipart.next_field().await.map_err(bad)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(bad)?;
                    // Browsers send an empty part for an untouched file input
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(name, UploadedFile { file_name, bytes });
                }
                None => {
                    let value = field.text().await.map_err(bad)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest {
                    message: e.body_text(),
                })?;
            return Self::from_multipart(multipart).await;
        }

        let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest {
                message: e.body_text(),
            })?;

        Ok(Self {
            fields,
            files: HashMap::new(),
        })
    }
}

/// Value of one field of an urlencoded body, if present.
///
/// Decoded the same way [`Form`] decodes handler input.
pub fn form_field(body: &[u8], name: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
    pairs
        .into_iter()
        .find_map(|(key, value)| (key == name).then_some(value))
}

/// One selectable option of a choice field
#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub value: i64,
    pub label: String,
}

/// A single field as rendered into a context document
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,
    pub widget: &'static str,
    pub required: bool,
    pub value: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    pub errors: Vec<String>,
}

impl FieldView {
    pub fn new(name: &'static str, label: &'static str, widget: &'static str) -> Self {
        Self {
            name,
            label,
            help_text: None,
            widget,
            required: false,
            value: Value::Null,
            choices: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn help(mut self, text: &'static str) -> Self {
        self.help_text = Some(text);
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }
}

/// A form as rendered into a context document
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormView {
    pub fields: Vec<FieldView>,
    pub non_field_errors: Vec<String>,
    /// Whether the form reflects a submission
    pub is_bound: bool,
}

impl FormView {
    pub fn new(fields: Vec<FieldView>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn bound(mut self) -> Self {
        self.is_bound = true;
        self
    }

    /// Attach `message` to `field`, or to the form when no such field exists.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.fields.iter_mut().find(|f| f.name == field) {
            Some(f) => f.errors.push(message),
            None => self.non_field_errors.push(message),
        }
    }

    pub fn add_validation_error(&mut self, error: &ValidationError) {
        self.add_error(error.field(), error.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.non_field_errors.is_empty() && self.fields.iter().all(|f| f.errors.is_empty())
    }
}
