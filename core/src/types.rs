//! Domain DTOs for the todos API.
//!
//! # Design
//! Every field is optional because the remote schema does not guarantee
//! presence. The wire format is snake_case, which matches the Rust field
//! names, so no renames are needed. A `Todo` without an `id` cannot be
//! updated or deleted.

use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub is_done: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meta {
    pub current_page: Option<i64>,
    pub from: Option<i64>,
    pub last_page: Option<i64>,
    pub per_page: Option<i64>,
    pub to: Option<i64>,
    pub total: Option<i64>,
}

/// `{data: [T] | null, meta: {...} | null, message: string | null}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListEnvelope<T> {
    pub data: Option<Vec<T>>,
    pub meta: Option<Meta>,
    pub message: Option<String>,
}

/// `{data: T | null, message: string | null}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemEnvelope<T> {
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Write payload shared by the create and update operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
}

impl TodoInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_done: false,
        }
    }

    pub fn done(mut self, is_done: bool) -> Self {
        self.is_done = is_done;
        self
    }

    /// Field pairs in wire order, booleans rendered as `true`/`false`.
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("title".to_string(), self.title.clone()),
            ("is_done".to_string(), self.is_done.to_string()),
        ]
    }
}
