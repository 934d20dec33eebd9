// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document data and buffered write operations.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::path::ResourcePath;
use crate::error::{DbError, Result};

/// Field map of a stored document.
pub type DocumentData = Map<String, Value>;

/// Serialize a value into document fields.
///
/// The value must serialize to a JSON object.
pub fn to_document_data<T: Serialize + ?Sized>(value: &T) -> Result<DocumentData> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DbError::InvalidArgument(format!(
            "document data must be an object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A pending mutation of a single document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WriteOp {
    /// Replace the document.
    Set(DocumentData),
    /// Deep-merge into the document, creating it if missing.
    Merge(DocumentData),
    /// Update fields (dotted paths allowed); the document must exist.
    Update(DocumentData),
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Write {
    pub path: ResourcePath,
    pub op: WriteOp,
}

impl WriteOp {
    /// Apply to the current contents of a document.
    ///
    /// Returns the new contents, or `None` when the document ends up deleted.
    pub(crate) fn apply(
        &self,
        path: &ResourcePath,
        current: Option<&DocumentData>,
    ) -> Result<Option<DocumentData>> {
        match self {
            WriteOp::Set(data) => Ok(Some(data.clone())),
            WriteOp::Merge(data) => {
                let mut merged = current.cloned().unwrap_or_default();
                deep_merge(&mut merged, data);
                Ok(Some(merged))
            }
            WriteOp::Update(fields) => {
                let mut updated = current
                    .cloned()
                    .ok_or_else(|| DbError::NotFound(path.to_string()))?;
                for (field_path, value) in fields {
                    set_field(&mut updated, field_path, value.clone())?;
                }
                Ok(Some(updated))
            }
            WriteOp::Delete => Ok(None),
        }
    }
}

fn deep_merge(target: &mut DocumentData, source: &DocumentData) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Set a possibly dotted field path (`address.city`), creating
/// intermediate maps and replacing non-map intermediates.
pub(crate) fn set_field(data: &mut DocumentData, field_path: &str, value: Value) -> Result<()> {
    let parts = split_field_path(field_path)?;
    let (last, parents) = parts
        .split_last()
        .ok_or_else(|| DbError::InvalidArgument("empty field path".to_string()))?;

    let mut cursor = data;
    for part in parents {
        let entry = cursor
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        cursor = entry.as_object_mut().ok_or_else(|| {
            DbError::InvalidArgument(format!("field '{}' is not a map", part))
        })?;
    }
    cursor.insert(last.to_string(), value);
    Ok(())
}

/// Look up a possibly dotted field path.
pub(crate) fn get_field<'a>(data: &'a DocumentData, field_path: &str) -> Option<&'a Value> {
    let mut parts = field_path.split('.');
    let first = data.get(parts.next()?)?;
    parts.try_fold(first, |value, part| value.as_object()?.get(part))
}

fn split_field_path(field_path: &str) -> Result<Vec<&str>> {
    let parts: Vec<&str> = field_path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(DbError::InvalidArgument(format!(
            "invalid field path '{}'",
            field_path
        )));
    }
    Ok(parts)
}
