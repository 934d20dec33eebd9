// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Slash-separated resource paths.
//!
//! Collections live at odd-length paths (`cities`, `states/ca/cities`) and
//! documents at even-length paths (`cities/sf`).

use crate::error::{DbError, Result};

const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const AUTO_ID_LEN: usize = 20;

/// A validated, normalized resource path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// Parse a slash-separated path.
    ///
    /// A single leading or trailing `/` is ignored.
    pub fn parse(path: &str) -> Result<Self> {
        if path.contains("//") {
            return Err(DbError::InvalidPath(format!(
                "'{}' must not contain '//'",
                path
            )));
        }

        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(DbError::InvalidPath(format!("'{}' is empty", path)));
        }

        let segments = trimmed
            .split('/')
            .map(|segment| validate_segment(path, segment).map(|_| segment.to_string()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Parse a path that must point to a collection.
    pub fn collection(path: &str) -> Result<Self> {
        let parsed = Self::parse(path)?;
        if !parsed.is_collection() {
            return Err(DbError::InvalidPath(format!(
                "'{}' is not a collection path (it has an even number of segments)",
                path
            )));
        }
        Ok(parsed)
    }

    /// Parse a path that must point to a document.
    pub fn document(path: &str) -> Result<Self> {
        let parsed = Self::parse(path)?;
        if !parsed.is_document() {
            return Err(DbError::InvalidPath(format!(
                "'{}' is not a document path (it has an odd number of segments)",
                path
            )));
        }
        Ok(parsed)
    }

    /// Append a relative path (which may itself contain slashes).
    pub fn child(&self, relative: &str) -> Result<Self> {
        let rel = Self::parse(relative)?;
        let mut segments = self.segments.clone();
        segments.extend(rel.segments);
        Ok(Self { segments })
    }

    /// Append a single generated segment, see [`auto_id`].
    pub(crate) fn join_generated(&self, id: String) -> Self {
        let mut segments = self.segments.clone();
        segments.push(id);
        Self { segments }
    }

    pub fn is_collection(&self) -> bool {
        self.segments.len() % 2 == 1
    }

    pub fn is_document(&self) -> bool {
        self.segments.len() % 2 == 0
    }

    /// Last segment of the path.
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Path without its last segment, or `None` for a root collection.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

fn validate_segment(path: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(DbError::InvalidPath(format!(
            "'{}' contains an empty segment",
            path
        )));
    }
    if segment == "." || segment == ".." {
        return Err(DbError::InvalidPath(format!(
            "'{}' contains the reserved segment '{}'",
            path, segment
        )));
    }
    if segment.len() >= 4 && segment.starts_with("__") && segment.ends_with("__") {
        return Err(DbError::InvalidPath(format!(
            "'{}' contains the reserved segment '{}'",
            path, segment
        )));
    }
    Ok(())
}

/// Generate a random 20-character alphanumeric document ID.
pub fn auto_id() -> String {
    let mut bits = uuid::Uuid::new_v4().as_u128();
    let base = AUTO_ID_ALPHABET.len() as u128;

    (0..AUTO_ID_LEN)
        .map(|_| {
            let idx = (bits % base) as usize;
            bits /= base;
            AUTO_ID_ALPHABET[idx] as char
        })
        .collect()
}
