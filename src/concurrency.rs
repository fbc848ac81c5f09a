//! # Optimistic concurrency
//!
//! Version tags for single resources and for whole collections, plus the
//! result shapes used by conditional reads and writes.
//!
//! Tags are opaque: they are built from versions, compared by equality, and
//! never parsed back into numbers.

use std::fmt::{self, Display};

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::actor_framework::{Entity, Versioned};

/// An opaque entity tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    /// Wraps a client-supplied value (e.g. an `If-Match` header) without interpreting it.
    pub fn opaque(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Weak tag for a single resource at `version`.
    pub fn for_version(version: u64) -> Self {
        Self(format!("W/\"{}\"", version))
    }

    /// Weak tag for a collection snapshot.
    ///
    /// Encodes member count, the sum of member versions and a digest of the
    /// ordered `(id, version)` pairs. Any create, effective mutation or delete
    /// changes at least one of the three; reads and no-op writes change none.
    pub fn for_collection<T: Entity>(records: &[Versioned<T>]) -> Self {
        let mut hasher = Sha256::new();
        let mut version_sum: u64 = 0;
        for record in records {
            version_sum = version_sum.wrapping_add(record.version);
            hasher.update(record.entity.id().to_string().as_bytes());
            hasher.update(b":");
            hasher.update(record.version.to_be_bytes());
            hasher.update(b";");
        }
        let digest = hex::encode(hasher.finalize());
        Self(format!(
            "W/\"{}-{}-{}\"",
            records.len(),
            version_sum,
            &digest[..16]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Equality against a tag the caller already holds.
    pub fn matches(&self, candidate: &ETag) -> bool {
        self == candidate
    }
}

impl Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A write was attempted against a version the caller no longer holds.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("precondition failed: expected {expected}, current {current}")]
pub struct StaleTag {
    pub expected: ETag,
    pub current: ETag,
}

/// Gates a write on version identity. `None` means unconditional.
pub fn check_precondition(current: &ETag, expected: Option<&ETag>) -> Result<(), StaleTag> {
    match expected {
        Some(expected) if !current.matches(expected) => Err(StaleTag {
            expected: expected.clone(),
            current: current.clone(),
        }),
        _ => Ok(()),
    }
}

/// A value together with the tag that identifies its version.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged<T> {
    pub body: T,
    pub tag: ETag,
}

/// Outcome of a conditional read.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditional<T> {
    /// The caller's copy is stale or absent; here is the current one.
    Fresh(Tagged<T>),
    /// The caller's copy is still current.
    NotModified(ETag),
}

impl<T> Conditional<T> {
    /// Short-circuits to `NotModified` when `if_none_match` equals the current tag.
    pub fn evaluate(body: T, tag: ETag, if_none_match: Option<&ETag>) -> Self {
        match if_none_match {
            Some(held) if tag.matches(held) => Conditional::NotModified(tag),
            _ => Conditional::Fresh(Tagged { body, tag }),
        }
    }

    pub fn tag(&self) -> &ETag {
        match self {
            Conditional::Fresh(tagged) => &tagged.tag,
            Conditional::NotModified(tag) => tag,
        }
    }
}
