// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Output-kind flags passed to `ModelGateway::encode`

use serde::Serialize;
use std::collections::BTreeMap;

pub const RETURN_DENSE: &str = "return_dense";
pub const RETURN_SPARSE: &str = "return_sparse";
pub const RETURN_COLBERT: &str = "return_colbert";

/// Named booleans selecting which representations the gateway computes.
///
/// Dense and sparse entries are always present once set. The colbert entry is
/// a compatibility shim: FlagEmbedding-style backends forward unknown keyword
/// arguments into their tokenizer, and some releases fail on an explicit
/// `return_colbert=false`. The key is therefore only ever present as `true`.
///
/// # Example
/// ```ignore
/// let flags = EncodeFlags::new().dense(true).sparse(false).colbert(false);
/// assert!(!flags.contains(RETURN_COLBERT));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodeFlags {
    entries: BTreeMap<&'static str, bool>,
}

impl EncodeFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `return_dense`.
    pub fn dense(mut self, enabled: bool) -> Self {
        self.entries.insert(RETURN_DENSE, enabled);
        self
    }

    /// Sets `return_sparse`.
    pub fn sparse(mut self, enabled: bool) -> Self {
        self.entries.insert(RETURN_SPARSE, enabled);
        self
    }

    /// Adds `return_colbert = true` when `enabled`; otherwise leaves the key out.
    pub fn colbert(mut self, enabled: bool) -> Self {
        if enabled {
            self.entries.insert(RETURN_COLBERT, true);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    // Absent keys fall back to the upstream library defaults.

    pub fn wants_dense(&self) -> bool {
        self.get(RETURN_DENSE).unwrap_or(true)
    }

    pub fn wants_sparse(&self) -> bool {
        self.get(RETURN_SPARSE).unwrap_or(false)
    }

    pub fn wants_colbert(&self) -> bool {
        self.get(RETURN_COLBERT).unwrap_or(false)
    }
}
