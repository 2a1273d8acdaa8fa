// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Result shapes returned by `ModelGateway::encode`

use anyhow::{anyhow, Result};
use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};

pub const DENSE_VECS: &str = "dense_vecs";
pub const LEXICAL_WEIGHTS: &str = "lexical_weights";
pub const COLBERT_VECS: &str = "colbert_vecs";

/// One representation kind, covering every text in the request.
#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    /// `[texts, hidden]` matrix, one row per text
    Dense(Array2<f32>),
    /// Per text: token id (decimal string) -> weight
    Lexical(Vec<HashMap<String, f32>>),
    /// Per text: `[tokens, hidden]` matrix
    MultiVector(Vec<Array2<f32>>),
    /// Kind exists in the output but was not requested (serialized as `null`)
    NotRequested,
}

/// Gateway result: either keyed by representation kind, or a bare dense
/// matrix when the backend only produced dense vectors.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeOutput {
    Keyed(BTreeMap<String, Representation>),
    Bare(Array2<f32>),
}

impl EncodeOutput {
    /// Returns the dense vectors, whichever shape the gateway produced.
    pub fn into_dense(self) -> Result<Array2<f32>> {
        match self {
            EncodeOutput::Bare(dense) => Ok(dense),
            EncodeOutput::Keyed(mut kinds) => match kinds.remove(DENSE_VECS) {
                Some(Representation::Dense(dense)) => Ok(dense),
                Some(_) => Err(anyhow!("'{}' does not hold dense vectors", DENSE_VECS)),
                None => Err(anyhow!("'{}'", DENSE_VECS)),
            },
        }
    }

    /// Returns the representation stored under `kind`, if the output is keyed.
    pub fn get(&self, kind: &str) -> Option<&Representation> {
        match self {
            EncodeOutput::Keyed(kinds) => kinds.get(kind),
            EncodeOutput::Bare(_) => None,
        }
    }
}
