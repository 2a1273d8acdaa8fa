// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Conversion of gateway output into plain JSON values
//!
//! Arrays become nested lists, maps become objects, scalars become numbers.
//! Converting a value that is already plain JSON returns an equal value.

use crate::embeddings::{EncodeOutput, Representation};
use ndarray::{ArrayBase, ArrayViewD, Axis, Data, Dimension};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashMap};

/// Recursive conversion to a JSON-safe `serde_json::Value`.
pub trait ToJsonSafe {
    fn to_json_safe(&self) -> Value;
}

impl ToJsonSafe for Value {
    fn to_json_safe(&self) -> Value {
        match self {
            Value::Array(items) => Value::Array(items.iter().map(ToJsonSafe::to_json_safe).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json_safe()))
                    .collect(),
            ),
            scalar => scalar.clone(),
        }
    }
}

impl ToJsonSafe for f32 {
    fn to_json_safe(&self) -> Value {
        f64::from(*self).to_json_safe()
    }
}

impl ToJsonSafe for f64 {
    fn to_json_safe(&self) -> Value {
        // NaN and infinities have no JSON form.
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl ToJsonSafe for bool {
    fn to_json_safe(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToJsonSafe for String {
    fn to_json_safe(&self) -> Value {
        Value::String(self.clone())
    }
}

impl<T: ToJsonSafe> ToJsonSafe for Option<T> {
    fn to_json_safe(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToJsonSafe::to_json_safe)
    }
}

impl<T: ToJsonSafe> ToJsonSafe for [T] {
    fn to_json_safe(&self) -> Value {
        Value::Array(self.iter().map(ToJsonSafe::to_json_safe).collect())
    }
}

impl<T: ToJsonSafe> ToJsonSafe for Vec<T> {
    fn to_json_safe(&self) -> Value {
        self.as_slice().to_json_safe()
    }
}

impl<T: ToJsonSafe> ToJsonSafe for HashMap<String, T> {
    fn to_json_safe(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_json_safe()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl<T: ToJsonSafe> ToJsonSafe for BTreeMap<String, T> {
    fn to_json_safe(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_json_safe()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl<S, D> ToJsonSafe for ArrayBase<S, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    fn to_json_safe(&self) -> Value {
        nested_list(self.view().into_dyn())
    }
}

/// Walks the outer axis recursively, like `ndarray.tolist()`.
fn nested_list(view: ArrayViewD<'_, f32>) -> Value {
    if view.ndim() == 0 {
        return view.iter().next().map_or(Value::Null, ToJsonSafe::to_json_safe);
    }
    Value::Array(
        view.axis_iter(Axis(0))
            .map(nested_list)
            .collect(),
    )
}

impl ToJsonSafe for Representation {
    fn to_json_safe(&self) -> Value {
        match self {
            Representation::Dense(dense) => dense.to_json_safe(),
            Representation::Lexical(weights) => weights.to_json_safe(),
            Representation::MultiVector(vectors) => vectors.to_json_safe(),
            Representation::NotRequested => Value::Null,
        }
    }
}

impl ToJsonSafe for EncodeOutput {
    fn to_json_safe(&self) -> Value {
        match self {
            EncodeOutput::Keyed(kinds) => kinds.to_json_safe(),
            EncodeOutput::Bare(dense) => dense.to_json_safe(),
        }
    }
}
