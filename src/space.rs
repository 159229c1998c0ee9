//! Conversion of engine specs into RL spaces.

use std::collections::BTreeMap;

use crate::error::UnsupportedSpecError;
use crate::low_level::{DType, Scalar, Spec};

/// A box of numeric values with inclusive per-channel bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSpace {
    pub low: Scalar,
    pub high: Scalar,
    pub shape: Vec<usize>,
    pub dtype: DType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Space {
    /// Values `0..n`.
    Discrete(u64),
    Box(BoxSpace),
    Tuple(Vec<Space>),
    Dict(BTreeMap<String, Space>),
}

impl Space {
    /// Drops the entries of a dict space whose key matches `remove`. Other spaces are returned as is.
    pub fn without_keys(self, remove: impl Fn(&str) -> bool) -> Space {
        match self {
            Space::Dict(entries) => {
                Space::Dict(entries.into_iter().filter(|(k, _)| !remove(k)).collect())
            }
            other => other,
        }
    }
}

/// Converts a spec tree into a space tree of the same structure.
pub fn spec_to_space(spec: &Spec) -> Result<Space, UnsupportedSpecError> {
    match spec {
        Spec::Discrete { num_values, .. } => Ok(Space::Discrete(*num_values)),
        Spec::Bounded {
            shape,
            dtype,
            minimum,
            maximum,
            ..
        } => Ok(Space::Box(BoxSpace {
            low: *minimum,
            high: *maximum,
            shape: shape.clone(),
            dtype: *dtype,
        })),
        Spec::Array { shape, dtype, .. } => Ok(Space::Box(BoxSpace {
            low: dtype.minimum(),
            high: dtype.maximum(),
            shape: shape.clone(),
            dtype: *dtype,
        })),
        Spec::Tuple(items) => items
            .iter()
            .map(spec_to_space)
            .collect::<Result<_, _>>()
            .map(Space::Tuple),
        Spec::Dict(entries) => entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), spec_to_space(v)?)))
            .collect::<Result<_, _>>()
            .map(Space::Dict),
        Spec::Text { name } => Err(UnsupportedSpecError {
            node: format!("text spec {name:?}"),
        }),
    }
}
