use std::collections::BTreeMap;
use std::fmt;

/// Numeric element type of an array channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    U8,
    I32,
    I64,
    F32,
    F64,
}

impl DType {
    pub fn is_float(self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    /// Smallest representable value. For floats this is `-MAX`, not the smallest positive value.
    pub fn minimum(self) -> Scalar {
        match self {
            DType::U8 => Scalar::Int(u8::MIN as i64),
            DType::I32 => Scalar::Int(i32::MIN as i64),
            DType::I64 => Scalar::Int(i64::MIN),
            DType::F32 => Scalar::Float(f32::MIN as f64),
            DType::F64 => Scalar::Float(f64::MIN),
        }
    }

    pub fn maximum(self) -> Scalar {
        match self {
            DType::U8 => Scalar::Int(u8::MAX as i64),
            DType::I32 => Scalar::Int(i32::MAX as i64),
            DType::I64 => Scalar::Int(i64::MAX),
            DType::F32 => Scalar::Float(f32::MAX as f64),
            DType::F64 => Scalar::Float(f64::MAX),
        }
    }
}

/// A bound that keeps integer limits exact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
        }
    }
}

/// The engine's nested type descriptor for an observation or action channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    /// Numeric array without explicit bounds.
    Array {
        name: String,
        shape: Vec<usize>,
        dtype: DType,
    },
    /// Numeric array with inclusive scalar bounds.
    Bounded {
        name: String,
        shape: Vec<usize>,
        dtype: DType,
        minimum: Scalar,
        maximum: Scalar,
    },
    /// Scalar taking one of `num_values` values, `0..num_values`.
    Discrete {
        name: String,
        num_values: u64,
        dtype: DType,
    },
    /// String-valued channel.
    Text { name: String },
    Tuple(Vec<Spec>),
    Dict(BTreeMap<String, Spec>),
}

impl Spec {
    pub fn array(name: &str, shape: &[usize], dtype: DType) -> Spec {
        Spec::Array {
            name: name.to_string(),
            shape: shape.to_vec(),
            dtype,
        }
    }

    /// Scalar integer channel with inclusive bounds, as used for sub-actions.
    pub fn bounded_int(name: &str, minimum: i64, maximum: i64) -> Spec {
        Spec::Bounded {
            name: name.to_string(),
            shape: vec![],
            dtype: DType::I32,
            minimum: Scalar::Int(minimum),
            maximum: Scalar::Int(maximum),
        }
    }

    pub fn discrete(name: &str, num_values: u64) -> Spec {
        Spec::Discrete {
            name: name.to_string(),
            num_values,
            dtype: DType::I64,
        }
    }

    /// Name of a leaf, `None` for containers.
    pub fn name(&self) -> Option<&str> {
        match self {
            Spec::Array { name, .. }
            | Spec::Bounded { name, .. }
            | Spec::Discrete { name, .. }
            | Spec::Text { name } => Some(name),
            Spec::Tuple(_) | Spec::Dict(_) => None,
        }
    }

    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            Spec::Array { shape, .. } | Spec::Bounded { shape, .. } => Some(shape),
            Spec::Discrete { .. } => Some(&[]),
            _ => None,
        }
    }

    /// Inclusive integer range of a scalar leaf, if it has one.
    pub fn int_range(&self) -> Option<(i64, i64)> {
        match self {
            Spec::Bounded {
                minimum: Scalar::Int(lo),
                maximum: Scalar::Int(hi),
                ..
            } => Some((*lo, *hi)),
            Spec::Discrete { num_values, .. } if *num_values > 0 => {
                Some((0, *num_values as i64 - 1))
            }
            _ => None,
        }
    }
}
