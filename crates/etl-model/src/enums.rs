//! Tagged options accepted by the transformation layer.
//!
//! Each enum parses case-insensitively from the tag used in YAML files and
//! on the command line, and serializes back to its canonical tag.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseTagError;

/// Implements `Display`, `Serialize` and `Deserialize` in terms of the
/// type's `as_str` and `FromStr`.
macro_rules! tag_impls {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(D::Error::custom)
            }
        }
    };
}

fn normalize(tag: &str) -> String {
    tag.trim().to_ascii_lowercase().replace('-', "_")
}

/// How missing values are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingValueStrategy {
    /// Remove rows with a missing value in any target column.
    Drop,
    /// Replace missing values with a caller-supplied constant.
    Fill,
    /// Propagate the last present value downward.
    ForwardFill,
    /// Propagate the next present value upward.
    BackwardFill,
    /// Replace with the column mean (numeric columns only).
    Mean,
    /// Replace with the column median (numeric columns only).
    Median,
}

impl MissingValueStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingValueStrategy::Drop => "drop",
            MissingValueStrategy::Fill => "fill",
            MissingValueStrategy::ForwardFill => "forward_fill",
            MissingValueStrategy::BackwardFill => "backward_fill",
            MissingValueStrategy::Mean => "mean",
            MissingValueStrategy::Median => "median",
        }
    }

    /// Whether the strategy only touches numeric columns.
    pub fn is_numeric_only(&self) -> bool {
        matches!(self, MissingValueStrategy::Mean | MissingValueStrategy::Median)
    }
}

impl FromStr for MissingValueStrategy {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "drop" => Ok(MissingValueStrategy::Drop),
            "fill" => Ok(MissingValueStrategy::Fill),
            "forward_fill" | "ffill" => Ok(MissingValueStrategy::ForwardFill),
            "backward_fill" | "bfill" => Ok(MissingValueStrategy::BackwardFill),
            "mean" => Ok(MissingValueStrategy::Mean),
            "median" => Ok(MissingValueStrategy::Median),
            _ => Err(ParseTagError::new("missing-value strategy", s)),
        }
    }
}

tag_impls!(MissingValueStrategy);

/// Which occurrence of a duplicated row survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DuplicateKeep {
    #[default]
    First,
    Last,
    /// Drop every row that has a duplicate.
    None,
}

impl DuplicateKeep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateKeep::First => "first",
            DuplicateKeep::Last => "last",
            DuplicateKeep::None => "none",
        }
    }
}

impl FromStr for DuplicateKeep {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "first" => Ok(DuplicateKeep::First),
            "last" => Ok(DuplicateKeep::Last),
            "none" | "false" => Ok(DuplicateKeep::None),
            _ => Err(ParseTagError::new("duplicate keep policy", s)),
        }
    }
}

tag_impls!(DuplicateKeep);

/// Target type for column coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Int64,
    Int32,
    Float64,
    Float32,
    String,
    Boolean,
    /// Timestamp with millisecond precision.
    Datetime,
    Date,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Int64 => "int64",
            TargetType::Int32 => "int32",
            TargetType::Float64 => "float64",
            TargetType::Float32 => "float32",
            TargetType::String => "str",
            TargetType::Boolean => "bool",
            TargetType::Datetime => "datetime",
            TargetType::Date => "date",
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, TargetType::Datetime | TargetType::Date)
    }
}

impl FromStr for TargetType {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "int" | "int64" | "integer" => Ok(TargetType::Int64),
            "int32" => Ok(TargetType::Int32),
            "float" | "float64" | "double" => Ok(TargetType::Float64),
            "float32" => Ok(TargetType::Float32),
            "str" | "string" | "text" => Ok(TargetType::String),
            "bool" | "boolean" => Ok(TargetType::Boolean),
            "datetime" | "datetime64" | "timestamp" => Ok(TargetType::Datetime),
            "date" => Ok(TargetType::Date),
            _ => Err(ParseTagError::new("target type", s)),
        }
    }
}

tag_impls!(TargetType);

/// Aggregation function applied per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunc {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    /// Non-missing values in the group.
    Count,
    /// Rows in the group, missing values included.
    Size,
    First,
    Last,
    Std,
    Var,
    NUnique,
}

impl AggFunc {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Median => "median",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Count => "count",
            AggFunc::Size => "size",
            AggFunc::First => "first",
            AggFunc::Last => "last",
            AggFunc::Std => "std",
            AggFunc::Var => "var",
            AggFunc::NUnique => "nunique",
        }
    }
}

impl FromStr for AggFunc {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "sum" => Ok(AggFunc::Sum),
            "mean" | "avg" => Ok(AggFunc::Mean),
            "median" => Ok(AggFunc::Median),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            "count" => Ok(AggFunc::Count),
            "size" | "len" => Ok(AggFunc::Size),
            "first" => Ok(AggFunc::First),
            "last" => Ok(AggFunc::Last),
            "std" => Ok(AggFunc::Std),
            "var" => Ok(AggFunc::Var),
            "nunique" | "n_unique" => Ok(AggFunc::NUnique),
            _ => Err(ParseTagError::new("aggregation function", s)),
        }
    }
}

tag_impls!(AggFunc);
