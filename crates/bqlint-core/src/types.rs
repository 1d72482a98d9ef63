//! BigQuery type system
//!
//! Column types arrive as strings in schema definitions (`INT64`,
//! `ARRAY<STRING>`, `STRUCT<a INT64, b STRING>`) and are parsed into
//! [`BqType`] when the catalog is built, so a typo in a schema file fails
//! catalog construction instead of silently passing analysis.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Internal representation of BigQuery types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BqType {
    Int64,
    Float64,
    Numeric,
    BigNumeric,
    Bool,
    String,
    Bytes,
    Date,
    Datetime,
    Time,
    Timestamp,
    Geography,
    Json,
    Interval,
    Array(Box<BqType>),
    Struct(Vec<StructField>),
}

/// One field of a STRUCT type; anonymous fields have no name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: Option<String>,
    pub ty: BqType,
}

/// A type string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type '{0}'")]
pub struct TypeError(String);

impl TypeError {
    fn new(input: &str) -> Self {
        Self(input.to_string())
    }
}

impl BqType {
    /// Parse a BigQuery type string.
    ///
    /// Accepts the canonical names, their documented aliases (`INT`,
    /// `INTEGER`, `BOOLEAN`, `DECIMAL`, ...), nested `ARRAY<...>` and
    /// `STRUCT<...>`, and parameterized forms like `STRING(10)` or
    /// `NUMERIC(10, 2)` whose parameters are ignored.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let s = input.trim();
        let upper = s.to_ascii_uppercase();

        if upper.starts_with("ARRAY") {
            let inner = angle_argument(s, "ARRAY".len()).ok_or_else(|| TypeError::new(input))?;
            // Arrays of arrays are not a BigQuery type.
            if inner.trim().to_ascii_uppercase().starts_with("ARRAY") {
                return Err(TypeError::new(input));
            }
            return Ok(BqType::Array(Box::new(BqType::parse(inner)?)));
        }

        if upper.starts_with("STRUCT") {
            let inner = angle_argument(s, "STRUCT".len()).ok_or_else(|| TypeError::new(input))?;
            let mut fields = Vec::new();
            for field in split_top_level(inner, b',') {
                fields.push(parse_struct_field(field)?);
            }
            if fields.is_empty() {
                return Err(TypeError::new(input));
            }
            return Ok(BqType::Struct(fields));
        }

        // Scalar, with an optional parameterization to drop.
        let base = match upper.split_once('(') {
            Some((head, rest)) if rest.ends_with(')') => head.trim_end(),
            Some(_) => return Err(TypeError::new(input)),
            None => upper.as_str(),
        };

        let ty = match base {
            "INT64" | "INT" | "INTEGER" | "SMALLINT" | "BIGINT" | "TINYINT" | "BYTEINT" => {
                BqType::Int64
            }
            "FLOAT64" | "FLOAT" => BqType::Float64,
            "NUMERIC" | "DECIMAL" => BqType::Numeric,
            "BIGNUMERIC" | "BIGDECIMAL" => BqType::BigNumeric,
            "BOOL" | "BOOLEAN" => BqType::Bool,
            "STRING" => BqType::String,
            "BYTES" => BqType::Bytes,
            "DATE" => BqType::Date,
            "DATETIME" => BqType::Datetime,
            "TIME" => BqType::Time,
            "TIMESTAMP" => BqType::Timestamp,
            "GEOGRAPHY" => BqType::Geography,
            "JSON" => BqType::Json,
            "INTERVAL" => BqType::Interval,
            _ => return Err(TypeError::new(input)),
        };
        Ok(ty)
    }
}

impl fmt::Display for BqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BqType::Int64 => f.write_str("INT64"),
            BqType::Float64 => f.write_str("FLOAT64"),
            BqType::Numeric => f.write_str("NUMERIC"),
            BqType::BigNumeric => f.write_str("BIGNUMERIC"),
            BqType::Bool => f.write_str("BOOL"),
            BqType::String => f.write_str("STRING"),
            BqType::Bytes => f.write_str("BYTES"),
            BqType::Date => f.write_str("DATE"),
            BqType::Datetime => f.write_str("DATETIME"),
            BqType::Time => f.write_str("TIME"),
            BqType::Timestamp => f.write_str("TIMESTAMP"),
            BqType::Geography => f.write_str("GEOGRAPHY"),
            BqType::Json => f.write_str("JSON"),
            BqType::Interval => f.write_str("INTERVAL"),
            BqType::Array(inner) => write!(f, "ARRAY<{inner}>"),
            BqType::Struct(fields) => {
                f.write_str("STRUCT<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(name) = &field.name {
                        write!(f, "{name} ")?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                f.write_str(">")
            }
        }
    }
}

/// Extract the `...` of `<...>` following a type-name prefix.
fn angle_argument(s: &str, prefix_len: usize) -> Option<&str> {
    let rest = s[prefix_len..].trim();
    rest.strip_prefix('<')?.strip_suffix('>')
}

/// Split on `sep` at angle-bracket/parenthesis depth zero.
fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, &c) in bytes.iter().enumerate() {
        match c {
            b'<' | b'(' => depth += 1,
            b'>' | b')' => depth = depth.saturating_sub(1),
            _ if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Parse `name TYPE` or a bare `TYPE` struct field.
fn parse_struct_field(s: &str) -> Result<StructField, TypeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TypeError::new(s));
    }

    // A space at depth zero separates the field name from its type; spaces
    // inside ARRAY<...>/STRUCT<...>/params belong to the type.
    let mut depth = 0usize;
    for (i, &c) in s.as_bytes().iter().enumerate() {
        match c {
            b'<' | b'(' => depth += 1,
            b'>' | b')' => depth = depth.saturating_sub(1),
            b' ' | b'\t' if depth == 0 => {
                let (name, ty) = s.split_at(i);
                return Ok(StructField {
                    name: Some(name.to_string()),
                    ty: BqType::parse(ty)?,
                });
            }
            _ => {}
        }
    }

    Ok(StructField {
        name: None,
        ty: BqType::parse(s)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_types_and_aliases() {
        assert_eq!(BqType::parse("INT64").unwrap(), BqType::Int64);
        assert_eq!(BqType::parse("integer").unwrap(), BqType::Int64);
        assert_eq!(BqType::parse("BOOLEAN").unwrap(), BqType::Bool);
        assert_eq!(BqType::parse("DECIMAL").unwrap(), BqType::Numeric);
        assert_eq!(BqType::parse(" string ").unwrap(), BqType::String);
    }

    #[test]
    fn parameterized_types() {
        assert_eq!(BqType::parse("STRING(10)").unwrap(), BqType::String);
        assert_eq!(BqType::parse("NUMERIC(10, 2)").unwrap(), BqType::Numeric);
    }

    #[test]
    fn array_types() {
        assert_eq!(
            BqType::parse("ARRAY<STRING>").unwrap(),
            BqType::Array(Box::new(BqType::String))
        );
        assert_eq!(
            BqType::parse("array<struct<a INT64>>").unwrap(),
            BqType::Array(Box::new(BqType::Struct(vec![StructField {
                name: Some("a".to_string()),
                ty: BqType::Int64,
            }])))
        );
    }

    #[test]
    fn struct_types() {
        let ty = BqType::parse("STRUCT<a INT64, b STRING, ARRAY<INT64>>").unwrap();
        let BqType::Struct(fields) = ty else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name.as_deref(), Some("a"));
        assert_eq!(fields[1].ty, BqType::String);
        assert_eq!(fields[2].name, None);
        assert_eq!(fields[2].ty, BqType::Array(Box::new(BqType::Int64)));
    }

    #[test]
    fn invalid_types() {
        for input in ["FOO", "ARRAY", "ARRAY<", "ARRAY<ARRAY<INT64>>", "STRUCT<>", "STRING(10"] {
            assert!(BqType::parse(input).is_err(), "parse({input:?})");
        }
    }

    #[test]
    fn display_is_canonical() {
        let ty = BqType::parse("struct<a int64, tags array<string>>").unwrap();
        assert_eq!(ty.to_string(), "STRUCT<a INT64, tags ARRAY<STRING>>");
    }
}
