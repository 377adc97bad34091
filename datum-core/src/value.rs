// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The generic, schema-agnostic in-memory value representation.
//!
//! Decoding with no statically-typed target produces a [`Value`]; encoding
//! reads from one. Records keep their entries in schema field order, maps in
//! insertion order. A decoded union carries no wrapper: the branch's value
//! stands on its own.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::Error;
use crate::schema::{Schema, SchemaKind};

/// A dynamically-typed decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    /// An enum symbol, by name.
    Enum(String),
    /// A fixed-size byte blob.
    Fixed(Vec<u8>),
    /// Record entries in schema field order.
    Record(Vec<(String, Value)>),
    Array(Vec<Value>),
    /// Map entries in insertion order.
    Map(Vec<(String, Value)>),
    /// Domain value of the `date` logical type (backed by `int`).
    Date(NaiveDate),
    /// Domain value of the `time-millis` logical type (backed by `int`).
    TimeMillis(NaiveTime),
    /// Domain value of the `time-micros` logical type (backed by `long`).
    TimeMicros(NaiveTime),
    /// Domain value of the `timestamp-millis` logical type (backed by `long`).
    TimestampMillis(NaiveDateTime),
    /// Domain value of the `timestamp-micros` logical type (backed by `long`).
    TimestampMicros(NaiveDateTime),
}

impl Value {
    /// A short name for the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::Fixed(_) => "fixed",
            Value::Record(_) => "record",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Date(_) => "date",
            Value::TimeMillis(_) => "time-millis",
            Value::TimeMicros(_) => "time-micros",
            Value::TimestampMillis(_) => "timestamp-millis",
            Value::TimestampMicros(_) => "timestamp-micros",
        }
    }

    /// Looks up a record field or map entry by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) | Value::Map(fields) => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Returns the record field at `position`.
    pub fn get_at(&self, position: usize) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.get(position).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Replaces the record field at `position`.
    pub fn put(&mut self, position: usize, value: Value) -> Result<(), Error> {
        match self {
            Value::Record(fields) => match fields.get_mut(position) {
                Some(slot) => {
                    slot.1 = value;
                    Ok(())
                }
                None => Err(Error::type_error(format!(
                    "record has no field at position {position}"
                ))),
            },
            other => Err(Error::type_error(format!(
                "cannot set field on {}",
                other.kind_name()
            ))),
        }
    }

    /// Replaces the record field named `name`.
    pub fn put_named(&mut self, name: &str, value: Value) -> Result<(), Error> {
        match self {
            Value::Record(fields) => match fields.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => {
                    slot.1 = value;
                    Ok(())
                }
                None => Err(Error::type_error(format!("record has no field {name:?}"))),
            },
            other => Err(Error::type_error(format!(
                "cannot set field on {}",
                other.kind_name()
            ))),
        }
    }

    /// Appends to an array value.
    pub fn push(&mut self, value: Value) -> Result<(), Error> {
        match self {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            other => Err(Error::type_error(format!(
                "cannot append to {}",
                other.kind_name()
            ))),
        }
    }

    /// Inserts into a map value, replacing any entry with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Result<(), Error> {
        match self {
            Value::Map(entries) => {
                let key = key.into();
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = value,
                    None => entries.push((key, value)),
                }
                Ok(())
            }
            other => Err(Error::type_error(format!(
                "cannot insert into {}",
                other.kind_name()
            ))),
        }
    }
}

/// Builds a [`Value`] from a JSON default, validated against `schema`.
///
/// Follows the original default-handling rules: integer defaults widen to
/// long/float/double fields, `bytes` and `fixed` defaults are strings whose
/// code points are the byte values, and a union field's default must be
/// assignable to the union's first branch.
pub fn from_json(json: &serde_json::Value, schema: &Schema) -> Result<Value, Error> {
    use serde_json::Value as Json;
    let mismatch = || {
        Error::type_error(format!(
            "default {json} is not assignable to schema {schema}"
        ))
    };
    match schema.kind() {
        SchemaKind::Null => match json {
            Json::Null => Ok(Value::Null),
            _ => Err(mismatch()),
        },
        SchemaKind::Boolean => match json {
            Json::Bool(b) => Ok(Value::Boolean(*b)),
            _ => Err(mismatch()),
        },
        SchemaKind::Int => json
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int)
            .ok_or_else(mismatch),
        SchemaKind::Long => json.as_i64().map(Value::Long).ok_or_else(mismatch),
        SchemaKind::Float => json
            .as_f64()
            .map(|v| Value::Float(v as f32))
            .ok_or_else(mismatch),
        SchemaKind::Double => json.as_f64().map(Value::Double).ok_or_else(mismatch),
        SchemaKind::Bytes => match json {
            Json::String(s) => Ok(Value::Bytes(json_str_to_bytes(s)?)),
            _ => Err(mismatch()),
        },
        SchemaKind::String => match json {
            Json::String(s) => Ok(Value::String(s.clone())),
            _ => Err(mismatch()),
        },
        SchemaKind::Enum(e) => match json {
            Json::String(s) if e.symbols.iter().any(|sym| sym == s) => {
                Ok(Value::Enum(s.clone()))
            }
            _ => Err(mismatch()),
        },
        SchemaKind::Fixed(f) => match json {
            Json::String(s) => {
                let bytes = json_str_to_bytes(s)?;
                if bytes.len() != f.size {
                    return Err(mismatch());
                }
                Ok(Value::Fixed(bytes))
            }
            _ => Err(mismatch()),
        },
        SchemaKind::Array(items) => match json {
            Json::Array(elems) => {
                let mut out = Vec::with_capacity(elems.len());
                for elem in elems {
                    out.push(from_json(elem, items)?);
                }
                Ok(Value::Array(out))
            }
            _ => Err(mismatch()),
        },
        SchemaKind::Map(values) => match json {
            Json::Object(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    out.push((k.clone(), from_json(v, values)?));
                }
                Ok(Value::Map(out))
            }
            _ => Err(mismatch()),
        },
        SchemaKind::Record(r) => match json {
            Json::Object(entries) => {
                let mut out = Vec::with_capacity(r.fields.len());
                for field in &r.fields {
                    let value = match entries.get(&field.name) {
                        Some(v) => from_json(v, &field.schema)?,
                        None => match &field.default {
                            Some(d) => d.clone(),
                            None => return Err(mismatch()),
                        },
                    };
                    out.push((field.name.clone(), value));
                }
                Ok(Value::Record(out))
            }
            _ => Err(mismatch()),
        },
        // A union default is validated against the first branch only.
        SchemaKind::Union(branches) => match branches.first() {
            Some(first) => from_json(json, first),
            None => Err(mismatch()),
        },
    }
}

/// Interprets a JSON string as raw bytes, one code point per byte.
fn json_str_to_bytes(s: &str) -> Result<Vec<u8>, Error> {
    s.chars()
        .map(|c| {
            u8::try_from(c as u32).map_err(|_| {
                Error::type_error(format!(
                    "byte default contains code point {} above 255",
                    c as u32
                ))
            })
        })
        .collect()
}
