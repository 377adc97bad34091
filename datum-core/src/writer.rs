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

//! Schema-driven encode of generic values.
//!
//! Writing needs no resolution: the writer schema alone is authoritative
//! for the byte layout. If the schema declares a logical type with a
//! registered conversion and the value is a domain value, the inverse
//! conversion runs before encoding.

use std::sync::Arc;

use crate::buffer::Writer;
use crate::conversion::ConversionRegistry;
use crate::error::Error;
use crate::schema::{Schema, SchemaKind, SchemaRef};
use crate::value::Value;

/// Encodes generic values under a single schema.
pub struct DatumWriter {
    schema: SchemaRef,
    conversions: Arc<ConversionRegistry>,
}

impl DatumWriter {
    /// A writer with no logical type conversions registered; values must
    /// already carry their wire representation.
    pub fn new(schema: SchemaRef) -> DatumWriter {
        DatumWriter::with_conversions(schema, Arc::new(ConversionRegistry::new()))
    }

    pub fn with_conversions(
        schema: SchemaRef,
        conversions: Arc<ConversionRegistry>,
    ) -> DatumWriter {
        DatumWriter {
            schema,
            conversions,
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Encodes one value. The value must conform to the schema; a kind
    /// mismatch is a [`Error::TypeError`].
    pub fn write(&self, value: &Value, writer: &mut Writer) -> Result<(), Error> {
        write_value(&self.schema, value, &self.conversions, writer)
    }
}

fn write_value(
    schema: &Schema,
    value: &Value,
    conversions: &ConversionRegistry,
    writer: &mut Writer,
) -> Result<(), Error> {
    // Domain values go through the inverse conversion first. Values already
    // in wire shape are encoded as-is even under a logical type.
    if !raw_matches(schema, value) {
        if let (Some(name), Some(wire)) = (schema.logical_type(), schema.wire_kind()) {
            if let Some(conversion) = conversions.lookup(wire, name) {
                let lowered = (conversion.from_domain)(value.clone())?;
                return write_raw(schema, &lowered, conversions, writer);
            }
        }
    }
    write_raw(schema, value, conversions, writer)
}

fn write_raw(
    schema: &Schema,
    value: &Value,
    conversions: &ConversionRegistry,
    writer: &mut Writer,
) -> Result<(), Error> {
    match (schema.kind(), value) {
        (SchemaKind::Null, Value::Null) => Ok(()),
        (SchemaKind::Boolean, Value::Boolean(b)) => {
            writer.write_boolean(*b);
            Ok(())
        }
        (SchemaKind::Int, Value::Int(v)) => {
            writer.write_int(*v);
            Ok(())
        }
        (SchemaKind::Long, Value::Long(v)) => {
            writer.write_long(*v);
            Ok(())
        }
        (SchemaKind::Float, Value::Float(v)) => {
            writer.write_f32(*v);
            Ok(())
        }
        (SchemaKind::Double, Value::Double(v)) => {
            writer.write_f64(*v);
            Ok(())
        }
        (SchemaKind::Bytes, Value::Bytes(b)) => {
            writer.write_len_prefixed(b);
            Ok(())
        }
        (SchemaKind::String, Value::String(s)) => {
            writer.write_str(s);
            Ok(())
        }
        (SchemaKind::Enum(e), Value::Enum(symbol)) => match e.index_of(symbol) {
            Some(index) => {
                writer.write_int(index as i32);
                Ok(())
            }
            None => Err(Error::type_error(format!(
                "symbol {symbol:?} is not declared by enum {}",
                e.name
            ))),
        },
        (SchemaKind::Fixed(f), Value::Fixed(bytes)) => {
            if bytes.len() != f.size {
                return Err(Error::type_error(format!(
                    "fixed {} expects {} bytes, value has {}",
                    f.name,
                    f.size,
                    bytes.len()
                )));
            }
            writer.write_bytes(bytes);
            Ok(())
        }
        (SchemaKind::Record(r), Value::Record(_)) => {
            for field in &r.fields {
                let field_value = value.get(&field.name).ok_or_else(|| {
                    Error::type_error(format!(
                        "record value is missing field {:?} of record {}",
                        field.name, r.name
                    ))
                })?;
                write_value(&field.schema, field_value, conversions, writer)?;
            }
            Ok(())
        }
        (SchemaKind::Array(items), Value::Array(elems)) => {
            // One count-N block plus the zero terminator. Decoders accept
            // any block split, so the simplest valid shape is emitted.
            if !elems.is_empty() {
                writer.write_long(elems.len() as i64);
                for elem in elems {
                    write_value(items, elem, conversions, writer)?;
                }
            }
            writer.write_long(0);
            Ok(())
        }
        (SchemaKind::Map(values), Value::Map(entries)) => {
            if !entries.is_empty() {
                writer.write_long(entries.len() as i64);
                for (key, entry) in entries {
                    writer.write_str(key);
                    write_value(values, entry, conversions, writer)?;
                }
            }
            writer.write_long(0);
            Ok(())
        }
        (SchemaKind::Union(branches), _) => {
            // First branch accepting the value wins, in declaration order.
            for (index, branch) in branches.iter().enumerate() {
                if branch_accepts(branch, value, conversions) {
                    writer.write_long(index as i64);
                    return write_value(branch, value, conversions, writer);
                }
            }
            Err(Error::type_error(format!(
                "no branch of {schema} accepts a {} value",
                value.kind_name()
            )))
        }
        _ => Err(Error::type_error(format!(
            "cannot encode {} value under schema {schema}",
            value.kind_name()
        ))),
    }
}

/// Whether the value already carries the schema's wire representation.
fn raw_matches(schema: &Schema, value: &Value) -> bool {
    matches!(
        (schema.kind(), value),
        (SchemaKind::Null, Value::Null)
            | (SchemaKind::Boolean, Value::Boolean(_))
            | (SchemaKind::Int, Value::Int(_))
            | (SchemaKind::Long, Value::Long(_))
            | (SchemaKind::Float, Value::Float(_))
            | (SchemaKind::Double, Value::Double(_))
            | (SchemaKind::Bytes, Value::Bytes(_))
            | (SchemaKind::String, Value::String(_))
            | (SchemaKind::Enum(_), Value::Enum(_))
            | (SchemaKind::Fixed(_), Value::Fixed(_))
            | (SchemaKind::Record(_), Value::Record(_))
            | (SchemaKind::Array(_), Value::Array(_))
            | (SchemaKind::Map(_), Value::Map(_))
    )
}

/// Union branch selection: a branch accepts a value when the raw kinds
/// match, or when the branch declares the value's logical type with a
/// registered conversion (the value's kind name doubles as the logical
/// type name for domain values).
fn branch_accepts(branch: &Schema, value: &Value, conversions: &ConversionRegistry) -> bool {
    if raw_matches(branch, value) {
        return true;
    }
    match (branch.logical_type(), branch.wire_kind()) {
        (Some(name), Some(wire)) => {
            name == value.kind_name() && conversions.lookup(wire, name).is_some()
        }
        _ => false,
    }
}
